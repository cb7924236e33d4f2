// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

// Helpers shared by the integration tests. Not every test crate uses all of them.
#![allow(dead_code)]

use symtaint::constant_domain::ConstantDomain;
use symtaint::environment::Environment;
use symtaint::ir::{MethodDescriptor, Value};
use symtaint::known_names::KnownNamesCache;
use symtaint::recognition_chain::{CallSite, RecognitionChain};
use symtaint::symbolic_value::SymbolicValue;
use symtaint::utils::{JAVA_LANG_STRING, JAVA_LANG_STRING_BUILDER};

use std::rc::Rc;

pub const SMS_MESSAGE: &str = "android.telephony.SmsMessage";

pub fn string_local(name: &str) -> Rc<Value> {
    Value::local(name, JAVA_LANG_STRING)
}

pub fn builder_local(name: &str) -> Rc<Value> {
    Value::local(name, JAVA_LANG_STRING_BUILDER)
}

pub fn string_literal(s: &str) -> Rc<Value> {
    Value::literal(ConstantDomain::for_str(s))
}

pub fn int_literal(i: i64) -> Rc<Value> {
    Value::literal(ConstantDomain::I64(i))
}

pub fn constant(s: &str) -> Rc<SymbolicValue> {
    Rc::new(SymbolicValue::make_constant(ConstantDomain::for_str(s)))
}

pub fn tagged_unknown(value: &Value, tag: &str) -> Rc<SymbolicValue> {
    let mut unknown = SymbolicValue::make_unknown_for(value);
    unknown.add_tag(tag);
    Rc::new(unknown)
}

pub fn string_method(name: &str, parameter_types: &[&str], return_type: &str) -> Rc<MethodDescriptor> {
    MethodDescriptor::new(JAVA_LANG_STRING, name, parameter_types, return_type)
}

pub fn builder_method(name: &str, parameter_types: &[&str]) -> Rc<MethodDescriptor> {
    MethodDescriptor::new(
        JAVA_LANG_STRING_BUILDER,
        name,
        parameter_types,
        JAVA_LANG_STRING_BUILDER,
    )
}

pub fn sms_getter(name: &str) -> Rc<MethodDescriptor> {
    MethodDescriptor::new(SMS_MESSAGE, name, &[], JAVA_LANG_STRING)
}

/// Runs the standard recognition chain over the call.
pub fn recognize(
    environment: &Environment,
    method: &Rc<MethodDescriptor>,
    base: Option<&Rc<Value>>,
    arguments: &[Rc<Value>],
) -> Option<Vec<Rc<SymbolicValue>>> {
    let mut cache = KnownNamesCache::create_cache();
    let known_name = cache.get(method);
    let call = CallSite::new(method, known_name, base, arguments);
    RecognitionChain::default()
        .recognize_string_method(&call, environment)
        .expect("the call is well formed")
}

pub fn rendered(values: &[Rc<SymbolicValue>]) -> Vec<&str> {
    values.iter().map(|v| v.get_value()).collect()
}
