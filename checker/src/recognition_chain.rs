// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::analysis_error::AnalysisError;
use crate::environment::Environment;
use crate::ir::{MethodDescriptor, Value};
use crate::known_names::KnownNames;
use crate::string_recognizers;
use crate::symbolic_value::{self, Snapshot, SymbolicValue};

use itertools::Itertools;
use std::fmt::{Debug, Formatter, Result};
use std::iter;
use std::rc::Rc;

/// A call instruction as seen by the recognizers.
#[derive(Clone, Copy, Debug)]
pub struct CallSite<'call> {
    pub method: &'call Rc<MethodDescriptor>,
    pub known_name: KnownNames,
    /// None for static calls.
    pub base: Option<&'call Rc<Value>>,
    pub arguments: &'call [Rc<Value>],
}

impl<'call> CallSite<'call> {
    pub fn new(
        method: &'call Rc<MethodDescriptor>,
        known_name: KnownNames,
        base: Option<&'call Rc<Value>>,
        arguments: &'call [Rc<Value>],
    ) -> CallSite<'call> {
        CallSite {
            method,
            known_name,
            base,
            arguments,
        }
    }

    /// The receiver of an instance method. A call to an instance method without one can only
    /// come from a broken loader.
    pub fn receiver(&self) -> std::result::Result<&'call Rc<Value>, AnalysisError> {
        self.base
            .ok_or_else(|| AnalysisError::MissingReceiver(self.method.to_string()))
    }

    /// The receiver, if any, followed by the arguments.
    pub fn operands(&self) -> impl Iterator<Item = &'call Rc<Value>> {
        self.base.into_iter().chain(self.arguments.iter())
    }

    /// A value that describes this call without evaluating it.
    pub fn method_representation(&self, snapshot: Snapshot) -> SymbolicValue {
        SymbolicValue::make_method_representation(
            self.method,
            self.base,
            self.arguments,
            snapshot,
        )
    }

    /// A value that describes this call, with every operand as the environment knows it now.
    pub fn method_representation_from(&self, environment: &Environment) -> SymbolicValue {
        self.method_representation(Snapshot::capture(self.operands(), environment))
    }
}

/// Computes the effect of one family of library calls on symbolic values and tags.
pub trait StringMethodRecognizer {
    /// A short name for logging.
    fn name(&self) -> &'static str;

    /// Returns Ok(None), or an empty list, if the call is not one this recognizer models.
    /// Returns an error only if the call itself is malformed.
    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> std::result::Result<Option<Vec<SymbolicValue>>, AnalysisError>;
}

/// An ordered list of recognizers. The first one that produces values for a call wins and the
/// ones after it are not consulted.
pub struct RecognitionChain {
    recognizers: Vec<Box<dyn StringMethodRecognizer>>,
}

impl Debug for RecognitionChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "RecognitionChain[{}]",
            self.recognizers.iter().map(|r| r.name()).join(", ")
        )
    }
}

impl Default for RecognitionChain {
    fn default() -> Self {
        RecognitionChain::new(string_recognizers::standard_recognizers())
    }
}

impl RecognitionChain {
    pub fn new(recognizers: Vec<Box<dyn StringMethodRecognizer>>) -> RecognitionChain {
        RecognitionChain { recognizers }
    }

    /// Returns a chain that consults the given recognizer after the recognizers of self.
    #[must_use]
    pub fn followed_by(mut self, recognizer: Box<dyn StringMethodRecognizer>) -> RecognitionChain {
        self.recognizers.extend(iter::once(recognizer));
        self
    }

    /// Returns the values computed by the first recognizer that models the call, without
    /// duplicates, or None if none of them does.
    pub fn recognize_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> std::result::Result<Option<Vec<Rc<SymbolicValue>>>, AnalysisError> {
        call.method.validate()?;
        for recognizer in self.recognizers.iter() {
            match recognizer.process_string_method(call, environment)? {
                Some(values) if !values.is_empty() => {
                    debug!("{} recognized {}", recognizer.name(), call.method);
                    return Ok(Some(symbolic_value::into_results(values)));
                }
                _ => trace!("{} does not model {}", recognizer.name(), call.method),
            }
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}
