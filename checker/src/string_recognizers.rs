// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

// Models of the library methods that build, transform and produce strings.
//
// Each recognizer answers for one family of known names and declines everything else. A
// recognizer that cannot evaluate a call still answers for it, with a method representation
// that records what the operands held at the call.

use crate::analysis_error::AnalysisError;
use crate::constant_domain::ConstantDomain;
use crate::environment::Environment;
use crate::ir::Value;
use crate::known_names::{self, KnownNames};
use crate::recognition_chain::{CallSite, StringMethodRecognizer};
use crate::symbolic_value::{Snapshot, SymbolicValue, ValueList};
use crate::tag_propagation::{propagate_tags, propagate_tags_to_all};
use crate::utils;

use std::iter;
use std::rc::Rc;

type RecognizerResult = Result<Option<Vec<SymbolicValue>>, AnalysisError>;

/// The recognizers consulted for every call, in the order they are consulted.
pub fn standard_recognizers() -> Vec<Box<dyn StringMethodRecognizer>> {
    vec![
        Box::new(SmsSourceRecognizer),
        Box::new(StringInitRecognizer),
        Box::new(AppendRecognizer),
        Box::new(SubstringRecognizer),
        Box::new(ValueOfRecognizer),
        Box::new(FormatRecognizer),
        Box::new(ToLowerCaseRecognizer),
        Box::new(ToStringRecognizer),
    ]
}

/// The values operand holds, or a single unknown value standing in for it if the environment
/// knows nothing about it.
fn resolve_or_unknown(operand: &Rc<Value>, environment: &Environment) -> ValueList {
    match environment.resolve_operand(operand) {
        Some(values) if !values.is_empty() => values,
        _ => {
            debug!("{} has no recorded values", operand);
            Rc::new(vec![Rc::new(SymbolicValue::make_unknown_for(operand))])
        }
    }
}

fn copies(values: &ValueList) -> Vec<SymbolicValue> {
    values.iter().map(|v| v.as_ref().clone()).collect()
}

/// Results for a call that returns what its receiver holds, tagged like the receiver.
fn pass_through_receiver(call: &CallSite<'_>, environment: &Environment) -> RecognizerResult {
    let base = call.receiver()?;
    let mut results = copies(&resolve_or_unknown(base, environment));
    propagate_tags_to_all(base, &mut results, environment);
    Ok(Some(results))
}

/// The getters of SmsMessage. The result is opaque but carries the tag of the part of the
/// message it exposes.
pub struct SmsSourceRecognizer;

impl StringMethodRecognizer for SmsSourceRecognizer {
    fn name(&self) -> &'static str {
        "sms source"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        let tag = match call.known_name.source_tag() {
            Some(tag) => tag,
            None => return Ok(None),
        };
        let mut value = call.method_representation_from(environment);
        value.add_tag(tag);
        debug!("{} introduces {}", call.method, tag);
        Ok(Some(vec![value]))
    }
}

/// Constructors of String, StringBuilder and StringBuffer.
pub struct StringInitRecognizer;

impl StringMethodRecognizer for StringInitRecognizer {
    fn name(&self) -> &'static str {
        "string constructor"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if call.known_name != KnownNames::StringInit {
            return Ok(None);
        }
        call.receiver()?;
        let empty = || SymbolicValue::make_constant(ConstantDomain::for_str(""));
        let results = match call.arguments {
            [] => vec![empty()],
            [argument] => match argument.as_literal() {
                Some(ConstantDomain::Str(s)) => {
                    vec![SymbolicValue::make_constant(ConstantDomain::for_str(s))]
                }
                // new StringBuilder(capacity)
                _ if argument.static_type() == "int"
                    && call.method.class != utils::JAVA_LANG_STRING =>
                {
                    vec![empty()]
                }
                Some(_) => vec![call.method_representation_from(environment)],
                None => {
                    let mut results = copies(&resolve_or_unknown(argument, environment));
                    propagate_tags_to_all(argument, &mut results, environment);
                    results
                }
            },
            _ => vec![call.method_representation_from(environment)],
        };
        Ok(Some(results))
    }
}

/// StringBuilder.append, StringBuffer.append and String.concat.
/// Constant receivers and literal arguments are folded. The result carries the tags of the
/// receiver and of the argument.
pub struct AppendRecognizer;

impl StringMethodRecognizer for AppendRecognizer {
    fn name(&self) -> &'static str {
        "append"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if !matches!(
            call.known_name,
            KnownNames::StringAppend | KnownNames::StringConcat
        ) {
            return Ok(None);
        }
        let base = call.receiver()?;
        let argument = match call.arguments {
            [argument] => argument,
            _ => {
                // append(char[], int, int) and friends
                return Ok(Some(vec![call.method_representation_from(environment)]));
            }
        };
        let argument_snapshot = Snapshot::capture(iter::once(argument), environment);
        let mut results = Vec::new();
        for candidate in resolve_or_unknown(base, environment).iter() {
            let folded = match (candidate.as_constant(), argument.as_literal()) {
                (Some(constant), Some(literal)) => Some(constant.concat(literal)),
                _ => None,
            };
            let result = match folded {
                Some(constant) => SymbolicValue::make_constant(constant),
                None => call.method_representation(
                    argument_snapshot.with(base, Rc::new(vec![candidate.clone()])),
                ),
            };
            results.push(result);
        }
        propagate_tags_to_all(base, &mut results, environment);
        propagate_tags_to_all(argument, &mut results, environment);
        Ok(Some(results))
    }
}

/// String.substring(start) and String.substring(start, end).
/// Folds constant receivers when the indices are literals and in bounds. Tags of folded
/// results are not propagated.
pub struct SubstringRecognizer;

impl StringMethodRecognizer for SubstringRecognizer {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if call.known_name != KnownNames::StringSubstring {
            return Ok(None);
        }
        let base = call.receiver()?;
        let indices: Option<Vec<i64>> = call
            .arguments
            .iter()
            .map(|a| a.as_literal().and_then(|c| c.as_int_if_known()))
            .collect();
        let argument_snapshot = Snapshot::capture(call.arguments.iter(), environment);
        let mut results = Vec::new();
        for candidate in resolve_or_unknown(base, environment).iter() {
            let folded = match (candidate.as_constant(), indices.as_deref()) {
                (Some(constant), Some([start])) => constant.substring(*start, None),
                (Some(constant), Some([start, end])) => constant.substring(*start, Some(*end)),
                _ => None,
            };
            let result = match folded {
                Some(constant) => SymbolicValue::make_constant(constant),
                None => call.method_representation(
                    argument_snapshot.with(base, Rc::new(vec![candidate.clone()])),
                ),
            };
            results.push(result);
        }
        Ok(Some(results))
    }
}

/// String.valueOf. Literals become string constants, anything else stands for itself.
pub struct ValueOfRecognizer;

impl StringMethodRecognizer for ValueOfRecognizer {
    fn name(&self) -> &'static str {
        "valueOf"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if call.known_name != KnownNames::StringValueOf {
            return Ok(None);
        }
        let argument = match call.arguments {
            [argument] => argument,
            _ => return Ok(Some(vec![call.method_representation_from(environment)])),
        };
        if let Some(literal) = argument.as_literal() {
            return Ok(Some(vec![SymbolicValue::make_constant(literal.value_of())]));
        }
        let mut results = copies(&resolve_or_unknown(argument, environment));
        propagate_tags_to_all(argument, &mut results, environment);
        Ok(Some(results))
    }
}

/// format on a date formatter. The result is approximated by what the formatter holds,
/// tagged with everything that was formatted.
pub struct FormatRecognizer;

impl StringMethodRecognizer for FormatRecognizer {
    fn name(&self) -> &'static str {
        "date format"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if call.known_name != KnownNames::Format {
            return Ok(None);
        }
        let base = match call.base {
            Some(base) if known_names::is_date_format_type(base.static_type()) => base,
            _ => return Ok(None),
        };
        let mut results = copies(&resolve_or_unknown(base, environment));
        for argument in call.arguments {
            for result in results.iter_mut() {
                propagate_tags(argument, result, environment);
            }
        }
        Ok(Some(results))
    }
}

/// String.toLowerCase. Case is not modeled, the receiver's values are returned as they are.
pub struct ToLowerCaseRecognizer;

impl StringMethodRecognizer for ToLowerCaseRecognizer {
    fn name(&self) -> &'static str {
        "toLowerCase"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if call.known_name != KnownNames::StringToLowerCase {
            return Ok(None);
        }
        pass_through_receiver(call, environment)
    }
}

pub struct ToStringRecognizer;

impl StringMethodRecognizer for ToStringRecognizer {
    fn name(&self) -> &'static str {
        "toString"
    }

    fn process_string_method(
        &self,
        call: &CallSite<'_>,
        environment: &Environment,
    ) -> RecognizerResult {
        if call.known_name != KnownNames::StringToString {
            return Ok(None);
        }
        pass_through_receiver(call, environment)
    }
}
