// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::environment::Environment;
use crate::ir::{Condition, Instruction, MethodBody, MethodDescriptor, Statement, Value};
use crate::program_visitor::ProgramVisitor;
use crate::recognition_chain::CallSite;
use crate::symbolic_value::{self, SymbolicValue};

use log_derive::{logfn, logfn_inputs};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter, Result};
use std::rc::Rc;
use std::time::Instant;

/// Tagged data that reaches a call that no recognizer models.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct TaintedFlow {
    /// The method whose body contains the call.
    pub method: String,
    /// The called method.
    pub callee: String,
    /// The argument that carries the tags.
    pub argument: String,
    pub tags: Vec<String>,
}

impl Display for TaintedFlow {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}: {} [{}] flows into {}",
            self.method,
            self.argument,
            self.tags.join("|"),
            self.callee
        )
    }
}

/// A value as it appears in a report.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct ReportedValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<&SymbolicValue> for ReportedValue {
    fn from(value: &SymbolicValue) -> ReportedValue {
        ReportedValue {
            value: value.get_value().to_owned(),
            tags: value.get_string_tags(),
        }
    }
}

/// What the analysis of a method body found out.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct BodySummary {
    pub method: String,
    pub return_values: Vec<ReportedValue>,
    pub tainted_flows: Vec<TaintedFlow>,
    /// True if the analysis gave up before visiting every statement.
    #[serde(default)]
    pub is_incomplete: bool,
}

/// Holds the state for the method body visitor.
pub struct BodyVisitor<'analysis, 'options> {
    pub pv: &'analysis mut ProgramVisitor<'options>,
    pub body: &'analysis MethodBody,

    // True if the time allowed for the body ran out.
    pub analysis_is_incomplete: bool,
    pub current_environment: Environment,
    pub return_values: Vec<Rc<SymbolicValue>>,
    pub start_instant: Instant,
    pub tainted_flows: Vec<TaintedFlow>,
}

impl<'analysis, 'options> Debug for BodyVisitor<'analysis, 'options> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("BodyVisitor")
    }
}

impl<'analysis, 'options> BodyVisitor<'analysis, 'options> {
    pub fn new(
        program_visitor: &'analysis mut ProgramVisitor<'options>,
        body: &'analysis MethodBody,
    ) -> BodyVisitor<'analysis, 'options> {
        let max_values_per_entry = program_visitor.options.max_values_per_entry;
        BodyVisitor {
            pv: program_visitor,
            body,
            analysis_is_incomplete: false,
            current_environment: Environment::new(max_values_per_entry),
            return_values: Vec::new(),
            start_instant: Instant::now(),
            tainted_flows: Vec::new(),
        }
    }

    /// Visits the statements of the body in order and summarizes what they do.
    /// The environment is left as it is after the last visited statement.
    #[logfn(TRACE)]
    pub fn visit_body(&mut self) -> BodySummary {
        let body = self.body;
        for statement in body.statements.iter() {
            check_for_early_break!(self);
            self.visit_statement(statement);
        }
        if self.analysis_is_incomplete {
            info!(
                "analysis of {} stopped after {} seconds",
                body.method,
                self.start_instant.elapsed().as_secs()
            );
        }
        BodySummary {
            method: body.method.to_string(),
            return_values: self
                .return_values
                .iter()
                .map(|v| ReportedValue::from(v.as_ref()))
                .collect(),
            tainted_flows: self.tainted_flows.clone(),
            is_incomplete: self.analysis_is_incomplete,
        }
    }

    #[logfn_inputs(TRACE)]
    fn visit_statement(&mut self, statement: &Statement) {
        let condition = statement.guard.clone();
        match &statement.instruction {
            Instruction::Identity { target, parameter } => {
                trace!("{} is parameter {}", target, parameter);
                let value = SymbolicValue::make_variable(target);
                self.update_value_at(target, vec![Rc::new(value)], condition);
            }
            Instruction::Assign { target, source } => {
                let values = match self.current_environment.resolve_operand(source) {
                    Some(values) => values.as_ref().clone(),
                    None => vec![Rc::new(SymbolicValue::make_variable(source))],
                };
                self.update_value_at(target, values, condition);
            }
            Instruction::FieldRead {
                target,
                base,
                field,
            } => {
                let value = SymbolicValue::make_field(base, field, &self.current_environment);
                self.update_value_at(target, vec![Rc::new(value)], condition);
            }
            Instruction::BinaryOperation {
                target,
                operator,
                left,
                right,
            } => {
                let value =
                    SymbolicValue::make_binary(left, *operator, right, &self.current_environment);
                self.update_value_at(target, vec![Rc::new(value)], condition);
            }
            Instruction::New { target, class } => {
                let value = SymbolicValue::make_object(class, &[], &self.current_environment);
                self.update_value_at(target, vec![Rc::new(value)], condition);
            }
            Instruction::Invoke {
                result,
                method,
                base,
                arguments,
            } => {
                self.visit_call(result.as_ref(), method, base.as_ref(), arguments, condition);
            }
            Instruction::Return { value } => {
                if let Some(value) = value {
                    self.visit_return(value, condition);
                }
            }
        }
    }

    /// Runs the recognition chain over the call and stores what it computes. Calls that are not
    /// recognized are represented symbolically and checked for tainted arguments.
    fn visit_call(
        &mut self,
        result: Option<&Rc<Value>>,
        method: &Rc<MethodDescriptor>,
        base: Option<&Rc<Value>>,
        arguments: &[Rc<Value>],
        condition: Option<Condition>,
    ) {
        let known_name = self.pv.known_names_cache.get(method);
        let call = CallSite::new(method, known_name, base, arguments);
        match self
            .pv
            .recognition_chain
            .recognize_string_method(&call, &self.current_environment)
        {
            Ok(Some(values)) => {
                if known_name.updates_receiver() {
                    if let Some(base) = base {
                        self.update_value_at(base, values.clone(), condition.clone());
                    }
                }
                if let Some(result) = result {
                    self.update_value_at(result, values, condition);
                }
            }
            Ok(None) => self.visit_unrecognized_call(&call, result, condition),
            Err(e) => {
                warn!("{} in {}", e, self.body.method);
                if let Some(result) = result {
                    let unknown = SymbolicValue::make_unknown_for(result);
                    self.update_value_at(result, vec![Rc::new(unknown)], condition);
                }
            }
        }
    }

    fn visit_unrecognized_call(
        &mut self,
        call: &CallSite<'_>,
        result: Option<&Rc<Value>>,
        condition: Option<Condition>,
    ) {
        for argument in call.arguments {
            let tags = self.current_environment.tags_of(argument);
            if tags.is_empty() {
                continue;
            }
            let flow = TaintedFlow {
                method: self.body.method.to_string(),
                callee: call.method.to_string(),
                argument: argument.to_string(),
                tags: tags.to_strings(),
            };
            info!("tainted flow: {}", flow);
            self.tainted_flows.push(flow);
        }
        match (call.base, result) {
            (Some(base), _) if call.method.is_constructor() => {
                let object = SymbolicValue::make_object(
                    &call.method.class,
                    call.arguments,
                    &self.current_environment,
                );
                self.update_value_at(base, vec![Rc::new(object)], condition);
            }
            (_, Some(result)) => {
                let value = call.method_representation_from(&self.current_environment);
                self.update_value_at(result, vec![Rc::new(value)], condition);
            }
            _ => {}
        }
    }

    fn visit_return(&mut self, value: &Rc<Value>, condition: Option<Condition>) {
        let values = match self.current_environment.resolve_operand(value) {
            Some(values) => values.as_ref().clone(),
            None => vec![Rc::new(SymbolicValue::make_return_value(value))],
        };
        for v in values.iter() {
            symbolic_value::add_result(&mut self.return_values, v.as_ref().clone());
        }
        self.update_value_at(&Rc::new(Value::ReturnSlot), values, condition);
    }

    fn update_value_at(
        &mut self,
        target: &Rc<Value>,
        values: Vec<Rc<SymbolicValue>>,
        condition: Option<Condition>,
    ) {
        if target.is_literal() {
            debug!("ignoring an assignment to literal {}", target);
            return;
        }
        self.current_environment
            .update_value_at(target.clone(), values, condition);
    }
}
