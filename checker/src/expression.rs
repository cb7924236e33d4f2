// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::constant_domain::ConstantDomain;
use crate::ir::{BinaryOperator, MethodDescriptor, Value};

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// How a symbolic value was constructed. Operands are IR values; what those values held when
/// the expression was built is recorded separately, in the snapshot of the symbolic value.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Expression {
    /// left operator right
    BinaryOperation {
        // The value of the left operand.
        left: Rc<Value>,
        operator: BinaryOperator,
        // The value of the right operand.
        right: Rc<Value>,
    },

    /// A literal, or the result of folding an operation on literals.
    CompileTimeConstant(ConstantDomain),

    /// A read of base.field.
    Field { base: Rc<Value>, field: String },

    /// The result of a call that is described rather than evaluated.
    MethodRepresentation {
        method: Rc<MethodDescriptor>,
        // None for static calls.
        base: Option<Rc<Value>>,
        arguments: Vec<Rc<Value>>,
    },

    /// An object of the given class, constructed with the given arguments.
    Object {
        class: String,
        arguments: Vec<Rc<Value>>,
    },

    /// The value that will be found in the return slot of a call.
    ReturnValue(Rc<Value>),

    /// Nothing better is known. The annotations say where the value came from.
    Unknown { annotations: Vec<String> },

    /// The value held by a variable that has no better approximation, such as a parameter.
    Variable(Rc<Value>),
}

/// The category of a symbolic value. Every expression has exactly one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ValueKind {
    Constant,
    MethodRepresentation,
    Object,
    Symbolic,
    Unknown,
}

impl Expression {
    pub fn kind(&self) -> ValueKind {
        match self {
            Expression::CompileTimeConstant(..) => ValueKind::Constant,
            Expression::MethodRepresentation { .. } => ValueKind::MethodRepresentation,
            Expression::Object { .. } => ValueKind::Object,
            Expression::BinaryOperation { .. }
            | Expression::Field { .. }
            | Expression::ReturnValue(..)
            | Expression::Variable(..) => ValueKind::Symbolic,
            Expression::Unknown { .. } => ValueKind::Unknown,
        }
    }

    /// The receiver the expression was computed from, if it has one.
    pub fn base(&self) -> Option<&Rc<Value>> {
        match self {
            Expression::Field { base, .. } => Some(base),
            Expression::MethodRepresentation { base, .. } => base.as_ref(),
            _ => None,
        }
    }

    /// The IR values whose contents the expression depends on.
    pub fn referenced_values(&self) -> Vec<&Rc<Value>> {
        match self {
            Expression::BinaryOperation { left, right, .. } => vec![left, right],
            Expression::CompileTimeConstant(..) | Expression::Unknown { .. } => vec![],
            Expression::Field { base, .. } => vec![base],
            Expression::MethodRepresentation {
                base, arguments, ..
            } => base.iter().chain(arguments.iter()).collect(),
            Expression::Object { arguments, .. } => arguments.iter().collect(),
            Expression::ReturnValue(value) | Expression::Variable(value) => vec![value],
        }
    }
}
