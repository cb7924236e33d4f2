// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

// The slice of the bytecode IR that the engine consumes. Instances are produced by an
// external loader; here they are only deserialized and visited.

use crate::analysis_error::AnalysisError;
use crate::constant_domain::ConstantDomain;
use crate::utils;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::path::Path;
use std::rc::Rc;

/// An operand or assignment target in the IR.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Value {
    /// A local variable (or stack slot) together with the type the loader inferred for it.
    /// Different loader phases may infer different types for the same local, so two locals
    /// with the same name need not compare equal even though they print the same.
    Local { name: String, var_type: String },
    /// A literal operand.
    Literal(ConstantDomain),
    /// The slot that receives the values returned by the current method body.
    ReturnSlot,
}

/// Constructors
impl Value {
    pub fn local(name: &str, var_type: &str) -> Rc<Value> {
        Rc::new(Value::Local {
            name: name.to_owned(),
            var_type: var_type.to_owned(),
        })
    }

    pub fn literal(constant: ConstantDomain) -> Rc<Value> {
        Rc::new(Value::Literal(constant))
    }
}

/// Queries
impl Value {
    /// The literal this value denotes, if it is a literal operand.
    pub fn as_literal(&self) -> Option<&ConstantDomain> {
        match self {
            Value::Literal(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Value::Literal(..))
    }

    /// The declared type of the value.
    pub fn static_type(&self) -> &str {
        match self {
            Value::Local { var_type, .. } => var_type.as_str(),
            Value::Literal(constant) => constant.static_type(),
            Value::ReturnSlot => "",
        }
    }
}

/// The canonical textual form of the value. This is also the key of the secondary index that
/// the environment uses to match values that are equal in print but not in structure.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Value::Local { name, .. } => f.write_str(name),
            Value::Literal(constant) => Display::fmt(constant, f),
            Value::ReturnSlot => f.write_str("@return"),
        }
    }
}

/// The signature of a called method.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MethodDescriptor {
    /// The fully qualified name of the declaring class.
    pub class: String,
    pub name: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default = "MethodDescriptor::void_type")]
    pub return_type: String,
}

/// Constructors
impl MethodDescriptor {
    pub fn new(
        class: &str,
        name: &str,
        parameter_types: &[&str],
        return_type: &str,
    ) -> Rc<MethodDescriptor> {
        Rc::new(MethodDescriptor {
            class: class.to_owned(),
            name: name.to_owned(),
            parameter_types: parameter_types.iter().map(|t| (*t).to_owned()).collect(),
            return_type: return_type.to_owned(),
        })
    }

    fn void_type() -> String {
        "void".to_owned()
    }
}

impl MethodDescriptor {
    pub fn is_constructor(&self) -> bool {
        self.name == utils::CONSTRUCTOR_NAME
    }

    /// Descriptors without a declaring class or a name can only come from a broken loader.
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        if self.class.is_empty() || self.name.is_empty() {
            return Err(AnalysisError::MalformedMethodDescriptor(self.to_string()));
        }
        Ok(())
    }
}

/// Renders the descriptor as <class: return_type name(parameter_types)>.
impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "<{}: {} {}({})>",
            self.class,
            self.return_type,
            self.name,
            self.parameter_types.join(",")
        )
    }
}

/// An opaque path condition. The engine never interprets it, it only compares it.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct Condition(pub String);

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BinaryOperator {
    Add,
    And,
    Cmp,
    Div,
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Mul,
    Ne,
    Or,
    Rem,
    Shl,
    Shr,
    Sub,
    Ushr,
    Xor,
}

impl BinaryOperator {
    /// The symbol the IR printer uses for the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::And => "&",
            BinaryOperator::Cmp => "cmp",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Mul => "*",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Or => "|",
            BinaryOperator::Rem => "%",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Sub => "-",
            BinaryOperator::Ushr => ">>>",
            BinaryOperator::Xor => "^",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub enum Instruction {
    /// target := @parameterN
    Identity { target: Rc<Value>, parameter: usize },
    /// target = source
    Assign { target: Rc<Value>, source: Rc<Value> },
    /// target = base.field
    FieldRead {
        target: Rc<Value>,
        base: Rc<Value>,
        field: String,
    },
    /// target = left operator right
    BinaryOperation {
        target: Rc<Value>,
        operator: BinaryOperator,
        left: Rc<Value>,
        right: Rc<Value>,
    },
    /// target = new class. The constructor call follows as a separate Invoke.
    New { target: Rc<Value>, class: String },
    /// result = base.method(arguments), or a static call if there is no base.
    Invoke {
        #[serde(default)]
        result: Option<Rc<Value>>,
        method: Rc<MethodDescriptor>,
        #[serde(default)]
        base: Option<Rc<Value>>,
        #[serde(default)]
        arguments: Vec<Rc<Value>>,
    },
    /// return value
    Return {
        #[serde(default)]
        value: Option<Rc<Value>>,
    },
}

/// An instruction together with the path condition that guards it, if the loader knows one.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct Statement {
    #[serde(default)]
    pub guard: Option<Condition>,
    pub instruction: Instruction,
}

impl From<Instruction> for Statement {
    fn from(instruction: Instruction) -> Statement {
        Statement {
            guard: None,
            instruction,
        }
    }
}

/// The statements of one method, in visitation order.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct MethodBody {
    pub method: Rc<MethodDescriptor>,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    #[serde(default)]
    pub methods: Vec<MethodBody>,
}

impl Program {
    /// Reads a program that the loader serialized as JSON.
    pub fn load_from_file(path: &Path) -> std::result::Result<Program, AnalysisError> {
        let contents = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&contents).map_err(|e| match e {
            AnalysisError::Json { source, .. } => AnalysisError::Json {
                path: path.display().to_string(),
                source,
            },
            e => e,
        })
    }

    pub fn load_from_str(contents: &str) -> std::result::Result<Program, AnalysisError> {
        serde_json::from_str(contents).map_err(|source| AnalysisError::Json {
            path: String::new(),
            source,
        })
    }
}
