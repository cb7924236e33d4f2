// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::constant_domain::ConstantDomain;
use crate::environment::Environment;
use crate::expression::{Expression, ValueKind};
use crate::ir::{BinaryOperator, MethodDescriptor, Value};
use crate::k_limits;
use crate::tag_domain::TagDomain;
use crate::utils;

use itertools::Itertools;
use log_derive::logfn_inputs;
use rpds::HashTrieMap;
use std::cell::OnceCell;
use std::fmt::{Debug, Display, Formatter, Result};
use std::rc::Rc;

/// The values an IR value may hold at some program point.
pub type ValueList = Rc<Vec<Rc<SymbolicValue>>>;

/// The values that the operands of an expression held when the expression was built.
/// A snapshot is never updated, so a symbolic value does not change when the environment
/// it was built from changes later on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    map: HashTrieMap<Rc<Value>, ValueList>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            map: HashTrieMap::new(),
        }
    }
}

impl Snapshot {
    /// Records what the environment currently knows about each of the given values.
    /// Literals and unrecorded values are left out.
    pub fn capture<'a>(
        values: impl IntoIterator<Item = &'a Rc<Value>>,
        environment: &Environment,
    ) -> Snapshot {
        let mut map = HashTrieMap::new();
        for value in values {
            if value.is_literal() {
                continue;
            }
            if let Some(resolved) = environment.resolve(value) {
                map.insert_mut(value.clone(), resolved);
            }
        }
        Snapshot { map }
    }

    /// Returns a snapshot in which value is known to hold exactly the given values.
    #[must_use]
    pub fn with(&self, value: &Rc<Value>, values: ValueList) -> Snapshot {
        Snapshot {
            map: self.map.insert(value.clone(), values),
        }
    }

    pub fn get(&self, value: &Value) -> Option<&ValueList> {
        self.map.get(value)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The union of the tags of every value in the snapshot.
    fn tags(&self) -> TagDomain {
        self.map
            .values()
            .flat_map(|values| values.iter())
            .fold(TagDomain::for_empty_set(), |acc, v| acc.join(&v.tags))
    }

    fn size(&self) -> u64 {
        self.map
            .values()
            .flat_map(|values| values.iter())
            .fold(0u64, |acc, v| acc.saturating_add(v.expression_size))
    }
}

/// An approximation of what an IR value may hold at runtime, together with the provenance
/// tags of the data it may contain.
///
/// Values are built by the recognizers and the body visitor. They may be tagged and, if they
/// are unknown, annotated while they are being built, but once they are stored in the
/// environment (behind an Rc) they never change.
#[derive(Clone)]
pub struct SymbolicValue {
    // How the value was constructed.
    pub expression: Expression,
    // Keeps track of how large the rendered form of the value can get.
    pub expression_size: u64,
    tags: TagDomain,
    snapshot: Snapshot,
    rendered: OnceCell<String>,
}

impl Debug for SymbolicValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.tags.is_empty() {
            f.write_str(self.get_value())
        } else {
            write!(f, "{} [{}]", self.get_value(), self.tags)
        }
    }
}

/// The tags, separated by "|", if there are any. Otherwise the rendered value.
impl Display for SymbolicValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.tags.is_empty() {
            f.write_str(self.get_value())
        } else {
            Display::fmt(&self.tags, f)
        }
    }
}

impl PartialEq for SymbolicValue {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
            && self.tags == other.tags
            && self.snapshot == other.snapshot
    }
}

impl Eq for SymbolicValue {}

impl From<ConstantDomain> for SymbolicValue {
    fn from(constant: ConstantDomain) -> SymbolicValue {
        SymbolicValue::make_from(Expression::CompileTimeConstant(constant), Snapshot::default())
    }
}

/// Constructors
impl SymbolicValue {
    /// Creates a value from the given expression and snapshot.
    /// The value starts out with the tags of every value in the snapshot, so a value built from
    /// tainted operands is itself tainted.
    #[logfn_inputs(TRACE)]
    pub fn make_from(expression: Expression, snapshot: Snapshot) -> SymbolicValue {
        let tags = snapshot.tags();
        let expression_size = snapshot.size().saturating_add(1);
        let snapshot = if expression_size > k_limits::MAX_EXPRESSION_SIZE {
            debug!("dropping the snapshot of {:?}", expression);
            Snapshot::default()
        } else {
            snapshot
        };
        SymbolicValue {
            expression,
            expression_size: expression_size.min(k_limits::MAX_EXPRESSION_SIZE),
            tags,
            snapshot,
            rendered: OnceCell::new(),
        }
    }

    /// Creates a value from the given expression, taking the snapshot from the environment.
    pub fn make_from_environment(expression: Expression, environment: &Environment) -> SymbolicValue {
        let snapshot = Snapshot::capture(expression.referenced_values(), environment);
        Self::make_from(expression, snapshot)
    }

    pub fn make_constant(constant: ConstantDomain) -> SymbolicValue {
        constant.into()
    }

    pub fn make_field(base: &Rc<Value>, field: &str, environment: &Environment) -> SymbolicValue {
        let expression = Expression::Field {
            base: base.clone(),
            field: field.to_owned(),
        };
        Self::make_from_environment(expression, environment)
    }

    pub fn make_binary(
        left: &Rc<Value>,
        operator: BinaryOperator,
        right: &Rc<Value>,
        environment: &Environment,
    ) -> SymbolicValue {
        let expression = Expression::BinaryOperation {
            left: left.clone(),
            operator,
            right: right.clone(),
        };
        Self::make_from_environment(expression, environment)
    }

    pub fn make_object(
        class: &str,
        arguments: &[Rc<Value>],
        environment: &Environment,
    ) -> SymbolicValue {
        let expression = Expression::Object {
            class: class.to_owned(),
            arguments: arguments.to_vec(),
        };
        Self::make_from_environment(expression, environment)
    }

    /// A description of the call method(base, arguments) whose operands hold the values
    /// recorded in snapshot.
    pub fn make_method_representation(
        method: &Rc<MethodDescriptor>,
        base: Option<&Rc<Value>>,
        arguments: &[Rc<Value>],
        snapshot: Snapshot,
    ) -> SymbolicValue {
        let expression = Expression::MethodRepresentation {
            method: method.clone(),
            base: base.cloned(),
            arguments: arguments.to_vec(),
        };
        Self::make_from(expression, snapshot)
    }

    pub fn make_return_value(value: &Rc<Value>) -> SymbolicValue {
        Self::make_from(Expression::ReturnValue(value.clone()), Snapshot::default())
    }

    pub fn make_variable(value: &Rc<Value>) -> SymbolicValue {
        Self::make_from(Expression::Variable(value.clone()), Snapshot::default())
    }

    pub fn make_unknown() -> SymbolicValue {
        Self::make_from(
            Expression::Unknown {
                annotations: Vec::new(),
            },
            Snapshot::default(),
        )
    }

    /// An unknown value that remembers which IR value it stands in for.
    pub fn make_unknown_for(value: &Value) -> SymbolicValue {
        let mut result = Self::make_unknown();
        result.add_value(&value.to_string());
        result
    }
}

/// Queries
impl SymbolicValue {
    pub fn kind(&self) -> ValueKind {
        self.expression.kind()
    }

    pub fn is_constant(&self) -> bool {
        self.kind() == ValueKind::Constant
    }

    pub fn is_method_representation(&self) -> bool {
        self.kind() == ValueKind::MethodRepresentation
    }

    pub fn is_object(&self) -> bool {
        self.kind() == ValueKind::Object
    }

    pub fn is_symbolic(&self) -> bool {
        self.kind() == ValueKind::Symbolic
    }

    pub fn is_unknown(&self) -> bool {
        self.kind() == ValueKind::Unknown
    }

    /// The constant this value denotes, if it is a constant.
    pub fn as_constant(&self) -> Option<&ConstantDomain> {
        match &self.expression {
            Expression::CompileTimeConstant(constant) => Some(constant),
            _ => None,
        }
    }

    /// The receiver this value was computed from. None for values without a receiver.
    pub fn get_base(&self) -> Option<&Rc<Value>> {
        self.expression.base()
    }

    pub fn get_tags(&self) -> &TagDomain {
        &self.tags
    }

    pub fn get_string_tags(&self) -> Vec<String> {
        self.tags.to_strings()
    }

    /// True if the value carries at least one tag.
    pub fn has_tag(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.has_tag(tag)
    }

    /// What value held when this value was built, if it was recorded.
    pub fn snapshot_values(&self, value: &Value) -> Option<&ValueList> {
        self.snapshot.get(value)
    }

    /// Renders the value. The result depends only on the expression and the snapshot.
    pub fn get_value(&self) -> &str {
        self.rendered.get_or_init(|| self.render())
    }

    fn render(&self) -> String {
        match &self.expression {
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                self.render_operand(left),
                operator.symbol(),
                self.render_operand(right)
            ),
            Expression::CompileTimeConstant(constant) => constant.render(),
            Expression::Field { base, field } => {
                format!("{}.{}", self.render_operand(base), field)
            }
            Expression::MethodRepresentation {
                method,
                base,
                arguments,
            } => {
                let receiver = match base {
                    Some(base) => self.render_operand(base),
                    None => utils::simple_class_name(&method.class).to_owned(),
                };
                format!(
                    "{}.{}({})",
                    receiver,
                    method.name,
                    self.render_operands(arguments)
                )
            }
            Expression::Object { class, arguments } => format!(
                "new {}({})",
                utils::simple_class_name(class),
                self.render_operands(arguments)
            ),
            Expression::ReturnValue(value) => format!("return({})", value),
            Expression::Unknown { annotations } => {
                if annotations.is_empty() {
                    "UNKNOWN".to_owned()
                } else {
                    format!("UNKNOWN({})", annotations.join(", "))
                }
            }
            Expression::Variable(value) => value.to_string(),
        }
    }

    /// Renders an operand through the values recorded for it, falling back to the IR value.
    fn render_operand(&self, value: &Value) -> String {
        match self.snapshot.get(value) {
            Some(values) if values.len() == 1 => values[0].render_as_operand(),
            Some(values) if !values.is_empty() => {
                format!("{{{}}}", values.iter().map(|v| v.render_as_operand()).join(", "))
            }
            _ => value.to_string(),
        }
    }

    fn render_operands(&self, values: &[Rc<Value>]) -> String {
        utils::comma_separated(values.iter().map(|v| self.render_operand(v)))
    }

    /// Like get_value, but string and character constants keep their quotes.
    fn render_as_operand(&self) -> String {
        match &self.expression {
            Expression::CompileTimeConstant(constant) => constant.to_string(),
            _ => self.get_value().to_owned(),
        }
    }
}

/// Mutators. Only used while a value is being built, before it is shared.
impl SymbolicValue {
    pub fn add_tag(&mut self, tag: &str) {
        self.tags = self.tags.add_tag(tag);
    }

    pub fn add_tags(&mut self, tags: &TagDomain) {
        self.tags = self.tags.join(tags);
    }

    /// Adds an annotation to an unknown value. Other values ignore this.
    pub fn add_value(&mut self, annotation: &str) {
        if let Expression::Unknown { annotations } = &mut self.expression {
            annotations.push(annotation.to_owned());
            self.rendered = OnceCell::new();
        }
    }
}

/// Adds value to results unless a value that renders the same is already there, in which case
/// the tags of value are added to that value instead.
pub fn add_result(results: &mut Vec<Rc<SymbolicValue>>, value: SymbolicValue) {
    if let Some(existing) = results
        .iter_mut()
        .find(|v| v.get_value() == value.get_value())
    {
        if !value.tags.is_subset_of(&existing.tags) {
            Rc::make_mut(existing).add_tags(&value.tags);
        }
        return;
    }
    results.push(Rc::new(value));
}

/// Converts freshly built values into a list without duplicates.
pub fn into_results(values: Vec<SymbolicValue>) -> Vec<Rc<SymbolicValue>> {
    let mut results = Vec::with_capacity(values.len());
    for value in values {
        add_result(&mut results, value);
    }
    results
}
