// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::constant_domain::ConstantDomain;
use crate::ir::{Condition, Value};
use crate::k_limits;
use crate::symbolic_value::{SymbolicValue, ValueList};
use crate::tag_domain::TagDomain;

use log_derive::{logfn, logfn_inputs};
use rpds::{HashTrieMap, Vector};
use std::fmt::{Debug, Formatter, Result};
use std::rc::Rc;

/// The values an IR value was given over time, each with the path condition (if any) under
/// which it was given.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextualValues {
    entries: Vector<(Option<Condition>, ValueList)>,
}

/// Constructors
impl ContextualValues {
    pub fn new(condition: Option<Condition>, values: ValueList) -> ContextualValues {
        ContextualValues {
            entries: Vector::new().push_back((condition, values)),
        }
    }
}

/// Methods
impl ContextualValues {
    /// Returns a copy of self with a more recent entry.
    #[must_use]
    pub fn record(&self, condition: Option<Condition>, values: ValueList) -> ContextualValues {
        ContextualValues {
            entries: self.entries.push_back((condition, values)),
        }
    }

    /// Returns the most recent values that are consistent with the given condition.
    /// Without a condition that is simply the most recent entry. With a condition, it is the
    /// most recent entry that was recorded unconditionally or under that same condition.
    #[logfn_inputs(TRACE)]
    pub fn get_last_coherent_values(&self, condition: Option<&Condition>) -> Option<ValueList> {
        (0..self.entries.len())
            .rev()
            .filter_map(|i| self.entries.get(i))
            .find(|(entry_condition, _)| match (condition, entry_condition) {
                (None, _) | (Some(_), None) => true,
                (Some(c), Some(ec)) => c == ec,
            })
            .map(|(_, values)| values.clone())
    }

    /// The number of times the value was given values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps IR values to the symbolic values they may hold at the current program point.
///
/// The same logical IR value can reach the environment as structurally different objects that
/// print the same, for instance a local whose inferred type was refined between loader phases.
/// Lookups that miss on the value itself are retried through a secondary index keyed by the
/// canonical (printed) form of the value, which resolves to the value most recently written
/// under that form.
#[derive(Clone, Eq, PartialEq)]
pub struct Environment {
    value_map: HashTrieMap<Rc<Value>, ContextualValues>,
    canonical_index: HashTrieMap<String, Rc<Value>>,
    max_values_per_entry: usize,
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_map()
            .entries(
                self.value_map
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.get_last_coherent_values(None))),
            )
            .finish()
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new(k_limits::MAX_VALUES_PER_ENTRY_DEFAULT)
    }
}

/// Constructors
impl Environment {
    pub fn new(max_values_per_entry: usize) -> Environment {
        Environment {
            value_map: HashTrieMap::new(),
            canonical_index: HashTrieMap::new(),
            max_values_per_entry,
        }
    }
}

/// Methods
impl Environment {
    /// Returns the contextual values recorded for the given value, if there are any.
    #[logfn(TRACE)]
    pub fn get(&self, value: &Value) -> Option<&ContextualValues> {
        if let Some(contextual_values) = self.value_map.get(value) {
            return Some(contextual_values);
        }
        let canonical_value = self.canonical_index.get(&value.to_string())?;
        debug!(
            "found {} through its canonical form, stored as {:?}",
            value, canonical_value
        );
        self.value_map.get(&**canonical_value)
    }

    /// The most recent values recorded for value, ignoring path conditions.
    /// None if the value has never been recorded.
    pub fn resolve(&self, value: &Value) -> Option<ValueList> {
        self.get(value)
            .and_then(|contextual_values| contextual_values.get_last_coherent_values(None))
    }

    /// Like resolve, but a literal resolves to the constant it denotes.
    pub fn resolve_operand(&self, value: &Value) -> Option<ValueList> {
        match value {
            Value::Literal(constant) => Some(Self::constant_list(constant)),
            _ => self.resolve(value),
        }
    }

    /// The union of the tags of the values that value resolves to.
    pub fn tags_of(&self, value: &Value) -> TagDomain {
        self.resolve(value)
            .map(|values| {
                values
                    .iter()
                    .fold(TagDomain::for_empty_set(), |acc, v| acc.join(v.get_tags()))
            })
            .unwrap_or_default()
    }

    /// Records that value now holds the given values, under the given condition if there is one.
    /// If there are more values than the entry limit allows, they are replaced by a single
    /// unknown value that carries all of their tags.
    #[logfn_inputs(TRACE)]
    pub fn update_value_at(
        &mut self,
        value: Rc<Value>,
        values: Vec<Rc<SymbolicValue>>,
        condition: Option<Condition>,
    ) {
        let values = if values.len() > self.max_values_per_entry {
            debug!(
                "{} values for {} exceed the limit of {}",
                values.len(),
                value,
                self.max_values_per_entry
            );
            let mut unknown = SymbolicValue::make_unknown_for(&value);
            for v in values.iter() {
                unknown.add_tags(v.get_tags());
            }
            vec![Rc::new(unknown)]
        } else {
            values
        };
        let values = Rc::new(values);
        let contextual_values = match self.value_map.get(&value) {
            Some(existing) => existing.record(condition, values),
            None => ContextualValues::new(condition, values),
        };
        self.canonical_index
            .insert_mut(value.to_string(), value.clone());
        self.value_map.insert_mut(value, contextual_values);
    }

    /// The values that have been recorded, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Rc<Value>, &ContextualValues)> {
        self.value_map.iter()
    }

    pub fn len(&self) -> usize {
        self.value_map.size()
    }

    pub fn is_empty(&self) -> bool {
        self.value_map.is_empty()
    }

    fn constant_list(constant: &ConstantDomain) -> ValueList {
        Rc::new(vec![Rc::new(SymbolicValue::make_constant(constant.clone()))])
    }
}
