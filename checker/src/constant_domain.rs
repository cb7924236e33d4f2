// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils;

use log_derive::logfn_inputs;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter, Result};

/// Text that upstream passes splice into string literals they could not resolve.
/// A literal containing it is not a real constant and must never be folded.
pub const UNKNOWN_STRING: &str = "UNKNOWN_STRING";

/// Abstracts over the literal operands found in the bytecode IR.
/// Integral literals of every width are widened to I64, floating point literals are
/// stored as the bits of an f64 to make them comparable and hashable.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialOrd, PartialEq, Hash, Ord)]
pub enum ConstantDomain {
    /// A 16 bit character.
    Char(char),
    /// The Boolean value false.
    False,
    /// 64 bit floating point, stored as a u64 to make it comparable.
    F64(u64),
    /// Any integral literal: byte, short, int or long.
    I64(i64),
    /// The null reference.
    Null,
    /// A string literal.
    Str(String),
    /// The Boolean true value.
    True,
}

/// Constructors
impl ConstantDomain {
    /// Returns a constant for a floating point literal.
    pub fn for_f64(value: f64) -> ConstantDomain {
        ConstantDomain::F64(value.to_bits())
    }

    /// Returns a constant for a string literal.
    pub fn for_str(value: &str) -> ConstantDomain {
        ConstantDomain::Str(value.to_owned())
    }
}

impl From<bool> for ConstantDomain {
    fn from(b: bool) -> ConstantDomain {
        if b {
            ConstantDomain::True
        } else {
            ConstantDomain::False
        }
    }
}

impl From<i64> for ConstantDomain {
    fn from(i: i64) -> ConstantDomain {
        ConstantDomain::I64(i)
    }
}

impl From<&str> for ConstantDomain {
    fn from(s: &str) -> ConstantDomain {
        ConstantDomain::for_str(s)
    }
}

/// The literal form, with quotes around strings and characters.
impl Display for ConstantDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ConstantDomain::Char(c) => f.write_str(&utils::java_quoted(&c.to_string(), '\'')),
            ConstantDomain::Str(s) => f.write_str(&utils::java_quoted(s, '"')),
            _ => f.write_str(&self.render()),
        }
    }
}

/// Queries
impl ConstantDomain {
    /// The integral value of this constant, if it has one.
    pub fn as_int_if_known(&self) -> Option<i64> {
        match self {
            ConstantDomain::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// The string value of this constant, if it is a string literal.
    pub fn as_str_if_known(&self) -> Option<&str> {
        match self {
            ConstantDomain::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True if this is a string literal that was spliced together from unresolved text.
    pub fn contains_unknown_string(&self) -> bool {
        self.as_str_if_known()
            .map(|s| s.contains(UNKNOWN_STRING))
            .unwrap_or(false)
    }

    /// The text the managed runtime produces when this constant is converted to a string.
    pub fn render(&self) -> String {
        match self {
            ConstantDomain::Char(c) => c.to_string(),
            ConstantDomain::False => "false".to_owned(),
            ConstantDomain::F64(bits) => utils::java_double_to_string(f64::from_bits(*bits)),
            ConstantDomain::I64(i) => i.to_string(),
            ConstantDomain::Null => "null".to_owned(),
            ConstantDomain::Str(s) => s.clone(),
            ConstantDomain::True => "true".to_owned(),
        }
    }

    /// The name of the type the literal has in the IR.
    pub fn static_type(&self) -> &'static str {
        match self {
            ConstantDomain::Char(..) => "char",
            ConstantDomain::False | ConstantDomain::True => "boolean",
            ConstantDomain::F64(..) => "double",
            ConstantDomain::I64(..) => "int",
            ConstantDomain::Null => "null_type",
            ConstantDomain::Str(..) => utils::JAVA_LANG_STRING,
        }
    }
}

/// Transfer functions
impl ConstantDomain {
    /// Returns the string constant that results from appending other to self.
    #[logfn_inputs(TRACE)]
    pub fn concat(&self, other: &Self) -> Self {
        let mut result = self.render();
        result.push_str(&other.render());
        ConstantDomain::Str(result)
    }

    /// Returns self.substring(start) or self.substring(start, end) if self is a string literal
    /// and the indices are within bounds. Indices count UTF-16 code units.
    /// Returns None where the runtime would throw, if a bound splits a surrogate pair,
    /// or if self is not a foldable string.
    #[logfn_inputs(TRACE)]
    pub fn substring(&self, start: i64, end: Option<i64>) -> Option<Self> {
        if self.contains_unknown_string() {
            return None;
        }
        let s = self.as_str_if_known()?;
        let units: Vec<u16> = s.encode_utf16().collect();
        let length = units.len() as i64;
        let end = end.unwrap_or(length);
        if start < 0 || end > length || start > end {
            debug!("substring({}, {}) is out of bounds for {:?}", start, end, s);
            return None;
        }
        let result = String::from_utf16(&units[start as usize..end as usize]).ok();
        if result.is_none() {
            debug!("substring({}, {}) splits a surrogate pair in {:?}", start, end, s);
        }
        result.map(ConstantDomain::Str)
    }

    /// Returns the string constant that String.valueOf would produce for this literal.
    pub fn value_of(&self) -> Self {
        ConstantDomain::Str(self.render())
    }
}
