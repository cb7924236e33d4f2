// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use itertools::Itertools;
use log_derive::logfn_inputs;
use rpds::Vector;
use std::fmt::{Display, Formatter, Result};
use std::rc::Rc;

/// A provenance tag is an opaque label such as "#sms/#sender".
pub type Tag = Rc<str>;

/// Attached to values read from the body of a received SMS.
pub const SMS_BODY: &str = "#sms/#body";

/// Attached to values read from the sender address of a received SMS.
pub const SMS_SENDER: &str = "#sms/#sender";

/// An element of the tag domain is the set of tags that may be present on a value.
/// The only join is set union and no operation ever removes a tag, so the domain only grows
/// along a chain of derived values.
/// The set remembers insertion order so that rendering it is stable.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Hash)]
pub struct TagDomain {
    tags: Vector<Tag>,
}

/// Constructors
impl TagDomain {
    /// Construct a tag domain element representing an empty set.
    #[logfn_inputs(TRACE)]
    pub fn for_empty_set() -> TagDomain {
        TagDomain {
            tags: Vector::new(),
        }
    }

    /// Construct a tag domain element containing the single tag.
    pub fn for_tag(tag: &str) -> TagDomain {
        TagDomain::for_empty_set().add_tag(tag)
    }
}

impl Default for TagDomain {
    fn default() -> Self {
        TagDomain::for_empty_set()
    }
}

/// Transfer functions
impl TagDomain {
    /// Return a new tag domain element that also contains `tag`.
    /// Returns a copy of self if the tag is already present.
    #[logfn_inputs(TRACE)]
    #[must_use]
    pub fn add_tag(&self, tag: &str) -> Self {
        if self.has_tag(tag) {
            return self.clone();
        }
        TagDomain {
            tags: self.tags.push_back(Rc::from(tag)),
        }
    }

    /// Return the union of self and other. Tags of self come first.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        other
            .tags
            .iter()
            .fold(self.clone(), |acc, tag| acc.add_tag(tag))
    }

    /// True if `tag` is in the set.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_ref() == tag)
    }

    /// True if every tag of self is also in other.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.tags.iter().all(|t| other.has_tag(t))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// The tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.to_string()).collect()
    }
}

/// The tags separated by "|".
impl Display for TagDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.tags.iter().join("|"))
    }
}
