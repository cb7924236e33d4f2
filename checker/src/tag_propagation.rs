// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

// Tags flow from the values an operand resolves to onto the values computed from it.
// Recognizers call these once per contributing operand, after building their results, so
// that tags accumulate along chains of string operations.

use crate::environment::Environment;
use crate::ir::Value;
use crate::symbolic_value::SymbolicValue;

use log_derive::logfn_inputs;

/// Copies every tag of the values that source currently resolves to onto destination.
/// Tags already present are not duplicated.
#[logfn_inputs(TRACE)]
pub fn propagate_tags(source: &Value, destination: &mut SymbolicValue, environment: &Environment) {
    let tags = environment.tags_of(source);
    if !tags.is_empty() {
        destination.add_tags(&tags);
    }
}

/// Copies the tags of source onto each of the destinations.
pub fn propagate_tags_to_all(
    source: &Value,
    destinations: &mut [SymbolicValue],
    environment: &Environment,
) {
    let tags = environment.tags_of(source);
    if tags.is_empty() {
        return;
    }
    trace!("propagating {} from {} to {} values", tags, source, destinations.len());
    for destination in destinations.iter_mut() {
        destination.add_tags(&tags);
    }
}
