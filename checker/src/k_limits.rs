// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

// Somewhat arbitrary constants used to limit things in the engine that may
// take too long or use too much memory.

/// Rendering a symbolic value expands the values in its snapshot, which expand theirs.
/// Beyond this size the snapshot is dropped and operands render as plain IR values.
pub const MAX_EXPRESSION_SIZE: u64 = 1_000;

/// An entry of the environment that would hold more values than this is collapsed into
/// a single unknown value that keeps their tags.
pub const MAX_VALUES_PER_ENTRY_DEFAULT: usize = 16;

/// The number of seconds the body visitor may spend on a single method body.
pub const MAX_ANALYSIS_TIME_FOR_BODY_DEFAULT: u64 = 40;
