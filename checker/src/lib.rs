// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.
//
// Approximates what the variables of a managed bytecode program may hold and which of them
// may contain data from privacy sensitive sources. The program is visited one method body at
// a time. Calls to library methods that build and transform strings are modeled by a chain of
// recognizers, so that provenance tags survive string manipulation.

#[macro_use]
extern crate log;

/// If the analysis of the current body has already been given up on, or if the time taken to
/// analyze the current body exceeded the limit given in the options, break out of the current
/// loop. When a timeout happens, the current body is marked as incompletely analyzed.
macro_rules! check_for_early_break {
    ($sel:expr) => {
        if $sel.analysis_is_incomplete {
            break;
        }
        let elapsed_time_in_seconds = $sel.start_instant.elapsed().as_secs();
        if elapsed_time_in_seconds >= $sel.pv.options.max_analysis_time_for_body {
            $sel.analysis_is_incomplete = true;
            break;
        }
    };
}

pub mod analysis_error;
pub mod body_visitor;
pub mod constant_domain;
pub mod environment;
pub mod expression;
pub mod ir;
pub mod k_limits;
pub mod known_names;
pub mod options;
pub mod program_visitor;
pub mod recognition_chain;
pub mod string_recognizers;
pub mod symbolic_value;
pub mod tag_domain;
pub mod tag_propagation;
pub mod utils;
