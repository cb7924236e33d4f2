// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors that indicate a broken input rather than an imprecise one.
/// Imprecision never produces an error: it degrades to a method representation or an
/// unknown value. The body visitor logs these, treats the affected result as unknown and
/// carries on with the next statement.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed method descriptor {0}")]
    MalformedMethodDescriptor(String),

    #[error("call to instance method {0} has no receiver")]
    MissingReceiver(String),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse program {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
