// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::body_visitor::{BodySummary, BodyVisitor, TaintedFlow};
use crate::ir::{MethodBody, MethodDescriptor, Program};
use crate::known_names::KnownNamesCache;
use crate::options::Options;
use crate::recognition_chain::RecognitionChain;

use log_derive::logfn;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result};
use std::time::Instant;

/// The summaries of every analyzed method body, in program order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct AnalysisReport {
    pub summaries: Vec<BodySummary>,
}

impl AnalysisReport {
    pub fn tainted_flows(&self) -> impl Iterator<Item = &TaintedFlow> {
        self.summaries.iter().flat_map(|s| s.tainted_flows.iter())
    }

    /// The summary of the body of the method whose descriptor renders as the given string.
    pub fn summary_for(&self, method: &str) -> Option<&BodySummary> {
        self.summaries.iter().find(|s| s.method == method)
    }

    pub fn merge(&mut self, other: AnalysisReport) {
        self.summaries.extend(other.summaries);
    }
}

/// A visitor that analyzes some of the method bodies of a program, one body at a time.
/// The recognizers and the known names cache are shared by all bodies.
pub struct ProgramVisitor<'options> {
    pub known_names_cache: KnownNamesCache,
    pub options: &'options Options,
    pub recognition_chain: RecognitionChain,
}

impl<'options> Debug for ProgramVisitor<'options> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        "ProgramVisitor".fmt(f)
    }
}

impl<'options> ProgramVisitor<'options> {
    pub fn new(options: &'options Options) -> ProgramVisitor<'options> {
        Self::with_recognition_chain(options, RecognitionChain::default())
    }

    pub fn with_recognition_chain(
        options: &'options Options,
        recognition_chain: RecognitionChain,
    ) -> ProgramVisitor<'options> {
        ProgramVisitor {
            known_names_cache: KnownNamesCache::create_cache(),
            options,
            recognition_chain,
        }
    }

    /// Analyze the selected method bodies of the program.
    #[logfn(TRACE)]
    pub fn analyze_program(&mut self, program: &Program) -> AnalysisReport {
        let start_instant = Instant::now();
        let mut report = AnalysisReport::default();
        for body in program.methods.iter() {
            if let Some(selection) = &self.options.single_method {
                if !Self::is_selected(selection, &body.method) {
                    debug!(
                        "skipping method {} as it is not selected for analysis",
                        body.method
                    );
                    continue;
                }
                info!("analyzing selected method {}", body.method);
            } else {
                info!("analyzing method {}", body.method);
            }
            report.summaries.push(self.analyze_body(body));
        }
        debug!(
            "analyzed {} of {} methods in {} ms",
            report.summaries.len(),
            program.methods.len(),
            start_instant.elapsed().as_millis()
        );
        report
    }

    /// Run the body visitor over the statements of the body and summarize what it found.
    pub fn analyze_body(&mut self, body: &MethodBody) -> BodySummary {
        let mut body_visitor = BodyVisitor::new(self, body);
        body_visitor.visit_body()
    }

    // We check the simple name, the qualified name and the full descriptor.
    fn is_selected(selection: &str, method: &MethodDescriptor) -> bool {
        selection == method.name
            || selection == format!("{}.{}", method.class, method.name)
            || selection == method.to_string()
    }
}
