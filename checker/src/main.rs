// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

extern crate env_logger;

#[macro_use]
extern crate log;

use symtaint::ir::Program;
use symtaint::options::{Options, OutputFormat};
use symtaint::program_visitor::{AnalysisReport, ProgramVisitor};

use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize loggers.
    if env::var("SYMTAINT_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("SYMTAINT_LOG")
            .write_style("SYMTAINT_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    // Options from the environment come first, so that the command line can override them.
    let mut options = Options::default();
    let mut program_paths = Vec::new();
    if let Ok(flags) = env::var("SYMTAINT_FLAGS") {
        program_paths.extend(options.parse_from_str(&flags).unwrap_or_else(|e| e.exit()));
    }
    let command_line_arguments: Vec<String> = env::args().skip(1).collect();
    program_paths.extend(
        options
            .parse(&command_line_arguments)
            .unwrap_or_else(|e| e.exit()),
    );
    if program_paths.is_empty() {
        return Err("no program to analyze".into());
    }
    debug!("{:?}", options);

    let mut program_visitor = ProgramVisitor::new(&options);
    let mut report = AnalysisReport::default();
    for path in program_paths.iter() {
        let program = Program::load_from_file(Path::new(path))?;
        info!("loaded {} methods from {}", program.methods.len(), path);
        report.merge(program_visitor.analyze_program(&program));
    }

    match options.output_format {
        OutputFormat::Text => {
            for flow in report.tainted_flows() {
                println!("{}", flow);
            }
            for summary in report.summaries.iter().filter(|s| s.is_incomplete) {
                eprintln!("analysis of {} is incomplete", summary.method);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
