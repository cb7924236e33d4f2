// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::k_limits;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, Error};

/// Creates the clap::Command metadata for argument parsing.
fn make_options_parser() -> Command {
    // We could put this into lazy_static! with a Mutex around, but we really do not expect
    // to construct this more then once per regular program run.
    Command::new("symtaint")
        .no_binary_name(true)
        .version("v0.1.0")
        .arg(Arg::new("single_method")
            .long("single_method")
            .num_args(1)
            .help("Focus analysis on the named method.")
            .long_help("Name is the simple name of a method, Class.name with a fully qualified class, or a full method descriptor."))
        .arg(Arg::new("body_analysis_timeout")
            .long("body_analysis_timeout")
            .num_args(1)
            .value_parser(value_parser!(u64))
            .help("The maximum number of seconds that will be spent analyzing a method body.")
            .long_help("The default is 40 seconds. Bodies that take longer are reported as incomplete."))
        .arg(Arg::new("max_values_per_entry")
            .long("max_values_per_entry")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .help("The maximum number of values a variable may hold before they are merged into an unknown value.")
            .long_help("The default is 16. Merging keeps the tags of all merged values."))
        .arg(Arg::new("output")
            .long("output")
            .num_args(1)
            .value_parser(["text", "json"])
            .help("Report format.\n")
            .long_help("With `text`, one line is printed per tainted flow.\nWith `json`, the summaries of all analyzed methods are printed.\n"))
        .arg(Arg::new("programs")
            .num_args(0..)
            .action(ArgAction::Append)
            .help("Programs to analyze, as serialized by the bytecode loader."))
}

/// Represents options passed to the analyzer.
#[derive(Debug)]
pub struct Options {
    pub single_method: Option<String>,
    pub max_analysis_time_for_body: u64,
    pub max_values_per_entry: usize,
    pub output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// One line per tainted flow.
    #[default]
    Text,
    /// The full analysis report.
    Json,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            single_method: None,
            max_analysis_time_for_body: k_limits::MAX_ANALYSIS_TIME_FOR_BODY_DEFAULT,
            max_values_per_entry: k_limits::MAX_VALUES_PER_ENTRY_DEFAULT,
            output_format: OutputFormat::Text,
        }
    }
}

impl Options {
    /// Parse options from an argument string. The argument string will be split using unix
    /// shell escaping rules. Returns the program paths found among the arguments.
    pub fn parse_from_str(&mut self, s: &str) -> Result<Vec<String>, Error> {
        let args = shellwords::split(s).map_err(|e| {
            Error::raw(
                ErrorKind::InvalidValue,
                format!("Cannot parse argument string: {:?}\n", e),
            )
        })?;
        self.parse(&args)
    }

    /// Parses options from a list of strings. Options that are not on the list keep their
    /// current values, so several lists can be parsed into the same options.
    /// Returns the program paths found among the arguments.
    pub fn parse(&mut self, args: &[String]) -> Result<Vec<String>, Error> {
        let matches = make_options_parser().try_get_matches_from(args.iter())?;
        if let Some(name) = Self::explicit::<String>(&matches, "single_method") {
            self.single_method = Some(name.clone());
        }
        if let Some(seconds) = Self::explicit::<u64>(&matches, "body_analysis_timeout") {
            self.max_analysis_time_for_body = *seconds;
        }
        if let Some(n) = Self::explicit::<usize>(&matches, "max_values_per_entry") {
            self.max_values_per_entry = *n;
        }
        if let Some(format) = Self::explicit::<String>(&matches, "output") {
            self.output_format = match format.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Text,
            };
        }
        Ok(matches
            .get_many::<String>("programs")
            .map(|programs| programs.cloned().collect())
            .unwrap_or_default())
    }

    fn explicit<'m, T: Clone + Send + Sync + 'static>(
        matches: &'m ArgMatches,
        id: &str,
    ) -> Option<&'m T> {
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            return None;
        }
        matches.get_one::<T>(id)
    }
}
