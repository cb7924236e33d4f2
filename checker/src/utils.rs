// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use itertools::Itertools;
use log_derive::logfn;

pub const JAVA_LANG_STRING: &str = "java.lang.String";
pub const JAVA_LANG_STRING_BUILDER: &str = "java.lang.StringBuilder";
pub const JAVA_LANG_STRING_BUFFER: &str = "java.lang.StringBuffer";

/// The name the IR gives to instance and class constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Renders a double the way Double.toString does: plain decimal notation with at least one
/// fractional digit for magnitudes in [1e-3, 1e7), computerized scientific notation otherwise.
#[logfn(TRACE)]
pub fn java_double_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_owned();
    }
    if value == 0.0 {
        let text = if value.is_sign_negative() { "-0.0" } else { "0.0" };
        return text.to_owned();
    }
    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let mut result = format!("{}", value);
        if !result.contains('.') {
            result.push_str(".0");
        }
        return result;
    }
    // {:e} yields the shortest digits that round trip, e.g. 1.5e-4 or 1e7.
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

/// Quotes text the way it would appear in source: quote characters and backslashes are
/// escaped, control characters use the named escapes or \uXXXX.
pub fn java_quoted(text: &str, quote: char) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push(quote);
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            c if c == quote => {
                result.push('\\');
                result.push(c);
            }
            c if c.is_control() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    result.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => result.push(c),
        }
    }
    result.push(quote);
    result
}

/// The last segment of a fully qualified class name.
pub fn simple_class_name(class_name: &str) -> &str {
    class_name.rsplit('.').next().unwrap_or(class_name)
}

/// Renders a list of items separated by commas, as in an argument list.
pub fn comma_separated<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|item| item.to_string()).join(", ")
}
