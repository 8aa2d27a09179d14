//! Canonical text rendering shared by node paths and query display.
//!
//! Strings are rendered the way RFC 9535 normalized paths render member
//! names: wrapped in single quotes, with `'` and `\` backslash-escaped and
//! control characters written as short escapes or `\u00XX`.
//!
//! # Examples
//!
//! ```
//! use jpq::output::quote;
//!
//! assert_eq!(quote("a"), "'a'");
//! assert_eq!(quote("it's"), r"'it\'s'");
//! ```

use std::fmt::Write;

/// Wrap `s` in single quotes, escaping as needed.
pub fn quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('\'');
    result.push_str(&escape_string(s));
    result.push('\'');
    result
}

/// Escape `s` for use inside a single quoted string.
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\'' => result.push_str("\\'"),
            '\\' => result.push_str("\\\\"),
            '\u{08}' => result.push_str("\\b"),
            '\u{0c}' => result.push_str("\\f"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                // Writing to a String cannot fail.
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}

/// Render a float so that it reads back as a float, never as an integer.
pub fn format_float(n: f64) -> String {
    // Debug formatting keeps a trailing `.0` on whole numbers.
    format!("{:?}", n)
}
