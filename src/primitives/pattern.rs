//! Delimiter pattern compiler.
//!
//! Turns a [`DelimiterConfig`] into a regex of the shape
//! `START (.*?) SEPARATOR (.*?) END`. Each delimiter is escaped so it is
//! matched literally, and `.` never matches a line terminator: scanning is
//! always done one line (or one bounded container) at a time.

use regex::Regex;

use crate::config::DelimiterConfig;

/// A compiled hidden link pattern.
#[derive(Debug, Clone)]
pub struct LinkPattern {
    delimiters: DelimiterConfig,
    /// `None` when a delimiter is empty; such a pattern matches nothing.
    regex: Option<Regex>,
}

impl LinkPattern {
    /// Compile the pattern for a delimiter configuration.
    ///
    /// Never fails. A configuration with an empty delimiter compiles to a
    /// pattern that never matches.
    pub fn compile(delimiters: &DelimiterConfig) -> Self {
        if delimiters.has_empty_delimiter() {
            tracing::warn!(
                "hidden link delimiters contain an empty string ({:?}); nothing will match",
                delimiters
            );
            return Self {
                delimiters: delimiters.clone(),
                regex: None,
            };
        }

        let source = pattern_source(delimiters);
        let regex = match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                // Escaped literals always compile; only size limits can fail here.
                tracing::warn!("failed to compile hidden link pattern {source:?}: {e}");
                None
            }
        };

        Self {
            delimiters: delimiters.clone(),
            regex,
        }
    }

    /// The delimiters this pattern was compiled from.
    pub fn delimiters(&self) -> &DelimiterConfig {
        &self.delimiters
    }

    /// True if this pattern can never match.
    pub fn is_degenerate(&self) -> bool {
        self.regex.is_none()
    }

    pub(crate) fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }

    /// Pattern source text, mostly useful for diagnostics.
    pub fn as_str(&self) -> &str {
        self.regex.as_ref().map_or("", Regex::as_str)
    }
}

impl PartialEq for LinkPattern {
    fn eq(&self, other: &Self) -> bool {
        self.delimiters == other.delimiters
    }
}

impl Eq for LinkPattern {}

/// Build the regex source for a delimiter configuration.
fn pattern_source(delimiters: &DelimiterConfig) -> String {
    // `(?-s)` pins `.` to "anything but \n"; `\r` is excluded explicitly so
    // CRLF text never folds the terminator into a capture.
    format!(
        r"(?-s){}([^\r\n]*?){}([^\r\n]*?){}",
        escape_literal(&delimiters.start),
        escape_literal(&delimiters.separator),
        escape_literal(&delimiters.end),
    )
}

/// Escape a delimiter so every character is matched literally.
///
/// `regex::escape` covers all regex metacharacters (including `-` and `/`,
/// which are harmless outside classes but escaped anyway).
fn escape_literal(literal: &str) -> String {
    regex::escape(literal)
}
