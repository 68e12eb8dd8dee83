//! Exported shell variables.
//!
//! Only the simple `export NAME=VALUE` form is recognised: no multi-line
//! values, command substitution or conditionals. Values may be wrapped in a
//! single pair of quotes, which are dropped.

use regex::Regex;
use std::sync::LazyLock;

// `export`/`EXPORT`, then NAME=VALUE where VALUE is restricted to word
// characters, spaces and `. - _ / $ { } : , ( ) # *`.
static EXPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(?:export|EXPORT) +(\w*) *= *["']?([\w.\-/${}:,()#* ]*)["']?"#).unwrap()
});

/// Extract the simple `NAME=VALUE` exports from one stage line.
///
/// A line holding embedded newlines may yield several exports, one per
/// physical line that starts with the keyword.
pub fn scan_exports(line: &str) -> Vec<(String, String)> {
    EXPORT_REGEX
        .captures_iter(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Variables exported by the stages of one variant processed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportAccumulator {
    entries: Vec<(String, String)>,
}

impl ExportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Scan `line` and record every export found. Returns how many were added.
    pub fn absorb(&mut self, line: &str) -> usize {
        let found = scan_exports(line);
        let count = found.len();
        self.entries.extend(found);
        count
    }

    /// `export NAME=VALUE` lines replaying every recorded variable.
    pub fn preamble(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| format!("export {}={}", name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
