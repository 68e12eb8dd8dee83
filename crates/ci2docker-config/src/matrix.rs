//! Environment matrix expansion.
//!
//! The `env` stage comes in two shapes:
//! - a flat list, where every entry is one matrix combination
//! - a mapping with `global` entries shared by every combination and
//!   `matrix` entries, one per combination
//!
//! Structured `global` entries (e.g. `secure: ...`) need out-of-band
//! decryption and are dropped from the resolved environment.

use crate::ci::scalar_to_string;
use crate::{ConfigError, ConfigResult};
use ci2docker_core::{EnvironmentVariant, Stage};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// The parsed `env` stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMatrix {
    globals: String,
    entries: Vec<String>,
    skipped_secure: usize,
}

impl EnvMatrix {
    /// Parse the raw `env` value of a CI document.
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => {
                let (globals, skipped_secure) = match mapping.get("global") {
                    Some(global) => parse_globals(global),
                    None => (String::new(), 0),
                };
                let entries = match mapping.get("matrix") {
                    Some(matrix) => parse_matrix(matrix)?,
                    None => Vec::new(),
                };
                Ok(Self {
                    globals,
                    entries,
                    skipped_secure,
                })
            }
            // Older documents list the matrix directly.
            other => Ok(Self {
                entries: parse_matrix(other)?,
                ..Self::default()
            }),
        }
    }

    /// Plain global assignments joined by single spaces.
    pub fn globals(&self) -> &str {
        &self.globals
    }

    /// Number of structured global entries that were dropped.
    pub fn skipped_secure(&self) -> usize {
        self.skipped_secure
    }

    /// Number of variants this matrix yields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved environment strings, in matrix order.
    pub fn resolved(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|entry| resolve(&self.globals, entry))
    }

    /// Consume the matrix into its variants, each with a directory under `root`
    /// named after its ordinal.
    pub fn into_variants(self, root: &Path) -> Variants {
        Variants {
            globals: self.globals,
            entries: self.entries.into_iter(),
            root: root.to_path_buf(),
            next_ordinal: 1,
        }
    }
}

/// Lazy sequence of environment variants.
#[derive(Debug)]
pub struct Variants {
    globals: String,
    entries: std::vec::IntoIter<String>,
    root: PathBuf,
    next_ordinal: usize,
}

impl Iterator for Variants {
    type Item = EnvironmentVariant;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        Some(EnvironmentVariant {
            ordinal,
            env: resolve(&self.globals, &entry),
            work_dir: self.root.join(ordinal.to_string()),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Variants {}

fn resolve(globals: &str, entry: &str) -> String {
    format!("{} {}", globals, entry).trim().to_string()
}

fn parse_globals(value: &Value) -> (String, usize) {
    let items: &[Value] = match value {
        Value::Null => &[],
        Value::Sequence(items) => items,
        other => std::slice::from_ref(other),
    };

    let mut globals = String::new();
    let mut skipped = 0;
    for item in items {
        match item {
            Value::String(s) => {
                globals.push(' ');
                globals.push_str(s);
            }
            Value::Mapping(_) | Value::Tagged(_) | Value::Sequence(_) => skipped += 1,
            scalar => {
                if let Some(s) = scalar_to_string(scalar) {
                    globals.push(' ');
                    globals.push_str(&s);
                }
            }
        }
    }

    (globals.trim().to_string(), skipped)
}

fn parse_matrix(value: &Value) -> ConfigResult<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                scalar_to_string(item).ok_or_else(|| {
                    ConfigError::malformed(
                        Stage::Env.name(),
                        format!("matrix entry {} is not a string", index + 1),
                    )
                })
            })
            .collect(),
        other => scalar_to_string(other).map(|s| vec![s]).ok_or_else(|| {
            ConfigError::malformed(Stage::Env.name(), "matrix must be a list of strings")
        }),
    }
}
