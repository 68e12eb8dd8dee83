//! CI document loading.

use crate::{ConfigError, ConfigResult, EnvMatrix};
use ci2docker_core::{Stage, StageKind};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File looked up when the config path points at a directory.
pub const DEFAULT_CONFIG_FILE: &str = ".travis.yml";

/// A parsed CI document.
#[derive(Debug, Clone, Default)]
pub struct CiConfig {
    /// The `env` stage.
    pub env: EnvMatrix,
    /// Lines of every script-producing stage present in the document.
    pub stages: HashMap<Stage, Vec<String>>,
}

impl CiConfig {
    /// Load the CI document at `path`.
    ///
    /// A directory is searched for `.travis.yml`. Returns `Ok(None)` when no
    /// regular file exists there; callers treat that as nothing to build.
    pub fn load(path: &Path) -> ConfigResult<Option<Self>> {
        let Some(path) = resolve_config_path(path) else {
            warn!(path = %path.display(), "CI config not found, nothing to build");
            return Ok(None);
        };

        debug!(path = %path.display(), "Loading CI config");
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map(Some)
    }

    /// Parse a CI document from YAML text.
    pub fn parse(yaml: &str) -> ConfigResult<Self> {
        let doc: Value = serde_yaml::from_str(yaml)?;

        let mapping = match doc {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(ConfigError::InvalidDocument(
                    "top level must be a mapping".to_string(),
                ));
            }
        };

        let mut config = Self::default();
        for (key, value) in &mapping {
            let Some(stage) = key.as_str().and_then(Stage::from_name) else {
                continue; // Ignore unknown keys
            };

            match stage.kind() {
                StageKind::Env => {
                    config.env = EnvMatrix::from_value(value)?;
                }
                StageKind::RunScript | StageKind::EntrypointScript => {
                    if let Some(lines) = stage_lines(stage, value)? {
                        config.stages.insert(stage, lines);
                    }
                }
            }
        }

        Ok(config)
    }

    /// Lines of `stage`, or `None` when the document does not define it.
    pub fn lines(&self, stage: Stage) -> Option<&[String]> {
        self.stages.get(&stage).map(Vec::as_slice)
    }
}

/// Resolve the file a config path refers to.
pub fn resolve_config_path(path: &Path) -> Option<PathBuf> {
    let path = if path.is_dir() {
        path.join(DEFAULT_CONFIG_FILE)
    } else {
        path.to_path_buf()
    };

    path.is_file().then_some(path)
}

/// Normalize a stage value to its ordered lines.
fn stage_lines(stage: Stage, value: &Value) -> ConfigResult<Option<Vec<String>>> {
    match value {
        Value::Null => Ok(None),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                scalar_to_string(item).ok_or_else(|| {
                    ConfigError::malformed(
                        stage.name(),
                        format!("entry {} is not a string", index + 1),
                    )
                })
            })
            .collect::<ConfigResult<Vec<_>>>()
            .map(Some),
        other => scalar_to_string(other).map(|line| Some(vec![line])).ok_or_else(|| {
            ConfigError::malformed(stage.name(), "expected a string or a list of strings")
        }),
    }
}

/// String form of a YAML scalar; `None` for structured values.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stages() {
        let yaml = r#"
language: python
install:
  - export FOO=bar
  - echo hi
script: echo again
after_success:
"#;

        let config = CiConfig::parse(yaml).unwrap();
        assert_eq!(
            config.lines(Stage::Install).unwrap(),
            &["export FOO=bar".to_string(), "echo hi".to_string()]
        );
        assert_eq!(config.lines(Stage::Script).unwrap(), &["echo again".to_string()]);
        assert!(config.lines(Stage::AfterSuccess).is_none());
        assert!(config.env.is_empty());
    }

    #[test]
    fn test_scalar_entries_are_stringified() {
        let config = CiConfig::parse("script:\n  - true\n  - 42\n").unwrap();
        assert_eq!(
            config.lines(Stage::Script).unwrap(),
            &["true".to_string(), "42".to_string()]
        );
    }

    #[test]
    fn test_malformed_stage() {
        let result = CiConfig::parse("install:\n  cmd: echo hi\n");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::MalformedStage { stage, .. } if stage == "install"
        ));

        let result = CiConfig::parse("script:\n  - echo ok\n  - nested: value\n");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::MalformedStage { stage, .. } if stage == "script"
        ));
    }

    #[test]
    fn test_empty_document() {
        let config = CiConfig::parse("").unwrap();
        assert!(config.stages.is_empty());
        assert!(config.env.is_empty());
    }

    #[test]
    fn test_invalid_document() {
        let result = CiConfig::parse("- just\n- a list\n");
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidDocument(_)));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CiConfig::load(&dir.path().join("nope.yml")).unwrap().is_none());
        // A directory without .travis.yml
        assert!(CiConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "env:\n  - A=1\nscript: make\n",
        )
        .unwrap();

        let config = CiConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.env.len(), 1);
        assert_eq!(config.lines(Stage::Script).unwrap(), &["make".to_string()]);
    }
}
