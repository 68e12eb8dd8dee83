//! Instruction sets handed to artifact rendering.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::StageKind;

/// Free-form options merged verbatim into the render context.
pub type RenderOptions = serde_json::Map<String, serde_json::Value>;

/// A file copied from the build context into the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySpec {
    /// Path relative to the build context.
    pub src: String,
    /// Destination inside the image.
    pub dest: String,
}

impl CopySpec {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

/// A generated script written into a build context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptArtifact {
    pub path: PathBuf,
    pub content: String,
    pub executable: bool,
}

/// Everything the renderer needs to produce one variant's image definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSet {
    /// Base image.
    pub image: String,
    /// Resolved environment string.
    pub env: String,
    pub copies: Vec<CopySpec>,
    pub runs: Vec<String>,
    pub entrypoints: Vec<String>,
}

impl InstructionSet {
    pub fn new(image: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            env: env.into(),
            ..Self::default()
        }
    }

    /// Record a stage script copied to `copy.dest`, scheduled according to `kind`.
    pub fn record(&mut self, kind: StageKind, copy: CopySpec) {
        match kind {
            StageKind::Env => {}
            StageKind::RunScript => self.runs.push(copy.dest.clone()),
            StageKind::EntrypointScript => self.entrypoints.push(copy.dest.clone()),
        }
        self.copies.push(copy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_stage_order() {
        let mut set = InstructionSet::new("alpine", "A=1");
        set.copies.push(CopySpec::new(".ssh", "$HOME/.ssh"));
        set.record(StageKind::RunScript, CopySpec::new("./files/install", "/install"));
        set.record(StageKind::EntrypointScript, CopySpec::new("./files/script", "/script"));
        set.record(
            StageKind::EntrypointScript,
            CopySpec::new("./files/after_success", "/after_success"),
        );

        let dests: Vec<&str> = set.copies.iter().map(|c| c.dest.as_str()).collect();
        assert_eq!(dests, vec!["$HOME/.ssh", "/install", "/script", "/after_success"]);
        assert_eq!(set.runs, vec!["/install"]);
        assert_eq!(set.entrypoints, vec!["/script", "/after_success"]);
    }
}
