//! Pipeline stages.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Directory, relative to a build context, holding generated stage scripts.
pub const SCRIPTS_DIR: &str = "files";

/// A named step of the CI pipeline with fixed execution semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[display("env")]
    Env,
    #[display("install")]
    Install,
    #[display("script")]
    Script,
    #[display("after_success")]
    AfterSuccess,
}

/// How a stage contributes to the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Feeds the environment matrix; never produces a script.
    Env,
    /// Executed once while the image is built.
    RunScript,
    /// Executed on every container start.
    EntrypointScript,
}

impl Stage {
    /// Every recognised stage, in document order.
    pub const ALL: [Stage; 4] = [Stage::Env, Stage::Install, Stage::Script, Stage::AfterSuccess];

    /// Stages compiled into scripts, in processing order.
    pub const PIPELINE: [Stage; 3] = [Stage::Install, Stage::Script, Stage::AfterSuccess];

    /// Key of this stage in the CI document.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Env => "env",
            Stage::Install => "install",
            Stage::Script => "script",
            Stage::AfterSuccess => "after_success",
        }
    }

    /// Look up a stage by its document key.
    pub fn from_name(name: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.name() == name)
    }

    pub fn kind(self) -> StageKind {
        match self {
            Stage::Env => StageKind::Env,
            Stage::Install => StageKind::RunScript,
            Stage::Script | Stage::AfterSuccess => StageKind::EntrypointScript,
        }
    }

    /// Script location relative to the build context (e.g. `files/install`).
    pub fn script_path(self) -> String {
        format!("{}/{}", SCRIPTS_DIR, self.name())
    }

    /// Location of the script inside the image (e.g. `/install`).
    pub fn image_path(self) -> String {
        format!("/{}", self.name())
    }
}
