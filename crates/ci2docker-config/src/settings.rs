//! Caller-supplied generator settings.

use crate::expand_path;
use ci2docker_core::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_IMAGE: &str = "vauxoo/odoo-80-image-shippable-auto";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";
pub const DEFAULT_BUILD_EXTRA_ARGS: &str = "--rm";
pub const DEFAULT_RUN_EXTRA_ARGS: &str = "-itP -e LANG=C.UTF-8";

/// Name of the directory created under the system temp dir when no work root is given.
pub const DEFAULT_WORK_DIR_NAME: &str = "ci2docker";

/// Repository the generated images are built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoIdentity {
    /// Organisation or user owning the repository.
    pub owner: String,
    pub project: String,
    /// Branch name or `pull/N`.
    pub revision: String,
    /// Clone URL, when the image should check the repository out itself.
    pub url: Option<String>,
}

impl RepoIdentity {
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            revision: revision.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A host path staged into every build context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPath {
    /// Host path; may contain `~`, `$NAME` and `${NAME}`.
    pub src: String,
    /// Destination inside the image, kept verbatim.
    pub dest: String,
}

impl CopyPath {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

/// Settings owned by the calling layer and passed into the compiler as plain values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Base image declared in the image definition.
    pub image: String,
    /// User the container runs as.
    pub user: String,
    /// Root directory receiving one build context per variant.
    pub work_root: Option<String>,
    /// File name of the image definition.
    pub dockerfile_name: String,
    /// Path of the CI document, or a directory containing `.travis.yml`.
    pub config_path: Option<PathBuf>,
    pub repo: RepoIdentity,
    /// Extra git remotes added next to `origin`.
    pub remotes: Vec<String>,
    pub git_email: Option<String>,
    pub git_user: Option<String>,
    pub add_self_rsa_pub: bool,
    pub skip_after_success: bool,
    pub build_extra_args: String,
    pub run_extra_args: String,
    /// Remove the container and image once the run script finishes.
    pub include_cleanup: bool,
    pub copy_paths: Vec<CopyPath>,
    /// Additional render options; they override the generated ones.
    pub extra: RenderOptions,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            user: DEFAULT_USER.to_string(),
            work_root: None,
            dockerfile_name: DEFAULT_DOCKERFILE.to_string(),
            config_path: None,
            repo: RepoIdentity::default(),
            remotes: Vec::new(),
            git_email: None,
            git_user: None,
            add_self_rsa_pub: true,
            skip_after_success: false,
            build_extra_args: DEFAULT_BUILD_EXTRA_ARGS.to_string(),
            run_extra_args: DEFAULT_RUN_EXTRA_ARGS.to_string(),
            include_cleanup: false,
            copy_paths: vec![CopyPath::new("$HOME/.ssh", "$HOME/.ssh")],
            extra: RenderOptions::new(),
        }
    }
}

impl GeneratorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_work_root(mut self, root: impl Into<String>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_repo(mut self, repo: RepoIdentity) -> Self {
        self.repo = repo;
        self
    }

    pub fn with_remotes(mut self, remotes: Vec<String>) -> Self {
        self.remotes = remotes;
        self
    }

    pub fn with_git_identity(mut self, email: Option<String>, user: Option<String>) -> Self {
        self.git_email = email;
        self.git_user = user;
        self
    }

    pub fn with_skip_after_success(mut self, skip: bool) -> Self {
        self.skip_after_success = skip;
        self
    }

    pub fn with_build_extra_args(mut self, args: impl Into<String>) -> Self {
        self.build_extra_args = args.into();
        self
    }

    pub fn with_run_extra_args(mut self, args: impl Into<String>) -> Self {
        self.run_extra_args = args.into();
        self
    }

    pub fn with_include_cleanup(mut self, cleanup: bool) -> Self {
        self.include_cleanup = cleanup;
        self
    }

    pub fn with_copy_paths(mut self, copy_paths: Vec<CopyPath>) -> Self {
        self.copy_paths = copy_paths;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Directory receiving the build contexts, expanded.
    pub fn resolved_work_root(&self) -> PathBuf {
        match &self.work_root {
            Some(root) => expand_path(root),
            None => std::env::temp_dir().join(DEFAULT_WORK_DIR_NAME),
        }
    }

    /// CI document location; defaults to the current directory.
    pub fn resolved_config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
