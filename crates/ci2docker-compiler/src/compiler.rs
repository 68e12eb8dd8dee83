//! Variant driver.

use crate::copy::resolve_copies;
use crate::fs::{strip_blank_edges, write_artifact};
use crate::render::keys;
use crate::scripts::write_helper_scripts;
use crate::section::{VariantContext, compile_stage};
use crate::{AskamaRenderer, CompileResult, RenderContext, Renderer};
use ci2docker_config::{CiConfig, GeneratorSettings};
use ci2docker_core::{EnvironmentVariant, InstructionSet, RenderOptions, Stage};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Entrypoint script, relative to the build context.
pub const ENTRYPOINT_SCRIPT: &str = "files/entrypoint.sh";

/// Compiles a CI document into one build context per environment variant.
///
/// All per-variant state lives in a [`VariantContext`], so a compiler can be
/// shared; variants are still produced one after the other.
pub struct Compiler<R: Renderer = AskamaRenderer> {
    settings: GeneratorSettings,
    renderer: R,
}

impl Compiler {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self::with_renderer(settings, AskamaRenderer)
    }
}

impl<R: Renderer> Compiler<R> {
    pub fn with_renderer(settings: GeneratorSettings, renderer: R) -> Self {
        Self { settings, renderer }
    }

    /// Load the configured CI document and compile every variant.
    ///
    /// Returns the generated build context directories in matrix order. A
    /// missing CI document yields no directories.
    pub fn compile(&self) -> CompileResult<Vec<PathBuf>> {
        let path = self.settings.resolved_config_path();
        match CiConfig::load(&path)? {
            Some(config) => self.compile_config(&config),
            None => Ok(Vec::new()),
        }
    }

    /// Compile every variant of an already parsed document.
    pub fn compile_config(&self, config: &CiConfig) -> CompileResult<Vec<PathBuf>> {
        if config.env.skipped_secure() > 0 {
            warn!(
                count = config.env.skipped_secure(),
                "Skipping secure global variables, they cannot be decrypted at build time"
            );
        }
        if config.env.is_empty() {
            info!("Environment matrix is empty, nothing to build");
            return Ok(Vec::new());
        }

        let root = self.settings.resolved_work_root();
        std::fs::create_dir_all(&root)?;
        info!(root = %root.display(), variants = config.env.len(), "Generating build contexts");

        let mut work_dirs = Vec::with_capacity(config.env.len());
        for variant in config.env.clone().into_variants(&root) {
            let ordinal = variant.ordinal;
            let work_dir = self
                .compile_variant(config, variant)
                .map_err(|e| e.in_variant(ordinal))?;
            work_dirs.push(work_dir);
        }

        Ok(work_dirs)
    }

    /// Write every artifact of one variant and return its build context.
    pub fn compile_variant(
        &self,
        config: &CiConfig,
        variant: EnvironmentVariant,
    ) -> CompileResult<PathBuf> {
        info!(
            ordinal = variant.ordinal,
            env = %variant.env,
            dir = %variant.work_dir.display(),
            "Compiling variant"
        );
        std::fs::create_dir_all(&variant.work_dir)?;

        let mut instructions = InstructionSet::new(&self.settings.image, &variant.env);
        instructions.copies = resolve_copies(&self.settings.copy_paths, &variant.work_dir)?;

        let mut ctx = VariantContext::new(variant);
        for stage in Stage::PIPELINE {
            if self.settings.skip_after_success && stage == Stage::AfterSuccess {
                debug!(stage = %stage, "Skipping stage");
                continue;
            }
            if let Some(output) = compile_stage(&mut ctx, stage, config.lines(stage))? {
                instructions.record(output.kind, output.copy);
            }
        }

        let work_dir = ctx.variant.work_dir.clone();
        let options = self.render_options();
        let render_ctx = RenderContext {
            instructions: &instructions,
            entrypoint_path: ENTRYPOINT_SCRIPT,
            options: &options,
        };

        let dockerfile = self.renderer.image_definition(&render_ctx)?;
        write_artifact(
            &work_dir.join(&self.settings.dockerfile_name),
            format!("{}\n", strip_blank_edges(&dockerfile)),
            false,
        )?;

        let entrypoint = self.renderer.entrypoint(&render_ctx)?;
        write_artifact(
            &work_dir.join(ENTRYPOINT_SCRIPT),
            format!("{}\n", strip_blank_edges(&entrypoint)),
            true,
        )?;

        write_helper_scripts(&self.renderer, &ctx.variant, &self.settings)?;

        Ok(work_dir)
    }

    /// Options handed to the renderer: generated values, then caller extras.
    fn render_options(&self) -> RenderOptions {
        let settings = &self.settings;
        let mut options = RenderOptions::new();
        options.insert(keys::USER.to_string(), json!(settings.user));
        options.insert(keys::REPO_OWNER.to_string(), json!(settings.repo.owner));
        options.insert(keys::REPO_PROJECT.to_string(), json!(settings.repo.project));
        options.insert(keys::REVISION.to_string(), json!(settings.repo.revision));
        if let Some(url) = &settings.repo.url {
            options.insert(keys::GIT_URL.to_string(), json!(url));
        }
        options.insert(keys::REMOTES.to_string(), json!(settings.remotes));
        if let Some(email) = &settings.git_email {
            options.insert(keys::GIT_EMAIL.to_string(), json!(email));
        }
        if let Some(user) = &settings.git_user {
            options.insert(keys::GIT_USER.to_string(), json!(user));
        }
        options.insert(
            keys::ADD_SELF_RSA_PUB.to_string(),
            Value::Bool(settings.add_self_rsa_pub),
        );

        for (key, value) in &settings.extra {
            options.insert(key.clone(), value.clone());
        }
        options
    }
}
