//! Stage compilation.
//!
//! Each variant owns a [`VariantContext`] holding its build context and the
//! variables exported by stages compiled so far. Stages must be compiled in
//! pipeline order: a script only sees exports from the stages before it.

use crate::fs::write_artifact;
use crate::{CompileError, CompileResult};
use ci2docker_config::ExportAccumulator;
use ci2docker_core::{CopySpec, EnvironmentVariant, ScriptArtifact, Stage, StageKind};
use tracing::debug;

/// Mutable state scoped to the variant being compiled.
#[derive(Debug, Clone)]
pub struct VariantContext {
    pub variant: EnvironmentVariant,
    pub exports: ExportAccumulator,
}

impl VariantContext {
    /// Start a variant with no exported variables.
    pub fn new(variant: EnvironmentVariant) -> Self {
        Self {
            variant,
            exports: ExportAccumulator::new(),
        }
    }
}

/// What one compiled stage contributes to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub stage: Stage,
    pub kind: StageKind,
    pub script: ScriptArtifact,
    pub copy: CopySpec,
}

/// Compile `stage` for the variant in `ctx`.
///
/// Returns `None` when the stage produces no script: `env`, or a stage the
/// document does not define. Otherwise the script is written to
/// `files/<stage>` inside the build context and marked executable.
pub fn compile_stage(
    ctx: &mut VariantContext,
    stage: Stage,
    lines: Option<&[String]>,
) -> CompileResult<Option<StageOutput>> {
    let kind = stage.kind();
    match kind {
        StageKind::Env => return Ok(None),
        StageKind::RunScript | StageKind::EntrypointScript => {}
    }
    let Some(lines) = lines else {
        return Ok(None);
    };

    // Earlier exports first; this stage's own exports only reach later stages.
    let mut content: Vec<String> = ctx.exports.preamble().collect();
    content.extend(lines.iter().cloned());
    for line in lines {
        ctx.exports.absorb(line);
    }

    let relative = stage.script_path();
    let path = ctx.variant.work_dir.join(&relative);
    let mut text = content.join("\n");
    text.push('\n');
    let script = write_artifact(&path, text, true)
        .map_err(|source| CompileError::StageIo { stage, source })?;

    debug!(
        ordinal = ctx.variant.ordinal,
        stage = %stage,
        exports = ctx.exports.len(),
        "Wrote stage script"
    );

    Ok(Some(StageOutput {
        stage,
        kind,
        script,
        copy: CopySpec::new(format!("./{}", relative), stage.image_path()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn context(root: &Path) -> VariantContext {
        VariantContext::new(EnvironmentVariant {
            ordinal: 1,
            env: "A=1".to_string(),
            work_dir: root.join("1"),
        })
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exports_reach_later_stages() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());

        let install = lines(&["export FOO=bar", "echo hi"]);
        let out = compile_stage(&mut ctx, Stage::Install, Some(&install))
            .unwrap()
            .unwrap();
        assert_eq!(out.script.content, "export FOO=bar\necho hi\n");
        assert_eq!(out.kind, StageKind::RunScript);
        assert_eq!(out.copy, CopySpec::new("./files/install", "/install"));

        let script = lines(&["echo again"]);
        let out = compile_stage(&mut ctx, Stage::Script, Some(&script))
            .unwrap()
            .unwrap();
        assert!(out.script.content.starts_with("export FOO=bar\n"));
        assert_eq!(out.script.content, "export FOO=bar\necho again\n");

        let on_disk = std::fs::read_to_string(dir.path().join("1/files/script")).unwrap();
        assert_eq!(on_disk, out.script.content);
    }

    #[test]
    fn test_own_exports_are_not_replayed() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());

        let script = lines(&["export X=1", "export Y=2"]);
        let out = compile_stage(&mut ctx, Stage::Script, Some(&script))
            .unwrap()
            .unwrap();
        assert_eq!(out.script.content, "export X=1\nexport Y=2\n");
        assert_eq!(ctx.exports.len(), 2);

        let after = lines(&["echo done"]);
        let out = compile_stage(&mut ctx, Stage::AfterSuccess, Some(&after))
            .unwrap()
            .unwrap();
        assert_eq!(out.script.content, "export X=1\nexport Y=2\necho done\n");
    }

    #[test]
    fn test_absent_stage_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());

        assert!(compile_stage(&mut ctx, Stage::Install, None).unwrap().is_none());
        assert!(!dir.path().join("1/files/install").exists());
    }

    #[test]
    fn test_env_stage_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        let env = lines(&["export A=1"]);

        assert!(compile_stage(&mut ctx, Stage::Env, Some(&env)).unwrap().is_none());
        assert!(ctx.exports.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_script_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        let script = lines(&["make test"]);
        let out = compile_stage(&mut ctx, Stage::Script, Some(&script))
            .unwrap()
            .unwrap();

        let mode = std::fs::metadata(&out.script.path)
            .unwrap()
            .permissions()
            .mode();
        assert_ne!(mode & 0o100, 0);
    }
}
