//! Build and run helper scripts.

use crate::fs::{strip_blank_edges, write_artifact};
use crate::{CompileResult, HelperContext, Renderer};
use ci2docker_config::{GeneratorSettings, RepoIdentity};
use ci2docker_core::{EnvironmentVariant, ScriptArtifact};

pub const BUILD_SCRIPT: &str = "10-build.sh";
pub const RUN_SCRIPT: &str = "20-run.sh";

/// Image tag for one variant: `owner-project:revision_N`, lowercased, with
/// slashes in the revision replaced by underscores.
pub fn image_tag(repo: &RepoIdentity, ordinal: usize) -> String {
    let name = format!(
        "{}-{}:{}",
        repo.owner,
        repo.project,
        repo.revision.replace('/', "_")
    );
    format!("{}_{}", name.to_lowercase(), ordinal)
}

/// Write `10-build.sh` and `20-run.sh` into the variant's build context.
pub fn write_helper_scripts<R: Renderer + ?Sized>(
    renderer: &R,
    variant: &EnvironmentVariant,
    settings: &GeneratorSettings,
) -> CompileResult<Vec<ScriptArtifact>> {
    let tag = image_tag(&settings.repo, variant.ordinal);
    let ctx = HelperContext {
        image_tag: &tag,
        context_dir: &variant.work_dir,
        build_extra_args: &settings.build_extra_args,
        run_extra_args: &settings.run_extra_args,
        include_cleanup: settings.include_cleanup,
    };

    let build = renderer.build_script(&ctx)?;
    let run = renderer.run_script(&ctx)?;

    Ok(vec![
        write_artifact(
            &variant.work_dir.join(BUILD_SCRIPT),
            format!("{}\n", strip_blank_edges(&build)),
            true,
        )?,
        write_artifact(
            &variant.work_dir.join(RUN_SCRIPT),
            format!("{}\n", strip_blank_edges(&run)),
            true,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AskamaRenderer;

    #[test]
    fn test_image_tag() {
        let repo = RepoIdentity::new("Vauxoo", "YoyTec", "pull/2");
        assert_eq!(image_tag(&repo, 1), "vauxoo-yoytec:pull_2_1");
        assert_eq!(image_tag(&repo, 2), "vauxoo-yoytec:pull_2_2");

        let repo = RepoIdentity::new("odoo", "odoo", "feature/a/B");
        assert_eq!(image_tag(&repo, 3), "odoo-odoo:feature_a_b_3");
    }

    #[test]
    fn test_write_helper_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let variant = EnvironmentVariant {
            ordinal: 2,
            env: String::new(),
            work_dir: dir.path().join("2"),
        };
        let settings = GeneratorSettings::new()
            .with_repo(RepoIdentity::new("Vauxoo", "yoytec", "8.0"))
            .with_build_extra_args("--no-cache");

        let scripts = write_helper_scripts(&AskamaRenderer, &variant, &settings).unwrap();
        assert_eq!(scripts.len(), 2);
        assert!(scripts.iter().all(|s| s.executable));

        let build = std::fs::read_to_string(variant.work_dir.join(BUILD_SCRIPT)).unwrap();
        assert_eq!(
            build,
            format!(
                "#!/usr/bin/env bash\ndocker build --no-cache -t vauxoo-yoytec:8.0_2 {}\n",
                variant.work_dir.display()
            )
        );

        let run = std::fs::read_to_string(variant.work_dir.join(RUN_SCRIPT)).unwrap();
        assert!(run.ends_with("docker run -itP -e LANG=C.UTF-8 vauxoo-yoytec:8.0_2\n"));
    }
}
