//! Build context generation command.

use anyhow::{Context, Result};
use ci2docker_compiler::Compiler;
use ci2docker_config::{GeneratorSettings, RepoIdentity};
use tracing::info;
use url::Url;

use crate::GenerateArgs;

/// Generate the build contexts and print one directory per line.
pub fn run(args: GenerateArgs) -> Result<()> {
    let settings = settings_from_args(args)?;
    let compiler = Compiler::new(settings);

    let work_dirs = compiler.compile().context("Failed to generate build contexts")?;
    info!(count = work_dirs.len(), "Generated build contexts");

    for dir in work_dirs {
        println!("{}", dir.display());
    }
    Ok(())
}

fn settings_from_args(args: GenerateArgs) -> Result<GeneratorSettings> {
    let (owner, project) = repo_slug(&args.git_repo_url).with_context(|| {
        format!(
            "Cannot derive owner/project from repository URL: {}",
            args.git_repo_url
        )
    })?;
    let repo = RepoIdentity::new(owner, project, args.git_revision).with_url(args.git_repo_url);

    let mut settings = GeneratorSettings::new()
        .with_image(args.docker_image)
        .with_user(args.docker_user)
        .with_repo(repo)
        .with_remotes(args.add_remote)
        .with_git_identity(args.git_email, args.git_user)
        .with_skip_after_success(args.exclude_after_success)
        .with_build_extra_args(args.build_extra_args)
        .with_run_extra_args(args.run_extra_args)
        .with_include_cleanup(args.include_cleanup);
    if let Some(root) = args.root_path {
        settings = settings.with_work_root(root);
    }
    if let Some(path) = args.travis_yml_path {
        settings = settings.with_config_path(path);
    }
    Ok(settings)
}

/// Owner and project of a repository URL.
///
/// Accepts `https://host/owner/project(.git)`, `ssh://...` and the scp-like
/// `git@host:owner/project(.git)` form.
fn repo_slug(repo_url: &str) -> Option<(String, String)> {
    let path = match Url::parse(repo_url) {
        Ok(url) if url.has_host() => url.path().to_string(),
        // scp-like syntax is not a URL
        _ => repo_url
            .split_once(':')
            .map(|(_, path)| path)
            .unwrap_or(repo_url)
            .to_string(),
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty()).rev();
    let project = segments.next()?;
    let owner = segments.next()?;
    let project = project.strip_suffix(".git").unwrap_or(project);
    if project.is_empty() {
        return None;
    }
    Some((owner.to_string(), project.to_string()))
}
