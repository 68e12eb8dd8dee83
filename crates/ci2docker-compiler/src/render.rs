//! Artifact rendering.
//!
//! The compiler hands a [`Renderer`] structured contexts only; how they become
//! text is up to the implementation. [`AskamaRenderer`] uses the templates
//! under `templates/` and is the one the CLI ships with.

use askama::Template;
use ci2docker_core::{CopySpec, InstructionSet, RenderOptions};
use serde_json::Value;
use std::path::Path;

use crate::CompileResult;

/// Keys of the render options the compiler fills in.
pub mod keys {
    pub const USER: &str = "user";
    pub const REPO_OWNER: &str = "repo_owner";
    pub const REPO_PROJECT: &str = "repo_project";
    pub const REVISION: &str = "revision";
    pub const GIT_URL: &str = "git_url";
    pub const REMOTES: &str = "remotes";
    pub const GIT_EMAIL: &str = "git_email";
    pub const GIT_USER: &str = "git_user";
    pub const ADD_SELF_RSA_PUB: &str = "add_self_rsa_pub";
}

/// Input for the image definition and entrypoint documents.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub instructions: &'a InstructionSet,
    /// Entrypoint script, relative to the build context.
    pub entrypoint_path: &'a str,
    pub options: &'a RenderOptions,
}

/// Input for the build and run helper scripts.
#[derive(Debug, Clone, Copy)]
pub struct HelperContext<'a> {
    pub image_tag: &'a str,
    /// Build context directory passed to `docker build`.
    pub context_dir: &'a Path,
    pub build_extra_args: &'a str,
    pub run_extra_args: &'a str,
    pub include_cleanup: bool,
}

/// Turns structured contexts into document text.
pub trait Renderer {
    fn image_definition(&self, ctx: &RenderContext<'_>) -> CompileResult<String>;

    fn entrypoint(&self, ctx: &RenderContext<'_>) -> CompileResult<String>;

    fn build_script(&self, ctx: &HelperContext<'_>) -> CompileResult<String>;

    fn run_script(&self, ctx: &HelperContext<'_>) -> CompileResult<String>;
}

// ============================================================================
// Template structs
// ============================================================================

#[derive(Template)]
#[template(path = "Dockerfile", escape = "none")]
struct DockerfileTemplate<'a> {
    image: &'a str,
    user: Option<String>,
    env: &'a str,
    copies: &'a [CopySpec],
    git_email: Option<String>,
    git_user: Option<String>,
    add_self_rsa_pub: bool,
    checkout: Option<CheckoutView>,
    runs: &'a [String],
    entrypoint_path: &'a str,
}

#[derive(Template)]
#[template(path = "entrypoint.sh", escape = "none")]
struct EntrypointTemplate<'a> {
    entrypoints: &'a [String],
}

#[derive(Template)]
#[template(path = "10-build.sh", escape = "none")]
struct BuildTemplate<'a> {
    image: &'a str,
    context_dir: String,
    extra_args: &'a str,
}

#[derive(Template)]
#[template(path = "20-run.sh", escape = "none")]
struct RunTemplate<'a> {
    image: &'a str,
    extra_args: &'a str,
    cleanup: bool,
}

// ============================================================================
// View models
// ============================================================================

struct CheckoutView {
    slug: String,
    url: String,
    build_dir: String,
    fetch_ref: String,
    remotes: Vec<RemoteView>,
}

struct RemoteView {
    name: String,
    url: String,
}

/// Renderer backed by the bundled askama templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskamaRenderer;

impl Renderer for AskamaRenderer {
    fn image_definition(&self, ctx: &RenderContext<'_>) -> CompileResult<String> {
        let options = ctx.options;
        let template = DockerfileTemplate {
            image: &ctx.instructions.image,
            user: opt_str(options, keys::USER),
            env: &ctx.instructions.env,
            copies: &ctx.instructions.copies,
            git_email: opt_str(options, keys::GIT_EMAIL),
            git_user: opt_str(options, keys::GIT_USER),
            add_self_rsa_pub: opt_bool(options, keys::ADD_SELF_RSA_PUB),
            checkout: checkout_view(options),
            runs: &ctx.instructions.runs,
            entrypoint_path: ctx.entrypoint_path,
        };
        Ok(template.render()?)
    }

    fn entrypoint(&self, ctx: &RenderContext<'_>) -> CompileResult<String> {
        let template = EntrypointTemplate {
            entrypoints: &ctx.instructions.entrypoints,
        };
        Ok(template.render()?)
    }

    fn build_script(&self, ctx: &HelperContext<'_>) -> CompileResult<String> {
        let template = BuildTemplate {
            image: ctx.image_tag,
            context_dir: ctx.context_dir.display().to_string(),
            extra_args: ctx.build_extra_args,
        };
        Ok(template.render()?)
    }

    fn run_script(&self, ctx: &HelperContext<'_>) -> CompileResult<String> {
        let template = RunTemplate {
            image: ctx.image_tag,
            extra_args: ctx.run_extra_args,
            cleanup: ctx.include_cleanup,
        };
        Ok(template.render()?)
    }
}

fn opt_str(options: &RenderOptions, key: &str) -> Option<String> {
    options
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn opt_bool(options: &RenderOptions, key: &str) -> bool {
    options.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn opt_list(options: &RenderOptions, key: &str) -> Vec<String> {
    match options.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn checkout_view(options: &RenderOptions) -> Option<CheckoutView> {
    let url = opt_str(options, keys::GIT_URL)?;
    let owner = opt_str(options, keys::REPO_OWNER).unwrap_or_default();
    let project = opt_str(options, keys::REPO_PROJECT).unwrap_or_default();
    let revision = opt_str(options, keys::REVISION).unwrap_or_else(|| "master".to_string());
    let home = match opt_str(options, keys::USER).as_deref() {
        None | Some("root") => "/root".to_string(),
        Some(user) => format!("/home/{}", user),
    };

    let remotes = opt_list(options, keys::REMOTES)
        .into_iter()
        .map(|name| RemoteView {
            url: remote_url(&url, &owner, &name),
            name,
        })
        .collect();

    Some(CheckoutView {
        slug: format!("{}/{}", owner, project),
        build_dir: format!("{}/build/{}/{}", home, owner, project),
        fetch_ref: fetch_ref(&revision),
        url,
        remotes,
    })
}

/// Refspec fetched for a revision; `pull/N` maps to the pull request head.
fn fetch_ref(revision: &str) -> String {
    match revision.strip_prefix("pull/") {
        Some(number) => format!("+refs/pull/{}/head", number),
        None => revision.to_string(),
    }
}

/// Clone URL of a fork: the owner segment of `url` replaced by `remote`.
///
/// The owner is the segment right before the project, after the last `/` or
/// the scp-style `:`.
fn remote_url(url: &str, owner: &str, remote: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let Some((head, project)) = trimmed.rsplit_once('/') else {
        return url.to_string();
    };
    let Some(pos) = head.rfind(['/', ':']) else {
        return url.to_string();
    };
    if owner.is_empty() || &head[pos + 1..] != owner {
        return url.to_string();
    }
    format!(
        "{}{}/{}{}",
        &head[..=pos],
        remote,
        project,
        &url[trimmed.len()..]
    )
}
