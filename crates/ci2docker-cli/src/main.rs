//! ci2docker CLI tool.

use clap::{Parser, Subcommand};
use ci2docker_config::settings::{
    DEFAULT_BUILD_EXTRA_ARGS, DEFAULT_IMAGE, DEFAULT_RUN_EXTRA_ARGS, DEFAULT_USER,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ci2docker")]
#[command(about = "Generate Docker build contexts from a CI pipeline description", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one build context per environment variant
    Generate(GenerateArgs),
    /// Validate a CI configuration and list its variants
    Validate {
        /// Path to the CI file, or a directory containing .travis.yml
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Git repository URL; owner and project are taken from it
    pub git_repo_url: String,

    /// Git revision: a branch name (e.g. 8.0) or a pull request as pull/N
    pub git_revision: String,

    /// User the container runs as
    #[arg(long, env = "CI2DOCKER_DOCKER_USER", default_value = DEFAULT_USER)]
    pub docker_user: String,

    /// Base image of the generated Dockerfile
    #[arg(long, env = "CI2DOCKER_DOCKER_IMAGE", default_value = DEFAULT_IMAGE)]
    pub docker_image: String,

    /// Root directory for generated build contexts (default: system temp dir)
    #[arg(long, env = "CI2DOCKER_ROOT_PATH")]
    pub root_path: Option<String>,

    /// Extra git remotes, comma separated (e.g. Vauxoo,moylop260)
    #[arg(long, value_delimiter = ',')]
    pub add_remote: Vec<String>,

    /// Leave the after_success stage out of the entrypoint
    #[arg(long)]
    pub exclude_after_success: bool,

    /// Extra arguments for `docker run`
    #[arg(long, env = "CI2DOCKER_RUN_EXTRA_ARGS", default_value = DEFAULT_RUN_EXTRA_ARGS, allow_hyphen_values = true)]
    pub run_extra_args: String,

    /// Remove the container and image when the run script finishes
    #[arg(long)]
    pub include_cleanup: bool,

    /// Extra arguments for `docker build`
    #[arg(long, env = "CI2DOCKER_BUILD_EXTRA_ARGS", default_value = DEFAULT_BUILD_EXTRA_ARGS, allow_hyphen_values = true)]
    pub build_extra_args: String,

    /// Path of the CI file to use (default: .travis.yml in the current directory)
    #[arg(long)]
    pub travis_yml_path: Option<PathBuf>,

    /// Git author email configured inside the image
    #[arg(long, env = "CI2DOCKER_GIT_EMAIL")]
    pub git_email: Option<String>,

    /// Git author name configured inside the image
    #[arg(long, env = "CI2DOCKER_GIT_USER")]
    pub git_user: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Generate(args) => {
            commands::generate::run(args)?;
        }
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
    }

    Ok(())
}
