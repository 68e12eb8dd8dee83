//! CLI command implementations.

pub mod generate;

use anyhow::{Context, Result};
use ci2docker_config::CiConfig;
use ci2docker_core::Stage;
use std::path::Path;

pub fn validate(path: &Path) -> Result<()> {
    let config = CiConfig::load(path)
        .with_context(|| format!("Failed to load CI config: {}", path.display()))?;

    let Some(config) = config else {
        println!("No CI config found at {}", path.display());
        return Ok(());
    };

    println!("Configuration is valid");
    for stage in Stage::PIPELINE {
        if let Some(lines) = config.lines(stage) {
            println!("  {}: {} line(s)", stage, lines.len());
        }
    }
    if !config.env.globals().is_empty() {
        println!("  globals: {}", config.env.globals());
    }
    if config.env.skipped_secure() > 0 {
        println!(
            "  {} secure global variable(s) will be skipped",
            config.env.skipped_secure()
        );
    }
    println!("Variants: {}", config.env.len());
    for (index, env) in config.env.resolved().enumerate() {
        println!("  {}: {}", index + 1, env);
    }
    Ok(())
}
