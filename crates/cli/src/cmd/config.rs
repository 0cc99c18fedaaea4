//! Configuration inspection command

use crate::config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config::config_file_path().context("Could not determine config file path"),
    }
}

/// List the effective configuration
pub async fn run_list(config: &SystemConfig, explicit: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(explicit)?;

    println!("{}", "Effective Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[notifier]".yellow());
    println!(
        "  {} = {} {}",
        "debounce_ms".cyan(),
        config.notifier.debounce_ms,
        format!("({}ms window from first change)", config.notifier.debounce_ms).dimmed()
    );

    println!("\n{}", "[providers]".yellow());
    println!(
        "  {} = {} {}",
        "timeout_ms".cyan(),
        config.providers.timeout_ms,
        if config.providers.timeout_ms == 0 {
            "(no timeout)".dimmed().to_string()
        } else {
            format!("({}ms per query)", config.providers.timeout_ms).dimmed().to_string()
        }
    );
    for provider in &config.providers.manifest {
        println!(
            "  {} {} {}",
            provider.key.green(),
            "→".dimmed(),
            provider.patterns.join(", ")
        );
    }

    println!("\n{}", "[watch]".yellow());
    println!("  {} = {}", "use_gitignore".cyan(), config.watch.use_gitignore);
    println!(
        "  {} = {:?}",
        "additional_patterns".cyan(),
        config.watch.additional_patterns
    );

    println!("\n{}", "[log]".yellow());
    println!("  {} = {}", "level".cyan(), config.log.level);
    match &config.log.file {
        Some(file) => println!("  {} = {}", "file".cyan(), file.display()),
        None => println!("  {} = {}", "file".cyan(), "(stderr)".dimmed()),
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  debounce_ms: 1-60,000");
    println!("  timeout_ms: 0-60,000 (0 = no timeout)");

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(explicit: Option<&Path>, create: bool) -> Result<()> {
    let config_path = resolve_path(explicit)?;

    if create && config::init_if_missing(&config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else {
        println!("{}", config_path.display());
        if !config_path.exists() {
            println!("{}", "File does not exist. Use --create to create it.".yellow());
        }
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}
