//! `weave` command line driver

mod cli;
mod commands;
mod config;
mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use weave_logging::WeaveSubscriberBuilder;

use crate::cli::{Cli, Command, LogFormat};
use crate::config::{WeaveConfig, DEFAULT_CONFIG_FILE};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = load_config(cli.config.as_deref())?;

    let mut log_config = config.log.clone();
    if let Some(level) = cli.level_override() {
        log_config.default_level = level.to_string();
    }
    let mut logging = WeaveSubscriberBuilder::new().with_config(log_config);
    if let Some(format) = cli.log_format {
        logging = logging.with_pretty(format == LogFormat::Pretty);
    }
    let _guard = logging.try_init().context("initializing logging")?;

    match &config_path {
        Some(path) => info!(config = %path.display(), "Loaded config"),
        None => warn!("No {DEFAULT_CONFIG_FILE} found, using defaults"),
    }

    let token = cli.token.clone().or_else(|| config.env_token());

    match cli.command {
        Command::Update => update::update_sources(&config).await?,
        Command::Build { skip_avatars } => build(&config, token, skip_avatars).await?,
        Command::Avatars => {
            commands::fetch_avatars(&config, token, &config.seeded_roster()).await?;
        }
        Command::All { skip_avatars } => {
            update::update_sources(&config).await?;
            build(&config, token, skip_avatars).await?;
        }
    }

    Ok(())
}

async fn build(config: &WeaveConfig, token: Option<String>, skip_avatars: bool) -> Result<()> {
    let report = commands::build(config).await?;
    if !skip_avatars {
        commands::fetch_avatars(config, token, &report.roster).await?;
    }
    Ok(())
}

/// Load the config named on the command line, or `weave.toml` if it exists
fn load_config(explicit: Option<&Path>) -> Result<(WeaveConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok((WeaveConfig::default(), None));
            }
            default
        }
    };

    let config = WeaveConfig::from_file(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok((config, Some(path)))
}
