//! Build and avatar commands
//!
//! Glue between the config file and the library crates. Every merge failure
//! is fatal; the avatar pass only fails if its output directory cannot be
//! created.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use weave_avatars::{AvatarFetcher, FetchReport, GithubLookup};
use weave_core::Roster;
use weave_merge::{build_log_file, BuildReport, IdentityNormalizer, MergeEngine};

use crate::config::WeaveConfig;

/// Merge every source log into the output artifact
pub async fn build(config: &WeaveConfig) -> Result<BuildReport> {
    let sources = config.log_sources()?;
    let engine = MergeEngine::new(
        config.merge.clone(),
        IdentityNormalizer::with_renames(config.renames.clone()),
        config.seeded_roster(),
    );

    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let report = build_log_file(&sources, engine, &config.finalize, &config.output)
        .await
        .with_context(|| format!("building {}", config.output.display()))?;

    info!(
        sources = sources.len(),
        read = report.stats.total_read(),
        emitted = report.stats.emitted,
        filtered = report.stats.filtered,
        final_time = report.final_time,
        finalized = report.finalized,
        handles = report.roster.len(),
        "Build finished"
    );
    Ok(report)
}

/// Collect avatars for every handle in `roster`
pub async fn fetch_avatars(
    config: &WeaveConfig,
    token: Option<String>,
    roster: &Roster,
) -> Result<FetchReport> {
    let lookup = GithubLookup::new(&config.github.api_base, token)
        .context("creating identity service client")?;
    let fetcher = AvatarFetcher::new(&config.user_dir, Arc::new(lookup));

    fetcher
        .fetch_all(roster)
        .await
        .with_context(|| format!("collecting avatars into {}", config.user_dir.display()))
}
