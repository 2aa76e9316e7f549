//! Source checkout refresh and log generation
//!
//! For every configured source the checkout under `repo_dir` is cloned or
//! fetched, then the log generator writes `<repo_dir>/<name>.log` next to it.
//! Sources are handled one after another and any failing command stops the
//! run.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{info, instrument};

use crate::config::WeaveConfig;

/// Refresh every source and regenerate its log
pub async fn update_sources(config: &WeaveConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.repo_dir)
        .await
        .with_context(|| format!("creating {}", config.repo_dir.display()))?;

    for (name, url) in &config.sources {
        update_source(config, name, url).await?;
    }
    Ok(())
}

#[instrument(skip(config, url), fields(url = %url))]
async fn update_source(config: &WeaveConfig, name: &str, url: &str) -> Result<()> {
    info!("Updating source");
    let checkout = config.repo_dir.join(name);

    let mut vcs = Command::new(&config.tools.git);
    if tokio::fs::try_exists(&checkout).await? {
        vcs.arg("fetch").arg("origin").current_dir(&checkout);
    } else {
        vcs.arg("clone").arg(url).arg(&checkout);
    }
    run(vcs, &config.tools.git).await?;

    let log_path = config.repo_dir.join(format!("{name}.log"));
    let mut generator = Command::new(&config.tools.gource);
    generator
        .arg("--output-custom-log")
        .arg(&log_path)
        .arg(&checkout);
    run(generator, &config.tools.gource).await?;

    info!(log = %log_path.display(), "Source log regenerated");
    Ok(())
}

/// Run a command to completion with its stderr passed through
async fn run(mut cmd: Command, program: &str) -> Result<()> {
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("failed to start {program}"))?;

    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn config(dir: &Path, git: &str, gource: &str) -> WeaveConfig {
        WeaveConfig {
            repo_dir: dir.join("repos"),
            sources: BTreeMap::from([(
                "RuneLite".to_string(),
                "https://example.test/runelite.git".to_string(),
            )]),
            tools: crate::config::ToolsConfig {
                git: git.to_string(),
                gource: gource.to_string(),
            },
            ..WeaveConfig::default()
        }
    }

    #[tokio::test]
    async fn test_update_runs_both_tools() {
        let temp = tempfile::TempDir::new().unwrap();
        update_sources(&config(temp.path(), "true", "true")).await.unwrap();
        assert!(temp.path().join("repos").is_dir());
    }

    #[tokio::test]
    async fn test_failing_vcs_is_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = update_sources(&config(temp.path(), "false", "true"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("false exited"));
    }

    #[tokio::test]
    async fn test_failing_generator_is_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("repos/RuneLite")).unwrap();
        let err = update_sources(&config(temp.path(), "true", "false"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("false exited"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = update_sources(&config(temp.path(), "/nonexistent/weave-git", "true"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }
}
