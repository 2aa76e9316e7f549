//! `weave.toml` parsing and validation
//!
//! Every section is optional. A missing file section falls back to the
//! defaults that reproduce the classic single-project setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use weave_avatars::DEFAULT_API_BASE;
use weave_core::{AvatarRef, Roster};
use weave_logging::LogConfig;
use weave_merge::{FinalizeConfig, LogSource, MergeConfig};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "weave.toml";

/// Errors raised while loading the config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaveConfig {
    /// Where source checkouts and their logs live
    pub repo_dir: PathBuf,
    /// Where avatar artifacts are written
    pub user_dir: PathBuf,
    /// Merged log artifact
    pub output: PathBuf,
    /// Source name to git URL
    pub sources: BTreeMap<String, String>,
    /// Raw actor name to canonical handle
    pub renames: BTreeMap<String, String>,
    /// Handle to remote login or local image path
    pub avatars: Roster,
    pub merge: MergeConfig,
    pub finalize: FinalizeConfig,
    pub github: GithubConfig,
    pub tools: ToolsConfig,
    pub log: LogConfig,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from("repos"),
            user_dir: PathBuf::from("users"),
            output: PathBuf::from("built_log.log"),
            sources: BTreeMap::new(),
            renames: BTreeMap::new(),
            avatars: Roster::new(),
            merge: MergeConfig::default(),
            finalize: FinalizeConfig::default(),
            github: GithubConfig::default(),
            tools: ToolsConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Identity service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// External programs used by `update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub git: String,
    pub gource: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            gource: "gource".to_string(),
        }
    }
}

impl WeaveConfig {
    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate config text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check source names and the finalize actor
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.sources.keys() {
            if name.is_empty() {
                return Err(ConfigError::Validation("source name is empty".into()));
            }
            if name.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "source name {name:?} must not contain '/'"
                )));
            }
        }
        if self.finalize.actor.is_empty() {
            return Err(ConfigError::Validation("finalize actor is empty".into()));
        }
        if self.finalize.offset == 0 {
            return Err(ConfigError::Validation(
                "finalize offset must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Roster to start a merge from.
    ///
    /// The `[avatars]` entries, plus the teardown actor as a lookup of its own
    /// name when it has no entry there.
    pub fn seeded_roster(&self) -> Roster {
        let mut roster = self.avatars.clone();
        roster.insert(self.finalize.actor.as_str(), AvatarRef::remote(&self.finalize.actor));
        roster
    }

    /// Sources ready for merging, in name order.
    ///
    /// Each one reads `<repo_dir>/<name>.log`.
    pub fn log_sources(&self) -> Result<Vec<LogSource>, ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Validation(
                "at least one source is required to build".into(),
            ));
        }
        Ok(self
            .sources
            .keys()
            .map(|name| LogSource::in_dir(name.clone(), &self.repo_dir))
            .collect())
    }

    /// API token from the configured environment variable
    pub fn env_token(&self) -> Option<String> {
        std::env::var(&self.github.token_env)
            .ok()
            .filter(|t| !t.is_empty())
    }
}
