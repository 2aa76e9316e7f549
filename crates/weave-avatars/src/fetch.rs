//! Roster-wide avatar collection
//!
//! Walks the roster in handle order and leaves one `<handle>.png` per handle
//! in the user directory. Existing artifacts are kept as they are. Every
//! failure is logged and counted against that one handle only.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use weave_core::{AvatarRef, Roster};

use crate::error::AvatarError;
use crate::lookup::IdentityLookup;
use crate::normalize::normalize_image;

/// What happened to a single handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new artifact was written
    Written,
    /// An artifact already existed
    AlreadyPresent,
    /// The identity service has no such user
    NotFound,
}

/// Counters for one avatar pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Artifacts written
    pub written: usize,
    /// Handles whose artifact already existed
    pub skipped_existing: usize,
    /// Remote logins the service did not know
    pub missing: usize,
    /// Handles that failed for any other reason
    pub failed: usize,
}

impl FetchReport {
    fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Written => self.written += 1,
            FetchOutcome::AlreadyPresent => self.skipped_existing += 1,
            FetchOutcome::NotFound => self.missing += 1,
        }
    }

    /// Total handles processed
    pub fn total(&self) -> usize {
        self.written + self.skipped_existing + self.missing + self.failed
    }
}

/// Collects avatar artifacts for roster entries
pub struct AvatarFetcher {
    user_dir: PathBuf,
    lookup: Arc<dyn IdentityLookup>,
}

impl AvatarFetcher {
    /// Create a fetcher writing into `user_dir`
    pub fn new(user_dir: impl Into<PathBuf>, lookup: Arc<dyn IdentityLookup>) -> Self {
        Self {
            user_dir: user_dir.into(),
            lookup,
        }
    }

    /// Artifact path for a handle
    pub fn artifact_path(&self, handle: &str) -> Result<PathBuf, AvatarError> {
        if handle.is_empty()
            || handle.contains(|c| c == '/' || c == '\\')
            || handle == "."
            || handle == ".."
        {
            return Err(AvatarError::InvalidHandle(handle.to_string()));
        }
        Ok(self.user_dir.join(format!("{handle}.png")))
    }

    /// Process every roster entry, one at a time.
    ///
    /// Only a failure to create the user directory stops the pass.
    #[instrument(skip_all, fields(handles = roster.len()))]
    pub async fn fetch_all(&self, roster: &Roster) -> Result<FetchReport, AvatarError> {
        tokio::fs::create_dir_all(&self.user_dir).await?;

        let mut report = FetchReport::default();
        for (handle, avatar) in roster.iter() {
            match self.fetch_one(handle, avatar).await {
                Ok(outcome) => {
                    if outcome == FetchOutcome::NotFound {
                        warn!(handle, login = %avatar, "Cannot find user");
                    }
                    report.record(outcome);
                }
                Err(e) => {
                    warn!(handle, source = %avatar, error = %e, "Skipping avatar");
                    report.failed += 1;
                }
            }
        }

        info!(
            written = report.written,
            skipped_existing = report.skipped_existing,
            missing = report.missing,
            failed = report.failed,
            "Avatar pass finished"
        );
        Ok(report)
    }

    /// Collect the avatar for one handle
    pub async fn fetch_one(
        &self,
        handle: &str,
        avatar: &AvatarRef,
    ) -> Result<FetchOutcome, AvatarError> {
        let target = self.artifact_path(handle)?;
        if tokio::fs::try_exists(&target).await? {
            debug!(handle, "Avatar already present");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        let raw = match avatar {
            AvatarRef::LocalFile(path) => tokio::fs::read(path)
                .await
                .map_err(|e| AvatarError::Io(format!("{}: {}", path.display(), e)))?,
            AvatarRef::Remote(login) => {
                let Some(url) = self.lookup.avatar_url(login).await? else {
                    return Ok(FetchOutcome::NotFound);
                };
                self.lookup.fetch_bytes(&url).await?.to_vec()
            }
        };

        let png = normalize_image(&raw)?;
        write_new(&target, &png).await
    }
}

/// Write bytes to a file that must not exist yet
async fn write_new(target: &Path, bytes: &[u8]) -> Result<FetchOutcome, AvatarError> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(FetchOutcome::AlreadyPresent);
        }
        Err(e) => return Err(e.into()),
    };

    file.write_all(bytes).await?;
    file.flush().await?;
    debug!(path = %target.display(), bytes = bytes.len(), "Wrote avatar");
    Ok(FetchOutcome::Written)
}
