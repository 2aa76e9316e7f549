//! End-to-end log build
//!
//! Opens every source, merges, appends the teardown and flushes. Writing to a
//! file goes through a sibling `.partial` file that only replaces the output
//! once the whole run succeeded.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use weave_core::Roster;

use crate::engine::{MergeEngine, MergeStats};
use crate::error::MergeError;
use crate::finalize::{finalize, FinalizeConfig};
use crate::sink::{LogSink, RecordSink};
use crate::source::{LogSource, SourceStream};

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Merge counters
    pub stats: MergeStats,
    /// Logical time of the last real event
    pub final_time: u64,
    /// Number of teardown records
    pub finalized: usize,
    /// Roster to hand to the avatar pass
    pub roster: Roster,
}

/// Merge `sources` and write the real events plus teardown to `sink`
pub async fn build_log<S: RecordSink + ?Sized>(
    sources: &[LogSource],
    engine: MergeEngine,
    finalize_config: &FinalizeConfig,
    sink: &mut S,
) -> Result<BuildReport, MergeError> {
    let streams: Vec<SourceStream> = sources.iter().map(LogSource::open).collect();
    let outcome = engine.run(streams, sink).await?;

    let finalized = finalize(finalize_config, outcome.final_time, outcome.paths, sink).await?;

    Ok(BuildReport {
        stats: outcome.stats,
        final_time: outcome.final_time,
        finalized,
        roster: outcome.roster,
    })
}

/// Build the log into a file, replacing it only on success
pub async fn build_log_file(
    sources: &[LogSource],
    engine: MergeEngine,
    finalize_config: &FinalizeConfig,
    output: &Path,
) -> Result<BuildReport, MergeError> {
    let partial = partial_path(output);
    let file = tokio::fs::File::create(&partial).await?;
    let mut sink = LogSink::new(file);

    let result = build_log(sources, engine, finalize_config, &mut sink).await;
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            drop(sink);
            if let Err(rm) = tokio::fs::remove_file(&partial).await {
                warn!(path = %partial.display(), error = %rm, "Failed to remove partial output");
            }
            return Err(e);
        }
    };

    let lines = sink.lines();
    let file = sink.finish().await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&partial, output).await?;

    info!(path = %output.display(), lines, "Wrote merged log");
    Ok(report)
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    output.with_file_name(name)
}
