//! Teardown pass
//!
//! After the real events, every path that was ever touched is removed by a
//! synthetic actor at one shared logical time, a fixed offset past the last
//! real event. The visualizer shows that gap as a pause before the teardown.

use serde::{Deserialize, Serialize};
use tracing::info;

use weave_core::OutputRecord;

use crate::engine::PathAccumulator;
use crate::error::MergeError;
use crate::sink::RecordSink;

/// Teardown configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizeConfig {
    /// Handle credited with the teardown
    pub actor: String,
    /// Change discriminator for removal
    pub kind: String,
    /// Logical time gap after the last real event
    pub offset: u64,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            actor: "ModMatK".to_string(),
            kind: "D".to_string(),
            offset: 10,
        }
    }
}

impl FinalizeConfig {
    /// Logical time of the teardown, strictly after `final_time`
    pub fn teardown_time(&self, final_time: u64) -> Result<u64, MergeError> {
        if self.offset == 0 {
            return Err(MergeError::Finalize("offset must be at least 1".to_string()));
        }
        final_time.checked_add(self.offset).ok_or_else(|| {
            MergeError::Finalize(format!(
                "offset {} past logical time {} overflows",
                self.offset, final_time
            ))
        })
    }
}

/// Emit one removal per accumulated path.
///
/// Paths are emitted in sorted order. The teardown actor is expected to be
/// seeded in the roster by the caller. Returns the number of records written.
pub async fn finalize<S: RecordSink + ?Sized>(
    config: &FinalizeConfig,
    final_time: u64,
    paths: PathAccumulator,
    sink: &mut S,
) -> Result<usize, MergeError> {
    let teardown_time = config.teardown_time(final_time)?;
    if paths.is_empty() {
        return Ok(0);
    }

    let mut written = 0;
    for path in paths {
        let record = OutputRecord::new(teardown_time, config.actor.as_str(), config.kind.as_str(), path);
        sink.write_record(&record).await?;
        written += 1;
    }

    info!(records = written, logical_time = teardown_time, "Teardown written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulator(paths: &[&str]) -> PathAccumulator {
        let mut acc = PathAccumulator::new();
        for path in paths {
            acc.insert(*path);
        }
        acc
    }

    #[tokio::test]
    async fn test_one_removal_per_path() {
        let mut out: Vec<OutputRecord> = Vec::new();
        let paths = accumulator(&["B/z.txt", "A/x.txt", "A/y.txt", "A/x.txt"]);

        let written = finalize(&FinalizeConfig::default(), 3, paths, &mut out)
            .await
            .unwrap();

        assert_eq!(written, 3);
        let lines: Vec<String> = out.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "13|ModMatK|D|/A/x.txt",
                "13|ModMatK|D|/A/y.txt",
                "13|ModMatK|D|/B/z.txt",
            ]
        );
    }

    #[tokio::test]
    async fn test_nothing_to_tear_down() {
        let mut out: Vec<OutputRecord> = Vec::new();

        let written = finalize(&FinalizeConfig::default(), 0, PathAccumulator::new(), &mut out)
            .await
            .unwrap();

        assert_eq!(written, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_custom_actor_and_offset() {
        let config = FinalizeConfig {
            actor: "janitor".into(),
            kind: "delete".into(),
            offset: 1,
        };
        let mut out: Vec<OutputRecord> = Vec::new();

        finalize(&config, 41, accumulator(&["repo/a"]), &mut out)
            .await
            .unwrap();

        assert_eq!(out[0].to_string(), "42|janitor|delete|/repo/a");
    }

    #[tokio::test]
    async fn test_zero_offset_is_rejected() {
        let config = FinalizeConfig {
            offset: 0,
            ..FinalizeConfig::default()
        };
        let mut out: Vec<OutputRecord> = Vec::new();

        let err = finalize(&config, 1, accumulator(&["A/x"]), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, MergeError::Finalize(_)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_offset_is_rejected() {
        let config = FinalizeConfig {
            offset: u64::MAX,
            ..FinalizeConfig::default()
        };
        let mut out: Vec<OutputRecord> = Vec::new();

        let err = finalize(&config, 1, accumulator(&["A/x"]), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, MergeError::Finalize(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_teardown_time() {
        let config = FinalizeConfig::default();
        assert_eq!(config.teardown_time(0).unwrap(), 10);
        assert_eq!(config.teardown_time(u64::MAX - 10).unwrap(), u64::MAX);
        assert!(config.teardown_time(u64::MAX - 9).is_err());
    }
}
