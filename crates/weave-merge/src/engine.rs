//! K-way merge engine
//!
//! The engine owns one pending slot per active source stream. Each round it
//! refills empty slots, picks the slot with the smallest raw timestamp and
//! emits that record. Raw timestamps are only comparable for ordering; the
//! output carries a dense logical time that advances once per distinct raw
//! timestamp, so records sharing a timestamp share a logical time whichever
//! source they came from.
//!
//! Ties between sources on the same timestamp go to the source whose name
//! sorts first.
//!
//! While emitting, the engine is the only writer of the roster and the path
//! accumulator. Both are handed back in the [`MergeOutcome`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use weave_core::{namespaced_path, EventRecord, OutputRecord, Roster};

use crate::error::MergeError;
use crate::normalize::IdentityNormalizer;
use crate::sink::RecordSink;
use crate::source::SourceStream;

/// Merge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Path prefixes of automation-internal activity that is dropped
    pub excluded_prefixes: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec!["/api".to_string()],
        }
    }
}

impl MergeConfig {
    /// Check whether a source-relative path is dropped from the output
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Distinct namespaced paths seen during a merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAccumulator {
    paths: BTreeSet<String>,
}

impl PathAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path; returns true if it was not seen before
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    /// Check whether a path was seen
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if no path was seen
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate paths in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl IntoIterator for PathAccumulator {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Counters collected during a merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records pulled per source
    pub records_read: BTreeMap<String, u64>,
    /// Records written to the sink
    pub emitted: u64,
    /// Records dropped by the excluded prefixes
    pub filtered: u64,
}

impl MergeStats {
    /// Total records pulled across sources
    pub fn total_read(&self) -> u64 {
        self.records_read.values().sum()
    }
}

/// Everything a finished merge hands on
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Logical time of the last emitted record (0 if none)
    pub final_time: u64,
    /// Namespaced paths seen in emitted records
    pub paths: PathAccumulator,
    /// Seeded roster plus implicit registrations
    pub roster: Roster,
    /// Merge counters
    pub stats: MergeStats,
}

/// One active source and its pending record
struct ActiveStream {
    stream: SourceStream,
    pending: Option<EventRecord>,
}

/// Single-threaded k-way merge over source streams
pub struct MergeEngine {
    config: MergeConfig,
    normalizer: IdentityNormalizer,
    roster: Roster,
    logical_time: u64,
    last_timestamp: Option<u64>,
    paths: PathAccumulator,
    stats: MergeStats,
}

impl MergeEngine {
    /// Create an engine with a rename table and a pre-seeded roster
    pub fn new(config: MergeConfig, normalizer: IdentityNormalizer, roster: Roster) -> Self {
        Self {
            config,
            normalizer,
            roster,
            logical_time: 0,
            last_timestamp: None,
            paths: PathAccumulator::new(),
            stats: MergeStats::default(),
        }
    }

    /// Merge all streams into the sink until every stream is exhausted.
    ///
    /// The first error from any stream aborts the merge. Dropping the
    /// remaining streams stops their readers.
    #[instrument(skip_all, fields(sources = streams.len()))]
    pub async fn run<S: RecordSink + ?Sized>(
        mut self,
        streams: Vec<SourceStream>,
        sink: &mut S,
    ) -> Result<MergeOutcome, MergeError> {
        let mut active: Vec<ActiveStream> = streams
            .into_iter()
            .map(|stream| ActiveStream {
                stream,
                pending: None,
            })
            .collect();
        active.sort_by(|a, b| a.stream.name().cmp(b.stream.name()));

        info!(sources = active.len(), "Starting merge");

        loop {
            self.refill(&mut active).await?;
            if active.is_empty() {
                break;
            }

            let Some(idx) = select_min(&active) else {
                break;
            };
            let Some(record) = active[idx].pending.take() else {
                continue;
            };
            self.accept(active[idx].stream.name(), record, sink).await?;
        }

        info!(
            emitted = self.stats.emitted,
            filtered = self.stats.filtered,
            logical_times = self.logical_time,
            paths = self.paths.len(),
            handles = self.roster.len(),
            "Merge finished"
        );

        Ok(MergeOutcome {
            final_time: self.logical_time,
            paths: self.paths,
            roster: self.roster,
            stats: self.stats,
        })
    }

    /// Pull a record into every empty slot, dropping exhausted streams
    async fn refill(&mut self, active: &mut Vec<ActiveStream>) -> Result<(), MergeError> {
        let mut i = 0;
        while i < active.len() {
            if active[i].pending.is_some() {
                i += 1;
                continue;
            }

            match active[i].stream.next().await {
                Some(Ok(record)) => {
                    *self
                        .stats
                        .records_read
                        .entry(active[i].stream.name().to_string())
                        .or_default() += 1;
                    active[i].pending = Some(record);
                    i += 1;
                }
                Some(Err(e)) => return Err(e),
                None => {
                    let done = active.remove(i);
                    debug!(source = done.stream.name(), "Source exhausted");
                }
            }
        }
        Ok(())
    }

    /// Filter, renumber, normalize and emit one record
    async fn accept<S: RecordSink + ?Sized>(
        &mut self,
        source: &str,
        record: EventRecord,
        sink: &mut S,
    ) -> Result<(), MergeError> {
        if self.config.is_excluded(&record.path) {
            trace!(source, path = %record.path, "Dropping excluded path");
            self.stats.filtered += 1;
            return Ok(());
        }

        if self.last_timestamp != Some(record.timestamp) {
            self.last_timestamp = Some(record.timestamp);
            self.logical_time += 1;
        }

        let handle = self.normalizer.normalize(&record.actor).to_string();
        if self.roster.register_implicit(&handle) {
            debug!(handle = %handle, "Registered new handle");
        }

        let full_path = namespaced_path(source, &record.path);
        self.paths.insert(full_path.clone());

        let output = OutputRecord::new(self.logical_time, handle, record.kind, full_path);
        sink.write_record(&output).await?;
        self.stats.emitted += 1;
        Ok(())
    }
}

/// Index of the pending record with the smallest timestamp; earliest slot wins ties
fn select_min(active: &[ActiveStream]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, slot) in active.iter().enumerate() {
        let Some(record) = &slot.pending else {
            continue;
        };
        match best {
            Some((_, ts)) if ts <= record.timestamp => {}
            _ => best = Some((idx, record.timestamp)),
        }
    }
    best.map(|(idx, _)| idx)
}
