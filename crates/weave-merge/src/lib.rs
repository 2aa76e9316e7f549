//! # Weave Merge
//!
//! Streaming k-way merge of per-repository activity logs.
//!
//! Each source log is read by its own task and handed over one record at a
//! time. The [`MergeEngine`] repeatedly emits the smallest pending timestamp
//! across all sources, replacing raw timestamps with a dense logical time,
//! folding actor names onto canonical handles and prefixing every path with
//! its source name. When all sources are exhausted, [`finalize`] removes every
//! path seen, a fixed logical distance after the last real event.
//!
//! ## Example
//!
//! ```rust,ignore
//! use weave_core::Roster;
//! use weave_merge::{
//!     build_log, FinalizeConfig, IdentityNormalizer, LogSource, MergeConfig, MergeEngine,
//! };
//!
//! let sources = vec![
//!     LogSource::in_dir("RuneLite", "repos".as_ref()),
//!     LogSource::in_dir("launcher", "repos".as_ref()),
//! ];
//! let engine = MergeEngine::new(
//!     MergeConfig::default(),
//!     IdentityNormalizer::with_renames([("Max Weber", "Abex")]),
//!     Roster::new(),
//! );
//! let mut lines = Vec::new();
//! let report = build_log(&sources, engine, &FinalizeConfig::default(), &mut lines).await?;
//! ```
//!
//! ## Failure model
//!
//! Any unreadable source or malformed line aborts the whole build with a
//! [`MergeError`]; an exhausted source is simply dropped from the merge.

pub mod engine;
pub mod error;
pub mod finalize;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-export main types
pub use engine::{MergeConfig, MergeEngine, MergeOutcome, MergeStats, PathAccumulator};
pub use error::MergeError;
pub use finalize::{finalize, FinalizeConfig};
pub use normalize::IdentityNormalizer;
pub use pipeline::{build_log, build_log_file, BuildReport};
pub use sink::{LogSink, RecordSink};
pub use source::{LogSource, SourceInput, SourceStream};
