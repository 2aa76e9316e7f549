//! Per-source stream readers
//!
//! Each opened source runs in its own task and hands parsed records to the
//! merge engine through a channel with a single slot, so a reader never gets
//! more than one record ahead of the engine. Closing the channel signals that
//! the source is exhausted; a fatal error is sent as the last item.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use weave_core::EventRecord;

use crate::error::MergeError;

/// Capacity of the reader-to-engine handoff
const HANDOFF_CAPACITY: usize = 1;

/// Where a source's raw log lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    /// A log file on disk
    File(PathBuf),
    /// An in-memory log
    Text(String),
}

/// A named activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    name: String,
    input: SourceInput,
}

impl LogSource {
    /// Source backed by a log file
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: SourceInput::File(path.into()),
        }
    }

    /// Source backed by `<dir>/<name>.log`
    pub fn in_dir(name: impl Into<String>, dir: &Path) -> Self {
        let name = name.into();
        let path = dir.join(format!("{name}.log"));
        Self::file(name, path)
    }

    /// Source backed by an in-memory log
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: SourceInput::Text(text.into()),
        }
    }

    /// Source name, used as the output path namespace
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the lines come from
    pub fn input(&self) -> &SourceInput {
        &self.input
    }

    /// Start a reader task from the first line of the source.
    ///
    /// May be called repeatedly; every stream is independent. Must be called
    /// from within a tokio runtime.
    pub fn open(&self) -> SourceStream {
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
        let name = self.name.clone();
        let input = self.input.clone();

        tokio::spawn(async move {
            if let Err(e) = run_reader(&name, input, &tx).await {
                // Receiver may already be gone if another source failed first
                let _ = tx.send(Err(e)).await;
            }
        });

        SourceStream {
            name: self.name.clone(),
            rx,
        }
    }
}

/// Receiving end of one source reader
#[derive(Debug)]
pub struct SourceStream {
    name: String,
    rx: mpsc::Receiver<Result<EventRecord, MergeError>>,
}

impl SourceStream {
    /// Source name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pull the next record.
    ///
    /// `None` means the source is exhausted.
    pub async fn next(&mut self) -> Option<Result<EventRecord, MergeError>> {
        self.rx.recv().await
    }
}

async fn run_reader(
    name: &str,
    input: SourceInput,
    tx: &mpsc::Sender<Result<EventRecord, MergeError>>,
) -> Result<(), MergeError> {
    match input {
        SourceInput::File(path) => {
            info!(source = name, path = %path.display(), "Reading source log");
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|e| MergeError::io(name, format!("{}: {}", path.display(), e)))?;
            read_lines(name, BufReader::new(file), tx).await
        }
        SourceInput::Text(text) => read_lines(name, BufReader::new(text.as_bytes()), tx).await,
    }
}

/// Parse lines and hand them over one at a time
async fn read_lines<R: AsyncRead + Unpin>(
    name: &str,
    reader: BufReader<R>,
    tx: &mpsc::Sender<Result<EventRecord, MergeError>>,
) -> Result<(), MergeError> {
    let mut lines = reader.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| MergeError::io(name, e.to_string()))?
    {
        line_no += 1;
        let record =
            EventRecord::parse_line(&line).map_err(|e| MergeError::parse(name, line_no, e))?;

        if tx.send(Ok(record)).await.is_err() {
            debug!(source = name, "Merge stopped, closing reader");
            return Ok(());
        }
    }

    debug!(source = name, lines = line_no, "Source reader finished");
    Ok(())
}
