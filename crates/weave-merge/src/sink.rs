//! Output sinks
//!
//! Ordering is settled before a record reaches a sink; sinks only format.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use weave_core::OutputRecord;

use crate::error::MergeError;

/// Destination for merged records, in emission order
#[async_trait]
pub trait RecordSink: Send {
    /// Accept the next record
    async fn write_record(&mut self, record: &OutputRecord) -> Result<(), MergeError>;
}

/// Collects records in memory
#[async_trait]
impl RecordSink for Vec<OutputRecord> {
    async fn write_record(&mut self, record: &OutputRecord) -> Result<(), MergeError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes `logical_time|handle|kind|/path` lines to any async writer
pub struct LogSink<W: AsyncWrite + Unpin + Send> {
    writer: BufWriter<W>,
    lines: u64,
}

impl<W: AsyncWrite + Unpin + Send> LogSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines: 0,
        }
    }

    /// Number of lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush buffered output and return the inner writer
    pub async fn finish(mut self) -> Result<W, MergeError> {
        self.writer.flush().await?;
        Ok(self.writer.into_inner())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RecordSink for LogSink<W> {
    async fn write_record(&mut self, record: &OutputRecord) -> Result<(), MergeError> {
        self.writer.write_all(record.to_line().as_bytes()).await?;
        self.lines += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_lines() {
        let mut sink = LogSink::new(Vec::new());
        sink.write_record(&OutputRecord::new(1, "alice", "M", "A/x.txt"))
            .await
            .unwrap();
        sink.write_record(&OutputRecord::new(2, "bob", "A", "B/z.txt"))
            .await
            .unwrap();
        assert_eq!(sink.lines(), 2);

        let bytes = sink.finish().await.unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "1|alice|M|/A/x.txt\n2|bob|A|/B/z.txt\n"
        );
    }

    #[tokio::test]
    async fn test_vec_sink_keeps_order() {
        let mut sink: Vec<OutputRecord> = Vec::new();
        for t in [3, 1, 2] {
            sink.write_record(&OutputRecord::new(t, "a", "M", "A/f"))
                .await
                .unwrap();
        }
        let times: Vec<u64> = sink.iter().map(|r| r.logical_time).collect();
        assert_eq!(times, vec![3, 1, 2]);
    }
}
