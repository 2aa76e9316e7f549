//! Input and output records
//!
//! Both sides of the merge use the same four-field line shape:
//!
//! ```text
//! timestamp|actor|kind|path
//! ```
//!
//! On input the first field is a source-local clock reading. On output it is
//! the dense logical time assigned by the merge, and the path is namespaced by
//! the source it came from.

use std::fmt;

use crate::error::ParseError;

/// Field delimiter of the line format
pub const FIELD_DELIMITER: char = '|';

/// Number of fields in every line
pub const FIELD_COUNT: usize = 4;

/// One event parsed from a source log
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventRecord {
    /// Source-local clock reading (seconds)
    pub timestamp: u64,
    /// Actor identifier as written by the source
    pub actor: String,
    /// Change discriminator, passed through untouched
    pub kind: String,
    /// Source-relative path
    pub path: String,
}

impl EventRecord {
    /// Create a new record
    pub fn new(
        timestamp: u64,
        actor: impl Into<String>,
        kind: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            actor: actor.into(),
            kind: kind.into(),
            path: path.into(),
        }
    }

    /// Parse a raw log line.
    ///
    /// Trailing whitespace and control characters (the line terminator
    /// included) are trimmed before splitting. The line must then hold
    /// exactly [`FIELD_COUNT`] fields and a base-10 unsigned timestamp.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let line = trim_line(line);
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount {
                expected: FIELD_COUNT,
                actual: fields.len(),
            });
        }

        let timestamp = fields[0]
            .parse::<u64>()
            .map_err(|e| ParseError::invalid_timestamp(fields[0], e))?;

        Ok(Self::new(timestamp, fields[1], fields[2], fields[3]))
    }
}

/// Strip trailing whitespace and control characters.
pub fn trim_line(line: &str) -> &str {
    line.trim_end_matches(|c: char| c.is_whitespace() || c.is_control())
}

/// One line of the merged log
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRecord {
    /// Dense logical time
    pub logical_time: u64,
    /// Canonical handle of the actor
    pub handle: String,
    /// Change discriminator
    pub kind: String,
    /// Namespaced path, `<source><path>`, without the leading slash
    pub path: String,
}

impl OutputRecord {
    /// Create a new output record
    pub fn new(
        logical_time: u64,
        handle: impl Into<String>,
        kind: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            logical_time,
            handle: handle.into(),
            kind: kind.into(),
            path: path.into(),
        }
    }

    /// Render the record as a newline-terminated line
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|/{}",
            self.logical_time, self.handle, self.kind, self.path
        )
    }
}

/// Namespace a source-relative path under its source name.
///
/// Source logs write paths with a leading slash, so `("A", "/x.txt")`
/// becomes `A/x.txt`.
pub fn namespaced_path(source: &str, path: &str) -> String {
    let mut full = String::with_capacity(source.len() + path.len());
    full.push_str(source);
    full.push_str(path);
    full
}
