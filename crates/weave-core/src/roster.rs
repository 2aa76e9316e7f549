//! Canonical identity roster
//!
//! The roster maps every canonical handle that shows up in the merged log to
//! the place its avatar image comes from. It starts out with configured
//! entries and grows while the merge runs: the first time a handle without an
//! entry is emitted, it is registered as a remote lookup of itself.
//!
//! Entries are never replaced once present.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where an avatar image for a handle comes from
///
/// In configuration files a reference is a plain string. Strings that start
/// with `./`, `../` or `/` name a local image file, anything else is a login
/// to resolve against the remote identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AvatarRef {
    /// Image stored on the local filesystem
    LocalFile(PathBuf),
    /// Login to look up remotely
    Remote(String),
}

impl AvatarRef {
    /// Classify a configured reference string
    pub fn parse(value: &str) -> Self {
        if value.starts_with("./") || value.starts_with("../") || value.starts_with('/') {
            Self::LocalFile(PathBuf::from(value))
        } else {
            Self::Remote(value.to_string())
        }
    }

    /// Remote lookup reference for a login
    pub fn remote(login: impl Into<String>) -> Self {
        Self::Remote(login.into())
    }

    /// Local file reference
    pub fn local(path: impl AsRef<Path>) -> Self {
        Self::LocalFile(path.as_ref().to_path_buf())
    }

    /// Check whether this reference points at a local file
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalFile(_))
    }
}

impl From<String> for AvatarRef {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for AvatarRef {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<AvatarRef> for String {
    fn from(value: AvatarRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AvatarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalFile(path) => write!(f, "{}", path.display()),
            Self::Remote(login) => write!(f, "{login}"),
        }
    }
}

/// Append-only mapping of canonical handle to avatar reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: BTreeMap<String, AvatarRef>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a roster pre-seeded with known mappings
    pub fn seeded<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AvatarRef>,
    {
        let mut roster = Self::new();
        for (handle, avatar) in entries {
            roster.insert(handle, avatar);
        }
        roster
    }

    /// Insert an entry unless the handle is already present.
    ///
    /// Returns true if the entry was added.
    pub fn insert(&mut self, handle: impl Into<String>, avatar: impl Into<AvatarRef>) -> bool {
        let handle = handle.into();
        if self.entries.contains_key(&handle) {
            return false;
        }
        self.entries.insert(handle, avatar.into());
        true
    }

    /// Register a handle as a remote lookup of itself if it has no entry.
    ///
    /// Returns true if the handle was new.
    pub fn register_implicit(&mut self, handle: &str) -> bool {
        if self.entries.contains_key(handle) {
            return false;
        }
        self.entries
            .insert(handle.to_string(), AvatarRef::remote(handle));
        true
    }

    /// Get the reference for a handle
    pub fn get(&self, handle: &str) -> Option<&AvatarRef> {
        self.entries.get(handle)
    }

    /// Check whether a handle has an entry
    pub fn contains(&self, handle: &str) -> bool {
        self.entries.contains_key(handle)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the roster is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in handle order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AvatarRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
