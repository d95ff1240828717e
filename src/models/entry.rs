//! Listing rows returned by content sources.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix marking hidden entries (`.git`, `.github`, ...).
pub const HIDDEN_PREFIX: char = '.';

/// Opaque handle used to list a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub String);

/// Resolvable pointer to raw file content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(pub String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Locator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type discriminator of a listing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    /// Symlinks, submodules and anything else a backend reports
    Other,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub kind: EntryKind,
    pub handle: Handle,
    /// Present for files the backend can serve
    pub locator: Option<Locator>,
}

impl SourceEntry {
    /// Create a directory entry.
    pub fn dir(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
            handle,
            locator: None,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>, handle: Handle, locator: Option<Locator>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            handle,
            locator,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with(HIDDEN_PREFIX)
    }
}

/// A named grouping of challenges, typically one CTF event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub handle: Handle,
}

impl From<SourceEntry> for Collection {
    fn from(entry: SourceEntry) -> Self {
        Self {
            name: entry.name,
            handle: entry.handle,
        }
    }
}
