//! Entries produced by a walk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of a walk entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (or a symlink resolving to one).
    File,
    /// Directory.
    Directory,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// A single path yielded by a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkEntry {
    /// Full path, rooted at the walk root.
    pub path: PathBuf,
    /// What the path points to.
    pub kind: EntryKind,
    /// Level the entry was found at. The root directory and its files are level 1.
    pub depth: u32,
}

impl WalkEntry {
    /// Create a file entry.
    pub fn file(path: impl Into<PathBuf>, depth: u32) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            depth,
        }
    }

    /// Create a directory entry.
    pub fn directory(path: impl Into<PathBuf>, depth: u32) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            depth,
        }
    }

    /// Borrow the entry path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the entry, keeping only the path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
