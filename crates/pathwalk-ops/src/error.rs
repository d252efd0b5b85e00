//! Error types for file utilities.

use std::path::PathBuf;

use thiserror::Error;

use pathwalk_core::WalkError;

/// Errors returned by the file utilities.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Path not found.
    #[error("{path} not found")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be read or written.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A search pattern did not compile.
    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A CSV file could not be parsed.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An external command failed.
    #[error("Command `{command}` failed with status {status:?}")]
    Command {
        command: String,
        status: Option<i32>,
    },

    /// A value could not be parsed.
    #[error("Cannot parse {value:?}: {message}")]
    Parse { value: String, message: String },

    /// Walking a directory failed.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl OpsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}
