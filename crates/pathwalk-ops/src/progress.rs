//! Progress reporting types for long-running operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An error that occurred on one item of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Progress information for an ongoing operation.
#[derive(Debug, Clone, Default)]
pub struct OperationProgress {
    /// Number of files examined.
    pub files_checked: usize,
    /// Number of files acted on.
    pub files_completed: usize,
    /// Number of bytes processed so far.
    pub bytes_processed: u64,
    /// The file currently being processed.
    pub current_file: Option<PathBuf>,
    /// Errors encountered so far.
    pub errors: Vec<OperationError>,
}

impl OperationProgress {
    /// Create an empty progress record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the operation has any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Add an error to the progress.
    pub fn add_error(&mut self, error: OperationError) {
        self.errors.push(error);
    }

    /// Update the current file being processed.
    pub fn set_current_file(&mut self, path: Option<PathBuf>) {
        self.current_file = path;
    }

    /// Increment the completed count and add bytes.
    pub fn complete_file(&mut self, bytes: u64) {
        self.files_completed += 1;
        self.bytes_processed += bytes;
    }

    /// Turn the final progress into a completion record.
    pub fn finish(self, dry_run: bool) -> OperationComplete {
        OperationComplete {
            checked: self.files_checked,
            succeeded: self.files_completed,
            failed: self.errors.len(),
            bytes_processed: self.bytes_processed,
            errors: self.errors,
            dry_run,
        }
    }
}

/// Result of a completed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationComplete {
    /// Number of files examined.
    pub checked: usize,
    /// Number of items successfully processed.
    pub succeeded: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Total bytes processed.
    pub bytes_processed: u64,
    /// Errors that occurred.
    pub errors: Vec<OperationError>,
    /// Nothing was changed on disk.
    pub dry_run: bool,
}

impl OperationComplete {
    /// Check if the operation was fully successful.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get a human-readable summary of the operation.
    pub fn summary(&self) -> String {
        let action = if self.dry_run { "Would remove" } else { "Removed" };
        if self.failed == 0 {
            format!("{} {} of {} files", action, self.succeeded, self.checked)
        } else {
            format!(
                "{} {} of {} files, {} failed",
                action, self.succeeded, self.checked, self.failed
            )
        }
    }
}
