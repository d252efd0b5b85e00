//! Removal of files whose timestamp passes a delta check.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use pathwalk_scan::{FilesConfig, walk_files};

use crate::error::OpsError;
use crate::fs_ops::remove_file;
use crate::lock::FileLock;
use crate::progress::{OperationComplete, OperationError, OperationProgress};
use crate::timestamps::{MacTime, TimestampDelta, check_file_timestamp_delta};
use crate::OPERATION_CHANNEL_SIZE;

/// Progress updates between two reports.
const PROGRESS_INTERVAL: usize = 100;

/// Result sent through the channel during an expiry run.
#[derive(Debug)]
pub enum ExpireResult {
    /// Progress update.
    Progress(OperationProgress),
    /// A file matched the delta check (removed unless dry run).
    Expired(PathBuf),
    /// The operation completed.
    Complete(OperationComplete),
}

/// Options for an expiry run.
#[derive(Debug, Clone, Default)]
pub struct ExpireOptions {
    /// Timestamp to compare.
    pub mac: MacTime,
    /// Files for which `now + delta` lies after their timestamp are removed.
    /// Use a negative delta to target files older than `-delta`.
    pub delta: TimestampDelta,
    /// Report matches without removing anything.
    pub dry_run: bool,
}

/// Start removing matching files below `directory`.
///
/// All files in the tree are examined. Files that vanish meanwhile are
/// skipped; other failures are collected in the completion record.
pub fn start_expire(
    directory: PathBuf,
    options: ExpireOptions,
    lock: FileLock,
) -> mpsc::Receiver<ExpireResult> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    tokio::task::spawn_blocking(move || {
        let dry_run = options.dry_run;
        let complete = match expire_impl(&directory, &options, &lock, &tx) {
            Ok(complete) => complete,
            Err(err) => {
                let mut progress = OperationProgress::new();
                progress.add_error(OperationError::new(directory.clone(), err.to_string()));
                progress.finish(dry_run)
            }
        };
        tracing::info!(
            directory = %directory.display(),
            removed = complete.succeeded,
            failed = complete.failed,
            dry_run,
            "Expiry finished"
        );
        let _ = tx.blocking_send(ExpireResult::Complete(complete));
    });

    rx
}

fn expire_impl(
    directory: &Path,
    options: &ExpireOptions,
    lock: &FileLock,
    tx: &mpsc::Sender<ExpireResult>,
) -> Result<OperationComplete, OpsError> {
    let walker = walk_files(FilesConfig::new(directory))?;
    let mut progress = OperationProgress::new();

    for path in walker.paths() {
        let path = path?;
        progress.files_checked += 1;

        match check_file_timestamp_delta(&path, options.mac, options.delta) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(OpsError::NotFound { .. }) => continue,
            Err(err) => {
                progress.add_error(OperationError::new(path, err.to_string()));
                continue;
            }
        }

        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        progress.set_current_file(Some(path.clone()));

        if !options.dry_run {
            if let Err(err) = remove_file(lock, &path) {
                progress.add_error(OperationError::new(path, err.to_string()));
                continue;
            }
        }

        progress.complete_file(size);
        if tx.blocking_send(ExpireResult::Expired(path)).is_err() {
            // Receiver dropped: stop early
            break;
        }
        if progress.files_completed % PROGRESS_INTERVAL == 0 {
            let _ = tx.blocking_send(ExpireResult::Progress(progress.clone()));
        }
    }

    Ok(progress.finish(options.dry_run))
}
