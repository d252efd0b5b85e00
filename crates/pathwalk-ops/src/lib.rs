//! File utilities built around pathwalk.
//!
//! Write-side helpers (`make_path`, `remove_file`, `remove_dir`,
//! `move_file`) serialize through a [`FileLock`], so concurrent callers
//! sharing one lock never interleave their filesystem mutations. The rest
//! of the crate covers content edits, JSON and CSV files, timestamp checks
//! and the expiry operation, which reports progress over a channel.
//!
//! ```rust,no_run
//! use pathwalk_ops::{
//!     ExpireOptions, ExpireResult, FileLock, MacTime, TimestampDelta, start_expire,
//! };
//!
//! # async fn run() {
//! let options = ExpireOptions {
//!     mac: MacTime::Modified,
//!     delta: TimestampDelta::days(-30),
//!     dry_run: true,
//! };
//! let mut rx = start_expire("/tmp/cache".into(), options, FileLock::global());
//! while let Some(result) = rx.recv().await {
//!     if let ExpireResult::Complete(complete) = result {
//!         println!("{}", complete.summary());
//!     }
//! }
//! # }
//! ```

mod access;
mod content;
mod csv_reader;
mod error;
mod expire;
mod fs_ops;
mod hidden;
mod json;
mod lock;
mod progress;
mod timestamps;

pub use access::{AccessCheck, check_path_access};
pub use content::{ReplaceTarget, grep, remove_bom, replace_in_file};
pub use csv_reader::{CsvDictReader, CsvOptions, CsvRow, csv_dict_reader};
pub use error::OpsError;
pub use expire::{ExpireOptions, ExpireResult, start_expire};
pub use fs_ops::{make_path, move_file, remove_dir, remove_file};
pub use hidden::set_hidden;
pub use json::{read_json_from_file, write_json_to_file};
pub use lock::FileLock;
pub use progress::{OperationComplete, OperationError, OperationProgress};
pub use timestamps::{
    MacTime, TimestampDelta, check_file_timestamp_delta, check_file_timestamp_delta_at, file_time,
    is_file_older_than,
};

/// Default channel buffer size for operation progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
