//! Recursive, filtered path walking for pathwalk.
//!
//! # Overview
//!
//! `pathwalk-scan` enumerates a directory tree lazily and depth-first:
//!
//! - **Glob filters** on root-relative directory paths and on file names
//! - **Extension lists** matched exactly, leading dot included
//! - **Depth bounds** counted from the root at level 1
//! - **Permission hook** for directories that cannot be listed
//!
//! Exclusion always wins over inclusion, and an excluded directory is never
//! entered. Unreadable directories produce no entries, the walk goes on.
//!
//! # Example
//!
//! ```rust,no_run
//! use pathwalk_scan::{WalkConfig, walk};
//!
//! let config = WalkConfig::builder()
//!     .root("/var")
//!     .dir_exclude(vec!["log".to_string(), "li*".to_string()])
//!     .exclude_files(true)
//!     .max_depth(4u32)
//!     .build()
//!     .unwrap();
//!
//! for path in walk(config).unwrap().paths() {
//!     println!("{}", path.unwrap().display());
//! }
//! ```
//!
//! # Permission Errors
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pathwalk_scan::{WalkConfig, walk};
//!
//! let walker = walk(WalkConfig::new("/srv")).unwrap().on_permission_denied(|path: &Path| {
//!     eprintln!("cannot read {}", path.display());
//!     Ok(())
//! });
//! let count = walker.filter_map(Result::ok).count();
//! println!("{count} entries");
//! ```

mod files;
mod hook;
mod matcher;
mod walker;

pub use files::{FilesConfig, walk_files, walk_files_with_hook};
pub use hook::{LogPermissionErrors, PermissionHook};
pub use matcher::{
    IncludeExclude, PatternSet, file_extension, glob_path_match, normalize_lexical,
    normalize_pattern,
};
pub use walker::{PathWalker, walk, walk_with_hook};

// Re-export core types for convenience
pub use pathwalk_core::{
    EntryKind, HookError, WalkConfig, WalkConfigBuilder, WalkEntry, WalkError, WalkWarning,
    WarningKind,
};
