//! Core types for pathwalk.
//!
//! This crate provides the data structures shared by the walker and the
//! file operation utilities: walk configuration, walk entries, and the
//! error and warning types.

mod config;
mod entry;
mod error;

pub use config::{WalkConfig, WalkConfigBuilder};
pub use entry::{EntryKind, WalkEntry};
pub use error::{HookError, WalkError, WalkWarning, WarningKind};
