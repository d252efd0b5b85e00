//! Effective access checks.
//!
//! Permission bits and ACLs do not tell the whole story (read-only mounts,
//! Windows directory flags), so these checks perform the real operation:
//! open a file, list a directory, or create and remove a scratch file.

use std::fs::{self, OpenOptions};
use std::path::Path;

use chrono::Utc;

/// Kind of access to check for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessCheck {
    #[default]
    Read,
    Write,
}

impl AccessCheck {
    fn label(self) -> &'static str {
        match self {
            Self::Read => "readable",
            Self::Write => "writable",
        }
    }
}

/// Check whether `path` grants the requested access.
///
/// On failure, ancestors are tried one by one until an accessible one is
/// found, so the logs show which component is the culprit. A failed write
/// check is followed by the same walk with a read check.
pub fn check_path_access(path: &Path, check: AccessCheck) -> bool {
    tracing::debug!(path = %path.display(), "Checking access to path");

    let failed = check_ancestors(path, check);
    if failed && check == AccessCheck::Write {
        check_ancestors(path, AccessCheck::Read);
    }

    if failed {
        tracing::warn!(path = %path.display(), check = check.label(), "Access check failed");
    }
    !failed
}

/// Check `path` then its ancestors until one passes. Returns true if any
/// check failed.
fn check_ancestors(path: &Path, check: AccessCheck) -> bool {
    let mut failed = false;
    for candidate in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
        if check_one(candidate, check) {
            break;
        }
        failed = true;
    }
    failed
}

fn check_one(path: &Path, check: AccessCheck) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        tracing::warn!(
            path = %path.display(),
            "Path does not exist or has ACLs that prevent access"
        );
        return false;
    };

    let (kind, ok) = if metadata.is_dir() {
        let ok = match check {
            AccessCheck::Read => fs::read_dir(path).is_ok(),
            AccessCheck::Write => can_write_dir(path),
        };
        ("directory", ok)
    } else {
        let ok = match check {
            AccessCheck::Read => OpenOptions::new().read(true).open(path).is_ok(),
            AccessCheck::Write => OpenOptions::new().append(true).open(path).is_ok(),
        };
        ("file", ok)
    };

    if ok {
        tracing::debug!(path = %path.display(), kind, access = check.label(), "Access granted");
    } else {
        tracing::warn!(path = %path.display(), kind, access = check.label(), "Access denied");
    }
    ok
}

fn can_write_dir(dir: &Path) -> bool {
    let scratch = dir.join(format!(
        ".pathwalk-access-check-{}",
        Utc::now().timestamp_micros()
    ));
    match OpenOptions::new().write(true).create_new(true).open(&scratch) {
        Ok(file) => {
            drop(file);
            fs::remove_file(&scratch).is_ok()
        }
        Err(_) => false,
    }
}
