//! Create, remove and move operations serialized through a [`FileLock`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OpsError;
use crate::lock::FileLock;

/// Create `path` and any missing parents. Existing directories are left alone.
pub fn make_path(lock: &FileLock, path: &Path) -> Result<(), OpsError> {
    let _guard = lock.acquire();
    // May report false when ACLs hide an existing directory
    if !path.is_dir() {
        tracing::debug!(path = %path.display(), "Creating directory");
        fs::create_dir_all(path).map_err(|e| OpsError::io(path, e))?;
    }
    Ok(())
}

/// Remove a file. A path that is not a file is left alone.
pub fn remove_file(lock: &FileLock, path: &Path) -> Result<(), OpsError> {
    let _guard = lock.acquire();
    if path.is_file() {
        tracing::debug!(path = %path.display(), "Removing file");
        fs::remove_file(path).map_err(|e| OpsError::io(path, e))?;
    }
    Ok(())
}

/// Remove a directory and everything below it. A path that is not a
/// directory is left alone.
pub fn remove_dir(lock: &FileLock, path: &Path) -> Result<(), OpsError> {
    let _guard = lock.acquire();
    if path.is_dir() {
        tracing::debug!(path = %path.display(), "Removing directory tree");
        fs::remove_dir_all(path).map_err(|e| OpsError::io(path, e))?;
    }
    Ok(())
}

/// Move a file or directory.
///
/// The destination's parent is created first. If `dest` is an existing
/// directory the source is moved inside it. Across filesystems the data is
/// copied without metadata, then the source is removed.
///
/// Returns the final destination path.
pub fn move_file(lock: &FileLock, source: &Path, dest: &Path) -> Result<PathBuf, OpsError> {
    if !source.exists() {
        return Err(OpsError::NotFound {
            path: source.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        make_path(lock, parent)?;
    }

    let _guard = lock.acquire();
    let final_dest = match source.file_name() {
        Some(name) if dest.is_dir() => dest.join(name),
        _ => dest.to_path_buf(),
    };

    tracing::debug!(
        source = %source.display(),
        dest = %final_dest.display(),
        "Moving"
    );
    move_item(source, &final_dest)?;
    Ok(final_dest)
}

/// Move a single item, falling back to copy + delete.
fn move_item(source: &Path, dest: &Path) -> Result<(), OpsError> {
    // Fast path for the same filesystem
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    if source.is_dir() {
        copy_dir_recursive(source, dest)?;
        fs::remove_dir_all(source).map_err(|e| OpsError::io(source, e))?;
    } else {
        copy_contents(source, dest)?;
        fs::remove_file(source).map_err(|e| OpsError::io(source, e))?;
    }
    Ok(())
}

/// Copy file data only; permissions and timestamps are not carried over.
fn copy_contents(source: &Path, dest: &Path) -> Result<(), OpsError> {
    let mut reader = fs::File::open(source).map_err(|e| OpsError::io(source, e))?;
    let mut writer = fs::File::create(dest).map_err(|e| OpsError::io(dest, e))?;
    std::io::copy(&mut reader, &mut writer).map_err(|e| OpsError::io(dest, e))?;
    Ok(())
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<(), OpsError> {
    fs::create_dir_all(dest).map_err(|e| OpsError::io(dest, e))?;

    let entries = fs::read_dir(source).map_err(|e| OpsError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| OpsError::io(source, e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            copy_contents(&path, &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_path_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();
        let nested = temp.path().join("a/b/c");

        make_path(&lock, &nested).unwrap();
        make_path(&lock, &nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_remove_file_ignores_missing() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();
        let file = temp.path().join("gone.txt");

        remove_file(&lock, &file).unwrap();

        fs::write(&file, "x").unwrap();
        remove_file(&lock, &file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_file_leaves_directories() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();

        remove_file(&lock, temp.path()).unwrap();
        assert!(temp.path().is_dir());
    }

    #[test]
    fn test_remove_dir() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();
        let dir = temp.path().join("tree");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/file.txt"), "x").unwrap();

        remove_dir(&lock, &dir).unwrap();
        assert!(!dir.exists());

        // Missing is fine
        remove_dir(&lock, &dir).unwrap();
    }

    #[test]
    fn test_move_file_creates_parent() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();
        let source = temp.path().join("report.txt");
        fs::write(&source, "data").unwrap();

        let dest = temp.path().join("archive/2024/report.txt");
        let moved = move_file(&lock, &source, &dest).unwrap();

        assert_eq!(moved, dest);
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "data");
    }

    #[test]
    fn test_move_into_existing_directory() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();
        let source = temp.path().join("report.txt");
        let target = temp.path().join("archive");
        fs::write(&source, "data").unwrap();
        fs::create_dir(&target).unwrap();

        let moved = move_file(&lock, &source, &target).unwrap();
        assert_eq!(moved, target.join("report.txt"));
        assert!(moved.is_file());
    }

    #[test]
    fn test_move_missing_source() {
        let temp = TempDir::new().unwrap();
        let lock = FileLock::new();
        let err = move_file(
            &lock,
            &temp.path().join("nope"),
            &temp.path().join("dest"),
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::NotFound { .. }));
    }

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("nested/a.txt"), "a").unwrap();

        let dest = temp.path().join("dst");
        copy_dir_recursive(&source, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("nested/a.txt")).unwrap(), "a");
    }
}
