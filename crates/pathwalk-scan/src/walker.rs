//! Lazy depth-first walker.
//!
//! Each directory becomes a [`Frame`] when the consumer reaches it: the
//! directory is listed once, its own entry and admitted files are queued for
//! output, and admitted subdirectories are queued as child contexts. Frames
//! live on an explicit stack, so the walk order is the directory itself, its
//! files, then each admitted subtree in listing order.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use pathwalk_core::{HookError, WalkConfig, WalkEntry, WalkError, WalkWarning};

use crate::hook::{LogPermissionErrors, PermissionHook};
use crate::matcher::{IncludeExclude, file_extension, normalize_lexical, normalize_pattern};

/// Start a walk.
///
/// Fails before producing anything if the root is missing, is not a
/// directory, or a pattern does not compile. Denied listings are logged.
pub fn walk(config: WalkConfig) -> Result<PathWalker<'static>, WalkError> {
    PathWalker::new(config)
}

/// Start a walk that reports denied listings to `hook`.
pub fn walk_with_hook<'h>(
    config: WalkConfig,
    hook: impl PermissionHook + 'h,
) -> Result<PathWalker<'h>, WalkError> {
    Ok(PathWalker::new(config)?.with_hook(hook))
}

/// Immutable context of one directory in the walk.
#[derive(Debug, Clone)]
struct DirContext {
    /// Path as it will be reported, rooted at the normalized walk root.
    path: PathBuf,
    /// Path relative to the walk root, empty for the root itself.
    relative: PathBuf,
    /// Level of the directory; the root is 1.
    level: u32,
}

/// Pending output of one listed directory.
#[derive(Debug, Default)]
struct Frame {
    entries: VecDeque<WalkEntry>,
    subdirs: VecDeque<DirContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildKind {
    File,
    Directory,
}

struct Child {
    name: OsString,
    kind: ChildKind,
}

/// Iterator over the entries of a walk.
///
/// Nothing is read from disk until the first call to `next`, and each call
/// lists at most one directory. Dropping the walker cancels the rest of the
/// walk. After an error, or once exhausted, it only returns `None`.
pub struct PathWalker<'h> {
    config: WalkConfig,
    dirs: IncludeExclude,
    files: IncludeExclude,
    hook: Box<dyn PermissionHook + 'h>,
    root: Option<DirContext>,
    stack: Vec<Frame>,
    warnings: Vec<WalkWarning>,
    done: bool,
}

impl<'h> PathWalker<'h> {
    /// Validate the root and compile the filters.
    pub fn new(mut config: WalkConfig) -> Result<Self, WalkError> {
        let metadata = fs::metadata(&config.root).map_err(|e| WalkError::io(&config.root, e))?;
        if !metadata.is_dir() {
            return Err(WalkError::NotADirectory { path: config.root });
        }

        config.root = normalize_lexical(&config.root);
        for patterns in [&mut config.dir_exclude, &mut config.dir_include] {
            for pattern in patterns.iter_mut() {
                *pattern = normalize_pattern(pattern);
            }
        }

        let dirs = IncludeExclude::new(
            config.dir_exclude.as_slice(),
            config.dir_include.as_slice(),
        )?;
        let files = IncludeExclude::new(
            config.file_exclude.as_slice(),
            config.file_include.as_slice(),
        )?;

        let root = DirContext {
            path: config.root.clone(),
            relative: PathBuf::new(),
            level: 1,
        };

        Ok(Self {
            config,
            dirs,
            files,
            hook: Box::new(LogPermissionErrors),
            root: Some(root),
            stack: Vec::new(),
            warnings: Vec::new(),
            done: false,
        })
    }

    /// Replace the permission hook.
    pub fn with_hook(mut self, hook: impl PermissionHook + 'h) -> Self {
        self.hook = Box::new(hook);
        self
    }

    /// Replace the permission hook with a closure.
    pub fn on_permission_denied<F>(self, hook: F) -> Self
    where
        F: FnMut(&Path) -> Result<(), HookError> + 'h,
    {
        self.with_hook(hook)
    }

    /// The effective configuration, with root and directory patterns normalized.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Non-fatal problems met so far.
    pub fn warnings(&self) -> &[WalkWarning] {
        &self.warnings
    }

    /// Yield bare paths instead of entries.
    pub fn paths(self) -> impl Iterator<Item = Result<PathBuf, WalkError>> + 'h {
        self.map(|entry| entry.map(WalkEntry::into_path))
    }

    /// List `dir` and push its frame.
    fn enter(&mut self, dir: DirContext) -> Result<(), WalkError> {
        let children = self.read_children(&dir.path)?;
        let emit = self.config.emits_level(dir.level);
        let descend = self.config.descends_from(dir.level);

        let mut frame = Frame::default();
        if emit && !self.config.exclude_dirs {
            frame
                .entries
                .push_back(WalkEntry::directory(&dir.path, dir.level));
        }

        for child in children {
            match child.kind {
                ChildKind::File => {
                    if emit && !self.config.exclude_files && self.admits_file(&child.name) {
                        frame
                            .entries
                            .push_back(WalkEntry::file(dir.path.join(&child.name), dir.level));
                    }
                }
                ChildKind::Directory => {
                    if !descend {
                        continue;
                    }
                    let relative = dir.relative.join(&child.name);
                    if self.dirs.admits(&relative.to_string_lossy()) {
                        frame.subdirs.push_back(DirContext {
                            path: dir.path.join(&child.name),
                            relative,
                            level: dir.level + 1,
                        });
                    } else {
                        tracing::debug!(path = %relative.display(), "Skipping filtered directory");
                    }
                }
            }
        }

        self.stack.push(frame);
        Ok(())
    }

    fn admits_file(&self, name: &OsString) -> bool {
        let name = name.to_string_lossy();
        self.files.admits(&name) && self.config.admits_extension(file_extension(&name))
    }

    /// Read the children of a directory. Only a hook failure is an error;
    /// anything else degrades to fewer (or no) children.
    fn read_children(&mut self, dir: &Path) -> Result<Vec<Child>, WalkError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                self.hook
                    .on_permission_denied(dir)
                    .map_err(|source| WalkError::hook(dir, source))?;
                match fs::read_dir(dir) {
                    Ok(entries) => entries,
                    Err(_) => {
                        tracing::debug!(path = %dir.display(), "Directory still unreadable");
                        self.warnings.push(WalkWarning::permission_denied(dir));
                        return Ok(Vec::new());
                    }
                }
            }
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "Cannot list directory");
                self.warnings.push(WalkWarning::read_error(dir, &err));
                return Ok(Vec::new());
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %err,
                        "Error while listing directory"
                    );
                    self.warnings.push(WalkWarning::read_error(dir, &err));
                    continue;
                }
            };
            if let Some(kind) = self.classify(&entry) {
                children.push(Child {
                    name: entry.file_name(),
                    kind,
                });
            }
        }
        Ok(children)
    }

    fn classify(&mut self, entry: &fs::DirEntry) -> Option<ChildKind> {
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(err) => {
                let path = entry.path();
                tracing::debug!(path = %path.display(), error = %err, "Cannot read entry type");
                self.warnings.push(WalkWarning::new(
                    path,
                    err.to_string(),
                    pathwalk_core::WarningKind::MetadataError,
                ));
                return None;
            }
        };

        if file_type.is_dir() {
            return Some(ChildKind::Directory);
        }
        if file_type.is_file() {
            return Some(ChildKind::File);
        }
        if !file_type.is_symlink() {
            // Sockets, devices, fifos
            return None;
        }

        // Dangling links resolve to nothing and are dropped.
        let target = fs::metadata(entry.path()).ok()?;
        if target.is_dir() {
            self.config.follow_symlinks.then_some(ChildKind::Directory)
        } else if target.is_file() {
            Some(ChildKind::File)
        } else {
            None
        }
    }

    fn fail(&mut self, err: WalkError) -> Option<Result<WalkEntry, WalkError>> {
        self.done = true;
        self.stack.clear();
        Some(Err(err))
    }
}

impl Iterator for PathWalker<'_> {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(root) = self.root.take() {
            if let Err(err) = self.enter(root) {
                return self.fail(err);
            }
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.done = true;
                return None;
            };

            if let Some(entry) = frame.entries.pop_front() {
                return Some(Ok(entry));
            }

            match frame.subdirs.pop_front() {
                Some(dir) => {
                    if let Err(err) = self.enter(dir) {
                        return self.fail(err);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl FusedIterator for PathWalker<'_> {}

impl std::fmt::Debug for PathWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathWalker")
            .field("config", &self.config)
            .field("depth", &self.stack.len())
            .field("warnings", &self.warnings.len())
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.log"), "b").unwrap();
        fs::write(root.join("sub/c.txt"), "c").unwrap();

        temp
    }

    fn collect(config: WalkConfig) -> BTreeSet<PathBuf> {
        walk(config)
            .unwrap()
            .paths()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_basic_walk() {
        let temp = create_test_tree();
        let root = temp.path();

        let found = collect(WalkConfig::new(root));
        let expected: BTreeSet<PathBuf> = [
            root.to_path_buf(),
            root.join("a.txt"),
            root.join("b.log"),
            root.join("sub"),
            root.join("sub/c.txt"),
        ]
        .into_iter()
        .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_root_comes_first() {
        let temp = create_test_tree();
        let mut walker = walk(WalkConfig::new(temp.path())).unwrap();

        let first = walker.next().unwrap().unwrap();
        assert_eq!(first.path, temp.path());
        assert!(first.kind.is_dir());
        assert_eq!(first.depth, 1);
    }

    #[test]
    fn test_files_before_subtrees() {
        let temp = create_test_tree();
        let entries: Vec<WalkEntry> = walk(WalkConfig::new(temp.path()))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let sub = entries
            .iter()
            .position(|e| e.path == temp.path().join("sub"))
            .unwrap();
        for entry in &entries[sub..] {
            assert!(entry.path.starts_with(temp.path().join("sub")));
            assert_eq!(entry.depth, 2);
        }
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let err = walk(WalkConfig::new(missing)).unwrap_err();
        assert!(matches!(err, WalkError::NotFound { .. }));
    }

    #[test]
    fn test_root_is_a_file() {
        let temp = create_test_tree();
        let file = temp.path().join("a.txt");
        let err = walk(WalkConfig::new(file)).unwrap_err();
        assert!(matches!(err, WalkError::NotADirectory { .. }));
    }

    #[test]
    fn test_invalid_pattern_fails_up_front() {
        let temp = create_test_tree();
        let config = WalkConfig::builder()
            .root(temp.path())
            .file_exclude(vec!["[oops".to_string()])
            .build()
            .unwrap();
        assert!(matches!(
            walk(config).unwrap_err(),
            WalkError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_root_is_normalized() {
        let temp = create_test_tree();
        let dotted = temp.path().join(".").join("sub").join("..");
        let walker = walk(WalkConfig::new(&dotted)).unwrap();
        assert_eq!(walker.config().root, temp.path());
    }

    #[test]
    fn test_fused_after_exhaustion() {
        let temp = TempDir::new().unwrap();
        let mut walker = walk(WalkConfig::new(temp.path())).unwrap();
        assert!(walker.next().is_some());
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory() {
        let temp = create_test_tree();
        let root = temp.path();
        use std::os::unix::fs::symlink;

        symlink(root.join("sub"), root.join("link")).unwrap();

        let followed = collect(WalkConfig::new(root));
        assert!(followed.contains(&root.join("link/c.txt")));

        let mut config = WalkConfig::new(root);
        config.follow_symlinks = false;
        let unfollowed = collect(config);
        assert!(!unfollowed.contains(&root.join("link")));
        assert!(!unfollowed.contains(&root.join("link/c.txt")));
        assert!(unfollowed.contains(&root.join("sub/c.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_dropped() {
        let temp = create_test_tree();
        let root = temp.path();
        use std::os::unix::fs::symlink;

        symlink(root.join("nowhere"), root.join("dangling")).unwrap();

        let found = collect(WalkConfig::new(root));
        assert!(!found.contains(&root.join("dangling")));
        assert!(found.contains(&root.join("a.txt")));
    }
}
