//! Files-only walk with the older, flatter option set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use pathwalk_core::{WalkConfig, WalkError};

use crate::hook::PermissionHook;
use crate::walker::PathWalker;

/// Options of the older files walk: one depth value and a flag to also
/// report directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Root directory to walk.
    pub root: PathBuf,
    /// Deepest level to visit (0 = unlimited, 1 = root only).
    #[serde(default)]
    pub depth: u32,
    /// Report directories as well as files.
    #[serde(default)]
    pub include_dirs: bool,
    /// Root-relative directory patterns to skip.
    #[serde(default)]
    pub dir_exclude: Vec<String>,
    /// File name patterns to drop.
    #[serde(default)]
    pub file_exclude: Vec<String>,
    /// Extensions to drop.
    #[serde(default)]
    pub ext_exclude: Vec<String>,
    /// Extensions to restrict results to.
    #[serde(default)]
    pub ext_include: Vec<String>,
}

impl FilesConfig {
    /// Unbounded, files-only walk of `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

impl From<FilesConfig> for WalkConfig {
    fn from(files: FilesConfig) -> Self {
        WalkConfig {
            dir_exclude: files.dir_exclude,
            file_exclude: files.file_exclude,
            ext_exclude: files.ext_exclude,
            ext_include: files.ext_include,
            exclude_dirs: !files.include_dirs,
            min_depth: 1,
            max_depth: files.depth,
            ..WalkConfig::new(files.root)
        }
    }
}

/// Walk files (and optionally directories) below `config.root`.
pub fn walk_files(config: FilesConfig) -> Result<PathWalker<'static>, WalkError> {
    PathWalker::new(config.into())
}

/// [`walk_files`] with a permission hook.
pub fn walk_files_with_hook<'h>(
    config: FilesConfig,
    hook: impl PermissionHook + 'h,
) -> Result<PathWalker<'h>, WalkError> {
    Ok(PathWalker::new(config.into())?.with_hook(hook))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation() {
        let files = FilesConfig {
            depth: 3,
            include_dirs: true,
            dir_exclude: vec!["target".to_string()],
            ext_include: vec![".rs".to_string()],
            ..FilesConfig::new("/src")
        };

        let config: WalkConfig = files.into();
        assert_eq!(config.root, PathBuf::from("/src"));
        assert_eq!(config.min_depth, 1);
        assert_eq!(config.max_depth, 3);
        assert!(!config.exclude_dirs);
        assert!(!config.exclude_files);
        assert_eq!(config.dir_exclude, vec!["target".to_string()]);
        assert_eq!(config.ext_include, vec![".rs".to_string()]);
        assert!(config.file_include.is_empty());
    }

    #[test]
    fn test_defaults_to_files_only() {
        let config: WalkConfig = FilesConfig::new("/src").into();
        assert!(config.exclude_dirs);
        assert_eq!(config.max_depth, 0);
    }
}
