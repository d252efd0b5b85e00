//! Walk configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a filtered, depth-bounded walk.
///
/// Directory patterns are matched against the path of a subdirectory relative
/// to `root`, file patterns against a file's basename. Extension lists are
/// exact matches including the leading dot (`.py`). Exclusion always wins over
/// inclusion, and an empty inclusion list does not restrict anything.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// First level to emit entries from. The root and its files are level 1.
    #[builder(default = "1")]
    #[serde(default = "default_min_depth")]
    pub min_depth: u32,

    /// Deepest level to visit (0 = unlimited, 1 = root only).
    #[builder(default = "0")]
    #[serde(default)]
    pub max_depth: u32,

    /// Root-relative directory patterns to skip entirely.
    #[builder(default)]
    #[serde(default)]
    pub dir_exclude: Vec<String>,

    /// Root-relative directory patterns to restrict descent to.
    #[builder(default)]
    #[serde(default)]
    pub dir_include: Vec<String>,

    /// File name patterns to drop from results.
    #[builder(default)]
    #[serde(default)]
    pub file_exclude: Vec<String>,

    /// File name patterns to restrict results to.
    #[builder(default)]
    #[serde(default)]
    pub file_include: Vec<String>,

    /// Extensions to drop from results.
    #[builder(default)]
    #[serde(default)]
    pub ext_exclude: Vec<String>,

    /// Extensions to restrict results to.
    #[builder(default)]
    #[serde(default)]
    pub ext_include: Vec<String>,

    /// Leave directories out of the results (they are still traversed).
    #[builder(default = "false")]
    #[serde(default)]
    pub exclude_dirs: bool,

    /// Leave files out of the results.
    #[builder(default = "false")]
    #[serde(default)]
    pub exclude_files: bool,

    /// Descend into symlinked directories.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
}

fn default_true() -> bool {
    true
}

fn default_min_depth() -> u32 {
    1
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl WalkConfig {
    /// Create a new walk config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create an unfiltered, unbounded config for a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            min_depth: 1,
            max_depth: 0,
            dir_exclude: Vec::new(),
            dir_include: Vec::new(),
            file_exclude: Vec::new(),
            file_include: Vec::new(),
            ext_exclude: Vec::new(),
            ext_include: Vec::new(),
            exclude_dirs: false,
            exclude_files: false,
            follow_symlinks: true,
        }
    }

    /// Whether entries found at `level` are emitted.
    pub fn emits_level(&self, level: u32) -> bool {
        level >= self.min_depth
    }

    /// Whether the walk descends into subdirectories of a directory at `level`.
    pub fn descends_from(&self, level: u32) -> bool {
        self.max_depth == 0 || level < self.max_depth
    }

    /// Check an extension against the extension lists.
    ///
    /// `extension` includes the leading dot, or is empty for names without one.
    pub fn admits_extension(&self, extension: &str) -> bool {
        if self.ext_exclude.iter().any(|e| e == extension) {
            return false;
        }
        self.ext_include.is_empty() || self.ext_include.iter().any(|e| e == extension)
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
