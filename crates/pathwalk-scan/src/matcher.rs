//! Shell-style glob matching for names and root-relative paths.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use pathwalk_core::WalkError;

/// A compiled list of glob patterns.
///
/// Patterns use shell wildcards (`*`, `?`, `[abc]`, `[!abc]`). As with
/// `fnmatch`, `*` also matches path separators, so `sub*` matches
/// `sub/inner`. Matching ignores case on Windows.
#[derive(Debug, Clone)]
pub struct PatternSet {
    set: GlobSet,
    patterns: Vec<String>,
}

impl PatternSet {
    /// Compile a list of patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, WalkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            builder.add(compile(pattern)?);
            kept.push(pattern.to_string());
        }
        let set = builder.build().map_err(|e| WalkError::InvalidPattern {
            pattern: kept.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self {
            set,
            patterns: kept,
        })
    }

    /// A set without patterns.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// True if the set holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The source patterns, in the order given.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True iff the candidate matches at least one pattern.
    ///
    /// An empty set matches nothing.
    pub fn matches(&self, candidate: &str) -> bool {
        self.set.is_match(candidate)
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}

fn compile(pattern: &str) -> Result<Glob, WalkError> {
    GlobBuilder::new(&escape_braces(pattern))
        .literal_separator(false)
        .backslash_escape(false)
        .case_insensitive(cfg!(windows))
        .build()
        .map_err(|e| WalkError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

/// Make `{` and `}` literal outside character classes, where globset would
/// read them as alternation.
fn escape_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => out.push_str("[{]"),
            '}' => out.push_str("[}]"),
            '[' => {
                out.push('[');
                // A `]` right after `[` or `[!` is a class member
                if let Some(&bang @ ('!' | '^')) = chars.peek() {
                    out.push(bang);
                    chars.next();
                }
                if let Some(&']') = chars.peek() {
                    out.push(']');
                    chars.next();
                }
                for member in chars.by_ref() {
                    out.push(member);
                    if member == ']' {
                        break;
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Exclude and include pattern lists applied together.
///
/// Exclusion wins; an empty include list restricts nothing.
#[derive(Debug, Clone, Default)]
pub struct IncludeExclude {
    exclude: PatternSet,
    include: PatternSet,
}

impl IncludeExclude {
    /// Compile both lists.
    pub fn new<S: AsRef<str>>(exclude: &[S], include: &[S]) -> Result<Self, WalkError> {
        Ok(Self {
            exclude: PatternSet::new(exclude)?,
            include: PatternSet::new(include)?,
        })
    }

    /// Check if a candidate survives both lists.
    pub fn admits(&self, candidate: &str) -> bool {
        if self.exclude.matches(candidate) {
            return false;
        }
        self.include.is_empty() || self.include.matches(candidate)
    }
}

/// Check if a candidate path or name matches any of the patterns.
///
/// Patterns are compiled on every call; build a [`PatternSet`] to match
/// repeatedly.
pub fn glob_path_match<S: AsRef<str>>(candidate: &str, patterns: &[S]) -> Result<bool, WalkError> {
    Ok(PatternSet::new(patterns)?.matches(candidate))
}

/// Lexically normalize a path: drops `.` components, resolves `..` against
/// preceding names, and rejoins with the host separator.
///
/// An empty result becomes `.`.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Normalize a root-relative directory pattern the same way walk paths are
/// built, so `./build/` and `build` are the same pattern.
pub fn normalize_pattern(pattern: &str) -> String {
    normalize_lexical(Path::new(pattern))
        .to_string_lossy()
        .into_owned()
}

/// Extension of a file name, including the leading dot.
///
/// Leading dots do not start an extension: `.bashrc` has none, `a.tar.gz`
/// has `.gz`, and `name.` has `.`. Returns an empty string when there is none.
pub fn file_extension(name: &str) -> &str {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(dot) => &name[stem_start + dot..],
        None => "",
    }
}
