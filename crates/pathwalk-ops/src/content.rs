//! Text and byte level helpers for single files.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::OpsError;

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Where [`replace_in_file`] writes its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// Overwrite the source file.
    InPlace,
    /// Overwrite the source after saving the original as `<source><ext>`.
    Backup(String),
    /// Write to another file and leave the source untouched.
    Destination(PathBuf),
}

/// Replace every occurrence of `search` with `replacement`.
pub fn replace_in_file(
    source: &Path,
    search: &str,
    replacement: &str,
    target: &ReplaceTarget,
) -> Result<(), OpsError> {
    let data = fs::read_to_string(source).map_err(|e| OpsError::io(source, e))?;

    let dest = match target {
        ReplaceTarget::InPlace => source.to_path_buf(),
        ReplaceTarget::Backup(ext) => {
            let backup = with_suffix(source, ext);
            fs::write(&backup, &data).map_err(|e| OpsError::io(&backup, e))?;
            source.to_path_buf()
        }
        ReplaceTarget::Destination(dest) => dest.clone(),
    };

    fs::write(&dest, data.replace(search, replacement))
        .map_err(|e| OpsError::io(&dest, e))
}

/// Strip a leading UTF-8 byte order mark, if any.
///
/// The content is streamed into a `.tmp` sibling which then replaces the
/// original.
pub fn remove_bom(path: &Path) -> Result<(), OpsError> {
    if !path.is_file() {
        return Err(OpsError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let tmp = with_suffix(path, ".tmp");
    let stripped = strip_bom_into(path, &tmp).map_err(|e| OpsError::io(path, e))?;
    fs::rename(&tmp, path).map_err(|e| OpsError::io(path, e))?;

    if stripped {
        tracing::debug!(path = %path.display(), "Removed UTF-8 BOM");
    }
    Ok(())
}

fn strip_bom_into(source: &Path, tmp: &Path) -> io::Result<bool> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(tmp)?);

    let mut head = Vec::with_capacity(UTF8_BOM.len());
    reader
        .by_ref()
        .take(UTF8_BOM.len() as u64)
        .read_to_end(&mut head)?;
    let stripped = head == UTF8_BOM;
    if !stripped {
        writer.write_all(&head)?;
    }
    io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(stripped)
}

/// Lines of `path` matching the regular expression `pattern`, without their
/// line terminators.
pub fn grep(path: &Path, pattern: &str) -> Result<Vec<String>, OpsError> {
    if !path.is_file() {
        return Err(OpsError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let regex = Regex::new(pattern).map_err(|source| OpsError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let reader = BufReader::new(File::open(path).map_err(|e| OpsError::io(path, e))?);
    let mut matches = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| OpsError::io(path, e))?;
        if regex.is_match(&line) {
            matches.push(line);
        }
    }
    Ok(matches)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
