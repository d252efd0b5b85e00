//! JSON file helpers.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::OpsError;

/// Serialize `data` to `path`, replacing any previous content. Non-ASCII
/// text is written as-is.
pub fn write_json_to_file<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), OpsError> {
    let file = File::create(path).map_err(|e| OpsError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, data).map_err(|source| OpsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| OpsError::io(path, e))
}

/// Read JSON from `path`, or `T::default()` when there is no such file.
pub fn read_json_from_file<T: DeserializeOwned + Default>(path: &Path) -> Result<T, OpsError> {
    if !path.is_file() {
        return Ok(T::default());
    }
    let file = File::open(path).map_err(|e| OpsError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| OpsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("manifest.json");

        let mut manifest = BTreeMap::new();
        manifest.insert("name".to_string(), "café".to_string());
        write_json_to_file(&file, &manifest).unwrap();

        let raw = std::fs::read_to_string(&file).unwrap();
        assert!(raw.contains("café"));

        let restored: BTreeMap<String, String> = read_json_from_file(&file).unwrap();
        assert_eq!(restored, manifest);
    }

    #[test]
    fn test_missing_file_reads_default() {
        let temp = TempDir::new().unwrap();
        let restored: BTreeMap<String, u32> =
            read_json_from_file(&temp.path().join("none.json")).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("broken.json");
        std::fs::write(&file, "{not json").unwrap();

        let err = read_json_from_file::<BTreeMap<String, u32>>(&file).unwrap_err();
        assert!(matches!(err, OpsError::Json { .. }));
    }
}
