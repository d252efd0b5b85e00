//! CSV rows as ordered field maps.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter};
use indexmap::IndexMap;

use crate::error::OpsError;

/// One CSV row, keyed by field name in column order.
pub type CsvRow = IndexMap<String, String>;

/// How to read a CSV file.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field separator.
    pub delimiter: u8,
    /// Field names to use. When set, the file has no header row and every
    /// line is data.
    pub fieldnames: Option<Vec<String>>,
    /// Skip rows whose first field starts with this character.
    pub skip_comment_char: Option<char>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            fieldnames: None,
            skip_comment_char: None,
        }
    }
}

/// Iterator over the rows of a CSV file.
///
/// Short rows get empty strings for their missing fields; fields beyond
/// the known names are dropped.
pub struct CsvDictReader {
    path: PathBuf,
    fieldnames: Vec<String>,
    records: StringRecordsIntoIter<File>,
    skip_comment_char: Option<char>,
}

impl CsvDictReader {
    /// Field names in column order.
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }
}

/// Open `path` and read its rows lazily.
///
/// Without explicit field names the first row is the header.
pub fn csv_dict_reader(path: &Path, options: &CsvOptions) -> Result<CsvDictReader, OpsError> {
    let file = File::open(path).map_err(|e| OpsError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.fieldnames.is_none())
        .flexible(true)
        .from_reader(file);

    let fieldnames = match &options.fieldnames {
        Some(names) => names.clone(),
        None => reader
            .headers()
            .map_err(|source| OpsError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect(),
    };

    Ok(CsvDictReader {
        path: path.to_path_buf(),
        fieldnames,
        records: reader.into_records(),
        skip_comment_char: options.skip_comment_char,
    })
}

impl Iterator for CsvDictReader {
    type Item = Result<CsvRow, OpsError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(source) => {
                    return Some(Err(OpsError::Csv {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };

            let commented = self
                .skip_comment_char
                .zip(record.get(0))
                .is_some_and(|(comment, first)| first.starts_with(comment));
            if commented {
                continue;
            }

            let row = self
                .fieldnames
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), record.get(i).unwrap_or_default().to_string()))
                .collect();
            return Some(Ok(row));
        }
    }
}
