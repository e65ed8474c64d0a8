//! Read a delimited materials table and order it by capacity.
//! Header row required; `material` and `capacity` columns must be present, anything else is carried as-is.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::data::record::{
    compare_capacity, Dataset, FieldValue, Record, CAPACITY_FIELD, MATERIAL_FIELD,
};

pub const DEFAULT_DATA_PATH: &str = "data.csv";

#[derive(Debug)]
pub enum LoadError {
    /// File missing or unreadable.
    DataUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    MissingColumn {
        column: &'static str,
    },
    Malformed(csv::Error),
    InvalidCapacity {
        line: u64,
        value: String,
    },
}

impl LoadError {
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }

    /// Message shown on the page / CLI in place of the plot.
    pub fn user_message(&self) -> String {
        match self {
            Self::DataUnavailable { path, .. } => format!(
                "Error: `{}` not found. Please make sure the file is in the same directory.",
                path.display()
            ),
            other => format!("Error: {other}"),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataUnavailable { path, source } => {
                write!(f, "data unavailable at {}: {source}", path.display())
            }
            Self::MissingColumn { column } => {
                write!(f, "required column '{column}' missing from header")
            }
            Self::Malformed(err) => write!(f, "malformed table: {err}"),
            Self::InvalidCapacity { line, value } => {
                write!(f, "line {line}: capacity '{value}' is not a number")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataUnavailable { source, .. } => Some(source),
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        Self::Malformed(err)
    }
}

/// Tab for `.tsv`/`.tab`, comma otherwise.
fn delimiter_for_path(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

/// Load and sort the table at `path`. Uncached; see `data::cache` for the memoized variant.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let raw = fs::read(path).map_err(|source| LoadError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(path.to_path_buf(), raw.as_slice(), delimiter_for_path(path))
}

pub fn parse_dataset(
    source: PathBuf,
    reader: impl Read,
    delimiter: u8,
) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    for required in [MATERIAL_FIELD, CAPACITY_FIELD] {
        if !columns.iter().any(|c| c == required) {
            return Err(LoadError::MissingColumn { column: required });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let fields: Vec<(String, FieldValue)> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cell = row.get(i).unwrap_or("");
                (name.clone(), FieldValue::for_column(name, cell))
            })
            .collect();
        let record = Record::new(fields);
        if let Some(FieldValue::Text(value)) = record.get(CAPACITY_FIELD) {
            return Err(LoadError::InvalidCapacity {
                line,
                value: value.clone(),
            });
        }
        records.push(record);
    }

    // Vec::sort_by is stable: equal capacities keep file order.
    records.sort_by(|a, b| compare_capacity(a.capacity(), b.capacity()));
    debug!(path = %source.display(), records = records.len(), "parsed dataset");

    Ok(Dataset::new(source, columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Dataset, LoadError> {
        parse_dataset(PathBuf::from("inline.csv"), text.as_bytes(), b',')
    }

    #[test]
    fn sorts_ascending_and_keeps_columns() {
        let ds = parse("material,capacity,doi\nB,3.5,10.1/b\nA,1.0,10.1/a\nC,2,10.1/c\n")
            .expect("table should parse");
        let names: Vec<String> = ds.records().iter().map(Record::material).collect();
        assert_eq!(names, ["A", "C", "B"]);
        assert_eq!(ds.columns(), ["material", "capacity", "doi"]);
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let ds = parse("material,capacity,doi\nA,1.0\n").expect("table should parse");
        assert_eq!(ds.records()[0].doi(), Some(&FieldValue::Missing));
    }

    #[test]
    fn text_capacity_is_rejected() {
        let err = parse("material,capacity\nA,lots\n").expect_err("capacity must be numeric");
        assert!(matches!(err, LoadError::InvalidCapacity { line: 2, .. }));
    }

    #[test]
    fn cells_display_as_written() {
        let ds = parse("material,capacity,batch,doi\n1.50,2.0,007,10.5555\n")
            .expect("table should parse");
        let record = &ds.records()[0];
        assert_eq!(record.material(), "1.50");
        assert_eq!(record.capacity(), Some(2.0));
        assert_eq!(record.get("capacity").map(ToString::to_string).as_deref(), Some("2.0"));
        assert_eq!(record.get("batch").map(ToString::to_string).as_deref(), Some("007"));
        assert_eq!(record.doi(), Some(&FieldValue::Text("10.5555".to_string())));
    }

    #[test]
    fn tsv_extension_selects_tab() {
        assert_eq!(delimiter_for_path(Path::new("x.tsv")), b'\t');
        assert_eq!(delimiter_for_path(Path::new("data.csv")), b',');
    }
}
