use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub const MATERIAL_FIELD: &str = "material";
pub const CAPACITY_FIELD: &str = "capacity";
pub const DOI_FIELD: &str = "doi";

/// A single cell. Numeric cells keep the text they were written as, so display
/// never reformats what the file says.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number { value: f64, raw: String },
    Text(String),
    Missing,
}

impl FieldValue {
    /// Infer a value from a raw (already trimmed) cell.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Missing;
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_nan() => Self::Missing,
            Ok(value) => Self::Number {
                value,
                raw: raw.to_string(),
            },
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    /// Keep the cell verbatim; only emptiness is interpreted.
    pub fn text(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Missing
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// `material` and `doi` are identifiers and stay text even when they look numeric.
    pub fn for_column(column: &str, raw: &str) -> Self {
        match column {
            MATERIAL_FIELD | DOI_FIELD => Self::text(raw),
            _ => Self::infer(raw),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            Self::Text(_) | Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { raw, .. } => f.write_str(raw),
            Self::Text(value) => f.write_str(value),
            Self::Missing => f.write_str("n/a"),
        }
    }
}

/// One material row. Fields keep the file's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Record { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Material name as shown in titles and hover labels.
    pub fn material(&self) -> String {
        self.get(MATERIAL_FIELD)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Numeric capacity, `None` when the cell was empty.
    pub fn capacity(&self) -> Option<f64> {
        self.get(CAPACITY_FIELD).and_then(FieldValue::as_f64)
    }

    pub fn doi(&self) -> Option<&FieldValue> {
        self.get(DOI_FIELD)
    }
}

/// Ascending by capacity with missing capacities last.
pub(crate) fn compare_capacity(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Records sorted ascending by capacity. Index into `records()` is the position
/// shared by the plot x-axis and selection lookup.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    columns: Vec<String>,
    records: Vec<Record>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub(crate) fn new(source: PathBuf, columns: Vec<String>, records: Vec<Record>) -> Self {
        Dataset {
            source,
            columns,
            records,
            loaded_at: Utc::now(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Smallest and largest known capacity.
    pub fn capacity_range(&self) -> Option<(f64, f64)> {
        let mut known = self.records.iter().filter_map(Record::capacity);
        let first = known.next()?;
        Some(known.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))))
    }
}
