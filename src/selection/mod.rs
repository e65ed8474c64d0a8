//! Turn a selected plot position into a details payload.
//!
//! Every field except `material` becomes a `label: value` line. Field-specific
//! rendering (currently only `doi`) is looked up in a dispatch table so new
//! special cases don't touch the generic path.

pub mod session;
pub mod state;

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;

use crate::data::record::{DOI_FIELD, MATERIAL_FIELD};
use crate::data::{Dataset, FieldValue};

pub use session::SessionStore;
pub use state::{details_for, DetailsView, SelectionState, PLACEHOLDER_MESSAGE};

pub const DOI_RESOLVER: &str = "https://doi.org/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    InvalidSelection { position: usize, len: usize },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelection { position, len } => write!(
                f,
                "invalid selection: position {position} outside dataset of {len} record(s)"
            ),
        }
    }
}

impl std::error::Error for SelectionError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailEntry {
    Text {
        label: String,
        value: String,
    },
    Link {
        label: String,
        text: String,
        href: String,
    },
}

impl DetailEntry {
    pub fn label(&self) -> &str {
        match self {
            Self::Text { label, .. } | Self::Link { label, .. } => label,
        }
    }

    pub fn to_markdown(&self) -> String {
        match self {
            Self::Text { label, value } => format!("**{label}:** {value}"),
            Self::Link { label, text, href } => format!("**{label}:** [{text}]({href})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPayload {
    pub position: usize,
    pub title: String,
    pub entries: Vec<DetailEntry>,
}

impl DisplayPayload {
    pub fn entry(&self, label: &str) -> Option<&DetailEntry> {
        self.entries.iter().find(|e| e.label() == label)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("### {}\n", self.title);
        for entry in &self.entries {
            let _ = writeln!(out, "\n{}", entry.to_markdown());
        }
        out
    }
}

/// `surface_area` -> `Surface area`. Underscores become spaces, first character upper-cased,
/// the rest lower-cased.
pub fn display_label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub type FieldRenderer = fn(label: String, value: &FieldValue) -> DetailEntry;

fn render_text(label: String, value: &FieldValue) -> DetailEntry {
    DetailEntry::Text {
        label,
        value: value.to_string(),
    }
}

fn render_doi(label: String, value: &FieldValue) -> DetailEntry {
    if value.is_missing() {
        return render_text(label, value);
    }
    let text = value.to_string();
    DetailEntry::Link {
        href: format!("{DOI_RESOLVER}{text}"),
        label,
        text,
    }
}

/// Field name -> renderer. Fields not listed use the plain text renderer.
pub struct FieldRenderers {
    special: HashMap<&'static str, FieldRenderer>,
}

impl Default for FieldRenderers {
    fn default() -> Self {
        let mut special: HashMap<&'static str, FieldRenderer> = HashMap::new();
        special.insert(DOI_FIELD, render_doi);
        FieldRenderers { special }
    }
}

impl FieldRenderers {
    pub fn with(mut self, field: &'static str, renderer: FieldRenderer) -> Self {
        self.special.insert(field, renderer);
        self
    }

    pub fn render(&self, key: &str, value: &FieldValue) -> DetailEntry {
        let renderer = self.special.get(key).copied().unwrap_or(render_text);
        renderer(display_label(key), value)
    }

    pub fn select(
        &self,
        dataset: &Dataset,
        position: usize,
    ) -> Result<DisplayPayload, SelectionError> {
        let record = dataset
            .get(position)
            .ok_or(SelectionError::InvalidSelection {
                position,
                len: dataset.len(),
            })?;

        let entries = record
            .fields()
            .filter(|(key, _)| *key != MATERIAL_FIELD)
            .map(|(key, value)| self.render(key, value))
            .collect();

        Ok(DisplayPayload {
            position,
            title: record.material(),
            entries,
        })
    }
}

/// Details for the record at `position` using the default renderers.
pub fn on_select(dataset: &Dataset, position: usize) -> Result<DisplayPayload, SelectionError> {
    FieldRenderers::default().select(dataset, position)
}
