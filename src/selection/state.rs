use serde::Serialize;

use crate::data::Dataset;
use crate::selection::{on_select, DisplayPayload};

pub const PLACEHOLDER_MESSAGE: &str = "Click on a data point in the plot to see its details here.";

/// Per-session selection. Starts `Idle`; once a point is picked it never returns to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "position", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(usize),
}

impl SelectionState {
    /// Any click moves to `Selected`, from either state.
    pub fn on_click(self, position: usize) -> Self {
        SelectionState::Selected(position)
    }

    pub fn position(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Selected(position) => Some(position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DetailsView {
    Placeholder { message: &'static str },
    Record(DisplayPayload),
}

impl DetailsView {
    pub fn placeholder() -> Self {
        DetailsView::Placeholder {
            message: PLACEHOLDER_MESSAGE,
        }
    }

    pub fn to_markdown(&self) -> String {
        match self {
            Self::Placeholder { message } => format!("{message}\n"),
            Self::Record(payload) => payload.to_markdown(),
        }
    }
}

/// What the details panel shows for `state`. A selection that no longer fits the
/// dataset (e.g. after a reload) shows the placeholder.
pub fn details_for(state: SelectionState, dataset: &Dataset) -> DetailsView {
    state
        .position()
        .and_then(|position| on_select(dataset, position).ok())
        .map(DetailsView::Record)
        .unwrap_or_else(DetailsView::placeholder)
}
