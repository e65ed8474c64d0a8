use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::data::{self, LoadError};
use crate::plot::build_plot;
use crate::selection::{details_for, on_select, DetailsView, SelectionError, SelectionState};
use crate::server::AppState;

#[derive(Debug)]
pub enum ApiError {
    Load(LoadError),
    Selection(SelectionError),
    BadRequest(String),
    UnknownSession(String),
    Serialize(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{}", err.user_message()),
            Self::Selection(err) => write!(f, "{err}"),
            Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::UnknownSession(id) => write!(f, "unknown session '{id}'"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        Self::Selection(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "co2-explorer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub path: String,
    pub records: usize,
    pub columns: Vec<String>,
    pub capacity_min: Option<f64>,
    pub capacity_max: Option<f64>,
    pub loaded_at: String,
}

pub fn dataset_payload(config: &AppConfig) -> Result<String, ApiError> {
    let dataset = data::load_cached(&config.data_path)?;
    let range = dataset.capacity_range();
    let summary = DatasetSummary {
        path: dataset.source().display().to_string(),
        records: dataset.len(),
        columns: dataset.columns().to_vec(),
        capacity_min: range.map(|(lo, _)| lo),
        capacity_max: range.map(|(_, hi)| hi),
        loaded_at: dataset.loaded_at().to_rfc3339(),
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

pub fn plot_payload(config: &AppConfig) -> Result<String, ApiError> {
    let dataset = data::load_cached(&config.data_path)?;
    Ok(serde_json::to_string_pretty(&build_plot(&dataset))?)
}

/// Stateless lookup for `GET /api/records/{position}`.
pub fn record_payload(config: &AppConfig, raw_position: &str) -> Result<String, ApiError> {
    let position = parse_position(raw_position)?;
    let dataset = data::load_cached(&config.data_path)?;
    let payload = on_select(&dataset, position)?;
    Ok(serde_json::to_string_pretty(&payload)?)
}

fn parse_position(raw: &str) -> Result<usize, ApiError> {
    raw.trim().parse::<usize>().map_err(|_| {
        ApiError::BadRequest(format!("position must be a non-negative integer, got '{raw}'"))
    })
}

/// Value of `key` in the query string of `path`, if present.
fn query_param<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    let query = path.split('?').nth(1)?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn parse_session(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("invalid session id '{raw}'")))
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub status: &'static str,
    pub session: Uuid,
    pub selection: SelectionState,
    pub view: DetailsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub fn session_create_payload(state: &AppState) -> Result<String, ApiError> {
    let session = state.sessions.create();
    let response = SessionResponse {
        status: "ok",
        session,
        selection: SelectionState::Idle,
        view: DetailsView::placeholder(),
        warning: None,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

/// `GET /api/details?session=<id>`: what the details panel currently shows.
pub fn details_payload(state: &AppState, path: &str) -> Result<String, ApiError> {
    let raw = query_param(path, "session")
        .ok_or_else(|| ApiError::BadRequest("missing 'session' query parameter".to_string()))?;
    let session = parse_session(raw)?;
    let selection = state
        .sessions
        .state(&session)
        .ok_or_else(|| ApiError::UnknownSession(session.to_string()))?;
    let dataset = data::load_cached(&state.config.data_path)?;

    let response = SessionResponse {
        status: "ok",
        session,
        selection,
        view: details_for(selection, &dataset),
        warning: None,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectRequest {
    pub session: String,
    pub position: usize,
}

/// `POST /api/select`: a point was clicked. Out-of-range positions leave the session
/// unchanged and answer with the placeholder plus a warning.
pub fn select_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let request: SelectRequest = serde_json::from_str(body)
        .map_err(|err| ApiError::BadRequest(format!("Invalid request body: {err}")))?;
    let session = parse_session(&request.session)?;
    let current = state
        .sessions
        .state(&session)
        .ok_or_else(|| ApiError::UnknownSession(session.to_string()))?;
    let dataset = data::load_cached(&state.config.data_path)?;

    let response = match on_select(&dataset, request.position) {
        Ok(payload) => {
            let selection = state
                .sessions
                .click(&session, request.position)
                .ok_or_else(|| ApiError::UnknownSession(session.to_string()))?;
            SessionResponse {
                status: "ok",
                session,
                selection,
                view: DetailsView::Record(payload),
                warning: None,
            }
        }
        Err(err) => {
            tracing::warn!(%session, error = %err, "ignoring selection");
            SessionResponse {
                status: "warning",
                session,
                selection: current,
                view: DetailsView::placeholder(),
                warning: Some(err.to_string()),
            }
        }
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

pub fn cache_clear_payload() -> Result<String, serde_json::Error> {
    let cleared = data::cache::clear();
    serde_json::to_string_pretty(&serde_json::json!({ "status": "ok", "cleared": cleared }))
}
