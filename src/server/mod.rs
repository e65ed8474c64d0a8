use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::data;
use crate::selection::SessionStore;

pub mod api;
pub mod page;
pub mod routes;

/// Shared by every request: settings plus per-session selection state.
/// The dataset itself lives in `data::cache`.
#[derive(Debug, Default)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions = SessionStore::with_limits(
            config.max_sessions,
            Duration::from_secs(config.session_idle_secs),
        );
        AppState { config, sessions }
    }
}

/// All requests go through `routes::route_request`; axum only moves bytes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let body = String::from_utf8_lossy(&body).into_owned();

    // Loading may touch the filesystem; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || {
        routes::route_request(&state, method.as_str(), &path, &body)
    })
    .await;

    match response {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                [(header::CONTENT_TYPE, response.content_type)],
                response.body,
            )
                .into_response()
        }
        Err(err) => {
            warn!(error = %err, "request handler failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn serve(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    match data::load_cached(&config.data_path) {
        Ok(dataset) => info!(
            path = %config.data_path.display(),
            records = dataset.len(),
            "dataset ready"
        ),
        Err(err) => warn!(error = %err, "dataset unavailable; the page will show the error"),
    }

    let app = build_router(Arc::new(AppState::new(config)));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("co2-explorer listening on http://{bind_addr}");
    axum::serve(listener, app).await
}

pub fn run_server(config: AppConfig) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config))
}
