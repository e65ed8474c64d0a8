use crate::data;
use crate::server::api::{self, ApiError};
use crate::server::page;
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        HttpResponse {
            status_code: 200,
            content_type: "application/json",
            body,
        }
    }

    fn html(status_code: u16, body: String) -> Self {
        HttpResponse {
            status_code,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }
}

/// Dispatch one request. `path` may carry a query string.
pub fn route_request(state: &AppState, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") | ("GET", "/index.html") => index_response(state),
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/dataset") => api_response(api::dataset_payload(&state.config)),
        ("GET", "/api/plot") => api_response(api::plot_payload(&state.config)),
        ("GET", route) if route.starts_with("/api/records/") => {
            let raw = route.trim_start_matches("/api/records/");
            api_response(api::record_payload(&state.config, raw))
        }
        ("POST", "/api/session") => api_response(api::session_create_payload(state)),
        ("GET", "/api/details") => api_response(api::details_payload(state, path)),
        ("POST", "/api/select") => api_response(api::select_payload(state, body)),
        ("POST", "/api/cache/clear") => match api::cache_clear_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        _ => error_response(404, "Route not found"),
    }
}

/// The page itself. When the table can't be loaded only the error is shown, no plot.
fn index_response(state: &AppState) -> HttpResponse {
    match data::load_cached(&state.config.data_path) {
        Ok(_) => HttpResponse::html(200, page::index_html(&state.config.page_title)),
        Err(err) => HttpResponse::html(
            503,
            page::error_html(&state.config.page_title, &err.user_message()),
        ),
    }
}

fn api_response(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err @ ApiError::Load(_)) => {
            error_response(503, &err.to_string())
        }
        Err(err @ ApiError::Selection(_)) => error_response(404, &err.to_string()),
        Err(err @ ApiError::UnknownSession(_)) => {
            error_response(404, &err.to_string())
        }
        Err(err @ ApiError::BadRequest(_)) => error_response(400, &err.to_string()),
        Err(err @ ApiError::Serialize(_)) => {
            error_response(500, &err.to_string())
        }
    }
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
