use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use co2_explorer::config::AppConfig;
use co2_explorer::server::routes::route_request;
use co2_explorer::server::{build_router, AppState};
use tower::ServiceExt;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/materials.csv")
}

fn state_for(data_path: PathBuf) -> AppState {
    AppState::new(AppConfig {
        data_path,
        ..AppConfig::default()
    })
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

fn new_session(state: &AppState) -> String {
    let response = route_request(state, "POST", "/api/session", "");
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body);
    assert_eq!(payload["selection"]["state"], "idle");
    assert_eq!(payload["view"]["view"], "placeholder");
    payload["session"]
        .as_str()
        .expect("session id should be a string")
        .to_string()
}

#[test]
fn health_endpoint_returns_ok_json() {
    let state = state_for(fixture_path());
    let response = route_request(&state, "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn index_renders_two_column_page() {
    let state = state_for(fixture_path());
    let response = route_request(&state, "GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("Material Capacity"));
    assert!(response.body.contains("Material Details"));
}

#[test]
fn plot_endpoint_lists_points_in_sorted_order() {
    let state = state_for(fixture_path());
    let response = route_request(&state, "GET", "/api/plot", "");
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    let points = payload["points"].as_array().expect("points should be an array");
    assert_eq!(points.len(), 5);
    assert_eq!(points[0]["material"], "Alpha");
    assert_eq!(points[0]["x"], 0);
    assert_eq!(points[3]["y"], 3.5);
    assert!(points[4]["y"].is_null());
    assert_eq!(payload["height"], 600);
}

#[test]
fn dataset_endpoint_summarises_the_table() {
    let state = state_for(fixture_path());
    let payload = json(&route_request(&state, "GET", "/api/dataset", "").body);
    assert_eq!(payload["records"], 5);
    assert_eq!(payload["capacity_min"], 1.25);
    assert_eq!(payload["capacity_max"], 3.5);
    assert_eq!(payload["columns"][0], "material");
}

#[test]
fn missing_file_shows_only_the_error() {
    let state = state_for(PathBuf::from("does-not-exist/data.csv"));

    let page = route_request(&state, "GET", "/", "");
    assert_eq!(page.status_code, 503);
    assert!(page.body.contains("not found"));
    assert!(!page.body.contains("id=\"plot\""));

    let plot = route_request(&state, "GET", "/api/plot", "");
    assert_eq!(plot.status_code, 503);
    assert_eq!(json(&plot.body)["status"], "error");
}

#[test]
fn record_endpoint_formats_details() {
    let state = state_for(fixture_path());
    let response = route_request(&state, "GET", "/api/records/3", "");
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["title"], "Gamma");
    let entries = payload["entries"].as_array().expect("entries should be an array");
    assert_eq!(entries[1]["label"], "Surface area");
    assert_eq!(entries[1]["kind"], "text");
    assert_eq!(entries[2]["kind"], "link");
    assert_eq!(entries[2]["href"], "https://doi.org/10.5555/gamma");
}

#[test]
fn record_endpoint_rejects_out_of_range_and_garbage() {
    let state = state_for(fixture_path());
    assert_eq!(route_request(&state, "GET", "/api/records/5", "").status_code, 404);
    assert_eq!(route_request(&state, "GET", "/api/records/abc", "").status_code, 400);
}

#[test]
fn session_moves_from_idle_to_selected() {
    let state = state_for(fixture_path());
    let session = new_session(&state);

    let details = route_request(&state, "GET", &format!("/api/details?session={session}"), "");
    assert_eq!(details.status_code, 200);
    assert_eq!(json(&details.body)["view"]["view"], "placeholder");

    let body = format!(r#"{{"session":"{session}","position":1}}"#);
    let selected = json(&route_request(&state, "POST", "/api/select", &body).body);
    assert_eq!(selected["status"], "ok");
    assert_eq!(selected["selection"]["state"], "selected");
    assert_eq!(selected["selection"]["position"], 1);
    assert_eq!(selected["view"]["view"], "record");
    assert_eq!(selected["view"]["title"], "Beta");

    let body = format!(r#"{{"session":"{session}","position":2}}"#);
    let reselected = json(&route_request(&state, "POST", "/api/select", &body).body);
    assert_eq!(reselected["view"]["title"], "Delta");

    let path = format!("/api/details?session={session}");
    let details = json(&route_request(&state, "GET", &path, "").body);
    assert_eq!(details["selection"]["position"], 2);
    assert_eq!(details["view"]["title"], "Delta");
}

#[test]
fn out_of_range_click_keeps_state_and_shows_placeholder() {
    let state = state_for(fixture_path());
    let session = new_session(&state);

    let body = format!(r#"{{"session":"{session}","position":0}}"#);
    route_request(&state, "POST", "/api/select", &body);

    let body = format!(r#"{{"session":"{session}","position":42}}"#);
    let response = route_request(&state, "POST", "/api/select", &body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body);
    assert_eq!(payload["status"], "warning");
    assert_eq!(payload["view"]["view"], "placeholder");
    assert_eq!(payload["selection"]["position"], 0);
    assert!(payload["warning"]
        .as_str()
        .is_some_and(|w| w.contains("invalid selection")));
}

#[test]
fn select_rejects_bad_bodies_and_unknown_sessions() {
    let state = state_for(fixture_path());
    let bad = route_request(&state, "POST", "/api/select", "{bad json}");
    assert_eq!(bad.status_code, 400);
    assert!(bad.body.contains("Invalid request body"));

    let unknown = route_request(
        &state,
        "POST",
        "/api/select",
        r#"{"session":"6f1c1a52-4a5e-4d0c-9a43-3c8f0f6d2b11","position":0}"#,
    );
    assert_eq!(unknown.status_code, 404);

    let missing = route_request(&state, "GET", "/api/details", "");
    assert_eq!(missing.status_code, 400);
}

#[test]
fn unknown_route_is_not_found() {
    let state = state_for(fixture_path());
    let response = route_request(&state, "DELETE", "/api/plot", "");
    assert_eq!(response.status_code, 404);
    assert_eq!(json(&response.body)["message"], "Route not found");
}

#[tokio::test]
async fn axum_router_forwards_to_route_request() {
    let app = build_router(Arc::new(state_for(fixture_path())));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/records/0")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().ok(),
        Some("application/json")
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let payload: serde_json::Value =
        serde_json::from_slice(&bytes).expect("response should be valid json");
    assert_eq!(payload["title"], "Alpha");
}

#[test]
fn session_store_stays_within_its_limit() {
    let state = AppState::new(AppConfig {
        data_path: fixture_path(),
        max_sessions: 3,
        ..AppConfig::default()
    });
    let first = new_session(&state);
    for _ in 0..50 {
        new_session(&state);
    }
    assert_eq!(state.sessions.len(), 3);

    let path = format!("/api/details?session={first}");
    assert_eq!(route_request(&state, "GET", &path, "").status_code, 404);
}

#[tokio::test]
async fn axum_router_carries_error_status_and_content_type() {
    let app = build_router(Arc::new(state_for(PathBuf::from("does-not-exist/data.csv"))));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.headers()["content-type"].to_str().ok(),
        Some("text/html; charset=utf-8")
    );
}
