//! Integration tests for the control panel API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, the
//! store contract, and broadcast fan-out without a live network.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use semsim_server::registry::ObserverConnection;
use semsim_server::router::build_router;
use semsim_server::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

fn make_state() -> Arc<AppState> {
    Arc::new(AppState::new())
}

fn make_router(state: &Arc<AppState>) -> Router {
    build_router(Arc::clone(state))
}

fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_snapshot(state: &Arc<AppState>) -> Value {
    let response = make_router(state)
        .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

// =========================================================================
// Status page and snapshot
// =========================================================================

#[tokio::test]
async fn index_returns_html() {
    let state = make_state();
    let response = make_router(&state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn state_starts_at_defaults() {
    let state = make_state();
    let json = get_snapshot(&state).await;

    assert_eq!(json["image"]["coarseFocus"], 2048.0);
    assert_eq!(json["image"]["brightness"], 2048.0);
    assert_eq!(json["beam"]["gunX"], 2048.0);
    assert_eq!(json["beam"]["wobble"], 30.0);
    assert_eq!(json["beam"]["hvSetting"], "1 kV");
    assert_eq!(json["beam"]["scintillatorHV"], false);
    assert_eq!(json["beam"]["spotSize"], 1);
    assert_eq!(json["beam"]["vacuum"], 0.0);
    assert_eq!(json["beam"]["emission"], 0.0);
}

// =========================================================================
// Generic control writes
// =========================================================================

#[tokio::test]
async fn image_control_updates_exactly_one_field() {
    let state = make_state();
    let response = make_router(&state)
        .oneshot(post_json(
            "/api/image/control",
            r#"{"name":"contrast","value":3001.5}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["status"], "success");
    assert_eq!(ack["message"], "Image Control: contrast set to 3001.5");

    let json = get_snapshot(&state).await;
    assert_eq!(json["image"]["contrast"], 3001.5);
    // Everything else untouched.
    assert_eq!(json["image"]["coarseFocus"], 2048.0);
    assert_eq!(json["beam"]["gunX"], 2048.0);
}

#[tokio::test]
async fn unknown_image_field_reports_success_and_mutates_nothing() {
    let state = make_state();
    let before = get_snapshot(&state).await;

    let response = make_router(&state)
        .oneshot(post_json(
            "/api/image/control",
            r#"{"name":"rotation","value":1.0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["status"], "success");

    assert_eq!(get_snapshot(&state).await, before);
}

#[tokio::test]
async fn beam_control_updates_wobble() {
    let state = make_state();
    let response = make_router(&state)
        .oneshot(post_json(
            "/api/beam/control",
            r#"{"name":"wobble","value":45.0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_snapshot(&state).await["beam"]["wobble"], 45.0);
}

#[tokio::test]
async fn beam_control_does_not_reach_typed_fields() {
    let state = make_state();
    let response = make_router(&state)
        .oneshot(post_json(
            "/api/beam/control",
            r#"{"name":"spotSize","value":7.0}"#,
        ))
        .await
        .unwrap();

    // Permissive success, but the typed field is untouched.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_snapshot(&state).await["beam"]["spotSize"], 1);
}

#[tokio::test]
async fn auto_endpoints_broadcast_without_mutation() {
    let state = make_state();
    let (observer, mut rx) = ObserverConnection::channel();
    state.registry.register(observer).await;
    let before = get_snapshot(&state).await;

    let response = make_router(&state)
        .oneshot(post_json("/api/image/auto/focus", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["message"], "Image Auto function initiated: focus");

    let broadcast = rx.recv().await.unwrap();
    assert!(broadcast.contains("Image Auto function initiated: focus"));
    assert_eq!(get_snapshot(&state).await, before);
}

// =========================================================================
// Dedicated beam endpoints
// =========================================================================

#[tokio::test]
async fn hv_end_to_end_with_broadcast() {
    let state = make_state();
    let (observer, mut rx) = ObserverConnection::channel();
    state.registry.register(observer).await;

    let response = make_router(&state)
        .oneshot(post_json("/api/beam/hv", r#"{"hvSetting":"5 kV"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["message"], "HV setting updated successfully");

    // The snapshot shows the new label; the rest of the beam group is
    // unchanged.
    let json = get_snapshot(&state).await;
    assert_eq!(json["beam"]["hvSetting"], "5 kV");
    assert_eq!(json["beam"]["filament"], 24.0);
    assert_eq!(json["beam"]["spotSize"], 1);

    // A connected listener observed a timestamped broadcast.
    let broadcast = rx.recv().await.unwrap();
    assert!(broadcast.starts_with('['));
    assert!(broadcast.contains("hvSetting=5 kV"));
}

#[tokio::test]
async fn filament_and_bias_round_trip() {
    let state = make_state();

    let response = make_router(&state)
        .oneshot(post_json("/api/beam/filament", r#"{"filament":67.5}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = make_router(&state)
        .oneshot(post_json("/api/beam/bias", r#"{"bias":12.0}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_snapshot(&state).await;
    assert_eq!(json["beam"]["filament"], 67.5);
    assert_eq!(json["beam"]["bias"], 12.0);
}

#[tokio::test]
async fn scintillator_toggles_on_and_off() {
    let state = make_state();

    let response = make_router(&state)
        .oneshot(post_json("/api/beam/scintillator_hv", r#"{"on":true}"#))
        .await
        .unwrap();
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["message"], "Scintillator HV set to ON");
    assert_eq!(get_snapshot(&state).await["beam"]["scintillatorHV"], true);

    let response = make_router(&state)
        .oneshot(post_json("/api/beam/scintillator_hv", r#"{"on":false}"#))
        .await
        .unwrap();
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["message"], "Scintillator HV set to OFF");
    assert_eq!(get_snapshot(&state).await["beam"]["scintillatorHV"], false);
}

#[tokio::test]
async fn filament_time_reset_zeroes_regardless_of_prior_value() {
    let state = make_state();

    let response = make_router(&state)
        .oneshot(post_json(
            "/api/beam/control",
            r#"{"name":"filamentTime","value":512.25}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_snapshot(&state).await["beam"]["filamentTime"], 512.25);

    let response = make_router(&state)
        .oneshot(post_json("/api/beam/filament_time_reset", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = body_to_json(response.into_body()).await;
    assert_eq!(ack["message"], "Filament Time Reset to 0");
    assert_eq!(get_snapshot(&state).await["beam"]["filamentTime"], 0.0);
}

#[tokio::test]
async fn spot_size_accepts_any_integer() {
    let state = make_state();

    // In the nominal set.
    let response = make_router(&state)
        .oneshot(post_json("/api/beam/spot_size", r#"{"spotSize":7}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_snapshot(&state).await["beam"]["spotSize"], 7);

    // Outside the nominal set: accepted as-is, the set is not enforced.
    let response = make_router(&state)
        .oneshot(post_json("/api/beam/spot_size", r#"{"spotSize":42}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_snapshot(&state).await["beam"]["spotSize"], 42);
}

// =========================================================================
// Malformed bodies
// =========================================================================

#[tokio::test]
async fn malformed_bodies_are_rejected_before_any_mutation() {
    let state = make_state();
    let before = get_snapshot(&state).await;

    // Missing required field.
    let response = make_router(&state)
        .oneshot(post_json("/api/image/control", r#"{"name":"contrast"}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Wrong type for a required field.
    let response = make_router(&state)
        .oneshot(post_json("/api/beam/hv", r#"{"hvSetting":3}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Non-integer spot size.
    let response = make_router(&state)
        .oneshot(post_json("/api/beam/spot_size", r#"{"spotSize":3.5}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Invalid JSON syntax.
    let response = make_router(&state)
        .oneshot(post_json("/api/beam/bias", "not json"))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    assert_eq!(get_snapshot(&state).await, before);
}

// =========================================================================
// Telemetry polling
// =========================================================================

#[tokio::test]
async fn beam_status_serves_the_telemetry_pair() {
    let state = make_state();
    state.store.set_telemetry(33.0, 33.0).await;

    let response = make_router(&state)
        .oneshot(
            Request::get("/api/beam/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["vacuum"], 33.0);
    assert_eq!(json["emission"], 33.0);
    // Only the pair, nothing else.
    assert_eq!(json.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn generator_output_is_visible_through_the_polling_endpoint() {
    use std::time::Duration;

    use semsim_telemetry::{GeneratorControl, spawn_generator};

    let state = make_state();
    let control = Arc::new(GeneratorControl::new());
    let handle = spawn_generator(
        Arc::clone(&state.store),
        Arc::clone(&control),
        Duration::from_millis(1),
    );

    tokio::time::sleep(Duration::from_millis(20)).await;
    control.request_stop();
    handle.await.unwrap();

    let response = make_router(&state)
        .oneshot(
            Request::get("/api/beam/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    let vacuum = json["vacuum"].as_f64().unwrap();
    let emission = json["emission"].as_f64().unwrap();
    assert_eq!(vacuum, emission);
    assert!((0.0..=100.0).contains(&vacuum));
}

// =========================================================================
// Routing
// =========================================================================

#[tokio::test]
async fn nonexistent_route_returns_404() {
    let state = make_state();
    let response = make_router(&state)
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
