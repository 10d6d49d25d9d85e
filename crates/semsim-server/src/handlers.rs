//! REST endpoint handlers for the control panel API.
//!
//! Every control handler follows the same contract: the body shape is
//! validated by the `Json` extractor (malformed bodies never reach the
//! store), exactly one store write happens, a human-readable status
//! message is broadcast to all observers with a timestamp prefix, and a
//! small acknowledgment is returned.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/image/control` | Generic image field write |
//! | `POST` | `/api/image/auto/{function}` | Image auto function (broadcast only) |
//! | `POST` | `/api/beam/control` | Generic beam field write |
//! | `POST` | `/api/beam/auto/{function}` | Beam auto function (broadcast only) |
//! | `POST` | `/api/beam/hv` | High-voltage setting |
//! | `POST` | `/api/beam/filament` | Filament percentage |
//! | `POST` | `/api/beam/bias` | Bias percentage |
//! | `POST` | `/api/beam/scintillator_hv` | Scintillator HV on/off |
//! | `POST` | `/api/beam/filament_time_reset` | Zero the filament timer |
//! | `POST` | `/api/beam/spot_size` | Spot size step |
//! | `GET` | `/api/state` | Full snapshot |
//! | `GET` | `/api/beam/status` | Telemetry pair, for polling |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use semsim_state::ControlGroup;
use tracing::info;

use crate::registry::stamp;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for the generic control endpoints: a field name in wire
/// spelling plus its new value.
#[derive(Debug, serde::Deserialize)]
pub struct ControlValue {
    /// Field name, e.g. `"coarseFocus"` or `"gunX"`.
    pub name: String,
    /// New value, written verbatim.
    pub value: f64,
}

/// Request body for `POST /api/beam/hv`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HvSetting {
    /// Free-form high-voltage label, e.g. `"5 kV"`.
    pub hv_setting: String,
}

/// Request body for `POST /api/beam/filament`.
#[derive(Debug, serde::Deserialize)]
pub struct FilamentSetting {
    /// Filament current, percent.
    pub filament: f64,
}

/// Request body for `POST /api/beam/bias`.
#[derive(Debug, serde::Deserialize)]
pub struct BiasSetting {
    /// Bias, percent.
    pub bias: f64,
}

/// Request body for `POST /api/beam/scintillator_hv`.
#[derive(Debug, serde::Deserialize)]
pub struct ScintillatorState {
    /// `true` switches the scintillator HV on.
    pub on: bool,
}

/// Request body for `POST /api/beam/spot_size`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSizeSetting {
    /// Spot size step. Any integer is accepted; the nominal set is not
    /// enforced.
    pub spot_size: i64,
}

/// Acknowledgment for the generic control and auto endpoints.
#[derive(Debug, serde::Serialize)]
struct ControlAck {
    /// Always `"success"` -- unknown field names included, by contract.
    status: &'static str,
    /// The broadcast status text, without the timestamp prefix.
    message: String,
}

/// Acknowledgment for the dedicated beam endpoints.
#[derive(Debug, serde::Serialize)]
struct MessageAck {
    /// Human-readable confirmation.
    message: String,
}

/// Telemetry pair served by the polling endpoint.
#[derive(Debug, serde::Serialize)]
struct BeamStatus {
    /// Chamber vacuum, 0..=100.
    vacuum: f64,
    /// Emission current, 0..=100.
    emission: f64,
}

/// Broadcast `message` to every observer, timestamped.
async fn notify(state: &AppState, message: &str) {
    state.registry.broadcast(&stamp(message)).await;
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let observers = state.registry.connection_count().await;
    let (vacuum, emission) = state.store.telemetry().await;

    Html(format!(
        r"<!DOCTYPE html>
<html lang='en'>
<head><meta charset='utf-8'><title>semsim</title></head>
<body>
    <h1>semsim control panel backend</h1>
    <p>Status: RUNNING &mdash; {observers} observer(s) connected</p>
    <p>Vacuum {vacuum:.0}% &mdash; Emission {emission:.0} &micro;A</p>
    <h2>Endpoints</h2>
    <ul>
        <li>GET <a href='/api/state'>/api/state</a> &mdash; full snapshot</li>
        <li>GET <a href='/api/beam/status'>/api/beam/status</a> &mdash; telemetry pair (poll me)</li>
        <li>POST /api/image/control, /api/image/auto/:function</li>
        <li>POST /api/beam/control, /api/beam/auto/:function</li>
        <li>POST /api/beam/hv, /filament, /bias, /scintillator_hv, /filament_time_reset, /spot_size</li>
        <li>WS /ws &mdash; timestamped control-change notifications</li>
    </ul>
</body>
</html>"
    ))
}

// ---------------------------------------------------------------------------
// POST /api/image/control -- generic image field write
// ---------------------------------------------------------------------------

/// Write one image field by wire name.
///
/// Unknown names mutate nothing but still acknowledge success -- the
/// panel's sliders rely on that permissive contract.
pub async fn update_image_control(
    State(state): State<Arc<AppState>>,
    Json(control): Json<ControlValue>,
) -> impl IntoResponse {
    let known = state
        .store
        .set_field(ControlGroup::Image, &control.name, control.value)
        .await;
    if !known {
        info!(name = %control.name, "ignored unknown image control field");
    }

    let message = format!("Image Control: {} set to {}", control.name, control.value);
    notify(&state, &message).await;
    Json(ControlAck {
        status: "success",
        message,
    })
}

// ---------------------------------------------------------------------------
// POST /api/image/auto/{function} -- image auto function
// ---------------------------------------------------------------------------

/// Announce an image auto function (auto focus, auto stig, ...).
///
/// Broadcast only; no state mutation.
pub async fn image_auto(
    State(state): State<Arc<AppState>>,
    Path(function): Path<String>,
) -> impl IntoResponse {
    let message = format!("Image Auto function initiated: {function}");
    notify(&state, &message).await;
    Json(ControlAck {
        status: "success",
        message,
    })
}

// ---------------------------------------------------------------------------
// POST /api/beam/control -- generic beam field write
// ---------------------------------------------------------------------------

/// Write one beam float field by wire name. Same permissive contract as
/// the image variant.
pub async fn update_beam_control(
    State(state): State<Arc<AppState>>,
    Json(control): Json<ControlValue>,
) -> impl IntoResponse {
    let known = state
        .store
        .set_field(ControlGroup::Beam, &control.name, control.value)
        .await;
    if !known {
        info!(name = %control.name, "ignored unknown beam control field");
    }

    let message = format!("Beam Control: {} set to {}", control.name, control.value);
    notify(&state, &message).await;
    Json(ControlAck {
        status: "success",
        message,
    })
}

// ---------------------------------------------------------------------------
// POST /api/beam/auto/{function} -- beam auto function
// ---------------------------------------------------------------------------

/// Announce a beam auto function (gun auto, beam auto, wobble ...).
///
/// Broadcast only; no state mutation.
pub async fn beam_auto(
    State(state): State<Arc<AppState>>,
    Path(function): Path<String>,
) -> impl IntoResponse {
    let message = format!("Beam Auto function initiated: {function}");
    notify(&state, &message).await;
    Json(ControlAck {
        status: "success",
        message,
    })
}

// ---------------------------------------------------------------------------
// POST /api/beam/hv -- high-voltage setting
// ---------------------------------------------------------------------------

/// Set the high-voltage label verbatim, e.g. `"1 kV"`, `"5 kV"`.
pub async fn set_beam_hv(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HvSetting>,
) -> impl IntoResponse {
    state.store.set_hv_setting(body.hv_setting.clone()).await;

    notify(&state, &format!("Beam HV: hvSetting={}", body.hv_setting)).await;
    Json(MessageAck {
        message: String::from("HV setting updated successfully"),
    })
}

// ---------------------------------------------------------------------------
// POST /api/beam/filament -- filament percentage
// ---------------------------------------------------------------------------

/// Set the filament percentage.
pub async fn set_beam_filament(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FilamentSetting>,
) -> impl IntoResponse {
    state.store.set_filament(body.filament).await;

    notify(&state, &format!("Beam filament: filament={}%", body.filament)).await;
    Json(MessageAck {
        message: String::from("Filament updated successfully"),
    })
}

// ---------------------------------------------------------------------------
// POST /api/beam/bias -- bias percentage
// ---------------------------------------------------------------------------

/// Set the bias percentage.
pub async fn set_beam_bias(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BiasSetting>,
) -> impl IntoResponse {
    state.store.set_bias(body.bias).await;

    notify(&state, &format!("Beam bias: bias={}%", body.bias)).await;
    Json(MessageAck {
        message: String::from("Bias updated successfully"),
    })
}

// ---------------------------------------------------------------------------
// POST /api/beam/scintillator_hv -- scintillator on/off
// ---------------------------------------------------------------------------

/// Switch the scintillator high voltage on or off.
pub async fn set_scintillator_hv(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScintillatorState>,
) -> impl IntoResponse {
    state.store.set_scintillator_hv(body.on).await;

    let status_text = if body.on { "ON" } else { "OFF" };
    let message = format!("Scintillator HV set to {status_text}");
    notify(&state, &message).await;
    Json(MessageAck { message })
}

// ---------------------------------------------------------------------------
// POST /api/beam/filament_time_reset -- zero the filament timer
// ---------------------------------------------------------------------------

/// Reset the accumulated filament time to zero. Takes no body; the reset
/// value is always 0 regardless of the request.
pub async fn filament_time_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.reset_filament_time().await;

    let message = String::from("Filament Time Reset to 0");
    notify(&state, &message).await;
    Json(MessageAck { message })
}

// ---------------------------------------------------------------------------
// POST /api/beam/spot_size -- spot size step
// ---------------------------------------------------------------------------

/// Set the spot size step.
///
/// The nominal set is {1,3,5,7,9,11,13,15} but any integer is accepted
/// as-is; the panel is trusted to send sensible steps.
pub async fn set_spot_size(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SpotSizeSetting>,
) -> impl IntoResponse {
    state.store.set_spot_size(body.spot_size).await;

    let message = format!("Spot Size changed to {}", body.spot_size);
    notify(&state, &message).await;
    Json(MessageAck { message })
}

// ---------------------------------------------------------------------------
// GET /api/state -- full snapshot
// ---------------------------------------------------------------------------

/// Return a consistent snapshot of both control groups.
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.snapshot().await)
}

// ---------------------------------------------------------------------------
// GET /api/beam/status -- telemetry pair
// ---------------------------------------------------------------------------

/// Return only the generator-driven telemetry pair. Intended for
/// polling: the generator never pushes, so this is how observers follow
/// vacuum and emission.
pub async fn get_beam_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (vacuum, emission) = state.store.telemetry().await;
    Json(BeamStatus { vacuum, emission })
}
