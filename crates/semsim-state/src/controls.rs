//! Control group structs and the fixed field schema for each group.
//!
//! Field names on the wire are camelCase (`coarseFocus`, `gunX`, ...) to
//! match what the panel frontend sends. The generic control endpoints
//! address fields by these wire names at runtime, so each group carries an
//! explicit dispatch table mapping known names to their slots. Unknown
//! names are rejected by the table rather than touching anything --
//! the HTTP layer decides how to report that (see `semsim-server`).
//!
//! Only float-typed fields are addressable by name. The typed beam fields
//! (`hvSetting`, `scintillatorHV`, `spotSize`) are reachable solely through
//! their dedicated store setters, so a stray float can never land in a
//! string or boolean slot.

use serde::{Deserialize, Serialize};

/// Default raw value for the image sliders and the beam deflection coils.
const MID_SCALE: f64 = 2048.0;

/// Which control group a generic field write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlGroup {
    /// Image subsystem (focus, stigmator, contrast/brightness).
    Image,
    /// Beam subsystem (gun, deflection, filament, HV, telemetry).
    Beam,
}

/// Image subsystem controls.
///
/// All six fields are unconstrained floats on a nominal 0..4096 slider
/// scale, defaulting to mid-scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageControls {
    /// Coarse objective focus.
    pub coarse_focus: f64,
    /// Fine objective focus.
    pub fine_focus: f64,
    /// Stigmator X correction.
    pub stig_x: f64,
    /// Stigmator Y correction.
    pub stig_y: f64,
    /// Detector contrast.
    pub contrast: f64,
    /// Detector brightness.
    pub brightness: f64,
}

impl Default for ImageControls {
    fn default() -> Self {
        Self {
            coarse_focus: MID_SCALE,
            fine_focus: MID_SCALE,
            stig_x: MID_SCALE,
            stig_y: MID_SCALE,
            contrast: MID_SCALE,
            brightness: MID_SCALE,
        }
    }
}

impl ImageControls {
    /// Write `value` into the field named `name` (wire spelling).
    ///
    /// Returns `false` without mutating anything if `name` is not in the
    /// image schema.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "coarseFocus" => &mut self.coarse_focus,
            "fineFocus" => &mut self.fine_focus,
            "stigX" => &mut self.stig_x,
            "stigY" => &mut self.stig_y,
            "contrast" => &mut self.contrast,
            "brightness" => &mut self.brightness,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Beam subsystem controls plus the generator-driven telemetry pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamControls {
    /// Gun alignment X.
    pub gun_x: f64,
    /// Gun alignment Y.
    pub gun_y: f64,
    /// Beam shift X.
    pub beam_x: f64,
    /// Beam shift Y.
    pub beam_y: f64,
    /// Objective wobble amplitude.
    pub wobble: f64,
    /// High-voltage setting label, e.g. `"1 kV"`. Free-form by contract.
    pub hv_setting: String,
    /// Filament current, percent.
    pub filament: f64,
    /// Bias, percent.
    pub bias: f64,
    /// Scintillator high voltage on/off.
    #[serde(rename = "scintillatorHV")]
    pub scintillator_hv: bool,
    /// Accumulated filament-on time.
    pub filament_time: f64,
    /// Spot size step. Nominally one of {1,3,5,7,9,11,13,15}; the set is
    /// not enforced, any integer is stored as-is.
    pub spot_size: i64,
    /// Chamber vacuum reading, 0..=100. Driven by the telemetry generator.
    pub vacuum: f64,
    /// Emission current reading, 0..=100. Driven by the telemetry
    /// generator in lock-step with `vacuum`.
    pub emission: f64,
}

impl Default for BeamControls {
    fn default() -> Self {
        Self {
            gun_x: MID_SCALE,
            gun_y: MID_SCALE,
            beam_x: MID_SCALE,
            beam_y: MID_SCALE,
            wobble: 30.0,
            hv_setting: String::from("1 kV"),
            filament: 24.0,
            bias: 24.0,
            scintillator_hv: false,
            filament_time: 0.0,
            spot_size: 1,
            vacuum: 0.0,
            emission: 0.0,
        }
    }
}

impl BeamControls {
    /// Write `value` into the float field named `name` (wire spelling).
    ///
    /// Covers every float-typed beam field, including the telemetry pair
    /// (a manual telemetry write just gets overwritten on the generator's
    /// next tick). Returns `false` without mutating anything for unknown
    /// or non-float names.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "gunX" => &mut self.gun_x,
            "gunY" => &mut self.gun_y,
            "beamX" => &mut self.beam_x,
            "beamY" => &mut self.beam_y,
            "wobble" => &mut self.wobble,
            "filament" => &mut self.filament,
            "bias" => &mut self.bias,
            "filamentTime" => &mut self.filament_time,
            "vacuum" => &mut self.vacuum,
            "emission" => &mut self.emission,
            _ => return false,
        };
        *slot = value;
        true
    }
}
