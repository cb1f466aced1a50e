//! Planner configuration.
//!
//! Typically loaded from a JSON file by the application crate (feature
//! `serde`) and handed to the network builder and the simulation engine.
//! Every field has a default, so a partial file is fine.

use crate::metrics::{
    DEFAULT_ACTUAL_UNITS, DEFAULT_BASE_SPEED_KMH, DEFAULT_MAX_UNITS, DEFAULT_MIN_SPEED_KMH,
    LoadProfile, SpeedModel,
};
use crate::{CoreError, CoreResult};

/// Top-level tunables shared by the builder and the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Speed on flat, non-overloaded track.  Default: 60 km/h.
    pub base_speed_kmh: f64,

    /// Floor every effective speed is clamped to.  Default: 1 km/h.
    pub min_speed_kmh: f64,

    /// How far a drawn line endpoint may be from a stop and still snap onto
    /// it.  Default: 25 m.
    pub snap_tolerance_m: f64,

    /// How close a path vertex must be to a stop for the vehicle to treat
    /// arrival there as a stop call.  Default: 1 m.
    pub stop_match_tolerance_m: f64,

    /// Segment rating used when a drawn line carries none.  Default: 5.
    pub default_max_units: u32,

    /// Vehicle units on a new route.  Default: 5.
    pub default_vehicle_units: u32,

    /// Frame spacing for fixed-step and wall-clock playback.  Default: 1/60 s.
    pub frame_interval_secs: f64,

    /// Simulated seconds per real second.  Default: 1.
    pub speed_multiplier: f64,
}

impl PlannerConfig {
    /// Check every field; returns the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("base_speed_kmh", self.base_speed_kmh),
            ("min_speed_kmh", self.min_speed_kmh),
            ("frame_interval_secs", self.frame_interval_secs),
            ("speed_multiplier", self.speed_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::Config(format!("{name} must be finite and > 0, got {value}")));
            }
        }
        let non_negative = [
            ("snap_tolerance_m", self.snap_tolerance_m),
            ("stop_match_tolerance_m", self.stop_match_tolerance_m),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CoreError::Config(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        Ok(())
    }

    /// The speed model implied by `base_speed_kmh` / `min_speed_kmh`.
    pub fn speed_model(&self) -> SpeedModel {
        SpeedModel::with_floor(self.base_speed_kmh, self.min_speed_kmh)
    }

    /// Flat-track load profile with the configured defaults.
    pub fn default_load(&self) -> LoadProfile {
        LoadProfile::new(0.0, self.default_max_units, self.default_vehicle_units)
    }

    /// Parse a JSON document; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    #[cfg(feature = "serde")]
    pub fn load(path: &std::path::Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_speed_kmh:         DEFAULT_BASE_SPEED_KMH,
            min_speed_kmh:          DEFAULT_MIN_SPEED_KMH,
            snap_tolerance_m:       25.0,
            stop_match_tolerance_m: 1.0,
            default_max_units:      DEFAULT_MAX_UNITS,
            default_vehicle_units:  DEFAULT_ACTUAL_UNITS,
            frame_interval_secs:    1.0 / 60.0,
            speed_multiplier:       1.0,
        }
    }
}
