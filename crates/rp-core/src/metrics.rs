//! Travel-time metrics: effective speed under gradient and load, driving and
//! dwell time, and human-readable duration formatting.
//!
//! # Speed formula
//!
//! ```text
//! slope_modifier    = 1 - |gradient_percent| * 0.02
//! overload_modifier = actual > max ? 1 - 0.05 * (actual - max) : 1
//! effective_speed   = base_speed * slope_modifier * overload_modifier
//! driving_time_secs = distance_km / effective_speed * 3600
//! ```
//!
//! Each modifier is floored at zero before multiplying (two negative
//! modifiers must not cancel into a positive speed), and the product is
//! clamped to `min_speed_kmh` so travel time is always finite.

use crate::geo::{GeoPoint, distance_km};

/// Speed lost per percent of absolute gradient (fraction of base speed).
pub const SLOPE_PENALTY_PER_PERCENT: f64 = 0.02;

/// Speed lost per vehicle unit above the segment limit (fraction of base speed).
pub const OVERLOAD_PENALTY_PER_UNIT: f64 = 0.05;

pub const DEFAULT_BASE_SPEED_KMH: f64 = 60.0;
pub const DEFAULT_MIN_SPEED_KMH: f64 = 1.0;
pub const DEFAULT_MAX_UNITS: u32 = 5;
pub const DEFAULT_ACTUAL_UNITS: u32 = 5;

// ── LoadProfile ───────────────────────────────────────────────────────────────

/// The physical conditions a vehicle meets on one stretch of track.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadProfile {
    /// Signed gradient in percent; only the magnitude matters.
    pub gradient_percent: f64,
    /// Maximum vehicle units the track is rated for.
    pub max_units: u32,
    /// Vehicle units actually running.
    pub actual_units: u32,
}

impl LoadProfile {
    pub fn new(gradient_percent: f64, max_units: u32, actual_units: u32) -> Self {
        Self { gradient_percent, max_units, actual_units }
    }

    /// `1 - |gradient| * 0.02`, floored at zero.
    pub fn slope_modifier(&self) -> f64 {
        (1.0 - self.gradient_percent.abs() * SLOPE_PENALTY_PER_PERCENT).max(0.0)
    }

    /// `1 - 0.05 * excess_units` when overloaded, else `1`; floored at zero.
    pub fn overload_modifier(&self) -> f64 {
        if self.actual_units > self.max_units {
            let excess = f64::from(self.actual_units - self.max_units);
            (1.0 - OVERLOAD_PENALTY_PER_UNIT * excess).max(0.0)
        } else {
            1.0
        }
    }
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            gradient_percent: 0.0,
            max_units:        DEFAULT_MAX_UNITS,
            actual_units:     DEFAULT_ACTUAL_UNITS,
        }
    }
}

// ── TravelEstimate ────────────────────────────────────────────────────────────

/// Result of a travel-time calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TravelEstimate {
    pub distance_km:         f64,
    /// Clamped, always `> 0`.
    pub effective_speed_kmh: f64,
    pub driving_time_secs:   f64,
    pub dwell_time_secs:     f64,
    pub total_time_secs:     f64,
}

impl TravelEstimate {
    /// `"M min S s"` rendering of [`total_time_secs`](Self::total_time_secs).
    pub fn formatted(&self) -> String {
        format_minutes_seconds(self.total_time_secs)
    }
}

// ── SpeedModel ────────────────────────────────────────────────────────────────

/// Base speed plus the positive floor every effective speed is clamped to.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedModel {
    pub base_speed_kmh: f64,
    pub min_speed_kmh:  f64,
}

impl SpeedModel {
    /// A model with the given base speed and the default 1 km/h floor.
    pub fn new(base_speed_kmh: f64) -> Self {
        Self::with_floor(base_speed_kmh, DEFAULT_MIN_SPEED_KMH)
    }

    /// A model with an explicit floor.  A non-positive or non-finite floor
    /// falls back to [`DEFAULT_MIN_SPEED_KMH`].
    pub fn with_floor(base_speed_kmh: f64, min_speed_kmh: f64) -> Self {
        let min_speed_kmh = if min_speed_kmh.is_finite() && min_speed_kmh > 0.0 {
            min_speed_kmh
        } else {
            DEFAULT_MIN_SPEED_KMH
        };
        Self { base_speed_kmh, min_speed_kmh }
    }

    /// Speed before clamping.  May be zero for extreme gradients or loads.
    pub fn raw_speed_kmh(&self, load: &LoadProfile) -> f64 {
        self.base_speed_kmh * load.slope_modifier() * load.overload_modifier()
    }

    /// Effective speed in km/h, never below `min_speed_kmh`.
    pub fn effective_speed_kmh(&self, load: &LoadProfile) -> f64 {
        // f64::max ignores a NaN operand, so a NaN gradient lands on the floor.
        self.raw_speed_kmh(load).max(self.min_speed_kmh)
    }

    /// Effective speed in metres per second.
    #[inline]
    pub fn effective_speed_mps(&self, load: &LoadProfile) -> f64 {
        self.effective_speed_kmh(load) * 1_000.0 / 3_600.0
    }

    /// Seconds needed to cover `distance_km` under `load`.
    pub fn driving_time_secs(&self, distance_km: f64, load: &LoadProfile) -> f64 {
        distance_km.max(0.0) / self.effective_speed_kmh(load) * 3_600.0
    }

    /// Full estimate: driving time over `distance_km` plus the sum of
    /// `dwell_secs`.
    pub fn estimate<I>(&self, distance_km: f64, load: &LoadProfile, dwell_secs: I) -> TravelEstimate
    where
        I: IntoIterator<Item = u32>,
    {
        let effective_speed_kmh = self.effective_speed_kmh(load);
        let driving_time_secs   = self.driving_time_secs(distance_km, load);
        let dwell_time_secs: f64 = dwell_secs.into_iter().map(f64::from).sum();
        TravelEstimate {
            distance_km: distance_km.max(0.0),
            effective_speed_kmh,
            driving_time_secs,
            dwell_time_secs,
            total_time_secs: driving_time_secs + dwell_time_secs,
        }
    }

    /// [`estimate`](Self::estimate) over the length of a drawn polyline.
    pub fn estimate_path<I>(&self, path: &[GeoPoint], load: &LoadProfile, dwell_secs: I) -> TravelEstimate
    where
        I: IntoIterator<Item = u32>,
    {
        self.estimate(distance_km(path), load, dwell_secs)
    }
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_SPEED_KMH)
    }
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Round to whole seconds; negative and non-finite values become zero.
fn whole_secs(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    }
}

/// `"M min S s"`, e.g. `630.0` → `"10 min 30 s"`.
///
/// Seconds are rounded before splitting, so `59.6` is `"1 min 0 s"`.
pub fn format_minutes_seconds(seconds: f64) -> String {
    let total = whole_secs(seconds);
    format!("{} min {} s", total / 60, total % 60)
}

/// `"Hh Mm Ss"` when at least one hour, otherwise `"Mm Ss"`.
pub fn format_duration(seconds: f64) -> String {
    let total = whole_secs(seconds);
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else {
        format!("{minutes}m {secs}s")
    }
}
