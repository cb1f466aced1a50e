//! Exchange records: the JSON shape routes are stored and shared in.
//!
//! Records are plain data.  They carry no ids; on import the stops and
//! segments get fresh ids and segment endpoints are re-resolved by position.

use serde::{Deserialize, Serialize};

use rp_core::GeoPoint;

use crate::{RouteParams, SegmentParams, Stop, TrackCount};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRecord {
    pub position:       GeoPoint,
    #[serde(default)]
    pub name:           String,
    #[serde(default)]
    pub dwell_time_sec: u32,
    #[serde(default)]
    pub passengers_in:  u32,
    #[serde(default)]
    pub passengers_out: u32,
    #[serde(default)]
    pub is_terminal:    bool,
}

impl From<&Stop> for StopRecord {
    fn from(stop: &Stop) -> Self {
        Self {
            position:       stop.position,
            name:           stop.name.clone(),
            dwell_time_sec: stop.dwell_secs,
            passengers_in:  stop.passengers_in,
            passengers_out: stop.passengers_out,
            is_terminal:    stop.is_terminal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    pub geometry:         Vec<GeoPoint>,
    #[serde(default = "default_max_units")]
    pub max_units:        u32,
    #[serde(default)]
    pub gradient_percent: f64,
    #[serde(default)]
    pub track_count:      TrackCount,
}

impl SegmentRecord {
    pub fn params(&self) -> SegmentParams {
        SegmentParams {
            max_units:        self.max_units,
            gradient_percent: self.gradient_percent,
            track_count:      self.track_count,
        }
    }
}

fn default_max_units() -> u32 {
    rp_core::metrics::DEFAULT_MAX_UNITS
}

/// A whole route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub name:     String,
    #[serde(default)]
    pub stops:    Vec<StopRecord>,
    #[serde(default)]
    pub segments: Vec<SegmentRecord>,
    #[serde(default)]
    pub params:   RouteParams,
}
