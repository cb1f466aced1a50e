//! `Route`: a named network plus the parameters its vehicle runs with.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rp_core::{OwnerId, PlannerConfig};

use crate::{
    NetworkBuilder, NetworkError, NetworkModel, NetworkResult, RouteRecord, RouteStats,
    SegmentRecord, StopDraft, StopRecord,
};

/// Kind of vehicle running the route.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    #[default]
    Passenger,
    Cargo,
}

/// Simulation parameters attached to a route.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteParams {
    pub vehicle_class: VehicleClass,
    /// Base speed on flat, non-overloaded track.
    #[serde(rename = "maxSpeed")]
    pub max_speed_kmh: f64,
    /// Vehicle units running.
    pub actual_units:  u32,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            vehicle_class: VehicleClass::default(),
            max_speed_kmh: rp_core::metrics::DEFAULT_BASE_SPEED_KMH,
            actual_units:  rp_core::metrics::DEFAULT_ACTUAL_UNITS,
        }
    }
}

impl RouteParams {
    /// Parameters matching a config's defaults.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            vehicle_class: VehicleClass::default(),
            max_speed_kmh: config.base_speed_kmh,
            actual_units:  config.default_vehicle_units,
        }
    }
}

/// A named network belonging to an owner.
#[derive(Clone, Debug)]
pub struct Route {
    pub name:  String,
    pub owner: Option<OwnerId>,
    params:    RouteParams,
    network:   NetworkModel,
}

impl Route {
    /// An empty route using `config` defaults.
    pub fn new(name: impl Into<String>, config: &PlannerConfig) -> Self {
        Self {
            name:    name.into(),
            owner:   None,
            params:  RouteParams::from_config(config),
            network: NetworkModel::new(config),
        }
    }

    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn network(&self) -> &NetworkModel {
        &self.network
    }

    /// Builder over this route's network.
    pub fn builder(&mut self) -> NetworkBuilder<'_> {
        NetworkBuilder::new(&mut self.network)
    }

    /// Replace the simulation parameters; cached segment metrics follow the
    /// new speed and unit count.
    pub fn set_params(&mut self, params: RouteParams) -> NetworkResult<()> {
        self.builder().retune(params.max_speed_kmh, params.actual_units)?;
        self.params = params;
        debug!(route = %self.name, ?params, "route params changed");
        Ok(())
    }

    pub fn stats(&self) -> RouteStats {
        RouteStats::compute(&self.network)
    }

    // ── Exchange ──────────────────────────────────────────────────────────

    pub fn to_record(&self) -> RouteRecord {
        RouteRecord {
            name:     self.name.clone(),
            stops:    self.network.stops().map(StopRecord::from).collect(),
            segments: self
                .network
                .segments()
                .map(|seg| SegmentRecord {
                    geometry:         seg.geometry.clone(),
                    max_units:        seg.params.max_units,
                    gradient_percent: seg.params.gradient_percent,
                    track_count:      seg.params.track_count,
                })
                .collect(),
            params:   self.params,
        }
    }

    /// Rebuild a route by replaying the record's stops and then its segments
    /// through a builder, so imports get the same validation as drawing.
    ///
    /// Fails on the first stop or segment that does not validate; the error
    /// names its index within the record.
    pub fn from_record(record: &RouteRecord, config: &PlannerConfig) -> NetworkResult<Self> {
        let mut route = Route::new(record.name.clone(), config);
        route.set_params(record.params)?;
        {
            let mut builder = route.builder();
            for (index, s) in record.stops.iter().enumerate() {
                let draft = StopDraft {
                    name:           s.name.clone(),
                    dwell_secs:     s.dwell_time_sec,
                    passengers_in:  s.passengers_in,
                    passengers_out: s.passengers_out,
                    is_terminal:    s.is_terminal,
                };
                builder
                    .add_stop(s.position, draft)
                    .map_err(|e| import_error("stop", index, e))?;
            }
            for (index, seg) in record.segments.iter().enumerate() {
                builder
                    .add_segment(&seg.geometry, seg.params())
                    .map_err(|e| import_error("segment", index, e))?;
            }
        }
        debug!(
            route = %route.name,
            stops = route.network.stop_count(),
            segments = route.network.segment_count(),
            "route imported",
        );
        Ok(route)
    }
}

fn import_error(what: &'static str, index: usize, source: NetworkError) -> NetworkError {
    warn!(what, index, error = %source, "route import failed");
    NetworkError::Import { what, index, source: Box::new(source) }
}
