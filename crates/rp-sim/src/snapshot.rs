//! Immutable view of a route taken when playback is set up.
//!
//! The engine never reads the live network: edits made while a vehicle is
//! running take effect only when a new snapshot is loaded.

use std::collections::BTreeMap;

use rp_core::{GeoPoint, LoadProfile, PlannerConfig, SpeedModel, StopId};
use rp_network::{NetworkModel, Route, RouteParams, RouteStats, StopIndex, VehicleClass};

/// The parts of a stop the engine needs on arrival.
#[derive(Clone, Debug, PartialEq)]
pub struct StopInfo {
    pub id:             StopId,
    pub name:           String,
    pub position:       GeoPoint,
    pub dwell_secs:     u32,
    pub passengers_in:  u32,
    pub passengers_out: u32,
    pub is_terminal:    bool,
}

/// Path, stops and per-leg conditions frozen for playback.
#[derive(Clone, Debug)]
pub struct RouteSnapshot {
    path:          Vec<GeoPoint>,
    /// `leg_lengths_m[i]` is the length of `path[i] → path[i + 1]`.
    leg_lengths_m: Vec<f64>,
    leg_loads:     Vec<LoadProfile>,
    stops:         BTreeMap<StopId, StopInfo>,
    index:         StopIndex,
    speed:         SpeedModel,
    vehicle_class: VehicleClass,
    stop_match_tolerance_m: f64,
}

impl RouteSnapshot {
    pub fn capture(route: &Route, config: &PlannerConfig) -> Self {
        Self::from_network(route.network(), route.params(), config)
    }

    /// Snapshot `network` run with `params`.
    ///
    /// Legs taken from a segment use that segment's gradient and rating.
    /// Bridging legs use the route's length-weighted average gradient and
    /// its tightest rating.
    pub fn from_network(network: &NetworkModel, params: &RouteParams, config: &PlannerConfig) -> Self {
        let path = network.path().to_vec();
        let leg_lengths_m = path.windows(2).map(|w| w[0].distance_m(w[1])).collect();

        let stats = RouteStats::compute(network);
        let bridge = LoadProfile::new(
            stats.avg_gradient_percent,
            stats.min_max_units.unwrap_or(config.default_max_units),
            params.actual_units,
        );
        let leg_loads = network
            .path_legs()
            .iter()
            .map(|leg| {
                leg.and_then(|id| network.segment(id))
                    .map_or(bridge, |seg| seg.load(params.actual_units))
            })
            .collect();

        let stops: BTreeMap<StopId, StopInfo> = network
            .stops()
            .map(|s| {
                (s.id, StopInfo {
                    id:             s.id,
                    name:           s.name.clone(),
                    position:       s.position,
                    dwell_secs:     s.dwell_secs,
                    passengers_in:  s.passengers_in,
                    passengers_out: s.passengers_out,
                    is_terminal:    s.is_terminal,
                })
            })
            .collect();
        let index = StopIndex::from_stops(stops.values().map(|s| (s.id, s.position)));

        Self {
            path,
            leg_lengths_m,
            leg_loads,
            stops,
            index,
            speed: SpeedModel::with_floor(params.max_speed_kmh, config.min_speed_kmh),
            vehicle_class: params.vehicle_class,
            stop_match_tolerance_m: config.stop_match_tolerance_m,
        }
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    /// At least two points: something to drive along.
    pub fn is_playable(&self) -> bool {
        self.path.len() >= 2
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    pub fn speed_model(&self) -> SpeedModel {
        self.speed
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Length in metres of the leg between adjacent vertices `a` and `b`,
    /// in either order.
    pub fn leg_length_m(&self, a: usize, b: usize) -> f64 {
        self.leg_lengths_m.get(a.min(b)).copied().unwrap_or(0.0)
    }

    /// Vehicle speed in m/s on the leg between adjacent vertices `a` and `b`.
    pub fn leg_speed_mps(&self, a: usize, b: usize) -> f64 {
        let load = self.leg_loads.get(a.min(b)).copied().unwrap_or_default();
        self.speed.effective_speed_mps(&load)
    }

    /// The stop at path vertex `i`, matched within the stop tolerance.
    pub fn stop_at_vertex(&self, i: usize) -> Option<&StopInfo> {
        let pos = *self.path.get(i)?;
        self.index
            .nearest_within(pos, self.stop_match_tolerance_m)
            .and_then(|(id, _)| self.stops.get(&id))
    }
}
