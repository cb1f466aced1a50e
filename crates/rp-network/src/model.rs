//! Network model: stops, segments, and the derived ordered path.
//!
//! # Path derivation
//!
//! The editing model allows arbitrary stop-to-stop connections, but playback
//! walks a single ordered coordinate list.  That list is rebuilt after every
//! mutation by concatenating segment geometries in creation order:
//!
//! ```text
//! segments (creation order):  S0: A─B      S1: B─C      S2: D─E
//! path:                       A ─ B ─ C ─ D ─ E
//! legs:                       S0  S1  ──  S2
//!                                     └── bridging leg (no segment)
//! ```
//!
//! A segment starting exactly where the path currently ends continues it
//! without repeating the shared vertex.  Otherwise the path jumps straight
//! to the segment's first vertex, and that bridging leg carries no segment
//! (the simulation falls back to the route-wide load profile on it).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rp_core::{GeoPoint, LoadProfile, PlannerConfig, SegmentId, SpeedModel, StopId, distance_km};

use crate::{NetworkError, StopIndex};

// ── Stop ──────────────────────────────────────────────────────────────────────

/// A named point where a vehicle may dwell.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id:             StopId,
    pub position:       GeoPoint,
    pub name:           String,
    /// Seconds a vehicle waits here.
    pub dwell_secs:     u32,
    pub passengers_in:  u32,
    pub passengers_out: u32,
    /// A vehicle arriving here reverses direction.
    pub is_terminal:    bool,
    /// Segments touching this stop, in the order they were connected.
    pub connections:    Vec<SegmentId>,
}

// ── TrackCount ────────────────────────────────────────────────────────────────

/// Single or double track.  Serialized as the integer `1` or `2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TrackCount {
    Single,
    #[default]
    Double,
}

impl TrackCount {
    pub fn count(self) -> u8 {
        match self {
            TrackCount::Single => 1,
            TrackCount::Double => 2,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            TrackCount::Single => "single track",
            TrackCount::Double => "double track",
        }
    }
}

impl TryFrom<u8> for TrackCount {
    type Error = NetworkError;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(TrackCount::Single),
            2 => Ok(TrackCount::Double),
            other => Err(NetworkError::InvalidTrackCount(other)),
        }
    }
}

impl From<TrackCount> for u8 {
    fn from(t: TrackCount) -> u8 {
        t.count()
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// User-editable physical parameters of a segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentParams {
    pub max_units:        u32,
    pub gradient_percent: f64,
    pub track_count:      TrackCount,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            max_units:        rp_core::metrics::DEFAULT_MAX_UNITS,
            gradient_percent: 0.0,
            track_count:      TrackCount::default(),
        }
    }
}

/// Metrics cached on a segment; recomputed whenever its geometry, its
/// parameters or the route's speed/load settings change.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SegmentMetrics {
    pub distance_km:         f64,
    pub effective_speed_kmh: f64,
    /// Driving time only; dwell at the endpoint stops is not included.
    pub travel_time_secs:    f64,
}

/// A drawn connection between two distinct stops.
///
/// Invariant: `geometry.first() == from.position` and
/// `geometry.last() == to.position`, exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id:       SegmentId,
    pub from:     StopId,
    pub to:       StopId,
    pub geometry: Vec<GeoPoint>,
    pub params:   SegmentParams,
    pub metrics:  SegmentMetrics,
}

impl Segment {
    /// Load profile for a vehicle of `actual_units` on this segment.
    pub fn load(&self, actual_units: u32) -> LoadProfile {
        LoadProfile::new(self.params.gradient_percent, self.params.max_units, actual_units)
    }

    #[inline]
    pub fn touches(&self, stop: StopId) -> bool {
        self.from == stop || self.to == stop
    }

    pub fn length_km(&self) -> f64 {
        distance_km(&self.geometry)
    }
}

// ── NetworkModel ──────────────────────────────────────────────────────────────

/// In-memory network: stops, segments, spatial index and the ordered path.
///
/// Read access is public; mutation goes through
/// [`NetworkBuilder`](crate::NetworkBuilder), which keeps the connection
/// lists, the stop index, cached metrics and the path consistent.
#[derive(Clone, Debug)]
pub struct NetworkModel {
    pub(crate) stops:         BTreeMap<StopId, Stop>,
    pub(crate) segments:      BTreeMap<SegmentId, Segment>,
    pub(crate) index:         StopIndex,
    pub(crate) path:          Vec<GeoPoint>,
    pub(crate) path_legs:     Vec<Option<SegmentId>>,
    pub(crate) next_stop:     StopId,
    pub(crate) next_segment:  SegmentId,
    pub(crate) speed:         SpeedModel,
    pub(crate) vehicle_units: u32,
    pub(crate) snap_tolerance_m: f64,
    pub(crate) default_max_units: u32,
}

impl NetworkModel {
    /// An empty network using `config` for speed, load and snapping.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            stops:             BTreeMap::new(),
            segments:          BTreeMap::new(),
            index:             StopIndex::new(),
            path:              Vec::new(),
            path_legs:         Vec::new(),
            next_stop:         StopId(0),
            next_segment:      SegmentId(0),
            speed:             config.speed_model(),
            vehicle_units:     config.default_vehicle_units,
            snap_tolerance_m:  config.snap_tolerance_m,
            default_max_units: config.default_max_units,
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(&id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Stops in creation order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> + '_ {
        self.stops.values()
    }

    /// Segments in creation order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.values()
    }

    /// Segments touching `stop`.
    pub fn segments_of(&self, stop: StopId) -> impl Iterator<Item = &Segment> + '_ {
        self.stops
            .get(&stop)
            .into_iter()
            .flat_map(|s| s.connections.iter())
            .filter_map(|id| self.segments.get(id))
    }

    /// 1-based position of `id` among segments in creation order.
    pub fn segment_ordinal(&self, id: SegmentId) -> Option<usize> {
        self.segments.keys().position(|&k| k == id).map(|i| i + 1)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest stop within `tolerance_m` metres of `pos`.
    pub fn nearest_stop(&self, pos: GeoPoint, tolerance_m: f64) -> Option<&Stop> {
        self.index
            .nearest_within(pos, tolerance_m)
            .and_then(|(id, _)| self.stops.get(&id))
    }

    /// Nearest stop within the snapping tolerance.
    pub fn snap_to_stop(&self, pos: GeoPoint) -> Option<&Stop> {
        self.nearest_stop(pos, self.snap_tolerance_m)
    }

    pub fn stop_index(&self) -> &StopIndex {
        &self.index
    }

    // ── Path ──────────────────────────────────────────────────────────────

    /// Ordered coordinate list the simulation walks.
    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    /// Segment each path leg came from; `path_legs()[i]` covers
    /// `path()[i] → path()[i + 1]`.  `None` marks a bridging leg.
    pub fn path_legs(&self) -> &[Option<SegmentId>] {
        &self.path_legs
    }

    // ── Route-wide settings ───────────────────────────────────────────────

    pub fn speed_model(&self) -> SpeedModel {
        self.speed
    }

    pub fn vehicle_units(&self) -> u32 {
        self.vehicle_units
    }

    pub fn snap_tolerance_m(&self) -> f64 {
        self.snap_tolerance_m
    }

    /// Parameters a freshly drawn segment gets when the caller has none.
    pub fn default_segment_params(&self) -> SegmentParams {
        SegmentParams { max_units: self.default_max_units, ..SegmentParams::default() }
    }

    // ── Crate-internal maintenance ────────────────────────────────────────

    pub(crate) fn allocate_stop_id(&mut self) -> StopId {
        let id = self.next_stop;
        self.next_stop = id.next();
        id
    }

    pub(crate) fn allocate_segment_id(&mut self) -> SegmentId {
        let id = self.next_segment;
        self.next_segment = id.next();
        id
    }

    /// Metrics for `geometry` under `params` with the current route settings.
    pub(crate) fn compute_metrics(&self, geometry: &[GeoPoint], params: &SegmentParams) -> SegmentMetrics {
        let load = LoadProfile::new(params.gradient_percent, params.max_units, self.vehicle_units);
        let estimate = self.speed.estimate_path(geometry, &load, []);
        SegmentMetrics {
            distance_km:         estimate.distance_km,
            effective_speed_kmh: estimate.effective_speed_kmh,
            travel_time_secs:    estimate.driving_time_secs,
        }
    }

    pub(crate) fn refresh_metrics(&mut self, id: SegmentId) {
        let Some(seg) = self.segments.get(&id) else { return };
        let metrics = self.compute_metrics(&seg.geometry, &seg.params);
        if let Some(seg) = self.segments.get_mut(&id) {
            seg.metrics = metrics;
        }
    }

    pub(crate) fn refresh_all_metrics(&mut self) {
        let ids: Vec<SegmentId> = self.segments.keys().copied().collect();
        for id in ids {
            self.refresh_metrics(id);
        }
    }

    /// Re-derive `path` and `path_legs` from the segments in creation order.
    ///
    /// Idempotent: calling it twice without an intervening mutation yields
    /// the same path.
    pub(crate) fn rebuild_path(&mut self) {
        self.path.clear();
        self.path_legs.clear();
        for seg in self.segments.values() {
            for (i, &vertex) in seg.geometry.iter().enumerate() {
                if let Some(&last) = self.path.last() {
                    if last == vertex {
                        continue;
                    }
                    self.path_legs.push(if i == 0 { None } else { Some(seg.id) });
                }
                self.path.push(vertex);
            }
        }
        debug_assert_eq!(self.path_legs.len(), self.path.len().saturating_sub(1));
    }
}
