//! R-tree stop index.
//!
//! Maps `(lon, lat)` to the nearest `StopId`.  Used to snap drawn line
//! endpoints onto stops and, in the simulation, to decide whether a path
//! vertex is a stop call.  Matching is by metre radius, never by exact
//! coordinate equality: interpolated or re-projected coordinates rarely
//! compare equal bit for bit.

use std::fmt;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use rp_core::{GeoPoint, StopId};

/// Candidates examined per radius query.  The R-tree orders by squared
/// degree distance, which differs from ground distance away from the
/// equator, so the closest few are re-ranked with haversine.
const RERANK_CANDIDATES: usize = 8;

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[lon, lat]` point with its `StopId`.
#[derive(Clone, Debug, PartialEq)]
struct StopEntry {
    point: [f64; 2], // [lon, lat]
    id:    StopId,
}

impl StopEntry {
    fn new(id: StopId, pos: GeoPoint) -> Self {
        Self { point: [pos.lon, pos.lat], id }
    }

    fn position(&self) -> GeoPoint {
        GeoPoint::new(self.point[0], self.point[1])
    }
}

impl RTreeObject for StopEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StopEntry {
    /// Squared Euclidean distance in lon/lat space.  Good enough to order
    /// candidates; final acceptance uses haversine metres.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlon = self.point[0] - point[0];
        let dlat = self.point[1] - point[1];
        dlon * dlon + dlat * dlat
    }
}

// ── StopIndex ─────────────────────────────────────────────────────────────────

/// Incrementally maintained spatial index over stop positions.
#[derive(Clone)]
pub struct StopIndex {
    tree: RTree<StopEntry>,
}

impl StopIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load from `(id, position)` pairs.  O(N log N), faster than N
    /// inserts.
    pub fn from_stops<I>(stops: I) -> Self
    where
        I: IntoIterator<Item = (StopId, GeoPoint)>,
    {
        let entries: Vec<StopEntry> = stops
            .into_iter()
            .map(|(id, pos)| StopEntry::new(id, pos))
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn insert(&mut self, id: StopId, pos: GeoPoint) {
        self.tree.insert(StopEntry::new(id, pos));
    }

    /// Remove the entry for `id` at `pos`.  Returns `false` if there was no
    /// such entry.
    pub fn remove(&mut self, id: StopId, pos: GeoPoint) -> bool {
        self.tree.remove(&StopEntry::new(id, pos)).is_some()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest stop regardless of distance.  `None` only if the index is empty.
    pub fn nearest(&self, pos: GeoPoint) -> Option<StopId> {
        self.tree
            .nearest_neighbor(&[pos.lon, pos.lat])
            .map(|e| e.id)
    }

    /// Nearest stop within `tolerance_m` metres, with its distance.
    pub fn nearest_within(&self, pos: GeoPoint, tolerance_m: f64) -> Option<(StopId, f64)> {
        self.tree
            .nearest_neighbor_iter(&[pos.lon, pos.lat])
            .take(RERANK_CANDIDATES)
            .map(|e| (e.id, e.position().distance_m(pos)))
            .filter(|&(_, d)| d <= tolerance_m)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl Default for StopIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopIndex").field("len", &self.len()).finish()
    }
}
