//! `NetworkBuilder`: turns draw/edit gestures into model mutations.
//!
//! Every public method either applies its whole change and returns `Ok`, or
//! returns `Err` with the model untouched.  After a successful change the
//! ordered path is re-derived and the overlay sink is told what to redraw.

use tracing::{debug, warn};

use rp_core::{GeoPoint, SegmentId, SpeedModel, StopId};

use crate::{
    LineEnd, NetworkError, NetworkModel, NetworkResult, NoopOverlay, OverlaySink, Segment,
    SegmentOverlay, SegmentParams, Stop, StopOverlay,
};

// ── Gesture payloads ──────────────────────────────────────────────────────────

/// Attributes for a new stop.  An empty name is replaced by `P<n>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopDraft {
    pub name:           String,
    pub dwell_secs:     u32,
    pub passengers_in:  u32,
    pub passengers_out: u32,
    pub is_terminal:    bool,
}

impl StopDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn dwell(mut self, secs: u32) -> Self {
        self.dwell_secs = secs;
        self
    }

    pub fn passengers(mut self, boarding: u32, alighting: u32) -> Self {
        self.passengers_in = boarding;
        self.passengers_out = alighting;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }
}

/// Partial stop edit; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopEdit {
    pub name:           Option<String>,
    pub dwell_secs:     Option<u32>,
    pub passengers_in:  Option<u32>,
    pub passengers_out: Option<u32>,
    pub is_terminal:    Option<bool>,
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Mutating view over a [`NetworkModel`].
///
/// # Example
///
/// ```rust,ignore
/// let mut model = NetworkModel::new(&PlannerConfig::default());
/// let mut b = NetworkBuilder::new(&mut model);
/// let a = b.add_stop(GeoPoint::new(21.00, 52.20), StopDraft::named("A").terminal())?;
/// let z = b.add_stop(GeoPoint::new(21.01, 52.20), StopDraft::named("Z").terminal())?;
/// b.add_segment(&[GeoPoint::new(21.00, 52.20), GeoPoint::new(21.01, 52.20)],
///               SegmentParams::default())?;
/// ```
pub struct NetworkBuilder<'a, O: OverlaySink = NoopOverlay> {
    model:   &'a mut NetworkModel,
    overlay: O,
}

impl<'a> NetworkBuilder<'a, NoopOverlay> {
    /// A builder that renders nothing.
    pub fn new(model: &'a mut NetworkModel) -> Self {
        Self { model, overlay: NoopOverlay }
    }
}

impl<'a, O: OverlaySink> NetworkBuilder<'a, O> {
    pub fn with_overlay(model: &'a mut NetworkModel, overlay: O) -> Self {
        Self { model, overlay }
    }

    pub fn model(&self) -> &NetworkModel {
        self.model
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn into_overlay(self) -> O {
        self.overlay
    }

    // ── Stops ─────────────────────────────────────────────────────────────

    /// Place a stop.  It joins the path only once a segment connects it.
    pub fn add_stop(&mut self, position: GeoPoint, draft: StopDraft) -> NetworkResult<StopId> {
        if !position.is_valid() {
            warn!(%position, "rejected stop: invalid coordinate");
            return Err(NetworkError::InvalidCoordinate(position));
        }
        let id = self.model.allocate_stop_id();
        let name = if draft.name.trim().is_empty() { default_stop_name(id) } else { draft.name };
        let stop = Stop {
            id,
            position,
            name,
            dwell_secs:     draft.dwell_secs,
            passengers_in:  draft.passengers_in,
            passengers_out: draft.passengers_out,
            is_terminal:    draft.is_terminal,
            connections:    Vec::new(),
        };
        debug!(stop = %id, name = %stop.name, %position, "stop added");
        self.overlay.upsert_stop(StopOverlay::from_stop(&stop));
        self.model.index.insert(id, position);
        self.model.stops.insert(id, stop);
        self.sync_path();
        Ok(id)
    }

    /// Change stop attributes in place.
    pub fn edit_stop(&mut self, id: StopId, edit: StopEdit) -> NetworkResult<()> {
        let stop = self.model.stops.get_mut(&id).ok_or(NetworkError::StopNotFound(id))?;
        if let Some(name) = edit.name {
            stop.name = if name.trim().is_empty() { default_stop_name(id) } else { name };
        }
        if let Some(v) = edit.dwell_secs {
            stop.dwell_secs = v;
        }
        if let Some(v) = edit.passengers_in {
            stop.passengers_in = v;
        }
        if let Some(v) = edit.passengers_out {
            stop.passengers_out = v;
        }
        if let Some(v) = edit.is_terminal {
            stop.is_terminal = v;
        }
        debug!(stop = %id, "stop edited");
        self.overlay.upsert_stop(StopOverlay::from_stop(stop));
        self.sync_path();
        Ok(())
    }

    /// Drag a stop to `position`; incident segment endpoints follow it.
    pub fn move_stop(&mut self, id: StopId, position: GeoPoint) -> NetworkResult<()> {
        if !position.is_valid() {
            warn!(stop = %id, %position, "rejected move: invalid coordinate");
            return Err(NetworkError::InvalidCoordinate(position));
        }
        let stop = self.model.stops.get_mut(&id).ok_or(NetworkError::StopNotFound(id))?;
        let old = stop.position;
        stop.position = position;
        let connections = stop.connections.clone();
        self.overlay.upsert_stop(StopOverlay::from_stop(stop));

        self.model.index.remove(id, old);
        self.model.index.insert(id, position);

        for seg_id in connections {
            if let Some(seg) = self.model.segments.get_mut(&seg_id) {
                if seg.from == id {
                    if let Some(first) = seg.geometry.first_mut() {
                        *first = position;
                    }
                }
                if seg.to == id {
                    if let Some(last) = seg.geometry.last_mut() {
                        *last = position;
                    }
                }
            }
            self.model.refresh_metrics(seg_id);
            self.push_segment_overlay(seg_id);
        }
        debug!(stop = %id, from = %old, to = %position, "stop moved");
        self.sync_path();
        Ok(())
    }

    /// Delete a stop and every segment touching it.  Returns the removed stop.
    pub fn remove_stop(&mut self, id: StopId) -> NetworkResult<Stop> {
        let connections = self
            .model
            .stops
            .get(&id)
            .ok_or(NetworkError::StopNotFound(id))?
            .connections
            .clone();
        for seg_id in connections {
            self.detach_segment(seg_id);
        }
        let stop = self.model.stops.remove(&id).ok_or(NetworkError::StopNotFound(id))?;
        self.model.index.remove(id, stop.position);
        self.overlay.remove_stop(id);
        debug!(stop = %id, name = %stop.name, "stop removed");
        self.refresh_segment_overlays();
        self.sync_path();
        Ok(stop)
    }

    // ── Segments ──────────────────────────────────────────────────────────

    /// Add a segment from a drawn polyline.
    ///
    /// Each endpoint must lie within the snapping tolerance of a stop, and
    /// the two stops must differ.  The endpoint vertices are then moved
    /// exactly onto the stop positions.
    pub fn add_segment(&mut self, line: &[GeoPoint], params: SegmentParams) -> NetworkResult<SegmentId> {
        if line.len() < 2 {
            warn!(vertices = line.len(), "rejected segment: degenerate line");
            return Err(NetworkError::DegenerateLine(line.len()));
        }
        if let Some(&bad) = line.iter().find(|p| !p.is_valid()) {
            warn!(position = %bad, "rejected segment: invalid coordinate");
            return Err(NetworkError::InvalidCoordinate(bad));
        }
        validate_params(&params)?;

        let from = self.resolve_endpoint(line[0], LineEnd::Start)?;
        let to = self.resolve_endpoint(line[line.len() - 1], LineEnd::End)?;
        if from.0 == to.0 {
            warn!(stop = %from.0, "rejected segment: both ends on the same stop");
            return Err(NetworkError::SameStop(from.0));
        }

        let mut geometry = line.to_vec();
        let last = geometry.len() - 1;
        geometry[0] = from.1;
        geometry[last] = to.1;

        let id = self.model.allocate_segment_id();
        let metrics = self.model.compute_metrics(&geometry, &params);
        let segment = Segment { id, from: from.0, to: to.0, geometry, params, metrics };
        debug!(
            segment = %id, from = %from.0, to = %to.0,
            distance_km = metrics.distance_km, travel_secs = metrics.travel_time_secs,
            "segment added",
        );
        self.model.segments.insert(id, segment);
        for stop_id in [from.0, to.0] {
            if let Some(stop) = self.model.stops.get_mut(&stop_id) {
                stop.connections.push(id);
            }
        }
        self.push_segment_overlay(id);
        self.sync_path();
        Ok(id)
    }

    /// Replace a segment's parameters and recompute its metrics.
    pub fn edit_segment(&mut self, id: SegmentId, params: SegmentParams) -> NetworkResult<()> {
        validate_params(&params)?;
        let seg = self.model.segments.get_mut(&id).ok_or(NetworkError::SegmentNotFound(id))?;
        seg.params = params;
        self.model.refresh_metrics(id);
        debug!(segment = %id, ?params, "segment edited");
        self.push_segment_overlay(id);
        self.sync_path();
        Ok(())
    }

    /// Delete a segment and detach it from both endpoint stops.
    pub fn remove_segment(&mut self, id: SegmentId) -> NetworkResult<Segment> {
        let seg = self.detach_segment(id).ok_or(NetworkError::SegmentNotFound(id))?;
        debug!(segment = %id, "segment removed");
        self.refresh_segment_overlays();
        self.sync_path();
        Ok(seg)
    }

    // ── Route-wide settings ───────────────────────────────────────────────

    /// Change the number of vehicle units running; every cached segment
    /// metric is recomputed.
    pub fn set_vehicle_units(&mut self, units: u32) {
        self.model.vehicle_units = units;
        self.model.refresh_all_metrics();
        debug!(units, "vehicle units changed");
        self.refresh_segment_overlays();
    }

    /// Change base speed and vehicle units together.
    pub fn retune(&mut self, base_speed_kmh: f64, units: u32) -> NetworkResult<()> {
        if !(base_speed_kmh.is_finite() && base_speed_kmh > 0.0) {
            return Err(NetworkError::InvalidParameter(format!(
                "base speed must be finite and > 0, got {base_speed_kmh}"
            )));
        }
        let floor = self.model.speed.min_speed_kmh;
        self.model.speed = SpeedModel::with_floor(base_speed_kmh, floor);
        self.set_vehicle_units(units);
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn resolve_endpoint(&self, pos: GeoPoint, end: LineEnd) -> NetworkResult<(StopId, GeoPoint)> {
        let tolerance_m = self.model.snap_tolerance_m;
        match self.model.nearest_stop(pos, tolerance_m) {
            Some(stop) => Ok((stop.id, stop.position)),
            None => {
                warn!(%end, position = %pos, tolerance_m, "rejected segment: endpoint not on a stop");
                Err(NetworkError::UnresolvedEndpoint { end, position: pos, tolerance_m })
            }
        }
    }

    /// Remove a segment from the map and from its stops' connection lists.
    fn detach_segment(&mut self, id: SegmentId) -> Option<Segment> {
        let seg = self.model.segments.remove(&id)?;
        for stop_id in [seg.from, seg.to] {
            if let Some(stop) = self.model.stops.get_mut(&stop_id) {
                stop.connections.retain(|&c| c != id);
            }
        }
        self.overlay.remove_segment(id);
        Some(seg)
    }

    fn push_segment_overlay(&mut self, id: SegmentId) {
        let (Some(seg), Some(ordinal)) = (self.model.segments.get(&id), self.model.segment_ordinal(id))
        else {
            return;
        };
        self.overlay.upsert_segment(SegmentOverlay::from_segment(seg, ordinal));
    }

    /// Ordinals in tooltips shift when a segment disappears.
    fn refresh_segment_overlays(&mut self) {
        for (i, seg) in self.model.segments.values().enumerate() {
            self.overlay.upsert_segment(SegmentOverlay::from_segment(seg, i + 1));
        }
    }

    fn sync_path(&mut self) {
        self.model.rebuild_path();
        self.overlay.path_changed(&self.model.path);
    }
}

fn default_stop_name(id: StopId) -> String {
    format!("P{}", id.0 + 1)
}

fn validate_params(params: &SegmentParams) -> NetworkResult<()> {
    if !params.gradient_percent.is_finite() {
        return Err(NetworkError::InvalidParameter(format!(
            "gradient must be finite, got {}",
            params.gradient_percent
        )));
    }
    if params.max_units == 0 {
        return Err(NetworkError::InvalidParameter("max units must be at least 1".into()));
    }
    Ok(())
}
