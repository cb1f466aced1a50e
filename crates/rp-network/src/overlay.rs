//! Render synchronisation: overlays pushed to the map layer after each edit.
//!
//! The builder never talks to a map toolkit directly.  It describes what
//! should be on screen as [`StopOverlay`] / [`SegmentOverlay`] values and
//! hands them to an [`OverlaySink`], which may draw them, record them, or
//! ignore them ([`NoopOverlay`]).

use rp_core::{GeoPoint, SegmentId, StopId, format_minutes_seconds};

use crate::{Segment, Stop, TrackCount};

const TERMINAL_COLOR: &str = "black";
const STOP_COLOR: &str = "red";
const SEGMENT_OPACITY: f64 = 0.9;

// ── Styles ────────────────────────────────────────────────────────────────────

/// Circle marker style for a stop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub color:     &'static str,
    pub size_px:   u32,
}

impl MarkerStyle {
    pub fn for_stop(stop: &Stop) -> Self {
        if stop.is_terminal {
            Self { color: TERMINAL_COLOR, size_px: 20 }
        } else {
            Self { color: STOP_COLOR, size_px: 14 }
        }
    }
}

/// Polyline style for a segment, keyed on its track count.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color:      &'static str,
    pub weight:     u32,
    pub opacity:    f64,
    /// SVG dash pattern; `None` draws a solid line.
    pub dash_array: Option<&'static str>,
}

impl LineStyle {
    pub fn for_tracks(tracks: TrackCount) -> Self {
        match tracks {
            TrackCount::Single => Self {
                color:      "red",
                weight:     5,
                opacity:    SEGMENT_OPACITY,
                dash_array: Some("12,12"),
            },
            TrackCount::Double => Self {
                color:      "black",
                weight:     7,
                opacity:    SEGMENT_OPACITY,
                dash_array: None,
            },
        }
    }
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Everything needed to draw one stop.
#[derive(Clone, Debug, PartialEq)]
pub struct StopOverlay {
    pub id:       StopId,
    pub position: GeoPoint,
    pub style:    MarkerStyle,
    /// HTML tooltip body.
    pub tooltip:  String,
}

impl StopOverlay {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id:       stop.id,
            position: stop.position,
            style:    MarkerStyle::for_stop(stop),
            tooltip:  stop_tooltip(stop),
        }
    }
}

/// Everything needed to draw one segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentOverlay {
    pub id:       SegmentId,
    pub geometry: Vec<GeoPoint>,
    pub style:    LineStyle,
    pub tooltip:  String,
}

impl SegmentOverlay {
    /// `ordinal` is the 1-based position shown in the tooltip.
    pub fn from_segment(segment: &Segment, ordinal: usize) -> Self {
        Self {
            id:       segment.id,
            geometry: segment.geometry.clone(),
            style:    LineStyle::for_tracks(segment.params.track_count),
            tooltip:  segment_tooltip(segment, ordinal),
        }
    }
}

pub fn stop_tooltip(stop: &Stop) -> String {
    let mut html = format!(
        "<b>{}</b><br/>Dwell: {} s<br/>Boarding: {}<br/>Alighting: {}",
        stop.name, stop.dwell_secs, stop.passengers_in, stop.passengers_out,
    );
    if stop.is_terminal {
        html.push_str("<br/><i>Terminal</i>");
    }
    html
}

pub fn segment_tooltip(segment: &Segment, ordinal: usize) -> String {
    format!(
        "<b>Segment {ordinal}</b><br/>Max units: {}<br/>Gradient: {}%<br/>Track: {}<br/>\
         Length: {:.2} km<br/>Travel time: {}",
        segment.params.max_units,
        segment.params.gradient_percent,
        segment.params.track_count.describe(),
        segment.metrics.distance_km,
        format_minutes_seconds(segment.metrics.travel_time_secs),
    )
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// Receiver of overlay updates from a [`NetworkBuilder`](crate::NetworkBuilder).
///
/// All methods default to no-ops so implementors only override what they
/// draw.  Calls arrive synchronously, after the model has been updated.
pub trait OverlaySink {
    /// A stop was created or changed.
    fn upsert_stop(&mut self, _overlay: StopOverlay) {}

    /// A segment was created or changed.
    fn upsert_segment(&mut self, _overlay: SegmentOverlay) {}

    fn remove_stop(&mut self, _id: StopId) {}

    fn remove_segment(&mut self, _id: SegmentId) {}

    /// The ordered path was re-derived.
    fn path_changed(&mut self, _path: &[GeoPoint]) {}
}

/// An [`OverlaySink`] that does nothing.  Used for headless editing and
/// route import.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopOverlay;

impl OverlaySink for NoopOverlay {}

impl<S: OverlaySink + ?Sized> OverlaySink for &mut S {
    fn upsert_stop(&mut self, overlay: StopOverlay) {
        (**self).upsert_stop(overlay)
    }
    fn upsert_segment(&mut self, overlay: SegmentOverlay) {
        (**self).upsert_segment(overlay)
    }
    fn remove_stop(&mut self, id: StopId) {
        (**self).remove_stop(id)
    }
    fn remove_segment(&mut self, id: SegmentId) {
        (**self).remove_segment(id)
    }
    fn path_changed(&mut self, path: &[GeoPoint]) {
        (**self).path_changed(path)
    }
}
