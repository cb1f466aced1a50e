//! Network-subsystem error type.

use std::fmt;

use thiserror::Error;

use rp_core::{CoreError, GeoPoint, SegmentId, StopId};

/// Which end of a drawn line failed to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

impl fmt::Display for LineEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnd::Start => f.write_str("start"),
            LineEnd::End   => f.write_str("end"),
        }
    }
}

/// Errors produced by `rp-network`.
///
/// Every variant raised by a builder call means the call changed nothing.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("stop {0} not found")]
    StopNotFound(StopId),

    #[error("segment {0} not found")]
    SegmentNotFound(SegmentId),

    #[error("invalid coordinate {0}")]
    InvalidCoordinate(GeoPoint),

    #[error("a line needs at least two vertices, got {0}")]
    DegenerateLine(usize),

    #[error("no stop within {tolerance_m} m of the line {end} {position}")]
    UnresolvedEndpoint {
        end:         LineEnd,
        position:    GeoPoint,
        tolerance_m: f64,
    },

    #[error("both line endpoints snap to {0}")]
    SameStop(StopId),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid track count {0}; expected 1 or 2")]
    InvalidTrackCount(u8),

    #[error("route import failed at {what} {index}: {source}")]
    Import {
        what:   &'static str,
        index:  usize,
        #[source]
        source: Box<NetworkError>,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("route JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
