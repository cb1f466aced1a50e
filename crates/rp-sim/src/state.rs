//! Vehicle state owned by the engine, plus the values it reports.

use std::fmt;

use rp_core::{GeoPoint, StopId};

/// Orientation along the path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Forward,
    Reversed,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Forward => Direction::Reversed,
            Direction::Reversed => Direction::Forward,
        }
    }

    #[inline]
    pub fn is_reversed(self) -> bool {
        self == Direction::Reversed
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Reversed => f.write_str("reversed"),
        }
    }
}

/// What the vehicle is doing.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Phase {
    /// Not started, stopped or halted.
    #[default]
    Idle,
    Moving,
    /// Waiting at `stop` until `elapsed_secs` reaches `required_secs`.
    Dwelling {
        stop:          StopId,
        elapsed_secs:  f64,
        required_secs: f64,
    },
}

/// Everything the engine tracks about its vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    /// Path vertex the vehicle last passed.
    pub index:         usize,
    /// Fraction of the current leg covered, in `[0, 1)`.
    pub progress:      f64,
    pub direction:     Direction,
    pub phase:         Phase,
    /// Simulated seconds spent moving.
    pub moving_secs:   f64,
    /// Simulated seconds spent dwelling.
    pub dwelling_secs: f64,
    pub position:      GeoPoint,
    pub heading_deg:   f64,
}

impl SimulationState {
    /// State at the first path vertex, facing 0°.
    pub fn at_start(start: GeoPoint) -> Self {
        Self {
            index:         0,
            progress:      0.0,
            direction:     Direction::Forward,
            phase:         Phase::Idle,
            moving_secs:   0.0,
            dwelling_secs: 0.0,
            position:      start,
            heading_deg:   0.0,
        }
    }

    /// `true` while waiting at a stop.
    pub fn is_stopped(&self) -> bool {
        matches!(self.phase, Phase::Dwelling { .. })
    }

    pub fn total_secs(&self) -> f64 {
        self.moving_secs + self.dwelling_secs
    }

    pub fn pose(&self) -> VehiclePose {
        VehiclePose {
            position:    self.position,
            heading_deg: self.heading_deg,
            index:       self.index,
            progress:    self.progress,
            direction:   self.direction,
            dwelling:    self.is_stopped(),
            sim_secs:    self.total_secs(),
        }
    }
}

// ── Reported values ───────────────────────────────────────────────────────────

/// Where the vehicle is drawn this frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehiclePose {
    pub position:    GeoPoint,
    pub heading_deg: f64,
    pub index:       usize,
    pub progress:    f64,
    pub direction:   Direction,
    pub dwelling:    bool,
    /// Simulated seconds since the last reset.
    pub sim_secs:    f64,
}

/// Transient notice shown when the vehicle calls at a stop.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrivalNotice {
    pub stop:             StopId,
    pub name:             String,
    pub dwell_secs:       u32,
    pub passengers_in:    u32,
    pub passengers_out:   u32,
    pub is_terminal:      bool,
    pub path_index:       usize,
    /// Cumulative simulated time, moving plus dwelling.
    pub total_sim_secs:   f64,
    /// Cumulative simulated dwell time.
    pub total_dwell_secs: f64,
}

impl ArrivalNotice {
    /// Popup text: name, dwell and passenger movement.
    pub fn popup(&self) -> String {
        format!(
            "{}: dwell {} s, passengers +{}/-{}",
            self.name, self.dwell_secs, self.passengers_in, self.passengers_out
        )
    }
}

/// Why the direction flipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReverseCause {
    /// Arrived at a terminal stop.
    Terminal(StopId),
    /// Ran off either end of the path without meeting a terminal.
    EndOfPath,
}

/// Why playback stopped on its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// The path has fewer than two points.
    EmptyPath,
    /// The render target went away.
    Detached,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::EmptyPath => f.write_str("empty path"),
            HaltReason::Detached => f.write_str("render target detached"),
        }
    }
}

/// Result of one [`tick`](crate::SimulationEngine::tick).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Frame processed; keep ticking with the same handle.
    Continue,
    /// The handle was cancelled; the frame was ignored.
    Stale,
    /// Playback stopped; no further ticks will be processed.
    Halted(HaltReason),
}
