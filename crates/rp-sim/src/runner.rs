//! Frame sources and a loop that drives an engine with them.

use std::thread;
use std::time::{Duration, Instant};

use crate::{SimObserver, SimulationEngine, TickHandle, TickOutcome};

/// Supplies monotonic frame timestamps in seconds.
pub trait FrameSource {
    fn next_frame(&mut self) -> f64;
}

/// Deterministic frames spaced `step_secs` apart, starting at zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedFrames {
    now_secs:  f64,
    step_secs: f64,
}

impl FixedFrames {
    pub fn new(step_secs: f64) -> Self {
        Self { now_secs: 0.0, step_secs }
    }
}

impl FrameSource for FixedFrames {
    fn next_frame(&mut self) -> f64 {
        let t = self.now_secs;
        self.now_secs += self.step_secs;
        t
    }
}

/// Real-time frames: sleeps until each deadline, then reports seconds since
/// creation.
#[derive(Debug)]
pub struct WallClockFrames {
    origin:   Instant,
    interval: Duration,
    deadline: Instant,
}

impl WallClockFrames {
    pub fn new(interval: Duration) -> Self {
        let origin = Instant::now();
        Self { origin, interval, deadline: origin }
    }
}

impl FrameSource for WallClockFrames {
    fn next_frame(&mut self) -> f64 {
        let now = Instant::now();
        if self.deadline > now {
            thread::sleep(self.deadline - now);
        }
        self.deadline += self.interval;
        self.origin.elapsed().as_secs_f64()
    }
}

/// How a [`run_frames`] call ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames handed to the engine.
    pub frames:  usize,
    /// Outcome of the last frame; `Continue` when the frame budget ran out.
    pub outcome: TickOutcome,
}

/// Tick `engine` with up to `max_frames` frames from `frames`, stopping early
/// when a frame does not return [`TickOutcome::Continue`].
pub fn run_frames<F, O>(
    engine:     &mut SimulationEngine,
    handle:     TickHandle,
    frames:     &mut F,
    max_frames: usize,
    observer:   &mut O,
) -> RunSummary
where
    F: FrameSource,
    O: SimObserver,
{
    let mut outcome = TickOutcome::Continue;
    let mut count = 0;
    while count < max_frames {
        outcome = engine.tick(handle, frames.next_frame(), observer);
        count += 1;
        if outcome != TickOutcome::Continue {
            break;
        }
    }
    RunSummary { frames: count, outcome }
}
