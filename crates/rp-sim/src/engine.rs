//! `SimulationEngine`: advances one vehicle along a route snapshot.
//!
//! # Tick
//!
//! ```text
//! handle stale?          → Stale, nothing happens
//! observer detached?     → halt (Detached)
//! path < 2 points?       → halt (EmptyPath)
//! dt = clock.advance(frame) (real delta × multiplier)
//! Dwelling: elapsed += dt; done → Moving, on_departure
//! Moving:   next = index ± 1; off either end → flip direction (ping-pong)
//!           progress += dt / (leg_m / speed_mps)
//!           progress ≥ 1 → index = next, progress = 0,
//!                          stop at vertex? → Dwelling, on_arrival,
//!                                            terminal? → flip direction
//!           else          → lerp position, heading from bearing
//! on_pose
//! ```
//!
//! Time left over when a leg or a dwell completes mid-frame is dropped; the
//! next frame starts the following leg from zero.

use tracing::{debug, info, warn};

use rp_core::geo::normalize_deg;
use rp_core::{FrameClock, GeoPoint, bearing};

use crate::{
    ArrivalNotice, Direction, HaltReason, Phase, ReverseCause, RouteSnapshot, Scheduler,
    SimError, SimObserver, SimResult, SimulationState, TickHandle, TickOutcome,
};

/// External control flags, applied together by [`SimulationEngine::sync`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationInputs {
    pub run:              bool,
    pub paused:           bool,
    /// Any change from the previously synced value resets the vehicle.
    pub reset_signal:     u64,
    pub speed_multiplier: f64,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self { run: false, paused: false, reset_signal: 0, speed_multiplier: 1.0 }
    }
}

/// Single-vehicle playback controller.  Create via
/// [`EngineBuilder`][crate::EngineBuilder].
#[derive(Debug)]
pub struct SimulationEngine {
    pub(crate) snapshot:     RouteSnapshot,
    pub(crate) state:        SimulationState,
    pub(crate) clock:        FrameClock,
    pub(crate) scheduler:    Scheduler,
    pub(crate) paused:       bool,
    pub(crate) reset_signal: u64,
}

impl SimulationEngine {
    pub(crate) fn new(snapshot: RouteSnapshot, speed_multiplier: f64) -> Self {
        let start = start_point(&snapshot);
        Self {
            snapshot,
            state:        SimulationState::at_start(start),
            clock:        FrameClock::new(speed_multiplier),
            scheduler:    Scheduler::new(),
            paused:       false,
            reset_signal: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn snapshot(&self) -> &RouteSnapshot {
        &self.snapshot
    }

    pub fn is_running(&self) -> bool {
        self.state.phase != Phase::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.clock.speed_multiplier()
    }

    /// Handle of the scheduled tick, if playback is live.
    pub fn handle(&self) -> Option<TickHandle> {
        self.scheduler.current()
    }

    // ── Controls ──────────────────────────────────────────────────────────

    /// Begin or continue playback and return the handle to tick with.
    pub fn start(&mut self) -> SimResult<TickHandle> {
        if !self.snapshot.is_playable() {
            warn!(points = self.snapshot.path().len(), "start refused: path too short");
            return Err(SimError::EmptyPath);
        }
        if let Some(handle) = self.scheduler.current() {
            return Ok(handle);
        }
        if self.state.phase == Phase::Idle {
            self.state.phase = Phase::Moving;
        }
        self.paused = false;
        self.clock.suspend();
        let handle = self.scheduler.schedule();
        debug!(index = self.state.index, progress = self.state.progress, "playback started");
        Ok(handle)
    }

    /// Freeze the vehicle where it is.  Real time passing while paused is
    /// never fed into the simulation.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.scheduler.cancel();
        self.clock.suspend();
        debug!(index = self.state.index, progress = self.state.progress, "playback paused");
    }

    pub fn resume(&mut self) -> SimResult<TickHandle> {
        self.start()
    }

    /// Stop ticking and go idle; position and accumulators are kept.
    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.clock.suspend();
        self.paused = false;
        self.state.phase = Phase::Idle;
        debug!("playback stopped");
    }

    /// Cancel any pending tick and put the vehicle back at the first vertex.
    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.clock.reset();
        self.paused = false;
        let start = start_point(&self.snapshot);
        self.state = SimulationState::at_start(start);
        debug!("playback reset");
    }

    /// Switch to another route.  Pending ticks are cancelled first.
    pub fn load(&mut self, snapshot: RouteSnapshot) {
        self.scheduler.cancel();
        self.snapshot = snapshot;
        self.reset();
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> SimResult<()> {
        if self.clock.set_speed_multiplier(multiplier) {
            debug!(multiplier, "speed multiplier changed");
            Ok(())
        } else {
            Err(SimError::InvalidSpeedMultiplier(multiplier))
        }
    }

    /// Apply external control flags.  Returns the handle to keep ticking
    /// with, or `None` when playback should not be running.
    ///
    /// Problems are absorbed: an invalid multiplier keeps the previous one
    /// and an unplayable route simply does not start.
    pub fn sync(&mut self, inputs: SimulationInputs) -> Option<TickHandle> {
        if inputs.reset_signal != self.reset_signal {
            self.reset_signal = inputs.reset_signal;
            self.reset();
        }
        if inputs.speed_multiplier != self.clock.speed_multiplier() {
            if let Err(e) = self.set_speed_multiplier(inputs.speed_multiplier) {
                warn!(error = %e, "ignoring speed multiplier");
            }
        }
        match (inputs.run, inputs.paused) {
            (false, _) => {
                if self.is_running() {
                    self.stop();
                }
                None
            }
            (true, true) => {
                if self.is_running() {
                    self.pause();
                } else {
                    // Paused before ever running: nothing to freeze.
                    self.paused = true;
                }
                None
            }
            (true, false) => self.start().ok(),
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Process one frame stamped `frame_secs` (real seconds, monotonic).
    pub fn tick<O: SimObserver>(&mut self, handle: TickHandle, frame_secs: f64, observer: &mut O) -> TickOutcome {
        if !self.scheduler.is_current(handle) {
            return TickOutcome::Stale;
        }
        if !observer.is_attached() {
            return self.halt(HaltReason::Detached, observer);
        }
        if !self.snapshot.is_playable() {
            return self.halt(HaltReason::EmptyPath, observer);
        }

        let dt = self.clock.advance(frame_secs);
        match self.state.phase {
            Phase::Dwelling { stop, elapsed_secs, required_secs } => {
                let elapsed_secs = elapsed_secs + dt;
                self.state.dwelling_secs += dt;
                if elapsed_secs >= required_secs {
                    self.state.phase = Phase::Moving;
                    debug!(%stop, "departing");
                    observer.on_departure(stop, self.state.total_secs());
                } else {
                    self.state.phase = Phase::Dwelling { stop, elapsed_secs, required_secs };
                }
            }
            Phase::Moving => self.advance_moving(dt, observer),
            Phase::Idle => {}
        }

        observer.on_pose(&self.state.pose());
        TickOutcome::Continue
    }

    fn advance_moving<O: SimObserver>(&mut self, dt: f64, observer: &mut O) {
        let Some(next) = self.next_index(observer) else { return };
        let current = self.state.index;

        let leg_m = self.snapshot.leg_length_m(current, next);
        let time_required = leg_m / self.snapshot.leg_speed_mps(current, next);
        self.state.moving_secs += dt;
        if time_required > 0.0 {
            self.state.progress += dt / time_required;
        } else {
            self.state.progress = 1.0;
        }

        if self.state.progress >= 1.0 {
            self.arrive(next, observer);
            return;
        }

        let path = self.snapshot.path();
        let (from, to) = (path[current], path[next]);
        self.state.position = from.lerp(to, self.state.progress);
        let heading = bearing(from, to);
        self.state.heading_deg = if self.state.direction.is_reversed() {
            normalize_deg(heading + 180.0)
        } else {
            heading
        };
    }

    /// Neighbouring vertex in the direction of travel, flipping direction
    /// at either end of the path.
    fn next_index<O: SimObserver>(&mut self, observer: &mut O) -> Option<usize> {
        let last = self.snapshot.path().len().checked_sub(1)?;
        let index = self.state.index.min(last);
        let step = |dir: Direction| match dir {
            Direction::Forward => (index < last).then_some(index + 1),
            Direction::Reversed => index.checked_sub(1),
        };
        if let Some(next) = step(self.state.direction) {
            return Some(next);
        }
        self.reverse(ReverseCause::EndOfPath, observer);
        self.state.index = index;
        self.state.progress = 0.0;
        step(self.state.direction)
    }

    fn arrive<O: SimObserver>(&mut self, next: usize, observer: &mut O) {
        self.state.index = next;
        self.state.progress = 0.0;
        self.state.position = self.snapshot.path()[next];

        let Some(stop) = self.snapshot.stop_at_vertex(next).cloned() else { return };
        self.state.phase = Phase::Dwelling {
            stop:          stop.id,
            elapsed_secs:  0.0,
            required_secs: f64::from(stop.dwell_secs),
        };
        let notice = ArrivalNotice {
            stop:             stop.id,
            name:             stop.name,
            dwell_secs:       stop.dwell_secs,
            passengers_in:    stop.passengers_in,
            passengers_out:   stop.passengers_out,
            is_terminal:      stop.is_terminal,
            path_index:       next,
            total_sim_secs:   self.state.total_secs(),
            total_dwell_secs: self.state.dwelling_secs,
        };
        info!(
            stop = %notice.stop, name = %notice.name, index = next,
            dwell_secs = notice.dwell_secs, sim_secs = notice.total_sim_secs,
            "arrived",
        );
        observer.on_arrival(&notice);
        if stop.is_terminal {
            self.reverse(ReverseCause::Terminal(stop.id), observer);
        }
    }

    fn reverse<O: SimObserver>(&mut self, cause: ReverseCause, observer: &mut O) {
        self.state.direction = self.state.direction.toggled();
        info!(direction = %self.state.direction, ?cause, index = self.state.index, "reversing");
        observer.on_reverse(self.state.direction, cause);
    }

    fn halt<O: SimObserver>(&mut self, reason: HaltReason, observer: &mut O) -> TickOutcome {
        warn!(%reason, "playback halted");
        self.scheduler.cancel();
        self.clock.suspend();
        self.state.phase = Phase::Idle;
        observer.on_halt(reason);
        TickOutcome::Halted(reason)
    }
}

/// First path vertex; the origin for an empty path.
fn start_point(snapshot: &RouteSnapshot) -> GeoPoint {
    snapshot.path().first().copied().unwrap_or(GeoPoint::new(0.0, 0.0))
}
