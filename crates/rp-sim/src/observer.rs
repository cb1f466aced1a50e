//! Simulation observer trait for rendering and data collection.

use rp_core::StopId;

use crate::{ArrivalNotice, Direction, HaltReason, ReverseCause, VehiclePose};

/// Callbacks invoked by [`SimulationEngine::tick`][crate::SimulationEngine::tick].
///
/// All methods have default implementations so implementors only need to
/// override what they care about.
///
/// # Example: arrival printer
///
/// ```rust,ignore
/// struct Announcer;
///
/// impl SimObserver for Announcer {
///     fn on_arrival(&mut self, notice: &ArrivalNotice) {
///         println!("{}", notice.popup());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Whether the render target still exists.  Returning `false` halts
    /// playback before the frame is processed.
    fn is_attached(&self) -> bool {
        true
    }

    /// Called once per processed frame with the vehicle's pose.
    fn on_pose(&mut self, _pose: &VehiclePose) {}

    /// Called when the vehicle calls at a stop.
    fn on_arrival(&mut self, _notice: &ArrivalNotice) {}

    /// Called when the dwell at `stop` is over.
    fn on_departure(&mut self, _stop: StopId, _sim_secs: f64) {}

    /// Called after the direction flips; `direction` is the new one.
    fn on_reverse(&mut self, _direction: Direction, _cause: ReverseCause) {}

    /// Called once when playback stops on its own.
    fn on_halt(&mut self, _reason: HaltReason) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

impl<O: SimObserver + ?Sized> SimObserver for &mut O {
    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }
    fn on_pose(&mut self, pose: &VehiclePose) {
        (**self).on_pose(pose)
    }
    fn on_arrival(&mut self, notice: &ArrivalNotice) {
        (**self).on_arrival(notice)
    }
    fn on_departure(&mut self, stop: StopId, sim_secs: f64) {
        (**self).on_departure(stop, sim_secs)
    }
    fn on_reverse(&mut self, direction: Direction, cause: ReverseCause) {
        (**self).on_reverse(direction, cause)
    }
    fn on_halt(&mut self, reason: HaltReason) {
        (**self).on_halt(reason)
    }
}
