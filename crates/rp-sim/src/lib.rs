//! `rp-sim`: frame-driven playback of one vehicle along a route.
//!
//! # Frame loop
//!
//! ```text
//! engine.start()  ──► TickHandle
//! every frame:    engine.tick(handle, frame_secs, &mut observer)
//!                   Continue      → keep going
//!                   Stale         → handle was cancelled (pause/reset/load)
//!                   Halted(why)   → path empty or render target gone
//! ```
//!
//! The engine plays a [`RouteSnapshot`] taken when it was built or loaded,
//! so edits to the live network never race with playback.  Only one vehicle
//! runs, along the network's single ordered path.  When it runs off either
//! end without meeting a terminal stop it turns round and comes back.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rp_sim::{EngineBuilder, FixedFrames, NoopObserver, run_frames};
//!
//! let mut engine = EngineBuilder::new(&route).speed_multiplier(10.0).build()?;
//! let handle = engine.start()?;
//! run_frames(&mut engine, handle, &mut FixedFrames::new(1.0 / 60.0), 3_600, &mut NoopObserver);
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod observer;
pub mod runner;
pub mod scheduler;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use engine::{SimulationEngine, SimulationInputs};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use runner::{FixedFrames, FrameSource, RunSummary, WallClockFrames, run_frames};
pub use scheduler::{Scheduler, TickHandle};
pub use snapshot::{RouteSnapshot, StopInfo};
pub use state::{
    ArrivalNotice, Direction, HaltReason, Phase, ReverseCause, SimulationState, TickOutcome,
    VehiclePose,
};
