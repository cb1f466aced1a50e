//! `rp-core`: foundational types for the route planner workspace.
//!
//! This crate is a dependency of every other `rp-*` crate.  It has no `rp-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde` / `serde_json`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `StopId`, `SegmentId`, `OwnerId`                          |
//! | [`geo`]       | `GeoPoint`, haversine distance, `distance_km`, `bearing`  |
//! | [`metrics`]   | `SpeedModel`, `LoadProfile`, `TravelEstimate`, formatting |
//! | [`clock`]     | `FrameClock`: real frame deltas → simulated seconds       |
//! | [`config`]    | `PlannerConfig`                                           |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types and     |
//! |         | enables `PlannerConfig::load` (JSON).                      |

pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod metrics;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::FrameClock;
pub use config::PlannerConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, bearing, distance_km};
pub use ids::{OwnerId, SegmentId, StopId};
pub use metrics::{
    LoadProfile, SpeedModel, TravelEstimate, format_duration, format_minutes_seconds,
};
