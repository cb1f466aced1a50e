//! `rp-network`: stop/segment network model, spatial snapping, and editing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`model`]   | `Stop`, `Segment`, `TrackCount`, `NetworkModel` (+ path)      |
//! | [`spatial`] | `StopIndex`: R-tree nearest-stop lookup with a metre radius   |
//! | [`builder`] | `NetworkBuilder`: draw/edit gestures → model mutations        |
//! | [`overlay`] | `OverlaySink` trait, stop/segment overlays and styles         |
//! | [`route`]   | `Route`, `RouteParams`, `VehicleClass`                        |
//! | [`records`] | `RouteRecord`, `StopRecord`, `SegmentRecord` (exchange shape) |
//! | [`loader`]  | Route JSON read/write                                          |
//! | [`stats`]   | `RouteStats`                                                   |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Data flow
//!
//! ```text
//! draw / edit gesture ──► NetworkBuilder ──► NetworkModel ──► OverlaySink
//!                                               │
//!                                               └─► ordered path (read by rp-sim)
//! ```
//!
//! The model is only mutated through a builder borrowing it mutably; every
//! mutation re-derives the ordered path before returning.

pub mod builder;
pub mod error;
pub mod loader;
pub mod model;
pub mod overlay;
pub mod records;
pub mod route;
pub mod spatial;
pub mod stats;


pub use builder::{NetworkBuilder, StopDraft, StopEdit};
pub use error::{LineEnd, NetworkError, NetworkResult};
pub use loader::{load_route_json, parse_route_json, save_route_json};
pub use model::{NetworkModel, Segment, SegmentMetrics, SegmentParams, Stop, TrackCount};
pub use overlay::{LineStyle, MarkerStyle, NoopOverlay, OverlaySink, SegmentOverlay, StopOverlay};
pub use records::{RouteRecord, SegmentRecord, StopRecord};
pub use route::{Route, RouteParams, VehicleClass};
pub use spatial::StopIndex;
pub use stats::RouteStats;
