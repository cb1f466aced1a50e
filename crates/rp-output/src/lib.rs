//! `rp-output`: vehicle trace writers for the route planner.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                           |
//! |-----------|---------|-----------------------------------------|
//! | *(none)*  | CSV     | `vehicle_trace.csv`, `arrivals.csv`     |
//! | `sqlite`  | SQLite  | `trace.db`                              |
//!
//! Both implement [`OutputWriter`] and are driven by [`TraceObserver`],
//! which implements `rp_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rp_output::{CsvWriter, TraceObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = TraceObserver::new(writer, 60);
//! run_frames(&mut engine, handle, &mut frames, 36_000, &mut obs);
//! obs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::{ArrivalRow, PoseRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
