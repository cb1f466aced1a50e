//! The `OutputWriter` trait implemented by all backend writers.

use crate::{ArrivalRow, OutputResult, PoseRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors surface to the observer, which stores the first one for
/// [`TraceObserver::take_error`][crate::TraceObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of sampled vehicle poses.
    fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()>;

    /// Write one stop call.
    fn write_arrival(&mut self, row: &ArrivalRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
