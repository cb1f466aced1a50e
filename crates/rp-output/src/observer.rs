//! `TraceObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use tracing::debug;

use rp_core::format_duration;
use rp_sim::{ArrivalNotice, HaltReason, SimObserver, VehiclePose};

use crate::row::{ArrivalRow, PoseRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Poses buffered before a batch write.
const POSE_BATCH: usize = 512;

/// A [`SimObserver`] that records every `interval`-th pose and every stop
/// call to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  Check them with [`take_error`][Self::take_error],
/// or call [`finish`][Self::finish] when playback is over.
pub struct TraceObserver<W: OutputWriter> {
    writer:     W,
    interval:   u64,
    frame:      u64,
    last_secs:  f64,
    poses:      Vec<PoseRow>,
    written:    u64,
    arrivals:   u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> TraceObserver<W> {
    /// Sample one pose every `interval` frames (`0` is treated as `1`).
    pub fn new(writer: W, interval: u64) -> Self {
        Self {
            writer,
            interval:   interval.max(1),
            frame:      0,
            last_secs:  0.0,
            poses:      Vec::with_capacity(POSE_BATCH),
            written:    0,
            arrivals:   0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Frames observed so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Write buffered poses and close the writer.  Returns the first error
    /// met at any point during recording.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.close();
        match self.last_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Unwrap the inner writer (e.g. to inspect files after playback).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn close(&mut self) {
        self.flush_poses();
        let result = self.writer.finish();
        self.store_err(result);
        debug!(
            frames = self.frame,
            poses = self.written,
            arrivals = self.arrivals,
            sim_time = %format_duration(self.last_secs),
            "trace closed",
        );
    }

    fn flush_poses(&mut self) {
        if self.poses.is_empty() {
            return;
        }
        let result = self.writer.write_poses(&self.poses);
        self.written += self.poses.len() as u64;
        self.poses.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for TraceObserver<W> {
    fn on_pose(&mut self, pose: &VehiclePose) {
        if self.frame.is_multiple_of(self.interval) {
            self.poses.push(PoseRow::from_pose(self.frame, pose));
            if self.poses.len() >= POSE_BATCH {
                self.flush_poses();
            }
        }
        self.last_secs = pose.sim_secs;
        self.frame += 1;
    }

    fn on_arrival(&mut self, notice: &ArrivalNotice) {
        self.arrivals += 1;
        let result = self.writer.write_arrival(&ArrivalRow::from_notice(self.frame, notice));
        self.store_err(result);
    }

    fn on_halt(&mut self, _reason: HaltReason) {
        self.close();
    }
}
