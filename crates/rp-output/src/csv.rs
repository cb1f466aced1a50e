//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_trace.csv`
//! - `arrivals.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{ArrivalRow, OutputResult, PoseRow};

pub const TRACE_FILE: &str = "vehicle_trace.csv";
pub const ARRIVALS_FILE: &str = "arrivals.csv";

/// Writes the vehicle trace and arrival log to two CSV files.
pub struct CsvWriter {
    poses:    Writer<File>,
    arrivals: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create (truncating) the two CSV files in `dir` and write the headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut poses = Writer::from_path(dir.join(TRACE_FILE))?;
        poses.write_record([
            "frame", "sim_secs", "lon", "lat", "heading_deg", "path_index", "progress", "reversed",
            "dwelling",
        ])?;

        let mut arrivals = Writer::from_path(dir.join(ARRIVALS_FILE))?;
        arrivals.write_record([
            "frame", "sim_secs", "stop_id", "name", "dwell_secs", "passengers_in", "passengers_out",
            "is_terminal", "total_dwell_secs",
        ])?;

        Ok(Self { poses, arrivals, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()> {
        for row in rows {
            self.poses.write_record(&[
                row.frame.to_string(),
                format!("{:.3}", row.sim_secs),
                format!("{:.7}", row.lon),
                format!("{:.7}", row.lat),
                format!("{:.2}", row.heading_deg),
                row.path_index.to_string(),
                format!("{:.4}", row.progress),
                (row.reversed as u8).to_string(),
                (row.dwelling as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_arrival(&mut self, row: &ArrivalRow) -> OutputResult<()> {
        self.arrivals.write_record(&[
            row.frame.to_string(),
            format!("{:.3}", row.sim_secs),
            row.stop_id.to_string(),
            row.name.clone(),
            row.dwell_secs.to_string(),
            row.passengers_in.to_string(),
            row.passengers_out.to_string(),
            (row.is_terminal as u8).to_string(),
            format!("{:.3}", row.total_dwell_secs),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.poses.flush()?;
        self.arrivals.flush()?;
        Ok(())
    }
}
