//! Integration tests for rp-output.

#[cfg(test)]
mod helpers {
    use rp_core::{GeoPoint, StopId};
    use rp_sim::{ArrivalNotice, Direction, VehiclePose};

    use crate::{ArrivalRow, PoseRow};

    pub fn pose(index: usize, progress: f64) -> VehiclePose {
        VehiclePose {
            position:    GeoPoint::new(21.0 + 0.01 * progress, 52.2),
            heading_deg: 0.0,
            index,
            progress,
            direction:   Direction::Forward,
            dwelling:    false,
            sim_secs:    progress * 40.0,
        }
    }

    pub fn pose_row(frame: u64) -> PoseRow {
        PoseRow::from_pose(frame, &pose(0, 0.25))
    }

    pub fn notice(name: &str) -> ArrivalNotice {
        ArrivalNotice {
            stop:             StopId(1),
            name:             name.to_owned(),
            dwell_secs:       30,
            passengers_in:    4,
            passengers_out:   2,
            is_terminal:      false,
            path_index:       1,
            total_sim_secs:   41.0,
            total_dwell_secs: 0.0,
        }
    }

    pub fn arrival_row(frame: u64) -> ArrivalRow {
        ArrivalRow::from_notice(frame, &notice("Central, platform 2"))
    }
}

// ── CSV backend ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::helpers::{arrival_row, pose_row};
    use crate::csv::{ARRIVALS_FILE, CsvWriter, TRACE_FILE};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TRACE_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            ["frame", "sim_secs", "lon", "lat", "heading_deg", "path_index", "progress", "reversed", "dwelling"]
        );

        let mut rdr = csv::Reader::from_path(dir.path().join(ARRIVALS_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers[3], "name");
        assert_eq!(headers.len(), 9);
    }

    #[test]
    fn csv_pose_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_poses(&[pose_row(0), pose_row(60)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TRACE_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "60");       // frame
        assert_eq!(&rows[0][1], "10.000");   // sim_secs
        assert_eq!(&rows[0][2], "21.0025000");
        assert_eq!(&rows[0][6], "0.2500");   // progress
        assert_eq!(&rows[0][7], "0");        // reversed
    }

    #[test]
    fn csv_arrival_name_is_quoted() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_arrival(&arrival_row(41)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(ARRIVALS_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "Central, platform 2");
        assert_eq!(&rows[0][4], "30");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use std::io;

    use rp_sim::{HaltReason, SimObserver};

    use super::helpers::{notice, pose};
    use crate::{ArrivalRow, OutputError, OutputResult, OutputWriter, PoseRow, TraceObserver};

    /// In-memory writer; optionally fails every pose write.
    #[derive(Default)]
    struct MemWriter {
        poses:     Vec<PoseRow>,
        arrivals:  Vec<ArrivalRow>,
        finishes:  usize,
        fail:      bool,
    }

    impl OutputWriter for MemWriter {
        fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()> {
            if self.fail {
                return Err(OutputError::Io(io::Error::other("disk full")));
            }
            self.poses.extend_from_slice(rows);
            Ok(())
        }
        fn write_arrival(&mut self, row: &ArrivalRow) -> OutputResult<()> {
            self.arrivals.push(row.clone());
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn samples_every_interval() {
        let mut obs = TraceObserver::new(MemWriter::default(), 10);
        for i in 0..35 {
            obs.on_pose(&pose(0, i as f64 / 100.0));
        }
        obs.finish().unwrap();
        assert_eq!(obs.frames(), 35);
        let w = obs.into_writer();
        let frames: Vec<_> = w.poses.iter().map(|r| r.frame).collect();
        assert_eq!(frames, [0, 10, 20, 30]);
        assert_eq!(w.finishes, 1);
    }

    #[test]
    fn zero_interval_keeps_everything() {
        let mut obs = TraceObserver::new(MemWriter::default(), 0);
        for _ in 0..3 {
            obs.on_pose(&pose(0, 0.0));
        }
        obs.finish().unwrap();
        assert_eq!(obs.into_writer().poses.len(), 3);
    }

    #[test]
    fn arrivals_carry_frame() {
        let mut obs = TraceObserver::new(MemWriter::default(), 1);
        obs.on_pose(&pose(0, 0.0));
        obs.on_pose(&pose(0, 0.5));
        obs.on_arrival(&notice("B"));
        let w = obs.into_writer();
        assert_eq!(w.arrivals.len(), 1);
        assert_eq!(w.arrivals[0].frame, 2);
        assert_eq!(w.arrivals[0].name, "B");
        assert_eq!(w.arrivals[0].stop_id, 1);
    }

    #[test]
    fn first_error_is_kept() {
        let writer = MemWriter { fail: true, ..MemWriter::default() };
        let mut obs = TraceObserver::new(writer, 1);
        obs.on_pose(&pose(0, 0.0));
        obs.on_halt(HaltReason::Detached);
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
        assert!(obs.finish().is_ok());
    }
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod playback {
    use rp_core::{GeoPoint, PlannerConfig};
    use rp_network::{Route, SegmentParams, StopDraft};
    use rp_sim::{EngineBuilder, FixedFrames, run_frames};

    use crate::csv::{ARRIVALS_FILE, TRACE_FILE};
    use crate::{CsvWriter, TraceObserver};

    #[test]
    fn shuttle_trace_to_csv() {
        let pt = |lon| GeoPoint::new(lon, 52.2);
        let mut route = Route::new("Shuttle", &PlannerConfig::default());
        {
            let mut b = route.builder();
            b.add_stop(pt(21.00), StopDraft::named("West").terminal()).unwrap();
            b.add_stop(pt(21.01), StopDraft::named("East").terminal().dwell(5)).unwrap();
            b.add_segment(&[pt(21.00), pt(21.01)], SegmentParams::default()).unwrap();
        }
        let mut engine = EngineBuilder::new(&route).build().unwrap();
        let handle = engine.start().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = TraceObserver::new(CsvWriter::new(dir.path()).unwrap(), 10);
        let summary = run_frames(&mut engine, handle, &mut FixedFrames::new(1.0), 100, &mut obs);
        assert_eq!(summary.frames, 100);
        obs.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TRACE_FILE)).unwrap();
        assert_eq!(rdr.records().count(), 10);

        let mut rdr = csv::Reader::from_path(dir.path().join(ARRIVALS_FILE)).unwrap();
        let names: Vec<String> = rdr.records().map(|r| r.unwrap()[3].to_owned()).collect();
        assert_eq!(names, ["East", "West"]);
    }
}

// ── SQLite backend ────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use rusqlite::Connection;

    use super::helpers::{arrival_row, pose_row};
    use crate::sqlite::{DB_FILE, SqliteWriter};
    use crate::writer::OutputWriter;

    #[test]
    fn sqlite_tables_filled() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_poses(&[pose_row(0), pose_row(1), pose_row(2)]).unwrap();
        w.write_arrival(&arrival_row(2)).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let conn = Connection::open(dir.path().join(DB_FILE)).unwrap();
        let poses: i64 = conn
            .query_row("SELECT COUNT(*) FROM vehicle_trace", [], |r| r.get(0))
            .unwrap();
        assert_eq!(poses, 3);
        let name: String = conn
            .query_row("SELECT name FROM arrivals WHERE frame = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "Central, platform 2");
    }
}
