//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `trace.db` file in the configured output directory with
//! two tables: `vehicle_trace` and `arrivals`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{ArrivalRow, OutputResult, PoseRow};

pub const DB_FILE: &str = "trace.db";

/// Writes the vehicle trace and arrival log to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `trace.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join(DB_FILE))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS vehicle_trace (
                 frame       INTEGER PRIMARY KEY,
                 sim_secs    REAL    NOT NULL,
                 lon         REAL    NOT NULL,
                 lat         REAL    NOT NULL,
                 heading_deg REAL    NOT NULL,
                 path_index  INTEGER NOT NULL,
                 progress    REAL    NOT NULL,
                 reversed    INTEGER NOT NULL,
                 dwelling    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS arrivals (
                 frame            INTEGER NOT NULL,
                 sim_secs         REAL    NOT NULL,
                 stop_id          INTEGER NOT NULL,
                 name             TEXT    NOT NULL,
                 dwell_secs       INTEGER NOT NULL,
                 passengers_in    INTEGER NOT NULL,
                 passengers_out   INTEGER NOT NULL,
                 is_terminal      INTEGER NOT NULL,
                 total_dwell_secs REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_trace \
                 (frame, sim_secs, lon, lat, heading_deg, path_index, progress, reversed, dwelling) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.frame as i64,
                    row.sim_secs,
                    row.lon,
                    row.lat,
                    row.heading_deg,
                    row.path_index as i64,
                    row.progress,
                    row.reversed as i64,
                    row.dwelling as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_arrival(&mut self, row: &ArrivalRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO arrivals \
             (frame, sim_secs, stop_id, name, dwell_secs, passengers_in, passengers_out, \
              is_terminal, total_dwell_secs) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                row.frame as i64,
                row.sim_secs,
                row.stop_id,
                row.name,
                row.dwell_secs,
                row.passengers_in,
                row.passengers_out,
                row.is_terminal as i64,
                row.total_dwell_secs,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
