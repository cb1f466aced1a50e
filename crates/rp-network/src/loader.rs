//! Route JSON read/write.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::{NetworkResult, RouteRecord};

/// Parse a route record from a JSON string.
pub fn parse_route_json(json: &str) -> NetworkResult<RouteRecord> {
    Ok(serde_json::from_str(json)?)
}

/// Read a route record from a JSON file.
pub fn load_route_json(path: &Path) -> NetworkResult<RouteRecord> {
    let reader = BufReader::new(File::open(path)?);
    let record: RouteRecord = serde_json::from_reader(reader)?;
    info!(
        path = %path.display(),
        name = %record.name,
        stops = record.stops.len(),
        segments = record.segments.len(),
        "route loaded",
    );
    Ok(record)
}

/// Write `record` to `path` as pretty-printed JSON, replacing any existing
/// file.
pub fn save_route_json(path: &Path, record: &RouteRecord) -> NetworkResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), name = %record.name, "route saved");
    Ok(())
}
