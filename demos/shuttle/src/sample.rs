//! Built-in sample line used when no route file is given.
//!
//! Five stops along the Vistula embankment in Warsaw, terminals at both
//! ends, one single-track climb in the middle.

use anyhow::Result;

use rp_core::{GeoPoint, PlannerConfig};
use rp_network::{Route, SegmentParams, StopDraft, TrackCount};

pub fn sample_route(config: &PlannerConfig) -> Result<Route> {
    let mut route = Route::new("Embankment shuttle", config);
    {
        let mut b = route.builder();
        let stops = [
            (GeoPoint::new(21.0280, 52.2590), StopDraft::named("Gdański Bridge").terminal().dwell(20)),
            (GeoPoint::new(21.0330, 52.2520), StopDraft::named("Old Town").dwell(30).passengers(12, 5)),
            (GeoPoint::new(21.0385, 52.2440), StopDraft::named("Copernicus").dwell(25).passengers(8, 9)),
            (GeoPoint::new(21.0440, 52.2360), StopDraft::named("Powiśle").dwell(30).passengers(15, 11)),
            (GeoPoint::new(21.0500, 52.2290), StopDraft::named("Łazienkowski").terminal().dwell(20)),
        ];
        for (pos, draft) in stops.clone() {
            b.add_stop(pos, draft)?;
        }

        let climb = SegmentParams { gradient_percent: 3.5, track_count: TrackCount::Single, max_units: 4 };
        for (i, pair) in stops.windows(2).enumerate() {
            let (from, to) = (pair[0].0, pair[1].0);
            let mid = from.lerp(to, 0.5);
            // Bow each segment slightly east so it is not a straight chord.
            let bowed = GeoPoint::new(mid.lon + 0.0008, mid.lat);
            let params = if i == 2 { climb } else { SegmentParams::default() };
            b.add_segment(&[from, bowed, to], params)?;
        }
    }
    Ok(route)
}
