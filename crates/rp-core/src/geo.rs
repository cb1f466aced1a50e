//! Geographic coordinate type and polyline utilities.
//!
//! `GeoPoint` uses `f64` longitude/latitude.  Drawn geometry is snapped onto
//! stop positions exactly, and the simulation interpolates between vertices
//! every frame, so single precision would make "is the vehicle at this stop"
//! checks needlessly fragile.

/// Mean Earth radius in metres (same constant the map toolkit uses).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Rotation applied to the raw arctangent so that 0° matches the heading the
/// vehicle icon is drawn with.
pub const BEARING_OFFSET_DEG: f64 = 270.0;

/// A WGS-84 geographic coordinate.
///
/// With the `serde` feature it (de)serializes as a `[lon, lat]` array, the
/// order used by the exchange records.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[f64; 2]", into = "[f64; 2]")
)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `true` if both components are finite and inside the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// `true` if `other` lies within `tolerance_m` metres of `self`.
    #[inline]
    pub fn within_m(self, other: GeoPoint, tolerance_m: f64) -> bool {
        self.distance_m(other) <= tolerance_m
    }

    /// Linear interpolation in coordinate space; `t = 0` is `self`, `t = 1`
    /// is `other`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lon: self.lon + (other.lon - self.lon) * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }

    /// Heading from `self` to `other`; see [`bearing`].
    #[inline]
    pub fn bearing_to(self, other: GeoPoint) -> f64 {
        bearing(self, other)
    }
}

impl From<[f64; 2]> for GeoPoint {
    /// `[lon, lat]`.
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Total great-circle length of `path` in kilometres.
///
/// Returns `0.0` for paths with fewer than two points.
pub fn distance_km(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|w| w[0].distance_m(w[1]))
        .sum::<f64>()
        / 1_000.0
}

/// Heading in degrees, in `[0, 360)`, from `from` to `to`.
///
/// Computed as `atan2(Δlon, Δlat)` (0° = north, clockwise) and then rotated
/// by [`BEARING_OFFSET_DEG`].  Identical points yield the offset itself.
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let raw = (to.lon - from.lon).atan2(to.lat - from.lat).to_degrees();
    normalize_deg(raw + BEARING_OFFSET_DEG)
}

/// Wrap any angle into `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if r >= 360.0 { r - 360.0 } else { r }
}
