//! Spherical Web-Mercator (EPSG:3857), the projection the map overlay works in.

use std::f64::consts::FRAC_PI_4;

use glam::DVec2;

/// WGS84 semi-major axis used by EPSG:3857.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Longitude/latitude in degrees → projected map metres.
#[must_use]
pub fn from_lon_lat(lon: f64, lat: f64) -> DVec2 {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    DVec2::new(x, y)
}

/// Projected map metres → longitude/latitude in degrees.
#[must_use]
pub fn to_lon_lat(coord: DVec2) -> (f64, f64) {
    let lon = (coord.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    (lon, lat)
}
