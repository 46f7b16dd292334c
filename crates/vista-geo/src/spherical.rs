//! Viewing angles ↔ unit direction vectors.
//!
//! Angles are in degrees. Longitude-of-view runs counter-clockwise around +Z,
//! latitude-of-view is elevation above the horizontal plane. Longitude 0 looks
//! down −X: the panorama sphere is viewed from the inside, so the Cartesian
//! x/y components are negated relative to the usual spherical mapping.

use glam::DVec3;

/// Unit viewing direction for the given longitude/latitude of view.
#[must_use]
pub fn lon_lat_to_direction(lon_deg: f64, lat_deg: f64) -> DVec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = lon_deg.to_radians();

    let x = phi.sin() * theta.cos();
    let y = phi.sin() * theta.sin();
    let z = phi.cos();

    DVec3::new(-x, -y, z).normalize()
}

/// Inverse of [`lon_lat_to_direction`]: returns `(lon, lat)` in degrees with
/// `lon ∈ [0, 360)` and `lat ∈ [-90, 90]`.
///
/// The input does not need to be normalized. A zero vector maps to `(0, 0)`.
#[must_use]
pub fn direction_to_lon_lat(direction: DVec3) -> (f64, f64) {
    let d = direction.try_normalize().unwrap_or(DVec3::NEG_X);

    let phi = d.z.clamp(-1.0, 1.0).acos();
    let theta = (-d.y).atan2(-d.x);

    let lat = 90.0 - phi.to_degrees();
    let lon = (theta.to_degrees() + 360.0).rem_euclid(360.0);
    (lon, lat)
}

/// Unit direction on the horizontal plane for a longitude of view.
#[must_use]
pub fn horizontal_heading(lon_deg: f64) -> DVec3 {
    let theta = lon_deg.to_radians();
    DVec3::new(-theta.cos(), -theta.sin(), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_zero_angles_look_down_neg_x() {
        let d = lon_lat_to_direction(0.0, 0.0);
        assert!((d - DVec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_quarter_turn_looks_down_neg_y() {
        let d = lon_lat_to_direction(90.0, 0.0);
        assert!((d - DVec3::NEG_Y).length() < EPS);
    }

    #[test]
    fn test_positive_latitude_looks_up() {
        let d = lon_lat_to_direction(0.0, 45.0);
        assert!(d.z > 0.7);
        let d = lon_lat_to_direction(0.0, -45.0);
        assert!(d.z < -0.7);
    }

    #[test]
    fn test_direction_is_unit_length() {
        for lon in [0.0, 33.0, 180.0, 271.5] {
            for lat in [-80.0, -10.0, 0.0, 60.0] {
                let d = lon_lat_to_direction(lon, lat);
                assert!((d.length() - 1.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_inverse_recovers_angles() {
        let (lon, lat) = direction_to_lon_lat(lon_lat_to_direction(123.0, -17.5));
        assert!((lon - 123.0).abs() < 1e-9);
        assert!((lat + 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_longitude_is_wrapped() {
        let (lon, _) = direction_to_lon_lat(lon_lat_to_direction(-30.0, 0.0));
        assert!((lon - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_accepts_unnormalized_input() {
        let (lon, lat) = direction_to_lon_lat(DVec3::new(-5.0, 0.0, 0.0));
        assert!(lon.abs() < EPS);
        assert!(lat.abs() < EPS);
    }

    #[test]
    fn test_zero_vector_maps_to_origin_angles() {
        let (lon, lat) = direction_to_lon_lat(DVec3::ZERO);
        assert!(lon.abs() < EPS);
        assert!(lat.abs() < EPS);
    }

    #[test]
    fn test_heading_matches_level_direction() {
        let heading = horizontal_heading(200.0);
        let level = lon_lat_to_direction(200.0, 0.0);
        assert!((heading - level).length() < EPS);
        assert_eq!(heading.z, 0.0);
    }
}
