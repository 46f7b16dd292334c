//! Geometry for the panorama viewer: viewing angles, rays, the floor plane,
//! the site-local metric frame and the Web-Mercator map projection.

mod frame;
mod mercator;
mod ray;
mod spherical;

pub use frame::{GeoPoint, LocalFrame};
pub use mercator::{EARTH_RADIUS_M, from_lon_lat, to_lon_lat};
pub use ray::{HorizontalPlane, Ray};
pub use spherical::{direction_to_lon_lat, horizontal_heading, lon_lat_to_direction};
