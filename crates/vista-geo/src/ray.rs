//! Rays and the horizontal floor plane.

use glam::DVec3;

/// Components smaller than this are treated as zero for intersection tests.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A half-line with a normalized direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: DVec3,
    /// Unit direction.
    pub dir: DVec3,
}

impl Ray {
    /// Create a ray, normalizing `dir`. Returns `None` for a zero direction.
    #[must_use]
    pub fn new(origin: DVec3, dir: DVec3) -> Option<Self> {
        dir.try_normalize().map(|dir| Self { origin, dir })
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }

    /// Whether the ray has any downward (−Z) component.
    #[must_use]
    pub fn points_down(&self) -> bool {
        self.dir.z < 0.0
    }

    /// Distance along the ray to the first intersection with a sphere, if any.
    ///
    /// A ray starting inside the sphere reports the exit point.
    #[must_use]
    pub fn intersect_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let near = -b - sqrt_disc;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + sqrt_disc;
        (far >= 0.0).then_some(far)
    }
}

/// A plane of constant height, normal pointing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizontalPlane {
    /// Height of the plane.
    pub z: f64,
}

impl HorizontalPlane {
    /// Plane at height `z`.
    #[must_use]
    pub fn at_height(z: f64) -> Self {
        Self { z }
    }

    /// Intersection of the ray segment `[0, max_distance]` with the plane.
    ///
    /// `None` when the ray runs parallel to the plane or the crossing lies
    /// behind the origin or beyond `max_distance`.
    #[must_use]
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Option<DVec3> {
        if ray.dir.z.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.z - ray.origin.z) / ray.dir.z;
        if !(0.0..=max_distance).contains(&t) {
            return None;
        }
        let mut point = ray.at(t);
        point.z = self.z;
        Some(point)
    }
}
