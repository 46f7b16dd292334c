//! Nearest-node lookup.
//!
//! A floor holds tens to low hundreds of nodes, so every query is a linear
//! scan over the candidates. Ordering contract: candidates are visited in
//! iteration order and only a strictly smaller distance replaces the current
//! best, so the first of several equidistant candidates wins.

use glam::{DVec2, DVec3};

/// Anything with a position in the local frame.
pub trait Spatial {
    /// Position in local metres.
    fn position(&self) -> DVec3;

    /// Position projected onto the horizontal plane.
    fn planar(&self) -> DVec2 {
        self.position().truncate()
    }
}

/// The candidate whose key lies closest to `point`, if that distance is
/// below `threshold`.
pub fn nearest_by<'a, T, I, F>(point: DVec2, candidates: I, threshold: f64, key: F) -> Option<&'a T>
where
    T: ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> DVec2,
{
    let mut best = None;
    let mut best_distance = threshold;
    for candidate in candidates {
        let distance = point.distance(key(candidate));
        if distance < best_distance {
            best_distance = distance;
            best = Some(candidate);
        }
    }
    best
}

/// The candidate with the smallest planar (x, y) distance to `point`.
pub fn nearest<'a, T, I>(point: DVec2, candidates: I, threshold: f64) -> Option<&'a T>
where
    T: Spatial + 'a,
    I: IntoIterator<Item = &'a T>,
{
    nearest_by(point, candidates, threshold, |c: &T| c.planar())
}

/// Candidates within `radius` (3D distance) of `center`, in iteration order.
pub fn within_radius<'a, T, I>(center: DVec3, radius: f64, candidates: I) -> impl Iterator<Item = &'a T>
where
    T: Spatial + 'a,
    I: IntoIterator<Item = &'a T>,
{
    candidates
        .into_iter()
        .filter(move |c| c.position().distance(center) <= radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point(u32, DVec3);

    impl Spatial for Point {
        fn position(&self) -> DVec3 {
            self.1
        }
    }

    fn p(id: u32, x: f64, y: f64) -> Point {
        Point(id, DVec3::new(x, y, 0.0))
    }

    #[test]
    fn test_three_node_example() {
        let nodes = [p(0, 0.0, 0.0), p(1, 10.0, 0.0), p(2, 0.0, 10.0)];
        let best = nearest(DVec2::new(1.0, 1.0), &nodes, f64::INFINITY).unwrap();
        assert_eq!(best.0, 0);
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let nodes: [Point; 0] = [];
        assert!(nearest(DVec2::ZERO, &nodes, f64::INFINITY).is_none());
    }

    #[test]
    fn test_tie_goes_to_first_in_order() {
        let nodes = [p(7, 1.0, 0.0), p(3, -1.0, 0.0), p(5, 0.0, 1.0)];
        assert_eq!(nearest(DVec2::ZERO, &nodes, 10.0).unwrap().0, 7);
        let reversed = [p(3, -1.0, 0.0), p(7, 1.0, 0.0)];
        assert_eq!(nearest(DVec2::ZERO, &reversed, 10.0).unwrap().0, 3);
    }

    #[test]
    fn test_threshold_excludes_far_nodes() {
        let nodes = [p(0, 5.0, 0.0)];
        assert!(nearest(DVec2::ZERO, &nodes, 5.0).is_none());
        assert!(nearest(DVec2::ZERO, &nodes, 5.1).is_some());
    }

    #[test]
    fn test_height_ignored_for_planar_distance() {
        let nodes = [Point(0, DVec3::new(2.0, 0.0, 0.0)), Point(1, DVec3::new(1.0, 0.0, 50.0))];
        assert_eq!(nearest(DVec2::ZERO, &nodes, 10.0).unwrap().0, 1);
    }

    #[test]
    fn test_nearest_by_custom_key() {
        let nodes = [p(0, 0.0, 0.0), p(1, 10.0, 0.0)];
        let best = nearest_by(DVec2::new(1.0, 0.0), &nodes, 100.0, |n| {
            DVec2::new(-n.1.x, n.1.y)
        });
        assert_eq!(best.unwrap().0, 0);
        let best = nearest_by(DVec2::new(-9.0, 0.0), &nodes, 100.0, |n| {
            DVec2::new(-n.1.x, n.1.y)
        });
        assert_eq!(best.unwrap().0, 1);
    }

    #[test]
    fn test_within_radius_keeps_order() {
        let nodes = [p(0, 0.0, 0.0), p(1, 50.0, 0.0), p(2, 3.0, 4.0)];
        let ids: Vec<_> = within_radius(DVec3::ZERO, 5.0, &nodes).map(|n| n.0).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
