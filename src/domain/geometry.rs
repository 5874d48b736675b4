/// Line and segment geometry.
///
/// Everything here works in virtual coordinates (f64 pairs). The parallel
/// test compares an exact cross product with zero: generator inputs are
/// continuous uniforms, so an exactly-zero cross product has probability
/// zero, and a tolerance would change which candidate lines get rejected
/// (and therefore the generated levels).

use glam::DVec2;

/// An infinite line: a point on it plus a direction vector.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    pub point: DVec2,
    pub dir: DVec2,
}

impl Line {
    /// Line from a point and direction components.
    pub fn new(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Line {
            point: DVec2::new(x, y),
            dir: DVec2::new(dx, dy),
        }
    }

    /// Line through two points.
    #[allow(dead_code)]
    pub fn through(a: DVec2, b: DVec2) -> Self {
        Line { point: a, dir: b - a }
    }
}

/// True unless the two lines' directions are exactly proportional.
pub fn non_parallel(a: &Line, b: &Line) -> bool {
    a.dir.perp_dot(b.dir) != 0.0
}

/// Intersection point of two lines. Precondition: `non_parallel(a, b)`.
pub fn intersection(a: &Line, b: &Line) -> DVec2 {
    let denom = a.dir.perp_dot(b.dir);
    debug_assert!(denom != 0.0, "intersection of parallel lines");
    let t = (b.point - a.point).perp_dot(b.dir) / denom;
    a.point + a.dir * t
}

/// Signed area of the triangle (a, b, c); the sign is the turn direction.
fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Do the segments p1-p2 and q1-q2 properly cross?
///
/// Strict orientation test: an endpoint lying on the other segment, or a
/// collinear overlap, does not count as a crossing. Segment pairs that share
/// a vertex must be filtered out by the caller.
pub fn segments_cross(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> bool {
    orient(p1, p2, q1) * orient(p1, p2, q2) < 0.0
        && orient(q1, q2, p1) * orient(q1, q2, p2) < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_detection() {
        let a = Line::new(0.0, 0.0, 1.0, 2.0);
        let b = Line::new(5.0, 5.0, 2.0, 4.0);
        let c = Line::new(0.0, 1.0, 1.0, 0.0);
        assert!(!non_parallel(&a, &b));
        assert!(non_parallel(&a, &c));
        // A line is parallel to itself.
        assert!(!non_parallel(&a, &a));
    }

    #[test]
    fn intersection_of_diagonals() {
        let a = Line::new(0.0, 0.0, 1.0, 1.0);
        let b = Line::new(0.0, 2.0, 1.0, -1.0);
        let p = intersection(&a, &b);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn intersection_from_two_points() {
        let a = Line::through(DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0));
        let b = Line::through(DVec2::new(0.5, -3.0), DVec2::new(0.5, 7.0));
        let p = intersection(&a, &b);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn segments_cross_x_shape() {
        assert!(segments_cross(
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(2.0, 0.0),
        ));
    }

    #[test]
    fn segments_disjoint() {
        assert!(!segments_cross(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        ));
    }

    #[test]
    fn endpoint_touch_is_not_a_crossing() {
        // The second segment starts exactly on the first one.
        assert!(!segments_cross(
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
        ));
    }

    #[test]
    fn collinear_overlap_is_not_a_crossing() {
        assert!(!segments_cross(
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
        ));
    }

    #[test]
    fn near_miss_beyond_segment_end() {
        // The infinite lines cross, the segments do not.
        assert!(!segments_cross(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(0.0, 3.0),
        ));
    }
}
