use super::{Point3, Vector3, TOLERANCE};

/// Computes the (unnormalized) normal of a polygon using Newell's method.
///
/// The length of the result is twice the polygon area, and the direction
/// follows the right-hand rule over the vertex order. Works for non-planar
/// and concave loops, where a single cross product would not.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Computes the vertex centroid of a polygon.
#[must_use]
pub fn polygon_centroid(points: &[Point3]) -> Point3 {
    let n = points.len();
    if n == 0 {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / n as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum * inv_n)
}

/// Returns `true` if every vertex lies within `epsilon` of the polygon's
/// best-fit plane through its centroid.
#[must_use]
pub fn is_planar(points: &[Point3], epsilon: f64) -> bool {
    if points.len() <= 3 {
        return true;
    }
    let normal = newell_normal(points);
    let len = normal.norm();
    if len < TOLERANCE {
        return false;
    }
    let normal = normal / len;
    let centroid = polygon_centroid(points);
    points
        .iter()
        .all(|p| (p - centroid).dot(&normal).abs() <= epsilon)
}

/// Returns the parameter `t` in `(0, 1)` at which `point` lies on the open
/// segment `[start, end]`, or `None` if it is farther than `epsilon` from the
/// segment or coincides with an endpoint.
#[must_use]
pub fn param_on_segment(point: &Point3, start: &Point3, end: &Point3, epsilon: f64) -> Option<f64> {
    let dir = end - start;
    let len_sq = dir.norm_squared();
    if len_sq < TOLERANCE {
        return None;
    }
    let t = (point - start).dot(&dir) / len_sq;
    let len = len_sq.sqrt();
    if t * len <= epsilon || (1.0 - t) * len <= epsilon {
        return None;
    }
    let closest = start + dir * t;
    ((point - closest).norm() <= epsilon).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn newell_normal_of_ccw_square_points_up() {
        let square = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 2.0, 0.0), p(0.0, 2.0, 0.0)];
        let n = newell_normal(&square);
        assert_relative_eq!(n.z, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn concave_polygon_normal_scales_with_area() {
        let l_shape = [
            p(0.0, 0.0, 1.0),
            p(2.0, 0.0, 1.0),
            p(2.0, 1.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(1.0, 2.0, 1.0),
            p(0.0, 2.0, 1.0),
        ];
        assert_relative_eq!(newell_normal(&l_shape).norm() * 0.5, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn warped_quad_is_not_planar() {
        let quad = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.3), p(0.0, 1.0, 0.0)];
        assert!(!is_planar(&quad, 1e-5));
        assert!(is_planar(&quad[..3], 1e-5));
    }

    #[test]
    fn point_on_segment_interior() {
        let t = param_on_segment(&p(1.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(4.0, 0.0, 0.0), 1e-9);
        assert_relative_eq!(t.unwrap_or(-1.0), 0.25, epsilon = 1e-12);
        assert!(param_on_segment(&p(0.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(4.0, 0.0, 0.0), 1e-9).is_none());
        assert!(param_on_segment(&p(1.0, 0.1, 0.0), &p(0.0, 0.0, 0.0), &p(4.0, 0.0, 0.0), 1e-9).is_none());
    }
}
