use nalgebra::{Point3, Vector3};
use std::f64::consts::FRAC_PI_2;

/// Determinant of the 3x3 matrix whose rows are `a`, `b` and `c`.
///
/// Written out term by term so the sign is reproducible regardless of how a generic
/// decomposition would order its operations.
#[inline]
pub fn det3(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    -(a.z * b.y * c.x) + a.y * b.z * c.x + a.z * b.x * c.y - a.x * b.z * c.y - a.y * b.x * c.z
        + a.x * b.y * c.z
}

/// Angle in radians between the line through `from` and `to` and the plane through
/// `p1`, `p2`, `p3`.
///
/// A degenerate plane (coincident or collinear points) has no normal; the angle is then
/// reported as a right angle. A zero-length line lies in every plane and yields zero.
pub fn line_plane_angle(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    from: &Point3<f64>,
    to: &Point3<f64>,
) -> f64 {
    let normal = (p2 - p1).cross(&(p3 - p1));
    let normal_norm = normal.norm();
    if normal_norm < f64::EPSILON {
        return FRAC_PI_2;
    }
    let direction = to - from;
    let direction_norm = direction.norm();
    if direction_norm < f64::EPSILON {
        return 0.0;
    }
    let sine = (normal.dot(&direction).abs() / (normal_norm * direction_norm)).min(1.0);
    sine.asin()
}

/// Whether `center` is nearly coplanar with its neighbors.
///
/// Needs at least three neighbors. For every neighbor triple the plane through the three
/// is taken and the lines from each of them to the center are measured against it; the
/// center is near-planar when the largest such angle stays below `threshold`.
pub fn is_near_planar(center: &Point3<f64>, neighbors: &[Point3<f64>], threshold: f64) -> bool {
    let n = neighbors.len();
    if n < 3 {
        return false;
    }
    let mut max_angle: f64 = 0.0;
    for i in 0..n - 2 {
        for j in i + 1..n - 1 {
            for k in j + 1..n {
                let (a, b, c) = (&neighbors[i], &neighbors[j], &neighbors[k]);
                let local = line_plane_angle(a, b, c, a, center)
                    .max(line_plane_angle(a, b, c, b, center))
                    .max(line_plane_angle(a, b, c, c, center));
                max_angle = max_angle.max(local);
            }
        }
    }
    max_angle < threshold
}
