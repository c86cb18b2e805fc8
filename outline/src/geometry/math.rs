use super::tolerance::EPS_DENOM;
use crate::model::Point;

/// Squared distance from `p` to the segment `a..b` and the clamped projection parameter.
pub fn seg_distance_sq(p: Point, a: Point, b: Point) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = v.dot(v);
    let mut t = if vv > EPS_DENOM { w.dot(v) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let d = p - a.lerp(b, t);
    (d.dot(d), t)
}

pub fn dist_point_to_seg_sq(p: Point, a: Point, b: Point) -> f64 {
    let (d2, _) = seg_distance_sq(p, a, b);
    d2
}

/// Snap `angle` to the nearest multiple of `step` (radians).
#[inline]
pub fn snap_angle(angle: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return angle;
    }
    step * (angle / step + 0.5).floor()
}

/// Real roots of `a*t^2 + b*t + c` that lie strictly inside (0, 1).
pub fn unit_quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let mut roots = Vec::with_capacity(2);
    if a.abs() <= EPS_DENOM {
        if b.abs() > EPS_DENOM {
            roots.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            roots.push((-b + sq) / (2.0 * a));
            roots.push((-b - sq) / (2.0 * a));
        }
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_clamped() {
        let (d2, t) = seg_distance_sq(Point::new(-1.0, 1.0), Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert_eq!(t, 0.0);
        assert!((d2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_segment() {
        let a = Point::new(3.0, 4.0);
        let (d2, t) = seg_distance_sq(Point::ORIGIN, a, a);
        assert_eq!(t, 0.0);
        assert!((d2 - 25.0).abs() < 1e-12);
    }

    #[test]
    fn snap_to_quarter_turns() {
        let q = std::f64::consts::FRAC_PI_2;
        assert!((snap_angle(0.9, q) - q).abs() < 1e-12);
        assert!((snap_angle(0.7, q) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn roots_inside_unit_interval() {
        // (t - 0.25)(t - 0.75)
        let mut r = unit_quadratic_roots(1.0, -1.0, 0.1875);
        r.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.25).abs() < 1e-12);
        assert!((r[1] - 0.75).abs() < 1e-12);
        assert!(unit_quadratic_roots(0.0, 1.0, 1.0).is_empty());
    }
}
