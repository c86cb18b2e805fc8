//! Cubic Bézier curve utilities for subdivision, evaluation and measurement.
//!
//! Every path algorithm that splits, projects onto or measures a curved
//! segment goes through these helpers.

use super::math::{dist_point_to_seg_sq, unit_quadratic_roots};
use super::tolerance::{clamp01, EPS_POS, MAX_FLATTEN_DEPTH, NEAREST_REFINE_STEPS, NEAREST_SAMPLES};
use crate::model::{Point, Rect};

/// Control points of a cubic Bézier curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // First control point
    pub p2: Point, // Second control point
    pub p3: Point, // End point
}

impl CubicBezier {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the curve at parameter t ∈ [0, 1].
    pub fn eval(&self, t: f64) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        Point {
            x: mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x,
            y: mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y,
        }
    }

    /// Evaluate the tangent (derivative) at parameter t.
    pub fn tangent(&self, t: f64) -> Point {
        let t2 = t * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;

        Point {
            x: 3.0 * mt2 * (self.p1.x - self.p0.x)
                + 6.0 * mt * t * (self.p2.x - self.p1.x)
                + 3.0 * t2 * (self.p3.x - self.p2.x),
            y: 3.0 * mt2 * (self.p1.y - self.p0.y)
                + 6.0 * mt * t * (self.p2.y - self.p1.y)
                + 3.0 * t2 * (self.p3.y - self.p2.y),
        }
    }

    /// Split the curve at parameter t using de Casteljau subdivision.
    ///
    /// Returns two cubic curves: the first from 0..t, the second from t..1.
    pub fn split_at(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let (q1, q2, q3, q4, q5) = subdivide(self.p0, self.p1, self.p2, self.p3, t);
        (
            CubicBezier::new(self.p0, q1, q2, q3),
            CubicBezier::new(q3, q4, q5, self.p3),
        )
    }

    /// Tight bounding box from the endpoints and the roots of the derivative.
    pub fn bounds(&self) -> Rect {
        let mut rect = Rect::new(self.p0.x, self.p0.y, self.p3.x, self.p3.y);
        // B'(t)/3 = a t^2 + b t + c per axis
        let axis = |v0: f64, v1: f64, v2: f64, v3: f64| {
            let a = -v0 + 3.0 * v1 - 3.0 * v2 + v3;
            let b = 2.0 * (v0 - 2.0 * v1 + v2);
            let c = v1 - v0;
            unit_quadratic_roots(a, b, c)
        };
        for t in axis(self.p0.x, self.p1.x, self.p2.x, self.p3.x)
            .into_iter()
            .chain(axis(self.p0.y, self.p1.y, self.p2.y, self.p3.y))
        {
            rect = rect.include(self.eval(t));
        }
        rect
    }

    /// Closest point on the curve to `p`: (squared distance, parameter).
    ///
    /// Coarse uniform sampling followed by bracket refinement around the best
    /// sample; good enough for interactive picking and snapping.
    pub fn nearest(&self, p: Point) -> (f64, f64) {
        if self.is_point() {
            let d = p - self.p0;
            return (d.dot(d), 0.0);
        }
        let dist2 = |t: f64| {
            let d = p - self.eval(t);
            d.dot(d)
        };
        let n = NEAREST_SAMPLES;
        let mut best_t = 0.0;
        let mut best_d2 = f64::INFINITY;
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let d2 = dist2(t);
            if d2 < best_d2 {
                best_d2 = d2;
                best_t = t;
            }
        }
        let step = 1.0 / n as f64;
        let mut lo = clamp01(best_t - step);
        let mut hi = clamp01(best_t + step);
        for _ in 0..NEAREST_REFINE_STEPS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if dist2(m1) < dist2(m2) {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        let t = 0.5 * (lo + hi);
        let d2 = dist2(t);
        if d2 < best_d2 {
            (d2, t)
        } else {
            (best_d2, best_t)
        }
    }

    /// Append a flattened approximation (excluding `p0`) to `points`.
    pub fn flatten_into(&self, points: &mut Vec<Point>, tol: f64) {
        flatten_cubic(points, self.p0, self.p1, self.p2, self.p3, tol, 0);
    }

    /// Compute approximate arc length using adaptive subdivision.
    pub fn arc_length(&self, tolerance: f64) -> f64 {
        arc_length_recursive(self.p0, self.p1, self.p2, self.p3, tolerance, 0)
    }

    fn is_point(&self) -> bool {
        self.p0.distance(self.p1) <= EPS_POS
            && self.p1.distance(self.p2) <= EPS_POS
            && self.p2.distance(self.p3) <= EPS_POS
    }
}

/// De Casteljau split of `p0..p3` at `t`.
///
/// Returns `(q1, q2, q3, q4, q5)`: the left half is `p0, q1, q2, q3` and the
/// right half is `q3, q4, q5, p3`.
pub fn subdivide(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> (Point, Point, Point, Point, Point) {
    let t2 = 1.0 - t;
    let r = t2 * p1 + t * p2;
    let q1 = t2 * p0 + t * p1;
    let q2 = t2 * q1 + t * r;
    let q5 = t2 * p2 + t * p3;
    let q4 = t2 * r + t * q5;
    let q3 = t2 * q2 + t * q4;
    (q1, q2, q3, q4, q5)
}

fn flatten_cubic(points: &mut Vec<Point>, p0: Point, p1: Point, p2: Point, p3: Point, tol: f64, depth: u32) {
    let d1 = dist_point_to_seg_sq(p1, p0, p3);
    let d2 = dist_point_to_seg_sq(p2, p0, p3);
    if d1.max(d2) <= tol * tol || depth > MAX_FLATTEN_DEPTH {
        points.push(p3);
        return;
    }
    let (q1, q2, q3, q4, q5) = subdivide(p0, p1, p2, p3, 0.5);
    flatten_cubic(points, p0, q1, q2, q3, tol, depth + 1);
    flatten_cubic(points, q3, q4, q5, p3, tol, depth + 1);
}

/// Recursive arc length computation with adaptive subdivision.
fn arc_length_recursive(p0: Point, p1: Point, p2: Point, p3: Point, tolerance: f64, depth: u32) -> f64 {
    let chord = p0.distance(p3);
    let poly_len = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);

    // If flat enough or max depth reached, use average of chord and polygon
    if depth >= MAX_FLATTEN_DEPTH || (poly_len - chord).abs() < tolerance {
        return (chord + poly_len) * 0.5;
    }

    let (q1, q2, mid, q4, q5) = subdivide(p0, p1, p2, p3, 0.5);
    arc_length_recursive(p0, q1, q2, mid, tolerance, depth + 1)
        + arc_length_recursive(mid, q4, q5, p3, tolerance, depth + 1)
}
