use crate::geometry::math::seg_distance_sq;
use crate::geometry::tolerance::ARC_FLATNESS;
use crate::model::Point;
use crate::path::{Path, Segment};
use crate::style::Style;

/// Precise hit-testing collaborator used after the bounding-box fast reject.
pub trait HitTester {
    fn hit_paths(&self, paths: &[Path], style: &Style, p: Point, tolerance: f64) -> bool;
}

/// Geometric hit test: nodes, stroked outline and even-odd fill.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutlineHitTester;

impl HitTester for OutlineHitTester {
    fn hit_paths(&self, paths: &[Path], style: &Style, p: Point, tolerance: f64) -> bool {
        let tol2 = tolerance * tolerance;
        // Nodes first
        for path in paths {
            if path.node_list().iter().any(|n| {
                let d = *n - p;
                d.dot(d) <= tol2
            }) {
                return true;
            }
        }
        let reach = if style.has_line() { tolerance + 0.5 * style.data().line_width } else { tolerance };
        for path in paths {
            if let Some((d2, _)) = nearest_point_impl(path, p) {
                if d2 <= reach * reach {
                    return true;
                }
            }
        }
        style.has_fill() && even_odd_contains(paths, p)
    }
}

/// Closest position on `path` to `p`: (squared distance, `(segment - 1) + t`).
pub fn nearest_point_impl(path: &Path, p: Point) -> Option<(f64, f64)> {
    match path.len() {
        0 => return None,
        1 => {
            let d = path.node(0) - p;
            return Some((d.dot(d), 0.0));
        }
        _ => {}
    }
    let mut best: Option<(f64, f64)> = None;
    for i in 1..path.len() {
        let (d2, t) = match path.segment(i) {
            Segment::Line { end, .. } => seg_distance_sq(p, path.node(i - 1), end),
            Segment::Bezier { .. } => path.cubic(i).nearest(p),
        };
        if best.map_or(true, |(bd, _)| d2 < bd) {
            best = Some((d2, (i - 1) as f64 + t));
        }
    }
    best
}

impl Path {
    /// Parametric position of the point on the path closest to `p`.
    /// `None` when the path has no segment to hold a position.
    pub fn nearest_point(&self, p: Point) -> Option<f64> {
        if self.segment_count() == 0 {
            return None;
        }
        nearest_point_impl(self, p).map(|(_, at)| at)
    }

    /// Split a parametric position into `(index, t)` so that the point lies on
    /// segment `index + 1` at parameter `t`. Positions are clamped to the path.
    pub fn locate(&self, at: f64) -> (usize, f64) {
        let segments = self.segment_count();
        assert!(segments > 0, "path with {} nodes has no positions", self.len());
        let at = if at.is_finite() { at.clamp(0.0, segments as f64) } else { 0.0 };
        let index = at.floor() as usize;
        if index >= segments {
            (segments - 1, 1.0)
        } else {
            (index, at - index as f64)
        }
    }

    /// Evaluate a parametric position.
    pub fn point_at(&self, at: f64) -> Point {
        if self.len() == 1 {
            return self.node(0);
        }
        let (index, t) = self.locate(at);
        match self.segment(index + 1) {
            Segment::Line { end, .. } => self.node(index).lerp(end, t),
            Segment::Bezier { .. } => self.cubic(index + 1).eval(t),
        }
    }
}

fn even_odd_contains(paths: &[Path], p: Point) -> bool {
    let mut inside = false;
    for path in paths {
        if path.len() < 2 {
            continue;
        }
        let mut ring = vec![path.node(0)];
        for i in 1..path.len() {
            match path.segment(i) {
                Segment::Line { end, .. } => ring.push(end),
                Segment::Bezier { .. } => path.cubic(i).flatten_into(&mut ring, ARC_FLATNESS),
            }
        }
        // open contours are filled as if closed
        let n = ring.len();
        for k in 0..n {
            let a = ring[k];
            let b = ring[(k + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
    }
    inside
}
