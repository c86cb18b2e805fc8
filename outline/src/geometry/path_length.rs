//! Arc-length tables and point sampling for text-on-path.
//!
//! A path is flattened into `(cumulative length, point)` pairs; between two
//! consecutive entries the outline can be treated as a straight line. Glyph
//! origins are then placed by walking that table.

use crate::geometry::tolerance::ARC_FLATNESS;
use crate::model::Point;
use crate::path::{Path, Segment};

/// A sampled point on a path with position and tangent angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub point: Point,
    /// Tangent angle in radians
    pub angle: f64,
}

impl Path {
    /// Cumulative arc lengths measured from the parametric position `start_pos`.
    ///
    /// The first entry is `(0, point_at(start_pos))` and the last is the final
    /// node, exactly. Lengths are strictly increasing.
    pub fn arc_lengths(&self, start_pos: f64) -> Vec<(f64, Point)> {
        if self.len() < 2 {
            return self.node_list().into_iter().map(|p| (0.0, p)).collect();
        }
        let (index, t) = self.locate(start_pos);
        let mut points = Vec::new();
        for i in index + 1..self.len() {
            let seg = self.segment(i);
            let from = if i == index + 1 { t } else { 0.0 };
            match seg {
                Segment::Line { end, .. } => points.push(end),
                Segment::Bezier { .. } => {
                    let cubic = self.cubic(i);
                    let rest = if from > 0.0 { cubic.split_at(from).1 } else { cubic };
                    rest.flatten_into(&mut points, ARC_FLATNESS);
                }
            }
        }
        let start = self.point_at(start_pos);
        let mut table = Vec::with_capacity(points.len() + 1);
        table.push((0.0, start));
        let mut length = 0.0;
        let mut prev = start;
        for p in points {
            let d = prev.distance(p);
            if d > 0.0 {
                length += d;
                table.push((length, p));
                prev = p;
            }
        }
        table
    }

    /// Total outline length.
    pub fn length(&self) -> f64 {
        self.arc_lengths(0.0).last().map_or(0.0, |(l, _)| *l)
    }

    /// Glyph origins for characters of the given advance `widths`, starting at
    /// parametric position `start_pos`.
    ///
    /// Each glyph is centred on the outline: its middle sits on the path and its
    /// origin is moved back half a width along the local tangent. Placement stops
    /// at the first glyph whose middle falls past the end of the path.
    pub fn sample_positions(&self, start_pos: f64, widths: &[f64]) -> Vec<PathPoint> {
        let table = self.arc_lengths(start_pos);
        let mut cursor = 0;
        let mut advance = 0.0;
        let mut positions = Vec::with_capacity(widths.len());
        for &width in widths {
            let half = 0.5 * width;
            let Some(mid) = coord_sys_at(&table, advance + half, &mut cursor) else {
                break;
            };
            let back = Point::polar(half, mid.angle);
            positions.push(PathPoint { point: mid.point - back, angle: mid.angle });
            advance += width;
        }
        positions
    }
}

/// Position and direction at arc length `pos` in `table`, scanning from `cursor`.
///
/// `cursor` only moves forward, so monotone queries walk the table once.
pub fn coord_sys_at(table: &[(f64, Point)], pos: f64, cursor: &mut usize) -> Option<PathPoint> {
    if table.len() < 2 || pos < 0.0 {
        return None;
    }
    let mut idx = (*cursor).max(1);
    while idx < table.len() && table[idx].0 <= pos {
        idx += 1;
    }
    if idx >= table.len() {
        return None;
    }
    let (d1, p1) = table[idx - 1];
    let (d2, p2) = table[idx];
    let t = if d2 > d1 { (pos - d1) / (d2 - d1) } else { 0.0 };
    *cursor = idx;
    Some(PathPoint { point: p1.lerp(p2, t), angle: (p2 - p1).angle() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Continuity;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_path_length() {
        let p = Path::from_points([pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)]);
        assert!((p.length() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_table_starts_at_position() {
        let p = Path::from_points([pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)]);
        let table = p.arc_lengths(1.5);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], (0.0, pt(10.0, 5.0)));
        assert_eq!(table[1], (5.0, pt(10.0, 10.0)));
    }

    #[test]
    fn test_curve_table_is_monotone_and_exact_at_ends() {
        let mut p = Path::new();
        p.append_line(pt(0.0, 0.0), Continuity::Angle);
        p.append_bezier(pt(0.0, 10.0), pt(10.0, 10.0), pt(10.0, 0.0), Continuity::Angle);
        let table = p.arc_lengths(0.0);
        assert_eq!(table[0].1, pt(0.0, 0.0));
        assert_eq!(table.last().unwrap().1, pt(10.0, 0.0));
        assert!(table.windows(2).all(|w| w[1].0 > w[0].0));
        // the arch is longer than its chord and shorter than its control polygon
        let total = table.last().unwrap().0;
        assert!(total > 10.0 && total < 30.0);
    }

    #[test]
    fn test_sample_text_positions() {
        let p = Path::from_points([pt(0.0, 0.0), pt(100.0, 0.0)]);
        let positions = p.sample_positions(0.0, &[10.0, 10.0, 10.0]);
        assert_eq!(positions.len(), 3);
        assert!((positions[0].point.x - 0.0).abs() < 1e-9);
        assert!((positions[1].point.x - 10.0).abs() < 1e-9);
        assert!((positions[2].point.x - 20.0).abs() < 1e-9);
        assert!(positions.iter().all(|p| p.angle.abs() < 1e-12));
    }

    #[test]
    fn test_sampling_stops_at_path_end() {
        let p = Path::from_points([pt(0.0, 0.0), pt(25.0, 0.0)]);
        let positions = p.sample_positions(0.0, &[10.0, 10.0, 10.0]);
        assert_eq!(positions.len(), 2);
    }

    #[test]
    fn test_sampling_turns_corners() {
        let p = Path::from_points([pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 100.0)]);
        let positions = p.sample_positions(0.0, &[10.0, 10.0]);
        assert_eq!(positions.len(), 2);
        let second = positions[1];
        assert!((second.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        // middle at (10, 5), origin half a width back along the new direction
        assert!(second.point.distance(pt(10.0, 0.0)) < 1e-9);
    }
}
