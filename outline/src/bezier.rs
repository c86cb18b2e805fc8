//! The PolyBezier graphics object and its interactive creators.

use crate::algorithms::blend::blend_paths;
use crate::algorithms::curve_ops::adjust_control_point;
use crate::algorithms::picking::HitTester;
use crate::error::{MismatchError, TransformError};
use crate::geometry::math::snap_angle;
use crate::geometry::trafo::Trafo;
use crate::model::{Continuity, Point, Rect};
use crate::path::{Path, Segment};
use crate::style::Style;
use crate::undo::Inverse;
use log::debug;
use serde::Serialize;
use std::cell::Cell;

/// Objects that can be expressed as Bezier paths.
pub trait AsBezier {
    fn as_bezier(&self) -> PolyBezier;

    fn to_paths(&self) -> Vec<Path> {
        self.as_bezier().paths
    }
}

/// One or more paths sharing a style.
#[derive(Clone, Debug, Serialize)]
pub struct PolyBezier {
    paths: Vec<Path>,
    style: Style,
    /// Memoized (coord_rect, bounding_rect).
    #[serde(skip)]
    rects: Cell<Option<(Rect, Rect)>>,
}

impl PartialEq for PolyBezier {
    fn eq(&self, other: &Self) -> bool {
        self.paths == other.paths && self.style == other.style
    }
}

impl Default for PolyBezier {
    fn default() -> Self {
        PolyBezier::new(vec![Path::new()], Style::default())
    }
}

impl PolyBezier {
    pub fn new(paths: Vec<Path>, style: Style) -> Self {
        PolyBezier { paths, style, rects: Cell::new(None) }
    }

    pub fn from_path(path: Path, style: Style) -> Self {
        PolyBezier::new(vec![path], style)
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Deep copy owning a style snapshot of its own.
    pub fn duplicate(&self) -> PolyBezier {
        PolyBezier::new(self.paths.clone(), Style::from(self.style.data().clone()))
    }

    /// Direct access for selection changes; geometry edits go through `set_paths`.
    pub(crate) fn paths_mut(&mut self) -> &mut [Path] {
        self.changed();
        &mut self.paths
    }

    fn changed(&self) {
        self.rects.set(None);
    }

    /// Swap in new paths, returning the inverse that restores the old ones.
    pub fn set_paths(&mut self, paths: Vec<Path>) -> Inverse {
        let old = std::mem::replace(&mut self.paths, paths);
        self.changed();
        Inverse::SetPaths(old)
    }

    pub fn set_style(&mut self, style: Style) -> Inverse {
        let old = std::mem::replace(&mut self.style, style);
        self.changed();
        Inverse::Style(old)
    }

    /// Bounds of the outline alone.
    pub fn coord_rect(&self) -> Rect {
        self.rects().0
    }

    /// Bounds of everything painted: outline, stroke and arrow heads.
    pub fn bounding_rect(&self) -> Rect {
        self.rects().1
    }

    fn rects(&self) -> (Rect, Rect) {
        if let Some(r) = self.rects.get() {
            return r;
        }
        let r = self.compute_rects();
        self.rects.set(Some(r));
        r
    }

    fn compute_rects(&self) -> (Rect, Rect) {
        let coord = self
            .paths
            .iter()
            .filter_map(Path::accurate_rect)
            .reduce(Rect::union)
            .unwrap_or(Rect::EMPTY);
        if !self.style.has_line() {
            return (coord, coord);
        }
        let with_arrows = self.add_arrow_rects(coord);
        (coord, with_arrows.grown(self.style.grow_amount()))
    }

    fn add_arrow_rects(&self, mut rect: Rect) -> Rect {
        let data = self.style.data();
        if data.arrow1.is_none() && data.arrow2.is_none() {
            return rect;
        }
        let width = data.line_width;
        for path in self.paths.iter().filter(|p| !p.closed() && p.len() > 1) {
            if let Some(arrow) = &data.arrow1 {
                let p = path.node(0);
                let dir = match path.segment(1) {
                    Segment::Bezier { c1, .. } => p - c1,
                    Segment::Line { end, .. } => p - end,
                };
                rect = rect.union(arrow.bounding_rect(p, dir, width));
            }
            if let Some(arrow) = &data.arrow2 {
                let p = path.node(-1);
                let dir = match path.segment(-1) {
                    Segment::Bezier { c2, .. } => p - c2,
                    Segment::Line { .. } => p - path.node(-2),
                };
                rect = rect.union(arrow.bounding_rect(p, dir, width));
            }
        }
        rect
    }

    /// Apply `trafo` to every path and to the stroke.
    ///
    /// The result is computed on copies and swapped in only when every
    /// coordinate is finite; on error the object is unchanged.
    pub fn transform(&mut self, trafo: &Trafo) -> Result<Inverse, TransformError> {
        let mut paths = self.paths.clone();
        for path in &mut paths {
            path.transform(trafo);
            if !path.is_finite() {
                return Err(TransformError::NonFinite);
            }
        }
        let style = self.style.transformed(trafo);
        let undo_style = if style.shares_snapshot(&self.style) { Inverse::Null } else { self.set_style(style) };
        let undo_paths = self.set_paths(paths);
        Ok(Inverse::multi(vec![undo_style, undo_paths]))
    }

    pub fn translate(&mut self, offset: Point) -> Inverse {
        for path in &mut self.paths {
            path.translate(offset);
        }
        self.changed();
        Inverse::Translate(-offset)
    }

    /// Fast reject against the painted bounds, then ask `tester`.
    pub fn hit(&self, p: Point, tolerance: f64, tester: &dyn HitTester) -> bool {
        if !self.bounding_rect().grown(tolerance).contains_point(p) {
            return false;
        }
        tester.hit_paths(&self.paths, &self.style, p, tolerance)
    }

    /// Closest point on any outline: (distance, point). Far away and unchanged
    /// when there is no outline.
    pub fn snap(&self, p: Point) -> (f64, Point) {
        let mut best = (f64::INFINITY, p);
        for path in &self.paths {
            if let Some(at) = path.nearest_point(p) {
                let q = path.point_at(at);
                let d = p.distance(q);
                if d < best.0 {
                    best = (d, q);
                }
            }
        }
        best
    }

    pub fn snap_points(&self) -> Vec<Point> {
        self.paths.iter().flat_map(Path::node_list).collect()
    }

    /// Interpolate with anything that has a Bezier form.
    pub fn blend(&self, other: &dyn AsBezier, frac1: f64, frac2: f64) -> Result<PolyBezier, MismatchError> {
        let other = other.as_bezier();
        let paths = blend_paths(&self.paths, &other.paths, frac1, frac2)?;
        Ok(PolyBezier::new(paths, self.style.blend(&other.style, frac1, frac2)))
    }

    /// One object per path, each with the same style.
    pub fn paths_as_objects(&self) -> Vec<PolyBezier> {
        self.paths
            .iter()
            .map(|p| PolyBezier::from_path(p.clone(), self.style.clone()))
            .collect()
    }

    pub fn guess_continuity(&mut self) {
        for path in &mut self.paths {
            path.guess_continuity();
        }
    }

    pub fn node_count(&self) -> usize {
        self.paths.iter().map(Path::unique_node_count).sum()
    }

    pub fn info(&self) -> String {
        format!("PolyBezier ({} nodes in {} paths)", self.node_count(), self.paths.len())
    }
}

impl AsBezier for PolyBezier {
    fn as_bezier(&self) -> PolyBezier {
        self.clone()
    }

    fn to_paths(&self) -> Vec<Path> {
        self.paths.clone()
    }
}

/// All paths of `beziers` in one object with the first one's style.
pub fn combine_beziers(beziers: &[PolyBezier]) -> Option<PolyBezier> {
    let (first, rest) = beziers.split_first()?;
    let mut combined = first.clone();
    combined.paths.extend(rest.iter().flat_map(|b| b.paths.iter().cloned()));
    combined.changed();
    Some(combined)
}

/// Shared drag bookkeeping for creators.
#[derive(Clone, Copy, Debug)]
struct Drag {
    start: Point,
    cur: Point,
    active: bool,
}

impl Drag {
    fn new(start: Point) -> Self {
        Drag { start, cur: start, active: false }
    }

    fn begin(&mut self, p: Point) {
        self.start = p;
        self.cur = p;
        self.active = true;
    }

    fn stop(&mut self, p: Point) {
        self.cur = p;
        self.active = false;
    }
}

fn constrain_around(node: Point, p: Point, step: f64) -> Point {
    let off = p - node;
    node + Point::polar(off.length(), snap_angle(off.angle(), step))
}

/// Interactive curve creation: each press adds a node, dragging pulls out a
/// symmetrical handle.
#[derive(Clone, Debug)]
pub struct PolyBezierCreator {
    path: Path,
    drag: Drag,
    angle_step: f64,
}

impl PolyBezierCreator {
    pub fn new(start: Point) -> Self {
        PolyBezierCreator { path: Path::new(), drag: Drag::new(start), angle_step: std::f64::consts::PI / 12.0 }
    }

    pub fn with_angle_step(mut self, step: f64) -> Self {
        self.angle_step = step;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn apply_constraints(&self, p: Point, constrain: bool) -> Point {
        let node = if !self.path.is_empty() {
            self.path.node(-1)
        } else if self.drag.active {
            self.drag.start
        } else {
            return p;
        };
        if constrain {
            constrain_around(node, p, self.angle_step)
        } else {
            p
        }
    }

    /// Start a node at `p`; returns the offset from the anchor.
    pub fn button_down(&mut self, p: Point, constrain: bool) -> Point {
        let p = self.apply_constraints(p, constrain);
        if self.path.is_empty() {
            self.path.append_line(p, Continuity::Angle);
        } else {
            self.path.append_bezier(self.drag.cur, p, p, Continuity::Angle);
        }
        self.drag.begin(p);
        Point::ORIGIN
    }

    pub fn mouse_move(&mut self, p: Point, constrain: bool) {
        if self.drag.active {
            self.drag.cur = self.apply_constraints(p, constrain);
        }
    }

    pub fn button_up(&mut self, p: Point, constrain: bool) {
        if !self.drag.active {
            return;
        }
        let p = self.apply_constraints(p, constrain);
        self.drag.stop(p);
        if self.path.len() > 1 {
            if let Segment::Bezier { c1, c2, end, .. } = self.path.segment(-1) {
                let c2 = adjust_control_point(c2, end, self.drag.cur, Continuity::Symmetrical);
                self.path.set_bezier(-1, c1, c2, end, Continuity::Symmetrical);
            }
        }
    }

    pub fn end_creation(&self) -> bool {
        self.path.len() > 1
    }

    pub fn created_object(&self) -> Option<PolyBezier> {
        if !self.end_creation() {
            debug!("curve creation ended with {} nodes, nothing created", self.path.len());
            return None;
        }
        Some(PolyBezier::from_path(self.path.clone(), Style::default()))
    }
}

/// Interactive polyline creation: each click (or drag) adds straight segments.
#[derive(Clone, Debug)]
pub struct PolyLineCreator {
    path: Path,
    drag: Drag,
    was_dragged: bool,
    angle_step: f64,
}

impl PolyLineCreator {
    pub fn new(start: Point) -> Self {
        PolyLineCreator {
            path: Path::new(),
            drag: Drag::new(start),
            was_dragged: false,
            angle_step: std::f64::consts::PI / 12.0,
        }
    }

    pub fn with_angle_step(mut self, step: f64) -> Self {
        self.angle_step = step;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn apply_constraints(&self, p: Point, constrain: bool) -> Point {
        let node = if !self.path.is_empty() {
            self.path.node(-1)
        } else if self.drag.active {
            self.drag.start
        } else {
            return p;
        };
        if constrain {
            constrain_around(node, p, self.angle_step)
        } else {
            p
        }
    }

    pub fn button_down(&mut self, p: Point, constrain: bool) -> Point {
        let p = self.apply_constraints(p, constrain);
        self.drag.begin(p);
        Point::ORIGIN
    }

    pub fn mouse_move(&mut self, p: Point, constrain: bool) {
        if self.drag.active {
            self.was_dragged = true;
            self.drag.cur = self.apply_constraints(p, constrain);
        }
    }

    pub fn button_up(&mut self, p: Point, constrain: bool) {
        if !self.drag.active {
            return;
        }
        let p = self.apply_constraints(p, constrain);
        self.drag.stop(p);
        if self.was_dragged && self.path.is_empty() {
            self.path.append_line(self.drag.start, Continuity::Angle);
        }
        self.path.append_line(self.drag.cur, Continuity::Angle);
    }

    pub fn end_creation(&self) -> bool {
        self.path.len() > 1
    }

    pub fn created_object(&self) -> Option<PolyBezier> {
        if !self.end_creation() {
            debug!("polyline creation ended with {} nodes, nothing created", self.path.len());
            return None;
        }
        Some(PolyBezier::from_path(self.path.clone(), Style::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::picking::OutlineHitTester;
    use crate::style::Arrow;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn line(a: Point, b: Point) -> PolyBezier {
        PolyBezier::from_path(Path::from_points([a, b]), Style::default().with_line(None))
    }

    #[test]
    fn rects_are_memoized_and_invalidated() {
        let mut b = line(pt(0.0, 0.0), pt(10.0, 5.0));
        assert_eq!(b.coord_rect(), Rect::new(0.0, 0.0, 10.0, 5.0));
        let _ = b.translate(pt(1.0, 1.0));
        assert_eq!(b.coord_rect(), Rect::new(1.0, 1.0, 11.0, 6.0));
        let _ = b.set_style(Style::default().with_line_width(2.0).with(|d| d.line_join = crate::style::LineJoin::Round));
        assert_eq!(b.bounding_rect(), Rect::new(0.0, 0.0, 12.0, 7.0));
    }

    #[test]
    fn arrows_extend_bounding_rect() {
        let style = Style::default()
            .with_line_width(1.0)
            .with(|d| d.line_join = crate::style::LineJoin::Round)
            .with_arrows(None, Some(Arrow::triangle()));
        let b = PolyBezier::from_path(Path::from_points([pt(0.0, 0.0), pt(10.0, 0.0)]), style);
        let r = b.bounding_rect();
        assert!((r.top - 3.0).abs() < 1e-9);
        assert!((r.bottom + 3.0).abs() < 1e-9);
    }

    #[test]
    fn transform_round_trips_through_inverse() {
        let mut b = line(pt(0.0, 0.0), pt(10.0, 0.0));
        let before = b.clone();
        let inv = b.transform(&Trafo::scale(2.0, 2.0)).unwrap();
        assert_eq!(b.paths()[0].node(-1), pt(20.0, 0.0));
        let redo = inv.apply(&mut b);
        assert_eq!(b, before);
        let _ = redo.apply(&mut b);
        assert_eq!(b.paths()[0].node(-1), pt(20.0, 0.0));
    }

    #[test]
    fn non_finite_transform_leaves_object_untouched() {
        let mut b = line(pt(0.0, 0.0), pt(10.0, 0.0));
        let before = b.clone();
        let err = b.transform(&Trafo::scale(f64::INFINITY, 1.0)).unwrap_err();
        assert_eq!(err, TransformError::NonFinite);
        assert_eq!(b, before);
    }

    #[test]
    fn snap_finds_the_closest_outline_point() {
        let b = line(pt(0.0, 0.0), pt(10.0, 0.0));
        let (d, q) = b.snap(pt(4.0, 3.0));
        assert!((d - 3.0).abs() < 1e-12);
        assert_eq!(q, pt(4.0, 0.0));
    }

    #[test]
    fn duplicate_does_not_share_the_style() {
        let b = line(pt(0.0, 0.0), pt(1.0, 0.0));
        let d = b.duplicate();
        assert_eq!(d, b);
        assert!(!d.style().shares_snapshot(b.style()));
        assert!(b.clone().style().shares_snapshot(b.style()));
    }

    #[test]
    fn hit_rejects_outside_bounds() {
        let b = PolyBezier::from_path(Path::from_points([pt(0.0, 0.0), pt(10.0, 0.0)]), Style::default());
        assert!(b.hit(pt(5.0, 0.1), 0.5, &OutlineHitTester));
        assert!(!b.hit(pt(5.0, 50.0), 0.5, &OutlineHitTester));
    }

    #[test]
    fn combine_and_split_objects() {
        let a = line(pt(0.0, 0.0), pt(1.0, 0.0));
        let b = line(pt(0.0, 1.0), pt(1.0, 1.0));
        let both = combine_beziers(&[a, b]).unwrap();
        assert_eq!(both.paths().len(), 2);
        assert_eq!(both.info(), "PolyBezier (4 nodes in 2 paths)");
        assert_eq!(both.paths_as_objects().len(), 2);
        assert!(combine_beziers(&[]).is_none());
    }

    #[test]
    fn curve_creator_builds_symmetrical_nodes() {
        let mut c = PolyBezierCreator::new(pt(0.0, 0.0));
        c.button_down(pt(0.0, 0.0), false);
        c.mouse_move(pt(1.0, 1.0), false);
        c.button_up(pt(1.0, 1.0), false);
        c.button_down(pt(10.0, 0.0), false);
        c.mouse_move(pt(11.0, -1.0), false);
        c.button_up(pt(11.0, -1.0), false);
        let obj = c.created_object().unwrap();
        let path = &obj.paths()[0];
        assert_eq!(path.len(), 2);
        assert_eq!(path.segment(1), Segment::bezier(pt(1.0, 1.0), pt(9.0, 1.0), pt(10.0, 0.0), Continuity::Symmetrical));
    }

    #[test]
    fn polyline_creator_constrains_angles() {
        let mut c = PolyLineCreator::new(pt(0.0, 0.0));
        c.button_down(pt(0.0, 0.0), false);
        c.button_up(pt(0.0, 0.0), false);
        assert!(c.created_object().is_none());
        c.button_down(pt(10.0, 0.3), true);
        c.button_up(pt(10.0, 0.3), true);
        let obj = c.created_object().unwrap();
        let end = obj.paths()[0].node(-1);
        assert!(end.y.abs() < 1e-9);
        assert!((end.x - pt(10.0, 0.3).length()).abs() < 1e-9);
    }
}
