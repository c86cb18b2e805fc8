//! Node/segment storage for a single contour.
//!
//! A path with `L` nodes stores `L` entries. Entry 0 is the start node (always a
//! line "move-to"); entry `i > 0` carries the segment arriving at node `i`
//! together with that node's continuity and selection flag. Negative indices
//! count from the end, so `-1` is the last node. On a closed path node 0 and
//! node `L-1` coincide and share selection and continuity.

use crate::geometry::cubic::CubicBezier;
use crate::geometry::tolerance::{EPS_POS, GUESS_COLLINEAR_EPS, GUESS_LENGTH_EPS};
use crate::geometry::trafo::Trafo;
use crate::model::{Continuity, Point, Rect, SelectMode};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Line,
    Bezier,
}

/// The segment arriving at a node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Line { end: Point, continuity: Continuity },
    Bezier { c1: Point, c2: Point, end: Point, continuity: Continuity },
}

impl Segment {
    pub fn line(end: Point, continuity: Continuity) -> Self {
        Segment::Line { end, continuity }
    }

    pub fn bezier(c1: Point, c2: Point, end: Point, continuity: Continuity) -> Self {
        Segment::Bezier { c1, c2, end, continuity }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Line { .. } => SegmentKind::Line,
            Segment::Bezier { .. } => SegmentKind::Bezier,
        }
    }

    pub fn is_bezier(&self) -> bool {
        matches!(self, Segment::Bezier { .. })
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { end, .. } | Segment::Bezier { end, .. } => end,
        }
    }

    pub fn continuity(&self) -> Continuity {
        match *self {
            Segment::Line { continuity, .. } | Segment::Bezier { continuity, .. } => continuity,
        }
    }

    pub fn controls(&self) -> Option<(Point, Point)> {
        match *self {
            Segment::Line { .. } => None,
            Segment::Bezier { c1, c2, .. } => Some((c1, c2)),
        }
    }

    pub fn with_continuity(self, continuity: Continuity) -> Segment {
        match self {
            Segment::Line { end, .. } => Segment::Line { end, continuity },
            Segment::Bezier { c1, c2, end, .. } => Segment::Bezier { c1, c2, end, continuity },
        }
    }

    pub fn with_end(self, end: Point) -> Segment {
        match self {
            Segment::Line { continuity, .. } => Segment::Line { end, continuity },
            Segment::Bezier { c1, c2, continuity, .. } => Segment::Bezier { c1, c2, end, continuity },
        }
    }

    fn map_points(self, f: impl Fn(Point) -> Point) -> Segment {
        match self {
            Segment::Line { end, continuity } => Segment::Line { end: f(end), continuity },
            Segment::Bezier { c1, c2, end, continuity } => Segment::Bezier {
                c1: f(c1),
                c2: f(c2),
                end: f(end),
                continuity,
            },
        }
    }
}

/// Index into the node list. Negative values count from the end.
pub trait NodeIndex: Copy + std::fmt::Debug {
    fn resolve(self, len: usize) -> Option<usize>;
}

impl NodeIndex for usize {
    fn resolve(self, len: usize) -> Option<usize> {
        (self < len).then_some(self)
    }
}

impl NodeIndex for isize {
    fn resolve(self, len: usize) -> Option<usize> {
        let j = if self < 0 { len as isize + self } else { self };
        (j >= 0 && (j as usize) < len).then_some(j as usize)
    }
}

impl NodeIndex for i32 {
    fn resolve(self, len: usize) -> Option<usize> {
        (self as isize).resolve(len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct Entry {
    segment: Segment,
    selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    entries: Vec<Entry>,
    closed: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Path { entries: Vec::with_capacity(capacity), closed: false }
    }

    /// Build an open polyline through `points`.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut path = Path::new();
        for p in points {
            path.append_line(p, Continuity::Angle);
        }
        path
    }

    /// Number of nodes (for a closed path this counts the closing duplicate).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Nodes not counting the duplicate end of a closed path.
    pub fn unique_node_count(&self) -> usize {
        if self.closed {
            self.segment_count()
        } else {
            self.len()
        }
    }

    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    fn index<I: NodeIndex>(&self, i: I) -> usize {
        match i.resolve(self.entries.len()) {
            Some(j) => j,
            None => panic!("node index {:?} out of range for path with {} nodes", i, self.entries.len()),
        }
    }

    /// The node sharing storage semantics with `j` on a closed path.
    fn twin(&self, j: usize) -> Option<usize> {
        let last = self.entries.len().checked_sub(1)?;
        if !self.closed || last == 0 {
            return None;
        }
        if j == 0 {
            Some(last)
        } else if j == last {
            Some(0)
        } else {
            None
        }
    }

    pub fn append_line(&mut self, p: Point, continuity: Continuity) {
        self.entries.push(Entry { segment: Segment::line(p, continuity), selected: false });
    }

    pub fn append_bezier(&mut self, c1: Point, c2: Point, p: Point, continuity: Continuity) {
        self.append_segment(Segment::bezier(c1, c2, p, continuity));
    }

    /// Append a segment; the first node of a path is always stored as a move-to.
    pub fn append_segment(&mut self, segment: Segment) {
        let segment = if self.entries.is_empty() {
            Segment::line(segment.end(), segment.continuity())
        } else {
            segment
        };
        self.entries.push(Entry { segment, selected: false });
    }

    /// Mark the path closed, snapping the last node onto the first.
    ///
    /// A trailing Bezier keeps its shape relative to the end node: its second
    /// control point moves along with it. Node 0 takes the last node's continuity.
    pub fn close_path(&mut self) {
        if self.entries.len() < 2 {
            debug!("close_path ignored on path with {} nodes", self.entries.len());
            return;
        }
        let first = self.entries[0].segment.end();
        let last = self.entries.len() - 1;
        let seg = self.entries[last].segment;
        let delta = first - seg.end();
        if delta.length() > 0.0 {
            debug!("closing path snapped last node by ({}, {})", delta.x, delta.y);
            self.entries[last].segment = match seg {
                Segment::Line { continuity, .. } => Segment::line(first, continuity),
                Segment::Bezier { c1, c2, continuity, .. } => Segment::bezier(c1, c2 + delta, first, continuity),
            };
        }
        let cont = self.entries[last].segment.continuity();
        self.entries[0].segment = self.entries[0].segment.with_continuity(cont);
        let selected = self.entries[0].selected || self.entries[last].selected;
        self.entries[0].selected = selected;
        self.entries[last].selected = selected;
        self.closed = true;
    }

    /// Close as an import format does: append the start node first unless the
    /// last node already coincides with it.
    pub fn load_close(&mut self, copy_cont_from_last: bool) {
        if self.entries.len() < 2 {
            return;
        }
        let first = self.entries[0].segment;
        let last = self.entries[self.entries.len() - 1].segment;
        if first.end().distance(last.end()) > EPS_POS {
            self.append_line(first.end(), first.continuity());
        }
        let cont = if copy_cont_from_last { last.continuity() } else { first.continuity() };
        let end = self.entries.len() - 1;
        self.entries[end].segment = self.entries[end].segment.with_continuity(cont);
        self.close_path();
    }

    pub fn node<I: NodeIndex>(&self, i: I) -> Point {
        self.entries[self.index(i)].segment.end()
    }

    pub fn segment<I: NodeIndex>(&self, i: I) -> Segment {
        self.entries[self.index(i)].segment
    }

    pub fn segment_kind<I: NodeIndex>(&self, i: I) -> SegmentKind {
        self.segment(i).kind()
    }

    pub fn set_line<I: NodeIndex>(&mut self, i: I, p: Point, continuity: Continuity) {
        self.set_segment(i, Segment::line(p, continuity));
    }

    pub fn set_bezier<I: NodeIndex>(&mut self, i: I, c1: Point, c2: Point, p: Point, continuity: Continuity) {
        self.set_segment(i, Segment::bezier(c1, c2, p, continuity));
    }

    /// Replace the segment arriving at node `i`. On a closed path the twin node
    /// follows the new position and continuity.
    pub fn set_segment<I: NodeIndex>(&mut self, i: I, segment: Segment) {
        let j = self.index(i);
        let segment = if j == 0 { Segment::line(segment.end(), segment.continuity()) } else { segment };
        self.entries[j].segment = segment;
        if let Some(k) = self.twin(j) {
            let other = self.entries[k].segment;
            self.entries[k].segment = other.with_end(segment.end()).with_continuity(segment.continuity());
        }
    }

    pub fn continuity<I: NodeIndex>(&self, i: I) -> Continuity {
        self.entries[self.index(i)].segment.continuity()
    }

    pub fn set_continuity<I: NodeIndex>(&mut self, i: I, continuity: Continuity) {
        let j = self.index(i);
        self.entries[j].segment = self.entries[j].segment.with_continuity(continuity);
        if let Some(k) = self.twin(j) {
            self.entries[k].segment = self.entries[k].segment.with_continuity(continuity);
        }
    }

    /// Segment `i` as a cubic; lines become cubics with controls at the thirds.
    pub fn cubic<I: NodeIndex>(&self, i: I) -> CubicBezier {
        let j = self.index(i);
        assert!(j > 0, "node 0 has no incoming segment");
        let p0 = self.entries[j - 1].segment.end();
        match self.entries[j].segment {
            Segment::Line { end, .. } => CubicBezier::new(p0, p0.lerp(end, 1.0 / 3.0), p0.lerp(end, 2.0 / 3.0), end),
            Segment::Bezier { c1, c2, end, .. } => CubicBezier::new(p0, c1, c2, end),
        }
    }

    pub fn select_segment<I: NodeIndex>(&mut self, i: I, on: bool) {
        let j = self.index(i);
        self.entries[j].selected = on;
        if let Some(k) = self.twin(j) {
            self.entries[k].selected = on;
        }
    }

    pub fn segment_selected<I: NodeIndex>(&self, i: I) -> bool {
        self.entries[self.index(i)].selected
    }

    /// Selected nodes, counting the shared start/end of a closed path once.
    pub fn selection_count(&self) -> usize {
        let n = self.unique_node_count();
        self.entries[..n].iter().filter(|e| e.selected).count()
    }

    pub fn deselect(&mut self) {
        for e in &mut self.entries {
            e.selected = false;
        }
    }

    pub fn select_all(&mut self) {
        for e in &mut self.entries {
            e.selected = true;
        }
    }

    /// Apply `mode` to every node inside `rect`. Returns whether any node lies inside.
    pub fn select_rect(&mut self, rect: &Rect, mode: SelectMode) -> bool {
        let mut any = false;
        for j in 0..self.entries.len() {
            let inside = rect.contains_point(self.entries[j].segment.end());
            any |= inside;
            let cur = self.entries[j].selected;
            let next = match mode {
                SelectMode::Set | SelectMode::Drag => inside,
                SelectMode::Add => cur || inside,
                SelectMode::Subtract => cur && !inside,
            };
            self.entries[j].selected = next;
        }
        if let Some(k) = self.twin(0) {
            let selected = self.entries[0].selected || self.entries[k].selected;
            self.entries[0].selected = selected;
            self.entries[k].selected = selected;
        }
        any
    }

    /// Move every selected node and the control points attached to it.
    pub fn move_selected_nodes(&mut self, offset: Point) {
        let n = self.entries.len();
        if n == 0 {
            return;
        }
        let unique = self.unique_node_count();
        let mut moved = vec![false; n];
        for i in 0..unique {
            if self.entries[i].selected {
                moved[i] = true;
                if let Some(k) = self.twin(i) {
                    moved[k] = true;
                }
            }
        }
        for i in 0..n {
            if !moved[i] {
                continue;
            }
            self.entries[i].segment = match self.entries[i].segment {
                Segment::Line { end, continuity } => Segment::line(end + offset, continuity),
                Segment::Bezier { c1, c2, end, continuity } => Segment::bezier(c1, c2 + offset, end + offset, continuity),
            };
            if i + 1 < n {
                if let Segment::Bezier { c1, c2, end, continuity } = self.entries[i + 1].segment {
                    self.entries[i + 1].segment = Segment::bezier(c1 + offset, c2, end, continuity);
                }
            }
        }
    }

    /// All distinct node positions.
    pub fn node_list(&self) -> Vec<Point> {
        self.entries[..self.unique_node_count()].iter().map(|e| e.segment.end()).collect()
    }

    /// Every stored point, controls included.
    pub fn control_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.entries.iter().flat_map(|e| {
            let (a, b) = match e.segment.controls() {
                Some((c1, c2)) => (Some(c1), Some(c2)),
                None => (None, None),
            };
            a.into_iter().chain(b).chain(std::iter::once(e.segment.end()))
        })
    }

    /// Derive continuity tags from the control geometry at every interior node.
    pub fn guess_continuity(&mut self) {
        let n = self.entries.len();
        if n < 3 {
            return;
        }
        let last = n - 1;
        for i in 1..n {
            let next = if i < last {
                i + 1
            } else if self.closed {
                1
            } else {
                continue;
            };
            let node = self.entries[i].segment.end();
            let incoming = match self.entries[i].segment {
                Segment::Bezier { c2, .. } => c2,
                Segment::Line { .. } => self.entries[i - 1].segment.end(),
            };
            let outgoing = match self.entries[next].segment {
                Segment::Bezier { c1, .. } => c1,
                Segment::Line { end, .. } => end,
            };
            let both_curved = self.entries[i].segment.is_bezier() && self.entries[next].segment.is_bezier();
            let any_curved = self.entries[i].segment.is_bezier() || self.entries[next].segment.is_bezier();
            let cont = if any_curved {
                guess_node_continuity(incoming, node, outgoing, both_curved)
            } else {
                Continuity::Angle
            };
            self.set_continuity(i, cont);
        }
    }

    /// The same contour traversed from the last node to the first.
    pub fn reversed(&self) -> Path {
        let mut out = Path::with_capacity(self.entries.len());
        let Some(last) = self.entries.len().checked_sub(1) else {
            return out;
        };
        out.append_line(self.node(last), self.continuity(last));
        out.entries[0].selected = self.entries[last].selected;
        for i in (1..=last).rev() {
            let end = self.entries[i - 1].segment.end();
            let cont = self.entries[i - 1].segment.continuity();
            let seg = match self.entries[i].segment {
                Segment::Line { .. } => Segment::line(end, cont),
                Segment::Bezier { c1, c2, .. } => Segment::bezier(c2, c1, end, cont),
            };
            out.entries.push(Entry { segment: seg, selected: self.entries[i - 1].selected });
        }
        out.closed = self.closed;
        out
    }

    pub fn transform(&mut self, trafo: &Trafo) {
        for e in &mut self.entries {
            e.segment = e.segment.map_points(|p| trafo.apply(p));
        }
    }

    pub fn translate(&mut self, offset: Point) {
        for e in &mut self.entries {
            e.segment = e.segment.map_points(|p| p + offset);
        }
    }

    pub fn is_finite(&self) -> bool {
        self.control_points().all(Point::is_finite)
    }

    /// Tight bounds of the outline from endpoints and curve extrema.
    pub fn accurate_rect(&self) -> Option<Rect> {
        let first = self.entries.first()?.segment.end();
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for i in 1..self.entries.len() {
            rect = match self.entries[i].segment {
                Segment::Line { end, .. } => rect.include(end),
                Segment::Bezier { .. } => rect.union(self.cubic(i).bounds()),
            };
        }
        Some(rect)
    }
}

/// Tag for a node whose tangent arrives from `incoming` and leaves towards `outgoing`.
fn guess_node_continuity(incoming: Point, node: Point, outgoing: Point, both_curved: bool) -> Continuity {
    let a = node - incoming;
    let b = outgoing - node;
    let (la, lb) = (a.length(), b.length());
    if la <= EPS_POS || lb <= EPS_POS {
        return Continuity::Angle;
    }
    let cross = a.x * b.y - a.y * b.x;
    if a.dot(b) <= 0.0 || cross.abs() > GUESS_COLLINEAR_EPS * la * lb {
        return Continuity::Angle;
    }
    if both_curved && (la - lb).abs() <= GUESS_LENGTH_EPS * la.max(lb) {
        Continuity::Symmetrical
    } else {
        Continuity::Smooth
    }
}
