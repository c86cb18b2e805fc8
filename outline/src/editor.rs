//! Interactive node editing of a [`PolyBezier`].
//!
//! The editor owns the object for the duration of the session. Selection lives
//! in the paths themselves; the editor additionally tracks which single node,
//! control point or curve position the pointer grabbed last.
//!
//! Drags follow a three step protocol. `button_down` anchors the drag,
//! `mouse_move` only updates the proposed edit (see [`PolyBezierEditor::preview`]),
//! and `button_up` commits it through `PolyBezier::set_paths`, returning the
//! inverse. Structural commands likewise build new path lists and return the
//! inverse of swapping them in; with nothing selected they return
//! `Inverse::Null`.

use crate::algorithms::curve_ops::{
    adjust_control_point, close_nodes, cut_at_selected_nodes, delete_segments, insert_node_at,
    insert_segments, segment_to_curve, segment_to_line, segments_to_beziers, segments_to_lines,
    set_continuity, split_path_at,
};
use crate::bezier::PolyBezier;
use crate::config::EditorOptions;
use crate::geometry::math::snap_angle;
use crate::geometry::tolerance::safe_div;
use crate::model::{Continuity, Point, Rect, SelectMode};
use crate::path::{Path, Segment};
use crate::undo::Inverse;
use log::debug;
use serde::{Deserialize, Serialize};

/// What the pointer has grabbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EditState {
    None,
    SelectedNodes,
    /// First control point of a curve segment.
    SelectedSegmentFirst,
    /// Second control point of a curve segment.
    SelectedSegmentLast,
    /// An arbitrary point on the outline.
    SelectedCurvePoint,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    /// The node itself.
    #[default]
    None,
    First,
    Second,
}

/// Address of a node or of one control point of the segment arriving at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub path_index: usize,
    pub segment_index: usize,
    #[serde(default)]
    pub control: Control,
}

impl Handle {
    pub fn node(path_index: usize, segment_index: usize) -> Self {
        Handle { path_index, segment_index, control: Control::None }
    }

    /// The node whose selection flag the handle toggles.
    fn selected_node(&self) -> usize {
        match self.control {
            Control::First => self.segment_index.saturating_sub(1),
            Control::None | Control::Second => self.segment_index,
        }
    }
}

/// Something for the host to draw and hit-test.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditorHandle {
    Node { position: Point, selected: bool, handle: Handle },
    Control { position: Point, handle: Handle },
    ControlLine { from: Point, to: Point },
    CurvePoint { position: Point },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Selection {
    None,
    Nodes { anchor: Option<(usize, usize)> },
    SegmentFirst { path: usize, segment: usize },
    SegmentLast { path: usize, segment: usize },
    CurvePoint { path: usize, at: f64 },
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    start: Point,
    cur: Point,
    /// Pointer offset from the grabbed item at button down.
    grab: Point,
}

pub struct PolyBezierEditor {
    object: PolyBezier,
    selection: Selection,
    drag: Option<Drag>,
    options: EditorOptions,
}

impl PolyBezierEditor {
    pub fn new(object: PolyBezier) -> Self {
        PolyBezierEditor::with_options(object, EditorOptions::default())
    }

    pub fn with_options(mut object: PolyBezier, options: EditorOptions) -> Self {
        for path in object.paths_mut() {
            path.deselect();
        }
        PolyBezierEditor { object, selection: Selection::None, drag: None, options }
    }

    pub fn object(&self) -> &PolyBezier {
        &self.object
    }

    pub fn into_object(self) -> PolyBezier {
        self.object
    }

    pub fn paths(&self) -> &[Path] {
        self.object.paths()
    }

    pub fn state(&self) -> EditState {
        match self.selection {
            Selection::None => EditState::None,
            Selection::Nodes { .. } => EditState::SelectedNodes,
            Selection::SegmentFirst { .. } => EditState::SelectedSegmentFirst,
            Selection::SegmentLast { .. } => EditState::SelectedSegmentLast,
            Selection::CurvePoint { .. } => EditState::SelectedCurvePoint,
        }
    }

    /// Parametric position of the selected curve point, if any.
    pub fn curve_position(&self) -> Option<(usize, f64)> {
        match self.selection {
            Selection::CurvePoint { path, at } => Some((path, at)),
            _ => None,
        }
    }

    /// The grabbed curve point, as long as its path still has a segment under it.
    fn curve_point(&self) -> Option<(usize, f64)> {
        let (path, at) = self.curve_position()?;
        self.object.paths().get(path).filter(|p| p.segment_count() > 0).map(|_| (path, at))
    }

    fn clear_flags(&mut self) {
        for path in self.object.paths_mut() {
            path.deselect();
        }
    }

    /// Forget the grabbed item, keeping node flags.
    fn settle_selection(&mut self) {
        self.drag = None;
        self.selection = if self.object.paths().iter().any(|p| p.selection_count() > 0) {
            Selection::Nodes { anchor: None }
        } else {
            Selection::None
        };
    }

    pub fn deselect(&mut self) {
        self.clear_flags();
        self.selection = Selection::None;
        self.drag = None;
    }

    pub fn select_all_nodes(&mut self) {
        for path in self.object.paths_mut() {
            path.select_all();
        }
        self.selection = Selection::Nodes { anchor: None };
    }

    /// Grab the outline point nearest to `p`. Returns false for an object without outline.
    pub fn select_point(&mut self, p: Point) -> bool {
        self.clear_flags();
        let mut best: Option<(f64, usize, f64)> = None;
        for (i, path) in self.object.paths().iter().enumerate() {
            if let Some(at) = path.nearest_point(p) {
                let d = p.distance(path.point_at(at));
                if best.map_or(true, |(bd, _, _)| d < bd) {
                    best = Some((d, i, at));
                }
            }
        }
        match best {
            Some((_, path, at)) => {
                self.selection = Selection::CurvePoint { path, at };
                true
            }
            None => {
                self.selection = Selection::None;
                false
            }
        }
    }

    /// Grab a node or control handle and update the node selection per `mode`.
    ///
    /// Panics when the handle addresses a path or node that does not exist.
    pub fn select_handle(&mut self, handle: Handle, mode: SelectMode) {
        let k = handle.path_index;
        let node = handle.selected_node();
        self.selection = match handle.control {
            Control::None => Selection::Nodes { anchor: Some((k, node)) },
            Control::First => Selection::SegmentFirst { path: k, segment: handle.segment_index },
            Control::Second => Selection::SegmentLast { path: k, segment: handle.segment_index },
        };
        match mode {
            SelectMode::Set | SelectMode::Drag => {
                if !self.object.paths()[k].segment_selected(node) {
                    self.clear_flags();
                }
                self.object.paths_mut()[k].select_segment(node, true);
            }
            SelectMode::Add => self.object.paths_mut()[k].select_segment(node, true),
            SelectMode::Subtract => self.object.paths_mut()[k].select_segment(node, false),
        }
    }

    /// Select the nodes inside `rect` on every path.
    pub fn select_rect(&mut self, rect: &Rect, mode: SelectMode) -> bool {
        let mut any = false;
        for path in self.object.paths_mut() {
            any |= path.select_rect(rect, mode);
        }
        self.selection = Selection::Nodes { anchor: None };
        any
    }

    fn drag_anchor(&self, p: Point) -> Option<Point> {
        let paths = self.object.paths();
        match self.selection {
            Selection::None => None,
            Selection::Nodes { anchor: Some((k, i)) } => Some(paths[k].node(i)),
            Selection::Nodes { anchor: None } => Some(p),
            Selection::SegmentFirst { path, segment } => paths[path].segment(segment).controls().map(|(c1, _)| c1),
            Selection::SegmentLast { path, segment } => paths[path].segment(segment).controls().map(|(_, c2)| c2),
            Selection::CurvePoint { .. } => self.curve_point().map(|(path, at)| paths[path].point_at(at)),
        }
    }

    /// Anchor a drag. Returns the offset of `p` from the grabbed item.
    pub fn button_down(&mut self, p: Point) -> Point {
        match self.drag_anchor(p) {
            Some(start) => {
                let grab = p - start;
                self.drag = Some(Drag { start, cur: start, grab });
                grab
            }
            None => {
                self.drag = None;
                Point::ORIGIN
            }
        }
    }

    /// The pointer position mapped onto the grabbed item, snapped when `constrain` is set.
    fn apply_constraints(&self, p: Point, constrain: bool) -> Point {
        let Some(drag) = self.drag else {
            return p;
        };
        let p = p - drag.grab;
        if !constrain {
            return p;
        }
        let paths = self.object.paths();
        let node = match self.selection {
            Selection::Nodes { .. } => {
                let off = p - drag.start;
                let dir = Point::polar(1.0, snap_angle(off.angle(), self.options.node_angle_step));
                return drag.start + off.dot(dir) * dir;
            }
            Selection::SegmentFirst { path, segment } => paths[path].node(segment - 1),
            Selection::SegmentLast { path, segment } => paths[path].node(segment),
            Selection::None | Selection::CurvePoint { .. } => return p,
        };
        let off = p - node;
        node + Point::polar(off.length(), snap_angle(off.angle(), self.options.handle_angle_step))
    }

    pub fn mouse_move(&mut self, p: Point, constrain: bool) {
        let p = self.apply_constraints(p, constrain);
        if let Some(drag) = &mut self.drag {
            drag.cur = p;
        }
    }

    /// The paths as they would be if the drag ended now.
    pub fn preview(&self) -> Option<Vec<Path>> {
        let drag = self.drag?;
        self.proposed_paths(drag)
    }

    /// Commit the drag.
    pub fn button_up(&mut self, p: Point, constrain: bool) -> Inverse {
        if self.drag.is_none() {
            return Inverse::Null;
        }
        let p = self.apply_constraints(p, constrain);
        let Some(mut drag) = self.drag.take() else {
            return Inverse::Null;
        };
        drag.cur = p;
        if drag.cur == drag.start {
            return Inverse::Null;
        }
        match self.proposed_paths(drag) {
            Some(paths) => self.object.set_paths(paths),
            None => Inverse::Null,
        }
    }

    fn proposed_paths(&self, drag: Drag) -> Option<Vec<Path>> {
        let off = drag.cur - drag.start;
        let mut paths = self.object.paths().to_vec();
        match self.selection {
            Selection::None => return None,
            Selection::Nodes { .. } => {
                let mut moved = false;
                for path in paths.iter_mut().filter(|p| p.selection_count() > 0) {
                    path.move_selected_nodes(off);
                    moved = true;
                }
                if !moved {
                    return None;
                }
            }
            Selection::SegmentFirst { path, segment } => {
                if !drag_first_control(&mut paths[path], segment, drag.cur) {
                    return None;
                }
            }
            Selection::SegmentLast { path, segment } => {
                if !drag_last_control(&mut paths[path], segment, drag.cur) {
                    return None;
                }
            }
            Selection::CurvePoint { .. } => {
                let (path, at) = self.curve_point()?;
                drag_curve_point(&mut paths[path], at, off)
            }
        }
        Some(paths)
    }

    fn commit(&mut self, paths: Vec<Path>) -> Inverse {
        let inverse = self.object.set_paths(paths);
        self.settle_selection();
        inverse
    }

    /// Apply `paths_fn` to every path with at least `min_selected` selected nodes.
    fn map_selected(&mut self, min_selected: usize, paths_fn: impl Fn(&Path) -> Path) -> Inverse {
        let mut changed = false;
        let paths: Vec<Path> = self
            .object
            .paths()
            .iter()
            .map(|p| {
                if p.selection_count() >= min_selected {
                    changed = true;
                    paths_fn(p)
                } else {
                    p.clone()
                }
            })
            .collect();
        if !changed {
            return Inverse::Null;
        }
        self.commit(paths)
    }

    /// Cut at the grabbed curve point, or at every selected node.
    pub fn open_nodes(&mut self) -> Inverse {
        if let Some((path, at)) = self.curve_point() {
            let mut paths = self.object.paths().to_vec();
            let pieces = split_path_at(&paths[path], at);
            let tail = path + pieces.len() - 1;
            paths.splice(path..=path, pieces);
            let inverse = self.object.set_paths(paths);
            self.selection = Selection::Nodes { anchor: Some((tail, 0)) };
            return inverse;
        }
        if self.object.paths().iter().all(|p| p.selection_count() == 0) {
            return Inverse::Null;
        }
        let paths = cut_at_selected_nodes(self.object.paths());
        self.commit(paths)
    }

    /// Join two selected path ends, or close a path with both ends selected.
    pub fn close_nodes(&mut self) -> Inverse {
        match close_nodes(self.object.paths()) {
            Some(paths) => self.commit(paths),
            None => {
                debug!("close nodes: selection does not describe a join");
                Inverse::Null
            }
        }
    }

    pub fn set_continuity(&mut self, continuity: Continuity) -> Inverse {
        self.map_selected(1, |p| set_continuity(p, continuity))
    }

    pub fn segments_to_lines(&mut self) -> Inverse {
        if let Some((path, at)) = self.curve_point() {
            let mut paths = self.object.paths().to_vec();
            paths[path] = segment_to_line(&paths[path], at);
            return self.commit(paths);
        }
        self.map_selected(2, segments_to_lines)
    }

    pub fn segments_to_curve(&mut self) -> Inverse {
        if let Some((path, at)) = self.curve_point() {
            let mut paths = self.object.paths().to_vec();
            paths[path] = segment_to_curve(&paths[path], at);
            return self.commit(paths);
        }
        self.map_selected(2, segments_to_beziers)
    }

    /// Delete the selected nodes. Paths left with fewer than two nodes are
    /// dropped; when none remain the object is empty and the caller decides
    /// whether to remove it.
    pub fn delete_nodes(&mut self) -> Inverse {
        if self.object.paths().iter().all(|p| p.selection_count() == 0) {
            return Inverse::Null;
        }
        let mut paths = Vec::with_capacity(self.object.paths().len());
        for path in self.object.paths() {
            let newpath = if path.selection_count() > 0 { delete_segments(path) } else { path.clone() };
            if newpath.len() > 1 {
                paths.push(newpath);
            } else {
                debug!("path removed");
            }
        }
        if paths.is_empty() {
            debug!("all paths of the object removed");
        }
        self.commit(paths)
    }

    /// Insert a node at the grabbed curve point, or in the middle of every
    /// selected run of segments.
    pub fn insert_nodes(&mut self) -> Inverse {
        if let Some((path, at)) = self.curve_point() {
            let mut paths = self.object.paths().to_vec();
            let (index, _) = paths[path].locate(at);
            paths[path] = insert_node_at(&paths[path], at);
            let inverse = self.object.set_paths(paths);
            self.selection = Selection::Nodes { anchor: Some((path, index + 1)) };
            return inverse;
        }
        self.map_selected(2, insert_segments)
    }

    /// Undo or redo through the editor, keeping its selection consistent.
    pub fn apply_inverse(&mut self, inverse: Inverse) -> Inverse {
        let redo = inverse.apply(&mut self.object);
        self.settle_selection();
        redo
    }

    /// Handles to draw: control points and their lines first, then nodes.
    pub fn handles(&self) -> Vec<EditorHandle> {
        let mut handles = Vec::new();
        let mut nodes = Vec::new();
        for (k, path) in self.object.paths().iter().enumerate() {
            if path.is_empty() {
                continue;
            }
            if !path.closed() {
                nodes.push(EditorHandle::Node {
                    position: path.node(0),
                    selected: path.segment_selected(0),
                    handle: Handle::node(k, 0),
                });
            }
            for i in 1..path.len() {
                let selected = path.segment_selected(i);
                nodes.push(EditorHandle::Node { position: path.node(i), selected, handle: Handle::node(k, i) });
                if let Segment::Bezier { c1, c2, end, .. } = path.segment(i) {
                    if selected || path.segment_selected(i - 1) {
                        handles.push(EditorHandle::Control {
                            position: c1,
                            handle: Handle { path_index: k, segment_index: i, control: Control::First },
                        });
                        handles.push(EditorHandle::Control {
                            position: c2,
                            handle: Handle { path_index: k, segment_index: i, control: Control::Second },
                        });
                        handles.push(EditorHandle::ControlLine { from: path.node(i - 1), to: c1 });
                        handles.push(EditorHandle::ControlLine { from: c2, to: end });
                    }
                }
            }
        }
        if let Some((path, at)) = self.curve_point() {
            handles.push(EditorHandle::CurvePoint { position: self.object.paths()[path].point_at(at) });
        }
        handles.extend(nodes);
        handles
    }

    /// One-line description of the selection.
    pub fn info(&self) -> String {
        let paths = self.object.paths();
        let selected: usize = paths.iter().map(Path::selection_count).sum();
        if selected > 1 {
            return format!("{} nodes in PolyBezier", selected);
        }
        if selected == 1 {
            for path in paths {
                if let Some(i) = (0..path.len()).find(|&i| path.segment_selected(i)) {
                    return if i == 0 {
                        "First node of PolyBezier".to_string()
                    } else if i == path.len() - 1 {
                        "Last node of PolyBezier".to_string()
                    } else {
                        "1 node of PolyBezier".to_string()
                    };
                }
            }
        }
        match self.selection {
            Selection::CurvePoint { at, .. } => format!("Point on curve at position {:.2}", at),
            _ => "No Node of PolyBezier".to_string(),
        }
    }
}

/// The curve whose second control is tied to the first control of `segment`.
fn first_control_partner(path: &Path, segment: usize) -> Option<usize> {
    if segment > 1 && path.segment(segment - 1).is_bezier() && path.continuity(segment - 1).is_constrained() {
        Some(segment - 1)
    } else if path.closed() && segment == 1 && path.segment(-1).is_bezier() && path.continuity(-1).is_constrained() {
        Some(path.len() - 1)
    } else {
        None
    }
}

/// The curve whose first control is tied to the second control of `segment`.
fn last_control_partner(path: &Path, segment: usize) -> Option<usize> {
    if !path.continuity(segment).is_constrained() {
        return None;
    }
    let last = path.len() - 1;
    if segment < last && path.segment(segment + 1).is_bezier() {
        Some(segment + 1)
    } else if path.closed() && segment == last && path.segment(1).is_bezier() {
        Some(1)
    } else {
        None
    }
}

fn drag_first_control(path: &mut Path, segment: usize, cur: Point) -> bool {
    if segment == 0 {
        return false;
    }
    let Segment::Bezier { c2, end, continuity, .. } = path.segment(segment) else {
        return false;
    };
    let partner = first_control_partner(path, segment);
    path.set_bezier(segment, cur, c2, end, continuity);
    if let Some(other) = partner {
        if let Segment::Bezier { c1, c2, end, continuity } = path.segment(other) {
            let c2 = adjust_control_point(c2, end, cur, continuity);
            path.set_bezier(other, c1, c2, end, continuity);
        }
    }
    path.select_segment(segment - 1, true);
    true
}

fn drag_last_control(path: &mut Path, segment: usize, cur: Point) -> bool {
    let Segment::Bezier { c1, end: node, continuity: cont, .. } = path.segment(segment) else {
        return false;
    };
    let partner = last_control_partner(path, segment);
    path.set_bezier(segment, c1, cur, node, cont);
    if let Some(other) = partner {
        if let Segment::Bezier { c1, c2, end, continuity } = path.segment(other) {
            let c1 = adjust_control_point(c1, node, cur, cont);
            path.set_bezier(other, c1, c2, end, continuity);
        }
    }
    path.select_segment(segment, true);
    true
}

/// Segments adjacent to `seg` that follow a curve-point drag on it.
fn curve_point_neighbours(path: &Path, seg: usize) -> (Option<usize>, Option<usize>) {
    let last = path.len() - 1;
    let closed = path.closed();
    if path.segment(seg).is_bezier() {
        let next = if !path.continuity(seg).is_constrained() {
            None
        } else if seg < last && path.segment(seg + 1).is_bezier() {
            Some(seg + 1)
        } else if closed && seg == last && path.segment(1).is_bezier() {
            Some(1)
        } else {
            None
        };
        (first_control_partner(path, seg), next)
    } else {
        let next = if seg < last {
            Some(seg + 1)
        } else if closed {
            Some(1)
        } else {
            None
        };
        let prev = if seg > 1 {
            seg - 1
        } else if closed {
            last
        } else {
            0
        };
        (Some(prev), next)
    }
}

/// Reshape the segment under parametric position `at` so the point there
/// moves by `off`. A line is translated as a whole.
fn drag_curve_point(path: &mut Path, at: f64, off: Point) {
    let (index, t) = path.locate(at);
    let seg = index + 1;
    let (prev, next) = curve_point_neighbours(path, seg);
    let node = path.node(seg);

    let controls = match path.segment(seg) {
        Segment::Bezier { c1, c2, end, continuity } => {
            let alpha = if t <= 0.5 {
                (2.0 * t).powi(3) / 2.0
            } else {
                1.0 - (2.0 * (1.0 - t)).powi(3) / 2.0
            };
            let p1 = c1 + safe_div(1.0 - alpha, 3.0 * t * (1.0 - t).powi(2), 0.0) * off;
            let p2 = c2 + safe_div(alpha, 3.0 * t * t * (1.0 - t), 0.0) * off;
            path.set_bezier(seg, p1, p2, end, continuity);
            Some((p1, p2, continuity))
        }
        Segment::Line { end, continuity } => {
            path.set_line(seg, end + off, continuity);
            None
        }
    };

    if let Some(prev) = prev {
        match path.segment(prev) {
            Segment::Bezier { c1, c2, end, continuity } => {
                let (c2, end) = match controls {
                    Some((p1, _, _)) => (adjust_control_point(c2, end, p1, continuity), end),
                    None => (c2 + off, end + off),
                };
                path.set_bezier(prev, c1, c2, end, continuity);
            }
            Segment::Line { end, continuity } => {
                if controls.is_none() {
                    path.set_line(prev, end + off, continuity);
                }
            }
        }
    }
    if let Some(next) = next {
        if let Segment::Bezier { c1, c2, end, continuity } = path.segment(next) {
            let c1 = match controls {
                Some((_, p2, cont)) => adjust_control_point(c1, node, p2, cont),
                None => c1 + off,
            };
            path.set_bezier(next, c1, c2, end, continuity);
        }
    }
}
