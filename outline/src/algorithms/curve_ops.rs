//! Structural edits on paths.
//!
//! Every function here is pure: it reads the node selection of its input and
//! returns new path(s), leaving the caller to swap them in (and record the
//! inverse).

use crate::geometry::cubic::subdivide;
use crate::model::{Continuity, Point};
use crate::path::{Path, Segment, SegmentKind};
use std::ops::{Bound, RangeBounds};

const F13: f64 = 1.0 / 3.0;
const F23: f64 = 2.0 / 3.0;

/// Re-derive the control point `p` on one side of `node` from the `control` on
/// the other side.
///
/// Symmetrical mirrors `control` through `node`. Smooth keeps the distance of
/// `p` from `node` but points away from `control`. Angle and degenerate
/// (zero-length) directions leave `p` untouched.
pub fn adjust_control_point(p: Point, node: Point, control: Point, continuity: Continuity) -> Point {
    match continuity {
        Continuity::Symmetrical => 2.0 * node - control,
        Continuity::Smooth => match (control - node).normalized() {
            Some(d) => node - (p - node).length() * d,
            None => p,
        },
        Continuity::Angle => p,
    }
}

/// Append the segments `range` of `src` to `dest`, optionally with their selection.
pub fn copy_path<R: RangeBounds<usize>>(dest: &mut Path, src: &Path, range: R, copy_selection: bool) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s + 1,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e + 1,
        Bound::Excluded(&e) => e,
        Bound::Unbounded => src.len(),
    }
    .min(src.len());
    for i in start..end {
        dest.append_segment(src.segment(i));
        if copy_selection {
            dest.select_segment(-1, src.segment_selected(i));
        }
    }
}

fn copy_selection(src: &Path, dest: &mut Path) {
    for i in 0..src.len().min(dest.len()) {
        dest.select_segment(i, src.segment_selected(i));
    }
}

/// Close `path` as a copy of `src` would be closed, keeping the continuity the
/// last node already carries.
fn close_like(path: &mut Path, src: &Path) {
    if src.closed() {
        let cont = path.continuity(-1);
        path.close_path();
        path.set_continuity(-1, cont);
    }
}

fn third_points(a: Point, b: Point) -> (Point, Point) {
    (F23 * a + F13 * b, F13 * a + F23 * b)
}

/// Remove every selected node.
///
/// A run of removed nodes collapses into one segment between the surviving
/// neighbours: a Bezier when either boundary segment was curved (keeping the
/// outer controls, or chord thirds for a line side), a line otherwise. A result
/// with fewer than two distinct nodes is an empty path.
pub fn delete_segments(path: &Path) -> Path {
    let mut newpath = Path::new();
    let len = path.len();
    let selected = path.selection_count();
    if len == 0 || selected >= path.unique_node_count() {
        return newpath;
    }
    let mut i = 0;
    while path.segment_selected(i) {
        i += 1;
    }
    // closing segment of a closed path whose start was deleted
    let last_p2 = if path.closed() && i > 0 {
        Some(match path.segment(i) {
            Segment::Bezier { c2, .. } => (SegmentKind::Bezier, c2),
            Segment::Line { end, .. } => (SegmentKind::Line, third_points(path.node(i - 1), end).0),
        })
    } else {
        None
    };
    newpath.append_line(path.node(i), path.continuity(i));

    let mut run: Option<(SegmentKind, Point)> = None;
    for j in i + 1..len {
        let seg = path.segment(j);
        let prev = path.node(j - 1);
        if path.segment_selected(j) {
            if run.is_none() {
                run = Some(match seg {
                    Segment::Bezier { c1, .. } => (SegmentKind::Bezier, c1),
                    Segment::Line { end, .. } => (SegmentKind::Line, third_points(prev, end).0),
                });
            }
        } else if let Some((kind, p1)) = run.take() {
            if seg.is_bezier() || kind == SegmentKind::Bezier {
                let p2 = match seg {
                    Segment::Bezier { c2, .. } => c2,
                    Segment::Line { end, .. } => third_points(prev, end).1,
                };
                newpath.append_bezier(p1, p2, seg.end(), seg.continuity());
            } else {
                newpath.append_line(seg.end(), seg.continuity());
            }
        } else {
            newpath.append_segment(seg);
        }
    }
    if path.closed() {
        if let Some((last_kind, p2)) = last_p2 {
            let start = newpath.node(0);
            let cont = newpath.continuity(0);
            match run {
                Some((kind, p1)) if kind == SegmentKind::Bezier || last_kind == SegmentKind::Bezier => {
                    newpath.append_bezier(p1, p2, start, cont)
                }
                _ => newpath.append_line(start, cont),
            }
        }
        newpath.close_path();
    }
    if newpath.unique_node_count() < 2 {
        return Path::new();
    }
    newpath
}

/// Insert a node in the middle of every segment whose both ends are selected.
///
/// New curve nodes are Symmetrical; a Symmetrical neighbour becomes Smooth since
/// the halves no longer share one control pair.
pub fn insert_segments(path: &Path) -> Path {
    let mut newpath = Path::with_capacity(2 * path.len());
    if path.is_empty() {
        return newpath;
    }
    newpath.append_line(path.node(0), path.continuity(0));
    newpath.select_segment(0, path.segment_selected(0));

    for i in 1..path.len() {
        let seg = path.segment(i);
        if path.segment_selected(i) && path.segment_selected(i - 1) {
            match seg {
                Segment::Line { end, continuity } => {
                    let mid = path.node(i - 1).lerp(end, 0.5);
                    newpath.append_line(mid, Continuity::Angle);
                    newpath.select_segment(-1, true);
                    newpath.append_line(end, continuity);
                    newpath.select_segment(-1, true);
                }
                Segment::Bezier { c1, c2, end, continuity } => {
                    if newpath.continuity(-1) == Continuity::Symmetrical {
                        newpath.set_continuity(-1, Continuity::Smooth);
                    }
                    let (p1, p2, node, p3, p4) = subdivide(path.node(i - 1), c1, c2, end, 0.5);
                    newpath.append_bezier(p1, p2, node, Continuity::Symmetrical);
                    newpath.select_segment(-1, true);
                    let cont = if continuity == Continuity::Symmetrical { Continuity::Smooth } else { continuity };
                    newpath.append_bezier(p3, p4, end, cont);
                    newpath.select_segment(-1, true);
                }
            }
        } else {
            newpath.append_segment(seg);
            newpath.select_segment(-1, path.segment_selected(i));
        }
    }
    close_like(&mut newpath, path);
    newpath
}

/// Insert a Smooth, selected node at parametric position `at`.
pub fn insert_node_at(path: &Path, at: f64) -> Path {
    let (index, t) = path.locate(at);
    let mut newpath = Path::with_capacity(path.len() + 1);
    copy_path(&mut newpath, path, 0..=index, true);
    match path.segment(index + 1) {
        Segment::Line { end, continuity } => {
            newpath.append_line(path.node(index).lerp(end, t), Continuity::Angle);
            newpath.select_segment(-1, true);
            newpath.append_line(end, continuity);
        }
        Segment::Bezier { c1, c2, end, continuity } => {
            if newpath.continuity(-1) == Continuity::Symmetrical {
                newpath.set_continuity(-1, Continuity::Smooth);
            }
            let (p1, p2, q, p3, p4) = subdivide(newpath.node(-1), c1, c2, end, t);
            newpath.append_bezier(p1, p2, q, Continuity::Smooth);
            newpath.select_segment(-1, true);
            let cont = if continuity == Continuity::Symmetrical { Continuity::Smooth } else { continuity };
            newpath.append_bezier(p3, p4, end, cont);
        }
    }
    newpath.select_segment(-1, path.segment_selected(index + 1));
    copy_path(&mut newpath, path, index + 2.., true);
    close_like(&mut newpath, path);
    newpath
}

/// Cut `path` at parametric position `at`.
///
/// An open path yields two paths meeting at the cut point; a closed path is
/// opened into one path that starts and ends there. The new start node is
/// selected and both new ends get Angle continuity.
pub fn split_path_at(path: &Path, at: f64) -> Vec<Path> {
    let (index, t) = path.locate(at);
    let (q, head_end, tail_start) = match path.segment(index + 1) {
        Segment::Line { end, continuity } => {
            let q = path.node(index).lerp(end, t);
            (q, Segment::line(q, Continuity::Angle), Segment::line(end, continuity))
        }
        Segment::Bezier { c1, c2, end, continuity } => {
            let (p1, p2, q, p3, p4) = subdivide(path.node(index), c1, c2, end, t);
            (q, Segment::bezier(p1, p2, q, Continuity::Angle), Segment::bezier(p3, p4, end, continuity))
        }
    };

    let mut tail = Path::with_capacity(path.len() + 1);
    tail.append_line(q, Continuity::Angle);
    tail.append_segment(tail_start);
    tail.select_segment(0, true);
    copy_path(&mut tail, path, index + 2.., false);

    if path.closed() {
        copy_path(&mut tail, path, 1..=index, false);
        tail.append_segment(head_end);
        vec![tail]
    } else {
        let mut head = Path::with_capacity(index + 2);
        copy_path(&mut head, path, 0..=index, false);
        head.append_segment(head_end);
        vec![head, tail]
    }
}

/// Turn the curve at parametric position `at` into a straight line.
pub fn segment_to_line(path: &Path, at: f64) -> Path {
    let (index, _) = path.locate(at);
    if path.segment_kind(index + 1) != SegmentKind::Bezier {
        return path.clone();
    }
    let mut newpath = Path::with_capacity(path.len());
    copy_path(&mut newpath, path, 0..=index, true);
    newpath.set_continuity(-1, Continuity::Angle);
    newpath.append_line(path.node(index + 1), Continuity::Angle);
    newpath.select_segment(-1, path.segment_selected(index + 1));
    copy_path(&mut newpath, path, index + 2.., true);
    close_like(&mut newpath, path);
    if path.closed() && index == 0 {
        newpath.set_continuity(0, Continuity::Angle);
    }
    newpath
}

/// Turn the line at parametric position `at` into a curve with controls at the
/// chord thirds. The end node keeps its continuity.
pub fn segment_to_curve(path: &Path, at: f64) -> Path {
    let (index, _) = path.locate(at);
    if path.segment_kind(index + 1) != SegmentKind::Line {
        return path.clone();
    }
    let mut newpath = Path::with_capacity(path.len());
    copy_path(&mut newpath, path, 0..=index, true);
    let (node1, node2) = (path.node(index), path.node(index + 1));
    let (p1, p2) = third_points(node1, node2);
    newpath.append_bezier(p1, p2, node2, path.continuity(index + 1));
    newpath.select_segment(-1, path.segment_selected(index + 1));
    copy_path(&mut newpath, path, index + 2.., true);
    close_like(&mut newpath, path);
    newpath
}

/// Straighten every curve between two selected nodes. Nodes at either end of a
/// straightened curve become Angle.
pub fn segments_to_lines(path: &Path) -> Path {
    let mut newpath = Path::with_capacity(path.len());
    if path.is_empty() {
        return newpath;
    }
    newpath.append_line(path.node(0), path.continuity(0));
    let mut first_seam = false;
    for i in 1..path.len() {
        let seg = path.segment(i);
        if path.segment_selected(i) && path.segment_selected(i - 1) && seg.is_bezier() {
            newpath.set_continuity(-1, Continuity::Angle);
            newpath.append_line(seg.end(), Continuity::Angle);
            first_seam |= i == 1;
        } else {
            newpath.append_segment(seg);
        }
    }
    close_like(&mut newpath, path);
    if path.closed() && first_seam {
        newpath.set_continuity(0, Continuity::Angle);
    }
    copy_selection(path, &mut newpath);
    newpath
}

/// Give every line between two selected nodes chord-third controls, keeping
/// continuity tags.
pub fn segments_to_beziers(path: &Path) -> Path {
    let mut newpath = Path::with_capacity(path.len());
    if path.is_empty() {
        return newpath;
    }
    newpath.append_line(path.node(0), path.continuity(0));
    for i in 1..path.len() {
        let seg = path.segment(i);
        match seg {
            Segment::Line { end, continuity } if path.segment_selected(i) && path.segment_selected(i - 1) => {
                let (p1, p2) = third_points(path.node(i - 1), end);
                newpath.append_bezier(p1, p2, end, continuity);
            }
            _ => newpath.append_segment(seg),
        }
    }
    close_like(&mut newpath, path);
    copy_selection(path, &mut newpath);
    newpath
}

/// Tag every selected node with `cont` and, for curve-to-curve joins, move both
/// adjacent controls so the tangent really is continuous.
pub fn set_continuity(path: &Path, cont: Continuity) -> Path {
    let mut newpath = path.clone();
    let len = path.len();
    for i in 1..len {
        if !path.segment_selected(i) {
            continue;
        }
        newpath.set_continuity(i, cont);
        if cont == Continuity::Angle || !newpath.segment(i).is_bezier() {
            continue;
        }
        let other = if i == len - 1 {
            if newpath.closed() {
                1
            } else {
                continue;
            }
        } else {
            i + 1
        };
        let (Segment::Bezier { c1: p1, c2: p2, end: node, .. }, Segment::Bezier { c1: p3, c2: p4, end: other_node, continuity: other_cont }) =
            (newpath.segment(i), newpath.segment(other))
        else {
            continue;
        };
        let mut d = p3 - p2;
        if cont == Continuity::Symmetrical {
            d = 0.5 * d;
        }
        let p2 = adjust_control_point(p2, node, node + d, cont);
        let p3 = adjust_control_point(p3, node, node - d, cont);
        newpath.set_bezier(i, p1, p2, node, cont);
        newpath.set_bezier(other, p3, p4, other_node, other_cont);
    }
    newpath
}

/// Cut every path at its selected nodes.
///
/// Each maximal piece between selected nodes becomes its own open path; a
/// closed path is first opened at its first selected node. Exposed ends get
/// Angle continuity.
pub fn cut_at_selected_nodes(paths: &[Path]) -> Vec<Path> {
    let mut result = Vec::with_capacity(paths.len());
    for path in paths {
        if path.selection_count() == 0 {
            result.push(path.clone());
            continue;
        }
        let len = path.len();
        let start_idx = if path.closed() {
            (0..len - 1).find(|&i| path.segment_selected(i)).unwrap_or(0)
        } else {
            0
        };
        let mut newpath = Path::new();
        newpath.append_line(path.node(start_idx), Continuity::Angle);
        for i in start_idx + 1..len {
            let mut seg = path.segment(i);
            let cut = path.segment_selected(i);
            if cut {
                seg = seg.with_continuity(Continuity::Angle);
            }
            newpath.append_segment(seg);
            if cut && i < len - 1 {
                result.push(std::mem::take(&mut newpath));
                newpath.append_line(seg.end(), Continuity::Angle);
            }
        }
        if start_idx != 0 {
            // closed path not opened at its first node: wrap around
            for i in 1..=start_idx {
                newpath.append_segment(path.segment(i));
            }
            newpath.set_continuity(-1, Continuity::Angle);
        }
        result.push(newpath);
    }
    result
}

/// Join or close paths at selected end nodes.
///
/// Exactly two open paths with one selected end each are joined into one
/// (reversing either as needed so the selected ends meet); one open path with
/// both ends selected is closed. Any other selection returns `None`.
pub fn close_nodes(paths: &[Path]) -> Option<Vec<Path>> {
    let mut one = 0;
    let mut two = 0;
    for path in paths {
        let selected = path.selection_count();
        if selected == 0 {
            continue;
        }
        if path.closed() || !(selected == 1 || selected == 2) {
            return None;
        }
        let first = path.segment_selected(0);
        let last = path.segment_selected(-1);
        if selected == 1 && (first || last) {
            one += 1;
        } else if selected == 2 && first && last {
            two += 1;
        } else {
            return None;
        }
    }

    if one == 2 && two == 0 {
        let mut result = Vec::with_capacity(paths.len() - 1);
        let mut target: Option<usize> = None;
        for path in paths {
            if path.selection_count() == 0 {
                result.push(path.clone());
                continue;
            }
            match target {
                None => {
                    let mut head = if path.segment_selected(0) { path.reversed() } else { path.clone() };
                    head.set_continuity(-1, Continuity::Angle);
                    target = Some(result.len());
                    result.push(head);
                }
                Some(k) => append_joined(&mut result[k], path),
            }
        }
        Some(result)
    } else if one == 0 && two == 1 {
        Some(
            paths
                .iter()
                .map(|path| {
                    let mut path = path.clone();
                    if path.selection_count() > 0 {
                        path.close_path();
                    }
                    path
                })
                .collect(),
        )
    } else {
        None
    }
}

/// Continue `head` with the segments of `tail`, whose selected end is the one
/// meeting `head`'s last node. The first curve keeps its shape relative to the
/// joined node.
fn append_joined(head: &mut Path, tail: &Path) {
    let tail = if tail.segment_selected(0) { tail.clone() } else { tail.reversed() };
    let mut shift = Some(head.node(-1) - tail.node(0));
    for i in 1..tail.len() {
        let mut seg = tail.segment(i);
        if let (Some(delta), Segment::Bezier { c1, c2, end, continuity }) = (shift, seg) {
            seg = Segment::bezier(c1 + delta, c2, end, continuity);
            shift = None;
        }
        head.append_segment(seg);
    }
}
