use outline::{
    Continuity, Control, EditState, EditorHandle, EditorOptions, Handle, Path, Point, PolyBezier,
    PolyBezierEditor, Rect, SegmentKind, SelectMode, Style,
};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn closed_square() -> Path {
    let mut p = Path::from_points([pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0), pt(0.0, 0.0)]);
    p.close_path();
    p
}

fn curve() -> Path {
    let mut p = Path::new();
    p.append_line(pt(0.0, 0.0), Continuity::Angle);
    p.append_bezier(pt(2.0, 4.0), pt(6.0, 4.0), pt(8.0, 0.0), Continuity::Smooth);
    p.append_bezier(pt(10.0, -4.0), pt(14.0, -4.0), pt(16.0, 0.0), Continuity::Angle);
    p
}

fn editor(paths: Vec<Path>) -> PolyBezierEditor {
    PolyBezierEditor::new(PolyBezier::new(paths, Style::default()))
}

#[test]
fn rubber_band_then_drag_moves_all_selected_nodes() {
    let mut ed = editor(vec![closed_square()]);
    assert!(ed.select_rect(&Rect::new(-1.0, -1.0, 11.0, 1.0), SelectMode::Set));
    assert_eq!(ed.state(), EditState::SelectedNodes);
    assert_eq!(ed.paths()[0].selection_count(), 2);
    ed.button_down(pt(5.0, 0.0));
    ed.mouse_move(pt(5.0, -3.0), false);
    let inverse = ed.button_up(pt(5.0, -5.0), false);
    let path = &ed.paths()[0];
    assert_eq!(path.node(0), pt(0.0, -5.0));
    assert_eq!(path.node(-1), pt(0.0, -5.0));
    assert_eq!(path.node(1), pt(10.0, -5.0));
    assert_eq!(path.node(2), pt(10.0, 10.0));
    let _ = ed.apply_inverse(inverse);
    assert_eq!(ed.paths()[0].node_list(), closed_square().node_list());
}

#[test]
fn constrained_control_drag_snaps_to_15_degrees() {
    let mut ed = editor(vec![curve()]);
    ed.select_handle(Handle { path_index: 0, segment_index: 1, control: Control::First }, SelectMode::Set);
    assert_eq!(ed.state(), EditState::SelectedSegmentFirst);
    ed.button_down(pt(2.0, 4.0));
    let _ = ed.button_up(pt(5.0, 0.4), true);
    let (c1, _) = ed.paths()[0].segment(1).controls().unwrap();
    let angle = c1.angle().to_degrees();
    assert!((angle / 15.0 - (angle / 15.0).round()).abs() < 1e-9);
    assert!(ed.paths()[0].segment_selected(0));
}

#[test]
fn smooth_neighbour_keeps_its_length() {
    let mut ed = editor(vec![curve()]);
    ed.select_handle(Handle { path_index: 0, segment_index: 2, control: Control::First }, SelectMode::Set);
    ed.button_down(pt(10.0, -4.0));
    let _ = ed.button_up(pt(11.0, 0.0), false);
    let path = &ed.paths()[0];
    let (_, c2) = path.segment(1).controls().unwrap();
    let node = path.node(1);
    assert!((c2.distance(node) - pt(6.0, 4.0).distance(pt(8.0, 0.0))).abs() < 1e-9);
    // pointing away from the dragged control
    assert!((c2 - node).dot(pt(11.0, 0.0) - node) < 0.0);
}

#[test]
fn zero_length_drag_records_nothing() {
    let mut ed = editor(vec![curve()]);
    ed.select_handle(Handle::node(0, 1), SelectMode::Set);
    ed.button_down(pt(8.0, 0.0));
    assert!(ed.button_up(pt(8.0, 0.0), false).is_null());
}

#[test]
fn cut_at_curve_point_and_rejoin() {
    let mut ed = editor(vec![curve()]);
    assert!(ed.select_point(pt(4.0, 5.0)));
    let _ = ed.open_nodes();
    assert_eq!(ed.paths().len(), 2);
    assert_eq!(ed.paths()[0].node(-1), ed.paths()[1].node(0));

    ed.deselect();
    ed.select_handle(Handle::node(0, 1), SelectMode::Set);
    ed.select_handle(Handle::node(1, 0), SelectMode::Add);
    let _ = ed.close_nodes();
    assert_eq!(ed.paths().len(), 1);
    assert_eq!(ed.paths()[0].node(-1), pt(16.0, 0.0));
}

#[test]
fn open_closed_path_at_selected_node() {
    let mut ed = editor(vec![closed_square()]);
    ed.select_handle(Handle::node(0, 2), SelectMode::Set);
    let _ = ed.open_nodes();
    let path = &ed.paths()[0];
    assert!(!path.closed());
    assert_eq!(path.node(0), pt(10.0, 10.0));
    assert_eq!(path.node(-1), pt(10.0, 10.0));
    assert_eq!(path.len(), 5);
}

#[test]
fn conversions_between_lines_and_curves() {
    let mut ed = editor(vec![closed_square()]);
    ed.select_all_nodes();
    let _ = ed.segments_to_curve();
    assert!((1..5).all(|i| ed.paths()[0].segment_kind(i) == SegmentKind::Bezier));
    let before = ed.paths()[0].continuity(2);
    ed.select_all_nodes();
    let inverse = ed.set_continuity(Continuity::Symmetrical);
    assert!(!inverse.is_null());
    assert_eq!(ed.paths()[0].continuity(2), Continuity::Symmetrical);
    let redo = ed.apply_inverse(inverse);
    assert_eq!(ed.paths()[0].continuity(2), before);
    let _ = ed.apply_inverse(redo);
    assert_eq!(ed.paths()[0].continuity(2), Continuity::Symmetrical);
    ed.select_all_nodes();
    let _ = ed.segments_to_lines();
    assert!((1..5).all(|i| ed.paths()[0].segment_kind(i) == SegmentKind::Line));
    assert_eq!(ed.paths()[0].continuity(0), Continuity::Angle);
}

#[test]
fn insert_between_selected_nodes() {
    let mut ed = editor(vec![curve()]);
    ed.select_all_nodes();
    let _ = ed.insert_nodes();
    assert_eq!(ed.paths()[0].len(), 5);
    assert_eq!(ed.info(), "5 nodes in PolyBezier");
}

#[test]
fn custom_angle_steps() {
    let opts = EditorOptions { node_angle_step: std::f64::consts::FRAC_PI_2, ..EditorOptions::default() };
    let mut ed = PolyBezierEditor::with_options(PolyBezier::new(vec![curve()], Style::default()), opts);
    ed.select_handle(Handle::node(0, 0), SelectMode::Set);
    ed.button_down(pt(0.0, 0.0));
    let _ = ed.button_up(pt(3.0, 2.0), true);
    assert_eq!(ed.paths()[0].node(0), pt(3.0, 0.0));
}

#[test]
fn curve_point_handle_is_reported() {
    let mut ed = editor(vec![curve()]);
    ed.select_point(pt(4.0, 5.0));
    let has_curve_point = ed.handles().iter().any(|h| matches!(h, EditorHandle::CurvePoint { .. }));
    assert!(has_curve_point);
    assert!(ed.info().starts_with("Point on curve at position 0.5"));
}

fn single_node(at: Point) -> Path {
    let mut p = Path::new();
    p.append_line(at, Continuity::Angle);
    p
}

#[test]
fn single_node_path_offers_no_curve_point() {
    let mut ed = editor(vec![single_node(pt(2.0, 2.0))]);
    assert!(!ed.select_point(pt(2.0, 2.0)));
    assert_eq!(ed.state(), EditState::None);
    assert!(ed.curve_position().is_none());
    assert!(ed.insert_nodes().is_null());
    assert!(ed.open_nodes().is_null());
    assert!(ed.segments_to_lines().is_null());
    assert!(ed.segments_to_curve().is_null());
    assert_eq!(ed.button_down(pt(2.0, 2.0)), Point::ORIGIN);
    ed.mouse_move(pt(5.0, 5.0), false);
    assert!(ed.preview().is_none());
    assert!(ed.button_up(pt(5.0, 5.0), false).is_null());
    assert_eq!(ed.paths()[0].node_list(), vec![pt(2.0, 2.0)]);
}

#[test]
fn curve_point_skips_single_node_paths() {
    let line = Path::from_points([pt(10.0, 0.0), pt(20.0, 0.0)]);
    let mut ed = editor(vec![single_node(pt(15.0, 1.0)), line]);
    assert!(ed.select_point(pt(15.0, 1.0)));
    let (path, at) = ed.curve_position().unwrap();
    assert_eq!(path, 1);
    assert!((at - 0.5).abs() < 1e-9);
    ed.button_down(pt(15.0, 0.0));
    let _ = ed.button_up(pt(15.0, 3.0), false);
    assert_eq!(ed.paths()[1].node_list(), vec![pt(10.0, 3.0), pt(20.0, 3.0)]);
    assert_eq!(ed.paths()[0].node_list(), vec![pt(15.0, 1.0)]);
}

#[test]
fn emptied_object_ignores_commands() {
    let mut ed = editor(vec![Path::from_points([pt(0.0, 0.0), pt(4.0, 0.0)])]);
    ed.select_all_nodes();
    assert!(!ed.delete_nodes().is_null());
    assert!(ed.paths().is_empty());
    assert!(!ed.select_point(pt(1.0, 0.0)));
    assert!(ed.insert_nodes().is_null());
    assert!(ed.open_nodes().is_null());
    assert!(ed.segments_to_lines().is_null());
    assert!(ed.segments_to_curve().is_null());
    assert!(ed.set_continuity(Continuity::Smooth).is_null());
    ed.button_down(pt(1.0, 0.0));
    assert!(ed.button_up(pt(2.0, 0.0), false).is_null());
    assert!(ed.handles().is_empty());
}

#[test]
fn converting_at_curve_point_releases_it() {
    let mut ed = editor(vec![curve()]);
    assert!(ed.select_point(pt(4.0, 5.0)));
    assert!(!ed.segments_to_lines().is_null());
    assert_eq!(ed.paths()[0].segment_kind(1), SegmentKind::Line);
    assert!(ed.curve_position().is_none());
    assert_eq!(ed.state(), EditState::None);
    assert!(!ed.handles().iter().any(|h| matches!(h, EditorHandle::CurvePoint { .. })));

    assert!(ed.select_point(pt(4.0, 0.5)));
    assert!(!ed.segments_to_curve().is_null());
    assert_eq!(ed.paths()[0].segment_kind(1), SegmentKind::Bezier);
    assert!(ed.curve_position().is_none());
    assert_eq!(ed.state(), EditState::None);
}
