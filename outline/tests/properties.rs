use outline::algorithms::curve_ops::{
    delete_segments, insert_node_at, segment_to_curve, segment_to_line, set_continuity,
};
use outline::geometry::cubic::subdivide;
use outline::{Continuity, DocumentBuilder, GraphicsObject, Item, Layer, Path, Point};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    (-500i16..500).prop_map(|v| v as f64 * 0.5)
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

/// An open path mixing lines and curves.
fn path_strategy() -> impl Strategy<Value = Path> {
    (point(), prop::collection::vec((point(), point(), point(), any::<bool>()), 1..6)).prop_map(|(start, segs)| {
        let mut path = Path::new();
        path.append_line(start, Continuity::Angle);
        for (c1, c2, end, curved) in segs {
            if curved {
                path.append_bezier(c1, c2, end, Continuity::Angle);
            } else {
                path.append_line(end, Continuity::Angle);
            }
        }
        path
    })
}

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

fn close_points(a: Point, b: Point) -> bool {
    a.distance(b) <= 1e-9 * (1.0 + a.length().max(b.length()))
}

proptest! {
    #[test]
    fn closed_path_twins_share_position(points in prop::collection::vec(point(), 3..8)) {
        let mut path = Path::from_points(points);
        path.close_path();
        let last = path.len() - 1;
        prop_assert_eq!(path.node(-1), path.node(last));
        prop_assert_eq!(path.node(-1), path.node(0));
        prop_assert_eq!(path.continuity(0), path.continuity(-1));
    }

    #[test]
    fn subdivide_keeps_ends_and_tangents(p0 in point(), p1 in point(), p2 in point(), p3 in point(), t in 0.05f64..0.95) {
        let (q1, q2, q3, q4, q5) = subdivide(p0, p1, p2, p3, t);
        let mut path = Path::new();
        path.append_line(p0, Continuity::Angle);
        path.append_bezier(p1, p2, p3, Continuity::Angle);
        prop_assert!(close_points(q3, path.point_at(t)));
        let scale = 1.0 + p0.length() + p1.length() + p2.length() + p3.length();
        // start tangent of the left half and end tangent of the right half
        prop_assert!(cross(q1 - p0, p1 - p0).abs() <= 1e-9 * scale * scale);
        prop_assert!(cross(p3 - q5, p3 - p2).abs() <= 1e-9 * scale * scale);
        // both halves meet with a common tangent
        prop_assert!(cross(q3 - q2, q4 - q3).abs() <= 1e-9 * scale * scale);
    }

    #[test]
    fn curve_then_line_keeps_nodes(path in path_strategy(), pick in any::<prop::sample::Index>(), t in 0.1f64..0.9) {
        let seg = pick.index(path.segment_count());
        let at = seg as f64 + t;
        let curved = segment_to_curve(&path, at);
        let straight = segment_to_line(&curved, at);
        prop_assert_eq!(curved.node_list(), path.node_list());
        prop_assert_eq!(straight.node_list(), path.node_list());
        prop_assert!(!straight.segment(seg + 1).is_bezier());
    }

    #[test]
    fn symmetrical_controls_mirror_through_the_node(
        a in point(), c1 in point(), c2 in point(), node in point(), c3 in point(), c4 in point(), b in point()
    ) {
        let mut path = Path::new();
        path.append_line(a, Continuity::Angle);
        path.append_bezier(c1, c2, node, Continuity::Angle);
        path.append_bezier(c3, c4, b, Continuity::Angle);
        path.select_segment(1, true);
        let out = set_continuity(&path, Continuity::Symmetrical);
        let (_, left) = out.segment(1).controls().unwrap();
        let (right, _) = out.segment(2).controls().unwrap();
        prop_assert_eq!(out.continuity(1), Continuity::Symmetrical);
        prop_assert!(close_points(right, 2.0 * node - left));
        prop_assert_eq!(out.node_list(), path.node_list());
    }

    #[test]
    fn smooth_controls_are_collinear_and_keep_their_lengths(
        a in point(), c1 in point(), c2 in point(), node in point(), c3 in point(), c4 in point(), b in point()
    ) {
        prop_assume!(c2 != node && c3 != node && c2 != c3);
        let mut path = Path::new();
        path.append_line(a, Continuity::Angle);
        path.append_bezier(c1, c2, node, Continuity::Angle);
        path.append_bezier(c3, c4, b, Continuity::Angle);
        path.select_segment(1, true);
        let out = set_continuity(&path, Continuity::Smooth);
        let (_, left) = out.segment(1).controls().unwrap();
        let (right, _) = out.segment(2).controls().unwrap();
        prop_assert_eq!(out.continuity(1), Continuity::Smooth);
        let scale = 1.0 + node.length() + c2.length() + c3.length();
        prop_assert!(cross(left - node, right - node).abs() <= 1e-9 * scale * scale);
        prop_assert!((left - node).dot(right - node) < 0.0);
        prop_assert!(((left - node).length() - (c2 - node).length()).abs() <= 1e-9 * scale);
        prop_assert!(((right - node).length() - (c3 - node).length()).abs() <= 1e-9 * scale);
        prop_assert_eq!(out.node_list(), path.node_list());
    }

    #[test]
    fn insert_then_delete_keeps_node_positions(path in path_strategy(), pick in any::<prop::sample::Index>(), t in 0.1f64..0.9) {
        let seg = pick.index(path.segment_count());
        let inserted = insert_node_at(&path, seg as f64 + t);
        prop_assert_eq!(inserted.len(), path.len() + 1);
        prop_assert_eq!(inserted.selection_count(), 1);
        prop_assert!(inserted.segment_selected(seg + 1));
        let restored = delete_segments(&inserted);
        prop_assert_eq!(restored.node_list(), path.node_list());
    }

    #[test]
    fn balanced_frames_leave_nothing_dangling(ops in prop::collection::vec(0u8..3, 0..40)) {
        let mut b = DocumentBuilder::new();
        b.begin_layer(Layer::new("L"));
        let line = || vec![Path::from_points([Point::new(0.0, 0.0), Point::new(1.0, 1.0)])];
        for op in ops {
            match op {
                0 => {
                    b.begin_group();
                    b.bezier(line());
                }
                1 => b.bezier(line()),
                _ => {
                    if b.depth() > 1 {
                        prop_assert!(b.end_group().is_ok());
                    }
                }
            }
        }
        while b.depth() > 1 {
            prop_assert!(b.end_group().is_ok());
        }
        prop_assert!(b.end_layer().is_ok());
        prop_assert_eq!(b.end_all(), 0);
        prop_assert_eq!(b.depth(), 0);
    }

    #[test]
    fn dangling_group_holds_later_items_in_order(before in 0usize..4, inside in 1usize..6) {
        let mut b = DocumentBuilder::new();
        b.begin_layer(Layer::new("L"));
        let line = |x: f64| vec![Path::from_points([Point::new(x, 0.0), Point::new(x, 1.0)])];
        for i in 0..before {
            b.bezier(line(i as f64));
        }
        b.begin_group();
        for i in 0..inside {
            b.bezier(line((before + i) as f64));
        }
        let doc = b.load_completed();
        let layer = doc.find_layer("L").unwrap();
        prop_assert_eq!(layer.children.len(), before + 1);
        let Item::Group(group) = &layer.children[before] else {
            return Err(TestCaseError::fail("expected the dangling group last"));
        };
        let xs: Vec<f64> = group
            .children
            .iter()
            .map(|item| match item {
                Item::Object(GraphicsObject::Bezier(o)) => o.paths()[0].node(0).x,
                _ => f64::NAN,
            })
            .collect();
        let expected: Vec<f64> = (before..before + inside).map(|i| i as f64).collect();
        prop_assert_eq!(xs, expected);
    }
}
