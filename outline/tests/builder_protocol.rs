use outline::{
    ArcType, BuildError, BuilderOptions, DocumentBuilder, FrameKind, GraphicsObject, HAlign, Image, Item, Layer,
    LayerKind, Path, Point, Trafo,
};

fn line(x: f64) -> Vec<Path> {
    vec![Path::from_points([Point::new(x, 0.0), Point::new(x, 1.0)])]
}

fn first_x(item: &Item) -> f64 {
    match item {
        Item::Object(GraphicsObject::Bezier(b)) => b.paths()[0].node(0).x,
        other => panic!("unexpected item {:?}", other),
    }
}

#[test]
fn nested_groups_keep_order_and_styles() {
    let mut b = DocumentBuilder::new();
    b.begin_layer(Layer::new("drawing"));
    b.bezier(line(0.0));
    b.begin_group();
    b.update_style(|d| d.line_width = 4.0);
    b.bezier(line(1.0));
    b.begin_group();
    b.bezier(line(2.0));
    b.end_group().unwrap();
    b.end_group().unwrap();
    b.bezier(line(3.0));
    b.end_layer().unwrap();
    assert_eq!(b.depth(), 0);

    let doc = b.load_completed();
    let layer = doc.find_layer("drawing").unwrap();
    assert_eq!(layer.children.len(), 3);
    let Item::Group(outer) = &layer.children[1] else {
        panic!("expected a group");
    };
    assert_eq!(first_x(&outer.children[0]), 1.0);
    let widths: Vec<f64> = layer.objects().iter().map(|o| o.style().unwrap().data().line_width).collect();
    assert_eq!(widths, vec![1.0, 4.0, 4.0, 1.0]);
}

#[test]
fn structural_errors_leave_the_stack_alone() {
    let mut b = DocumentBuilder::new();
    b.begin_page("p");
    b.begin_group();
    let err = b.end_layer().unwrap_err();
    match err {
        BuildError::Structural { expected, found } => {
            assert_eq!(expected, FrameKind::Layer);
            assert_eq!(found, FrameKind::Group);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(b.depth(), 2);
    assert!(err_message_mentions_kinds(&mut b));
}

fn err_message_mentions_kinds(b: &mut DocumentBuilder) -> bool {
    let msg = b.end_defs().unwrap_err().to_string();
    msg.contains("Defs") && msg.contains("Group")
}

#[test]
fn end_composite_pops_any_kind() {
    let mut b = DocumentBuilder::new();
    b.begin_layer(Layer::new("L"));
    b.begin_group();
    b.bezier(line(0.0));
    b.end_composite().unwrap();
    b.end_composite().unwrap();
    assert_eq!(b.depth(), 0);
    assert!(matches!(b.end_composite(), Err(BuildError::NoOpenFrame)));
    assert_eq!(b.document().layers.len(), 1);
    // a document-level mismatch still names the kinds
    assert!(matches!(
        b.end_layer(),
        Err(BuildError::Structural { expected: FrameKind::Layer, found: FrameKind::Document })
    ));
}

#[test]
fn empty_layers_follow_the_options() {
    let mut keep = DocumentBuilder::new();
    keep.begin_layer(Layer::new("empty"));
    keep.end_layer().unwrap();
    assert_eq!(keep.document().layers.len(), 1);

    let opts = BuilderOptions { keep_empty_layers: false, ..BuilderOptions::default() };
    let mut strict = DocumentBuilder::with_options(opts);
    strict.begin_layer(Layer::new("empty"));
    let err = strict.end_layer().unwrap_err();
    assert_eq!(err.to_string(), "layer closed with no children");
    assert!(strict.document().layers.is_empty());
}

#[test]
fn every_primitive_kind_uses_the_current_style() {
    let mut b = DocumentBuilder::new();
    b.begin_layer(Layer::new("L"));
    b.update_style(|d| d.font_size = 20.0);
    b.rectangle(Trafo::scale(2.0, 1.0), 0.1, 0.1);
    b.ellipse(Trafo::IDENTITY, 0.0, std::f64::consts::PI, ArcType::Chord);
    b.simple_text("label", Trafo::translation(Point::new(5.0, 5.0)), HAlign::Center);
    if let Some(GraphicsObject::Text(t)) = b.object_mut() {
        t.text.push('!');
    }
    b.image(Image::new("img-1", 64.0, 32.0, Trafo::IDENTITY));
    b.end_layer().unwrap();

    let doc = b.load_completed();
    let objects = doc.find_layer("L").unwrap().objects();
    let kinds: Vec<&str> = objects.iter().map(|o| o.kind_name()).collect();
    assert_eq!(kinds, vec!["rectangle", "ellipse", "text", "image"]);
    assert!(objects[..3].iter().all(|o| o.style().unwrap().data().font_size == 20.0));
    let GraphicsObject::Text(text) = objects[2] else {
        panic!("expected text");
    };
    assert_eq!(text.text, "label!");
    assert_eq!(objects[3].coord_rect().right, 64.0);
}

#[test]
fn load_completed_builds_the_layer_stack() {
    let mut b = DocumentBuilder::new();
    b.begin_layer(Layer::with_kind("masters", LayerKind::Master));
    b.bezier(line(9.0));
    b.end_layer().unwrap();
    let mut hidden = Layer::new("hidden");
    hidden.visible = false;
    b.begin_layer(hidden);
    b.end_layer().unwrap();
    b.begin_layer(Layer::new("work"));
    b.end_layer().unwrap();
    let doc = b.load_completed();
    let names: Vec<&str> = doc.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Grid", "hidden", "work", "masters", "Guide Lines"]);
    assert_eq!(doc.active_layer().unwrap().name, "work");
}

#[test]
fn dangling_frames_are_closed_at_load() {
    let mut b = DocumentBuilder::new();
    b.begin_layer(Layer::new("L"));
    b.bezier(line(0.0));
    b.begin_group();
    b.bezier(line(1.0));
    b.bezier(line(2.0));
    let doc = b.load_completed();
    let layer = doc.find_layer("L").unwrap();
    let Item::Group(g) = &layer.children[1] else {
        panic!("expected the dangling group");
    };
    let xs: Vec<f64> = g.children.iter().map(first_x).collect();
    assert_eq!(xs, vec![1.0, 2.0]);
}
