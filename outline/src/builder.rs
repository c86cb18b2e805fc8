//! Stack-based document construction for format decoders.
//!
//! A decoder opens frames with `begin_*`, appends primitives, and closes the
//! frames with the matching `end_*`. Every frame remembers the style that was
//! current when it was opened and restores it when closed, so style changes
//! made inside a group never leak out of it.
//!
//! Primitives appended outside any layer go to the most recent regular layer
//! at that level, or to a new default layer when there is none.

use crate::bezier::PolyBezier;
use crate::config::BuilderOptions;
use crate::document::{Composite, Document, FrameKind, Group, Item, Layer, LayerKind, Page};
use crate::error::BuildError;
use crate::geometry::trafo::Trafo;
use crate::path::Path;
use crate::primitives::{ArcType, Ellipse, GraphicsObject, Image, Rectangle, SimpleText};
use crate::style::{HAlign, Style, StyleData};
use log::{debug, warn};

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Layer attributes for layer frames, page name for pages.
    layer: Option<Layer>,
    name: String,
    children: Vec<Item>,
    layers: Vec<Layer>,
    saved_style: Style,
}

impl Frame {
    fn new(kind: FrameKind, saved_style: Style) -> Self {
        Frame { kind, layer: None, name: String::new(), children: Vec::new(), layers: Vec::new(), saved_style }
    }

    fn materialize(self) -> Composite {
        match self.kind {
            FrameKind::Layer => {
                let mut layer = self.layer.unwrap_or_else(|| Layer::new(self.name));
                layer.children.extend(self.children);
                Composite::Layer(layer)
            }
            FrameKind::Page => Composite::Page(Page { name: self.name, layers: self.layers }),
            FrameKind::Defs => Composite::Defs(self.children),
            FrameKind::Group | FrameKind::Document => Composite::Group(Group::new(self.children)),
        }
    }
}

/// The layer primitives at this level fall into, created on demand.
fn default_layer<'a>(layers: &'a mut Vec<Layer>, name: &str) -> &'a mut Layer {
    let usable = matches!(layers.last(), Some(l) if l.kind == LayerKind::Regular);
    if !usable {
        debug!("opening default layer {:?}", name);
        layers.push(Layer::new(name));
    }
    let last = layers.len() - 1;
    &mut layers[last]
}

pub struct DocumentBuilder {
    document: Document,
    frames: Vec<Frame>,
    style: Style,
    has_object: bool,
    options: BuilderOptions,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        DocumentBuilder::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        DocumentBuilder::with_options(BuilderOptions::default())
    }

    pub fn with_options(options: BuilderOptions) -> Self {
        DocumentBuilder {
            document: Document::new(),
            frames: Vec::new(),
            style: Style::default(),
            has_object: false,
            options,
        }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The document as built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    /// Derive a new current style; snapshots held by earlier objects are untouched.
    pub fn update_style(&mut self, f: impl FnOnce(&mut StyleData)) {
        self.style = self.style.with(f);
    }

    fn push_frame(&mut self, frame: Frame) {
        self.has_object = false;
        self.frames.push(frame);
    }

    pub fn begin_group(&mut self) {
        self.push_frame(Frame::new(FrameKind::Group, self.style.clone()));
    }

    /// Open a layer with the attributes of `layer`; its existing children come first.
    pub fn begin_layer(&mut self, layer: Layer) {
        let mut frame = Frame::new(FrameKind::Layer, self.style.clone());
        frame.name = layer.name.clone();
        frame.layer = Some(layer);
        self.push_frame(frame);
    }

    pub fn begin_page(&mut self, name: impl Into<String>) {
        let mut frame = Frame::new(FrameKind::Page, self.style.clone());
        frame.name = name.into();
        self.push_frame(frame);
    }

    pub fn begin_defs(&mut self) {
        self.push_frame(Frame::new(FrameKind::Defs, self.style.clone()));
    }

    fn push_item(&mut self, item: Item) {
        let name = &self.options.default_layer_name;
        match self.frames.last_mut() {
            Some(frame) if frame.kind == FrameKind::Page => default_layer(&mut frame.layers, name).children.push(item),
            Some(frame) => frame.children.push(item),
            None => default_layer(&mut self.document.layers, name).children.push(item),
        }
    }

    fn append_object(&mut self, object: GraphicsObject) {
        self.push_item(Item::Object(object));
        self.has_object = true;
    }

    /// The primitive appended last, until the next frame change.
    pub fn object_mut(&mut self) -> Option<&mut GraphicsObject> {
        if !self.has_object {
            return None;
        }
        let items = match self.frames.last_mut() {
            Some(frame) if frame.kind == FrameKind::Page => &mut frame.layers.last_mut()?.children,
            Some(frame) => &mut frame.children,
            None => &mut self.document.layers.last_mut()?.children,
        };
        match items.last_mut()? {
            Item::Object(o) => Some(o),
            Item::Group(_) => None,
        }
    }

    pub fn bezier(&mut self, mut paths: Vec<Path>) {
        if self.options.guess_continuity {
            for path in &mut paths {
                path.guess_continuity();
            }
        }
        let object = PolyBezier::new(paths, self.style.clone());
        self.append_object(GraphicsObject::Bezier(object));
    }

    /// Unit square placed by `trafo`, with corner radii in unit-square fractions.
    pub fn rectangle(&mut self, trafo: Trafo, radius1: f64, radius2: f64) {
        let rect = Rectangle::new(trafo, radius1, radius2, self.style.clone());
        self.append_object(GraphicsObject::Rectangle(rect));
    }

    /// Unit circle placed by `trafo`; equal angles give a full ellipse.
    pub fn ellipse(&mut self, trafo: Trafo, start_angle: f64, end_angle: f64, arc_type: ArcType) {
        let ellipse = Ellipse::new(trafo, start_angle, end_angle, arc_type, self.style.clone());
        self.append_object(GraphicsObject::Ellipse(ellipse));
    }

    pub fn simple_text(&mut self, text: impl Into<String>, trafo: Trafo, halign: HAlign) {
        let text = SimpleText::new(text, trafo, halign, self.style.clone());
        self.append_object(GraphicsObject::Text(text));
    }

    pub fn image(&mut self, image: Image) {
        self.append_object(GraphicsObject::Image(image));
    }

    fn end_kind(&mut self, expected: FrameKind) -> Result<(), BuildError> {
        let found = self.frames.last().map_or(FrameKind::Document, |f| f.kind);
        if found != expected {
            warn!("unbalanced end: expected {:?}, found {:?}", expected, found);
            return Err(BuildError::Structural { expected, found });
        }
        self.close_top()
    }

    pub fn end_group(&mut self) -> Result<(), BuildError> {
        self.end_kind(FrameKind::Group)
    }

    pub fn end_layer(&mut self) -> Result<(), BuildError> {
        self.end_kind(FrameKind::Layer)
    }

    pub fn end_page(&mut self) -> Result<(), BuildError> {
        self.end_kind(FrameKind::Page)
    }

    pub fn end_defs(&mut self) -> Result<(), BuildError> {
        self.end_kind(FrameKind::Defs)
    }

    /// Close the innermost frame whatever its kind.
    pub fn end_composite(&mut self) -> Result<(), BuildError> {
        if self.frames.is_empty() {
            warn!("end_composite with no open frame");
            return Err(BuildError::NoOpenFrame);
        }
        self.close_top()
    }

    fn close_top(&mut self) -> Result<(), BuildError> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        self.style = frame.saved_style.clone();
        self.has_object = false;
        let composite = frame.materialize();
        if composite.child_count() == 0 && self.rejects_empty(&composite) {
            return Err(BuildError::EmptyComposite(Box::new(composite)));
        }
        self.attach(composite);
        Ok(())
    }

    fn rejects_empty(&self, composite: &Composite) -> bool {
        match composite {
            Composite::Group(_) => true,
            Composite::Layer(_) => !self.options.keep_empty_layers,
            Composite::Page(_) | Composite::Defs(_) => false,
        }
    }

    /// Attach a composite that was reported as empty after all.
    pub fn retain_composite(&mut self, composite: Box<Composite>) {
        self.attach(*composite);
    }

    fn attach(&mut self, composite: Composite) {
        match composite {
            Composite::Defs(items) => self.document.defs.extend(items),
            Composite::Page(page) => {
                if !self.frames.is_empty() {
                    debug!("page {:?} closed inside another frame, attached to the document", page.name);
                }
                self.document.layers.push(Layer::with_kind(page.name, LayerKind::PageMarker));
                self.document.layers.extend(page.layers);
            }
            Composite::Layer(layer) => match self.frames.last_mut() {
                None => self.document.layers.push(layer),
                Some(frame) if frame.kind == FrameKind::Page => frame.layers.push(layer),
                Some(frame) => {
                    debug!("layer {:?} nested in a {:?}, kept as a group", layer.name, frame.kind);
                    frame.children.push(Item::Group(Group::new(layer.children)));
                }
            },
            Composite::Group(group) => self.push_item(Item::Group(group)),
        }
    }

    /// Close every open frame, innermost first. Empty layers are kept and
    /// empty groups dropped. Returns the number of frames closed.
    pub fn end_all(&mut self) -> usize {
        let mut closed = 0;
        while !self.frames.is_empty() {
            match self.close_top() {
                Ok(()) => {}
                Err(BuildError::EmptyComposite(composite)) => {
                    if composite.kind() == FrameKind::Layer {
                        self.attach(*composite);
                    } else {
                        warn!("dropping empty {} left open", composite.kind_name());
                    }
                }
                Err(e) => warn!("{}", e),
            }
            closed += 1;
        }
        closed
    }

    /// Close what is still open and normalize the layer list.
    pub fn load_completed(mut self) -> Document {
        let dangling = self.end_all();
        if dangling > 0 {
            debug!("closed {} dangling frames at end of load", dangling);
        }
        self.document.load_completed();
        self.document
    }
}
