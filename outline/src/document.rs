//! The document tree produced by the builder: layers, pages, groups and primitives.

use crate::primitives::GraphicsObject;
use serde::Serialize;

/// A child of a layer or group.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Object(GraphicsObject),
    Group(Group),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Group {
    pub children: Vec<Item>,
}

impl Group {
    pub fn new(children: Vec<Item>) -> Self {
        Group { children }
    }

    /// Primitives in paint order, descending into nested groups.
    pub fn objects(&self) -> Vec<&GraphicsObject> {
        let mut out = Vec::new();
        collect_objects(&self.children, &mut out);
        out
    }
}

fn collect_objects<'a>(items: &'a [Item], out: &mut Vec<&'a GraphicsObject>) {
    for item in items {
        match item {
            Item::Object(o) => out.push(o),
            Item::Group(g) => collect_objects(&g.children, out),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum LayerKind {
    #[default]
    Regular,
    /// Marks the start of a page in the flat layer list while loading.
    PageMarker,
    /// Shared by every page.
    Master,
    Grid,
    Guide,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    pub printable: bool,
    pub locked: bool,
    pub children: Vec<Item>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Layer::with_kind(name, LayerKind::Regular)
    }

    pub fn with_kind(name: impl Into<String>, kind: LayerKind) -> Self {
        let (visible, printable, locked) = match kind {
            LayerKind::Grid => (false, false, true),
            LayerKind::Guide => (true, false, false),
            _ => (true, true, false),
        };
        Layer { name: name.into(), kind, visible, printable, locked, children: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn objects(&self) -> Vec<&GraphicsObject> {
        let mut out = Vec::new();
        collect_objects(&self.children, &mut out);
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Page {
    pub name: String,
    pub layers: Vec<Layer>,
}

/// Kinds of frames the builder can have open. `Document` stands for the
/// root, i.e. no frame at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FrameKind {
    Document,
    Page,
    Layer,
    Group,
    Defs,
}

/// A finished frame, ready to be attached to its parent.
#[derive(Clone, Debug, PartialEq)]
pub enum Composite {
    Group(Group),
    Layer(Layer),
    Page(Page),
    Defs(Vec<Item>),
}

impl Composite {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Composite::Group(_) => "group",
            Composite::Layer(_) => "layer",
            Composite::Page(_) => "page",
            Composite::Defs(_) => "defs",
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Composite::Group(_) => FrameKind::Group,
            Composite::Layer(_) => FrameKind::Layer,
            Composite::Page(_) => FrameKind::Page,
            Composite::Defs(_) => FrameKind::Defs,
        }
    }

    pub fn child_count(&self) -> usize {
        match self {
            Composite::Group(g) => g.children.len(),
            Composite::Layer(l) => l.children.len(),
            Composite::Page(p) => p.layers.len(),
            Composite::Defs(items) => items.len(),
        }
    }
}

/// Root of an imported drawing.
///
/// While loading, `layers` is a flat list in which page markers separate
/// pages. [`Document::load_completed`] turns it into the layer stack of the
/// first page (`[grid] + page layers + master layers + [guide]`) and moves
/// the remaining pages to `other_pages`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Document {
    pub layers: Vec<Layer>,
    pub page_name: Option<String>,
    pub other_pages: Vec<Page>,
    pub defs: Vec<Item>,
    pub active_layer: Option<usize>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        1 + self.other_pages.len()
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer.and_then(|i| self.layers.get(i))
    }

    pub fn find_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Normalize the freshly loaded layer list.
    pub fn load_completed(&mut self) {
        let mut grid = None;
        let mut guide = None;
        let mut masters = Vec::new();
        let mut pages: Vec<Page> = Vec::new();
        let mut current = Page::default();
        let mut seen_marker = false;

        for layer in std::mem::take(&mut self.layers) {
            match layer.kind {
                LayerKind::Grid if grid.is_none() => grid = Some(layer),
                LayerKind::Guide if guide.is_none() => guide = Some(layer),
                LayerKind::Grid | LayerKind::Guide => {
                    log::debug!("dropping duplicate {:?} layer {:?}", layer.kind, layer.name);
                }
                LayerKind::Master => masters.push(layer),
                LayerKind::PageMarker => {
                    if seen_marker || !current.layers.is_empty() {
                        pages.push(std::mem::take(&mut current));
                    }
                    current.name = layer.name;
                    seen_marker = true;
                }
                LayerKind::Regular => current.layers.push(layer),
            }
        }
        pages.push(current);

        let before = pages.len();
        pages.retain(|p| !p.layers.is_empty());
        if pages.len() < before {
            log::debug!("dropped {} empty pages", before - pages.len());
        }
        let mut first = if pages.is_empty() { Page::default() } else { pages.remove(0) };
        if first.layers.is_empty() {
            first.layers.push(Layer::new("Layer 1"));
        }

        let mut layers = Vec::with_capacity(first.layers.len() + masters.len() + 2);
        layers.push(grid.unwrap_or_else(|| Layer::with_kind("Grid", LayerKind::Grid)));
        layers.extend(first.layers);
        layers.extend(masters);
        layers.push(guide.unwrap_or_else(|| Layer::with_kind("Guide Lines", LayerKind::Guide)));

        self.active_layer = layers
            .iter()
            .position(|l| l.kind == LayerKind::Regular && l.visible && !l.locked);
        self.page_name = if first.name.is_empty() { None } else { Some(first.name) };
        self.other_pages = pages;
        self.layers = layers;
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        crate::json::document_to_json(self)
    }
}
