use crate::document::{Document, Item, Layer, LayerKind, Page};
use crate::geometry::trafo::Trafo;
use crate::path::{Path, Segment};
use crate::primitives::GraphicsObject;
use crate::style::StyleData;
use serde::Serialize;
use serde_json::Value;

pub fn document_to_json(doc: &Document) -> Value {
    #[derive(Serialize)]
    struct PathSer {
        closed: bool,
        segments: Vec<Segment>,
    }
    #[derive(Serialize)]
    struct ObjectSer<'a> {
        kind: &'static str,
        bbox: [f64; 4], // left,bottom,right,top
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<&'a StyleData>,
        #[serde(skip_serializing_if = "Option::is_none")]
        paths: Option<Vec<PathSer>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        trafo: Option<Trafo>,
    }
    #[derive(Serialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum ItemSer<'a> {
        Object(ObjectSer<'a>),
        Group { children: Vec<ItemSer<'a>> },
    }
    #[derive(Serialize)]
    struct LayerSer<'a> {
        name: &'a str,
        kind: LayerKind,
        visible: bool,
        printable: bool,
        locked: bool,
        children: Vec<ItemSer<'a>>,
    }
    #[derive(Serialize)]
    struct PageSer<'a> {
        name: &'a str,
        layers: Vec<LayerSer<'a>>,
    }
    #[derive(Serialize)]
    struct Doc<'a> {
        version: u32,
        page_name: Option<&'a str>,
        layers: Vec<LayerSer<'a>>,
        other_pages: Vec<PageSer<'a>>,
        defs: Vec<ItemSer<'a>>,
        active_layer: Option<usize>,
    }

    fn path_ser(path: &Path) -> PathSer {
        PathSer { closed: path.closed(), segments: (0..path.len()).map(|i| path.segment(i)).collect() }
    }

    fn object_ser(object: &GraphicsObject) -> ObjectSer<'_> {
        let r = object.coord_rect();
        let (text, source, trafo) = match object {
            GraphicsObject::Text(t) => (Some(t.text.as_str()), None, Some(t.trafo)),
            GraphicsObject::Image(i) => (None, Some(i.source.as_str()), Some(i.trafo)),
            GraphicsObject::Rectangle(r) => (None, None, Some(r.trafo)),
            GraphicsObject::Ellipse(e) => (None, None, Some(e.trafo)),
            GraphicsObject::Bezier(_) => (None, None, None),
        };
        ObjectSer {
            kind: object.kind_name(),
            bbox: [r.left, r.bottom, r.right, r.top],
            style: object.style().map(|s| s.data()),
            paths: object.as_bezier().map(|b| b.paths().iter().map(path_ser).collect()),
            text,
            source,
            trafo,
        }
    }

    fn items_ser(items: &[Item]) -> Vec<ItemSer<'_>> {
        items
            .iter()
            .map(|item| match item {
                Item::Object(o) => ItemSer::Object(object_ser(o)),
                Item::Group(g) => ItemSer::Group { children: items_ser(&g.children) },
            })
            .collect()
    }

    fn layer_ser(layer: &Layer) -> LayerSer<'_> {
        LayerSer {
            name: &layer.name,
            kind: layer.kind,
            visible: layer.visible,
            printable: layer.printable,
            locked: layer.locked,
            children: items_ser(&layer.children),
        }
    }

    fn page_ser(page: &Page) -> PageSer<'_> {
        PageSer { name: &page.name, layers: page.layers.iter().map(layer_ser).collect() }
    }

    serde_json::to_value(Doc {
        version: 1,
        page_name: doc.page_name.as_deref(),
        layers: doc.layers.iter().map(layer_ser).collect(),
        other_pages: doc.other_pages.iter().map(page_ser).collect(),
        defs: items_ser(&doc.defs),
        active_layer: doc.active_layer,
    })
    .unwrap_or(Value::Null)
}
