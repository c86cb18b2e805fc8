//! Bezier path geometry, interactive node editing and the document builder
//! that format importers drive.

pub mod model;
pub mod geometry {
    pub mod cubic;
    pub mod math;
    pub mod path_length;
    pub mod tolerance;
    pub mod trafo;
}
pub mod path;
pub mod algorithms {
    pub mod blend;
    pub mod curve_ops;
    pub mod picking;
}
pub mod bezier;
pub mod builder;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod primitives;
pub mod style;
pub mod undo;
mod json;

pub use bezier::{combine_beziers, AsBezier, PolyBezier, PolyBezierCreator, PolyLineCreator};
pub use builder::DocumentBuilder;
pub use config::{BuilderOptions, EditorOptions};
pub use document::{Composite, Document, FrameKind, Group, Item, Layer, LayerKind, Page};
pub use editor::{Control, EditState, EditorHandle, Handle, PolyBezierEditor};
pub use error::{BuildError, MismatchError, TransformError};
pub use geometry::trafo::Trafo;
pub use model::{Color, Continuity, Point, Rect, SelectMode};
pub use path::{Path, Segment, SegmentKind};
pub use primitives::{ArcType, Ellipse, GraphicsObject, Image, Rectangle, SimpleText};
pub use style::{Arrow, HAlign, LineCap, LineJoin, Style, StyleData};
pub use undo::Inverse;
