//! Immutable style snapshots.
//!
//! A [`Style`] is a cheap handle to shared, never-mutated [`StyleData`]. Every
//! change goes through a `with_*` method that returns a new snapshot, so objects
//! holding an older snapshot never observe the edit.

use crate::geometry::trafo::Trafo;
use crate::model::{Color, Point, Rect};
use crate::path::Path;
use serde::{Deserialize, Serialize, Serializer};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Projecting,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Arrow head outline in its own frame: tip at the origin, pointing along +x.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub outline: Path,
}

impl Arrow {
    pub fn new(outline: Path) -> Self {
        Arrow { outline }
    }

    /// A plain triangular head.
    pub fn triangle() -> Self {
        let mut outline = Path::from_points([
            Point::new(0.0, 0.0),
            Point::new(-6.0, 2.5),
            Point::new(-6.0, -2.5),
            Point::new(0.0, 0.0),
        ]);
        outline.close_path();
        Arrow { outline }
    }

    /// Bounds of the head placed at `pos`, pointing along `dir`, scaled by the line width.
    pub fn bounding_rect(&self, pos: Point, dir: Point, width: f64) -> Rect {
        let trafo = self.placement(pos, dir, width);
        let mut placed = self.outline.clone();
        placed.transform(&trafo);
        placed.accurate_rect().unwrap_or(Rect::new(pos.x, pos.y, pos.x, pos.y))
    }

    fn placement(&self, pos: Point, dir: Point, width: f64) -> Trafo {
        let angle = if dir.length() > 0.0 { dir.angle() } else { 0.0 };
        let s = width.max(1.0);
        Trafo::translation(pos)
            .then_after(&Trafo::rotation(angle))
            .then_after(&Trafo::scale(s, s))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleData {
    pub fill: Option<Color>,
    pub line: Option<Color>,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub dashes: Vec<f64>,
    pub arrow1: Option<Arrow>,
    pub arrow2: Option<Arrow>,
    pub font_name: String,
    pub font_size: f64,
}

impl Default for StyleData {
    fn default() -> Self {
        StyleData {
            fill: None,
            line: Some(Color::BLACK),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dashes: Vec::new(),
            arrow1: None,
            arrow2: None,
            font_name: "Times-Roman".to_string(),
            font_size: 12.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style(Rc<StyleData>);

impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StyleData::deserialize(deserializer).map(Style::from)
    }
}

impl From<StyleData> for Style {
    fn from(data: StyleData) -> Self {
        Style(Rc::new(data))
    }
}

impl Style {
    pub fn data(&self) -> &StyleData {
        &self.0
    }

    /// Whether two handles point at the same snapshot.
    pub fn shares_snapshot(&self, other: &Style) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A new snapshot with `f` applied to a copy of the data.
    pub fn with(&self, f: impl FnOnce(&mut StyleData)) -> Style {
        let mut data = (*self.0).clone();
        f(&mut data);
        Style(Rc::new(data))
    }

    pub fn with_fill(&self, fill: Option<Color>) -> Style {
        self.with(|d| d.fill = fill)
    }

    pub fn with_line(&self, line: Option<Color>) -> Style {
        self.with(|d| d.line = line)
    }

    pub fn with_line_width(&self, width: f64) -> Style {
        self.with(|d| d.line_width = width)
    }

    pub fn with_arrows(&self, arrow1: Option<Arrow>, arrow2: Option<Arrow>) -> Style {
        self.with(|d| {
            d.arrow1 = arrow1;
            d.arrow2 = arrow2;
        })
    }

    pub fn with_font(&self, name: &str, size: f64) -> Style {
        self.with(|d| {
            d.font_name = name.to_string();
            d.font_size = size;
        })
    }

    pub fn has_line(&self) -> bool {
        self.0.line.is_some()
    }

    pub fn has_fill(&self) -> bool {
        self.0.fill.is_some()
    }

    /// How far the painted outline reaches beyond the geometric one.
    pub fn grow_amount(&self) -> f64 {
        if !self.has_line() {
            return 0.0;
        }
        let half = 0.5 * self.0.line_width;
        match (self.0.line_join, self.0.line_cap) {
            (LineJoin::Miter, _) | (_, LineCap::Projecting) => half * std::f64::consts::SQRT_2,
            _ => half,
        }
    }

    /// The snapshot after an affine map: stroke and font sizes scale with it.
    pub fn transformed(&self, trafo: &Trafo) -> Style {
        let k = trafo.length_scale();
        if (k - 1.0).abs() <= f64::EPSILON {
            return self.clone();
        }
        self.with(|d| {
            d.line_width *= k;
            d.font_size *= k;
            for dash in &mut d.dashes {
                *dash *= k;
            }
        })
    }

    /// Interpolated snapshot for blend steps; non-numeric attributes follow `self`.
    pub fn blend(&self, other: &Style, frac1: f64, frac2: f64) -> Style {
        let b = other.data();
        self.with(|d| {
            d.fill = blend_color(d.fill, b.fill, frac1, frac2);
            d.line = blend_color(d.line, b.line, frac1, frac2);
            d.line_width = frac1 * d.line_width + frac2 * b.line_width;
            d.font_size = frac1 * d.font_size + frac2 * b.font_size;
        })
    }
}

fn blend_color(a: Option<Color>, b: Option<Color>, frac1: f64, frac2: f64) -> Option<Color> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.blend(b, frac1, frac2)),
        (a, _) => a,
    }
}
