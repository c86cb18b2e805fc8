//! Placed primitives: rectangles, ellipses, text and images.
//!
//! Rectangles and ellipses are unit shapes positioned by a [`Trafo`]; their
//! outline form comes from [`AsBezier`], so anything that works on paths
//! (blending, snapping, export) also works on them.

use crate::algorithms::blend::blend_trafo;
use crate::bezier::{AsBezier, PolyBezier};
use crate::error::MismatchError;
use crate::geometry::trafo::Trafo;
use crate::model::{Continuity, Point, Rect};
use crate::path::Path;
use crate::style::{HAlign, Style};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Control distance for a quarter circle of radius 1.
pub const KAPPA: f64 = 0.5522847498;

fn placed_rect(trafo: &Trafo, w: f64, h: f64) -> Rect {
    let corners = [Point::new(0.0, 0.0), Point::new(w, 0.0), Point::new(w, h), Point::new(0.0, h)];
    Rect::from_points(corners.iter().map(|&p| trafo.apply(p))).unwrap_or(Rect::EMPTY)
}

/// Unit square mapped by `trafo`, optionally with rounded corners.
///
/// The radii are fractions of the unit square (at most 0.5).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rectangle {
    pub trafo: Trafo,
    pub radius1: f64,
    pub radius2: f64,
    pub style: Style,
}

impl Rectangle {
    pub fn new(trafo: Trafo, radius1: f64, radius2: f64, style: Style) -> Self {
        Rectangle {
            trafo: trafo.or_flip_if_degenerate(),
            radius1: radius1.abs().min(0.5),
            radius2: radius2.abs().min(0.5),
            style,
        }
    }

    pub fn is_rounded(&self) -> bool {
        self.radius1 > 0.0 && self.radius2 > 0.0
    }

    fn unit_path(&self) -> Path {
        if !self.is_rounded() {
            let mut path = Path::from_points([
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
                Point::new(0.0, 0.0),
            ]);
            path.close_path();
            return path;
        }
        let (rx, ry) = (self.radius1, self.radius2);
        let (kx, ky) = (KAPPA * rx, KAPPA * ry);
        let s = Continuity::Smooth;
        let p = Point::new;
        let mut path = Path::with_capacity(9);
        path.append_line(p(rx, 0.0), s);
        path.append_line(p(1.0 - rx, 0.0), s);
        path.append_bezier(p(1.0 - rx + kx, 0.0), p(1.0, ry - ky), p(1.0, ry), s);
        path.append_line(p(1.0, 1.0 - ry), s);
        path.append_bezier(p(1.0, 1.0 - ry + ky), p(1.0 - rx + kx, 1.0), p(1.0 - rx, 1.0), s);
        path.append_line(p(rx, 1.0), s);
        path.append_bezier(p(rx - kx, 1.0), p(0.0, 1.0 - ry + ky), p(0.0, 1.0 - ry), s);
        path.append_line(p(0.0, ry), s);
        path.append_bezier(p(0.0, ry - ky), p(rx - kx, 0.0), p(rx, 0.0), s);
        path.close_path();
        path
    }

    pub fn coord_rect(&self) -> Rect {
        placed_rect(&self.trafo, 1.0, 1.0)
    }

    pub fn blend(&self, other: &Rectangle, frac1: f64, frac2: f64) -> Rectangle {
        Rectangle {
            trafo: blend_trafo(&self.trafo, &other.trafo, frac1, frac2),
            radius1: frac1 * self.radius1 + frac2 * other.radius1,
            radius2: frac1 * self.radius2 + frac2 * other.radius2,
            style: self.style.blend(&other.style, frac1, frac2),
        }
    }
}

impl AsBezier for Rectangle {
    fn as_bezier(&self) -> PolyBezier {
        let mut path = self.unit_path();
        path.transform(&self.trafo);
        PolyBezier::from_path(path, self.style.clone())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ArcType {
    /// Closed through the centre.
    #[default]
    Pie,
    /// Closed by a straight line between the arc ends.
    Chord,
    /// Open.
    Arc,
}

/// Unit circle mapped by `trafo`. Equal start and end angles mean a full ellipse.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ellipse {
    pub trafo: Trafo,
    pub start_angle: f64,
    pub end_angle: f64,
    pub arc_type: ArcType,
    pub style: Style,
}

impl Ellipse {
    pub fn new(trafo: Trafo, start_angle: f64, end_angle: f64, arc_type: ArcType, style: Style) -> Self {
        Ellipse { trafo: trafo.or_flip_if_degenerate(), start_angle, end_angle, arc_type, style }
    }

    pub fn is_full(&self) -> bool {
        self.start_angle == self.end_angle
    }

    /// Counter-clockwise sweep from start to end in `(0, 2π]`, or `None` for a
    /// full ellipse. Non-finite angles give a full ellipse.
    fn sweep(&self) -> Option<f64> {
        if self.is_full() || !self.start_angle.is_finite() || !self.end_angle.is_finite() {
            return None;
        }
        let sweep = (self.end_angle - self.start_angle).rem_euclid(TAU);
        Some(if sweep > 0.0 { sweep } else { TAU })
    }

    fn unit_path(&self) -> Path {
        let Some(sweep) = self.sweep() else {
            let mut path = Path::with_capacity(5);
            path.append_line(Point::new(1.0, 0.0), Continuity::Symmetrical);
            append_arc(&mut path, 0.0, TAU, 4, KAPPA);
            path.close_path();
            return path;
        };
        let pieces = ((sweep / FRAC_PI_2) - 1e-9).ceil().max(1.0) as usize;
        let k = 4.0 / 3.0 * (sweep / pieces as f64 / 4.0).tan();
        let start = Point::polar(1.0, self.start_angle);
        let mut path = Path::with_capacity(pieces + 3);
        path.append_line(start, Continuity::Angle);
        append_arc(&mut path, self.start_angle, sweep, pieces, k);
        path.set_continuity(-1, Continuity::Angle);
        match self.arc_type {
            ArcType::Arc => {}
            ArcType::Chord => {
                path.append_line(start, Continuity::Angle);
                path.close_path();
            }
            ArcType::Pie => {
                path.append_line(Point::ORIGIN, Continuity::Angle);
                path.append_line(start, Continuity::Angle);
                path.close_path();
            }
        }
        path
    }

    pub fn coord_rect(&self) -> Rect {
        self.as_bezier().coord_rect()
    }

    /// Interpolate ellipses of the same arc type directly; anything else goes
    /// through the Bezier form.
    pub fn blend(&self, other: &Ellipse, frac1: f64, frac2: f64) -> Option<Ellipse> {
        if self.arc_type != other.arc_type || self.is_full() != other.is_full() {
            return None;
        }
        Some(Ellipse {
            trafo: blend_trafo(&self.trafo, &other.trafo, frac1, frac2),
            start_angle: frac1 * self.start_angle + frac2 * other.start_angle,
            end_angle: frac1 * self.end_angle + frac2 * other.end_angle,
            arc_type: self.arc_type,
            style: self.style.blend(&other.style, frac1, frac2),
        })
    }
}

/// Append `pieces` equal arc segments of the unit circle starting at `start`.
fn append_arc(path: &mut Path, start: f64, sweep: f64, pieces: usize, k: f64) {
    let step = sweep / pieces as f64;
    for i in 0..pieces {
        let a0 = start + step * i as f64;
        let a1 = a0 + step;
        let (p0, p1) = (Point::polar(1.0, a0), Point::polar(1.0, a1));
        let c1 = p0 + k * Point::new(-a0.sin(), a0.cos());
        let c2 = p1 - k * Point::new(-a1.sin(), a1.cos());
        path.append_bezier(c1, c2, p1, Continuity::Symmetrical);
    }
}

impl AsBezier for Ellipse {
    fn as_bezier(&self) -> PolyBezier {
        let mut path = self.unit_path();
        path.transform(&self.trafo);
        PolyBezier::from_path(path, self.style.clone())
    }
}

/// Single-line text anchored by `trafo`. Glyph outlines belong to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimpleText {
    pub text: String,
    pub trafo: Trafo,
    pub halign: HAlign,
    pub style: Style,
}

impl SimpleText {
    pub fn new(text: impl Into<String>, trafo: Trafo, halign: HAlign, style: Style) -> Self {
        SimpleText { text: text.into(), trafo, halign, style }
    }

    /// Rough extent from an average advance of half the font size.
    pub fn coord_rect(&self) -> Rect {
        let size = self.style.data().font_size;
        let width = 0.5 * size * self.text.chars().count() as f64;
        let shift = match self.halign {
            HAlign::Left => 0.0,
            HAlign::Center => -0.5 * width,
            HAlign::Right => -width,
        };
        let trafo = self.trafo.then_after(&Trafo::translation(Point::new(shift, 0.0)));
        placed_rect(&trafo, width, size)
    }
}

/// Reference to raster data owned by the host, placed by `trafo` in pixel units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Image {
    pub source: String,
    pub width: f64,
    pub height: f64,
    pub trafo: Trafo,
}

impl Image {
    pub fn new(source: impl Into<String>, width: f64, height: f64, trafo: Trafo) -> Self {
        Image { source: source.into(), width, height, trafo }
    }

    pub fn coord_rect(&self) -> Rect {
        placed_rect(&self.trafo, self.width, self.height)
    }
}

/// Every primitive a document can hold.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphicsObject {
    Bezier(PolyBezier),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Text(SimpleText),
    Image(Image),
}

impl GraphicsObject {
    pub fn kind_name(&self) -> &'static str {
        match self {
            GraphicsObject::Bezier(_) => "bezier",
            GraphicsObject::Rectangle(_) => "rectangle",
            GraphicsObject::Ellipse(_) => "ellipse",
            GraphicsObject::Text(_) => "text",
            GraphicsObject::Image(_) => "image",
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            GraphicsObject::Bezier(b) => Some(b.style()),
            GraphicsObject::Rectangle(r) => Some(&r.style),
            GraphicsObject::Ellipse(e) => Some(&e.style),
            GraphicsObject::Text(t) => Some(&t.style),
            GraphicsObject::Image(_) => None,
        }
    }

    pub fn coord_rect(&self) -> Rect {
        match self {
            GraphicsObject::Bezier(b) => b.coord_rect(),
            GraphicsObject::Rectangle(r) => r.coord_rect(),
            GraphicsObject::Ellipse(e) => e.coord_rect(),
            GraphicsObject::Text(t) => t.coord_rect(),
            GraphicsObject::Image(i) => i.coord_rect(),
        }
    }

    /// The Bezier form, for objects that have one.
    pub fn as_bezier(&self) -> Option<PolyBezier> {
        match self {
            GraphicsObject::Bezier(b) => Some(b.clone()),
            GraphicsObject::Rectangle(r) => Some(r.as_bezier()),
            GraphicsObject::Ellipse(e) => Some(e.as_bezier()),
            GraphicsObject::Text(_) | GraphicsObject::Image(_) => None,
        }
    }

    /// Interpolate two objects, keeping the primitive kind when both agree.
    pub fn blend(&self, other: &GraphicsObject, frac1: f64, frac2: f64) -> Result<GraphicsObject, MismatchError> {
        match (self, other) {
            (GraphicsObject::Rectangle(a), GraphicsObject::Rectangle(b)) => {
                return Ok(GraphicsObject::Rectangle(a.blend(b, frac1, frac2)));
            }
            (GraphicsObject::Ellipse(a), GraphicsObject::Ellipse(b)) => {
                if let Some(e) = a.blend(b, frac1, frac2) {
                    return Ok(GraphicsObject::Ellipse(e));
                }
            }
            _ => {}
        }
        let a = self
            .as_bezier()
            .ok_or_else(|| MismatchError::new(format!("{} has no outline", self.kind_name())))?;
        let b = other
            .as_bezier()
            .ok_or_else(|| MismatchError::new(format!("{} has no outline", other.kind_name())))?;
        a.blend(&b, frac1, frac2).map(GraphicsObject::Bezier)
    }
}
