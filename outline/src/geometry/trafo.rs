use crate::model::Point;
use serde::{Deserialize, Serialize};

/// Affine transformation `x' = m11*x + m12*y + v1`, `y' = m21*x + m22*y + v2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trafo {
    pub m11: f64,
    pub m21: f64,
    pub m12: f64,
    pub m22: f64,
    pub v1: f64,
    pub v2: f64,
}

impl Default for Trafo {
    fn default() -> Self {
        Trafo::IDENTITY
    }
}

impl Trafo {
    pub const IDENTITY: Trafo = Trafo { m11: 1.0, m21: 0.0, m12: 0.0, m22: 1.0, v1: 0.0, v2: 0.0 };

    pub const fn new(m11: f64, m21: f64, m12: f64, m22: f64, v1: f64, v2: f64) -> Self {
        Trafo { m11, m21, m12, m22, v1, v2 }
    }

    pub fn translation(offset: Point) -> Self {
        Trafo::new(1.0, 0.0, 0.0, 1.0, offset.x, offset.y)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Trafo::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Trafo::new(c, s, -s, c, 0.0, 0.0)
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.m11 * p.x + self.m12 * p.y + self.v1,
            self.m21 * p.x + self.m22 * p.y + self.v2,
        )
    }

    /// Apply only the linear part (for direction vectors).
    #[inline]
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.m11 * v.x + self.m12 * v.y, self.m21 * v.x + self.m22 * v.y)
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn then_after(&self, other: &Trafo) -> Trafo {
        Trafo {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            v1: self.m11 * other.v1 + self.m12 * other.v2 + self.v1,
            v2: self.m21 * other.v1 + self.m22 * other.v2 + self.v2,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    pub fn inverse(&self) -> Option<Trafo> {
        let det = self.determinant();
        if det.abs() <= super::tolerance::EPS_DENOM {
            return None;
        }
        let m11 = self.m22 / det;
        let m12 = -self.m12 / det;
        let m21 = -self.m21 / det;
        let m22 = self.m11 / det;
        Some(Trafo {
            m11,
            m21,
            m12,
            m22,
            v1: -(m11 * self.v1 + m12 * self.v2),
            v2: -(m21 * self.v1 + m22 * self.v2),
        })
    }

    pub fn offset(&self) -> Point {
        Point::new(self.v1, self.v2)
    }

    /// Linear factor applied to lengths such as line widths.
    pub fn length_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// The all-zero matrix some exporters write for unit shapes becomes a y-flip.
    pub fn or_flip_if_degenerate(self) -> Trafo {
        if self.m11 == 0.0 && self.m21 == 0.0 && self.m12 == 0.0 && self.m22 == 0.0 {
            Trafo::new(1.0, 0.0, 0.0, -1.0, self.v1, self.v2)
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_applies_right_first() {
        let t = Trafo::translation(Point::new(10.0, 0.0)).then_after(&Trafo::scale(2.0, 2.0));
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Trafo::new(2.0, 1.0, -1.0, 3.0, 5.0, -7.0);
        let inv = t.inverse().unwrap();
        let p = Point::new(0.25, -4.0);
        assert!(inv.apply(t.apply(p)).distance(p) < 1e-12);
        assert!(Trafo::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn degenerate_matrix_becomes_flip() {
        let t = Trafo::new(0.0, 0.0, 0.0, 0.0, 3.0, 4.0).or_flip_if_degenerate();
        assert_eq!(t, Trafo::new(1.0, 0.0, 0.0, -1.0, 3.0, 4.0));
    }
}
