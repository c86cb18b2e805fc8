use crate::error::MismatchError;
use crate::geometry::trafo::Trafo;
use crate::model::Continuity;
use crate::path::{Path, Segment};

/// Node-by-node interpolation `frac1 * a + frac2 * b` of two path lists.
///
/// Both lists must have the same number of paths, and corresponding paths the
/// same sequence of segment kinds. Continuity is kept where both agree and
/// falls back to Angle otherwise.
pub fn blend_paths(paths1: &[Path], paths2: &[Path], frac1: f64, frac2: f64) -> Result<Vec<Path>, MismatchError> {
    if paths1.len() != paths2.len() {
        return Err(MismatchError::new(format!(
            "path counts differ ({} vs {})",
            paths1.len(),
            paths2.len()
        )));
    }
    paths1
        .iter()
        .zip(paths2)
        .enumerate()
        .map(|(k, (a, b))| blend_path(a, b, frac1, frac2).map_err(|e| MismatchError::new(format!("path {}: {}", k, e.reason))))
        .collect()
}

pub fn blend_path(a: &Path, b: &Path, frac1: f64, frac2: f64) -> Result<Path, MismatchError> {
    if a.len() != b.len() {
        return Err(MismatchError::new(format!("node counts differ ({} vs {})", a.len(), b.len())));
    }
    let mix = |p: crate::model::Point, q: crate::model::Point| frac1 * p + frac2 * q;
    let mut out = Path::with_capacity(a.len());
    for i in 0..a.len() {
        let (sa, sb) = (a.segment(i), b.segment(i));
        let cont = if sa.continuity() == sb.continuity() { sa.continuity() } else { Continuity::Angle };
        let seg = match (sa, sb) {
            (Segment::Line { end: e1, .. }, Segment::Line { end: e2, .. }) => Segment::line(mix(e1, e2), cont),
            (
                Segment::Bezier { c1: a1, c2: a2, end: e1, .. },
                Segment::Bezier { c1: b1, c2: b2, end: e2, .. },
            ) => Segment::bezier(mix(a1, b1), mix(a2, b2), mix(e1, e2), cont),
            _ => return Err(MismatchError::new(format!("segment {} kinds differ", i))),
        };
        out.append_segment(seg);
    }
    if a.closed() && b.closed() {
        out.close_path();
    }
    Ok(out)
}

/// Coefficient-wise interpolation of two transformations.
pub fn blend_trafo(t1: &Trafo, t2: &Trafo, frac1: f64, frac2: f64) -> Trafo {
    Trafo::new(
        frac1 * t1.m11 + frac2 * t2.m11,
        frac1 * t1.m21 + frac2 * t2.m21,
        frac1 * t1.m12 + frac2 * t2.m12,
        frac1 * t1.m22 + frac2 * t2.m22,
        frac1 * t1.v1 + frac2 * t2.v1,
        frac1 * t1.v2 + frac2 * t2.v2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    #[test]
    fn midpoint_of_two_lines() {
        let a = Path::from_points([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let b = Path::from_points([Point::new(0.0, 10.0), Point::new(20.0, 10.0)]);
        let m = blend_paths(&[a], &[b], 0.5, 0.5).unwrap();
        assert_eq!(m[0].node_list(), vec![Point::new(0.0, 5.0), Point::new(15.0, 5.0)]);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let a = Path::from_points([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let mut b = Path::new();
        b.append_line(Point::new(0.0, 0.0), Continuity::Angle);
        b.append_bezier(Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(3.0, 0.0), Continuity::Angle);
        let err = blend_paths(&[a.clone()], &[b], 0.5, 0.5).unwrap_err();
        assert!(err.reason.contains("kinds differ"));
        assert!(blend_paths(&[a.clone()], &[a.clone(), a], 0.5, 0.5).is_err());
    }

    #[test]
    fn trafo_blend_is_linear() {
        let t = blend_trafo(&Trafo::IDENTITY, &Trafo::scale(3.0, 5.0), 0.5, 0.5);
        assert_eq!(t, Trafo::scale(2.0, 3.0));
    }
}
