// Centralized tolerances and helpers for robust geometry

pub const EPS_POS: f64 = 1e-9;            // point coincidence threshold
pub const EPS_LEN: f64 = 1e-12;           // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // denominator guard for ratios
pub const EPS_PARAM: f64 = 1e-9;          // parameter slack when snapping t to 0/1

// Nearest point search: coarse samples per cubic, then refinement steps
pub const NEAREST_SAMPLES: usize = 32;
pub const NEAREST_REFINE_STEPS: usize = 24;

// Arc-length flattening
pub const ARC_FLATNESS: f64 = 0.05;
pub const MAX_FLATTEN_DEPTH: u32 = 16;

#[inline] pub fn clamp01(x: f64) -> f64 { x.max(0.0).min(1.0) }
#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }
#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }

#[inline]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPS_DENOM { fallback } else { num / den }
}

// Continuity guessing: relative collinearity and handle-length slack
pub const GUESS_COLLINEAR_EPS: f64 = 1e-6;
pub const GUESS_LENGTH_EPS: f64 = 1e-6;
