// Centralized tolerances and helpers for robust sketch geometry (document units)

pub const EPS_POS: f64 = 1e-4;            // point coincidence threshold
pub const EPS_LEN: f64 = 1e-9;            // zero-length vector threshold
pub const EPS_FACE_AREA: f64 = 1e-6;      // tiny face area threshold (units^2)

// Default chordal deviation when polygonizing arcs
pub const ARC_FLATTEN_TOL: f64 = 1e-3;

// Adaptive flattening cap (segments per arc)
pub const MAX_ARC_SEGMENTS: usize = 1024;

/// Accepts a user supplied tolerance: finite and strictly positive.
#[inline] pub fn valid_tolerance(tol: f64) -> bool { tol.is_finite() && tol > 0.0 }
