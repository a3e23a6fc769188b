// Centralized ingestion limits for region edits coming from the host

pub const MAX_REGIONS_PER_REQUEST: usize = 4_096;
pub const MAX_CURVES_PER_LOOP: usize = 20_000;
pub const MAX_HOLES_PER_REGION: usize = 1_024;

// Numeric bounds
pub const COORD_MIN: f64 = -1.0e9;
pub const COORD_MAX: f64 = 1.0e9;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }
