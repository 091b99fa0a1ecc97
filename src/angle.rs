//! Hue-angle utilities (degrees) used across the overlay pipeline.

/// Full turn in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Normalizes an angle in degrees into the range [0, 360).
#[inline]
pub fn normalize_hue(deg: f64) -> f64 {
    let norm = deg.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if norm >= FULL_TURN {
        0.0
    } else {
        norm
    }
}

/// Signed difference `a - b` wrapped into [-180, 180).
#[inline]
pub fn hue_difference(a: f64, b: f64) -> f64 {
    let d = (a - b + 180.0).rem_euclid(FULL_TURN) - 180.0;
    if d >= 180.0 {
        d - FULL_TURN
    } else {
        d
    }
}

/// Unsigned angular distance between two hues, in [0, 180].
#[inline]
pub fn hue_distance(a: f64, b: f64) -> f64 {
    hue_difference(a, b).abs()
}

/// Rotates a point in the chromatic (x, y) plane by `deg` degrees.
#[inline]
pub fn rotate_xy(x: f64, y: f64, deg: f64) -> (f64, f64) {
    let (s, c) = deg.to_radians().sin_cos();
    (c * x - s * y, s * x + c * y)
}
