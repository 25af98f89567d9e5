//! Angle utilities for gradient orientation handling.

/// Orientation of the vector `(x, y)` in degrees, range `[0, 360)`.
///
/// `(0, 0)` maps to `0`.
#[inline]
pub fn phase_degrees(x: f32, y: f32) -> f32 {
    let deg = y.atan2(x).to_degrees();
    let wrapped = if deg < 0.0 { deg + 360.0 } else { deg };
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Quantize an angle in degrees to one of 8 buckets (rounded to nearest, so
/// bucket `k` is centred on `k·45°`; values near 360° land in bucket 8) and
/// fold opposite directions together, yielding 4 undirected classes:
///
/// - `0`: horizontal gradient
/// - `1`: gradient along the 45° diagonal
/// - `2`: vertical gradient
/// - `3`: gradient along the 135° diagonal
#[inline]
pub fn quantize_orientation_4(angle_deg: f32) -> u8 {
    let bucket = (angle_deg * (8.0 / 360.0)).round().clamp(0.0, 255.0) as u8;
    bucket & 3
}
