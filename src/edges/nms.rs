//! Orientation-quantized non-maximum suppression on a magnitude plane.
//!
//! Each interior pixel carries one of 4 undirected orientation classes (see
//! [`crate::angle::quantize_orientation_4`]). A pixel keeps its magnitude
//! only if it is at least as large as both neighbours along its class
//! direction; weaker pixels and anything under `low` become `0`.
//!
//! The outermost 1-pixel frame is never kept, so neighbour lookups need no
//! bounds checks.
use crate::angle::{phase_degrees, quantize_orientation_4};
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Per-pixel 4-class orientation with a zeroed frame.
pub fn quantize_orientations(sx: &ImageF32, sy: &ImageF32) -> Vec<u8> {
    let (w, h) = (sx.w, sx.h);
    let mut classes = vec![0u8; w * h];
    if w < 3 || h < 3 {
        return classes;
    }
    for y in 1..h - 1 {
        let gx = sx.row(y);
        let gy = sy.row(y);
        for x in 1..w - 1 {
            classes[y * w + x] = quantize_orientation_4(phase_degrees(gx[x], gy[x]));
        }
    }
    classes
}

/// Suppress non-maximal magnitudes; returns a plane of kept magnitudes.
pub fn suppress_non_maxima(mag: &ImageF32, classes: &[u8], low: f32) -> ImageF32 {
    let (w, h) = (mag.w, mag.h);
    assert_eq!(classes.len(), w * h, "orientation classes must match magnitude");
    let mut out = ImageF32::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        let prev = mag.row(y - 1);
        let row = mag.row(y);
        let next = mag.row(y + 1);
        let dst = out.row_mut(y);
        for x in 1..w - 1 {
            let m = row[x];
            if m < low {
                continue;
            }
            let (n1, n2) = match classes[y * w + x] {
                0 => (row[x + 1], row[x - 1]),
                1 => (prev[x + 1], next[x - 1]),
                2 => (prev[x], next[x]),
                _ => (next[x + 1], prev[x - 1]),
            };
            if m >= n1 && m >= n2 {
                dst[x] = m;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ridge_peak_only() {
        // Vertical ridge at x = 3 with horizontal gradient direction.
        let profile = [0.0f32, 0.5, 1.0, 2.0, 1.0, 0.5, 0.0];
        let mag = ImageF32::from_vec(7, 5, (0..35).map(|i| profile[i % 7]).collect());
        let classes = vec![0u8; 35];
        let kept = suppress_non_maxima(&mag, &classes, 0.2);
        for y in 1..4 {
            for x in 0..7 {
                let expected = if x == 3 { 2.0 } else { 0.0 };
                assert_eq!(kept.get(x, y), expected, "({x},{y})");
            }
        }
        assert!(kept.row(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn low_threshold_suppresses_weak_plateaus() {
        let mag = ImageF32::from_vec(5, 5, vec![0.1; 25]);
        let classes = vec![2u8; 25];
        assert!(suppress_non_maxima(&mag, &classes, 0.2).data.iter().all(|&v| v == 0.0));
        let kept = suppress_non_maxima(&mag, &classes, 0.05);
        assert_eq!(kept.get(2, 2), 0.1, "equal neighbours are not suppressed");
    }

    #[test]
    fn frame_is_class_zero() {
        let sx = ImageF32::from_vec(4, 4, vec![0.0; 16]);
        let sy = ImageF32::from_vec(4, 4, vec![1.0; 16]);
        let classes = quantize_orientations(&sx, &sy);
        assert_eq!(classes[0], 0);
        assert_eq!(classes[5], 2);
    }
}
