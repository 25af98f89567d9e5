//! Small 2D filtering toolbox used by the edge detectors.
//!
//! - [`gaussian`]: separable blur with static kernels.
//! - [`median`]: square median filter for depth and float planes.
//!
//! Convolutions mirror at the border without repeating the edge sample
//! (`dcb|abcd|cba`), median windows replicate the edge sample. Sobel
//! derivatives live next to their consumer in [`crate::edges::grad`].
pub mod gaussian;
pub mod median;

pub use gaussian::{apply_separable, SeparableFilter, StaticSeparableFilter, GAUSSIAN_3TAP_SIGMA1};
pub use median::{median_blur_depth, median_blur_f32};

/// Mirror an out-of-range index back into `[0, n)` without repeating the edge.
#[inline]
pub(crate) fn reflect101(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - m;
    }
    m as usize
}

/// Clamp an index into `[0, n)`.
#[inline]
pub(crate) fn replicate(i: isize, n: usize) -> usize {
    i.clamp(0, n as isize - 1) as usize
}
