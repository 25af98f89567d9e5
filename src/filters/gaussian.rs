use super::reflect101;
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order, odd length).
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_3TAP_SIGMA1
    }
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// 3-tap Gaussian with σ = 1: `exp(-x²/2)` at `x ∈ {-1, 0, 1}`, normalised.
pub const GAUSSIAN_3TAP_SIGMA1: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.274_068_62, 0.451_862_76, 0.274_068_62]);

/// Apply `filter` horizontally then vertically with mirrored borders.
pub fn apply_separable(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    assert!(taps.len() % 2 == 1, "separable filter needs an odd tap count");
    let (w, h) = (src.w, src.h);
    if w == 0 || h == 0 {
        return src.clone();
    }
    let half = (taps.len() / 2) as isize;

    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let src_row = src.row(y);
        let dst = tmp.row_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &t) in taps.iter().enumerate() {
                let sx = reflect101(x as isize + k as isize - half, w);
                acc += t * src_row[sx];
            }
            *out = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let dst = out.row_mut(y);
        for (k, &t) in taps.iter().enumerate() {
            let sy = reflect101(y as isize + k as isize - half, h);
            let src_row = tmp.row(sy);
            for (d, &s) in dst.iter_mut().zip(src_row) {
                *d += t * s;
            }
        }
    }
    out
}
