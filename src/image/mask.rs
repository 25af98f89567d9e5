//! Binary per-pixel mask stored as `0`/`255` bytes.
use super::traits::impl_dense_view;

pub const MASK_ON: u8 = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl Mask {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x] != 0
    }

    #[inline]
    pub fn mark(&mut self, x: usize, y: usize) {
        self.data[y * self.w + x] = MASK_ON;
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Pixel-wise logical OR of two equally sized masks.
    pub fn or(&self, other: &Mask) -> Mask {
        assert!(
            self.w == other.w && self.h == other.h,
            "mask OR requires equal dimensions"
        );
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a | b)
            .collect();
        Mask {
            w: self.w,
            h: self.h,
            data,
        }
    }

    /// Coordinates `(x, y)` of every set pixel in row-major order.
    pub fn points(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..self.h {
            for x in 0..self.w {
                if self.is_set(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }
}

impl_dense_view!(Mask, u8);
