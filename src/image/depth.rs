//! Owned 16-bit depth frame in millimetres.
//!
//! A sample of `0` means the sensor produced no return for that pixel.
use super::traits::impl_dense_view;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthImage {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Row-major depth samples (mm)
    pub data: Vec<u16>,
}

impl DepthImage {
    /// All-invalid frame of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// Wrap raw millimetre samples. Panics when the length does not match.
    pub fn from_vec(w: usize, h: usize, data: Vec<u16>) -> Self {
        assert_eq!(data.len(), w * h, "depth buffer size mismatch");
        Self { w, h, data }
    }

    /// Convert signed 32-bit samples, saturating into the `u16` range.
    ///
    /// Negative samples are treated as missing returns.
    pub fn from_i32(w: usize, h: usize, data: &[i32]) -> Self {
        assert_eq!(data.len(), w * h, "depth buffer size mismatch");
        let data = data
            .iter()
            .map(|&d| d.clamp(0, u16::MAX as i32) as u16)
            .collect();
        Self { w, h, data }
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> u16) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self { w, h, data }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u16) {
        self.data[y * self.w + x] = v;
    }

    /// Number of pixels carrying a depth return.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&d| d > 0).count()
    }
}

impl_dense_view!(DepthImage, u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_i32_saturates_into_u16() {
        let depth = DepthImage::from_i32(4, 1, &[-5, 70000, 1234, 0]);
        assert_eq!(depth.data, vec![0, 65535, 1234, 0]);
        assert_eq!(depth.valid_count(), 2);
    }

    #[test]
    #[should_panic(expected = "depth buffer size mismatch")]
    fn from_i32_rejects_wrong_length() {
        let _ = DepthImage::from_i32(2, 2, &[1, 2, 3]);
    }
}
