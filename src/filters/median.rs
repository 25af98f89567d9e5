//! Square median filters with replicated borders.
use super::replicate;
use crate::image::{DepthImage, ImageF32};

fn median_plane<T>(w: usize, h: usize, src: &[T], ksize: usize) -> Vec<T>
where
    T: Copy + PartialOrd,
{
    assert!(ksize % 2 == 1, "median kernel size must be odd");
    if w == 0 || h == 0 || ksize == 1 {
        return src.to_vec();
    }
    let half = (ksize / 2) as isize;
    let mid = ksize * ksize / 2;
    let mut window: Vec<T> = Vec::with_capacity(ksize * ksize);
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h as isize {
        for x in 0..w as isize {
            window.clear();
            for dy in -half..=half {
                let row = replicate(y + dy, h) * w;
                for dx in -half..=half {
                    window.push(src[row + replicate(x + dx, w)]);
                }
            }
            let (_, m, _) = window.select_nth_unstable_by(mid, |a, b| {
                a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
            });
            out.push(*m);
        }
    }
    out
}

/// Median filter over a depth frame. Missing samples (0) take part like any
/// other value, so isolated holes get filled and isolated returns vanish.
pub fn median_blur_depth(depth: &DepthImage, ksize: usize) -> DepthImage {
    DepthImage::from_vec(depth.w, depth.h, median_plane(depth.w, depth.h, &depth.data, ksize))
}

pub fn median_blur_f32(img: &ImageF32, ksize: usize) -> ImageF32 {
    ImageF32::from_vec(img.w, img.h, median_plane(img.w, img.h, &img.data, ksize))
}
