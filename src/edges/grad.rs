//! Sobel derivatives on float planes.
//!
//! - Correlates a 3×3 Sobel kernel with mirrored borders (`dcb|abcd|cba`), so
//!   a constant plane yields exactly zero everywhere including the frame.
//! - [`gradient_magnitude`] combines two derivative planes per pixel.
//!
//! Complexity: O(W·H) per pass.
use crate::filters::reflect101;
use crate::image::{ImageF32, ImageView, ImageViewMut};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Derivative direction of a Sobel pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SobelAxis {
    /// d/dx (columns)
    X,
    /// d/dy (rows)
    Y,
}

fn correlate3(l: &ImageF32, kernel: &Kernel3) -> ImageF32 {
    let (w, h) = (l.w, l.h);
    let mut out = ImageF32::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    for y in 0..h {
        let rows = [
            l.row(reflect101(y as isize - 1, h)),
            l.row(y),
            l.row(reflect101(y as isize + 1, h)),
        ];
        let dst = out.row_mut(y);
        for (x, px) in dst.iter_mut().enumerate() {
            let x_idx = [
                reflect101(x as isize - 1, w),
                x,
                reflect101(x as isize + 1, w),
            ];
            let mut sum = 0.0;
            for (row, k_row) in rows.iter().zip(kernel) {
                sum += row[x_idx[0]] * k_row[0] + row[x_idx[1]] * k_row[1] + row[x_idx[2]] * k_row[2];
            }
            *px = sum;
        }
    }
    out
}

/// First-order Sobel derivative along `axis`.
pub fn sobel(l: &ImageF32, axis: SobelAxis) -> ImageF32 {
    match axis {
        SobelAxis::X => correlate3(l, &SOBEL_KERNEL_X),
        SobelAxis::Y => correlate3(l, &SOBEL_KERNEL_Y),
    }
}

/// Euclidean magnitude `sqrt(sx² + sy²)` per pixel.
pub fn gradient_magnitude(sx: &ImageF32, sy: &ImageF32) -> ImageF32 {
    assert!(sx.same_shape(sy), "gradient planes must match");
    let data = sx
        .data
        .iter()
        .zip(&sy.data)
        .map(|(&a, &b)| (a * a + b * b).sqrt())
        .collect();
    ImageF32::from_vec(sx.w, sx.h, data)
}
