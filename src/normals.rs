//! Per-pixel surface normals from a depth frame.
//!
//! Each pixel fits a local plane to the 8 samples of a square ring (radius
//! `radius`, diagonals included) around it. Ring samples whose depth differs
//! from the centre by `difference_threshold` or more get zero weight, so the
//! fit never straddles a depth discontinuity. The 2×2 normal equations are
//! solved in integer arithmetic via Cramer's rule and the depth gradient is
//! lifted to a 3D normal using the focal lengths:
//!
//! ```text
//! n ∝ (fx·dx, fy·dy, −det·d)
//! ```
//!
//! Pixels beyond `distance_threshold`, within the ring margin, or whose fit
//! degenerates to a zero vector keep the zero "invalid" marker.
use crate::camera::CameraIntrinsics;
use crate::image::traits::impl_dense_view;
use crate::image::DepthImage;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Dense normal field co-indexed with its source depth frame.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalField {
    pub w: usize,
    pub h: usize,
    pub data: Vec<Vector3<f32>>,
}

impl NormalField {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![Vector3::zeros(); w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Vector3<f32> {
        self.data[y * self.w + x]
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|n| **n != Vector3::zeros()).count()
    }
}

impl_dense_view!(NormalField, Vector3<f32>);

/// Knobs of the bilateral plane fit.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalParams {
    /// Ring radius in pixels.
    pub radius: usize,
    /// Pixels at or beyond this depth (mm) get no normal.
    pub distance_threshold: u16,
    /// Ring samples differing by this much (mm) or more are ignored.
    pub difference_threshold: i64,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            radius: 5,
            distance_threshold: 2000,
            difference_threshold: 50,
        }
    }
}

/// Bilateral plane-fit normal estimator.
#[derive(Clone, Debug, Default)]
pub struct NormalEstimator {
    params: NormalParams,
}

impl NormalEstimator {
    pub fn new(params: NormalParams) -> Self {
        assert!(params.radius > 0, "normal ring radius must be positive");
        Self { params }
    }

    pub fn params(&self) -> &NormalParams {
        &self.params
    }

    /// Estimate normals; `intrinsics = None` uses the fallback focal length.
    pub fn estimate(
        &self,
        depth: &DepthImage,
        intrinsics: Option<&CameraIntrinsics>,
    ) -> NormalField {
        let k = intrinsics.copied().unwrap_or_else(CameraIntrinsics::fallback);
        k.assert_valid();
        let (w, h) = (depth.w, depth.h);
        let mut field = NormalField::new(w, h);
        let r = self.params.radius;
        // The upper bound stops one short of the full margin on the far side.
        if w < 2 * r + 2 || h < 2 * r + 2 {
            return field;
        }

        let fill_row = |y: usize, out: &mut [Vector3<f32>]| {
            if y < r || y >= h - r - 1 {
                return;
            }
            for (x, n) in out.iter_mut().enumerate().take(w - r - 1).skip(r) {
                *n = self.fit_pixel(depth, x, y, k.fx, k.fy);
            }
        };

        #[cfg(feature = "parallel")]
        field
            .data
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
        #[cfg(not(feature = "parallel"))]
        field
            .data
            .chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));

        field
    }

    fn fit_pixel(&self, depth: &DepthImage, x: usize, y: usize, fx: f32, fy: f32) -> Vector3<f32> {
        let d = depth.get(x, y);
        if d >= self.params.distance_threshold {
            return Vector3::zeros();
        }
        let d = d as i64;
        let r = self.params.radius as i64;
        let mut acc = PlaneAccumulator::default();
        for (i, j) in ring_offsets(r) {
            let sx = (x as i64 + i) as usize;
            let sy = (y as i64 + j) as usize;
            let delta = depth.get(sx, sy) as i64 - d;
            acc.add(delta, i, j, self.params.difference_threshold);
        }
        acc.solve(d, fx, fy)
    }
}

/// The 8 ring offsets `(column, row)` in scan order.
fn ring_offsets(r: i64) -> [(i64, i64); 8] {
    [
        (-r, -r),
        (0, -r),
        (r, -r),
        (-r, 0),
        (r, 0),
        (-r, r),
        (0, r),
        (r, r),
    ]
}

#[derive(Default)]
struct PlaneAccumulator {
    a00: i64,
    a01: i64,
    a11: i64,
    b0: i64,
    b1: i64,
}

impl PlaneAccumulator {
    #[inline]
    fn add(&mut self, delta: i64, i: i64, j: i64, threshold: i64) {
        let f = i64::from(delta.abs() < threshold);
        let fi = f * i;
        let fj = f * j;
        self.a00 += fi * i;
        self.a01 += fi * j;
        self.a11 += fj * j;
        self.b0 += fi * delta;
        self.b1 += fj * delta;
    }

    fn solve(&self, d: i64, fx: f32, fy: f32) -> Vector3<f32> {
        let det = self.a00 * self.a11 - self.a01 * self.a01;
        let ddx = self.a11 * self.b0 - self.a01 * self.b1;
        let ddy = -self.a01 * self.b0 + self.a00 * self.b1;

        let n = Vector3::new(fx * ddx as f32, fy * ddy as f32, -(det * d) as f32);
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            Vector3::zeros()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(w: usize, h: usize, f: impl Fn(usize, usize) -> u16) -> DepthImage {
        DepthImage::from_fn(w, h, f)
    }

    #[test]
    fn frontal_plane_faces_camera() {
        let depth = plane(32, 24, |_, _| 800);
        let normals = NormalEstimator::default().estimate(&depth, None);
        for y in 0..24 {
            for x in 0..32 {
                let n = normals.get(x, y);
                let interior = (5..32 - 6).contains(&x) && (5..24 - 6).contains(&y);
                if interior {
                    assert!((n - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6, "({x},{y}) {n:?}");
                } else {
                    assert_eq!(n, Vector3::zeros(), "margin pixel ({x},{y}) must stay invalid");
                }
            }
        }
    }

    #[test]
    fn far_plane_is_invalid() {
        let depth = plane(20, 20, |_, _| 2000);
        let normals = NormalEstimator::default().estimate(&depth, None);
        assert_eq!(normals.valid_count(), 0);
    }

    #[test]
    fn slanted_plane_tilts_against_the_slope() {
        let k = CameraIntrinsics::new(500.0, 500.0, 16.0, 16.0);
        let depth = plane(32, 32, |x, _| 900 + 2 * x as u16);
        let normals = NormalEstimator::default().estimate(&depth, Some(&k));
        let n = normals.get(16, 16);
        assert!((n.norm() - 1.0).abs() < 1e-5);
        assert!(n.x > 0.0 && n.z < 0.0 && n.y.abs() < 1e-6, "{n:?}");
        // dz/du = 2 mm per pixel at d = 932 mm → nx / -nz = fx·2 / d.
        let expected = 500.0 * 2.0 / 932.0;
        assert!((n.x / -n.z - expected).abs() < 1e-3);
    }

    #[test]
    fn discontinuity_does_not_smear_normals() {
        let depth = plane(40, 30, |x, _| if x < 20 { 700 } else { 900 });
        let normals = NormalEstimator::default().estimate(&depth, None);
        for x in 5..40 - 6 {
            let n = normals.get(x, 15);
            assert!((n - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6, "x={x} {n:?}");
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let depth = plane(48, 40, |x, y| 600 + ((x * 7 + y * 13) % 40) as u16);
        let est = NormalEstimator::default();
        let k = CameraIntrinsics::new(520.0, 515.0, 24.0, 20.0);
        let a = est.estimate(&depth, Some(&k));
        let b = est.estimate(&depth, Some(&k));
        assert_eq!(a, b);
    }
}
