//! Projective scene model for ICP correspondence search.
//!
//! The reference depth frame is back-projected into an organized grid of
//! camera-frame points with per-pixel normals. A query point is associated
//! with the scene sample at the pixel it projects to, so lookups are O(1).
use crate::camera::CameraIntrinsics;
use crate::image::DepthImage;
use nalgebra::Vector3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scene sample matched to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSample {
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
}

/// Organized scene cloud (metres) with normals facing the camera.
///
/// A zero normal marks a pixel that cannot serve as a correspondence.
#[derive(Clone, Debug)]
pub struct Scene {
    w: usize,
    h: usize,
    intrinsics: CameraIntrinsics,
    points: Vec<Vector3<f32>>,
    normals: Vec<Vector3<f32>>,
}

impl Scene {
    pub fn from_depth(depth: &DepthImage, intrinsics: &CameraIntrinsics) -> Self {
        intrinsics.assert_valid();
        let (w, h) = (depth.w, depth.h);
        let mut points = vec![Vector3::zeros(); w * h];
        for (i, p) in points.iter_mut().enumerate() {
            let d = depth.data[i];
            if d > 0 {
                let (x, y) = (i % w, i / w);
                *p = intrinsics.back_project(x as f32, y as f32, d as f32 / 1000.0);
            }
        }

        let mut normals = vec![Vector3::zeros(); w * h];
        let fill_row = |y: usize, out: &mut [Vector3<f32>]| {
            if y == 0 || y + 1 >= h {
                return;
            }
            for (x, n) in out.iter_mut().enumerate().take(w.saturating_sub(1)).skip(1) {
                *n = central_difference_normal(&points, w, x, y);
            }
        };
        #[cfg(feature = "parallel")]
        normals
            .par_chunks_mut(w.max(1))
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
        #[cfg(not(feature = "parallel"))]
        normals
            .chunks_mut(w.max(1))
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));

        Self {
            w,
            h,
            intrinsics: *intrinsics,
            points,
            normals,
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn valid_count(&self) -> usize {
        self.normals
            .iter()
            .filter(|n| **n != Vector3::zeros())
            .count()
    }

    /// Sample at pixel `(x, y)` if it carries a usable normal.
    pub fn sample(&self, x: usize, y: usize) -> Option<SceneSample> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let idx = y * self.w + x;
        let normal = self.normals[idx];
        if normal == Vector3::zeros() {
            return None;
        }
        Some(SceneSample {
            point: self.points[idx],
            normal,
        })
    }

    /// Projective association: the sample under the pixel `p` projects to.
    pub fn lookup(&self, p: &Vector3<f32>) -> Option<SceneSample> {
        let (u, v) = self.intrinsics.project(p)?;
        let (u, v) = (u.round(), v.round());
        if !(u >= 0.0 && v >= 0.0) {
            return None;
        }
        self.sample(u as usize, v as usize)
    }
}

fn central_difference_normal(points: &[Vector3<f32>], w: usize, x: usize, y: usize) -> Vector3<f32> {
    let idx = y * w + x;
    let c = points[idx];
    let (l, r) = (points[idx - 1], points[idx + 1]);
    let (u, d) = (points[idx - w], points[idx + w]);
    if [c, l, r, u, d].iter().any(|p| p.z <= 0.0) {
        return Vector3::zeros();
    }
    let n = (r - l).cross(&(d - u));
    let len = n.norm();
    if len <= f32::EPSILON {
        return Vector3::zeros();
    }
    let n = n / len;
    if n.dot(&c) > 0.0 {
        -n
    } else {
        n
    }
}
