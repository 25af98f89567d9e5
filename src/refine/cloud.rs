//! Unorganized point clouds (metres, camera frame).
use crate::camera::CameraIntrinsics;
use crate::image::DepthImage;
use nalgebra::{Matrix4, Point3, Vector3};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Vector3<f32>>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Apply a rigid transform to every point in place.
    pub fn transform(&mut self, t: &Matrix4<f32>) {
        for p in self.points.iter_mut() {
            *p = t.transform_point(&Point3::from(*p)).coords;
        }
    }
}

/// Back-project every depth return: `z = d / 1000`, `x = (u − cx)·z/fx`,
/// `y = (v − cy)·z/fy`. Row-major order, missing samples skipped.
pub fn depth_to_cloud(depth: &DepthImage, k: &CameraIntrinsics) -> PointCloud {
    let mut points = Vec::with_capacity(depth.valid_count());
    for v in 0..depth.h {
        for u in 0..depth.w {
            let d = depth.get(u, v);
            if d == 0 {
                continue;
            }
            points.push(k.back_project(u as f32, v as f32, d as f32 / 1000.0));
        }
    }
    PointCloud { points }
}
