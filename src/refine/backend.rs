//! Compute backends behind the refinement session.
//!
//! A backend supplies the four heavy primitives of the refinement loop. The
//! session only talks to `dyn ComputeBackend`, so an accelerated
//! implementation can be selected at runtime without touching the
//! orchestration.
use super::cloud::{depth_to_cloud, PointCloud};
use super::icp::{point_to_plane_icp, IcpCriteria};
use super::mesh::Mesh;
use super::render::render_depth;
use super::scene::Scene;
use super::types::{Pose, RegistrationResult};
use crate::camera::CameraIntrinsics;
use crate::image::DepthImage;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &str;

    /// One depth frame (mm) per pose, in pose order.
    fn render(
        &self,
        mesh: &Mesh,
        poses: &[Pose],
        width: usize,
        height: usize,
        intrinsics: &CameraIntrinsics,
    ) -> Vec<DepthImage>;

    fn build_scene(&self, depth: &DepthImage, intrinsics: &CameraIntrinsics) -> Scene {
        Scene::from_depth(depth, intrinsics)
    }

    fn depth_to_cloud(&self, depth: &DepthImage, intrinsics: &CameraIntrinsics) -> PointCloud {
        depth_to_cloud(depth, intrinsics)
    }

    /// Align `source` onto `scene`; the result is the aligning delta.
    fn point_to_plane_icp(
        &self,
        source: &PointCloud,
        scene: &Scene,
        criteria: &IcpCriteria,
    ) -> RegistrationResult;
}

/// Reference implementation on the host CPU.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackend;

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn render(
        &self,
        mesh: &Mesh,
        poses: &[Pose],
        width: usize,
        height: usize,
        intrinsics: &CameraIntrinsics,
    ) -> Vec<DepthImage> {
        #[cfg(feature = "parallel")]
        let iter = poses.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = poses.iter();
        iter.map(|pose| render_depth(mesh, pose, width, height, intrinsics))
            .collect()
    }

    fn point_to_plane_icp(
        &self,
        source: &PointCloud,
        scene: &Scene,
        criteria: &IcpCriteria,
    ) -> RegistrationResult {
        point_to_plane_icp(source, scene, criteria)
    }
}
