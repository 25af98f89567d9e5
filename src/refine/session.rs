//! Batched refinement session over one reference depth frame.
//!
//! Construction runs edge extraction on the reference frame and builds the
//! projective scene once. Each [`PoseRefiner::refine`] call then walks the
//! candidate poses in chunks of `batch_size`:
//!
//! 1. render every pose of the chunk at the working resolution (one backend
//!    call per chunk),
//! 2. per slot, in parallel: back-project the rendered frame, run a single
//!    unrestricted ICP update unless the candidates are already depth
//!    aligned, then the bounded refinement ICP on the coarsely moved cloud,
//! 3. compose `refine · coarse · initial` and store the result at the
//!    candidate's index.
use super::backend::{ComputeBackend, CpuBackend};
use super::icp::IcpCriteria;
use super::mesh::Mesh;
use super::params::RefineParams;
use super::scene::Scene;
use super::types::{Pose, RegistrationResult};
use crate::camera::CameraIntrinsics;
use crate::diagnostics::{elapsed_ms, TimingBreakdown};
use crate::edges::{DepthEdgeExtractor, DepthEdges};
use crate::image::{DepthImage, Mask};
use crate::normals::NormalField;
use log::debug;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub struct PoseRefiner {
    params: RefineParams,
    depth: DepthImage,
    intrinsics: CameraIntrinsics,
    edges: DepthEdges,
    scene: Scene,
    mesh: Mesh,
    backend: Box<dyn ComputeBackend>,
    timing: TimingBreakdown,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl PoseRefiner {
    /// Session on the CPU backend.
    pub fn new(
        depth: DepthImage,
        intrinsics: CameraIntrinsics,
        mesh: Mesh,
        params: RefineParams,
    ) -> Self {
        Self::with_backend(depth, intrinsics, mesh, params, Box::new(CpuBackend))
    }

    /// Panics on a zero batch size, an empty frame or invalid intrinsics.
    pub fn with_backend(
        depth: DepthImage,
        intrinsics: CameraIntrinsics,
        mesh: Mesh,
        params: RefineParams,
        backend: Box<dyn ComputeBackend>,
    ) -> Self {
        assert!(params.batch_size > 0, "batch_size must be positive");
        assert!(depth.w > 0 && depth.h > 0, "reference depth frame is empty");
        intrinsics.assert_valid();
        let total_start = Instant::now();
        let mut timing = TimingBreakdown::default();

        let extractor = DepthEdgeExtractor::new(params.edges.clone());
        let edges = extractor.extract_detailed(&depth, Some(&intrinsics));
        timing.extend_prefixed("edges", &edges.timing);

        let stage = Instant::now();
        let scene = backend.build_scene(&depth, &intrinsics);
        timing.record_since("scene", stage);
        timing.total_ms = elapsed_ms(total_start);

        #[cfg(feature = "parallel")]
        let pool = build_pool(params.batch_size);

        debug!(
            "PoseRefiner init backend={} w={} h={} edges={} scene_valid={} batch_size={} ms={:.3}",
            backend.name(),
            depth.w,
            depth.h,
            edges.edges.count(),
            scene.valid_count(),
            params.batch_size,
            timing.total_ms
        );

        Self {
            params,
            depth,
            intrinsics,
            edges,
            scene,
            mesh,
            backend,
            timing,
            #[cfg(feature = "parallel")]
            pool,
        }
    }

    pub fn params(&self) -> &RefineParams {
        &self.params
    }

    pub fn depth(&self) -> &DepthImage {
        &self.depth
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn normals(&self) -> &NormalField {
        &self.edges.normals
    }

    pub fn edges(&self) -> &Mask {
        &self.edges.edges
    }

    /// Normals, both edge classes and stage timings of the reference frame.
    pub fn edge_details(&self) -> &DepthEdges {
        &self.edges
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Timings of the session setup.
    pub fn timing(&self) -> &TimingBreakdown {
        &self.timing
    }

    /// Refine every candidate pose; the output is index-aligned with `poses`.
    ///
    /// Candidates are rendered at `1 / down_sample` of the reference
    /// resolution. With `depth_aligned` the coarse ICP phase is skipped.
    /// Panics unless `down_sample` divides both frame dimensions.
    pub fn refine(&self, poses: &[Pose], down_sample: usize, depth_aligned: bool) -> Vec<RegistrationResult> {
        self.refine_timed(poses, down_sample, depth_aligned).0
    }

    /// [`refine`](Self::refine) plus per-chunk timings.
    pub fn refine_timed(
        &self,
        poses: &[Pose],
        down_sample: usize,
        depth_aligned: bool,
    ) -> (Vec<RegistrationResult>, TimingBreakdown) {
        assert!(
            down_sample > 0 && self.depth.w % down_sample == 0 && self.depth.h % down_sample == 0,
            "down_sample {} must divide the frame size {}x{}",
            down_sample,
            self.depth.w,
            self.depth.h
        );
        let total_start = Instant::now();
        let mut timing = TimingBreakdown::default();
        let width = self.depth.w / down_sample;
        let height = self.depth.h / down_sample;
        let intrinsics = self.intrinsics.scaled(down_sample);
        let coarse = self.params.coarse_criteria();
        let fine = self.params.refine_criteria();

        let mut results = Vec::with_capacity(poses.len());
        for (chunk_idx, chunk) in poses.chunks(self.params.batch_size).enumerate() {
            let stage = Instant::now();
            let rendered = self.backend.render(&self.mesh, chunk, width, height, &intrinsics);
            assert_eq!(
                rendered.len(),
                chunk.len(),
                "backend returned {} frames for {} poses",
                rendered.len(),
                chunk.len()
            );
            let render_ms = elapsed_ms(stage);

            let stage = Instant::now();
            let slot = |(pose, depth): (&Pose, &DepthImage)| {
                self.refine_slot(pose, depth, &intrinsics, depth_aligned, &coarse, &fine)
            };
            let chunk_results = self.run_chunk(chunk, &rendered, slot);
            let icp_ms = elapsed_ms(stage);

            debug!(
                "PoseRefiner chunk={} poses={} render_ms={:.3} icp_ms={:.3}",
                chunk_idx,
                chunk.len(),
                render_ms,
                icp_ms
            );
            timing.push(format!("chunk{chunk_idx}.render"), render_ms);
            timing.push(format!("chunk{chunk_idx}.icp"), icp_ms);
            results.extend(chunk_results);
        }
        timing.total_ms = elapsed_ms(total_start);
        (results, timing)
    }

    #[cfg(feature = "parallel")]
    fn run_chunk<F>(&self, chunk: &[Pose], rendered: &[DepthImage], slot: F) -> Vec<RegistrationResult>
    where
        F: Fn((&Pose, &DepthImage)) -> RegistrationResult + Send + Sync,
    {
        let work = || chunk.par_iter().zip(rendered.par_iter()).map(&slot).collect::<Vec<_>>();
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_chunk<F>(&self, chunk: &[Pose], rendered: &[DepthImage], slot: F) -> Vec<RegistrationResult>
    where
        F: Fn((&Pose, &DepthImage)) -> RegistrationResult,
    {
        chunk.iter().zip(rendered.iter()).map(slot).collect()
    }

    fn refine_slot(
        &self,
        initial: &Pose,
        rendered: &DepthImage,
        intrinsics: &CameraIntrinsics,
        depth_aligned: bool,
        coarse: &IcpCriteria,
        fine: &IcpCriteria,
    ) -> RegistrationResult {
        let mut cloud = self.backend.depth_to_cloud(rendered, intrinsics);
        let mut pose = *initial;
        if !depth_aligned {
            let step = self.backend.point_to_plane_icp(&cloud, &self.scene, coarse);
            cloud.transform(&step.transformation);
            pose = step.transformation * pose;
        }
        let step = self.backend.point_to_plane_icp(&cloud, &self.scene, fine);
        RegistrationResult {
            transformation: step.transformation * pose,
            ..step
        }
    }
}

#[cfg(feature = "parallel")]
fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("PoseRefiner: falling back to the global rayon pool: {e}");
            None
        }
    }
}
