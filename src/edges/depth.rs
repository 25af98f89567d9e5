//! Depth edge map: curvature edges OR occlusion edges.
use super::curvature::{CurvatureEdgeDetector, CurvatureParams};
use super::occlusion::{OcclusionEdgeDetector, OcclusionParams};
use crate::camera::CameraIntrinsics;
use crate::diagnostics::{elapsed_ms, TimingBreakdown};
use crate::filters::median_blur_depth;
use crate::image::{DepthImage, Mask};
use crate::normals::{NormalEstimator, NormalField, NormalParams};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Parameters for the full depth edge extraction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Median window applied to the depth frame before anything else;
    /// `None` or `Some(1)` disables the pre-filter.
    pub depth_median_ksize: Option<usize>,
    pub normals: NormalParams,
    pub curvature: CurvatureParams,
    pub occlusion: OcclusionParams,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            depth_median_ksize: Some(5),
            normals: NormalParams::default(),
            curvature: CurvatureParams::default(),
            occlusion: OcclusionParams::default(),
        }
    }
}

impl EdgeParams {
    /// Reject settings the detectors would panic on.
    pub fn validate(&self) -> Result<(), String> {
        if self.normals.radius == 0 {
            return Err("normals.radius must be positive".to_string());
        }
        if let Some(k) = self.depth_median_ksize {
            if k > 1 && k % 2 == 0 {
                return Err(format!("depth_median_ksize must be odd, got {k}"));
            }
        }
        let k = self.curvature.median_ksize;
        if k % 2 == 0 {
            return Err(format!("curvature.median_ksize must be odd, got {k}"));
        }
        Ok(())
    }
}

/// Everything produced by one extraction pass.
#[derive(Clone, Debug)]
pub struct DepthEdges {
    /// Depth after the optional median pre-filter.
    pub filtered_depth: DepthImage,
    pub normals: NormalField,
    pub curvature: Mask,
    pub occlusion: Mask,
    /// `curvature | occlusion`
    pub edges: Mask,
    pub timing: TimingBreakdown,
}

#[derive(Clone, Debug, Default)]
pub struct DepthEdgeExtractor {
    params: EdgeParams,
    normals: NormalEstimator,
    curvature: CurvatureEdgeDetector,
    occlusion: OcclusionEdgeDetector,
}

impl DepthEdgeExtractor {
    pub fn new(params: EdgeParams) -> Self {
        let normals = NormalEstimator::new(params.normals.clone());
        let curvature = CurvatureEdgeDetector::new(params.curvature.clone());
        let occlusion = OcclusionEdgeDetector::new(params.occlusion.clone());
        Self {
            params,
            normals,
            curvature,
            occlusion,
        }
    }

    pub fn params(&self) -> &EdgeParams {
        &self.params
    }

    /// Edge mask only.
    pub fn extract(&self, depth: &DepthImage, intrinsics: Option<&CameraIntrinsics>) -> Mask {
        self.extract_detailed(depth, intrinsics).edges
    }

    /// Run every stage and keep the intermediate products.
    ///
    /// Missing intrinsics fall back to the default focal length for both the
    /// normals and the occlusion step projection.
    pub fn extract_detailed(
        &self,
        depth: &DepthImage,
        intrinsics: Option<&CameraIntrinsics>,
    ) -> DepthEdges {
        let k = intrinsics.copied().unwrap_or_else(CameraIntrinsics::fallback);
        let total_start = Instant::now();
        let mut timing = TimingBreakdown::default();

        let stage = Instant::now();
        let filtered_depth = match self.params.depth_median_ksize {
            Some(ksize) if ksize > 1 => median_blur_depth(depth, ksize),
            _ => depth.clone(),
        };
        timing.record_since("depth_median", stage);

        let stage = Instant::now();
        let normals = self.normals.estimate(&filtered_depth, Some(&k));
        timing.record_since("normals", stage);

        let stage = Instant::now();
        let curvature = self.curvature.detect(&normals);
        timing.record_since("curvature_edges", stage);

        let stage = Instant::now();
        let occlusion = self.occlusion.detect(&filtered_depth, &normals, &k);
        timing.record_since("occlusion_edges", stage);

        let edges = curvature.or(&occlusion);
        timing.total_ms = elapsed_ms(total_start);
        debug!(
            "DepthEdgeExtractor w={} h={} normals={} curvature={} occlusion={} total_ms={:.3}",
            depth.w,
            depth.h,
            normals.valid_count(),
            curvature.count(),
            occlusion.count(),
            timing.total_ms
        );

        DepthEdges {
            filtered_depth,
            normals,
            curvature,
            occlusion,
            edges,
            timing,
        }
    }
}
