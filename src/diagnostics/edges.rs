use super::TimingBreakdown;
use crate::edges::DepthEdges;
use serde::{Deserialize, Serialize};

/// Counts describing one depth edge extraction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeReport {
    pub width: usize,
    pub height: usize,
    pub valid_depth: usize,
    pub valid_normals: usize,
    pub curvature_edges: usize,
    pub occlusion_edges: usize,
    pub edges: usize,
    pub timing: TimingBreakdown,
}

impl EdgeReport {
    pub fn from_edges(result: &DepthEdges) -> Self {
        Self {
            width: result.edges.w,
            height: result.edges.h,
            valid_depth: result.filtered_depth.valid_count(),
            valid_normals: result.normals.valid_count(),
            curvature_edges: result.curvature.count(),
            occlusion_edges: result.occlusion.count(),
            edges: result.edges.count(),
            timing: result.timing.clone(),
        }
    }
}
