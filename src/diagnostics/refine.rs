use super::TimingBreakdown;
use crate::refine::RegistrationResult;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// Outcome for one candidate pose, before and after refinement.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseOutcome {
    pub index: usize,
    pub initial: Matrix4<f32>,
    pub result: RegistrationResult,
    /// Translation error w.r.t. a known ground truth, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_error_m: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_error_m: Option<f32>,
}

/// Summary of one batched refinement call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementReport {
    pub backend: String,
    pub batch_size: usize,
    pub down_sample: usize,
    pub depth_aligned: bool,
    pub poses: Vec<PoseOutcome>,
    pub timing: TimingBreakdown,
}

impl RefinementReport {
    /// Pose with the highest fitness, ties broken by the lower RMSE.
    pub fn best(&self) -> Option<&PoseOutcome> {
        self.poses.iter().max_by(|a, b| {
            a.result
                .fitness
                .total_cmp(&b.result.fitness)
                .then(b.result.inlier_rmse.total_cmp(&a.result.inlier_rmse))
        })
    }
}
