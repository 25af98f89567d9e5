use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// Rigid 4×4 transform, object (or source cloud) frame to camera frame.
pub type Pose = Matrix4<f32>;

/// Outcome of one registration.
///
/// For a raw solver call `transformation` is the delta aligning the source
/// cloud onto the scene; for a refined candidate it is the composed pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub transformation: Pose,
    /// Inlier correspondences divided by the source cloud size, in `[0, 1]`.
    pub fitness: f32,
    /// RMS point-to-plane residual over the inliers (metres).
    pub inlier_rmse: f32,
    /// Solver updates actually applied.
    pub iterations: usize,
}

impl RegistrationResult {
    /// Identity transform with zero fitness; used when nothing could be aligned.
    pub fn unaligned() -> Self {
        Self {
            transformation: Pose::identity(),
            fitness: 0.0,
            inlier_rmse: 0.0,
            iterations: 0,
        }
    }
}

impl Default for RegistrationResult {
    fn default() -> Self {
        Self::unaligned()
    }
}
