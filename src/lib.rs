#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod camera;
pub mod config;
pub mod diagnostics;
pub mod edges;
pub mod image;
pub mod normals;
pub mod refine;

// Building blocks of the edge pipeline, public for tools and tests.
pub mod angle;
pub mod filters;

// --- High-level re-exports -------------------------------------------------

// Edge extraction entry points.
pub use crate::camera::CameraIntrinsics;
pub use crate::edges::{DepthEdgeExtractor, DepthEdges, EdgeParams};
pub use crate::image::{DepthImage, Mask};
pub use crate::normals::{NormalEstimator, NormalField, NormalParams};

// Pose refinement session and backends.
pub use crate::refine::{
    ComputeBackend, CpuBackend, IcpCriteria, Mesh, Pose, PoseRefiner, RefineParams,
    RegistrationResult,
};

// Reports for tools.
pub use crate::diagnostics::{EdgeReport, RefinementReport, TimingBreakdown};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use pose_refine::prelude::*;
/// use nalgebra::{Matrix4, Vector3};
///
/// # fn main() {
/// let k = CameraIntrinsics::new(572.4, 573.6, 325.3, 242.0);
/// let depth = DepthImage::new(640, 480);
/// let mesh = Mesh::cuboid(Vector3::new(0.1, 0.1, 0.1));
///
/// let refiner = PoseRefiner::new(depth, k, mesh, RefineParams::default());
/// println!("edge pixels: {}", refiner.edges().count());
///
/// let candidates = vec![Matrix4::identity(); 16];
/// for r in refiner.refine(&candidates, 2, false) {
///     println!("fitness={:.3} rmse={:.4}", r.fitness, r.inlier_rmse);
/// }
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        CameraIntrinsics, DepthEdgeExtractor, DepthImage, EdgeParams, Mesh, PoseRefiner,
        RefineParams, RegistrationResult,
    };
}
