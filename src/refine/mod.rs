//! Pose refinement against a reference depth frame.
//!
//! The `refine` module turns coarse object-pose hypotheses into aligned poses:
//!
//! - [`render`] rasterizes the object mesh into depth frames at candidate
//!   poses,
//! - [`cloud`] back-projects depth frames into camera-frame point clouds,
//! - [`scene`] organizes the reference frame for projective correspondence
//!   search,
//! - [`icp`] runs point-to-plane ICP of a rendered cloud against the scene.
//!
//! [`PoseRefiner`] ties these together: it owns the reference frame, its edge
//! map and scene, and refines batches of candidate poses through a
//! [`ComputeBackend`]. [`CpuBackend`] is the reference implementation.

pub mod backend;
pub mod cloud;
pub mod icp;
pub mod mesh;
pub mod params;
pub mod render;
pub mod scene;
pub mod session;
mod types;

pub use backend::{ComputeBackend, CpuBackend};
pub use cloud::{depth_to_cloud, PointCloud};
pub use icp::{point_to_plane_icp, IcpCriteria};
pub use mesh::Mesh;
pub use params::RefineParams;
pub use render::render_depth;
pub use scene::{Scene, SceneSample};
pub use session::PoseRefiner;
pub use types::{Pose, RegistrationResult};
