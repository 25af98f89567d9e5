use super::icp::IcpCriteria;
use crate::edges::EdgeParams;
use serde::{Deserialize, Serialize};

/// Settings of a [`PoseRefiner`](super::PoseRefiner) session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Candidates rendered and refined together; also the worker count.
    pub batch_size: usize,
    /// Rejection distance (metres) of the refinement phase.
    pub max_correspondence_distance: f32,
    /// Updates allowed in the refinement phase.
    pub max_iterations: usize,
    /// Updates allowed in the coarse phase of unaligned candidates.
    pub coarse_iterations: usize,
    pub relative_fitness: f32,
    pub relative_rmse: f32,
    /// Edge extraction run once on the reference frame.
    pub edges: EdgeParams,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            batch_size: 8,
            max_correspondence_distance: 0.1,
            max_iterations: 30,
            coarse_iterations: 1,
            relative_fitness: 1e-5,
            relative_rmse: 1e-5,
            edges: EdgeParams::default(),
        }
    }
}

impl RefineParams {
    /// Coarse phase: every projective pair is a correspondence.
    pub fn coarse_criteria(&self) -> IcpCriteria {
        IcpCriteria {
            relative_fitness: self.relative_fitness,
            relative_rmse: self.relative_rmse,
            max_iterations: self.coarse_iterations,
            max_correspondence_distance: f32::MAX,
        }
    }

    pub fn refine_criteria(&self) -> IcpCriteria {
        IcpCriteria {
            relative_fitness: self.relative_fitness,
            relative_rmse: self.relative_rmse,
            max_iterations: self.max_iterations,
            max_correspondence_distance: self.max_correspondence_distance,
        }
    }
}
