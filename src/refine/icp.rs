//! Projective point-to-plane ICP.
//!
//! Each iteration associates every transformed source point with the scene
//! sample it projects onto, drops pairs farther apart than the rejection
//! distance, and solves the linearized point-to-plane problem
//!
//! ```text
//! r_i = (T·p_i − q_i) · n_i,   J_i = [ (T·p_i) × n_i ,  n_i ]
//! ```
//!
//! for a twist `[ω, t]` via the 6×6 normal equations (Cholesky, SVD fallback
//! for rank-deficient geometry such as a single plane). The update is
//! left-composed onto the running transform. Iteration stops after
//! `max_iterations` updates or once both fitness and RMSE change by less than
//! their relative thresholds.
use super::cloud::PointCloud;
use super::scene::Scene;
use super::types::RegistrationResult;
use log::{debug, warn};
use nalgebra::{Isometry3, Matrix4, Matrix6, Point3, Rotation3, Translation3, Vector3, Vector6};
use serde::{Deserialize, Serialize};

/// Convergence criteria plus the correspondence rejection distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpCriteria {
    pub relative_fitness: f32,
    pub relative_rmse: f32,
    pub max_iterations: usize,
    /// Pairs farther apart than this (metres) are not correspondences.
    pub max_correspondence_distance: f32,
}

impl Default for IcpCriteria {
    fn default() -> Self {
        Self {
            relative_fitness: 1e-5,
            relative_rmse: 1e-5,
            max_iterations: 30,
            max_correspondence_distance: 0.1,
        }
    }
}

#[derive(Default)]
struct LinearSystem {
    jtj: Matrix6<f64>,
    jtr: Vector6<f64>,
    residual_sq: f64,
    inliers: usize,
}

impl LinearSystem {
    fn fitness(&self, source_len: usize) -> f32 {
        if source_len == 0 {
            0.0
        } else {
            (self.inliers as f64 / source_len as f64) as f32
        }
    }

    fn rmse(&self) -> f32 {
        if self.inliers == 0 {
            0.0
        } else {
            (self.residual_sq / self.inliers as f64).sqrt() as f32
        }
    }
}

fn build_system(source: &PointCloud, scene: &Scene, transform: &Matrix4<f32>, max_dist: f32) -> LinearSystem {
    let mut sys = LinearSystem::default();
    for p in &source.points {
        let moved = transform.transform_point(&Point3::from(*p)).coords;
        let Some(sample) = scene.lookup(&moved) else {
            continue;
        };
        if (moved - sample.point).norm() > max_dist {
            continue;
        }
        let p64: Vector3<f64> = moved.cast();
        let n64: Vector3<f64> = sample.normal.cast();
        let q64: Vector3<f64> = sample.point.cast();
        let r = (p64 - q64).dot(&n64);
        let c = p64.cross(&n64);
        let j = Vector6::new(c.x, c.y, c.z, n64.x, n64.y, n64.z);
        sys.jtj += j * j.transpose();
        sys.jtr += j * r;
        sys.residual_sq += r * r;
        sys.inliers += 1;
    }
    sys
}

/// Solve `JᵀJ·x = −Jᵀr`; `None` when the system carries no information.
fn solve_twist(sys: &LinearSystem) -> Option<Vector6<f64>> {
    let rhs = -sys.jtr;
    let x = match sys.jtj.cholesky() {
        Some(chol) => chol.solve(&rhs),
        None => {
            let svd = sys.jtj.svd(true, true);
            let max_sv = svd.singular_values.max();
            if max_sv <= 0.0 {
                return None;
            }
            svd.solve(&rhs, max_sv * 1e-9).ok()?
        }
    };
    x.iter().all(|v| v.is_finite()).then_some(x)
}

fn twist_to_matrix(x: &Vector6<f64>) -> Matrix4<f32> {
    let rotation = Rotation3::new(Vector3::new(x[0], x[1], x[2]));
    let translation = Translation3::new(x[3], x[4], x[5]);
    Isometry3::from_parts(translation, rotation.into())
        .to_homogeneous()
        .cast()
}

/// Align `source` onto `scene`, starting from the identity.
pub fn point_to_plane_icp(source: &PointCloud, scene: &Scene, criteria: &IcpCriteria) -> RegistrationResult {
    if source.is_empty() {
        return RegistrationResult::unaligned();
    }
    let max_dist = criteria.max_correspondence_distance;
    let mut transform = Matrix4::identity();
    let mut sys = build_system(source, scene, &transform, max_dist);
    let mut iterations = 0;

    while iterations < criteria.max_iterations {
        if sys.inliers == 0 {
            break;
        }
        let Some(x) = solve_twist(&sys) else {
            warn!("point_to_plane_icp: degenerate normal equations at iteration {iterations}");
            break;
        };
        transform = twist_to_matrix(&x) * transform;
        iterations += 1;

        let next = build_system(source, scene, &transform, max_dist);
        let d_fitness = (next.fitness(source.len()) - sys.fitness(source.len())).abs();
        let d_rmse = (next.rmse() - sys.rmse()).abs();
        sys = next;
        if d_fitness < criteria.relative_fitness && d_rmse < criteria.relative_rmse {
            break;
        }
    }

    if sys.inliers == 0 {
        debug!("point_to_plane_icp: no correspondences, source={}", source.len());
        return RegistrationResult {
            iterations,
            ..RegistrationResult::unaligned()
        };
    }
    RegistrationResult {
        transformation: transform,
        fitness: sys.fitness(source.len()),
        inlier_rmse: sys.rmse(),
        iterations,
    }
}
