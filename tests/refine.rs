mod common;

use common::synthetic_depth::{
    box_scene, flat_plane, perturb, rotation_error_deg, shifted_identity, translation_error,
};
use nalgebra::{Matrix4, Translation3, Vector3};
use pose_refine::camera::CameraIntrinsics;
use pose_refine::image::DepthImage;
use pose_refine::refine::{
    ComputeBackend, IcpCriteria, Mesh, PointCloud, Pose, PoseRefiner, RefineParams,
    RegistrationResult, Scene,
};
use std::sync::{Arc, Mutex};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything the session asked the backend to do.
#[derive(Default)]
struct Calls {
    renders: Mutex<Vec<(usize, usize, usize)>>,
    solves: Mutex<Vec<IcpCriteria>>,
}

/// Renders flat frames and answers every solve with a fixed delta.
struct RecordingBackend {
    calls: Arc<Calls>,
    delta: Pose,
}

impl ComputeBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn render(
        &self,
        _mesh: &Mesh,
        poses: &[Pose],
        width: usize,
        height: usize,
        _intrinsics: &CameraIntrinsics,
    ) -> Vec<DepthImage> {
        self.calls
            .renders
            .lock()
            .expect("render log")
            .push((poses.len(), width, height));
        poses.iter().map(|_| flat_plane(width, height, 1000)).collect()
    }

    fn point_to_plane_icp(
        &self,
        source: &PointCloud,
        _scene: &Scene,
        criteria: &IcpCriteria,
    ) -> RegistrationResult {
        assert!(!source.is_empty());
        self.calls.solves.lock().expect("solve log").push(*criteria);
        RegistrationResult {
            transformation: self.delta,
            fitness: 1.0,
            inlier_rmse: 0.0,
            iterations: criteria.max_iterations,
        }
    }
}

fn recording_session(batch_size: usize, delta: Pose) -> (PoseRefiner, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let backend = RecordingBackend {
        calls: Arc::clone(&calls),
        delta,
    };
    let params = RefineParams {
        batch_size,
        ..RefineParams::default()
    };
    let refiner = PoseRefiner::with_backend(
        flat_plane(40, 30, 1000),
        CameraIntrinsics::new(50.0, 50.0, 20.0, 15.0),
        Mesh::cuboid(Vector3::new(0.1, 0.1, 0.1)),
        params,
        Box::new(backend),
    );
    (refiner, calls)
}

fn candidates(n: usize) -> Vec<Pose> {
    (0..n).map(|i| shifted_identity(0.01 * i as f32)).collect()
}

#[test]
fn poses_are_chunked_by_batch_size_and_keep_their_order() {
    init_logger();
    let (refiner, calls) = recording_session(4, Matrix4::identity());
    let poses = candidates(10);
    let results = refiner.refine(&poses, 2, false);

    let renders = calls.renders.lock().expect("render log").clone();
    assert_eq!(renders, vec![(4, 20, 15), (4, 20, 15), (2, 20, 15)]);
    assert_eq!(results.len(), poses.len());
    for (result, pose) in results.iter().zip(&poses) {
        assert_eq!(result.transformation, *pose);
    }
}

#[test]
fn unaligned_candidates_get_a_coarse_then_a_refine_solve() {
    init_logger();
    let (refiner, calls) = recording_session(4, Matrix4::identity());
    let results = refiner.refine(&candidates(10), 1, false);
    assert!(results.iter().all(|r| r.iterations == 30));

    let solves = calls.solves.lock().expect("solve log").clone();
    assert_eq!(solves.len(), 20);
    let coarse: Vec<_> = solves.iter().filter(|c| c.max_iterations == 1).collect();
    let fine: Vec<_> = solves.iter().filter(|c| c.max_iterations == 30).collect();
    assert_eq!(coarse.len(), 10);
    assert_eq!(fine.len(), 10);
    assert!(coarse.iter().all(|c| c.max_correspondence_distance == f32::MAX));
    assert!(fine.iter().all(|c| c.max_correspondence_distance == 0.1));
    assert!(solves
        .iter()
        .all(|c| c.relative_fitness == 1e-5 && c.relative_rmse == 1e-5));
}

#[test]
fn depth_aligned_candidates_get_exactly_one_solve() {
    init_logger();
    let (refiner, calls) = recording_session(3, Matrix4::identity());
    refiner.refine(&candidates(7), 1, true);
    let solves = calls.solves.lock().expect("solve log").clone();
    assert_eq!(solves.len(), 7);
    assert!(solves.iter().all(|c| c.max_iterations == 30));
    assert_eq!(calls.renders.lock().expect("render log").len(), 3);
}

#[test]
fn solver_deltas_are_left_composed() {
    init_logger();
    let delta = Translation3::new(0.0, 0.0, 0.001).to_homogeneous();
    let (refiner, _) = recording_session(2, delta);
    let poses = candidates(3);

    let two_phase = refiner.refine(&poses, 1, false);
    let one_phase = refiner.refine(&poses, 1, true);
    for i in 0..poses.len() {
        let expected_two = delta * delta * poses[i];
        let expected_one = delta * poses[i];
        assert!((two_phase[i].transformation - expected_two).norm() < 1e-6);
        assert!((one_phase[i].transformation - expected_one).norm() < 1e-6);
    }
}

#[test]
fn empty_candidate_list_renders_nothing() {
    init_logger();
    let (refiner, calls) = recording_session(4, Matrix4::identity());
    assert!(refiner.refine(&[], 1, false).is_empty());
    assert!(calls.renders.lock().expect("render log").is_empty());
}

#[test]
#[should_panic(expected = "must divide")]
fn down_sample_must_divide_the_frame() {
    let (refiner, _) = recording_session(4, Matrix4::identity());
    refiner.refine(&candidates(2), 4, false);
}

#[test]
#[should_panic(expected = "batch_size must be positive")]
fn zero_batch_size_is_rejected() {
    let _ = recording_session(0, Matrix4::identity());
}

#[test]
fn session_exposes_reference_products() {
    init_logger();
    let (refiner, _) = recording_session(4, Matrix4::identity());
    assert_eq!(refiner.backend_name(), "recording");
    assert_eq!((refiner.edges().w, refiner.edges().h), (40, 30));
    assert_eq!((refiner.normals().w, refiner.normals().h), (40, 30));
    assert!(refiner.edges().is_empty());
    assert_eq!(refiner.scene().width(), 40);
    assert!(refiner.scene().valid_count() > 0);
    assert!(refiner.timing().stage_ms("scene").is_some());
    assert!(refiner.timing().stage_ms("edges.normals").is_some());
}

#[test]
fn cpu_backend_pulls_perturbed_box_back_to_the_truth() {
    init_logger();
    let scene = box_scene(160, 120, 200.0, Vector3::new(0.1, 0.08, 0.06), 0.5);
    assert!(scene.depth.valid_count() > 500, "box must be visible");

    let poses = vec![
        perturb(&scene.truth, Vector3::new(0.004, -0.003, 0.005), Vector3::new(0.0, 0.0, 1.0), 1.5),
        perturb(&scene.truth, Vector3::new(-0.005, 0.002, -0.004), Vector3::new(1.0, 1.0, 0.0), -1.0),
        perturb(&scene.truth, Vector3::new(0.002, 0.004, 0.0), Vector3::new(0.0, 1.0, 0.0), 2.0),
    ];
    let refiner = PoseRefiner::new(
        scene.depth.clone(),
        scene.intrinsics,
        scene.mesh.clone(),
        RefineParams {
            batch_size: 2,
            ..RefineParams::default()
        },
    );
    assert_eq!(refiner.backend_name(), "cpu");

    let results = refiner.refine(&poses, 1, false);
    assert_eq!(results.len(), poses.len());
    for (i, (initial, result)) in poses.iter().zip(&results).enumerate() {
        let before = translation_error(initial, &scene.truth);
        let after = translation_error(&result.transformation, &scene.truth);
        assert!(
            after < 0.5 * before && after < 0.0025,
            "candidate {i}: error {before:.4} m -> {after:.4} m"
        );
        assert!(
            rotation_error_deg(&result.transformation, &scene.truth)
                < rotation_error_deg(initial, &scene.truth).max(0.5),
            "candidate {i}: rotation did not improve"
        );
        assert!(result.fitness > 0.5, "candidate {i}: fitness {}", result.fitness);
        assert!(result.inlier_rmse < 0.003, "candidate {i}: rmse {}", result.inlier_rmse);
    }
}

#[test]
fn cpu_backend_refines_on_a_down_sampled_grid() {
    init_logger();
    let scene = box_scene(160, 120, 200.0, Vector3::new(0.1, 0.08, 0.06), 0.5);
    let initial = perturb(&scene.truth, Vector3::new(0.003, 0.003, -0.003), Vector3::new(1.0, 0.0, 0.0), 1.0);
    let refiner = PoseRefiner::new(
        scene.depth.clone(),
        scene.intrinsics,
        scene.mesh.clone(),
        RefineParams::default(),
    );
    let result = refiner.refine(&[initial], 2, true)[0];
    let before = translation_error(&initial, &scene.truth);
    let after = translation_error(&result.transformation, &scene.truth);
    assert!(after < before, "error {before:.4} m -> {after:.4} m");
    assert!(result.fitness > 0.5);
}
