use nalgebra::{Matrix4, Rotation3, Translation3, Vector3};
use pose_refine::config::load_config;
use pose_refine::config::refine_demo::RefineDemoConfig;
use pose_refine::diagnostics::{PoseOutcome, RefinementReport};
use pose_refine::image::io::write_json_file;
use pose_refine::refine::{render_depth, Mesh, Pose, PoseRefiner};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config: RefineDemoConfig = match env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => RefineDemoConfig::default(),
    };
    config.intrinsics.check()?;
    if config.refine.batch_size == 0 {
        return Err("refine.batch_size must be positive".to_string());
    }
    if config.down_sample == 0
        || config.width % config.down_sample != 0
        || config.height % config.down_sample != 0
    {
        return Err(format!(
            "down_sample {} must divide {}x{}",
            config.down_sample, config.width, config.height
        ));
    }

    let [sx, sy, sz] = config.box_size;
    let mesh = Mesh::cuboid(Vector3::new(sx, sy, sz));
    let truth = box_pose(&config);
    let depth = render_depth(&mesh, &truth, config.width, config.height, &config.intrinsics);
    if depth.valid_count() == 0 {
        return Err("the box is not visible with this configuration".to_string());
    }

    let candidates: Vec<Pose> = (0..config.candidates)
        .map(|i| perturb(&truth, i, config.translation_noise_m, config.rotation_noise_deg))
        .collect();

    let refiner = PoseRefiner::new(depth, config.intrinsics, mesh, config.refine.clone());
    let (results, mut timing) =
        refiner.refine_timed(&candidates, config.down_sample, config.depth_aligned);
    timing.extend_prefixed("setup", refiner.timing());

    let poses = candidates
        .iter()
        .zip(results)
        .enumerate()
        .map(|(index, (initial, result))| PoseOutcome {
            index,
            initial: *initial,
            result,
            initial_error_m: Some(translation_error(initial, &truth)),
            refined_error_m: Some(translation_error(&result.transformation, &truth)),
        })
        .collect();
    let report = RefinementReport {
        backend: refiner.backend_name().to_string(),
        batch_size: config.refine.batch_size,
        down_sample: config.down_sample,
        depth_aligned: config.depth_aligned,
        poses,
        timing,
    };

    if let Some(best) = report.best() {
        println!(
            "best candidate={} fitness={:.3} rmse={:.5} error_mm={:.2} -> {:.2}",
            best.index,
            best.result.fitness,
            best.result.inlier_rmse,
            best.initial_error_m.unwrap_or(f32::NAN) * 1000.0,
            best.refined_error_m.unwrap_or(f32::NAN) * 1000.0
        );
    }
    match &config.report_json {
        Some(path) => {
            write_json_file(path, &report)?;
            println!("Saved report to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to serialize report: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn box_pose(config: &RefineDemoConfig) -> Pose {
    let [roll, pitch, yaw] = config.box_rpy_deg.map(f32::to_radians);
    let rotation = Rotation3::from_euler_angles(roll, pitch, yaw);
    Translation3::new(0.0, 0.0, config.distance_m).to_homogeneous() * rotation.to_homogeneous()
}

/// Deterministic offset of candidate `i`: a translation in the camera frame
/// plus a rotation about the object centre.
fn perturb(truth: &Pose, i: usize, translation_m: f32, rotation_deg: f32) -> Pose {
    let s = i as f32 + 1.0;
    let offset = Vector3::new((1.3 * s).sin(), (0.7 * s + 1.1).cos(), (2.1 * s + 0.2).sin()) * translation_m;
    let axis = Vector3::new(s.cos(), (1.7 * s).sin(), 0.5);
    let angle = rotation_deg.to_radians() * (0.37 * s).sin();
    let local = Rotation3::new(axis.normalize() * angle);
    Translation3::from(offset).to_homogeneous() * truth * local.to_homogeneous()
}

fn translation_error(pose: &Matrix4<f32>, truth: &Matrix4<f32>) -> f32 {
    (pose.fixed_view::<3, 1>(0, 3) - truth.fixed_view::<3, 1>(0, 3)).norm()
}
