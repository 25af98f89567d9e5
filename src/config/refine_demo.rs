use crate::camera::CameraIntrinsics;
use crate::refine::RefineParams;
use serde::Deserialize;
use std::path::PathBuf;

/// Synthetic box scene refined by the demo binary.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RefineDemoConfig {
    pub width: usize,
    pub height: usize,
    pub intrinsics: CameraIntrinsics,
    /// Box edge lengths in metres.
    pub box_size: [f32; 3],
    /// Distance of the box centre from the camera (metres).
    pub distance_m: f32,
    /// Box orientation as roll/pitch/yaw in degrees.
    pub box_rpy_deg: [f32; 3],
    pub candidates: usize,
    /// Largest translation offset applied to a candidate (metres).
    pub translation_noise_m: f32,
    /// Largest rotation offset applied to a candidate (degrees).
    pub rotation_noise_deg: f32,
    pub down_sample: usize,
    pub depth_aligned: bool,
    pub refine: RefineParams,
    pub report_json: Option<PathBuf>,
}

impl Default for RefineDemoConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            intrinsics: CameraIntrinsics {
                fx: 300.0,
                fy: 300.0,
                cx: 160.0,
                cy: 120.0,
            },
            box_size: [0.12, 0.09, 0.07],
            distance_m: 0.6,
            box_rpy_deg: [25.0, -35.0, 10.0],
            candidates: 10,
            translation_noise_m: 0.006,
            rotation_noise_deg: 2.0,
            down_sample: 2,
            depth_aligned: false,
            refine: RefineParams::default(),
            report_json: None,
        }
    }
}
