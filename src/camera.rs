//! Pinhole camera intrinsics.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Focal length used by normal estimation when no calibration is supplied.
pub const FALLBACK_FOCAL: f32 = 530.0;

/// Pinhole intrinsics `{fx, fy, cx, cy}` in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl CameraIntrinsics {
    /// Panics on non-positive or non-finite focal lengths.
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        let k = Self { fx, fy, cx, cy };
        k.assert_valid();
        k
    }

    /// Focal-only intrinsics used when the caller has no calibration.
    pub fn fallback() -> Self {
        Self {
            fx: FALLBACK_FOCAL,
            fy: FALLBACK_FOCAL,
            cx: 0.0,
            cy: 0.0,
        }
    }

    /// Positive finite focal lengths and a finite principal point.
    pub fn check(&self) -> Result<(), String> {
        if !(self.fx.is_finite() && self.fy.is_finite() && self.fx > 0.0 && self.fy > 0.0) {
            return Err(format!(
                "intrinsics require positive finite focal lengths, got fx={} fy={}",
                self.fx, self.fy
            ));
        }
        if !(self.cx.is_finite() && self.cy.is_finite()) {
            return Err("intrinsics require a finite principal point".to_string());
        }
        Ok(())
    }

    pub(crate) fn assert_valid(&self) {
        if let Err(msg) = self.check() {
            panic!("{msg}");
        }
    }

    /// Intrinsics for an image down-sampled by an integer `factor`.
    pub fn scaled(&self, factor: usize) -> Self {
        assert!(factor > 0, "down-sample factor must be positive");
        let s = factor as f32;
        Self {
            fx: self.fx / s,
            fy: self.fy / s,
            cx: self.cx / s,
            cy: self.cy / s,
        }
    }

    /// Pixel coordinates of a camera-frame point, `None` behind the camera.
    #[inline]
    pub fn project(&self, p: &Vector3<f32>) -> Option<(f32, f32)> {
        if p.z <= 0.0 {
            return None;
        }
        Some((
            self.fx * p.x / p.z + self.cx,
            self.fy * p.y / p.z + self.cy,
        ))
    }

    /// Camera-frame point at pixel `(u, v)` and metric depth `z`.
    #[inline]
    pub fn back_project(&self, u: f32, v: f32, z: f32) -> Vector3<f32> {
        Vector3::new((u - self.cx) * z / self.fx, (v - self.cy) * z / self.fy, z)
    }
}
