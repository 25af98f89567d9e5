//! High-curvature edges: Canny on the normal field.
//!
//! Pipeline: blur the x and y normal components, take `d/dx` of the x plane
//! and `d/dy` of the y plane, median-filter the combined magnitude, quantize
//! the orientation into 4 classes, suppress non-maxima, then link with
//! hysteresis.
use super::grad::{gradient_magnitude, sobel, SobelAxis};
use super::hysteresis::trace_edges;
use super::nms::{quantize_orientations, suppress_non_maxima};
use crate::filters::{apply_separable, median_blur_f32, GAUSSIAN_3TAP_SIGMA1};
use crate::image::{ImageF32, Mask};
use crate::normals::NormalField;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureParams {
    /// Magnitudes under this value never survive suppression.
    pub low_threshold: f32,
    /// Minimum suppressed magnitude that seeds an edge chain.
    pub high_threshold: f32,
    /// Minimum suppressed magnitude accepted while following a chain.
    pub trace_floor: f32,
    /// Median window applied to the gradient magnitude (odd).
    pub median_ksize: usize,
}

impl Default for CurvatureParams {
    fn default() -> Self {
        Self {
            low_threshold: 0.2,
            high_threshold: 1.1,
            trace_floor: 0.01,
            median_ksize: 5,
        }
    }
}

/// Intermediate planes kept for inspection.
#[derive(Clone, Debug)]
pub struct CurvatureResponse {
    pub magnitude: ImageF32,
    pub orientation: Vec<u8>,
    pub suppressed: ImageF32,
    pub edges: Mask,
}

#[derive(Clone, Debug, Default)]
pub struct CurvatureEdgeDetector {
    params: CurvatureParams,
}

impl CurvatureEdgeDetector {
    pub fn new(params: CurvatureParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CurvatureParams {
        &self.params
    }

    pub fn detect(&self, normals: &NormalField) -> Mask {
        self.detect_with_response(normals).edges
    }

    pub fn detect_with_response(&self, normals: &NormalField) -> CurvatureResponse {
        let (w, h) = (normals.w, normals.h);
        let nx = ImageF32::from_vec(w, h, normals.data.iter().map(|n| n.x).collect());
        let ny = ImageF32::from_vec(w, h, normals.data.iter().map(|n| n.y).collect());

        let nx = apply_separable(&GAUSSIAN_3TAP_SIGMA1, &nx);
        let ny = apply_separable(&GAUSSIAN_3TAP_SIGMA1, &ny);
        let sx = sobel(&nx, SobelAxis::X);
        let sy = sobel(&ny, SobelAxis::Y);

        let magnitude = median_blur_f32(&gradient_magnitude(&sx, &sy), self.params.median_ksize);
        let orientation = quantize_orientations(&sx, &sy);
        let suppressed = suppress_non_maxima(&magnitude, &orientation, self.params.low_threshold);
        let edges = trace_edges(
            &suppressed,
            self.params.high_threshold,
            self.params.trace_floor,
        );

        CurvatureResponse {
            magnitude,
            orientation,
            suppressed,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn uniform_normals_have_no_edges() {
        let mut normals = NormalField::new(24, 20);
        for n in normals.data.iter_mut() {
            *n = Vector3::new(0.3, -0.2, -0.93).normalize();
        }
        let response = CurvatureEdgeDetector::default().detect_with_response(&normals);
        assert!(response.edges.is_empty());
        assert!(response.magnitude.data.iter().all(|&m| m.abs() < 1e-5));
    }

    #[test]
    fn normal_fold_yields_edge_column() {
        let (w, h) = (30, 20);
        let mut normals = NormalField::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let nx = if x < 15 { -0.6 } else { 0.6 };
                normals.data[y * w + x] = Vector3::new(nx, 0.0, -0.8);
            }
        }
        let edges = CurvatureEdgeDetector::default().detect(&normals);
        assert!(!edges.is_empty());
        for (x, y) in edges.points() {
            assert!((13..=16).contains(&x), "unexpected edge at ({x},{y})");
        }
    }
}
