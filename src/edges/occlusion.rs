//! Occlusion edges from depth discontinuities.
//!
//! Two cases per interior pixel with a depth return:
//!
//! - **Complete neighbourhood**: every neighbour offset is lifted to a 3D
//!   step `(dc/fx, dr/fy, Δd/1000)` and projected onto the neighbour's
//!   normal. A real step between surfaces lines up with the normal on the
//!   near side, so the largest projection above `projection_threshold`
//!   marks that neighbour.
//! - **Missing neighbours**: the averaged direction towards the holes is
//!   walked outward until a depth return shows up. If that return is farther
//!   away by more than `relative_depth_jump` of the centre depth the centre
//!   occludes it and is marked. Nearer returns and failed searches produce
//!   nothing.
use crate::camera::CameraIntrinsics;
use crate::image::{DepthImage, Mask};
use crate::normals::NormalField;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionParams {
    /// Minimum |step · normal| (metres) for a neighbour to be an edge.
    pub projection_threshold: f32,
    /// Search length (exclusive, pixels) along the hole direction.
    pub max_search_steps: usize,
    /// Depth jump relative to the centre depth that counts as a boundary.
    pub relative_depth_jump: f32,
}

impl Default for OcclusionParams {
    fn default() -> Self {
        Self {
            projection_threshold: 0.05,
            max_search_steps: 50,
            relative_depth_jump: 0.02,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OcclusionEdgeDetector {
    params: OcclusionParams,
}

impl OcclusionEdgeDetector {
    pub fn new(params: OcclusionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &OcclusionParams {
        &self.params
    }

    pub fn detect(
        &self,
        depth: &DepthImage,
        normals: &NormalField,
        intrinsics: &CameraIntrinsics,
    ) -> Mask {
        assert!(
            depth.w == normals.w && depth.h == normals.h,
            "normal field must match the depth frame"
        );
        let (w, h) = (depth.w, depth.h);
        let mut edges = Mask::new(w, h);
        if w < 3 || h < 3 {
            return edges;
        }

        for r in 1..h - 1 {
            for c in 1..w - 1 {
                let center = depth.get(c, r) as i32;
                if center == 0 {
                    continue;
                }

                let mut diffs = [[0i32; 3]; 3];
                let mut dir_x = 0.0f32;
                let mut dir_y = 0.0f32;
                let mut invalid_count = 0usize;
                for dr in -1i32..=1 {
                    for dc in -1i32..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nd = depth.get((c as i32 + dc) as usize, (r as i32 + dr) as usize);
                        if nd == 0 {
                            let factor = if dr != 0 && dc != 0 {
                                std::f32::consts::FRAC_1_SQRT_2
                            } else {
                                1.0
                            };
                            dir_x += dc as f32 * factor;
                            dir_y += dr as f32 * factor;
                            invalid_count += 1;
                        } else {
                            diffs[(dr + 1) as usize][(dc + 1) as usize] = center - nd as i32;
                        }
                    }
                }

                if invalid_count == 0 {
                    if let Some((er, ec)) =
                        self.strongest_step(r, c, &diffs, normals, intrinsics)
                    {
                        edges.mark(ec, er);
                    }
                } else if self.occludes_background(depth, r, c, dir_x, dir_y, invalid_count) {
                    edges.mark(c, r);
                }
            }
        }
        edges
    }

    /// Neighbour `(row, col)` with the largest normal-projected step, if above
    /// the threshold. Ties keep the first in row-major order.
    fn strongest_step(
        &self,
        r: usize,
        c: usize,
        diffs: &[[i32; 3]; 3],
        normals: &NormalField,
        k: &CameraIntrinsics,
    ) -> Option<(usize, usize)> {
        let mut max_d = 0.0f32;
        let mut best = (0i32, 0i32);
        for i in 0..3i32 {
            for j in 0..3i32 {
                let (dr, dc) = (i - 1, j - 1);
                let nr = (r as i32 + dr) as usize;
                let nc = (c as i32 + dc) as usize;
                let normal = normals.get(nc, nr);
                let step = Vector3::new(
                    dc as f32 / k.fx,
                    dr as f32 / k.fy,
                    diffs[i as usize][j as usize] as f32 / 1000.0,
                );
                let dist = step.dot(&normal).abs();
                if dist > max_d {
                    max_d = dist;
                    best = (dr, dc);
                }
            }
        }
        (max_d > self.params.projection_threshold)
            .then(|| ((r as i32 + best.0) as usize, (c as i32 + best.1) as usize))
    }

    fn occludes_background(
        &self,
        depth: &DepthImage,
        r: usize,
        c: usize,
        dir_x: f32,
        dir_y: f32,
        invalid_count: usize,
    ) -> bool {
        if dir_x == 0.0 && dir_y == 0.0 {
            return false;
        }
        let dx = dir_x / invalid_count as f32;
        let dy = dir_y / invalid_count as f32;

        let (w, h) = (depth.w as i64, depth.h as i64);
        let mut found = 0i64;
        for radius in 1..self.params.max_search_steps {
            let nr = r as i64 + (dy * radius as f32).floor() as i64;
            let nc = c as i64 + (dx * radius as f32).floor() as i64;
            if nr < 0 || nr >= h || nc < 0 || nc >= w {
                break;
            }
            let d = depth.get(nc as usize, nr as usize);
            if d > 0 {
                found = d as i64;
                break;
            }
        }
        if found == 0 {
            return false;
        }

        let center = depth.get(c, r) as i64;
        let diff = found - center;
        (diff.abs() as f32) > self.params.relative_depth_jump * center as f32 && diff >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_normals(w: usize, h: usize) -> NormalField {
        let mut n = NormalField::new(w, h);
        for v in n.data.iter_mut() {
            *v = Vector3::new(0.0, 0.0, -1.0);
        }
        n
    }

    #[test]
    fn flat_depth_has_no_occlusions() {
        let depth = DepthImage::from_vec(10, 8, vec![900; 80]);
        let k = CameraIntrinsics::new(500.0, 500.0, 5.0, 4.0);
        let edges = OcclusionEdgeDetector::default().detect(&depth, &flat_normals(10, 8), &k);
        assert!(edges.is_empty());
    }

    #[test]
    fn step_marks_first_neighbour_across_the_jump() {
        // Columns >= 5 are 100 mm closer.
        let depth = DepthImage::from_fn(10, 6, |x, _| if x >= 5 { 800 } else { 900 });
        let k = CameraIntrinsics::new(500.0, 500.0, 5.0, 3.0);
        let edges = OcclusionEdgeDetector::default().detect(&depth, &flat_normals(10, 6), &k);
        for (x, _) in edges.points() {
            assert!(x == 4 || x == 5, "edge off the step at column {x}");
        }
        // Centre (4, r) sees the nearer column first at row r - 1.
        assert!(edges.is_set(5, 1) && edges.is_set(5, 2) && edges.is_set(5, 3));
    }

    #[test]
    fn hole_next_to_foreground_marks_foreground_only() {
        // Background 1000 mm | hole | foreground 800 mm.
        let depth = DepthImage::from_fn(30, 8, |x, _| match x {
            0..=19 => 1000,
            20..=22 => 0,
            _ => 800,
        });
        let k = CameraIntrinsics::new(500.0, 500.0, 15.0, 4.0);
        let edges = OcclusionEdgeDetector::default().detect(&depth, &flat_normals(30, 8), &k);
        let pts = edges.points();
        assert!(!pts.is_empty());
        assert!(pts.iter().all(|&(x, _)| x == 23), "{pts:?}");
        assert_eq!(pts.len(), 6, "every interior row of the foreground rim");
    }

    #[test]
    fn hole_without_return_is_ignored() {
        let depth = DepthImage::from_fn(12, 6, |x, _| if x < 4 { 0 } else { 700 });
        let k = CameraIntrinsics::new(500.0, 500.0, 6.0, 3.0);
        let edges = OcclusionEdgeDetector::default().detect(&depth, &flat_normals(12, 6), &k);
        assert!(edges.is_empty());
    }
}
