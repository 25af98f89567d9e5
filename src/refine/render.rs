//! CPU z-buffer depth rasterizer.
use super::mesh::Mesh;
use super::types::Pose;
use crate::camera::CameraIntrinsics;
use crate::image::DepthImage;
use nalgebra::{Point3, Vector2, Vector3};

/// Triangles with a vertex closer than this (metres) are skipped.
pub const NEAR_PLANE_M: f32 = 1e-3;

#[inline]
fn edge(a: &Vector2<f32>, b: &Vector2<f32>, p: &Vector2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Render the mesh at `pose` into a `width × height` depth frame (mm).
///
/// Pixels are sampled at integer coordinates with perspective-correct depth
/// interpolation; the nearest surface wins. Uncovered pixels stay 0.
pub fn render_depth(
    mesh: &Mesh,
    pose: &Pose,
    width: usize,
    height: usize,
    k: &CameraIntrinsics,
) -> DepthImage {
    let mut zbuf = vec![f32::INFINITY; width * height];
    if width > 0 && height > 0 {
        let camera: Vec<Vector3<f32>> = mesh
            .vertices
            .iter()
            .map(|v| pose.transform_point(&Point3::from(*v)).coords)
            .collect();
        for tri in &mesh.triangles {
            let v = tri.map(|i| camera[i as usize]);
            rasterize_triangle(&v, k, width, height, &mut zbuf);
        }
    }
    let data = zbuf
        .into_iter()
        .map(|z| {
            if z.is_finite() {
                (z * 1000.0).round().clamp(1.0, u16::MAX as f32) as u16
            } else {
                0
            }
        })
        .collect();
    DepthImage::from_vec(width, height, data)
}

fn rasterize_triangle(
    v: &[Vector3<f32>; 3],
    k: &CameraIntrinsics,
    width: usize,
    height: usize,
    zbuf: &mut [f32],
) {
    if v.iter().any(|p| p.z < NEAR_PLANE_M) {
        return;
    }
    let s = v.map(|p| Vector2::new(k.fx * p.x / p.z + k.cx, k.fy * p.y / p.z + k.cy));
    let area = edge(&s[0], &s[1], &s[2]);
    if !area.is_finite() || area.abs() < 1e-12 {
        return;
    }

    let min_x = s.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).ceil();
    let max_x = s.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).floor();
    let min_y = s.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).ceil();
    let max_y = s.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).floor();
    if max_x < 0.0 || max_y < 0.0 || min_x > (width - 1) as f32 || min_y > (height - 1) as f32 {
        return;
    }
    let x0 = min_x.max(0.0) as usize;
    let x1 = max_x.min((width - 1) as f32) as usize;
    let y0 = min_y.max(0.0) as usize;
    let y1 = max_y.min((height - 1) as f32) as usize;

    let inv_z = v.map(|p| 1.0 / p.z);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Vector2::new(x as f32, y as f32);
            let w0 = edge(&s[1], &s[2], &p) / area;
            let w1 = edge(&s[2], &s[0], &p) / area;
            let w2 = edge(&s[0], &s[1], &p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let z = 1.0 / (w0 * inv_z[0] + w1 * inv_z[1] + w2 * inv_z[2]);
            let slot = &mut zbuf[y * width + x];
            if z < *slot {
                *slot = z;
            }
        }
    }
}
