use nalgebra::{Matrix4, Rotation3, Translation3, Vector3};
use pose_refine::camera::CameraIntrinsics;
use pose_refine::image::DepthImage;
use pose_refine::refine::{render_depth, Mesh, Pose};

/// Intrinsics with the principal point at the frame centre.
pub fn centred_intrinsics(w: usize, h: usize, focal: f32) -> CameraIntrinsics {
    CameraIntrinsics::new(focal, focal, w as f32 / 2.0, h as f32 / 2.0)
}

pub fn flat_plane(w: usize, h: usize, mm: u16) -> DepthImage {
    DepthImage::from_fn(w, h, |_, _| mm)
}

/// Rectangle `[x0, x1) × [y0, y1)` at `fg` mm in front of a plane at `bg` mm.
pub fn block_on_plane(
    w: usize,
    h: usize,
    bg: u16,
    fg: u16,
    (x0, x1): (usize, usize),
    (y0, y1): (usize, usize),
) -> DepthImage {
    DepthImage::from_fn(w, h, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            fg
        } else {
            bg
        }
    })
}

/// V-shaped surface: `base + slope·|x − crease_x|` mm.
pub fn wedge(w: usize, h: usize, base: u16, slope: u16, crease_x: usize) -> DepthImage {
    DepthImage::from_fn(w, h, |x, _| base + slope * x.abs_diff(crease_x) as u16)
}

/// Box of the given size at `distance` metres, tilted so three faces show.
pub struct BoxScene {
    pub mesh: Mesh,
    pub truth: Pose,
    pub intrinsics: CameraIntrinsics,
    pub depth: DepthImage,
}

pub fn box_scene(w: usize, h: usize, focal: f32, size: Vector3<f32>, distance: f32) -> BoxScene {
    let mesh = Mesh::cuboid(size);
    let rotation = Rotation3::from_euler_angles(
        25.0f32.to_radians(),
        -35.0f32.to_radians(),
        10.0f32.to_radians(),
    );
    let truth = Translation3::new(0.0, 0.0, distance).to_homogeneous() * rotation.to_homogeneous();
    let intrinsics = centred_intrinsics(w, h, focal);
    let depth = render_depth(&mesh, &truth, w, h, &intrinsics);
    BoxScene {
        mesh,
        truth,
        intrinsics,
        depth,
    }
}

/// Camera-frame translation plus a rotation about the object centre.
pub fn perturb(truth: &Pose, offset: Vector3<f32>, axis: Vector3<f32>, angle_deg: f32) -> Pose {
    let local = Rotation3::new(axis.normalize() * angle_deg.to_radians());
    Translation3::from(offset).to_homogeneous() * truth * local.to_homogeneous()
}

pub fn translation_error(a: &Matrix4<f32>, b: &Matrix4<f32>) -> f32 {
    (a.fixed_view::<3, 1>(0, 3) - b.fixed_view::<3, 1>(0, 3)).norm()
}

/// Rotation angle (degrees) of `a⁻¹·b`, assuming both are rigid.
pub fn rotation_error_deg(a: &Matrix4<f32>, b: &Matrix4<f32>) -> f32 {
    let ra = a.fixed_view::<3, 3>(0, 0).into_owned();
    let rb = b.fixed_view::<3, 3>(0, 0).into_owned();
    let r = ra.transpose() * rb;
    let cos = ((r.trace() - 1.0) * 0.5).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Pose translated by `tx` metres along the camera x axis.
pub fn shifted_identity(tx: f32) -> Pose {
    Translation3::new(tx, 0.0, 0.0).to_homogeneous()
}
