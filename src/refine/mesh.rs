//! In-memory triangle mesh (metres, object frame).
use nalgebra::Vector3;

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vector3<f32>>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Panics when a triangle references a missing vertex.
    pub fn new(vertices: Vec<Vector3<f32>>, triangles: Vec<[u32; 3]>) -> Self {
        let n = vertices.len() as u32;
        assert!(
            triangles.iter().flatten().all(|&i| i < n),
            "triangle index out of range"
        );
        Self {
            vertices,
            triangles,
        }
    }

    /// Axis-aligned box centred at the origin with edge lengths `size`.
    pub fn cuboid(size: Vector3<f32>) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vector3::new(-h.x, -h.y, -h.z),
            Vector3::new(h.x, -h.y, -h.z),
            Vector3::new(h.x, h.y, -h.z),
            Vector3::new(-h.x, h.y, -h.z),
            Vector3::new(-h.x, -h.y, h.z),
            Vector3::new(h.x, -h.y, h.z),
            Vector3::new(h.x, h.y, h.z),
            Vector3::new(-h.x, h.y, h.z),
        ];
        let triangles = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self::new(vertices, triangles)
    }
}
