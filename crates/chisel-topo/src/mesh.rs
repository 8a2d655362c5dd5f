//! Triangle mesh output.

use std::collections::HashMap;

use chisel_math::Vector;

use crate::Shape;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Vector>,
    /// Triangles as indices into `vertices`, counter-clockwise from outside.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }
}

impl Shape {
    /// Collect the face triangulations into one mesh, merging vertices
    /// closer than `tolerance`.
    pub fn tessellate(&self, tolerance: f64) -> Mesh {
        let scale = 1.0 / tolerance.max(1e-12);
        let key = |p: Vector| {
            (
                (p.x() * scale).round() as i64,
                (p.y() * scale).round() as i64,
                (p.z() * scale).round() as i64,
            )
        };
        let mut mesh = Mesh::default();
        let mut index: HashMap<(i64, i64, i64), u32> = HashMap::new();
        for face in self.faces() {
            let Some(face) = face.as_face() else { continue };
            for tri in face.triangles() {
                let mut ids = [0u32; 3];
                for (slot, p) in ids.iter_mut().zip(tri.iter()) {
                    *slot = *index.entry(key(*p)).or_insert_with(|| {
                        mesh.vertices.push(*p);
                        (mesh.vertices.len() - 1) as u32
                    });
                }
                if ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2] {
                    mesh.triangles.push(ids);
                }
            }
        }
        mesh
    }
}
