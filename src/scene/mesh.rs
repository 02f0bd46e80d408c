use bytemuck::{Pod, Zeroable};
use nalgebra_glm::{Vec2, Vec4};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec4,
    pub normal: Vec4,
    pub tex_coords: Vec2,
    pub _padding: Vec2,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            normal: Vec4::new(0.0, 0.0, 0.0, 1.0),
            tex_coords: Vec2::new(0.0, 0.0),
            _padding: Vec2::new(0.0, 0.0),
        }
    }
}

#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub compressed: bool,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            indices,
            compressed: false,
        }
    }

    pub fn compressed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            compressed: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Triangle corner indices; non-indexed meshes use consecutive vertices.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        if self.indices.is_empty() {
            let count = self.vertices.len() as u32 / 3;
            (0..count).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect()
        } else {
            self.indices
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect()
        }
    }
}
