use crate::scene::node::SceneNode;
use nalgebra_glm::{Mat4, Vec2, Vec4};

/// Maps world-space geometry to drawing-buffer pixels.
#[derive(Debug, Clone)]
pub struct Projector {
    view_projection: Mat4,
    width: f32,
    height: f32,
}

impl Projector {
    pub fn new(view_projection: Mat4, width: f32, height: f32) -> Self {
        Self {
            view_projection,
            width,
            height,
        }
    }

    /// Pixel position of a point, or `None` when it lies behind the camera.
    pub fn project(&self, model: &Mat4, point: &Vec4) -> Option<Vec2> {
        let clip = self.view_projection * model * point;
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * self.width,
            (1.0 - ndc_y) * 0.5 * self.height,
        ))
    }

    /// Screen-space triangles of a node's mesh; triangles with a corner
    /// behind the camera are dropped.
    pub fn triangles(&self, node: &SceneNode, world: &Mat4) -> Vec<[Vec2; 3]> {
        let Some(mesh) = node.mesh.as_ref() else {
            return Vec::new();
        };
        let corner = |i: u32| {
            mesh.vertices
                .get(i as usize)
                .and_then(|v| self.project(world, &v.position))
        };
        mesh.triangles()
            .into_iter()
            .filter_map(|[a, b, c]| Some([corner(a)?, corner(b)?, corner(c)?]))
            .collect()
    }

    pub fn is_on_screen(&self, point: &Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}
