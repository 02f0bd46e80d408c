use crate::camera::Camera;
use crate::renderer::{Projector, Renderer};
use crate::scene::SceneGraph;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes: usize,
    pub meshes: usize,
    pub triangles: usize,
    /// Triangles with at least one corner inside the drawing buffer.
    pub visible_triangles: usize,
    /// Vertex data a GPU backend would upload for this frame.
    pub vertex_bytes: usize,
}

/// Renderer without a display surface.
///
/// Projects every mesh like a real backend would and keeps per-frame
/// statistics instead of pixels.
#[derive(Debug)]
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    frames: u64,
    last_frame: FrameStats,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            frames: 0,
            last_frame: FrameStats::default(),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}

impl Renderer for HeadlessRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> anyhow::Result<()> {
        let [width, height] = self.drawing_buffer_size();
        let projector = Projector::new(camera.view_projection(), width as f32, height as f32);

        let mut stats = FrameStats::default();
        scene.visit_world(&mut |node, world| {
            stats.nodes += 1;
            let Some(mesh) = node.mesh.as_ref() else {
                return;
            };
            stats.meshes += 1;
            stats.triangles += mesh.triangles().len();
            stats.vertex_bytes += mesh.vertex_bytes().len();
            stats.visible_triangles += projector
                .triangles(node, world)
                .iter()
                .filter(|corners| corners.iter().any(|p| projector.is_on_screen(p)))
                .count();
        });

        self.frames += 1;
        self.last_frame = stats;
        Ok(())
    }

    fn drawing_buffer_size(&self) -> [u32; 2] {
        [
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        ]
    }
}
