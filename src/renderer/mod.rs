pub mod headless;
pub mod projection;
#[cfg(feature = "viewer")]
pub mod wireframe;

pub use headless::{FrameStats, HeadlessRenderer};
pub use projection::Projector;

use crate::{camera::Camera, scene::SceneGraph};

/// Output target of the render loop.
///
/// Sizes are in device-independent pixels; the drawing buffer is
/// `size * pixel_ratio`.
pub trait Renderer {
    fn set_size(&mut self, width: u32, height: u32);
    fn set_pixel_ratio(&mut self, ratio: f32);

    fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> anyhow::Result<()>;

    fn drawing_buffer_size(&self) -> [u32; 2];
}
