use crate::camera::Camera;
use crate::renderer::{Projector, Renderer};
use crate::scene::{material::Color, SceneGraph};
use anyhow::anyhow;
use sdl3::{
    pixels::Color as SdlColor,
    render::{Canvas, FPoint},
    video::Window,
};

fn sdl_color(color: Color) -> SdlColor {
    let [r, g, b] = color.to_rgb8();
    SdlColor::RGB(r, g, b)
}

/// Draws triangle edges of every mesh in its material's color.
pub struct WireframeRenderer {
    canvas: Canvas<Window>,
    width: u32,
    height: u32,
    pixel_ratio: f32,
}

impl WireframeRenderer {
    pub fn new(canvas: Canvas<Window>) -> Self {
        let (width, height) = canvas.window().size();
        Self {
            canvas,
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn window(&self) -> &Window {
        self.canvas.window()
    }
}

impl Renderer for WireframeRenderer {
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

        self.canvas.set_draw_color(sdl_color(scene.clear_color));
        self.canvas.clear();

        let mut lines = Vec::new();
        scene.visit_world(&mut |node, world| {
            let Some(material) = node.material() else {
                return;
            };
            let color = sdl_color(material.display_color());
            for [a, b, c] in projector.triangles(node, world) {
                for (from, to) in [(a, b), (b, c), (c, a)] {
                    lines.push((color, FPoint::new(from.x, from.y), FPoint::new(to.x, to.y)));
                }
            }
        });

        for (color, from, to) in lines {
            self.canvas.set_draw_color(color);
            self.canvas
                .draw_line(from, to)
                .map_err(|e| anyhow!("Failed to draw line: {e}"))?;
        }
        self.canvas.present();
        Ok(())
    }

    fn drawing_buffer_size(&self) -> [u32; 2] {
        [
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        ]
    }
}
