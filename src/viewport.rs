use crate::camera::{Camera, OrbitControls};
use crate::renderer::Renderer;

/// Last observed display-surface size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub pixel_density_cap: f32,
    /// Device pixel density after clamping to the cap.
    pub pixel_ratio: f32,
}

impl ViewportState {
    pub fn new(width: u32, height: u32, pixel_density_cap: f32) -> Self {
        Self {
            width,
            height,
            pixel_density_cap,
            pixel_ratio: 1.0,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Owns the camera, its orbit controls and the surface size.
pub struct ViewportController {
    camera: Camera,
    controls: OrbitControls,
    state: ViewportState,
}

impl ViewportController {
    pub fn new(mut camera: Camera, controls: OrbitControls, state: ViewportState) -> Self {
        camera.set_aspect(state.aspect());
        camera.update_projection();
        Self {
            camera,
            controls,
            state,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn on_resize(
        &mut self,
        width: u32,
        height: u32,
        device_pixel_density: f32,
        renderer: &mut dyn Renderer,
    ) {
        self.state.width = width;
        self.state.height = height;
        self.state.pixel_ratio = device_pixel_density.min(self.state.pixel_density_cap);
        log::debug!(
            "resized to {width}x{height} (pixel ratio {})",
            self.state.pixel_ratio
        );

        self.camera.set_aspect(self.state.aspect());
        renderer.set_size(width, height);
        renderer.set_pixel_ratio(self.state.pixel_ratio);
    }

    /// Rebuilds a dirty projection. Runs before every draw.
    pub fn prepare_frame(&mut self) {
        self.camera.update_projection();
    }

    /// One damped step of the orbit controls; once per frame.
    pub fn update_controls(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }
}
