use crate::animation::Animator;
use crate::renderer::Renderer;
use crate::scene::{BoundScene, SceneGraph};
use crate::viewport::ViewportController;

/// Everything one running scene owns: what is drawn, how it is viewed and
/// where it is drawn to.
pub struct SceneContext<R: Renderer> {
    pub scene: SceneGraph,
    pub viewport: ViewportController,
    pub renderer: R,
    animator: Option<Box<dyn Animator>>,
}

impl<R: Renderer> SceneContext<R> {
    pub fn new(scene: SceneGraph, viewport: ViewportController, mut renderer: R) -> Self {
        let state = *viewport.state();
        renderer.set_size(state.width, state.height);
        renderer.set_pixel_ratio(state.pixel_ratio);
        Self {
            scene,
            viewport,
            renderer,
            animator: None,
        }
    }

    pub fn attach(&mut self, bound: BoundScene) -> usize {
        self.scene.attach(bound)
    }

    pub fn set_animator(&mut self, animator: Box<dyn Animator>) {
        self.animator = Some(animator);
    }

    /// Advances the animator, if there is an active one, by a positive
    /// `delta`. Returns whether anything was advanced.
    pub fn animate(&mut self, delta: f32) -> bool {
        match self.animator.as_deref_mut() {
            Some(animator) if animator.is_active() && delta > 0.0 => {
                animator.advance(delta, &mut self.scene);
                true
            }
            _ => false,
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32, device_pixel_density: f32) {
        self.viewport
            .on_resize(width, height, device_pixel_density, &mut self.renderer);
    }
}
