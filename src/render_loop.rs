//! Per-frame tick: time, animation, controls, draw, reschedule.

use crate::context::SceneContext;
use crate::renderer::Renderer;
use std::{cell::Cell, rc::Rc, time::Instant};

/// Monotonic seconds since the loop started.
pub trait Clock {
    fn elapsed(&self) -> f32;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f32) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f32) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f32 {
        self.now.get()
    }
}

/// The host's "call me again next frame" primitive.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Scheduler for hosts that drive frames from their own loop: it only
/// remembers whether another frame was asked for.
#[derive(Debug, Default)]
pub struct FrameRequest {
    pending: bool,
    total: u64,
}

impl FrameRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

impl FrameScheduler for FrameRequest {
    fn request_frame(&mut self) {
        self.pending = true;
        self.total += 1;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub elapsed: f32,
    pub delta: f32,
    pub animated: bool,
    pub camera_moved: bool,
}

pub struct RenderLoop {
    clock: Box<dyn Clock>,
    state: LoopState,
    previous: f32,
    frames: u64,
}

impl RenderLoop {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            state: LoopState::Idle,
            previous: 0.0,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Requests the first frame.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state == LoopState::Idle {
            scheduler.request_frame();
        }
    }

    /// Runs one frame to completion.
    ///
    /// A failed draw is returned to the host as is and no further frame is
    /// requested; recovering the surface is up to the host.
    pub fn tick<R: Renderer>(
        &mut self,
        context: &mut SceneContext<R>,
        scheduler: &mut dyn FrameScheduler,
    ) -> anyhow::Result<TickReport> {
        let elapsed = self.clock.elapsed();
        let delta = elapsed - self.previous;
        self.previous = elapsed;
        self.state = LoopState::Running;

        let animated = context.animate(delta);

        let camera_moved = context.viewport.update_controls();
        context.viewport.prepare_frame();

        if let Err(err) = context
            .renderer
            .draw(&context.scene, context.viewport.camera())
        {
            log::error!("draw failed on frame {}: {err:#}", self.frames);
            return Err(err);
        }

        self.frames += 1;
        scheduler.request_frame();

        Ok(TickReport {
            frame: self.frames,
            elapsed,
            delta,
            animated,
            camera_moved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animator;
    use crate::camera::{Camera, OrbitControls};
    use crate::renderer::HeadlessRenderer;
    use crate::scene::SceneGraph;
    use crate::viewport::{ViewportController, ViewportState};
    use nalgebra_glm::Vec3;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        advanced: Rc<RefCell<Vec<f32>>>,
    }

    impl Animator for Recorder {
        fn is_active(&self) -> bool {
            true
        }

        fn advance(&mut self, delta: f32, _scene: &mut SceneGraph) {
            self.advanced.borrow_mut().push(delta);
        }
    }

    fn context() -> SceneContext<HeadlessRenderer> {
        let mut camera = Camera::new(75.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::new(2.0, 2.0, 2.0), Vec3::new(0.0, 0.75, 0.0));
        let viewport = ViewportController::new(
            camera,
            OrbitControls::new(Vec3::new(0.0, 0.75, 0.0)).with_damping(0.05),
            ViewportState::new(800, 600, 2.0),
        );
        SceneContext::new(SceneGraph::default(), viewport, HeadlessRenderer::new(800, 600))
    }

    #[test]
    fn ticks_go_from_idle_to_running() {
        let clock = ManualClock::new();
        let mut render_loop = RenderLoop::new(Box::new(clock.clone()));
        let mut scheduler = FrameRequest::new();
        let mut context = context();

        assert_eq!(render_loop.state(), LoopState::Idle);
        render_loop.start(&mut scheduler);
        assert!(scheduler.take());

        clock.set(0.016);
        let report = render_loop.tick(&mut context, &mut scheduler).unwrap();
        assert_eq!(render_loop.state(), LoopState::Running);
        assert_eq!(report.frame, 1);
        assert!((report.delta - 0.016).abs() < 1e-6);
        assert!(scheduler.take());
        assert_eq!(context.renderer.frames(), 1);
    }

    #[test]
    fn zero_delta_skips_animation_but_still_draws() {
        let clock = ManualClock::new();
        let mut render_loop = RenderLoop::new(Box::new(clock.clone()));
        let mut scheduler = FrameRequest::new();
        let mut context = context();

        let recorder = Recorder::default();
        let advanced = Rc::clone(&recorder.advanced);
        context.set_animator(Box::new(recorder));
        context.viewport.controls_mut().drag(40.0, 0.0, 600.0);

        clock.set(1.0);
        let first = render_loop.tick(&mut context, &mut scheduler).unwrap();
        let second = render_loop.tick(&mut context, &mut scheduler).unwrap();

        assert!(first.animated);
        assert_eq!(second.delta, 0.0);
        assert!(!second.animated);
        assert!(second.camera_moved);
        assert_eq!(*advanced.borrow(), [1.0]);
        assert_eq!(context.renderer.frames(), 2);
        assert_eq!(scheduler.total(), 2);
    }

    #[test]
    fn without_an_animator_ticks_still_run() {
        let clock = ManualClock::new();
        let mut render_loop = RenderLoop::new(Box::new(clock.clone()));
        let mut scheduler = FrameRequest::new();
        let mut context = context();

        clock.advance(0.5);
        let report = render_loop.tick(&mut context, &mut scheduler).unwrap();
        assert!(!report.animated);
        assert!(!report.camera_moved);
    }

    struct LostSurface;

    impl Renderer for LostSurface {
        fn set_size(&mut self, _width: u32, _height: u32) {}
        fn set_pixel_ratio(&mut self, _ratio: f32) {}

        fn draw(&mut self, _scene: &SceneGraph, _camera: &Camera) -> anyhow::Result<()> {
            anyhow::bail!("surface lost")
        }

        fn drawing_buffer_size(&self) -> [u32; 2] {
            [0, 0]
        }
    }

    #[test]
    fn draw_failure_stops_scheduling() {
        let mut render_loop = RenderLoop::new(Box::new(ManualClock::new()));
        let mut scheduler = FrameRequest::new();
        let viewport = ViewportController::new(
            Camera::new(75.0, 1.0, 0.1, 100.0),
            OrbitControls::new(Vec3::zeros()),
            ViewportState::new(800, 600, 2.0),
        );
        let mut context = SceneContext::new(SceneGraph::default(), viewport, LostSurface);

        let err = render_loop.tick(&mut context, &mut scheduler).unwrap_err();
        assert_eq!(err.to_string(), "surface lost");
        assert!(!scheduler.take());
        assert_eq!(render_loop.frames(), 0);
    }
}
