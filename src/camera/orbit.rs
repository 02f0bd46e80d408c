use crate::camera::Camera;
use nalgebra_glm::Vec3;
use std::f32::consts::{PI, TAU};

const EPSILON: f32 = 1e-6;

/// Spherical coordinates around a target, y up.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +y.
    phi: f32,
    /// Azimuth around y, measured from +z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: &Vec3) -> Self {
        let radius = offset.norm();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Damped orbit around a target point.
///
/// Input only accumulates a pending rotation; [`OrbitControls::update`]
/// applies a fraction of it each frame when damping is on, so the camera
/// keeps drifting for a while after the pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pending: Spherical,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending: Spherical::default(),
            scale: 1.0,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = damping_factor;
        self
    }

    /// Pointer drag in pixels, relative to the surface height.
    pub fn drag(&mut self, dx: f32, dy: f32, surface_height: f32) {
        if surface_height <= 0.0 {
            return;
        }
        self.pending.theta -= TAU * dx / surface_height * self.rotate_speed;
        self.pending.phi -= TAU * dy / surface_height * self.rotate_speed;
    }

    /// Wheel steps; positive moves closer.
    pub fn zoom(&mut self, steps: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        self.scale *= step.powf(steps);
    }

    pub fn is_settled(&self) -> bool {
        self.pending.theta.abs() < EPSILON && self.pending.phi.abs() < EPSILON && self.scale == 1.0
    }

    /// Moves the camera one step towards the pending orbit. Call exactly
    /// once per frame; returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if self.is_settled() && camera.target() == self.target {
            return false;
        }

        let mut spherical = Spherical::from_offset(&(camera.position - self.target));

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.pending.theta * factor;
        spherical.phi = (spherical.phi + self.pending.phi * factor).clamp(EPSILON, PI - EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.pending.theta *= 1.0 - self.damping_factor;
            self.pending.phi *= 1.0 - self.damping_factor;
        } else {
            self.pending = Spherical::default();
        }
        self.scale = 1.0;

        let position = self.target + spherical.to_offset();
        let moved = nalgebra_glm::distance(&position, &camera.position) > EPSILON
            || camera.target() != self.target;
        camera.look_at(position, self.target);
        moved
    }
}
