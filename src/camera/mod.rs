use nalgebra_glm::{Mat4, Vec3};
pub mod orbit;

pub use orbit::OrbitControls;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    target: Vec3,

    fov: f32,
    aspect: f32,
    z_near: f32,
    z_far: f32,

    view: Mat4,
    projection: Mat4,
    projection_dirty: bool,
}

impl Camera {
    /// `fov` is the vertical field of view in degrees.
    pub fn new(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::zeros(),
            target: Vec3::new(0.0, 0.0, -1.0),
            fov,
            aspect,
            z_near,
            z_far,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            projection_dirty: true,
        };
        camera.update_view();
        camera.update_projection();
        camera
    }

    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        self.update_view();
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    pub fn update_projection(&mut self) -> bool {
        if !self.projection_dirty {
            return false;
        }
        self.projection = nalgebra_glm::perspective_rh_zo(
            self.aspect,
            f32::to_radians(self.fov),
            self.z_near,
            self.z_far,
        );
        self.projection_dirty = false;
        true
    }

    fn update_view(&mut self) {
        self.view = nalgebra_glm::look_at_rh(&self.position, &self.target, &Vec3::y());
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm::Vec4;

    #[test]
    fn aspect_changes_wait_for_update() {
        let mut camera = Camera::new(75.0, 800.0 / 600.0, 0.1, 100.0);
        assert!(!camera.is_projection_dirty());
        let before = *camera.projection();

        camera.set_aspect(2.0);
        assert!(camera.is_projection_dirty());
        assert_eq!(*camera.projection(), before);

        assert!(camera.update_projection());
        assert!(!camera.update_projection());
        assert_ne!(*camera.projection(), before);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let mut camera = Camera::new(75.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::new(2.0, 2.0, 2.0), Vec3::new(0.0, 0.75, 0.0));

        let clip = camera.view_projection() * Vec4::new(0.0, 0.75, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
