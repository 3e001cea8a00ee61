//! Camera.

use glam::{Mat4, Vec3};

/// A look-at perspective camera.
///
/// The projection matrix already carries the Vulkan Y flip, so shaders
/// consume it without any clip-space correction of their own.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up direction, normally `Vec3::Y`.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Width over height of the viewport.
    pub aspect: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Creates a camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a camera at `position` looking at `target`.
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    /// Updates the aspect ratio, typically on window resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Returns the world-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the view-to-clip matrix with the Vulkan Y flip applied.
    pub fn projection_matrix(&self) -> Mat4 {
        let mut proj = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        proj.y_axis.y *= -1.0;
        proj
    }

    /// Returns the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the normalized view direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_flips_y() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        assert!(proj.y_axis.y < 0.0);
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let camera = Camera::look_at(Vec3::new(3.0, 1.0, -2.0), Vec3::ZERO);
        let eye_in_view = camera.view_matrix().transform_point3(camera.position);
        assert!(eye_in_view.length() < 1e-5);
    }

    #[test]
    fn set_aspect_rejects_zero() {
        let mut camera = Camera::default();
        let before = camera.aspect;
        camera.set_aspect(0.0);
        assert_eq!(camera.aspect, before);
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn forward_points_at_target() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let forward = camera.forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
    }
}
