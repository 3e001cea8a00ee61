//! Light definitions.

use glam::{Mat4, Vec3};

/// The shadow-casting main light.
///
/// Modeled as a directional light rendered through an orthographic volume
/// centered on `target`; the same view and projection matrices drive both
/// the shadow pass and the main pass's shadow lookup. The projection
/// carries the Vulkan Y flip like the camera's does.
#[derive(Clone, Debug)]
pub struct MainLight {
    /// Light position in world space.
    pub position: Vec3,
    /// Point the light looks at.
    pub target: Vec3,
    /// Light color.
    pub color: Vec3,
    /// Light intensity multiplier.
    pub intensity: f32,
    /// Half-extent of the orthographic shadow volume.
    pub extent: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Default for MainLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 20.0, 10.0),
            target: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
            extent: 20.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl MainLight {
    /// Creates a light with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the world-to-light-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        // Up is chosen off-axis so a straight-down light still has a
        // well-defined basis
        let up = if self.forward().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    /// Returns the orthographic shadow projection with the Vulkan Y flip.
    pub fn projection_matrix(&self) -> Mat4 {
        let e = self.extent;
        let mut proj = Mat4::orthographic_rh(-e, e, -e, e, self.near, self.far);
        proj.y_axis.y *= -1.0;
        proj
    }

    /// Returns the normalized light direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// An omnidirectional point light, shaded without shadows.
#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    /// Light position in world space.
    pub position: Vec3,
    /// Falloff radius.
    pub radius: f32,
    /// Light color.
    pub color: Vec3,
    /// Light intensity multiplier.
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 10.0,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl PointLight {
    /// Creates a point light at `position` with the given color.
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_light_projection_flips_y() {
        let proj = MainLight::default().projection_matrix();
        assert!(proj.y_axis.y < 0.0);
    }

    #[test]
    fn straight_down_light_has_valid_view() {
        let light = MainLight {
            position: Vec3::new(0.0, 10.0, 0.0),
            target: Vec3::ZERO,
            ..MainLight::default()
        };
        let view = light.view_matrix();
        assert!(view.is_finite());
    }

    #[test]
    fn point_light_new_keeps_defaults() {
        let light = PointLight::new(Vec3::X, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(light.position, Vec3::X);
        assert_eq!(light.radius, 10.0);
        assert_eq!(light.intensity, 1.0);
    }
}
