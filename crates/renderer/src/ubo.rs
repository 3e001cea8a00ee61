//! GPU-visible data layouts for shaders.
//!
//! These structures must match the GLSL uniform/storage block layouts
//! exactly. All structures use `#[repr(C)]` for predictable memory layout
//! and implement `Pod` and `Zeroable` for safe byte casting.
//!
//! # Frame uniform buffer
//!
//! Each frame slot owns one persistently mapped uniform buffer holding both
//! per-frame blocks: the camera block at offset 0 and the main-light block
//! at [`LIGHT_UBO_OFFSET`]. The two blocks are bound as separate descriptor
//! writes into the same buffer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Byte offset of the main-light block inside the frame uniform buffer.
///
/// 256 satisfies `minUniformBufferOffsetAlignment` on every desktop
/// implementation (the limit is at most 256 by spec).
pub const LIGHT_UBO_OFFSET: usize = 256;

/// Total size of the per-slot frame uniform buffer.
pub const FRAME_UBO_SIZE: usize = LIGHT_UBO_OFFSET + LightUbo::SIZE;

/// Maximum number of point lights in the per-frame storage buffer.
pub const MAX_POINT_LIGHTS: usize = 64;

/// Size of the per-slot point-light storage buffer: a 16-byte count header
/// followed by the light array.
pub const POINT_LIGHT_BUFFER_SIZE: usize =
    std::mem::size_of::<PointLightHeader>() + MAX_POINT_LIGHTS * PointLight::SIZE;

/// Camera uniform block (set 0, binding 0).
///
/// # Memory Layout
///
/// - Offset 0: view matrix (64 bytes)
/// - Offset 64: projection matrix (64 bytes)
/// - Total size: 128 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CameraUbo {
    /// View matrix (world to view space).
    pub view: Mat4,
    /// Projection matrix (view to clip space), Y flip already applied.
    pub projection: Mat4,
}

impl CameraUbo {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a new camera block.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }
}

/// Main-light uniform block (set 0 binding 1, and the shadow pass's set 0
/// binding 0).
///
/// # Memory Layout
///
/// - Offset 0: light view matrix (64 bytes)
/// - Offset 64: light projection matrix (64 bytes)
/// - Offset 128: light color (16 bytes)
/// - Total size: 144 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct LightUbo {
    /// View matrix from the light's point of view.
    pub view: Mat4,
    /// Projection matrix for the shadow pass.
    pub projection: Mat4,
    /// Light color, intensity in w.
    pub color: Vec4,
}

impl LightUbo {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a new light block.
    pub fn new(view: Mat4, projection: Mat4, color: Vec4) -> Self {
        Self {
            view,
            projection,
            color,
        }
    }
}

/// Per-draw push constants (vertex stage).
///
/// # Memory Layout
///
/// - Offset 0: model matrix (64 bytes)
/// - Offset 64: auxiliary data (16 bytes)
/// - Total size: 80 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PushConstants {
    /// Model matrix (object to world space).
    pub model: Mat4,
    /// Auxiliary per-draw data; the default shaders read a tint in xyz.
    pub data: Vec4,
}

impl PushConstants {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates push constants for a draw.
    pub fn new(model: Mat4, data: Vec4) -> Self {
        Self { model, data }
    }
}

/// Count header of the point-light storage buffer (set 0, binding 3).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PointLightHeader {
    /// Number of valid entries in the light array.
    pub count: u32,
    /// Padding up to the std430 array start.
    pub _padding: [u32; 3],
}

impl PointLightHeader {
    /// Creates a header for `count` lights.
    pub fn new(count: u32) -> Self {
        Self {
            count,
            _padding: [0; 3],
        }
    }
}

/// One entry of the point-light storage buffer.
///
/// # Memory Layout
///
/// - Offset 0: position (16 bytes, xyz + radius in w)
/// - Offset 16: color (16 bytes, rgb + intensity in w)
/// - Total size: 32 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PointLight {
    /// World position in xyz, falloff radius in w.
    pub position: Vec4,
    /// Color in rgb, intensity in w.
    pub color: Vec4,
}

impl PointLight {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_camera_ubo_size() {
        // 2 Mat4 = 128 bytes
        assert_eq!(CameraUbo::SIZE, 128);
    }

    #[test]
    fn test_light_ubo_size() {
        // 2 Mat4 + Vec4 = 144 bytes
        assert_eq!(LightUbo::SIZE, 144);
    }

    #[test]
    fn test_push_constants_size() {
        // Mat4 + Vec4 = 80 bytes, the layout's push constant range
        assert_eq!(PushConstants::SIZE, 80);
    }

    #[test]
    fn test_point_light_size() {
        assert_eq!(PointLight::SIZE, 32);
    }

    #[test]
    fn test_light_block_fits_after_camera_block() {
        // The camera block must not run into the light block
        assert!(CameraUbo::SIZE <= LIGHT_UBO_OFFSET);
        assert_eq!(FRAME_UBO_SIZE, LIGHT_UBO_OFFSET + LightUbo::SIZE);
    }

    #[test]
    fn test_light_offset_alignment() {
        // minUniformBufferOffsetAlignment is at most 256
        assert_eq!(LIGHT_UBO_OFFSET % 256, 0);
    }

    #[test]
    fn test_point_light_buffer_size() {
        assert_eq!(POINT_LIGHT_BUFFER_SIZE, 16 + 64 * 32);
    }

    #[test]
    fn test_ubo_alignment() {
        // Mat4 requires 16-byte alignment
        assert_eq!(std::mem::align_of::<CameraUbo>(), 16);
        assert_eq!(std::mem::align_of::<LightUbo>(), 16);
        assert_eq!(std::mem::align_of::<PushConstants>(), 16);
    }

    #[test]
    fn test_camera_ubo_new() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(45.0_f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);

        let ubo = CameraUbo::new(view, projection);

        assert_eq!(ubo.view, view);
        assert_eq!(ubo.projection, projection);
    }

    #[test]
    fn test_pod_casting() {
        let camera = CameraUbo::default();
        assert_eq!(bytemuck::bytes_of(&camera).len(), CameraUbo::SIZE);

        let light = LightUbo::default();
        assert_eq!(bytemuck::bytes_of(&light).len(), LightUbo::SIZE);

        let push = PushConstants::default();
        assert_eq!(bytemuck::bytes_of(&push).len(), PushConstants::SIZE);

        let header = PointLightHeader::new(3);
        assert_eq!(bytemuck::bytes_of(&header).len(), 16);
    }
}
