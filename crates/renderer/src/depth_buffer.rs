//! Depth buffer management.
//!
//! A [`DepthBuffer`] is a D32_SFLOAT attachment sized to the swapchain,
//! shared by every main-pass framebuffer. It is destroyed and rebuilt as
//! part of swapchain recreation (after the old framebuffers, before the
//! new ones).

use std::sync::Arc;

use ash::vk;
use tracing::info;

use glint_rhi::device::Device;
use glint_rhi::image::{Image, ImageDesc};
use glint_rhi::{RhiError, RhiResult};

/// Depth attachment format used throughout the renderer.
pub const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// Depth attachment for the main pass.
pub struct DepthBuffer {
    image: Image,
}

impl DepthBuffer {
    /// Creates a depth buffer matching the swapchain extent.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or image creation fails.
    pub fn new(device: Arc<Device>, width: u32, height: u32) -> RhiResult<Self> {
        if width == 0 || height == 0 {
            return Err(RhiError::InvalidHandle(
                "Depth buffer dimensions must be greater than 0".to_string(),
            ));
        }

        let image = Image::new(
            device,
            &ImageDesc::depth_2d(
                width,
                height,
                DEPTH_FORMAT,
                vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            ),
        )?;

        info!("Created depth buffer: {}x{}", width, height);

        Ok(Self { image })
    }

    /// Returns the depth image view for framebuffer attachment.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the depth format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.image.format()
    }

    /// Returns the depth buffer extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_format_is_depth_only() {
        assert_eq!(DEPTH_FORMAT, vk::Format::D32_SFLOAT);
    }
}
