//! Main-pass render targets.
//!
//! A [`RenderTargets`] holds one framebuffer per swapchain image, each
//! binding that image's color view together with the shared depth buffer.
//! On swapchain recreation the framebuffers and depth buffer are destroyed
//! first, then rebuilt against the new images in the same order.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use glint_rhi::RhiResult;
use glint_rhi::device::Device;
use glint_rhi::render_pass::{Framebuffer, RenderPass};
use glint_rhi::swapchain::Swapchain;

use crate::depth_buffer::DepthBuffer;

/// Framebuffers for the main color+depth pass, one per swapchain image.
pub struct RenderTargets {
    /// Shared depth attachment, sized to the swapchain extent.
    depth_buffer: DepthBuffer,
    /// One framebuffer per swapchain image, indexed by image index.
    framebuffers: Vec<Framebuffer>,
    extent: vk::Extent2D,
}

impl RenderTargets {
    /// Creates the depth buffer and one framebuffer per swapchain image.
    ///
    /// # Errors
    ///
    /// Returns an error if the swapchain extent is zero or any attachment
    /// creation fails.
    pub fn new(
        device: Arc<Device>,
        swapchain: &Swapchain,
        render_pass: &RenderPass,
    ) -> RhiResult<Self> {
        let extent = swapchain.extent();
        let depth_buffer = DepthBuffer::new(device.clone(), extent.width, extent.height)?;

        let mut framebuffers = Vec::with_capacity(swapchain.image_count() as usize);
        for &color_view in swapchain.image_views() {
            let attachments = [color_view, depth_buffer.view()];
            framebuffers.push(Framebuffer::new(
                device.clone(),
                render_pass,
                &attachments,
                extent,
            )?);
        }

        debug!(
            "Created {} main-pass framebuffers ({}x{})",
            framebuffers.len(),
            extent.width,
            extent.height
        );

        Ok(Self {
            depth_buffer,
            framebuffers,
            extent,
        })
    }

    /// Returns the framebuffer for the given swapchain image index.
    #[inline]
    pub fn framebuffer(&self, image_index: u32) -> &Framebuffer {
        &self.framebuffers[image_index as usize]
    }

    /// Returns the shared depth buffer.
    #[inline]
    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth_buffer
    }

    /// Returns the target extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}
