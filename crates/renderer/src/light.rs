//! Shadow-casting light resources.
//!
//! A [`ShadowMap`] is the GPU side of one shadow-casting light: a square
//! depth image rendered by the depth-only pass and sampled by the main
//! pass. Its framebuffer targets the shadow render pass and is
//! extent-independent, so it survives swapchain recreation untouched.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use glint_rhi::RhiResult;
use glint_rhi::device::Device;
use glint_rhi::image::{Image, ImageDesc};
use glint_rhi::render_pass::{Framebuffer, RenderPass};
use glint_rhi::sampler::Sampler;

use crate::depth_buffer::DEPTH_FORMAT;
use crate::passes::SHADOW_MAP_SIZE;

/// Depth map, framebuffer, and sampler for one shadow-casting light.
pub struct ShadowMap {
    image: Image,
    framebuffer: Framebuffer,
    sampler: Sampler,
}

impl ShadowMap {
    /// Creates the shadow depth image and its framebuffer over the
    /// depth-only pass.
    ///
    /// # Errors
    ///
    /// Returns an error if image, framebuffer, or sampler creation fails.
    pub fn new(device: Arc<Device>, shadow_pass: &RenderPass) -> RhiResult<Self> {
        let image = Image::new(
            device.clone(),
            &ImageDesc::depth_2d(
                SHADOW_MAP_SIZE,
                SHADOW_MAP_SIZE,
                DEPTH_FORMAT,
                vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
            ),
        )?;

        let framebuffer = Framebuffer::new(
            device.clone(),
            shadow_pass,
            &[image.view()],
            vk::Extent2D {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
            },
        )?;

        let sampler = Sampler::shadow(device)?;

        debug!("Created {0}x{0} shadow map", SHADOW_MAP_SIZE);

        Ok(Self {
            image,
            framebuffer,
            sampler,
        })
    }

    /// Returns the depth image view for descriptor writes.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the framebuffer targeting the depth-only pass.
    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Returns the shadow sampler.
    #[inline]
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler.handle()
    }

    /// Returns the shadow map extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}
