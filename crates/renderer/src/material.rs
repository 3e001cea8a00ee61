//! Materials.
//!
//! A [`Material`] owns its base color texture and the per-material
//! descriptor set (set 1 of the main pipeline) bound with that texture.
//! Submeshes reference materials by registry index; within a frame,
//! consecutive draws with the same index skip the set rebind.

use ash::vk;
use tracing::debug;

use glint_rhi::RhiResult;
use glint_rhi::descriptor::{self, DescriptorPool, DescriptorSetLayout};
use glint_rhi::device::Device;
use glint_rhi::texture::Texture;

/// A base color texture plus the descriptor set that binds it.
pub struct Material {
    texture: Texture,
    descriptor_set: vk::DescriptorSet,
}

impl Material {
    /// Creates a material from a texture, allocating and writing its
    /// descriptor set.
    ///
    /// The set is allocated from `pool` against the per-material layout
    /// and written once; the texture never changes afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if descriptor set allocation fails.
    pub fn new(
        device: &Device,
        pool: &DescriptorPool,
        layout: &DescriptorSetLayout,
        texture: Texture,
    ) -> RhiResult<Self> {
        let descriptor_set = pool.allocate(&[layout.handle()])?[0];

        let image_info = [descriptor::image_info(
            texture.sampler(),
            texture.view(),
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        )];
        let writes = [vk::WriteDescriptorSet::default()
            .dst_set(descriptor_set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_info)];
        descriptor::update_descriptor_sets(device, &writes);

        debug!("Created material");

        Ok(Self {
            texture,
            descriptor_set,
        })
    }

    /// Returns the material's descriptor set (main pipeline set 1).
    #[inline]
    pub fn descriptor_set(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }

    /// Returns the base color texture.
    #[inline]
    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}
