//! Sampler management.
//!
//! Two fixed configurations cover the renderer's needs: a texture sampler
//! (linear filtering, repeat addressing, max anisotropy) and a shadow-map
//! sampler (linear filtering, clamp-to-border with an opaque white border so
//! texels outside the shadow map read as unshadowed).

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// Owned `VkSampler`.
pub struct Sampler {
    device: Arc<Device>,
    sampler: vk::Sampler,
}

impl Sampler {
    /// Creates a texture sampler: linear min/mag, repeat addressing, and
    /// anisotropic filtering at the device's maximum.
    ///
    /// Anisotropy is safe to enable unconditionally; device selection
    /// requires the feature.
    ///
    /// # Errors
    ///
    /// Returns an error if sampler creation fails.
    pub fn texture(device: Arc<Device>) -> RhiResult<Self> {
        let max_anisotropy = device.limits().max_sampler_anisotropy;

        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(true)
            .max_anisotropy(max_anisotropy)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false);

        let sampler = unsafe { device.handle().create_sampler(&create_info, None)? };

        debug!("Created texture sampler (anisotropy {})", max_anisotropy);

        Ok(Self { device, sampler })
    }

    /// Creates a shadow-map sampler: linear filtering, clamp-to-border with
    /// a white border.
    ///
    /// # Errors
    ///
    /// Returns an error if sampler creation fails.
    pub fn shadow(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_BORDER)
            .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_BORDER)
            .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_BORDER)
            .anisotropy_enable(false)
            .border_color(vk::BorderColor::FLOAT_OPAQUE_WHITE)
            .unnormalized_coordinates(false);

        let sampler = unsafe { device.handle().create_sampler(&create_info, None)? };

        debug!("Created shadow sampler");

        Ok(Self { device, sampler })
    }

    /// Returns the Vulkan sampler handle.
    #[inline]
    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_sampler(self.sampler, None);
        }
        debug!("Destroyed sampler");
    }
}
