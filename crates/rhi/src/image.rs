//! GPU image management.
//!
//! Wraps a `VkImage`, its exclusively owned memory, and a default image view.
//! Used for depth buffers, shadow maps, and sampled textures; the same
//! create → requirements → memory-type → allocate → bind flow as
//! [`Buffer`](crate::buffer::Buffer), followed by view creation.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Creation parameters for an [`Image`].
#[derive(Clone, Copy, Debug)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    /// Array layers; 1 for plain 2D images, 6 for cube maps.
    pub layers: u32,
    pub format: vk::Format,
    pub tiling: vk::ImageTiling,
    pub usage: vk::ImageUsageFlags,
    /// Aspect for the default view (COLOR or DEPTH).
    pub aspect: vk::ImageAspectFlags,
    /// View type for the default view (TYPE_2D, CUBE, ...).
    pub view_type: vk::ImageViewType,
}

impl ImageDesc {
    /// A plain 2D color image.
    pub fn color_2d(width: u32, height: u32, format: vk::Format, usage: vk::ImageUsageFlags) -> Self {
        Self {
            width,
            height,
            layers: 1,
            format,
            tiling: vk::ImageTiling::OPTIMAL,
            usage,
            aspect: vk::ImageAspectFlags::COLOR,
            view_type: vk::ImageViewType::TYPE_2D,
        }
    }

    /// A 2D depth image.
    pub fn depth_2d(width: u32, height: u32, format: vk::Format, usage: vk::ImageUsageFlags) -> Self {
        Self {
            width,
            height,
            layers: 1,
            format,
            tiling: vk::ImageTiling::OPTIMAL,
            usage,
            aspect: vk::ImageAspectFlags::DEPTH,
            view_type: vk::ImageViewType::TYPE_2D,
        }
    }
}

/// GPU image with exclusively owned memory and a default view.
///
/// Destruction order: view, image, memory.
pub struct Image {
    /// Reference to the logical device.
    device: Arc<Device>,
    /// Vulkan image handle.
    image: vk::Image,
    /// Backing device memory (exclusively owned).
    memory: vk::DeviceMemory,
    /// Default image view over all layers.
    view: vk::ImageView,
    format: vk::Format,
    extent: vk::Extent2D,
    layers: u32,
}

impl Image {
    /// Creates a device-local image and its default view.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are zero, or image creation, memory
    /// allocation/binding, or view creation fails.
    pub fn new(device: Arc<Device>, desc: &ImageDesc) -> RhiResult<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RhiError::InvalidHandle(
                "Image dimensions must be greater than 0".to_string(),
            ));
        }

        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(desc.format)
            .extent(vk::Extent3D {
                width: desc.width,
                height: desc.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(desc.layers)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(desc.tiling)
            .usage(desc.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { device.handle().create_image(&image_info, None)? };

        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let memory_type_index = match device.find_memory_type(
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ) {
            Ok(index) => index,
            Err(e) => {
                unsafe { device.handle().destroy_image(image, None) };
                return Err(e);
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        let memory = match unsafe { device.handle().allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.handle().destroy_image(image, None) };
                return Err(e.into());
            }
        };

        unsafe {
            device.handle().bind_image_memory(image, memory, 0)?;
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(desc.view_type)
            .format(desc.format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(desc.aspect)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(desc.layers),
            );

        let view = unsafe { device.handle().create_image_view(&view_info, None)? };

        debug!(
            "Created image: {}x{}x{} ({:?})",
            desc.width, desc.height, desc.layers, desc.format
        );

        Ok(Self {
            device,
            image,
            memory,
            view,
            format: desc.format,
            extent: vk::Extent2D {
                width: desc.width,
                height: desc.height,
            },
            layers: desc.layers,
        })
    }

    /// Returns the Vulkan image handle.
    #[inline]
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// Returns the default image view.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Returns the image format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Returns the image extent (width and height).
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Returns the number of array layers.
    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_image_view(self.view, None);
            self.device.handle().destroy_image(self.image, None);
            self.device.handle().free_memory(self.memory, None);
        }

        debug!(
            "Destroyed image: {}x{}",
            self.extent.width, self.extent.height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_2d_desc_defaults() {
        let desc = ImageDesc::color_2d(
            256,
            256,
            vk::Format::R8G8B8A8_SRGB,
            vk::ImageUsageFlags::SAMPLED,
        );
        assert_eq!(desc.layers, 1);
        assert_eq!(desc.tiling, vk::ImageTiling::OPTIMAL);
        assert_eq!(desc.aspect, vk::ImageAspectFlags::COLOR);
        assert_eq!(desc.view_type, vk::ImageViewType::TYPE_2D);
    }

    #[test]
    fn depth_2d_desc_uses_depth_aspect() {
        let desc = ImageDesc::depth_2d(
            1024,
            1024,
            vk::Format::D32_SFLOAT,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        );
        assert_eq!(desc.aspect, vk::ImageAspectFlags::DEPTH);
        assert_eq!(desc.format, vk::Format::D32_SFLOAT);
    }
}
