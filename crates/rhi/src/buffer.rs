//! GPU buffer management.
//!
//! This module handles vertex, index, uniform, storage, and staging buffers.
//! Each buffer owns its backing `VkDeviceMemory`: creation runs
//! create → requirements → [`find_memory_type`] → allocate → bind, and `Drop`
//! releases the buffer then the memory, so every allocation has exactly one
//! release path.
//!
//! Host-visible buffers are persistently mapped at creation; the mapping
//! lives until the memory is freed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use glint_rhi::device::Device;
//! use glint_rhi::buffer::{Buffer, BufferUsage};
//!
//! # fn example(device: Arc<Device>) -> Result<(), glint_rhi::RhiError> {
//! // Per-frame uniform buffer, written through its persistent mapping
//! let uniform = Buffer::new(device, BufferUsage::Uniform, 256)?;
//! uniform.write_data(0, &[0u8; 128])?;
//! # Ok(())
//! # }
//! ```
//!
//! [`find_memory_type`]: crate::memory::find_memory_type

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Buffer usage type.
///
/// Determines the Vulkan usage flags and the memory property flags the
/// buffer is allocated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer - device local, filled by staged upload
    Vertex,
    /// Index buffer - device local, filled by staged upload
    Index,
    /// Uniform buffer - host visible, persistently mapped
    Uniform,
    /// Storage buffer - host visible, persistently mapped
    Storage,
    /// Staging buffer - transient transfer source
    Staging,
    /// Read-back buffer - transfer destination for debug device reads
    Readback,
}

impl BufferUsage {
    /// Converts to Vulkan buffer usage flags.
    ///
    /// Device-local buffers also carry TRANSFER_SRC so the debug read-back
    /// path can copy their contents out.
    pub fn to_vk_usage(self) -> vk::BufferUsageFlags {
        match self {
            BufferUsage::Vertex => {
                vk::BufferUsageFlags::VERTEX_BUFFER
                    | vk::BufferUsageFlags::TRANSFER_DST
                    | vk::BufferUsageFlags::TRANSFER_SRC
            }
            BufferUsage::Index => {
                vk::BufferUsageFlags::INDEX_BUFFER
                    | vk::BufferUsageFlags::TRANSFER_DST
                    | vk::BufferUsageFlags::TRANSFER_SRC
            }
            BufferUsage::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
            BufferUsage::Storage => vk::BufferUsageFlags::STORAGE_BUFFER,
            BufferUsage::Staging => vk::BufferUsageFlags::TRANSFER_SRC,
            BufferUsage::Readback => vk::BufferUsageFlags::TRANSFER_DST,
        }
    }

    /// Returns the memory property flags this buffer type is allocated with.
    pub fn memory_flags(self) -> vk::MemoryPropertyFlags {
        match self {
            BufferUsage::Vertex | BufferUsage::Index => vk::MemoryPropertyFlags::DEVICE_LOCAL,
            BufferUsage::Uniform
            | BufferUsage::Storage
            | BufferUsage::Staging
            | BufferUsage::Readback => {
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
            }
        }
    }

    /// Whether this buffer type is persistently mapped.
    pub fn is_host_visible(self) -> bool {
        self.memory_flags()
            .contains(vk::MemoryPropertyFlags::HOST_VISIBLE)
    }

    /// Returns a human-readable name for the buffer type.
    pub fn name(self) -> &'static str {
        match self {
            BufferUsage::Vertex => "vertex",
            BufferUsage::Index => "index",
            BufferUsage::Uniform => "uniform",
            BufferUsage::Storage => "storage",
            BufferUsage::Staging => "staging",
            BufferUsage::Readback => "readback",
        }
    }
}

/// GPU buffer with exclusively owned memory.
///
/// # Thread Safety
///
/// Not thread-safe; the frame orchestration protocol is single-threaded and
/// writes through the mapped pointer are unsynchronized.
pub struct Buffer {
    /// Reference to the logical device.
    device: Arc<Device>,
    /// Vulkan buffer handle.
    buffer: vk::Buffer,
    /// Backing device memory (exclusively owned).
    memory: vk::DeviceMemory,
    /// Persistent mapping for host-visible buffers.
    mapped: Option<std::ptr::NonNull<u8>>,
    /// Buffer size in bytes.
    size: vk::DeviceSize,
    /// Buffer usage type.
    usage: BufferUsage,
}

impl Buffer {
    /// Creates a new buffer with the specified size.
    ///
    /// Host-visible usages are mapped immediately and stay mapped for the
    /// buffer's lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero, buffer creation fails, no
    /// compatible memory type exists, or allocation/binding/mapping fails.
    pub fn new(device: Arc<Device>, usage: BufferUsage, size: vk::DeviceSize) -> RhiResult<Self> {
        if size == 0 {
            return Err(RhiError::InvalidHandle(
                "Buffer size must be greater than 0".to_string(),
            ));
        }

        let buffer_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage.to_vk_usage())
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.handle().create_buffer(&buffer_info, None)? };

        let requirements = unsafe { device.handle().get_buffer_memory_requirements(buffer) };

        let memory_type_index =
            match device.find_memory_type(requirements.memory_type_bits, usage.memory_flags()) {
                Ok(index) => index,
                Err(e) => {
                    unsafe { device.handle().destroy_buffer(buffer, None) };
                    return Err(e);
                }
            };

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        let memory = match unsafe { device.handle().allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.handle().destroy_buffer(buffer, None) };
                return Err(e.into());
            }
        };

        unsafe {
            device.handle().bind_buffer_memory(buffer, memory, 0)?;
        }

        let mapped = if usage.is_host_visible() {
            let ptr = unsafe {
                device
                    .handle()
                    .map_memory(memory, 0, size, vk::MemoryMapFlags::empty())?
            };
            std::ptr::NonNull::new(ptr as *mut u8)
        } else {
            None
        };

        debug!("Created {} buffer: {} bytes", usage.name(), size);

        Ok(Self {
            device,
            buffer,
            memory,
            mapped,
            size,
            usage,
        })
    }

    /// Creates a host-visible buffer initialized with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if buffer creation fails or the usage is not
    /// host-visible.
    pub fn new_with_data(device: Arc<Device>, usage: BufferUsage, data: &[u8]) -> RhiResult<Self> {
        let buffer = Self::new(device, usage, data.len() as vk::DeviceSize)?;
        buffer.write_data(0, data)?;
        Ok(buffer)
    }

    /// Writes data through the persistent mapping at the specified offset.
    ///
    /// The memory is host-coherent; writes are visible to the GPU without an
    /// explicit flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not host-visible or the write would
    /// exceed the buffer size.
    pub fn write_data(&self, offset: vk::DeviceSize, data: &[u8]) -> RhiResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let end = offset + data.len() as vk::DeviceSize;
        if end > self.size {
            return Err(RhiError::InvalidHandle(format!(
                "Write exceeds buffer size: offset {} + data {} > buffer {}",
                offset,
                data.len(),
                self.size
            )));
        }

        let mapped = self.mapped.ok_or_else(|| {
            RhiError::InvalidHandle(format!(
                "{} buffer is not host-visible, use a staged upload",
                self.usage.name()
            ))
        })?;

        unsafe {
            let dst = mapped.as_ptr().add(offset as usize);
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }

        Ok(())
    }

    /// Reads `len` bytes from the persistent mapping at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not host-visible or the range is
    /// out of bounds.
    pub fn read_data(&self, offset: vk::DeviceSize, len: usize) -> RhiResult<Vec<u8>> {
        let end = offset + len as vk::DeviceSize;
        if end > self.size {
            return Err(RhiError::InvalidHandle(format!(
                "Read exceeds buffer size: offset {} + len {} > buffer {}",
                offset, len, self.size
            )));
        }

        let mapped = self.mapped.ok_or_else(|| {
            RhiError::InvalidHandle(format!("{} buffer is not host-visible", self.usage.name()))
        })?;

        let mut out = vec![0u8; len];
        unsafe {
            let src = mapped.as_ptr().add(offset as usize);
            std::ptr::copy_nonoverlapping(src, out.as_mut_ptr(), len);
        }
        Ok(out)
    }

    /// Returns the Vulkan buffer handle.
    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Returns the buffer size in bytes.
    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Returns the buffer usage type.
    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Returns the persistent mapping, if this buffer is host-visible.
    #[inline]
    pub fn mapped_ptr(&self) -> Option<std::ptr::NonNull<u8>> {
        self.mapped
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        // Freeing the memory implicitly unmaps it
        unsafe {
            self.device.handle().destroy_buffer(self.buffer, None);
            self.device.handle().free_memory(self.memory, None);
        }

        debug!("Destroyed {} buffer", self.usage.name());
    }
}

// Safety: the buffer exclusively owns its memory and mapped pointer, the
// Vulkan handles are plain data, and `Device` is Send+Sync, so moving the
// buffer to another thread is safe. Not Sync: mapped writes are
// unsynchronized.
unsafe impl Send for Buffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_to_vk_flags() {
        assert!(BufferUsage::Vertex
            .to_vk_usage()
            .contains(vk::BufferUsageFlags::VERTEX_BUFFER));
        assert!(BufferUsage::Index
            .to_vk_usage()
            .contains(vk::BufferUsageFlags::INDEX_BUFFER));
        assert!(BufferUsage::Uniform
            .to_vk_usage()
            .contains(vk::BufferUsageFlags::UNIFORM_BUFFER));
        assert!(BufferUsage::Storage
            .to_vk_usage()
            .contains(vk::BufferUsageFlags::STORAGE_BUFFER));
        assert!(BufferUsage::Staging
            .to_vk_usage()
            .contains(vk::BufferUsageFlags::TRANSFER_SRC));
        assert!(BufferUsage::Readback
            .to_vk_usage()
            .contains(vk::BufferUsageFlags::TRANSFER_DST));
    }

    #[test]
    fn device_local_buffers_accept_transfers() {
        // Staged upload needs TRANSFER_DST, read-back needs TRANSFER_SRC
        for usage in [BufferUsage::Vertex, BufferUsage::Index] {
            let flags = usage.to_vk_usage();
            assert!(flags.contains(vk::BufferUsageFlags::TRANSFER_DST));
            assert!(flags.contains(vk::BufferUsageFlags::TRANSFER_SRC));
        }
    }

    #[test]
    fn memory_flags_by_usage() {
        assert_eq!(
            BufferUsage::Vertex.memory_flags(),
            vk::MemoryPropertyFlags::DEVICE_LOCAL
        );
        assert_eq!(
            BufferUsage::Index.memory_flags(),
            vk::MemoryPropertyFlags::DEVICE_LOCAL
        );
        for usage in [
            BufferUsage::Uniform,
            BufferUsage::Storage,
            BufferUsage::Staging,
            BufferUsage::Readback,
        ] {
            assert_eq!(
                usage.memory_flags(),
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
            );
        }
    }

    #[test]
    fn host_visibility_by_usage() {
        assert!(!BufferUsage::Vertex.is_host_visible());
        assert!(!BufferUsage::Index.is_host_visible());
        assert!(BufferUsage::Uniform.is_host_visible());
        assert!(BufferUsage::Storage.is_host_visible());
        assert!(BufferUsage::Staging.is_host_visible());
        assert!(BufferUsage::Readback.is_host_visible());
    }

    #[test]
    fn usage_names() {
        assert_eq!(BufferUsage::Vertex.name(), "vertex");
        assert_eq!(BufferUsage::Index.name(), "index");
        assert_eq!(BufferUsage::Uniform.name(), "uniform");
        assert_eq!(BufferUsage::Storage.name(), "storage");
        assert_eq!(BufferUsage::Staging.name(), "staging");
        assert_eq!(BufferUsage::Readback.name(), "readback");
    }
}
