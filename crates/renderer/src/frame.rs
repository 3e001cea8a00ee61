//! Per-slot frame resources.
//!
//! A [`FrameSlot`] bundles everything one frame in flight owns: the command
//! buffer, the three synchronization objects, the persistently mapped
//! per-frame buffers, the frame-global descriptor sets, and the
//! bound-material cache. The slots form a ring driven by [`SlotCursor`];
//! [`crate::frame_manager::FrameManager`] owns the ring.

use std::sync::Arc;

use ash::vk;
use bytemuck::bytes_of;

use glint_rhi::RhiResult;
use glint_rhi::buffer::{Buffer, BufferUsage};
use glint_rhi::command::{CommandBuffer, CommandPool};
use glint_rhi::device::Device;
use glint_rhi::sync::{Fence, MAX_FRAMES_IN_FLIGHT, Semaphore};

use crate::ubo::{
    CameraUbo, FRAME_UBO_SIZE, LIGHT_UBO_OFFSET, LightUbo, MAX_POINT_LIGHTS, POINT_LIGHT_BUFFER_SIZE,
    PointLight, PointLightHeader,
};

/// Tracks the material bound by the last draw within a frame slot.
///
/// Consecutive draws with the same material skip the pipeline and
/// descriptor-set rebind. The cache is cleared at the start of every frame
/// (and when a pass switches pipelines) so the first draw always binds.
#[derive(Debug, Default)]
pub struct BoundMaterialCache {
    bound: Option<u32>,
}

impl BoundMaterialCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self { bound: None }
    }

    /// Forgets the bound material. Called at frame start and at pass
    /// boundaries, where the pipeline changes out from under the cache.
    pub fn reset(&mut self) {
        self.bound = None;
    }

    /// Records a draw with `material` and reports whether a rebind is needed.
    ///
    /// Returns `true` exactly when `material` differs from the previously
    /// recorded one.
    pub fn needs_bind(&mut self, material: u32) -> bool {
        if self.bound == Some(material) {
            false
        } else {
            self.bound = Some(material);
            true
        }
    }
}

/// Ring cursor over the frame slots.
#[derive(Debug, Default)]
pub struct SlotCursor {
    index: usize,
}

impl SlotCursor {
    /// Creates a cursor at slot 0.
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Returns the current slot index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advances to the next slot, wrapping at [`MAX_FRAMES_IN_FLIGHT`].
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % MAX_FRAMES_IN_FLIGHT;
    }
}

/// Resources owned by one frame in flight.
///
/// # Synchronization Flow
///
/// ```text
/// 1. Wait on in_flight fence (CPU waits for the previous use of this slot)
/// 2. Acquire swapchain image (signals image_available)
/// 3. Reset fence, record commands
/// 4. Submit: wait image_available at COLOR_ATTACHMENT_OUTPUT,
///    signal render_finished, signal in_flight fence
/// 5. Present (waits on render_finished)
/// ```
///
/// The frame uniform buffer and the point-light storage buffer are
/// host-visible and persistently mapped; writing them is only safe after
/// the slot's fence wait.
pub struct FrameSlot {
    /// Command buffer for this slot's rendering commands.
    command_buffer: CommandBuffer,
    /// Signaled when the acquired swapchain image is ready.
    image_available: Semaphore,
    /// Signaled when this slot's commands finish on the GPU.
    render_finished: Semaphore,
    /// CPU backpressure fence, created signaled.
    in_flight: Fence,
    /// Camera block at offset 0, main-light block at LIGHT_UBO_OFFSET.
    frame_ubo: Buffer,
    /// Count header plus point-light array.
    point_lights: Buffer,
    /// Frame-global descriptor set (set 0 of the main pipeline).
    frame_set: vk::DescriptorSet,
    /// Shadow-pass descriptor set (set 0 of the shadow pipeline).
    shadow_set: vk::DescriptorSet,
    /// Skips redundant material rebinds within this slot's frame.
    materials: BoundMaterialCache,
}

impl FrameSlot {
    /// Creates the slot's command buffer, sync objects, and mapped buffers.
    ///
    /// Descriptor sets start null; the renderer writes them once the
    /// frame-global layouts and the shadow map exist
    /// (see [`attach_descriptor_sets`](Self::attach_descriptor_sets)).
    ///
    /// # Errors
    ///
    /// Returns an error if any resource creation fails.
    pub fn new(device: Arc<Device>, command_pool: &CommandPool) -> RhiResult<Self> {
        let command_buffer = CommandBuffer::new(device.clone(), command_pool)?;
        let image_available = Semaphore::new(device.clone())?;
        let render_finished = Semaphore::new(device.clone())?;
        // Signaled so the first wait doesn't block forever
        let in_flight = Fence::new(device.clone(), true)?;

        let frame_ubo = Buffer::new(
            device.clone(),
            BufferUsage::Uniform,
            FRAME_UBO_SIZE as vk::DeviceSize,
        )?;
        let point_lights = Buffer::new(
            device,
            BufferUsage::Storage,
            POINT_LIGHT_BUFFER_SIZE as vk::DeviceSize,
        )?;

        Ok(Self {
            command_buffer,
            image_available,
            render_finished,
            in_flight,
            frame_ubo,
            point_lights,
            frame_set: vk::DescriptorSet::null(),
            shadow_set: vk::DescriptorSet::null(),
            materials: BoundMaterialCache::new(),
        })
    }

    /// Stores the slot's descriptor sets after they have been written.
    pub fn attach_descriptor_sets(
        &mut self,
        frame_set: vk::DescriptorSet,
        shadow_set: vk::DescriptorSet,
    ) {
        self.frame_set = frame_set;
        self.shadow_set = shadow_set;
    }

    /// Writes the camera block into the mapped frame uniform buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer write fails.
    pub fn write_camera(&self, camera: &CameraUbo) -> RhiResult<()> {
        self.frame_ubo.write_data(0, bytes_of(camera))
    }

    /// Writes the main-light block into the mapped frame uniform buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer write fails.
    pub fn write_light(&self, light: &LightUbo) -> RhiResult<()> {
        self.frame_ubo
            .write_data(LIGHT_UBO_OFFSET as vk::DeviceSize, bytes_of(light))
    }

    /// Writes the point-light list (header + entries) into the mapped
    /// storage buffer. Lights beyond [`MAX_POINT_LIGHTS`] are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer write fails.
    pub fn write_point_lights(&self, lights: &[PointLight]) -> RhiResult<()> {
        let lights = &lights[..lights.len().min(MAX_POINT_LIGHTS)];

        let header = PointLightHeader::new(lights.len() as u32);
        self.point_lights.write_data(0, bytes_of(&header))?;
        if !lights.is_empty() {
            self.point_lights.write_data(
                std::mem::size_of::<PointLightHeader>() as vk::DeviceSize,
                bytemuck::cast_slice(lights),
            )?;
        }
        Ok(())
    }

    /// Returns the slot's command buffer.
    #[inline]
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.command_buffer
    }

    /// Returns the image-available semaphore.
    #[inline]
    pub fn image_available(&self) -> &Semaphore {
        &self.image_available
    }

    /// Returns the render-finished semaphore.
    #[inline]
    pub fn render_finished(&self) -> &Semaphore {
        &self.render_finished
    }

    /// Returns the in-flight fence.
    #[inline]
    pub fn in_flight(&self) -> &Fence {
        &self.in_flight
    }

    /// Returns the frame uniform buffer.
    #[inline]
    pub fn frame_ubo(&self) -> &Buffer {
        &self.frame_ubo
    }

    /// Returns the point-light storage buffer.
    #[inline]
    pub fn point_light_buffer(&self) -> &Buffer {
        &self.point_lights
    }

    /// Returns the frame-global descriptor set.
    #[inline]
    pub fn frame_set(&self) -> vk::DescriptorSet {
        self.frame_set
    }

    /// Returns the shadow-pass descriptor set.
    #[inline]
    pub fn shadow_set(&self) -> vk::DescriptorSet {
        self.shadow_set
    }

    /// Returns the bound-material cache.
    #[inline]
    pub fn materials(&mut self) -> &mut BoundMaterialCache {
        &mut self.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_cycles_through_slots() {
        let mut cursor = SlotCursor::new();
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(cursor.index());
            cursor.advance();
        }
        assert_eq!(seen, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn first_draw_always_binds() {
        let mut cache = BoundMaterialCache::new();
        assert!(cache.needs_bind(7));
    }

    #[test]
    fn same_material_binds_once() {
        // Three consecutive draws with one material: exactly one rebind
        let mut cache = BoundMaterialCache::new();
        let rebinds = [0u32, 0, 0]
            .iter()
            .filter(|&&m| cache.needs_bind(m))
            .count();
        assert_eq!(rebinds, 1);
    }

    #[test]
    fn material_change_rebinds() {
        let mut cache = BoundMaterialCache::new();
        assert!(cache.needs_bind(0));
        assert!(cache.needs_bind(1));
        assert!(cache.needs_bind(0));
        assert!(!cache.needs_bind(0));
    }

    #[test]
    fn reset_forces_rebind() {
        let mut cache = BoundMaterialCache::new();
        assert!(cache.needs_bind(2));
        assert!(!cache.needs_bind(2));
        cache.reset();
        assert!(cache.needs_bind(2));
    }
}
