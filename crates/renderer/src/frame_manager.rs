//! The frame synchronization ring.
//!
//! This module provides the [`FrameManager`], which owns
//! [`MAX_FRAMES_IN_FLIGHT`] [`FrameSlot`]s and drives the per-frame
//! synchronization protocol:
//!
//! 1. While the GPU renders frame N, the CPU prepares frame N+1
//! 2. Each slot has its own command buffer, semaphores, fence, and mapped
//!    buffers, so slots never contend
//! 3. The slot fence is the only backpressure bounding the CPU
//!
//! # Protocol
//!
//! ```no_run
//! use std::sync::Arc;
//! use glint_rhi::command::CommandPool;
//! use glint_rhi::device::Device;
//! use glint_rhi::swapchain::Swapchain;
//! use glint_renderer::frame_manager::FrameManager;
//!
//! # fn example(
//! #     device: Arc<Device>,
//! #     command_pool: &CommandPool,
//! #     swapchain: &Swapchain,
//! # ) -> Result<(), glint_rhi::RhiError> {
//! let mut frames = FrameManager::new(device, command_pool)?;
//!
//! frames.wait_for_frame()?;
//! let stale = frames.acquire_next_image(swapchain)?;
//! if stale {
//!     // Recreate the swapchain and abandon this frame. The fence was NOT
//!     // reset, so the slot behaves as if this frame never started.
//!     return Ok(());
//! }
//! frames.begin_commands()?;
//! // record passes...
//! frames.end_commands()?;
//! frames.submit()?;
//! let stale = frames.present(swapchain)?;
//! frames.next_frame(); // advances regardless of the present outcome
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use glint_rhi::RhiResult;
use glint_rhi::command::CommandPool;
use glint_rhi::device::Device;
use glint_rhi::swapchain::Swapchain;
use glint_rhi::sync::MAX_FRAMES_IN_FLIGHT;

use crate::frame::{FrameSlot, SlotCursor};

/// Owns the frame-slot ring and sequences acquire/submit/present.
///
/// # Thread Safety
///
/// The frame manager is not thread-safe. It should only be accessed from
/// the render thread.
pub struct FrameManager {
    /// Reference to the logical device.
    device: Arc<Device>,
    /// Per-frame resources, one per frame in flight.
    slots: Vec<FrameSlot>,
    /// Ring cursor selecting the current slot.
    cursor: SlotCursor,
    /// Swapchain image index acquired for the current frame.
    image_index: u32,
}

impl FrameManager {
    /// Creates the ring with [`MAX_FRAMES_IN_FLIGHT`] slots.
    ///
    /// # Errors
    ///
    /// Returns an error if any slot resource creation fails.
    pub fn new(device: Arc<Device>, command_pool: &CommandPool) -> RhiResult<Self> {
        let mut slots = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);

        for i in 0..MAX_FRAMES_IN_FLIGHT {
            let slot = FrameSlot::new(device.clone(), command_pool)?;
            debug!("Created frame slot {}", i);
            slots.push(slot);
        }

        info!(
            "Frame manager created with {} frames in flight",
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            device,
            slots,
            cursor: SlotCursor::new(),
            image_index: 0,
        })
    }

    /// Returns the current frame slot.
    #[inline]
    pub fn current(&self) -> &FrameSlot {
        &self.slots[self.cursor.index()]
    }

    /// Returns the current frame slot mutably.
    #[inline]
    pub fn current_mut(&mut self) -> &mut FrameSlot {
        let index = self.cursor.index();
        &mut self.slots[index]
    }

    /// Returns the current slot index (0 to MAX_FRAMES_IN_FLIGHT - 1).
    #[inline]
    pub fn slot_index(&self) -> usize {
        self.cursor.index()
    }

    /// Returns the swapchain image index acquired for the current frame.
    #[inline]
    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    /// Returns all frame slots, for one-time descriptor set wiring.
    #[inline]
    pub fn slots_mut(&mut self) -> &mut [FrameSlot] {
        &mut self.slots
    }

    /// Blocks until the current slot's previous submission has completed.
    ///
    /// Must be called before touching the slot's command buffer or mapped
    /// buffers. Does not reset the fence; that happens in
    /// [`begin_commands`](Self::begin_commands), after acquisition has
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait fails.
    pub fn wait_for_frame(&self) -> RhiResult<()> {
        self.current().in_flight().wait(u64::MAX)?;
        Ok(())
    }

    /// Acquires the next swapchain image, signaling the slot's
    /// image-available semaphore.
    ///
    /// # Returns
    ///
    /// Returns `true` if the swapchain is stale (out of date or suboptimal)
    /// and must be recreated; the caller abandons the frame. Because the
    /// fence has not been reset yet, abandoning here leaves the slot in the
    /// same state as before the frame started.
    ///
    /// # Errors
    ///
    /// Returns an error for acquisition failures other than staleness.
    pub fn acquire_next_image(&mut self, swapchain: &Swapchain) -> RhiResult<bool> {
        let slot = self.current();

        match swapchain.acquire_next_image(slot.image_available().handle()) {
            Ok((index, suboptimal)) => {
                self.image_index = index;
                Ok(suboptimal)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date during acquire");
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resets the slot fence and begins command recording.
    ///
    /// Only called once acquisition has succeeded, so an abandoned frame
    /// never leaves the fence unsignaled.
    ///
    /// # Errors
    ///
    /// Returns an error if the fence reset or command buffer begin fails.
    pub fn begin_commands(&mut self) -> RhiResult<()> {
        let slot = self.current_mut();
        slot.materials().reset();

        let slot = self.current();
        slot.in_flight().reset()?;
        slot.command_buffer().reset()?;
        slot.command_buffer().begin()?;
        Ok(())
    }

    /// Ends command recording for the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if ending the command buffer fails.
    pub fn end_commands(&self) -> RhiResult<()> {
        self.current().command_buffer().end()?;
        Ok(())
    }

    /// Submits the current slot's commands to the graphics queue.
    ///
    /// Waits on the image-available semaphore at COLOR_ATTACHMENT_OUTPUT
    /// (shadow passes and vertex work may start before the image is ready),
    /// signals the render-finished semaphore and the slot fence.
    ///
    /// # Errors
    ///
    /// Returns an error if queue submission fails.
    pub fn submit(&self) -> RhiResult<()> {
        let slot = self.current();

        let wait_semaphores = [slot.image_available().handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [slot.render_finished().handle()];
        let command_buffers = [slot.command_buffer().handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .submit_graphics(&[submit_info], slot.in_flight().handle())?;
        }

        Ok(())
    }

    /// Presents the acquired image, waiting on render-finished.
    ///
    /// # Returns
    ///
    /// Returns `true` if the swapchain is stale and must be recreated.
    ///
    /// # Errors
    ///
    /// Returns an error for presentation failures other than staleness.
    pub fn present(&self, swapchain: &Swapchain) -> RhiResult<bool> {
        let slot = self.current();

        match swapchain.present(
            self.device.present_queue(),
            self.image_index,
            slot.render_finished().handle(),
        ) {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date during present");
                Ok(true)
            }
            Err(vk::Result::SUBOPTIMAL_KHR) => {
                debug!("Swapchain suboptimal during present");
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Advances the ring cursor. Called once per frame, after present,
    /// regardless of the present outcome.
    pub fn next_frame(&mut self) {
        self.cursor.advance();
    }

    /// Waits for every in-flight frame to complete.
    ///
    /// Used before destroying resources or recreating the swapchain.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait fails.
    pub fn wait_for_all_frames(&self) -> RhiResult<()> {
        let fences: Vec<vk::Fence> = self.slots.iter().map(|s| s.in_flight().handle()).collect();

        unsafe {
            self.device
                .handle()
                .wait_for_fences(&fences, true, u64::MAX)?;
        }

        Ok(())
    }

    /// Returns a reference to the device.
    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_manager_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FrameManager>();
    }

    #[test]
    fn test_frame_slot_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FrameSlot>();
    }
}
