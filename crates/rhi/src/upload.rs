//! Staged host-to-device transfers.
//!
//! Device-local buffers cannot be written directly by the host. A staged
//! upload allocates a transient host-visible staging buffer, memcpys the
//! source bytes into it, records a one-shot copy command, blocks until the
//! graphics queue drains, and frees the staging buffer on return.
//!
//! These transfers are for resource creation, not per-frame data; per-frame
//! uniform and storage buffers stay persistently mapped instead.

use ash::vk;
use tracing::debug;

use crate::buffer::{Buffer, BufferUsage};
use crate::command::CommandPool;
use crate::error::{RhiError, RhiResult};

/// Uploads `data` into `dst` at offset 0 through a transient staging buffer.
///
/// Blocks the calling thread until the copy completes on the GPU.
///
/// # Errors
///
/// Returns an error if `data` does not fit in `dst`, staging allocation
/// fails, or the copy submission fails.
pub fn staged_upload(pool: &CommandPool, data: &[u8], dst: &Buffer) -> RhiResult<()> {
    if data.is_empty() {
        return Ok(());
    }

    if data.len() as vk::DeviceSize > dst.size() {
        return Err(RhiError::InvalidHandle(format!(
            "Upload of {} bytes exceeds destination buffer of {} bytes",
            data.len(),
            dst.size()
        )));
    }

    let staging = Buffer::new_with_data(pool.device().clone(), BufferUsage::Staging, data)?;

    let region = vk::BufferCopy {
        src_offset: 0,
        dst_offset: 0,
        size: data.len() as vk::DeviceSize,
    };

    pool.run_one_time_commands(|cmd| {
        cmd.copy_buffer(staging.handle(), dst.handle(), &[region]);
    })?;

    debug!("Staged upload: {} bytes", data.len());

    Ok(())
}

/// Debug read-back: copies `len` bytes from a device-local buffer into a
/// transient host-visible buffer and returns them.
///
/// The source must carry TRANSFER_SRC usage (vertex and index buffers do).
/// Blocks until the copy completes. Intended for verification, not for any
/// per-frame path.
///
/// # Errors
///
/// Returns an error if the range is out of bounds or the copy fails.
pub fn read_back(pool: &CommandPool, src: &Buffer, len: usize) -> RhiResult<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }

    if len as vk::DeviceSize > src.size() {
        return Err(RhiError::InvalidHandle(format!(
            "Read-back of {} bytes exceeds source buffer of {} bytes",
            len,
            src.size()
        )));
    }

    let readback = Buffer::new(
        pool.device().clone(),
        BufferUsage::Readback,
        len as vk::DeviceSize,
    )?;

    let region = vk::BufferCopy {
        src_offset: 0,
        dst_offset: 0,
        size: len as vk::DeviceSize,
    };

    pool.run_one_time_commands(|cmd| {
        cmd.copy_buffer(src.handle(), readback.handle(), &[region]);
    })?;

    readback.read_data(0, len)
}
