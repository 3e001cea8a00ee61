//! GPU mesh storage.
//!
//! A [`Mesh`] owns one device-local vertex buffer shared by all of its
//! submeshes. Each [`Submesh`] owns its own index buffer and references a
//! material by registry index; the draw loop sorts rebinds out per
//! submesh. Buffers are filled through staged uploads at creation and
//! never written again.

use std::sync::Arc;

use bytemuck::cast_slice;
use tracing::debug;

use glint_rhi::buffer::{Buffer, BufferUsage};
use glint_rhi::command::CommandPool;
use glint_rhi::device::Device;
use glint_rhi::upload::staged_upload;
use glint_rhi::vertex::Vertex;
use glint_rhi::{RhiError, RhiResult};

/// Index data and material assignment for one part of a mesh.
pub struct SubmeshDesc<'a> {
    /// Triangle list indices into the mesh's shared vertex buffer.
    pub indices: &'a [u16],
    /// Material registry index this submesh draws with.
    pub material: u32,
}

/// One drawable part of a [`Mesh`]: an index buffer plus a material.
pub struct Submesh {
    index_buffer: Buffer,
    index_count: u32,
    material: u32,
}

impl Submesh {
    /// Returns the device-local index buffer.
    #[inline]
    pub fn index_buffer(&self) -> &Buffer {
        &self.index_buffer
    }

    /// Returns the number of indices to draw.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Returns the material registry index.
    #[inline]
    pub fn material(&self) -> u32 {
        self.material
    }
}

/// Device-local mesh: a shared vertex buffer and one or more submeshes.
pub struct Mesh {
    vertex_buffer: Buffer,
    submeshes: Vec<Submesh>,
}

impl Mesh {
    /// Uploads vertex and index data into device-local buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if `vertices` is empty, any submesh has no indices,
    /// or buffer creation or the staged uploads fail.
    pub fn new(
        device: Arc<Device>,
        pool: &CommandPool,
        vertices: &[Vertex],
        submeshes: &[SubmeshDesc],
    ) -> RhiResult<Self> {
        if vertices.is_empty() {
            return Err(RhiError::InvalidHandle(
                "Mesh must have at least one vertex".to_string(),
            ));
        }

        let vertex_bytes: &[u8] = cast_slice(vertices);
        let vertex_buffer = Buffer::new(
            device.clone(),
            BufferUsage::Vertex,
            vertex_bytes.len() as u64,
        )?;
        staged_upload(pool, vertex_bytes, &vertex_buffer)?;

        let mut parts = Vec::with_capacity(submeshes.len());
        for desc in submeshes {
            if desc.indices.is_empty() {
                return Err(RhiError::InvalidHandle(
                    "Submesh must have at least one index".to_string(),
                ));
            }

            let index_bytes: &[u8] = cast_slice(desc.indices);
            let index_buffer = Buffer::new(
                device.clone(),
                BufferUsage::Index,
                index_bytes.len() as u64,
            )?;
            staged_upload(pool, index_bytes, &index_buffer)?;

            parts.push(Submesh {
                index_buffer,
                index_count: desc.indices.len() as u32,
                material: desc.material,
            });
        }

        debug!(
            "Created mesh: {} vertices, {} submesh(es)",
            vertices.len(),
            parts.len()
        );

        Ok(Self {
            vertex_buffer,
            submeshes: parts,
        })
    }

    /// Returns the shared device-local vertex buffer.
    #[inline]
    pub fn vertex_buffer(&self) -> &Buffer {
        &self.vertex_buffer
    }

    /// Returns the submeshes in draw order.
    #[inline]
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }
}
