//! Renderer orchestration.
//!
//! [`Renderer`] owns every GPU object and sequences a frame:
//!
//! ```text
//! begin_frame -> begin_shadow_pass -> draw* -> end_pass
//!             -> begin_main_pass   -> draw* -> end_pass
//!             -> submit_draws -> end_frame
//! ```
//!
//! `begin_frame` returning [`FrameStatus::SwapchainStale`] means the frame
//! was abandoned (swapchain rebuilt or the window has zero size); the
//! caller skips the rest of the sequence and tries again next frame.
//!
//! # Caller contract
//!
//! Draws are only valid between a begin-pass and `end_pass`, and the pass
//! brackets must nest correctly inside `begin_frame`/`end_frame`. The
//! renderer does not defend against violations.
//!
//! # Initialization order
//!
//! Creation is staged and the order is load-bearing: instance, surface,
//! device, command pool, swapchain, passes (needs the surface format),
//! render targets, shadow map (needs the shadow pass), descriptor pool,
//! frame ring, descriptor wiring (needs pool, layouts, shadow map, and the
//! slots' buffers), then the default material.

use std::mem::ManuallyDrop;
use std::sync::Arc;

use ash::vk;
use glam::{Mat4, Vec4};
use tracing::{debug, error, info};

use glint_platform::{Surface, Window};
use glint_rhi::command::CommandPool;
use glint_rhi::descriptor::{self, DescriptorPool, update_descriptor_sets};
use glint_rhi::device::Device;
use glint_rhi::instance::Instance;
use glint_rhi::physical_device::select_physical_device;
use glint_rhi::swapchain::Swapchain;
use glint_rhi::sync::MAX_FRAMES_IN_FLIGHT;
use glint_rhi::texture::Texture;
use glint_rhi::vertex::Vertex;
use glint_rhi::{RhiError, RhiResult};
use glint_scene::{Camera, MainLight, PointLight};

use crate::config::RendererConfig;
use crate::frame::FrameSlot;
use crate::frame_manager::FrameManager;
use crate::light::ShadowMap;
use crate::material::Material;
use crate::mesh::{Mesh, SubmeshDesc};
use crate::passes::Passes;
use crate::registry::{MaterialHandle, MeshHandle, Registry};
use crate::render_target::RenderTargets;
use crate::ubo::{self, CameraUbo, LIGHT_UBO_OFFSET, LightUbo, PushConstants};

/// Maximum number of materials the descriptor pool is sized for.
const MAX_MATERIALS: u32 = 64;

/// Outcome of `begin_frame` and `end_frame`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame proceeded normally.
    Ready,
    /// The swapchain was stale; the frame was abandoned (after
    /// `begin_frame`) or presentation triggered a rebuild (after
    /// `end_frame`). Skip to the next frame.
    SwapchainStale,
}

/// Which pass bracket the command buffer currently sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ActivePass {
    None,
    Shadow,
    Main,
}

/// Owns all GPU state and records frames.
///
/// Field order doubles as teardown order; `render_targets` is dropped
/// explicitly (before the swapchain it references) in `Drop`.
pub struct Renderer {
    registry: Registry,
    default_material: MaterialHandle,
    frames: FrameManager,
    shadow_map: ShadowMap,
    render_targets: ManuallyDrop<RenderTargets>,
    passes: Passes,
    descriptor_pool: DescriptorPool,
    swapchain: Swapchain,
    command_pool: CommandPool,
    device: Arc<Device>,
    surface: Surface,
    instance: Instance,

    active_pass: ActivePass,
    /// Latest window size reported by the platform layer.
    pending_extent: (u32, u32),
    /// Set by `resize`; consumed at the next `begin_frame`.
    resized: bool,
}

impl Renderer {
    /// Creates the renderer for `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan object creation fails or the shader
    /// files in `config.shader_dir` cannot be loaded.
    pub fn new(window: &Window, config: &RendererConfig) -> RhiResult<Self> {
        let width = window.width();
        let height = window.height();

        info!("Initializing renderer ({}x{})", width, height);

        let instance = Instance::new(config.validation)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical_device_info)?;

        let graphics_family = device
            .queue_families()
            .graphics_family
            .ok_or_else(|| RhiError::SurfaceError("No graphics queue family".to_string()))?;
        let command_pool = CommandPool::new(device.clone(), graphics_family)?;

        let swapchain = Swapchain::new(&instance, device.clone(), surface.handle(), width, height)?;

        let passes = Passes::new(device.clone(), swapchain.format(), &config.shader_dir)?;

        let render_targets = RenderTargets::new(device.clone(), &swapchain, passes.main_pass())?;

        let shadow_map = ShadowMap::new(device.clone(), passes.shadow_pass())?;

        let descriptor_pool = Self::create_descriptor_pool(device.clone())?;

        let mut frames = FrameManager::new(device.clone(), &command_pool)?;
        Self::wire_frame_descriptors(
            &device,
            &descriptor_pool,
            &passes,
            &shadow_map,
            frames.slots_mut(),
        )?;

        let mut registry = Registry::new();
        let white = Texture::white(device.clone(), &command_pool)?;
        let default_material = registry.add_material(Material::new(
            &device,
            &descriptor_pool,
            passes.material_layout(),
            white,
        )?);

        info!(
            "Renderer initialized: {} swapchain images, {} frames in flight",
            swapchain.image_count(),
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            registry,
            default_material,
            frames,
            shadow_map,
            render_targets: ManuallyDrop::new(render_targets),
            passes,
            descriptor_pool,
            swapchain,
            command_pool,
            device,
            surface,
            instance,
            active_pass: ActivePass::None,
            pending_extent: (width, height),
            resized: false,
        })
    }

    /// Sizes the descriptor pool for the frame slots plus [`MAX_MATERIALS`]
    /// materials.
    fn create_descriptor_pool(device: Arc<Device>) -> RhiResult<DescriptorPool> {
        let frames = MAX_FRAMES_IN_FLIGHT as u32;
        let pool_sizes = [
            // Camera + main light + the shadow set's light block, per slot
            vk::DescriptorPoolSize::default()
                .ty(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(frames * 3),
            vk::DescriptorPoolSize::default()
                .ty(vk::DescriptorType::STORAGE_BUFFER)
                .descriptor_count(frames),
            // Shadow map per slot plus one texture per material
            vk::DescriptorPoolSize::default()
                .ty(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(frames + MAX_MATERIALS),
        ];
        DescriptorPool::new(device, frames * 2 + MAX_MATERIALS, &pool_sizes)
    }

    /// Allocates and writes each slot's frame-global and shadow descriptor
    /// sets.
    ///
    /// Both light bindings alias the slot's frame uniform buffer at
    /// [`LIGHT_UBO_OFFSET`]; the camera binding sits at offset 0 of the
    /// same buffer.
    fn wire_frame_descriptors(
        device: &Device,
        pool: &DescriptorPool,
        passes: &Passes,
        shadow_map: &ShadowMap,
        slots: &mut [FrameSlot],
    ) -> RhiResult<()> {
        for slot in slots {
            let sets = pool.allocate(&[
                passes.frame_layout().handle(),
                passes.shadow_layout().handle(),
            ])?;
            let (frame_set, shadow_set) = (sets[0], sets[1]);

            let camera_info = [descriptor::buffer_info(
                slot.frame_ubo().handle(),
                0,
                CameraUbo::SIZE as vk::DeviceSize,
            )];
            let light_info = [descriptor::buffer_info(
                slot.frame_ubo().handle(),
                LIGHT_UBO_OFFSET as vk::DeviceSize,
                LightUbo::SIZE as vk::DeviceSize,
            )];
            let shadow_info = [descriptor::image_info(
                shadow_map.sampler(),
                shadow_map.view(),
                vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
            )];
            let point_light_info = [descriptor::buffer_info(
                slot.point_light_buffer().handle(),
                0,
                vk::WHOLE_SIZE,
            )];

            let writes = [
                vk::WriteDescriptorSet::default()
                    .dst_set(frame_set)
                    .dst_binding(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&camera_info),
                vk::WriteDescriptorSet::default()
                    .dst_set(frame_set)
                    .dst_binding(1)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&light_info),
                vk::WriteDescriptorSet::default()
                    .dst_set(frame_set)
                    .dst_binding(2)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&shadow_info),
                vk::WriteDescriptorSet::default()
                    .dst_set(frame_set)
                    .dst_binding(3)
                    .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                    .buffer_info(&point_light_info),
                vk::WriteDescriptorSet::default()
                    .dst_set(shadow_set)
                    .dst_binding(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&light_info),
            ];
            update_descriptor_sets(device, &writes);

            slot.attach_descriptor_sets(frame_set, shadow_set);
        }

        Ok(())
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Uploads a mesh and registers it.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or the upload fails.
    pub fn create_mesh(
        &mut self,
        vertices: &[Vertex],
        submeshes: &[SubmeshDesc],
    ) -> RhiResult<MeshHandle> {
        let mesh = Mesh::new(self.device.clone(), &self.command_pool, vertices, submeshes)?;
        Ok(self.registry.add_mesh(mesh))
    }

    /// Creates a material from tightly packed RGBA8 pixels and registers it.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel data does not match the dimensions or
    /// the texture upload fails.
    pub fn create_material(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> RhiResult<MaterialHandle> {
        let texture = Texture::from_rgba8(
            self.device.clone(),
            &self.command_pool,
            pixels,
            width,
            height,
        )?;
        let material = Material::new(
            &self.device,
            &self.descriptor_pool,
            self.passes.material_layout(),
            texture,
        )?;
        Ok(self.registry.add_material(material))
    }

    /// Returns the built-in 1x1 white material.
    #[inline]
    pub fn default_material(&self) -> MaterialHandle {
        self.default_material
    }

    /// Frees a mesh after draining in-flight frames.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting for the in-flight fences fails.
    pub fn free_mesh(&mut self, handle: MeshHandle) -> RhiResult<()> {
        self.frames.wait_for_all_frames()?;
        if self.registry.remove_mesh(handle).is_none() {
            debug!("free_mesh on empty slot {:?}", handle);
        }
        Ok(())
    }

    /// Frees a material after draining in-flight frames.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting for the in-flight fences fails.
    pub fn free_material(&mut self, handle: MaterialHandle) -> RhiResult<()> {
        self.frames.wait_for_all_frames()?;
        if self.registry.remove_material(handle).is_none() {
            debug!("free_material on empty slot {:?}", handle);
        }
        Ok(())
    }

    // =========================================================================
    // Frame protocol
    // =========================================================================

    /// Starts a frame: waits on the slot fence, writes the per-frame
    /// buffers, acquires a swapchain image, and begins command recording.
    ///
    /// # Returns
    ///
    /// [`FrameStatus::SwapchainStale`] if the frame was abandoned because
    /// the swapchain needed rebuilding or the window currently has zero
    /// size. The slot fence is left signaled in that case, so the next
    /// `begin_frame` starts clean.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than staleness.
    pub fn begin_frame(
        &mut self,
        camera: &Camera,
        light: &MainLight,
        point_lights: &[PointLight],
    ) -> RhiResult<FrameStatus> {
        if self.resized && !self.recreate_swapchain()? {
            // Zero-size window: keep polling without touching the swapchain
            return Ok(FrameStatus::SwapchainStale);
        }

        self.frames.wait_for_frame()?;

        if self.frames.acquire_next_image(&self.swapchain)? {
            self.recreate_swapchain()?;
            return Ok(FrameStatus::SwapchainStale);
        }

        self.frames.begin_commands()?;

        let slot = self.frames.current();
        slot.write_camera(&CameraUbo::new(
            camera.view_matrix(),
            camera.projection_matrix(),
        ))?;
        slot.write_light(&LightUbo::new(
            light.view_matrix(),
            light.projection_matrix(),
            light.color.extend(light.intensity),
        ))?;

        let gpu_lights: Vec<ubo::PointLight> = point_lights
            .iter()
            .map(|l| ubo::PointLight {
                position: l.position.extend(l.radius),
                color: l.color.extend(l.intensity),
            })
            .collect();
        slot.write_point_lights(&gpu_lights)?;

        Ok(FrameStatus::Ready)
    }

    /// Begins the shadow pass: binds the depth-only pipeline and the
    /// slot's shadow descriptor set against the shadow map framebuffer.
    pub fn begin_shadow_pass(&mut self) {
        let slot = self.frames.current();
        let cmd = slot.command_buffer();
        let extent = self.shadow_map.extent();

        let clear_values = [vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: 1.0,
                stencil: 0,
            },
        }];

        cmd.begin_render_pass(
            self.passes.shadow_pass().handle(),
            self.shadow_map.framebuffer().handle(),
            vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            &clear_values,
        );

        cmd.bind_pipeline(
            vk::PipelineBindPoint::GRAPHICS,
            self.passes.shadow_pipeline().handle(),
        );
        cmd.bind_descriptor_sets(
            vk::PipelineBindPoint::GRAPHICS,
            self.passes.shadow_pipeline_layout().handle(),
            0,
            &[slot.shadow_set()],
            &[],
        );

        Self::set_full_viewport(cmd, extent);

        self.active_pass = ActivePass::Shadow;
    }

    /// Begins the main pass: binds the forward pipeline and the slot's
    /// frame-global descriptor set against the acquired swapchain image.
    pub fn begin_main_pass(&mut self) {
        // The material cache assumes the main pipeline is bound; a fresh
        // pass starts with nothing bound
        self.frames.current_mut().materials().reset();

        let slot = self.frames.current();
        let cmd = slot.command_buffer();
        let extent = self.swapchain.extent();

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: [0.05, 0.05, 0.08, 1.0],
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        cmd.begin_render_pass(
            self.passes.main_pass().handle(),
            self.render_targets
                .framebuffer(self.frames.image_index())
                .handle(),
            vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            &clear_values,
        );

        cmd.bind_pipeline(
            vk::PipelineBindPoint::GRAPHICS,
            self.passes.main_pipeline().handle(),
        );
        cmd.bind_descriptor_sets(
            vk::PipelineBindPoint::GRAPHICS,
            self.passes.main_pipeline_layout().handle(),
            0,
            &[slot.frame_set()],
            &[],
        );

        Self::set_full_viewport(cmd, extent);

        self.active_pass = ActivePass::Main;
    }

    /// Records one submesh draw with an identity tint.
    ///
    /// See [`draw_tinted`](Self::draw_tinted).
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh handle or submesh index is unknown.
    pub fn draw(&mut self, mesh: MeshHandle, submesh: usize, model: Mat4) -> RhiResult<()> {
        self.draw_tinted(mesh, submesh, model, Vec4::ONE)
    }

    /// Records one submesh draw.
    ///
    /// In the main pass the submesh's material set is bound only when it
    /// differs from the previously drawn one; the shadow pass ignores
    /// materials entirely. Must be called inside a pass bracket.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh handle or submesh index is unknown.
    pub fn draw_tinted(
        &mut self,
        mesh: MeshHandle,
        submesh: usize,
        model: Mat4,
        tint: Vec4,
    ) -> RhiResult<()> {
        let mesh_ref = self
            .registry
            .mesh(mesh)
            .ok_or_else(|| RhiError::InvalidHandle(format!("Unknown mesh handle {:?}", mesh)))?;
        let part = mesh_ref.submeshes().get(submesh).ok_or_else(|| {
            RhiError::InvalidHandle(format!("Mesh {:?} has no submesh {}", mesh, submesh))
        })?;

        let needs_bind = self.active_pass == ActivePass::Main
            && self.frames.current_mut().materials().needs_bind(part.material());

        let cmd = self.frames.current().command_buffer();

        cmd.bind_vertex_buffers(0, &[mesh_ref.vertex_buffer().handle()], &[0]);
        cmd.bind_index_buffer(part.index_buffer().handle(), 0, vk::IndexType::UINT16);

        let layout = match self.active_pass {
            ActivePass::Shadow => self.passes.shadow_pipeline_layout(),
            _ => self.passes.main_pipeline_layout(),
        };

        if needs_bind {
            let material = self
                .registry
                .material_by_index(part.material())
                .or_else(|| self.registry.material(self.default_material))
                .ok_or_else(|| {
                    RhiError::InvalidHandle(format!("Unknown material index {}", part.material()))
                })?;
            cmd.bind_descriptor_sets(
                vk::PipelineBindPoint::GRAPHICS,
                layout.handle(),
                1,
                &[material.descriptor_set()],
                &[],
            );
        }

        let push = PushConstants::new(model, tint);
        cmd.push_constants(layout.handle(), vk::ShaderStageFlags::VERTEX, 0, &push);
        cmd.draw_indexed(part.index_count(), 1, 0, 0, 0);

        Ok(())
    }

    /// Ends the current pass bracket.
    pub fn end_pass(&mut self) {
        self.frames.current().command_buffer().end_render_pass();
        self.active_pass = ActivePass::None;
    }

    /// Ends command recording and submits the frame to the graphics queue.
    ///
    /// # Errors
    ///
    /// Returns an error if ending the command buffer or submission fails.
    pub fn submit_draws(&mut self) -> RhiResult<()> {
        self.frames.end_commands()?;
        self.frames.submit()
    }

    /// Presents the frame and advances the slot ring.
    ///
    /// The ring advances regardless of the present outcome.
    ///
    /// # Errors
    ///
    /// Returns an error on presentation failures other than staleness.
    pub fn end_frame(&mut self) -> RhiResult<FrameStatus> {
        let stale = self.frames.present(&self.swapchain)?;
        self.frames.next_frame();

        if stale {
            self.recreate_swapchain()?;
            return Ok(FrameStatus::SwapchainStale);
        }

        Ok(FrameStatus::Ready)
    }

    // =========================================================================
    // Swapchain lifecycle
    // =========================================================================

    /// Records a new window size; the swapchain is rebuilt at the next
    /// `begin_frame`.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != self.pending_extent {
            debug!(
                "Resize: {}x{} -> {}x{}",
                self.pending_extent.0, self.pending_extent.1, width, height
            );
            self.pending_extent = (width, height);
            self.resized = true;
        }
    }

    /// Rebuilds the swapchain and its render targets for the pending size.
    ///
    /// Returns `false` without touching anything when the pending size is
    /// zero (minimized window); the caller polls until a real size arrives.
    /// Otherwise the rebuild is ordered: device idle, then the framebuffers
    /// and depth buffer go away, then the swapchain and its views are
    /// rebuilt, then the render targets on top of them.
    fn recreate_swapchain(&mut self) -> RhiResult<bool> {
        let (width, height) = self.pending_extent;
        if !drawable_ready(width, height) {
            debug!("Deferring swapchain recreation: zero-size window");
            return Ok(false);
        }

        self.device.wait_idle()?;

        // Framebuffers reference the old image views; drop them first
        unsafe {
            ManuallyDrop::drop(&mut self.render_targets);
        }

        self.swapchain
            .recreate(&self.instance, self.surface.handle(), width, height)?;

        self.render_targets = ManuallyDrop::new(RenderTargets::new(
            self.device.clone(),
            &self.swapchain,
            self.passes.main_pass(),
        )?);

        self.resized = false;

        info!(
            "Swapchain recreated: {}x{}",
            self.swapchain.extent().width,
            self.swapchain.extent().height
        );

        Ok(true)
    }

    fn set_full_viewport(cmd: &glint_rhi::command::CommandBuffer, extent: vk::Extent2D) {
        cmd.set_viewport(&vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        });
        cmd.set_scissor(&vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        });
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the current swapchain extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    /// Returns the current width-over-height ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.swapchain.extent();
        extent.width as f32 / extent.height.max(1) as f32
    }

    /// Returns the logical device.
    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Device wait failed during renderer teardown: {:?}", e);
        }

        // Framebuffers must go before the swapchain image views; the
        // remaining fields drop in declaration order
        unsafe {
            ManuallyDrop::drop(&mut self.render_targets);
        }

        info!("Renderer destroyed");
    }
}

/// True when the drawable can back a swapchain. A minimized window reports a
/// zero dimension; recreation defers until both dimensions are nonzero.
#[inline]
fn drawable_ready(width: u32, height: u32) -> bool {
    width > 0 && height > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_drawable_defers_recreation() {
        assert!(!drawable_ready(0, 0));
        assert!(!drawable_ready(0, 720));
        assert!(!drawable_ready(1280, 0));
    }

    #[test]
    fn nonzero_drawable_allows_recreation() {
        assert!(drawable_ready(1, 1));
        assert!(drawable_ready(1280, 720));
    }
}
