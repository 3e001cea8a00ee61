//! Render passes, descriptor layouts, and pipelines.
//!
//! [`Passes`] bundles the fixed GPU state the renderer records against:
//! the main color+depth pass, the depth-only shadow pass, the descriptor
//! set layouts, and the two graphics pipelines. All of it is created once
//! at startup and survives swapchain recreation; only framebuffers are
//! extent-dependent.
//!
//! # Descriptor contract
//!
//! The main pipeline binds two sets:
//!
//! - Set 0 (frame-global, one per frame slot):
//!   - binding 0: camera uniform block (vertex)
//!   - binding 1: main-light uniform block (vertex and fragment)
//!   - binding 2: shadow map sampler (fragment)
//!   - binding 3: point-light storage buffer (fragment)
//! - Set 1 (per-material):
//!   - binding 0: base color combined image sampler (fragment)
//!
//! The shadow pipeline binds a single set:
//!
//! - Set 0: binding 0: main-light uniform block (vertex)
//!
//! Both pipeline layouts carry the same 80-byte vertex-stage push constant
//! range, so the model matrix is pushed the same way in either pass.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::info;

use glint_rhi::RhiResult;
use glint_rhi::descriptor::{DescriptorBindingBuilder, DescriptorSetLayout};
use glint_rhi::device::Device;
use glint_rhi::pipeline::{CullMode, FrontFace, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use glint_rhi::render_pass::RenderPass;
use glint_rhi::shader::{Shader, ShaderStage};
use glint_rhi::vertex::Vertex;

use crate::depth_buffer::DEPTH_FORMAT;
use crate::ubo::PushConstants;

/// Shadow map resolution (square, per light).
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Depth bias pushing shadow casters away from the light to avoid acne.
const SHADOW_DEPTH_BIAS_CONSTANT: f32 = 1.25;
const SHADOW_DEPTH_BIAS_SLOPE: f32 = 1.75;

/// Fixed per-run GPU state: render passes, layouts, and pipelines.
pub struct Passes {
    /// Frame-global descriptor set layout (main pipeline set 0).
    frame_layout: DescriptorSetLayout,
    /// Per-material descriptor set layout (main pipeline set 1).
    material_layout: DescriptorSetLayout,
    /// Shadow-pass descriptor set layout (shadow pipeline set 0).
    shadow_layout: DescriptorSetLayout,

    main_pass: RenderPass,
    shadow_pass: RenderPass,

    main_pipeline_layout: PipelineLayout,
    shadow_pipeline_layout: PipelineLayout,

    main_pipeline: Pipeline,
    shadow_pipeline: Pipeline,
}

impl Passes {
    /// Creates the descriptor layouts, render passes, and pipelines.
    ///
    /// Loads SPIR-V from `shader_dir`: `main.vert.spv`, `main.frag.spv`,
    /// and `shadow.vert.spv`. The shadow pipeline has no fragment stage;
    /// the rasterizer writes depth on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if a shader file is missing or malformed, or any
    /// Vulkan object creation fails.
    pub fn new(
        device: Arc<Device>,
        color_format: vk::Format,
        shader_dir: &Path,
    ) -> RhiResult<Self> {
        let frame_bindings = [
            DescriptorBindingBuilder::uniform_buffer(0, vk::ShaderStageFlags::VERTEX),
            DescriptorBindingBuilder::uniform_buffer(
                1,
                vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            ),
            DescriptorBindingBuilder::combined_image_sampler(2, vk::ShaderStageFlags::FRAGMENT),
            DescriptorBindingBuilder::storage_buffer(3, vk::ShaderStageFlags::FRAGMENT),
        ];
        let frame_layout = DescriptorSetLayout::new(device.clone(), &frame_bindings)?;

        let material_bindings = [DescriptorBindingBuilder::combined_image_sampler(
            0,
            vk::ShaderStageFlags::FRAGMENT,
        )];
        let material_layout = DescriptorSetLayout::new(device.clone(), &material_bindings)?;

        let shadow_bindings =
            [DescriptorBindingBuilder::uniform_buffer(0, vk::ShaderStageFlags::VERTEX)];
        let shadow_layout = DescriptorSetLayout::new(device.clone(), &shadow_bindings)?;

        let main_pass = RenderPass::color_depth(device.clone(), color_format, DEPTH_FORMAT)?;
        let shadow_pass = RenderPass::depth_only(device.clone(), DEPTH_FORMAT)?;

        let push_constant_ranges = [vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .offset(0)
            .size(PushConstants::SIZE as u32)];

        let main_pipeline_layout = PipelineLayout::new(
            device.clone(),
            &[frame_layout.handle(), material_layout.handle()],
            &push_constant_ranges,
        )?;
        let shadow_pipeline_layout = PipelineLayout::new(
            device.clone(),
            &[shadow_layout.handle()],
            &push_constant_ranges,
        )?;

        let main_vert = Shader::from_spirv_file(
            device.clone(),
            shader_dir.join("main.vert.spv"),
            ShaderStage::Vertex,
        )?;
        let main_frag = Shader::from_spirv_file(
            device.clone(),
            shader_dir.join("main.frag.spv"),
            ShaderStage::Fragment,
        )?;
        let shadow_vert = Shader::from_spirv_file(
            device.clone(),
            shader_dir.join("shadow.vert.spv"),
            ShaderStage::Vertex,
        )?;

        // The projection Y flip mirrors screen-space winding, so meshes
        // modeled counter-clockwise arrive clockwise
        let main_pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&main_vert)
            .fragment_shader(&main_frag)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .front_face(FrontFace::Clockwise)
            .render_pass(&main_pass, 0)
            .color_attachment_count(1)
            .build(device.clone(), &main_pipeline_layout)?;

        // Culling stays off so single-sided geometry still casts shadows
        let shadow_pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&shadow_vert)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .cull_mode(CullMode::None)
            .depth_bias(SHADOW_DEPTH_BIAS_CONSTANT, 0.0, SHADOW_DEPTH_BIAS_SLOPE)
            .render_pass(&shadow_pass, 0)
            .build(device, &shadow_pipeline_layout)?;

        info!("Created render passes and pipelines");

        Ok(Self {
            frame_layout,
            material_layout,
            shadow_layout,
            main_pass,
            shadow_pass,
            main_pipeline_layout,
            shadow_pipeline_layout,
            main_pipeline,
            shadow_pipeline,
        })
    }

    /// Returns the frame-global descriptor set layout.
    #[inline]
    pub fn frame_layout(&self) -> &DescriptorSetLayout {
        &self.frame_layout
    }

    /// Returns the per-material descriptor set layout.
    #[inline]
    pub fn material_layout(&self) -> &DescriptorSetLayout {
        &self.material_layout
    }

    /// Returns the shadow-pass descriptor set layout.
    #[inline]
    pub fn shadow_layout(&self) -> &DescriptorSetLayout {
        &self.shadow_layout
    }

    /// Returns the main color+depth render pass.
    #[inline]
    pub fn main_pass(&self) -> &RenderPass {
        &self.main_pass
    }

    /// Returns the depth-only shadow render pass.
    #[inline]
    pub fn shadow_pass(&self) -> &RenderPass {
        &self.shadow_pass
    }

    /// Returns the main pipeline layout.
    #[inline]
    pub fn main_pipeline_layout(&self) -> &PipelineLayout {
        &self.main_pipeline_layout
    }

    /// Returns the shadow pipeline layout.
    #[inline]
    pub fn shadow_pipeline_layout(&self) -> &PipelineLayout {
        &self.shadow_pipeline_layout
    }

    /// Returns the main graphics pipeline.
    #[inline]
    pub fn main_pipeline(&self) -> &Pipeline {
        &self.main_pipeline
    }

    /// Returns the shadow graphics pipeline.
    #[inline]
    pub fn shadow_pipeline(&self) -> &Pipeline {
        &self.shadow_pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_map_size_is_square_power_of_two() {
        assert_eq!(SHADOW_MAP_SIZE, 2048);
        assert!(SHADOW_MAP_SIZE.is_power_of_two());
    }

    #[test]
    fn push_constant_range_fits_vulkan_minimum() {
        // maxPushConstantsSize is at least 128 on all implementations
        assert!(PushConstants::SIZE <= 128);
    }
}
