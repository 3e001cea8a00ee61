//! Frame orchestration and GPU resource management.
//!
//! This crate turns the low-level wrappers from `glint_rhi` into a
//! renderer: a frame-slot ring bounded by fences, a depth-only shadow
//! pass feeding a forward color pass, and registries of meshes and
//! materials addressed by stable integer handles.
//!
//! The entry point is [`Renderer`]; see its module docs for the frame
//! protocol.

pub mod config;
pub mod depth_buffer;
pub mod frame;
pub mod frame_manager;
pub mod light;
pub mod material;
pub mod mesh;
pub mod passes;
pub mod registry;
pub mod render_target;
pub mod renderer;
pub mod ubo;

pub use config::RendererConfig;
pub use mesh::SubmeshDesc;
pub use registry::{MaterialHandle, MeshHandle};
pub use renderer::{FrameStatus, Renderer};

pub use glint_rhi::sync::MAX_FRAMES_IN_FLIGHT;
