//! Asset loading.
//!
//! This crate produces CPU-side asset data for the renderer to upload:
//! - Mesh attribute arrays, including a procedural unit cube
//! - Image decoding to RGBA8 and procedural textures

pub mod error;
pub mod mesh_data;
pub mod texture_data;

pub use error::{ResourceError, ResourceResult};
pub use mesh_data::MeshData;
pub use texture_data::TextureData;
