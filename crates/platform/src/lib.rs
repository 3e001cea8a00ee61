//! Platform layer.
//!
//! Window management via winit and Vulkan surface creation for it.

mod window;

pub use window::{Surface, Window};
