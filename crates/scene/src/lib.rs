//! Scene description.
//!
//! This crate holds the CPU-side view of what gets rendered:
//! - Camera
//! - Lights (the shadow-casting main light plus point lights)
//! - Object transforms and drawable entries

pub mod camera;
pub mod light;
pub mod renderable;
pub mod transform;

pub use camera::Camera;
pub use light::{MainLight, PointLight};
pub use renderable::Renderable;
pub use transform::Transform;
