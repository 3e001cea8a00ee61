//! Workspace-level error type.
//!
//! Initialization failures in the renderer are fatal and bubble up to
//! `main` through this type; there is no retry-with-reduced-features path.

use thiserror::Error;

/// Top-level error for application plumbing.
#[derive(Error, Debug)]
pub enum Error {
    /// GPU or driver errors surfaced from the RHI layer
    #[error("Vulkan error: {0}")]
    Vulkan(String),

    /// Window creation or surface errors
    #[error("Window error: {0}")]
    Window(String),

    /// Asset loading errors (meshes, textures)
    #[error("Resource error: {0}")]
    Resource(String),

    /// Shader bytecode errors
    #[error("Shader error: {0}")]
    Shader(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Startup configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

/// Result alias using the workspace [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
