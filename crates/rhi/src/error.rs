//! RHI-specific error types.

use thiserror::Error;

/// RHI-specific error type.
///
/// Every variant except swapchain staleness is fatal to initialization;
/// callers propagate these up to `main` rather than retrying.
#[derive(Error, Debug)]
pub enum RhiError {
    /// Vulkan API error
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    /// Failed to load Vulkan library
    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    /// No suitable GPU found
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// A required device feature is not supported
    #[error("Missing required device feature: {0}")]
    MissingFeature(String),

    /// No device memory type satisfies the requested property flags
    #[error("No compatible memory type (type bits {type_bits:#b}, flags {flags:?})")]
    NoCompatibleMemoryType {
        type_bits: u32,
        flags: ash::vk::MemoryPropertyFlags,
    },

    /// Shader loading error
    #[error("Shader error: {0}")]
    ShaderError(String),

    /// Surface creation error
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Swapchain error
    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    /// Invalid handle error
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Pipeline creation error
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;
