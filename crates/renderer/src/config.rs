//! Renderer configuration.

use std::path::PathBuf;

/// Startup configuration for the renderer and its window.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Window title.
    pub window_title: String,
    /// Initial window width in physical pixels.
    pub window_width: u32,
    /// Initial window height in physical pixels.
    pub window_height: u32,
    /// Directory the compiled SPIR-V shaders are loaded from.
    pub shader_dir: PathBuf,
    /// Whether to request the Khronos validation layer.
    pub validation: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            window_title: "glint".to_string(),
            window_width: 1280,
            window_height: 720,
            shader_dir: PathBuf::from("shaders"),
            validation: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_shaders_dir() {
        let config = RendererConfig::default();
        assert_eq!(config.shader_dir, PathBuf::from("shaders"));
        assert!(config.window_width > 0 && config.window_height > 0);
    }
}
