//! CPU-side texture data.

use std::path::Path;

use tracing::info;

use crate::error::{ResourceError, ResourceResult};

/// Decoded RGBA8 pixel data ready for GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    /// Tightly packed RGBA8 pixels, row-major.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextureData {
    /// Loads and decodes an image file, converting to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be decoded.
    pub fn load<P: AsRef<Path>>(path: P) -> ResourceResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }

        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();

        info!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Ok(Self {
            pixels: image.into_raw(),
            width,
            height,
        })
    }

    /// Decodes an in-memory image (PNG, JPEG, ...), converting to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded.
    pub fn from_bytes(bytes: &[u8]) -> ResourceResult<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();

        Ok(Self {
            pixels: image.into_raw(),
            width,
            height,
        })
    }

    /// Generates a two-color checkerboard with `cells` cells per side and
    /// `cell_size` pixels per cell.
    pub fn checkerboard(cells: u32, cell_size: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let side = cells * cell_size;
        let mut pixels = Vec::with_capacity((side * side * 4) as usize);

        for y in 0..side {
            for x in 0..side {
                let cell = (x / cell_size + y / cell_size) % 2;
                pixels.extend_from_slice(if cell == 0 { &a } else { &b });
            }
        }

        Self {
            pixels,
            width: side,
            height: side,
        }
    }

    /// Returns the expected byte length for the dimensions.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_dimensions() {
        let tex = TextureData::checkerboard(8, 4, [255; 4], [0, 0, 0, 255]);
        assert_eq!(tex.width, 32);
        assert_eq!(tex.height, 32);
        assert_eq!(tex.pixels.len(), tex.byte_len());
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let a = [255, 0, 0, 255];
        let b = [0, 0, 255, 255];
        let tex = TextureData::checkerboard(2, 1, a, b);

        // 2x2 pixels, one per cell
        assert_eq!(&tex.pixels[0..4], &a);
        assert_eq!(&tex.pixels[4..8], &b);
        assert_eq!(&tex.pixels[8..12], &b);
        assert_eq!(&tex.pixels[12..16], &a);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = TextureData::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, ResourceError::FileNotFound(_)));
    }
}
