//! Drawable scene entries.

use glam::Vec4;

use crate::transform::Transform;

/// One drawable object: a mesh reference plus its placement.
///
/// The mesh is referenced by its registry index; the submeshes carry their
/// own material assignments, so a renderable only decides where the mesh
/// sits and how it is tinted.
#[derive(Clone, Copy, Debug)]
pub struct Renderable {
    /// Mesh registry index.
    pub mesh: u32,
    /// Object-to-world placement.
    pub transform: Transform,
    /// Per-object tint, multiplied into the base color (rgb, unused w).
    pub tint: Vec4,
}

impl Renderable {
    /// Creates a renderable with an identity transform and no tint.
    pub fn new(mesh: u32) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
            tint: Vec4::ONE,
        }
    }

    /// Sets the placement.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the tint.
    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = tint;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_renderable_is_untinted() {
        let r = Renderable::new(3);
        assert_eq!(r.mesh, 3);
        assert_eq!(r.tint, Vec4::ONE);
    }
}
