//! CPU-side mesh data.
//!
//! [`MeshData`] is the plain attribute-array form a mesh takes before it
//! is interleaved and uploaded to the GPU. The arrays are parallel:
//! element `i` of each describes vertex `i`.

use glam::{Vec2, Vec3};

use crate::error::{ResourceError, ResourceResult};

/// Parallel vertex attribute arrays plus a triangle index list.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex colors.
    pub colors: Vec<Vec3>,
    /// Texture coordinates.
    pub tex_coords: Vec<Vec2>,
    /// Triangle list indices.
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the attribute arrays are parallel and every index is
    /// in range.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found.
    pub fn validate(&self) -> ResourceResult<()> {
        let n = self.positions.len();
        if self.colors.len() != n || self.tex_coords.len() != n {
            return Err(ResourceError::InvalidData(format!(
                "Attribute arrays are not parallel: {} positions, {} colors, {} tex coords",
                n,
                self.colors.len(),
                self.tex_coords.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(ResourceError::InvalidData(format!(
                "Index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(ResourceError::InvalidData(format!(
                "Index {} out of range for {} vertices",
                bad, n
            )));
        }
        Ok(())
    }

    /// A unit cube centered at the origin, one colored quad per face.
    ///
    /// 24 vertices (4 per face, so each face gets its own colors and
    /// UVs) and 36 indices. Faces are wound counter-clockwise seen from
    /// outside the cube.
    pub fn unit_cube() -> Self {
        const H: f32 = 0.5;

        // Per-face corner positions, CCW from outside
        let faces: [([Vec3; 4], Vec3); 6] = [
            // +Z
            (
                [
                    Vec3::new(-H, -H, H),
                    Vec3::new(H, -H, H),
                    Vec3::new(H, H, H),
                    Vec3::new(-H, H, H),
                ],
                Vec3::new(0.9, 0.2, 0.2),
            ),
            // -Z
            (
                [
                    Vec3::new(H, -H, -H),
                    Vec3::new(-H, -H, -H),
                    Vec3::new(-H, H, -H),
                    Vec3::new(H, H, -H),
                ],
                Vec3::new(0.2, 0.9, 0.2),
            ),
            // +X
            (
                [
                    Vec3::new(H, -H, H),
                    Vec3::new(H, -H, -H),
                    Vec3::new(H, H, -H),
                    Vec3::new(H, H, H),
                ],
                Vec3::new(0.2, 0.2, 0.9),
            ),
            // -X
            (
                [
                    Vec3::new(-H, -H, -H),
                    Vec3::new(-H, -H, H),
                    Vec3::new(-H, H, H),
                    Vec3::new(-H, H, -H),
                ],
                Vec3::new(0.9, 0.9, 0.2),
            ),
            // +Y
            (
                [
                    Vec3::new(-H, H, H),
                    Vec3::new(H, H, H),
                    Vec3::new(H, H, -H),
                    Vec3::new(-H, H, -H),
                ],
                Vec3::new(0.2, 0.9, 0.9),
            ),
            // -Y
            (
                [
                    Vec3::new(-H, -H, -H),
                    Vec3::new(H, -H, -H),
                    Vec3::new(H, -H, H),
                    Vec3::new(-H, -H, H),
                ],
                Vec3::new(0.9, 0.2, 0.9),
            ),
        ];

        let quad_uvs = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];

        let mut mesh = MeshData::default();
        for (corners, color) in faces {
            let base = mesh.positions.len() as u16;
            mesh.positions.extend_from_slice(&corners);
            mesh.colors.extend(std::iter::repeat(color).take(4));
            mesh.tex_coords.extend_from_slice(&quad_uvs);
            mesh.indices
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_has_expected_counts() {
        let cube = MeshData::unit_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn unit_cube_validates() {
        MeshData::unit_cube().validate().unwrap();
    }

    #[test]
    fn unit_cube_fits_in_unit_box() {
        for p in MeshData::unit_cube().positions {
            assert!(p.abs().max_element() <= 0.5);
        }
    }

    #[test]
    fn validate_rejects_mismatched_arrays() {
        let mut cube = MeshData::unit_cube();
        cube.colors.pop();
        assert!(cube.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut cube = MeshData::unit_cube();
        cube.indices[0] = 24;
        assert!(cube.validate().is_err());
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let mut cube = MeshData::unit_cube();
        cube.indices.pop();
        assert!(cube.validate().is_err());
    }
}
