//! End-to-end checks on the procedural assets the demo app ships with.

use glint_resources::{MeshData, TextureData};

#[test]
fn cube_is_a_closed_triangle_mesh() {
    let cube = MeshData::unit_cube();
    cube.validate().unwrap();

    // Every face contributes 2 triangles over its own 4 vertices
    assert_eq!(cube.indices.len(), 36);
    assert_eq!(cube.positions.len(), 24);

    // Each vertex is referenced at least once
    let mut used = vec![false; cube.positions.len()];
    for &i in &cube.indices {
        used[i as usize] = true;
    }
    assert!(used.iter().all(|&u| u));
}

#[test]
fn cube_uvs_stay_in_unit_square() {
    let cube = MeshData::unit_cube();
    for uv in cube.tex_coords {
        assert!((0.0..=1.0).contains(&uv.x));
        assert!((0.0..=1.0).contains(&uv.y));
    }
}

#[test]
fn cube_faces_share_color_per_quad() {
    let cube = MeshData::unit_cube();
    for face in cube.colors.chunks(4) {
        assert!(face.windows(2).all(|w| w[0] == w[1]));
    }
}

#[test]
fn checkerboard_upload_size_matches_extent() {
    let tex = TextureData::checkerboard(4, 16, [200, 200, 200, 255], [40, 40, 40, 255]);
    assert_eq!(tex.pixels.len(), (tex.width * tex.height * 4) as usize);
}
