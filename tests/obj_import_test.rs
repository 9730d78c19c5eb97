//! Imports the bundled cube through the same path the renderer uses, minus
//! the GPU upload.

use std::path::Path;

use lantern::resources::mesh::extract_mesh;

fn load_cube() -> Vec<tobj::Model> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, _) = tobj::load_obj(Path::new("assets/models/cube.obj"), &options)
        .expect("bundled cube parses");
    models
}

#[test]
fn cube_imports_as_one_triangulated_mesh() {
    let models = load_cube();
    assert_eq!(models.len(), 1);

    let data = extract_mesh(&models[0]);
    assert_eq!(data.name, "cube");
    // 6 faces, 2 triangles each.
    assert_eq!(data.indices.len(), 36);
    assert!(data
        .indices
        .iter()
        .all(|&i| (i as usize) < data.vertices.len()));
}

#[test]
fn cube_vertices_carry_unit_normals() {
    let models = load_cube();
    let data = extract_mesh(&models[0]);
    for v in &data.vertices {
        let len2: f32 = v.normal.iter().map(|c| c * c).sum();
        assert!((len2 - 1.0).abs() < 1e-5, "normal {:?}", v.normal);
    }
}

#[test]
fn cube_has_no_material_reference() {
    let models = load_cube();
    let data = extract_mesh(&models[0]);
    assert_eq!(data.material, None);
}
