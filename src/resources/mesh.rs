//! CPU-side mesh extraction.
//!
//! Importer output is flattened into [`MeshData`] before anything touches the
//! GPU, so the geometry path stays testable without an adapter. Uploading is
//! a separate, trivial step.

use wgpu::util::DeviceExt;

use crate::data_structures::model::{Mesh, ModelVertex};

/// One mesh worth of interleaved vertex data, still on the CPU.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

/// Flatten an imported mesh into interleaved vertices plus an index list.
///
/// Expects triangulated, single-indexed input (one index stream shared by
/// all attributes). Missing normals or texture coordinates come out as
/// zeros rather than failing the whole import. The importer keeps OBJ's
/// bottom-left UV origin; flip V here so it matches the texture rows as
/// uploaded.
pub fn extract_mesh(model: &tobj::Model) -> MeshData {
    let mesh = &model.mesh;
    let vertex_count = mesh.positions.len() / 3;
    let mut vertices = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        let normal = if mesh.normals.len() >= (i + 1) * 3 {
            [
                mesh.normals[i * 3],
                mesh.normals[i * 3 + 1],
                mesh.normals[i * 3 + 2],
            ]
        } else {
            [0.0, 0.0, 0.0]
        };
        let tex_coords = if mesh.texcoords.len() >= (i + 1) * 2 {
            [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
        } else {
            [0.0, 0.0]
        };
        vertices.push(ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            normal,
            tex_coords,
        });
    }
    MeshData {
        name: model.name.clone(),
        vertices,
        indices: mesh.indices.clone(),
        material: mesh.material_id,
    }
}

/// Upload extracted mesh data into vertex and index buffers.
pub fn upload_mesh(device: &wgpu::Device, data: &MeshData, material: usize) -> Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} vertex buffer", data.name)),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} index buffer", data.name)),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Mesh {
        name: data.name.clone(),
        vertex_buffer,
        index_buffer,
        num_elements: data.indices.len() as u32,
        material,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn load_str(obj: &str) -> Vec<tobj::Model> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        };
        let mut reader = BufReader::new(obj.as_bytes());
        let (models, _) = tobj::load_obj_buf(&mut reader, &options, |_| {
            Ok((Vec::new(), std::collections::HashMap::new()))
        })
        .expect("obj parses");
        models
    }

    const QUAD: &str = "\
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_triangulates_into_two_faces() {
        let models = load_str(QUAD);
        assert_eq!(models.len(), 1);
        let data = extract_mesh(&models[0]);
        assert_eq!(data.indices.len(), 6);
        assert!(data
            .indices
            .iter()
            .all(|&i| (i as usize) < data.vertices.len()));
    }

    #[test]
    fn texture_coordinates_are_flipped_vertically() {
        let models = load_str(QUAD);
        let data = extract_mesh(&models[0]);
        // OBJ vt 0,0 is the bottom-left corner; after the flip it must
        // address the last row of the uploaded image.
        let bottom_left = data
            .vertices
            .iter()
            .find(|v| v.position == [0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(bottom_left.tex_coords, [0.0, 1.0]);
    }

    #[test]
    fn missing_normals_become_zeros() {
        let obj = "\
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let models = load_str(obj);
        let data = extract_mesh(&models[0]);
        assert_eq!(data.vertices.len(), 3);
        for v in &data.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 0.0]);
            assert_eq!(v.tex_coords, [0.0, 0.0]);
        }
    }

    #[test]
    fn material_id_passes_through() {
        let models = load_str(QUAD);
        let data = extract_mesh(&models[0]);
        assert_eq!(data.material, None);
        assert_eq!(data.name, "quad");
    }
}
