//! Asset loading: OBJ models with their MTL materials, textures, and
//! cubemaps. Everything here returns typed errors; the caller decides what
//! is fatal.

use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::data_structures::model::{Material, Model};
use crate::data_structures::texture::{Texture, TextureError};

pub mod mesh;
pub mod texture;

pub use texture::{load_cubemap, load_texture, PathCache, TextureCache};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to import model")]
    Import(#[from] tobj::LoadError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Load an OBJ model with its MTL materials.
///
/// Meshes are triangulated and single-indexed on import. Every imported
/// material gets a GPU material, including the one at index zero; meshes
/// whose material reference is missing or out of range fall back to a
/// plain white material appended at the end, so all meshes stay textured.
pub fn load_model_obj(
    path: &Path,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    cache: &mut TextureCache,
) -> Result<Model, LoadError> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (obj_models, obj_materials) = tobj::load_obj(path, &options).map_err(LoadError::from)?;
    let obj_materials = obj_materials?;
    let asset_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut materials = Vec::with_capacity(obj_materials.len() + 1);
    for m in &obj_materials {
        let diffuse = match &m.diffuse_texture {
            Some(file) => cache.get_or_load(&asset_dir.join(file), |p| {
                load_texture(p, true, device, queue)
            })?,
            None => Rc::new(Texture::solid_color(
                device,
                queue,
                [255, 255, 255, 255],
                "diffuse fallback",
            )),
        };
        let specular = match &m.specular_texture {
            Some(file) => cache.get_or_load(&asset_dir.join(file), |p| {
                load_texture(p, false, device, queue)
            })?,
            None => Rc::new(Texture::solid_color(
                device,
                queue,
                [0, 0, 0, 255],
                "specular fallback",
            )),
        };
        materials.push(Material::new(device, &m.name, diffuse, specular, layout));
    }

    // Catch-all for meshes without a usable material reference.
    let fallback_index = materials.len();
    materials.push(Material::new(
        device,
        "fallback",
        Rc::new(Texture::solid_color(
            device,
            queue,
            [255, 255, 255, 255],
            "fallback diffuse",
        )),
        Rc::new(Texture::solid_color(
            device,
            queue,
            [0, 0, 0, 255],
            "fallback specular",
        )),
        layout,
    ));

    let meshes = obj_models
        .iter()
        .map(|m| {
            let data = mesh::extract_mesh(m);
            let material = data
                .material
                .filter(|&id| id < fallback_index)
                .unwrap_or(fallback_index);
            mesh::upload_mesh(device, &data, material)
        })
        .collect();

    Ok(Model { meshes, materials })
}
