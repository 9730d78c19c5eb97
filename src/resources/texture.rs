//! Texture file loading and caching.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::data_structures::texture::Texture;
use crate::resources::LoadError;

pub fn load_binary(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode an image file and upload it with a full CPU-generated mip chain.
pub fn load_texture(
    path: &Path,
    srgb: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<Texture, LoadError> {
    let bytes = load_binary(path)?;
    let label = path.to_string_lossy();
    Ok(Texture::from_bytes(device, queue, &bytes, &label, srgb)?)
}

/// Decode the six cube faces in +X, -X, +Y, -Y, +Z, -Z order. The face count
/// is validated before any file is touched.
pub fn decode_cubemap_faces(paths: &[PathBuf]) -> Result<Vec<image::DynamicImage>, LoadError> {
    if paths.len() != 6 {
        return Err(LoadError::Texture(
            crate::data_structures::texture::TextureError::WrongFaceCount(paths.len()),
        ));
    }
    let mut faces = Vec::with_capacity(6);
    for path in paths {
        let bytes = load_binary(path)?;
        let image = image::load_from_memory(&bytes)
            .map_err(crate::data_structures::texture::TextureError::Decode)?;
        faces.push(image);
    }
    Ok(faces)
}

pub fn load_cubemap(
    paths: &[PathBuf],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<Texture, LoadError> {
    let faces = decode_cubemap_faces(paths)?;
    Ok(Texture::cubemap(device, queue, &faces, "skybox cubemap")?)
}

/// Path-keyed cache so textures shared by several materials are decoded and
/// uploaded once. Values hand out `Rc` clones.
pub struct PathCache<T> {
    entries: HashMap<PathBuf, Rc<T>>,
}

pub type TextureCache = PathCache<Texture>;

impl<T> Default for PathCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get_or_load(
        &mut self,
        path: &Path,
        loader: impl FnOnce(&Path) -> Result<T, LoadError>,
    ) -> Result<Rc<T>, LoadError> {
        if let Some(hit) = self.entries.get(path) {
            return Ok(Rc::clone(hit));
        }
        let value = Rc::new(loader(path)?);
        self.entries.insert(path.to_path_buf(), Rc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_loads_each_path_once() {
        let mut cache: PathCache<u32> = PathCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_load(Path::new("models/backpack/diffuse.jpg"), |_| {
                    calls += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(*value, 7);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_paths_load_separately() {
        let mut cache: PathCache<u32> = PathCache::new();
        cache.get_or_load(Path::new("a.png"), |_| Ok(1)).unwrap();
        cache.get_or_load(Path::new("b.png"), |_| Ok(2)).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache: PathCache<u32> = PathCache::new();
        let err = cache.get_or_load(Path::new("missing.png"), |path| {
            Err(LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
        cache.get_or_load(Path::new("missing.png"), |_| Ok(3)).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cubemap_rejects_wrong_face_count_before_io() {
        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("face{i}.jpg"))).collect();
        let err = decode_cubemap_faces(&paths).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Texture(
                crate::data_structures::texture::TextureError::WrongFaceCount(5)
            )
        ));
    }
}
