//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around one WGPU texture with
//! its view and sampler, and constructors for the texture kinds this demo
//! uses: mipmapped 2D material textures, 6-face cubemaps, depth attachments
//! and 1x1 solid-color fallbacks. Each [`Texture`] owns exactly one GPU
//! object; sharing happens by `Rc` in the model texture cache, never by
//! duplicating the handle.

use image::GenericImageView;
use thiserror::Error;

/// Failure kinds of texture construction. Callers decide policy; nothing in
/// here logs-and-continues with a half-built GPU object.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image data: {0}")]
    Decode(#[from] image::ImageError),
    #[error("unsupported channel layout {0:?}; expected 8-bit RGB or RGBA")]
    UnsupportedChannelCount(image::ColorType),
    #[error("a cubemap needs exactly 6 faces, got {0}")]
    WrongFaceCount(usize),
    #[error("cubemap faces must all share one size, got {0}x{1} after {2}x{3}")]
    FaceSizeMismatch(u32, u32, u32, u32),
}

/// A GPU texture with its view and sampler.
#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Decode raw image file contents (PNG, JPEG, ...) into a mipmapped 2D
    /// texture. `srgb` selects color-space interpretation: true for color
    /// maps, false for data maps such as specular intensity.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        srgb: bool,
    ) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(device, queue, &img, Some(label), srgb)
    }

    /// Upload a decoded image as a mipmapped 2D texture. Images are flipped
    /// vertically on upload; the UV origin convention of the model loader
    /// assumes it. Mip levels are produced on the CPU by successive box
    /// downsampling, wgpu has no mipmap generation of its own.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        srgb: bool,
    ) -> Result<Self, TextureError> {
        check_channel_layout(img)?;
        let (width, height) = img.dimensions();
        let rgba = img.flipv().to_rgba8();

        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let mip_level_count = mip_level_count(width, height);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut level_image = rgba;
        for level in 0..mip_level_count {
            let (level_width, level_height) = level_image.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: level,
                    origin: wgpu::Origin3d::ZERO,
                },
                &level_image,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level_width),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
            if level + 1 < mip_level_count {
                level_image = image::imageops::resize(
                    &level_image,
                    (level_width / 2).max(1),
                    (level_height / 2).max(1),
                    image::imageops::FilterType::Triangle,
                );
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// Build a cubemap from six decoded faces in +X, -X, +Y, -Y, +Z, -Z
    /// order. Faces are uploaded as-is, without the vertical flip of the 2D
    /// path: cubemap faces follow the cube-face orientation convention, not
    /// the image-file one.
    pub fn cubemap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[image::DynamicImage],
        label: &str,
    ) -> Result<Self, TextureError> {
        if faces.len() != 6 {
            return Err(TextureError::WrongFaceCount(faces.len()));
        }
        let (width, height) = faces[0].dimensions();
        for face in faces {
            check_channel_layout(face)?;
            let (face_width, face_height) = face.dimensions();
            if (face_width, face_height) != (width, height) {
                return Err(TextureError::FaceSizeMismatch(
                    face_width,
                    face_height,
                    width,
                    height,
                ));
            }
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in faces.iter().enumerate() {
            let rgba = face.to_rgba8();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                },
                &rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// Create a depth texture usable as a render attachment.
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 solid-color texture, used as fallback when a material has no
    /// diffuse or specular map so pipelines never need optional bindings.
    pub fn solid_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

fn check_channel_layout(img: &image::DynamicImage) -> Result<(), TextureError> {
    match img.color() {
        image::ColorType::Rgb8 | image::ColorType::Rgba8 => Ok(()),
        other => Err(TextureError::UnsupportedChannelCount(other)),
    }
}

/// Number of mip levels for a full chain down to 1x1.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_length_covers_down_to_one_pixel() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(1024, 1024), 11);
        assert_eq!(mip_level_count(1024, 4), 11);
        assert_eq!(mip_level_count(640, 480), 10);
    }

    #[test]
    fn grayscale_images_are_rejected_not_misread() {
        let img = image::DynamicImage::ImageLuma8(image::GrayImage::new(2, 2));
        assert!(matches!(
            check_channel_layout(&img),
            Err(TextureError::UnsupportedChannelCount(_))
        ));
    }
}
