//! Skybox pass: a cube centred on the camera, drawn last at maximum depth.

use crate::data_structures::model::{self, Vertex};
use crate::data_structures::target::RenderTarget;
use crate::data_structures::texture::Texture;
use crate::pipelines::mk_render_pipeline;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform {
    /// Projection times the rotation-only view matrix; translation is
    /// stripped so the box never moves relative to the camera.
    pub proj_rot_view: [[f32; 4]; 4],
}

impl SkyUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            proj_rot_view: cgmath::Matrix4::identity().into(),
        }
    }
}

impl Default for SkyUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn cubemap_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("cubemap bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub fn cubemap_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    cubemap: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("cubemap bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&cubemap.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&cubemap.sampler),
            },
        ],
    })
}

pub fn mk_skybox_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    cubemap_layout: &wgpu::BindGroupLayout,
    sky_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("skybox pipeline layout"),
        bind_group_layouts: &[cubemap_layout, sky_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("skybox shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("skybox.wgsl").into()),
    };

    // LessEqual lets the box through exactly where nothing else was drawn,
    // since the vertex stage pins its depth to the far plane. The camera
    // sits inside the cube, so back faces must not be culled.
    mk_render_pipeline(
        device,
        "skybox pipeline",
        &layout,
        Some(color_format),
        Some((
            RenderTarget::DEPTH_STENCIL_FORMAT,
            false,
            wgpu::CompareFunction::LessEqual,
        )),
        &[model::ModelVertex::desc()],
        shader,
        sample_count,
        None,
    )
}
