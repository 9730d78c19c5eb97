//! Shadow pass: renders scene depth from the light's point of view into a
//! depth-only map. The map is produced every frame; wiring it into the
//! object shader is still open.

use crate::data_structures::model::{self, Vertex};
use crate::data_structures::texture::Texture;
use crate::pipelines::mk_render_pipeline;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightSpaceUniform {
    pub matrix: [[f32; 4]; 4],
}

impl LightSpaceUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            matrix: cgmath::Matrix4::identity().into(),
        }
    }
}

impl Default for LightSpaceUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    light_space_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shadow pipeline layout"),
        bind_group_layouts: &[light_space_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("shadow shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "shadow pipeline",
        &layout,
        None,
        Some((Texture::DEPTH_FORMAT, true, wgpu::CompareFunction::Less)),
        &[model::ModelVertex::desc()],
        shader,
        1,
        Some(wgpu::Face::Back),
    )
}
