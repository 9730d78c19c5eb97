//! Post-process pass: samples the resolved off-screen image onto a
//! fullscreen quad aimed at the surface. Currently a passthrough; any
//! screen-space effect slots into the fragment shader.

use wgpu::util::DeviceExt;

use crate::data_structures::model::Vertex;
use crate::data_structures::target::RenderTarget;
use crate::pipelines::mk_render_pipeline;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl Vertex for QuadVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
        tex_coords: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        tex_coords: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        tex_coords: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        tex_coords: [1.0, 1.0],
    },
];

pub const QUAD_INDICES: [u32; 6] = [0, 2, 1, 2, 3, 1];

pub struct Quad {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Quad {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertex buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad index buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: QUAD_INDICES.len() as u32,
        }
    }
}

pub fn screen_input_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("screen input bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
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

pub fn screen_input_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    target: &RenderTarget,
    sampler: &wgpu::Sampler,
) -> Option<wgpu::BindGroup> {
    let view = target.color_view()?;
    Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("screen input bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    }))
}

pub fn mk_post_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    screen_input_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("post pipeline layout"),
        bind_group_layouts: &[screen_input_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("post shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("post.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "post pipeline",
        &layout,
        Some(surface_format),
        None,
        &[QuadVertex::desc()],
        shader,
        1,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        for v in &QUAD_VERTICES {
            assert!(v.position[0].abs() == 1.0 && v.position[1].abs() == 1.0);
        }
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
    }
}
