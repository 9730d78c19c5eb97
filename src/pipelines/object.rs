//! Lit object pass: textured meshes shaded by the camera-mounted spotlight.

use crate::data_structures::model::{self, Vertex};
use crate::data_structures::target::RenderTarget;
use crate::pipelines::mk_render_pipeline;

/// Per-object matrices. `pvm` is projection * view * model, precomputed on
/// the CPU so the vertex stage does a single multiply.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub pvm: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        let identity: [[f32; 4]; 4] = cgmath::Matrix4::identity().into();
        Self {
            model: identity,
            pvm: identity,
        }
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn transform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("transform bind group layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

pub fn mk_object_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    material_layout: &wgpu::BindGroupLayout,
    transform_layout: &wgpu::BindGroupLayout,
    spotlight_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("object pipeline layout"),
        bind_group_layouts: &[material_layout, transform_layout, spotlight_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("object shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("object.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        "object pipeline",
        &layout,
        Some(color_format),
        Some((
            RenderTarget::DEPTH_STENCIL_FORMAT,
            true,
            wgpu::CompareFunction::Less,
        )),
        &[model::ModelVertex::desc()],
        shader,
        sample_count,
        Some(wgpu::Face::Back),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_uniform_fits_two_matrices() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 128);
    }
}
