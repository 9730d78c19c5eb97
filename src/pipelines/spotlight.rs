//! Spotlight uniform, kept glued to the camera: the light sits at the eye
//! and points along the view direction, like a head-mounted torch.

use cgmath::{Angle, InnerSpace};
use wgpu::util::DeviceExt;

use crate::camera::Camera;

/// Std140-compatible layout: each vec3 shares a row with the scalar that
/// follows it, so the struct packs without implicit padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotlightUniform {
    pub position: [f32; 3],
    pub inner_cutoff: f32,
    pub direction: [f32; 3],
    pub outer_cutoff: f32,
    pub ambient: [f32; 3],
    pub attenuation_constant: f32,
    pub diffuse: [f32; 3],
    pub attenuation_linear: f32,
    pub specular: [f32; 3],
    pub attenuation_quadratic: f32,
    pub shininess: f32,
    pub _padding: [f32; 3],
}

impl SpotlightUniform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            inner_cutoff: cgmath::Deg(15.0).cos(),
            direction: [0.0, 0.0, 1.0],
            outer_cutoff: cgmath::Deg(17.0).cos(),
            ambient: [0.2, 0.2, 0.2],
            attenuation_constant: 1.0,
            diffuse: [0.5, 0.5, 0.5],
            attenuation_linear: 0.045,
            specular: [1.0, 1.0, 1.0],
            attenuation_quadratic: 0.0075,
            shininess: 256.0,
            _padding: [0.0; 3],
        }
    }

    /// The uploaded direction points from the scene toward the light, so
    /// the cone test compares it against the fragment-to-light vector
    /// directly.
    pub fn follow_camera(&mut self, camera: &Camera) {
        self.position = camera.position.into();
        self.direction = (-camera.front()).normalize().into();
    }
}

impl Default for SpotlightUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SpotlightResources {
    pub uniform: SpotlightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl SpotlightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = SpotlightUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spotlight buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("spotlight bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spotlight bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            uniform,
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Move the light to the camera and push the uniform to the GPU.
    pub fn update(&mut self, queue: &wgpu::Queue, camera: &Camera) {
        self.uniform.follow_camera(camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<SpotlightUniform>(), 96);
    }

    #[test]
    fn cone_cutoffs_are_cosines() {
        let uniform = SpotlightUniform::new();
        assert!(uniform.inner_cutoff > uniform.outer_cutoff);
        assert!((uniform.inner_cutoff - 15.0_f32.to_radians().cos()).abs() < 1e-6);
        assert!((uniform.outer_cutoff - 17.0_f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn light_follows_the_camera() {
        let camera = Camera::new(
            cgmath::Point3::new(1.0, 2.0, 3.0),
            2.5,
            0.4,
            70.0,
            0.1,
            120.0,
        );
        let mut uniform = SpotlightUniform::new();
        uniform.follow_camera(&camera);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0]);
        // Default yaw looks down -Z; the uploaded direction points back
        // along +Z, opposite the view.
        assert!((uniform.direction[2] - 1.0).abs() < 1e-5);
    }
}
