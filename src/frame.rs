//! Per-frame rendering: shadow pass, multisampled scene pass, resolve, and
//! the fullscreen post pass onto the surface.

use cgmath::{Deg, Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::config::Config;
use crate::context::Context;
use crate::data_structures::model::{DrawModel, Model};
use crate::data_structures::target::{RenderTarget, SampleMode};
use crate::data_structures::texture::Texture;
use crate::pipelines::object::{self, TransformUniform};
use crate::pipelines::post::{self, Quad};
use crate::pipelines::shadow::{self, LightSpaceUniform};
use crate::pipelines::skybox::{self, SkyUniform};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// What gets drawn: the lit model, the cube the skybox is rendered on, and
/// the cubemap itself.
pub struct Scene {
    pub model: Model,
    pub skybox_cube: Model,
    pub skybox: Texture,
    pub model_matrix: Matrix4<f32>,
}

struct Targets {
    /// Scene pass destination, multisampled when MSAA is on.
    scene: RenderTarget,
    /// Single-sampled image the post pass reads; either the resolve
    /// destination or a copy of the scene target.
    post: RenderTarget,
    shadow: RenderTarget,
}

/// The window-sized scene and post targets. Rebuilt on every resize, unlike
/// the shadow target whose size is fixed by configuration.
fn create_window_targets(
    device: &wgpu::Device,
    settings: &Config,
    ctx: &Context,
) -> (RenderTarget, RenderTarget) {
    let mode = SampleMode::from_sample_count(settings.msaa_samples);
    let (width, height) = (ctx.config.width, ctx.config.height);

    let mut scene = RenderTarget::new(width, height, mode, ctx.config.format, "scene");
    let extra_usage = match mode {
        // Without MSAA there is no resolve; the scene image is copied into
        // the post target instead.
        SampleMode::SingleSampled => wgpu::TextureUsages::COPY_SRC,
        SampleMode::Multisampled { .. } => wgpu::TextureUsages::empty(),
    };
    scene.create_color_attachment(device, extra_usage);
    if let Err(err) = scene.create_depth_stencil_attachment(device) {
        log::error!("scene target: {err}");
    }

    let mut post = RenderTarget::new(
        width,
        height,
        SampleMode::SingleSampled,
        ctx.config.format,
        "post",
    );
    post.create_color_attachment(
        device,
        wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    );

    for target in [&scene, &post] {
        if let Err(err) = target.completeness() {
            log::error!("incomplete render target: {err}");
        }
    }

    (scene, post)
}

fn create_shadow_target(device: &wgpu::Device, settings: &Config, ctx: &Context) -> RenderTarget {
    // Color format is irrelevant here; the shadow target only ever gets a
    // depth attachment.
    let mut shadow = RenderTarget::new(
        settings.shadow_map_size,
        settings.shadow_map_size,
        SampleMode::SingleSampled,
        ctx.config.format,
        "shadow",
    );
    shadow.create_shadow_map(device);
    if let Err(err) = shadow.completeness() {
        log::error!("incomplete render target: {err}");
    }
    shadow
}

pub struct FramePipeline {
    targets: Targets,
    sample_mode: SampleMode,

    object_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    post_pipeline: wgpu::RenderPipeline,

    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    sky_buffer: wgpu::Buffer,
    sky_bind_group: wgpu::BindGroup,
    light_space_buffer: wgpu::Buffer,
    light_space_bind_group: wgpu::BindGroup,
    cubemap_bind_group: wgpu::BindGroup,

    screen_sampler: wgpu::Sampler,
    screen_input_layout: wgpu::BindGroupLayout,
    screen_bind_group: Option<wgpu::BindGroup>,

    quad: Quad,
}

impl FramePipeline {
    pub fn new(
        ctx: &Context,
        settings: &Config,
        scene: &Scene,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let device = &ctx.device;
        let sample_mode = SampleMode::from_sample_count(settings.msaa_samples);
        let (scene_target, post_target) = create_window_targets(device, settings, ctx);
        let targets = Targets {
            scene: scene_target,
            post: post_target,
            shadow: create_shadow_target(device, settings, ctx),
        };

        let uniform_layout = object::transform_layout(device);

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("transform buffer"),
            contents: bytemuck::cast_slice(&[TransformUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let transform_bind_group = uniform_bind_group(
            device,
            &uniform_layout,
            &transform_buffer,
            "transform bind group",
        );

        let sky_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky buffer"),
            contents: bytemuck::cast_slice(&[SkyUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sky_bind_group =
            uniform_bind_group(device, &uniform_layout, &sky_buffer, "sky bind group");

        let light_space_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light space buffer"),
            contents: bytemuck::cast_slice(&[LightSpaceUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_space_bind_group = uniform_bind_group(
            device,
            &uniform_layout,
            &light_space_buffer,
            "light space bind group",
        );

        let cubemap_layout = skybox::cubemap_layout(device);
        let cubemap_bind_group = skybox::cubemap_bind_group(device, &cubemap_layout, &scene.skybox);

        let object_pipeline = object::mk_object_pipeline(
            device,
            ctx.config.format,
            sample_mode.count(),
            material_layout,
            &uniform_layout,
            &ctx.light.bind_group_layout,
        );
        let skybox_pipeline = skybox::mk_skybox_pipeline(
            device,
            ctx.config.format,
            sample_mode.count(),
            &cubemap_layout,
            &uniform_layout,
        );
        let shadow_pipeline = shadow::mk_shadow_pipeline(device, &uniform_layout);
        let screen_input_layout = post::screen_input_layout(device);
        let post_pipeline = post::mk_post_pipeline(device, ctx.config.format, &screen_input_layout);

        let screen_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("screen sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let screen_bind_group = post::screen_input_bind_group(
            device,
            &screen_input_layout,
            &targets.post,
            &screen_sampler,
        );

        let quad = Quad::new(device);

        Self {
            targets,
            sample_mode,
            object_pipeline,
            skybox_pipeline,
            shadow_pipeline,
            post_pipeline,
            transform_buffer,
            transform_bind_group,
            sky_buffer,
            sky_bind_group,
            light_space_buffer,
            light_space_bind_group,
            cubemap_bind_group,
            screen_sampler,
            screen_input_layout,
            screen_bind_group,
            quad,
        }
    }

    /// Recreate the window-sized targets after a resize. The shadow target
    /// is resolution-independent and survives untouched.
    pub fn resize(&mut self, ctx: &Context, settings: &Config) {
        let (scene, post) = create_window_targets(&ctx.device, settings, ctx);
        self.targets.scene = scene;
        self.targets.post = post;
        self.screen_bind_group = post::screen_input_bind_group(
            &ctx.device,
            &self.screen_input_layout,
            &self.targets.post,
            &self.screen_sampler,
        );
    }

    pub fn render(&mut self, ctx: &mut Context, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let view_matrix = ctx.camera.view_matrix();
        let projection = ctx.projection.matrix(Deg(ctx.camera.fov()));

        let transform = TransformUniform {
            model: scene.model_matrix.into(),
            pvm: (projection * view_matrix * scene.model_matrix).into(),
        };
        ctx.queue
            .write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&[transform]));

        let sky = SkyUniform {
            proj_rot_view: (projection * ctx.camera.rotation_view_matrix()).into(),
        };
        ctx.queue
            .write_buffer(&self.sky_buffer, 0, bytemuck::cast_slice(&[sky]));

        let light_space = LightSpaceUniform {
            matrix: (light_projection()
                * Matrix4::look_at_rh(
                    ctx.camera.position,
                    ctx.camera.position + ctx.camera.front(),
                    Vector3::unit_y(),
                ))
            .into(),
        };
        ctx.queue.write_buffer(
            &self.light_space_buffer,
            0,
            bytemuck::cast_slice(&[light_space]),
        );

        ctx.light.update(&ctx.queue, &ctx.camera);

        let output = ctx.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        self.shadow_pass(&mut encoder, scene);
        self.scene_pass(&mut encoder, scene, &ctx.light.bind_group);
        self.resolve(&mut encoder);
        self.post_pass(&mut encoder, &surface_view);

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn shadow_pass(&self, encoder: &mut wgpu::CommandEncoder, scene: &Scene) {
        let Some(depth_view) = self.targets.shadow.depth_view() else {
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &self.light_space_bind_group, &[]);
        pass.draw_model_untextured(&scene.model);
    }

    fn scene_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        light_bind_group: &wgpu::BindGroup,
    ) {
        let (Some(color_view), Some(depth_view)) =
            (self.targets.scene.color_view(), self.targets.scene.depth_view())
        else {
            return;
        };
        // With MSAA the hardware resolves straight into the post target;
        // without it the same image is copied over afterwards.
        let resolve_target = match self.sample_mode {
            SampleMode::Multisampled { .. } => self.targets.post.color_view(),
            SampleMode::SingleSampled => None,
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.object_pipeline);
        pass.set_bind_group(1, &self.transform_bind_group, &[]);
        pass.set_bind_group(2, light_bind_group, &[]);
        pass.draw_model(&scene.model);

        // Drawn last so most of its fragments fail the depth test.
        pass.set_pipeline(&self.skybox_pipeline);
        pass.set_bind_group(0, &self.cubemap_bind_group, &[]);
        pass.set_bind_group(1, &self.sky_bind_group, &[]);
        pass.draw_model_untextured(&scene.skybox_cube);
    }

    fn resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        if !matches!(self.sample_mode, SampleMode::SingleSampled) {
            return;
        }
        let (Some(src), Some(dst)) = (
            self.targets.scene.color_texture(),
            self.targets.post.color_texture(),
        ) else {
            return;
        };
        let (width, height) = self.targets.scene.size();
        encoder.copy_texture_to_texture(
            src.as_image_copy(),
            dst.as_image_copy(),
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn post_pass(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let Some(screen_bind_group) = &self.screen_bind_group else {
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("post pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.post_pipeline);
        pass.set_bind_group(0, screen_bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
        pass.set_index_buffer(self.quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.quad.num_elements, 0, 0..1);
    }
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// Projection used for the light's depth pass.
fn light_projection() -> Matrix4<f32> {
    crate::camera::OPENGL_TO_WGPU_MATRIX
        * cgmath::perspective(Deg(45.0), 1.0, 1.0, 100.0)
}
