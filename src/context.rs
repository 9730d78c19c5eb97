use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::camera::{Camera, Projection};
use crate::config::Config;
use crate::pipelines::spotlight::SpotlightResources;

/// Everything tied to one surface: the GPU handles, the surface
/// configuration, and the camera and light state the frame reads each tick.
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: Camera,
    pub projection: Projection,
    pub light: SpotlightResources,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Config) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("initializing wgpu");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;
        log::info!("adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to acquire a device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface; on a linear format everything
        // would come out too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera = Camera::new(
            cgmath::Point3::new(0.0, 0.0, 5.0),
            settings.move_speed,
            settings.mouse_sensitivity,
            settings.fov,
            settings.min_fov,
            settings.max_fov,
        );
        let projection = Projection::new(config.width, config.height, 0.1, 100.0);

        let light = SpotlightResources::new(&device);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.projection.resize(width, height);
    }
}
