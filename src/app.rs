//! Window lifecycle and the event loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use cgmath::SquareMatrix;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window};

use crate::camera::InputState;
use crate::config::Config;
use crate::context::Context;
use crate::data_structures::model;
use crate::frame::{FramePipeline, Scene};
use crate::resources::{self, TextureCache};

struct AppState {
    ctx: Context,
    frame: FramePipeline,
    scene: Scene,
    input: InputState,
    last_time: Instant,
    /// Set once raw mouse motion arrives; from then on absolute cursor
    /// samples are ignored so movement is never applied twice.
    raw_mouse_seen: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: &Config) -> anyhow::Result<Self> {
        let ctx = Context::new(window, settings).await?;

        let material_layout = model::material_layout(&ctx.device);
        let mut cache = TextureCache::new();

        log::info!("loading {}", settings.model_path);
        let model = resources::load_model_obj(
            Path::new(&settings.model_path),
            &ctx.device,
            &ctx.queue,
            &material_layout,
            &mut cache,
        )
        .with_context(|| format!("failed to load {}", settings.model_path))?;

        let skybox_cube = resources::load_model_obj(
            Path::new(&settings.cube_path),
            &ctx.device,
            &ctx.queue,
            &material_layout,
            &mut cache,
        )
        .with_context(|| format!("failed to load {}", settings.cube_path))?;

        let face_paths: Vec<_> = settings
            .skybox_faces
            .iter()
            .map(std::path::PathBuf::from)
            .collect();
        let skybox = resources::load_cubemap(&face_paths, &ctx.device, &ctx.queue)
            .context("failed to load the skybox")?;

        let scene = Scene {
            model,
            skybox_cube,
            skybox,
            model_matrix: cgmath::Matrix4::identity(),
        };

        let frame = FramePipeline::new(&ctx, settings, &scene, &material_layout);

        Ok(Self {
            ctx,
            frame,
            scene,
            input: InputState::default(),
            last_time: Instant::now(),
            raw_mouse_seen: false,
        })
    }

    fn resize(&mut self, settings: &Config, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.ctx.resize(width, height);
        self.frame.resize(&self.ctx, settings);
    }

    fn redraw(&mut self, settings: &Config) {
        let dt = self.last_time.elapsed().as_secs_f32();
        self.last_time = Instant::now();
        self.ctx.camera.process_keyboard(&self.input, dt);

        match self.frame.render(&mut self.ctx, &self.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window.inner_size();
                self.resize(settings, size.width, size.height);
            }
            Err(e) => log::error!("unable to render: {e}"),
        }
        self.ctx.window.request_redraw();
    }
}

pub struct App {
    settings: Config,
    state: Option<AppState>,
    init_error: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: Config) -> Self {
        Self {
            settings,
            state: None,
            init_error: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes().with_title("lantern");
        if self.settings.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        } else {
            let (width, height) = self.settings.window_size;
            attributes =
                attributes.with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        // A captured cursor matches the fly-camera controls; fall back to
        // confinement where the platform has no locked mode.
        if let Err(e) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            log::warn!("could not grab the cursor: {e}");
        }
        window.set_cursor_visible(false);

        match pollster::block_on(AppState::new(window, &self.settings)) {
            Ok(mut state) => {
                state.ctx.window.request_redraw();
                state.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.raw_mouse_seen = true;
            state.ctx.camera.process_mouse_delta(dx as f32, dy as f32);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                PhysicalKey::Code(code) => {
                    state
                        .input
                        .handle_key(code, event.state == ElementState::Pressed);
                }
                PhysicalKey::Unidentified(_) => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                // Fallback for platforms without raw mouse motion. A locked
                // cursor stops emitting these, so the primary look path is
                // the MouseMotion handling in device_event.
                if !state.raw_mouse_seen {
                    state
                        .ctx
                        .camera
                        .process_mouse_movement(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                state.ctx.camera.process_scroll(dy);
            }
            WindowEvent::Resized(size) => {
                state.resize(&self.settings, size.width, size.height);
            }
            WindowEvent::RedrawRequested => state.redraw(&self.settings),
            _ => {}
        }
    }
}

pub fn run(settings: Config) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);
    event_loop.run_app(&mut app)?;
    if let Some(e) = app.init_error.take() {
        return Err(e);
    }
    Ok(())
}
