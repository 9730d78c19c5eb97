//! lantern
//!
//! A minimal real-time 3D rendering demo built on wgpu and winit. One scene,
//! one camera, one spotlight: an OBJ model is loaded, textured and lit inside
//! a cubemap skybox, rendered into a multisampled off-screen target, resolved,
//! and presented through a fullscreen-quad post-process pass. A depth-only
//! shadow map is rendered each frame as scaffolding for shadow sampling.
//!
//! High-level modules
//! - `app`: winit event loop, input handling and frame timing
//! - `camera`: fly camera (yaw/pitch/FOV) and projection math
//! - `config`: startup configuration loaded from an optional settings file
//! - `context`: central GPU and window context that owns device/queue/surface
//! - `data_structures`: engine data models (meshes, textures, render targets)
//! - `frame`: the per-frame pass sequence (shadow, main, resolve, post)
//! - `pipelines`: render pipeline definitions and their WGSL shaders
//! - `resources`: helpers to load models/textures and create GPU resources
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod frame;
pub mod pipelines;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::event::WindowEvent;
