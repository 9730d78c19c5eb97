//! GPU-side data containers: vertex/mesh/model types, textures, and
//! off-screen render targets.

pub mod model;
pub mod target;
pub mod texture;
