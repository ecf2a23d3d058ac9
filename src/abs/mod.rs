//! This module contains the GPU resource abstractions: the device interface,
//! buffers, vertex layouts and arrays, meshes, shaders and textures.

#[cfg(feature = "demo")]
pub mod app;
pub mod buffer;
pub mod device;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod vertex;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(feature = "demo")]
pub use app::*;
pub use buffer::*;
pub use device::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
pub use vertex::*;
