//! A small real-time rendering toolkit.
//!
//! [`math`] provides the vectors and matrices used to build model, view and
//! projection transforms. [`abs`] wraps GPU resources (buffers, vertex
//! layouts, vertex arrays, shader programs and textures) behind the
//! [`abs::Device`] trait, implemented for OpenGL through `glow`.

pub mod abs;
pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod transform;

pub use error::{Error, Result};
pub use math::{Matrix4, Vector2, Vector3, Vector4};
pub use transform::{Camera, Transform};
