//! Linear algebra used to build model, view and projection transforms.
//!
//! The types are plain `#[repr(C)]` values that can be placed directly inside
//! vertex records and converted to and from their `glam` counterparts.

pub mod matrix;
pub mod vector;

pub use matrix::*;
pub use vector::*;
