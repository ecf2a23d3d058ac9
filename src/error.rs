//! Error types for the crate.

use thiserror::Error;

use crate::abs::ShaderStage;

/// Main error type for the crate.
///
/// Every fallible operation returns this instead of aborting, so the host
/// application can retry, substitute a fallback resource or exit.
#[derive(Debug, Error)]
pub enum Error {
    /// A shader source line appeared before any `#shader` directive.
    #[error("Shader source line {line} appears before any #shader directive")]
    Parse { line: usize },

    /// A shader stage failed to compile.
    #[error("Failed to compile {stage} shader:\n{diagnostic}")]
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },

    /// The shader program failed to link.
    #[error("Failed to link shader program:\n{diagnostic}")]
    Link { diagnostic: String },

    /// An image could not be loaded, decoded or uploaded.
    #[error("Failed to load texture {name}: {reason}")]
    Resource { name: String, reason: String },

    /// The device refused to create an object.
    #[error("Device error: {0}")]
    Device(String),

    /// A write would go past the end of a fixed-size buffer.
    #[error("Write of {len} bytes at offset {offset} exceeds buffer size {size}")]
    BufferOverflow { offset: usize, len: usize, size: usize },

    /// A vertex attribute description was rejected.
    #[error("Invalid vertex attribute {index}: {reason}")]
    InvalidAttribute { index: usize, reason: String },

    /// A draw was issued on a vertex array missing its layout or its buffers.
    #[error("Vertex array is incomplete (layout attached: {layout}, buffers bound: {buffers})")]
    IncompleteVertexArray { layout: bool, buffers: bool },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, Error>;
