//! GPU buffers.
//!
//! A [`Buffer`] owns one device buffer whose byte size is fixed when it is
//! created. Contents are uploaded synchronously. To resize, create a new buffer.

use std::sync::Arc;

use bytemuck::Pod;

use super::{Device, GlDevice};
use crate::error::{Error, Result};

/// Size and optional initial contents of a buffer to create.
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    pub size: usize,
    pub contents: Option<&'a [u8]>,
}

impl<'a> BufferDesc<'a> {
    /// A buffer exactly as large as `contents`.
    pub fn new(contents: &'a [u8]) -> Self {
        Self {
            size: contents.len(),
            contents: Some(contents),
        }
    }

    /// A buffer of `size` bytes with unspecified contents.
    pub fn uninit(size: usize) -> Self {
        Self { size, contents: None }
    }
}

/// Represents a fixed-size buffer stored on the GPU side.
pub struct Buffer<D: Device = GlDevice> {
    device: Arc<D>,
    id: D::Buffer,
    size: usize,
}

impl<D: Device> Buffer<D> {
    /// Largest size in bytes a buffer can have; sizes and offsets reach the
    /// device as signed 32-bit values.
    pub const MAX_SIZE: usize = i32::MAX as usize;

    /// Creates a buffer holding a copy of `contents`.
    pub fn new(device: &Arc<D>, contents: &[u8]) -> Result<Self> {
        Self::from_desc(device, &BufferDesc::new(contents))
    }

    /// Creates a buffer of `size` bytes without initializing it.
    pub fn with_size(device: &Arc<D>, size: usize) -> Result<Self> {
        Self::from_desc(device, &BufferDesc::uninit(size))
    }

    /// Creates a buffer from a slice of plain data, such as vertices or indices.
    pub fn from_slice<T: Pod>(device: &Arc<D>, data: &[T]) -> Result<Self> {
        Self::new(device, bytemuck::cast_slice(data))
    }

    /// Creates a buffer from a description.
    ///
    /// Contents shorter than `size` fill the front of an otherwise zeroed
    /// buffer; longer contents are rejected, as are sizes above
    /// [`Buffer::MAX_SIZE`].
    pub fn from_desc(device: &Arc<D>, desc: &BufferDesc<'_>) -> Result<Self> {
        if desc.size > Self::MAX_SIZE {
            return Err(Error::Device(format!(
                "buffer size {} exceeds the limit of {} bytes",
                desc.size,
                Self::MAX_SIZE
            )));
        }

        let id = match desc.contents {
            Some(data) if data.len() > desc.size => {
                return Err(Error::BufferOverflow {
                    offset: 0,
                    len: data.len(),
                    size: desc.size,
                });
            }
            Some(data) if data.len() < desc.size => {
                let mut padded = vec![0u8; desc.size];
                padded[..data.len()].copy_from_slice(data);
                device.create_buffer(desc.size, Some(&padded))
            }
            contents => device.create_buffer(desc.size, contents),
        }
        .map_err(Error::Device)?;

        log::trace!("Created buffer {id:?} ({} bytes)", desc.size);

        Ok(Self {
            device: Arc::clone(device),
            id,
            size: desc.size,
        })
    }

    /// Overwrites `data.len()` bytes starting at `offset`.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        match offset.checked_add(data.len()) {
            Some(end) if end <= self.size => {
                self.device.write_buffer(self.id, offset, data);
                Ok(())
            }
            _ => Err(Error::BufferOverflow {
                offset,
                len: data.len(),
                size: self.size,
            }),
        }
    }

    /// Size in bytes, fixed at creation.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn handle(&self) -> D::Buffer {
        self.id
    }
}

impl<D: Device> Drop for Buffer<D> {
    fn drop(&mut self) {
        self.device.delete_buffer(self.id);
    }
}

/// Creates one buffer per description, uploading contents immediately.
///
/// If any creation fails, the buffers created before it are released.
pub fn create_buffers<D: Device>(device: &Arc<D>, descs: &[BufferDesc<'_>]) -> Result<Vec<Buffer<D>>> {
    descs
        .iter()
        .map(|desc| Buffer::from_desc(device, desc))
        .collect()
}
