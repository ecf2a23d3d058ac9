//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct, which owns an indexed vertex
//! buffer, an index buffer and the [`VertexArray`] tying them together.
//! Vertices should implement the [`Vertex`] trait.

use std::sync::Arc;

use bytemuck::Pod;

use super::{Buffer, Device, GlDevice, IndexType, PrimitiveMode, VertexArray, VertexLayout};
use crate::error::Result;

/// Trait that defines the layout of an interleaved vertex record.
pub trait Vertex: Pod {
    /// Describes the attributes of one record.
    fn layout() -> Result<VertexLayout>;
}

/// Represents an indexed mesh stored on the GPU side.
pub struct Mesh<D: Device = GlDevice> {
    // Declared first so the vertex array is released before the buffers it reads.
    vertex_array: VertexArray<D>,
    vertex_buffer: Buffer<D>,
    index_buffer: Buffer<D>,
    mode: PrimitiveMode,
    index_count: usize,
}

impl<D: Device> Mesh<D> {
    /// Uploads `vertices` and `indices` and builds the vertex array for them.
    pub fn new<V: Vertex>(device: &Arc<D>, vertices: &[V], indices: &[u32], mode: PrimitiveMode) -> Result<Self> {
        let layout = V::layout()?;
        let vertex_buffer = Buffer::from_slice(device, vertices)?;
        let index_buffer = Buffer::from_slice(device, indices)?;

        let mut vertex_array = VertexArray::new(device)?;
        vertex_array.add(layout);
        vertex_array.bind_buffers(size_of::<V>() as u32, &vertex_buffer, &index_buffer);

        Ok(Self {
            vertex_array,
            vertex_buffer,
            index_buffer,
            mode,
            index_count: indices.len(),
        })
    }

    /// Draws the mesh with the currently bound shader program.
    pub fn draw(&self) -> Result<()> {
        self.vertex_array
            .draw(self.mode, self.index_count, IndexType::UnsignedInt)
    }

    /// Returns the amount of indices used in the mesh.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn vertex_array(&self) -> &VertexArray<D> {
        &self.vertex_array
    }

    pub fn vertex_buffer(&self) -> &Buffer<D> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &Buffer<D> {
        &self.index_buffer
    }
}

#[cfg(test)]
mod tests {
    use bytemuck::Zeroable;

    use super::*;
    use crate::abs::mock::MockDevice;
    use crate::abs::ScalarType;
    use crate::math::Vector2;

    #[derive(Debug, Clone, Copy, Pod, Zeroable)]
    #[repr(C)]
    struct TestVertex {
        position: Vector2,
        uv: Vector2,
    }

    impl Vertex for TestVertex {
        fn layout() -> Result<VertexLayout> {
            let mut layout = VertexLayout::new();
            layout
                .add(2, ScalarType::Float, false, 0)?
                .add(2, ScalarType::Float, false, 8)?;
            Ok(layout)
        }
    }

    #[test]
    fn test_mesh_owns_everything() {
        let device = Arc::new(MockDevice::default());
        let vertices = [
            TestVertex { position: Vector2::new(-1.0, -1.0), uv: Vector2::new(0.0, 0.0) },
            TestVertex { position: Vector2::new(1.0, -1.0), uv: Vector2::new(1.0, 0.0) },
            TestVertex { position: Vector2::new(0.0, 1.0), uv: Vector2::new(0.5, 1.0) },
        ];
        let mesh = Mesh::new(&device, &vertices, &[0, 1, 2], PrimitiveMode::Triangles).unwrap();

        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.vertex_buffer().size(), 48);
        assert_eq!(mesh.vertex_array().stride(), Some(16));
        mesh.draw().unwrap();
        assert_eq!(device.draws().len(), 1);

        drop(mesh);
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
    }

    #[derive(Debug, Clone, Copy, Pod, Zeroable)]
    #[repr(C)]
    struct BadVertex {
        position: [f32; 5],
    }

    impl Vertex for BadVertex {
        fn layout() -> Result<VertexLayout> {
            let mut layout = VertexLayout::new();
            layout.add(5, ScalarType::Float, false, 0)?;
            Ok(layout)
        }
    }

    #[test]
    fn test_invalid_layout_allocates_nothing() {
        let device = Arc::new(MockDevice::default());
        let vertices = [BadVertex { position: [0.0; 5] }];
        let result = Mesh::new(&device, &vertices, &[0], PrimitiveMode::Points);

        assert!(matches!(result, Err(crate::error::Error::InvalidAttribute { .. })));
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
    }
}
