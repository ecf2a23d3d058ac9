//! Vertex layouts and vertex arrays.
//!
//! A [`VertexLayout`] describes how one interleaved vertex record is laid out in
//! memory. A [`VertexArray`] takes ownership of a layout and is separately bound
//! to a vertex buffer and an index buffer; both steps are needed before it can
//! be drawn.
//!
//! Only interleaved, single-buffer vertex streams are supported: every
//! attribute reads from buffer binding slot 0.

use std::sync::Arc;

use super::{Buffer, Device, GlDevice};
use crate::error::{Error, Result};

/// The buffer binding slot every attribute is sourced from.
const BINDING_SLOT: u32 = 0;

/// Scalar type of a vertex attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Byte = glow::BYTE as isize,
    UnsignedByte = glow::UNSIGNED_BYTE as isize,
    Short = glow::SHORT as isize,
    UnsignedShort = glow::UNSIGNED_SHORT as isize,
    Int = glow::INT as isize,
    UnsignedInt = glow::UNSIGNED_INT as isize,
    HalfFloat = glow::HALF_FLOAT as isize,
    Float = glow::FLOAT as isize,
    Double = glow::DOUBLE as isize,
}

impl ScalarType {
    /// Size of one component in bytes.
    pub const fn size(self) -> usize {
        match self {
            ScalarType::Byte | ScalarType::UnsignedByte => 1,
            ScalarType::Short | ScalarType::UnsignedShort | ScalarType::HalfFloat => 2,
            ScalarType::Int | ScalarType::UnsignedInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            ScalarType::HalfFloat | ScalarType::Float | ScalarType::Double
        )
    }

    pub const fn gl_enum(self) -> u32 {
        self as u32
    }
}

/// One attribute of a vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute location, equal to the attribute's position in its layout.
    pub attribute_index: u32,
    /// Number of components, 1 to 4.
    pub component_count: u8,
    pub scalar_type: ScalarType,
    /// Whether integer data is mapped to `[0, 1]`/`[-1, 1]` floats.
    pub normalized: bool,
    /// Offset of the attribute from the start of the vertex record.
    pub byte_offset: u32,
    /// Read as `int`/`uint` in the shader instead of being converted to float.
    pub integer: bool,
}

impl VertexAttribute {
    /// Size of the attribute in bytes.
    pub const fn byte_size(&self) -> usize {
        self.component_count as usize * self.scalar_type.size()
    }

    /// Whether the shader receives the attribute as an integer rather than a float.
    ///
    /// Only attributes added with [`VertexLayout::add_integer`] are. Everything
    /// else, unnormalized integer data included, is converted to float.
    pub const fn is_integer(&self) -> bool {
        self.integer
    }
}

/// An ordered, append-only list of vertex attributes.
///
/// Attribute indices are assigned in declaration order starting at 0. Storage
/// doubles in capacity whenever it is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    capacity: usize,
}

impl VertexLayout {
    pub const DEFAULT_CAPACITY: usize = 4;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an empty layout with room for `capacity` attributes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            attributes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an attribute the shader reads as floats and returns the layout
    /// for chaining.
    ///
    /// Integer scalar types are converted, mapped to `[0, 1]`/`[-1, 1]` when
    /// `normalized` is set and taken by value otherwise.
    pub fn add(
        &mut self,
        component_count: u8,
        scalar_type: ScalarType,
        normalized: bool,
        byte_offset: u32,
    ) -> Result<&mut Self> {
        self.push(component_count, scalar_type, normalized, byte_offset, false)
    }

    /// Appends an attribute the shader reads as `int`/`uint` components.
    pub fn add_integer(&mut self, component_count: u8, scalar_type: ScalarType, byte_offset: u32) -> Result<&mut Self> {
        if !scalar_type.is_integer() {
            return Err(Error::InvalidAttribute {
                index: self.attributes.len(),
                reason: format!("{scalar_type:?} is not an integer type"),
            });
        }
        self.push(component_count, scalar_type, false, byte_offset, true)
    }

    fn push(
        &mut self,
        component_count: u8,
        scalar_type: ScalarType,
        normalized: bool,
        byte_offset: u32,
        integer: bool,
    ) -> Result<&mut Self> {
        if !(1..=4).contains(&component_count) {
            return Err(Error::InvalidAttribute {
                index: self.attributes.len(),
                reason: format!("expected 1 to 4 components, got {component_count}"),
            });
        }

        if self.attributes.len() >= self.capacity {
            self.attributes.reserve_exact(self.capacity);
            self.capacity *= 2;
            log::trace!("Vertex layout grown to {} attributes", self.capacity);
        }

        self.attributes.push(VertexAttribute {
            attribute_index: self.attributes.len() as u32,
            component_count,
            scalar_type,
            normalized,
            byte_offset,
            integer,
        });
        Ok(self)
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of attributes the layout can hold before growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes from the start of a record to the end of its furthest attribute.
    ///
    /// Equal to the vertex size for tightly packed records without trailing padding.
    pub fn packed_stride(&self) -> usize {
        self.attributes
            .iter()
            .map(|a| a.byte_offset as usize + a.byte_size())
            .max()
            .unwrap_or(0)
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a VertexLayout {
    type Item = &'a VertexAttribute;
    type IntoIter = std::slice::Iter<'a, VertexAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

/// Primitive assembly mode for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points = glow::POINTS as isize,
    Lines = glow::LINES as isize,
    LineStrip = glow::LINE_STRIP as isize,
    Triangles = glow::TRIANGLES as isize,
    TriangleStrip = glow::TRIANGLE_STRIP as isize,
    TriangleFan = glow::TRIANGLE_FAN as isize,
}

impl PrimitiveMode {
    pub const fn gl_enum(self) -> u32 {
        self as u32
    }
}

/// Type of the values stored in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    UnsignedByte = glow::UNSIGNED_BYTE as isize,
    UnsignedShort = glow::UNSIGNED_SHORT as isize,
    UnsignedInt = glow::UNSIGNED_INT as isize,
}

impl IndexType {
    pub const fn size(self) -> usize {
        match self {
            IndexType::UnsignedByte => 1,
            IndexType::UnsignedShort => 2,
            IndexType::UnsignedInt => 4,
        }
    }

    pub const fn gl_enum(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundBuffers<B> {
    stride: u32,
    vertex: B,
    index: B,
}

/// A vertex array: a layout plus the vertex and index buffers it reads from.
///
/// Owns its [`VertexLayout`]. The buffers are only referenced and must outlive
/// every draw issued through the array; dropping the array never releases them.
pub struct VertexArray<D: Device = GlDevice> {
    device: Arc<D>,
    id: D::VertexArray,
    layout: Option<VertexLayout>,
    buffers: Option<BoundBuffers<D::Buffer>>,
}

impl<D: Device> VertexArray<D> {
    pub fn new(device: &Arc<D>) -> Result<Self> {
        let id = device.create_vertex_array().map_err(Error::Device)?;
        Ok(Self {
            device: Arc::clone(device),
            id,
            layout: None,
            buffers: None,
        })
    }

    /// Takes ownership of `layout` and programs every attribute it describes.
    ///
    /// A previously attached layout is dropped, and its slots that the new
    /// layout does not cover are disabled.
    pub fn add(&mut self, layout: VertexLayout) {
        if let Some(previous) = self.layout.take() {
            for attribute in previous.attributes().iter().skip(layout.len()) {
                self.device
                    .disable_vertex_attribute(self.id, attribute.attribute_index);
            }
        }

        for attribute in &layout {
            self.device
                .set_vertex_attribute(self.id, attribute, BINDING_SLOT);
        }
        self.layout = Some(layout);
    }

    /// Sets the data source: `vertex` holds records `stride` bytes apart, `index` the indices.
    pub fn bind_buffers(&mut self, stride: u32, vertex: &Buffer<D>, index: &Buffer<D>) {
        self.device
            .set_vertex_buffers(self.id, BINDING_SLOT, stride, vertex.handle(), index.handle());
        self.buffers = Some(BoundBuffers {
            stride,
            vertex: vertex.handle(),
            index: index.handle(),
        });
    }

    pub fn layout(&self) -> Option<&VertexLayout> {
        self.layout.as_ref()
    }

    /// Stride passed to the last [`VertexArray::bind_buffers`] call.
    pub fn stride(&self) -> Option<u32> {
        self.buffers.map(|b| b.stride)
    }

    /// The vertex and index buffer handles the array reads from.
    pub fn bound_buffers(&self) -> Option<(D::Buffer, D::Buffer)> {
        self.buffers.map(|b| (b.vertex, b.index))
    }

    /// Whether both a layout and buffers have been attached.
    pub fn is_complete(&self) -> bool {
        self.layout.is_some() && self.buffers.is_some()
    }

    pub fn bind(&self) {
        self.device.bind_vertex_array(Some(self.id));
    }

    pub fn handle(&self) -> D::VertexArray {
        self.id
    }

    /// Draws `index_count` indices with the currently bound shader program.
    pub fn draw(&self, mode: PrimitiveMode, index_count: usize, index_type: IndexType) -> Result<()> {
        if !self.is_complete() {
            return Err(Error::IncompleteVertexArray {
                layout: self.layout.is_some(),
                buffers: self.buffers.is_some(),
            });
        }

        self.bind();
        self.device.draw_elements(mode, index_count, index_type);
        self.device.bind_vertex_array(None);
        Ok(())
    }
}

impl<D: Device> Drop for VertexArray<D> {
    fn drop(&mut self) {
        self.device.delete_vertex_array(self.id);
    }
}
