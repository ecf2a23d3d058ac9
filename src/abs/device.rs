//! The graphics device interface.
//!
//! Every resource wrapper in [`crate::abs`] talks to the GPU exclusively through
//! the [`Device`] trait. [`GlDevice`] implements it on top of an OpenGL 4.3
//! core context via `glow`, using separate vertex attribute formats and a single
//! vertex buffer binding point.
//!
//! All calls must happen on the thread that owns the context.

use std::fmt::Debug;
use std::ops::Deref;

use glow::HasContext;

use super::{IndexType, PrimitiveMode, ShaderStage, TextureFilter, TextureOptions, VertexAttribute};

/// Operations the resource wrappers need from a graphics device.
///
/// Handles are opaque, `Copy` identifiers. Creation functions report the
/// device's refusal as a `String`, everything else is infallible from the
/// caller's point of view.
pub trait Device {
    type Buffer: Copy + Eq + Debug;
    type VertexArray: Copy + Eq + Debug;
    type Shader: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;
    type Texture: Copy + Eq + Debug;
    type UniformLocation: Clone + Debug;

    /// Creates a buffer of `size` bytes. `contents`, when present, is exactly `size` bytes long.
    fn create_buffer(&self, size: usize, contents: Option<&[u8]>) -> Result<Self::Buffer, String>;
    fn write_buffer(&self, buffer: Self::Buffer, offset: usize, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// Programs the attribute format, enables the slot and points it at `binding`.
    fn set_vertex_attribute(&self, vertex_array: Self::VertexArray, attribute: &VertexAttribute, binding: u32);
    fn disable_vertex_attribute(&self, vertex_array: Self::VertexArray, index: u32);
    /// Attaches `vertex` to `binding` with the given stride, and `index` as the element buffer.
    fn set_vertex_buffers(
        &self,
        vertex_array: Self::VertexArray,
        binding: u32,
        stride: u32,
        vertex: Self::Buffer,
        index: Self::Buffer,
    );

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Compiles `source` into `shader`, returning the compile status.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Links `program`, returning the link status.
    fn link_program(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32);
    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_4_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, transpose: bool, value: &[f32; 16]);

    /// Creates an RGBA8 2D texture from tightly packed pixels.
    fn create_texture_2d(
        &self,
        width: u32,
        height: u32,
        rgba: &[u8],
        options: &TextureOptions,
    ) -> Result<Self::Texture, String>;
    fn bind_texture(&self, texture: Self::Texture, unit: u32);
    fn delete_texture(&self, texture: Self::Texture);

    /// Draws `count` indices from the currently bound vertex array.
    fn draw_elements(&self, mode: PrimitiveMode, count: usize, index_type: IndexType);
}

/// An OpenGL device backed by a [`glow::Context`].
///
/// Dereferences to the context so callers can still issue raw calls
/// (clearing, viewport, state toggles) that this crate does not wrap.
pub struct GlDevice {
    gl: glow::Context,
}

impl GlDevice {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Loads the OpenGL function pointers through `loader`.
    ///
    /// # Safety
    ///
    /// A context must be current on this thread and `loader` must return valid
    /// function pointers for it.
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        Self::new(unsafe { glow::Context::from_loader_function(loader) })
    }
}

impl From<glow::Context> for GlDevice {
    fn from(gl: glow::Context) -> Self {
        Self::new(gl)
    }
}

impl Deref for GlDevice {
    type Target = glow::Context;

    fn deref(&self) -> &glow::Context {
        &self.gl
    }
}

impl Device for GlDevice {
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn create_buffer(&self, size: usize, contents: Option<&[u8]>) -> Result<glow::Buffer, String> {
        let size = i32::try_from(size).map_err(|_| format!("buffer size {size} does not fit in a GLsizeiptr"))?;
        unsafe {
            let buffer = self.gl.create_buffer()?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            match contents {
                Some(data) => self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW),
                None => self.gl.buffer_data_size(glow::ARRAY_BUFFER, size, glow::STATIC_DRAW),
            }
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            Ok(buffer)
        }
    }

    fn write_buffer(&self, buffer: glow::Buffer, offset: usize, data: &[u8]) {
        // Callers keep writes inside a buffer created through `create_buffer`,
        // whose size already fit in an i32.
        let offset = offset as i32;
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, offset, data);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn delete_buffer(&self, buffer: glow::Buffer) {
        unsafe {
            self.gl.delete_buffer(buffer);
        }
    }

    fn create_vertex_array(&self) -> Result<glow::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn delete_vertex_array(&self, vertex_array: glow::VertexArray) {
        unsafe {
            self.gl.delete_vertex_array(vertex_array);
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<glow::VertexArray>) {
        unsafe {
            self.gl.bind_vertex_array(vertex_array);
        }
    }

    fn set_vertex_attribute(&self, vertex_array: glow::VertexArray, attribute: &VertexAttribute, binding: u32) {
        let index = attribute.attribute_index;
        let size = attribute.component_count as i32;
        let data_type = attribute.scalar_type.gl_enum();
        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array));
            if attribute.is_integer() {
                self.gl
                    .vertex_attrib_format_i32(index, size, data_type, attribute.byte_offset);
            } else {
                self.gl.vertex_attrib_format_f32(
                    index,
                    size,
                    data_type,
                    attribute.normalized,
                    attribute.byte_offset,
                );
            }
            self.gl.enable_vertex_attrib_array(index);
            self.gl.vertex_attrib_binding(index, binding);
            self.gl.bind_vertex_array(None);
        }
    }

    fn disable_vertex_attribute(&self, vertex_array: glow::VertexArray, index: u32) {
        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array));
            self.gl.disable_vertex_attrib_array(index);
            self.gl.bind_vertex_array(None);
        }
    }

    fn set_vertex_buffers(
        &self,
        vertex_array: glow::VertexArray,
        binding: u32,
        stride: u32,
        vertex: glow::Buffer,
        index: glow::Buffer,
    ) {
        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array));
            self.gl
                .bind_vertex_buffer(binding, Some(vertex), 0, stride as i32);
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index));
            // Recorded in the vertex array, so it must stay bound until here.
            self.gl.bind_vertex_array(None);
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<glow::Shader, String> {
        unsafe { self.gl.create_shader(stage.gl_enum()) }
    }

    fn compile_shader(&self, shader: glow::Shader, source: &str) -> bool {
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            self.gl.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: glow::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: glow::Shader) {
        unsafe {
            self.gl.delete_shader(shader);
        }
    }

    fn create_program(&self) -> Result<glow::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe {
            self.gl.attach_shader(program, shader);
        }
    }

    fn detach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe {
            self.gl.detach_shader(program, shader);
        }
    }

    fn link_program(&self, program: glow::Program) -> bool {
        unsafe {
            self.gl.link_program(program);
            self.gl.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: glow::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: glow::Program) {
        unsafe {
            self.gl.delete_program(program);
        }
    }

    fn use_program(&self, program: Option<glow::Program>) {
        unsafe {
            self.gl.use_program(program);
        }
    }

    fn uniform_location(&self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn uniform_1_i32(&self, location: &glow::UniformLocation, x: i32) {
        unsafe {
            self.gl.uniform_1_i32(Some(location), x);
        }
    }

    fn uniform_1_f32(&self, location: &glow::UniformLocation, x: f32) {
        unsafe {
            self.gl.uniform_1_f32(Some(location), x);
        }
    }

    fn uniform_2_f32(&self, location: &glow::UniformLocation, x: f32, y: f32) {
        unsafe {
            self.gl.uniform_2_f32(Some(location), x, y);
        }
    }

    fn uniform_3_f32(&self, location: &glow::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe {
            self.gl.uniform_3_f32(Some(location), x, y, z);
        }
    }

    fn uniform_4_f32(&self, location: &glow::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        unsafe {
            self.gl.uniform_4_f32(Some(location), x, y, z, w);
        }
    }

    fn uniform_matrix_4_f32(&self, location: &glow::UniformLocation, transpose: bool, value: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), transpose, value);
        }
    }

    fn create_texture_2d(
        &self,
        width: u32,
        height: u32,
        rgba: &[u8],
        options: &TextureOptions,
    ) -> Result<glow::Texture, String> {
        let min_filter = match (options.min_filter, options.mipmaps) {
            (TextureFilter::Nearest, false) => glow::NEAREST,
            (TextureFilter::Linear, false) => glow::LINEAR,
            (TextureFilter::Nearest, true) => glow::NEAREST_MIPMAP_NEAREST,
            (TextureFilter::Linear, true) => glow::LINEAR_MIPMAP_LINEAR,
        };
        let mag_filter = match options.mag_filter {
            TextureFilter::Nearest => glow::NEAREST,
            TextureFilter::Linear => glow::LINEAR,
        };

        unsafe {
            let texture = self.gl.create_texture()?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(rgba)),
            );
            if options.mipmaps {
                self.gl.generate_mipmap(glow::TEXTURE_2D);
            }
            let wrap = options.wrap.gl_enum() as i32;
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min_filter as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag_filter as i32);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(texture)
        }
    }

    fn bind_texture(&self, texture: glow::Texture, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
    }

    fn delete_texture(&self, texture: glow::Texture) {
        unsafe {
            self.gl.delete_texture(texture);
        }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: usize, index_type: IndexType) {
        unsafe {
            self.gl
                .draw_elements(mode.gl_enum(), count as i32, index_type.gl_enum(), 0);
        }
    }
}
