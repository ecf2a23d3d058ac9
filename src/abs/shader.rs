//! Shaders
//!
//! This module defines [`ShaderSource`], which splits a single tagged text file
//! into per-stage sources, and the [`Shader`] and [`ShaderProgram`] structs for
//! managing compiled stages and linked programs. The [`Uniform`] trait covers the
//! values that can be pushed into a program.
//!
//! A source file looks like this:
//!
//! ```text
//! #shader vertex
//! #version 430 core
//! void main() { ... }
//! #shader fragment
//! #version 430 core
//! void main() { ... }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use fxhash::FxHashMap;

use super::{Device, GlDevice};
use crate::error::{Error, Result};
use crate::math::{Matrix4, Vector2, Vector3, Vector4};

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex = glow::VERTEX_SHADER as isize,
    Fragment = glow::FRAGMENT_SHADER as isize,
}

impl ShaderStage {
    /// The line prefix that starts this stage's section in a source file.
    pub const fn directive(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "#shader vertex",
            ShaderStage::Fragment => "#shader fragment",
        }
    }

    pub const fn gl_enum(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Vertex and fragment source text split out of one tagged file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Splits `text` into stages.
    ///
    /// A line starting with `#shader vertex` or `#shader fragment` switches the
    /// section that following lines are appended to. Lines keep their line
    /// endings. Any line before the first directive is an [`Error::Parse`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut source = ShaderSource::default();
        let mut active: Option<ShaderStage> = None;

        for (number, line) in text.split_inclusive('\n').enumerate() {
            if line.starts_with(ShaderStage::Vertex.directive()) {
                active = Some(ShaderStage::Vertex);
            } else if line.starts_with(ShaderStage::Fragment.directive()) {
                active = Some(ShaderStage::Fragment);
            } else {
                let Some(stage) = active else {
                    return Err(Error::Parse { line: number + 1 });
                };
                source.stage_mut(stage).push_str(line);
            }
        }

        Ok(source)
    }

    /// Reads and splits a shader file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The accumulated text for `stage`.
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }
}

impl FromStr for ShaderSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Represents an individual compiled shader stage.
pub struct Shader<D: Device = GlDevice> {
    device: Arc<D>,
    id: D::Shader,
    stage: ShaderStage,
}

impl<D: Device> Shader<D> {
    /// Compiles a new shader stage from the given source code.
    ///
    /// On failure the stage handle is released before the error is returned.
    pub fn new(device: &Arc<D>, stage: ShaderStage, source: &str) -> Result<Self> {
        let id = device.create_shader(stage).map_err(Error::Device)?;
        if !device.compile_shader(id, source) {
            let diagnostic = device.shader_info_log(id);
            device.delete_shader(id);
            return Err(Error::Compile { stage, diagnostic });
        }

        Ok(Self {
            device: Arc::clone(device),
            id,
            stage,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<D: Device> Drop for Shader<D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.id);
    }
}

/// Represents a value that can be assigned to a uniform variable.
pub trait Uniform {
    /// Uploads the value to `location` of the currently used program.
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation);
}

impl Uniform for bool {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_1_i32(location, *self as i32);
    }
}

impl Uniform for i32 {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_1_i32(location, *self);
    }
}

impl Uniform for f32 {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_1_f32(location, *self);
    }
}

impl Uniform for Vector2 {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_2_f32(location, self.x, self.y);
    }
}

impl Uniform for Vector3 {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_3_f32(location, self.x, self.y, self.z);
    }
}

impl Uniform for Vector4 {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_4_f32(location, self.x, self.y, self.z, self.w);
    }
}

impl Uniform for Matrix4 {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        // Row-major storage, the shader expects column-major.
        device.uniform_matrix_4_f32(location, true, &self.elements);
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform<D: Device>(&self, device: &D, location: &D::UniformLocation) {
        (*self).set_uniform(device, location);
    }
}

/// Represents a linked shader program.
///
/// Uniform locations are resolved lazily and cached per program, including
/// misses, so every name hits the device at most once.
pub struct ShaderProgram<D: Device = GlDevice> {
    device: Arc<D>,
    id: D::Program,
    uniforms: RefCell<FxHashMap<String, Option<D::UniformLocation>>>,
}

impl<D: Device> ShaderProgram<D> {
    /// Compiles both stages of `source` and links them.
    ///
    /// Stage handles are released once the program is linked, and every handle
    /// created so far is released if any step fails.
    pub fn new(device: &Arc<D>, source: &ShaderSource) -> Result<Self> {
        let vertex = Shader::new(device, ShaderStage::Vertex, &source.vertex)?;
        let fragment = Shader::new(device, ShaderStage::Fragment, &source.fragment)?;
        Self::link(device, &[&vertex, &fragment])
    }

    /// Reads, splits, compiles and links a tagged shader file.
    pub fn from_file(device: &Arc<D>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = ShaderSource::from_file(path)?;
        let program = Self::new(device, &source)?;
        log::debug!("Loaded shader program from {}", path.display());
        Ok(program)
    }

    /// Links a new shader program from already compiled stages.
    pub fn link(device: &Arc<D>, shaders: &[&Shader<D>]) -> Result<Self> {
        let program = device.create_program().map_err(Error::Device)?;

        for shader in shaders {
            device.attach_shader(program, shader.id);
        }

        if !device.link_program(program) {
            let diagnostic = device.program_info_log(program);
            device.delete_program(program);
            return Err(Error::Link { diagnostic });
        }

        for shader in shaders {
            device.detach_shader(program, shader.id);
        }

        Ok(Self {
            device: Arc::clone(device),
            id: program,
            uniforms: RefCell::new(FxHashMap::default()),
        })
    }

    /// Replaces the program with one built from `source`.
    ///
    /// On success the old program is released and all cached uniform locations
    /// are dropped. On failure the current program is left untouched.
    pub fn recompile(&mut self, source: &ShaderSource) -> Result<()> {
        let mut replacement = Self::new(&self.device, source)?;
        std::mem::swap(&mut self.id, &mut replacement.id);
        // Now holds the old handle.
        drop(replacement);
        self.uniforms.get_mut().clear();
        Ok(())
    }

    /// Binds the shader program for use.
    pub fn bind(&self) {
        self.device.use_program(Some(self.id));
    }

    pub fn handle(&self) -> D::Program {
        self.id
    }

    /// Resolves the location of `name`, consulting the cache first.
    pub fn uniform_location(&self, name: &str) -> Option<D::UniformLocation> {
        if let Some(cached) = self.uniforms.borrow().get(name) {
            return cached.clone();
        }

        let location = self.device.uniform_location(self.id, name);
        if location.is_none() {
            log::debug!("Uniform '{name}' not found in program {:?}", self.id);
        }
        self.uniforms
            .borrow_mut()
            .insert(name.to_owned(), location.clone());
        location
    }

    /// Number of names currently held in the location cache.
    pub fn cached_uniforms(&self) -> usize {
        self.uniforms.borrow().len()
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// The program must be bound. Names the program does not declare are
    /// ignored.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.uniform_location(name) {
            value.set_uniform(&*self.device, &location);
        }
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, value);
    }

    pub fn set_vec2(&self, name: &str, value: Vector2) {
        self.set_uniform(name, value);
    }

    pub fn set_vec3(&self, name: &str, value: Vector3) {
        self.set_uniform(name, value);
    }

    pub fn set_vec4(&self, name: &str, value: Vector4) {
        self.set_uniform(name, value);
    }

    pub fn set_mat4(&self, name: &str, value: &Matrix4) {
        self.set_uniform(name, value);
    }
}

impl<D: Device> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.device.delete_program(self.id);
    }
}
