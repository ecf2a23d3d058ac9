//! An in-memory [`Device`] that records what it is asked to do.
//!
//! Compilation fails for any stage containing a `#error` line and linking fails
//! when an attached stage has no `main(`. `uniform <type> <name>;` declarations
//! of the attached stages become the program's active uniforms.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::{Device, IndexType, PrimitiveMode, ShaderStage, TextureOptions, VertexAttribute};

#[derive(Debug, Clone, PartialEq)]
pub enum UniformCall {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4 { transpose: bool, data: [f32; 16] },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub vertex_array: u32,
    pub mode: PrimitiveMode,
    pub count: usize,
    pub index_type: IndexType,
}

/// Which attribute format call a real device would make for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Float,
    Integer,
}

#[derive(Debug, Clone, Default)]
pub struct MockVertexArray {
    /// Enabled attributes by index, with the binding slot they read from.
    pub attributes: BTreeMap<u32, (VertexAttribute, u32)>,
    pub formats: BTreeMap<u32, AttributeFormat>,
    /// Vertex buffer and stride.
    pub vertex_buffer: Option<(u32, u32)>,
    pub index_buffer: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub options: TextureOptions,
}

#[derive(Debug)]
struct MockShader {
    source: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashMap<u32, MockVertexArray>,
    bound_vertex_array: Option<u32>,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    current_program: Option<u32>,
    textures: HashMap<u32, MockTexture>,
    texture_units: HashMap<u32, u32>,
    uniform_queries: usize,
    uniform_calls: Vec<(u32, UniformCall)>,
    draws: Vec<Draw>,
}

impl State {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MockDevice {
    state: Mutex<State>,
}

impl MockDevice {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn live_buffers(&self) -> usize {
        self.state().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state().vertex_arrays.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state().programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state().textures.len()
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state().buffers.get(&buffer).cloned()
    }

    pub fn vertex_array(&self, vertex_array: u32) -> Option<MockVertexArray> {
        self.state().vertex_arrays.get(&vertex_array).cloned()
    }

    pub fn texture(&self, texture: u32) -> Option<MockTexture> {
        self.state().textures.get(&texture).cloned()
    }

    pub fn texture_unit(&self, unit: u32) -> Option<u32> {
        self.state().texture_units.get(&unit).copied()
    }

    pub fn attached_shaders(&self, program: u32) -> Vec<u32> {
        self.state()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state().current_program
    }

    /// Number of times a uniform location was looked up.
    pub fn uniform_queries(&self) -> usize {
        self.state().uniform_queries
    }

    pub fn uniform_calls(&self) -> Vec<(u32, UniformCall)> {
        self.state().uniform_calls.clone()
    }

    pub fn draws(&self) -> Vec<Draw> {
        self.state().draws.clone()
    }

    fn record_uniform(&self, location: &u32, call: UniformCall) {
        self.state().uniform_calls.push((*location, call));
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let declaration = line.trim().strip_prefix("uniform ")?.trim_end_matches(';');
        let name = declaration.split_whitespace().last()?;
        Some(name.split('[').next().unwrap_or(name).to_string())
    })
}

impl Device for MockDevice {
    type Buffer = u32;
    type VertexArray = u32;
    type Shader = u32;
    type Program = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn create_buffer(&self, size: usize, contents: Option<&[u8]>) -> Result<u32, String> {
        let mut state = self.state();
        let id = state.allocate();
        let data = contents.map(<[u8]>::to_vec).unwrap_or_else(|| vec![0xCD; size]);
        state.buffers.insert(id, data);
        Ok(id)
    }

    fn write_buffer(&self, buffer: u32, offset: usize, data: &[u8]) {
        if let Some(contents) = self.state().buffers.get_mut(&buffer) {
            contents[offset..offset + data.len()].copy_from_slice(data);
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        assert!(self.state().buffers.remove(&buffer).is_some(), "double free of buffer {buffer}");
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state();
        let id = state.allocate();
        state.vertex_arrays.insert(id, MockVertexArray::default());
        Ok(id)
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        assert!(
            self.state().vertex_arrays.remove(&vertex_array).is_some(),
            "double free of vertex array {vertex_array}"
        );
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state().bound_vertex_array = vertex_array;
    }

    fn set_vertex_attribute(&self, vertex_array: u32, attribute: &VertexAttribute, binding: u32) {
        if let Some(vao) = self.state().vertex_arrays.get_mut(&vertex_array) {
            vao.attributes
                .insert(attribute.attribute_index, (*attribute, binding));
            let format = if attribute.is_integer() {
                AttributeFormat::Integer
            } else {
                AttributeFormat::Float
            };
            vao.formats.insert(attribute.attribute_index, format);
        }
    }

    fn disable_vertex_attribute(&self, vertex_array: u32, index: u32) {
        if let Some(vao) = self.state().vertex_arrays.get_mut(&vertex_array) {
            vao.attributes.remove(&index);
            vao.formats.remove(&index);
        }
    }

    fn set_vertex_buffers(&self, vertex_array: u32, _binding: u32, stride: u32, vertex: u32, index: u32) {
        if let Some(vao) = self.state().vertex_arrays.get_mut(&vertex_array) {
            vao.vertex_buffer = Some((vertex, stride));
            vao.index_buffer = Some(index);
        }
    }

    fn create_shader(&self, _stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state();
        let id = state.allocate();
        state.shaders.insert(id, MockShader { source: String::new() });
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> bool {
        if let Some(entry) = self.state().shaders.get_mut(&shader) {
            entry.source = source.to_string();
        }
        !source.lines().any(|line| line.trim_start().starts_with("#error"))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let state = self.state();
        let Some(entry) = state.shaders.get(&shader) else {
            return String::new();
        };
        entry
            .source
            .lines()
            .enumerate()
            .filter(|(_, line)| line.trim_start().starts_with("#error"))
            .map(|(number, line)| format!("0:{}: error: {}\n", number + 1, line.trim()))
            .collect()
    }

    fn delete_shader(&self, shader: u32) {
        assert!(self.state().shaders.remove(&shader).is_some(), "double free of shader {shader}");
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state();
        let id = state.allocate();
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(entry) = self.state().programs.get_mut(&program) {
            entry.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(entry) = self.state().programs.get_mut(&program) {
            entry.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: u32) -> bool {
        let mut state = self.state();
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return false;
        };
        let sources: Vec<String> = attached
            .iter()
            .filter_map(|s| state.shaders.get(s).map(|s| s.source.clone()))
            .collect();
        if sources.is_empty() || sources.iter().any(|s| !s.contains("main(")) {
            return false;
        }

        let mut uniforms: Vec<String> = sources.iter().flat_map(|s| declared_uniforms(s)).collect();
        uniforms.dedup();
        if let Some(entry) = state.programs.get_mut(&program) {
            entry.uniforms = uniforms;
        }
        true
    }

    fn program_info_log(&self, _program: u32) -> String {
        "error: missing entry point main()".to_string()
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state();
        assert!(state.programs.remove(&program).is_some(), "double free of program {program}");
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.state().current_program = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let mut state = self.state();
        state.uniform_queries += 1;
        let position = state.programs.get(&program)?.uniforms.iter().position(|u| u == name)?;
        Some(position as u32)
    }

    fn uniform_1_i32(&self, location: &u32, x: i32) {
        self.record_uniform(location, UniformCall::Int(x));
    }

    fn uniform_1_f32(&self, location: &u32, x: f32) {
        self.record_uniform(location, UniformCall::Float(x));
    }

    fn uniform_2_f32(&self, location: &u32, x: f32, y: f32) {
        self.record_uniform(location, UniformCall::Vec2([x, y]));
    }

    fn uniform_3_f32(&self, location: &u32, x: f32, y: f32, z: f32) {
        self.record_uniform(location, UniformCall::Vec3([x, y, z]));
    }

    fn uniform_4_f32(&self, location: &u32, x: f32, y: f32, z: f32, w: f32) {
        self.record_uniform(location, UniformCall::Vec4([x, y, z, w]));
    }

    fn uniform_matrix_4_f32(&self, location: &u32, transpose: bool, value: &[f32; 16]) {
        self.record_uniform(
            location,
            UniformCall::Mat4 {
                transpose,
                data: *value,
            },
        );
    }

    fn create_texture_2d(
        &self,
        width: u32,
        height: u32,
        rgba: &[u8],
        options: &TextureOptions,
    ) -> Result<u32, String> {
        let mut state = self.state();
        let id = state.allocate();
        state.textures.insert(
            id,
            MockTexture {
                width,
                height,
                pixels: rgba.to_vec(),
                options: *options,
            },
        );
        Ok(id)
    }

    fn bind_texture(&self, texture: u32, unit: u32) {
        self.state().texture_units.insert(unit, texture);
    }

    fn delete_texture(&self, texture: u32) {
        assert!(self.state().textures.remove(&texture).is_some(), "double free of texture {texture}");
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: usize, index_type: IndexType) {
        let mut state = self.state();
        let vertex_array = state
            .bound_vertex_array
            .expect("draw issued without a bound vertex array");
        state.draws.push(Draw {
            vertex_array,
            mode,
            count,
            index_type,
        });
    }
}
