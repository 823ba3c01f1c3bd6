//! In-memory graphics backend.
//!
//! `HeadlessBackend` simulates the subset of OpenGL state the resource layer
//! touches: object names, buffer contents, vertex array capture, compile/link
//! status, active uniforms and texture units. It performs no rasterization.
//!
//! Binding rules follow the native API: attribute pointers capture the array
//! buffer bound at the time of the call, and the element buffer binding is
//! part of the bound vertex array's state. Misuse (double deletes, draws without
//! an element buffer, uniform writes to the wrong program) is recorded as a
//! violation rather than panicking, so tests can assert on it.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use crate::error::{Error, Result};

use super::backend::Backend;
use super::types::{
    AttributeKind, BufferTarget, BufferUsage, Capability, ClearMask, GlHandle, IndexType, PrimitiveMode,
    Sampling, ShaderStage, UniformLocation, UniformValue, VertexAttribute,
};

/// Source marker that makes the simulated compiler reject a shader.
const COMPILE_ERROR_MARKER: &str = "#error";

// ── recorded objects ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct BufferObject {
    data: Vec<u8>,
    usage: BufferUsage,
}

#[derive(Debug, Clone, Default)]
struct VertexArrayObject {
    attributes: Vec<CapturedAttribute>,
    enabled: BTreeSet<u32>,
    element_buffer: Option<GlHandle>,
}

#[derive(Debug, Clone)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Clone, Default)]
struct ProgramObject {
    attached: Vec<GlHandle>,
    linked: bool,
    log: String,
    active_uniforms: HashSet<String>,
}

#[derive(Debug, Clone)]
struct TextureObject {
    width: u32,
    height: u32,
    sampling: Sampling,
    mipmapped: bool,
}

/// Attribute descriptor together with the array buffer it was captured from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CapturedAttribute {
    pub attribute: VertexAttribute,
    pub buffer: Option<GlHandle>,
}

/// Snapshot of a vertex array object.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexArraySnapshot {
    pub attributes: Vec<CapturedAttribute>,
    pub enabled: Vec<u32>,
    pub element_buffer: Option<GlHandle>,
}

/// Snapshot of a 2D texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureSnapshot {
    pub width: u32,
    pub height: u32,
    pub sampling: Sampling,
    pub mipmapped: bool,
}

/// One recorded indexed draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mode: PrimitiveMode,
    pub count: usize,
    pub index_type: IndexType,
    pub vertex_array: Option<GlHandle>,
    pub element_buffer: Option<GlHandle>,
    pub program: Option<GlHandle>,
    /// Texture bound per unit at the time of the draw.
    pub textures: BTreeMap<u32, GlHandle>,
}

/// One recorded uniform write.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    pub program: GlHandle,
    pub name: String,
    pub value: UniformValue,
}

// ── state ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct State {
    last_name: u32,

    buffers: HashMap<GlHandle, BufferObject>,
    vertex_arrays: HashMap<GlHandle, VertexArrayObject>,
    shaders: HashMap<GlHandle, ShaderObject>,
    programs: HashMap<GlHandle, ProgramObject>,
    textures: HashMap<GlHandle, TextureObject>,

    array_buffer: Option<GlHandle>,
    // Element binding used while no vertex array is bound.
    loose_element_buffer: Option<GlHandle>,
    vertex_array: Option<GlHandle>,
    program: Option<GlHandle>,
    active_unit: u32,
    units: BTreeMap<u32, GlHandle>,

    locations: Vec<(GlHandle, String)>,
    location_queries: usize,

    draws: Vec<DrawCall>,
    uniform_writes: Vec<UniformWrite>,
    violations: Vec<String>,

    capabilities: HashSet<Capability>,
    clear_color: [f32; 4],
    clears: usize,
    viewport: (i32, i32, i32, i32),
}

impl State {
    fn next_handle(&mut self) -> Result<GlHandle> {
        self.last_name = self
            .last_name
            .checked_add(1)
            .ok_or_else(|| Error::Backend("object names exhausted".to_string()))?;
        GlHandle::new(self.last_name)
            .ok_or_else(|| Error::Backend("driver returned a null name".to_string()))
    }

    fn violation(&mut self, message: String) {
        log::warn!("headless: {message}");
        self.violations.push(message);
    }

    fn element_buffer(&self) -> Option<GlHandle> {
        match self.vertex_array {
            Some(vao) => self.vertex_arrays.get(&vao).and_then(|v| v.element_buffer),
            None => self.loose_element_buffer,
        }
    }

    fn bound(&self, target: BufferTarget) -> Option<GlHandle> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_buffer(),
        }
    }
}

// ── backend ───────────────────────────────────────────────────────────────

/// Graphics backend that records everything and renders nothing.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<State>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an inspection handle sharing this backend's state.
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_buffer(&self) -> Result<GlHandle> {
        let mut s = self.state.borrow_mut();
        let handle = s.next_handle()?;
        s.buffers.insert(
            handle,
            BufferObject {
                data: Vec::new(),
                usage: BufferUsage::StaticDraw,
            },
        );
        Ok(handle)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<GlHandle>) {
        let mut s = self.state.borrow_mut();
        if let Some(h) = buffer {
            if !s.buffers.contains_key(&h) {
                s.violation(format!("bind of unknown buffer {h}"));
                return;
            }
        }
        match target {
            BufferTarget::Array => s.array_buffer = buffer,
            BufferTarget::ElementArray => match s.vertex_array {
                Some(vao) => {
                    if let Some(v) = s.vertex_arrays.get_mut(&vao) {
                        v.element_buffer = buffer;
                    }
                }
                None => s.loose_element_buffer = buffer,
            },
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let mut s = self.state.borrow_mut();
        let Some(h) = s.bound(target) else {
            s.violation(format!("buffer data with nothing bound at {target:?}"));
            return;
        };
        if let Some(b) = s.buffers.get_mut(&h) {
            b.data = data.to_vec();
            b.usage = usage;
        }
    }

    fn delete_buffer(&self, buffer: GlHandle) {
        let mut s = self.state.borrow_mut();
        if s.buffers.remove(&buffer).is_none() {
            s.violation(format!("double delete of buffer {buffer}"));
            return;
        }
        if s.array_buffer == Some(buffer) {
            s.array_buffer = None;
        }
        if s.loose_element_buffer == Some(buffer) {
            s.loose_element_buffer = None;
        }
    }

    fn create_vertex_array(&self) -> Result<GlHandle> {
        let mut s = self.state.borrow_mut();
        let handle = s.next_handle()?;
        s.vertex_arrays.insert(handle, VertexArrayObject::default());
        Ok(handle)
    }

    fn bind_vertex_array(&self, vao: Option<GlHandle>) {
        let mut s = self.state.borrow_mut();
        if let Some(h) = vao {
            if !s.vertex_arrays.contains_key(&h) {
                s.violation(format!("bind of unknown vertex array {h}"));
                return;
            }
        }
        s.vertex_array = vao;
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        let mut s = self.state.borrow_mut();
        let Some(vao) = s.vertex_array else {
            s.violation(format!("attribute {} set with no vertex array bound", attribute.index));
            return;
        };
        let buffer = s.array_buffer;
        if buffer.is_none() {
            s.violation(format!("attribute {} set with no array buffer bound", attribute.index));
        }
        if attribute.integer && (attribute.kind == AttributeKind::Float || attribute.normalized) {
            s.violation(format!(
                "attribute {} is integer-consumed but {:?} (normalized: {})",
                attribute.index, attribute.kind, attribute.normalized
            ));
        }
        if let Some(v) = s.vertex_arrays.get_mut(&vao) {
            v.attributes.retain(|c| c.attribute.index != attribute.index);
            v.attributes.push(CapturedAttribute {
                attribute: *attribute,
                buffer,
            });
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut s = self.state.borrow_mut();
        let Some(vao) = s.vertex_array else {
            s.violation(format!("attribute {index} enabled with no vertex array bound"));
            return;
        };
        if let Some(v) = s.vertex_arrays.get_mut(&vao) {
            v.enabled.insert(index);
        }
    }

    fn delete_vertex_array(&self, vao: GlHandle) {
        let mut s = self.state.borrow_mut();
        if s.vertex_arrays.remove(&vao).is_none() {
            s.violation(format!("double delete of vertex array {vao}"));
            return;
        }
        if s.vertex_array == Some(vao) {
            s.vertex_array = None;
        }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: usize, index_type: IndexType) {
        let mut s = self.state.borrow_mut();
        let element_buffer = s.element_buffer();
        match (s.vertex_array, element_buffer) {
            (None, _) => s.violation("draw with no vertex array bound".to_string()),
            (Some(vao), None) => s.violation(format!("draw from vertex array {vao} without element buffer")),
            (Some(_), Some(ebo)) => {
                let available = s.buffers.get(&ebo).map_or(0, |b| b.data.len());
                let needed = count * index_type.size_in_bytes();
                if needed > available {
                    s.violation(format!(
                        "draw reads {needed} index bytes but element buffer {ebo} holds {available}"
                    ));
                }
            }
        }
        let call = DrawCall {
            mode,
            count,
            index_type,
            vertex_array: s.vertex_array,
            element_buffer,
            program: s.program,
            textures: s.units.clone(),
        };
        s.draws.push(call);
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<GlHandle> {
        let mut s = self.state.borrow_mut();
        let handle = s.next_handle()?;
        s.shaders.insert(
            handle,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(handle)
    }

    fn shader_source(&self, shader: GlHandle, source: &str) {
        let mut s = self.state.borrow_mut();
        if let Some(sh) = s.shaders.get_mut(&shader) {
            sh.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: GlHandle) {
        let mut s = self.state.borrow_mut();
        let Some(sh) = s.shaders.get_mut(&shader) else {
            s.violation(format!("compile of unknown shader {shader}"));
            return;
        };
        let active = preprocess(&sh.source);
        let failing = active
            .lines()
            .enumerate()
            .find(|(_, line)| line.trim_start().starts_with(COMPILE_ERROR_MARKER));

        match failing {
            Some((line, text)) => {
                let message = text.trim_start()[COMPILE_ERROR_MARKER.len()..].trim();
                sh.compiled = false;
                sh.log = format!("0:{}: error: {message}", line + 1);
            }
            None => {
                sh.compiled = true;
                sh.log.clear();
            }
        }
    }

    fn shader_compile_status(&self, shader: GlHandle) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: GlHandle) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: GlHandle) {
        let mut s = self.state.borrow_mut();
        if s.shaders.remove(&shader).is_none() {
            s.violation(format!("double delete of shader {shader}"));
        }
    }

    fn create_program(&self) -> Result<GlHandle> {
        let mut s = self.state.borrow_mut();
        let handle = s.next_handle()?;
        s.programs.insert(handle, ProgramObject::default());
        Ok(handle)
    }

    fn attach_shader(&self, program: GlHandle, shader: GlHandle) {
        let mut s = self.state.borrow_mut();
        if !s.shaders.contains_key(&shader) {
            s.violation(format!("attach of unknown shader {shader}"));
            return;
        }
        match s.programs.get_mut(&program) {
            Some(p) => p.attached.push(shader),
            None => s.violation(format!("attach to unknown program {program}")),
        }
    }

    fn link_program(&self, program: GlHandle) {
        let mut s = self.state.borrow_mut();
        let Some(p) = s.programs.get(&program) else {
            s.violation(format!("link of unknown program {program}"));
            return;
        };

        let mut stages = BTreeSet::new();
        let mut failures = Vec::new();
        let mut uniforms = HashSet::new();
        for handle in &p.attached {
            match s.shaders.get(handle) {
                Some(sh) if sh.compiled => {
                    stages.insert(sh.stage);
                    uniforms.extend(reflect_uniforms(&preprocess(&sh.source)));
                }
                Some(sh) => failures.push(format!("error: {} shader {handle} is not compiled", sh.stage)),
                None => failures.push(format!("error: shader {handle} was deleted")),
            }
        }
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !stages.contains(&stage) {
                failures.push(format!("error: program has no {stage} shader"));
            }
        }

        if let Some(p) = s.programs.get_mut(&program) {
            p.linked = failures.is_empty();
            p.log = failures.join("\n");
            p.active_uniforms = if p.linked { uniforms } else { HashSet::new() };
        }
    }

    fn program_link_status(&self, program: GlHandle) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: GlHandle) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<GlHandle>) {
        let mut s = self.state.borrow_mut();
        if let Some(h) = program {
            if !s.programs.get(&h).is_some_and(|p| p.linked) {
                s.violation(format!("use of unlinked program {h}"));
                return;
            }
        }
        s.program = program;
    }

    fn uniform_location(&self, program: GlHandle, name: &str) -> Option<UniformLocation> {
        let mut s = self.state.borrow_mut();
        s.location_queries += 1;

        let active = s
            .programs
            .get(&program)
            .is_some_and(|p| p.linked && p.active_uniforms.contains(name));
        if !active {
            return None;
        }

        let existing = s
            .locations
            .iter()
            .position(|(p, n)| *p == program && n == name);
        let index = match existing {
            Some(i) => i,
            None => {
                s.locations.push((program, name.to_string()));
                s.locations.len() - 1
            }
        };
        Some(UniformLocation(index as u32))
    }

    fn uniform(&self, location: UniformLocation, value: UniformValue) {
        let mut s = self.state.borrow_mut();
        let Some((owner, name)) = s.locations.get(location.0 as usize).cloned() else {
            s.violation(format!("uniform write to unknown location {}", location.0));
            return;
        };
        let current = s.program;
        if current != Some(owner) {
            s.violation(format!(
                "uniform `{name}` of program {owner} written while {current:?} is in use"
            ));
            return;
        }
        s.uniform_writes.push(UniformWrite {
            program: owner,
            name,
            value,
        });
    }

    fn delete_program(&self, program: GlHandle) {
        let mut s = self.state.borrow_mut();
        if s.programs.remove(&program).is_none() {
            s.violation(format!("double delete of program {program}"));
            return;
        }
        if s.program == Some(program) {
            s.program = None;
        }
    }

    fn create_texture(&self) -> Result<GlHandle> {
        let mut s = self.state.borrow_mut();
        let handle = s.next_handle()?;
        s.textures.insert(
            handle,
            TextureObject {
                width: 0,
                height: 0,
                sampling: Sampling::default(),
                mipmapped: false,
            },
        );
        Ok(handle)
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture_2d(&self, texture: Option<GlHandle>) {
        let mut s = self.state.borrow_mut();
        let unit = s.active_unit;
        match texture {
            Some(h) if !s.textures.contains_key(&h) => {
                s.violation(format!("bind of unknown texture {h}"));
            }
            Some(h) => {
                s.units.insert(unit, h);
            }
            None => {
                s.units.remove(&unit);
            }
        }
    }

    fn texture_binding_2d(&self) -> Option<GlHandle> {
        let s = self.state.borrow();
        s.units.get(&s.active_unit).copied()
    }

    fn texture_sampling_2d(&self, sampling: Sampling) {
        let mut s = self.state.borrow_mut();
        let unit = s.active_unit;
        let Some(h) = s.units.get(&unit).copied() else {
            s.violation(format!("sampling set with no texture bound at unit {unit}"));
            return;
        };
        if let Some(t) = s.textures.get_mut(&h) {
            t.sampling = sampling;
        }
    }

    fn texture_image_2d_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut s = self.state.borrow_mut();
        let unit = s.active_unit;
        let Some(h) = s.units.get(&unit).copied() else {
            s.violation(format!("image upload with no texture bound at unit {unit}"));
            return;
        };
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            s.violation(format!(
                "texture {h} upload of {} bytes for {width}x{height} RGBA8 (expected {expected})",
                pixels.len()
            ));
        }
        if let Some(t) = s.textures.get_mut(&h) {
            t.width = width;
            t.height = height;
            t.mipmapped = false;
        }
    }

    fn generate_mipmap_2d(&self) {
        let mut s = self.state.borrow_mut();
        let unit = s.active_unit;
        let bound = s.units.get(&unit).copied();
        if let Some(t) = bound.and_then(|h| s.textures.get_mut(&h)) {
            t.mipmapped = true;
        }
    }

    fn delete_texture(&self, texture: GlHandle) {
        let mut s = self.state.borrow_mut();
        if s.textures.remove(&texture).is_none() {
            s.violation(format!("double delete of texture {texture}"));
            return;
        }
        s.units.retain(|_, h| *h != texture);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = (x, y, width, height);
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.state.borrow_mut().clear_color = rgba;
    }

    fn clear(&self, mask: ClearMask) {
        if mask.color || mask.depth || mask.stencil {
            self.state.borrow_mut().clears += 1;
        }
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        let mut s = self.state.borrow_mut();
        if enabled {
            s.capabilities.insert(capability);
        } else {
            s.capabilities.remove(&capability);
        }
    }
}

// ── probe ─────────────────────────────────────────────────────────────────

/// Read access to a [`HeadlessBackend`]'s recorded state.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<State>>,
}

impl HeadlessProbe {
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Total number of live native objects of any kind.
    pub fn live_objects(&self) -> usize {
        self.live_buffers()
            + self.live_vertex_arrays()
            + self.live_shaders()
            + self.live_programs()
            + self.live_textures()
    }

    pub fn buffer_contents(&self, buffer: GlHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).map(|b| b.data.clone())
    }

    pub fn buffer_usage(&self, buffer: GlHandle) -> Option<BufferUsage> {
        self.state.borrow().buffers.get(&buffer).map(|b| b.usage)
    }

    pub fn vertex_array(&self, vao: GlHandle) -> Option<VertexArraySnapshot> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vao)
            .map(|v| VertexArraySnapshot {
                attributes: v.attributes.clone(),
                enabled: v.enabled.iter().copied().collect(),
                element_buffer: v.element_buffer,
            })
    }

    pub fn texture(&self, texture: GlHandle) -> Option<TextureSnapshot> {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .map(|t| TextureSnapshot {
                width: t.width,
                height: t.height,
                sampling: t.sampling,
                mipmapped: t.mipmapped,
            })
    }

    /// Source text a shader was compiled from.
    pub fn shader_source(&self, shader: GlHandle) -> Option<String> {
        self.state.borrow().shaders.get(&shader).map(|s| s.source.clone())
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn uniform_writes(&self) -> Vec<UniformWrite> {
        self.state.borrow().uniform_writes.clone()
    }

    /// Most recent value written to `name` in `program`.
    pub fn uniform_value(&self, program: GlHandle, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniform_writes
            .iter()
            .rev()
            .find(|w| w.program == program && w.name == name)
            .map(|w| w.value)
    }

    /// Number of native uniform location queries issued so far.
    pub fn location_queries(&self) -> usize {
        self.state.borrow().location_queries
    }

    pub fn current_program(&self) -> Option<GlHandle> {
        self.state.borrow().program
    }

    pub fn bound_vertex_array(&self) -> Option<GlHandle> {
        self.state.borrow().vertex_array
    }

    pub fn bound_array_buffer(&self) -> Option<GlHandle> {
        self.state.borrow().array_buffer
    }

    pub fn bound_textures(&self) -> BTreeMap<u32, GlHandle> {
        self.state.borrow().units.clone()
    }

    pub fn active_texture_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    pub fn capability(&self, capability: Capability) -> bool {
        self.state.borrow().capabilities.contains(&capability)
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn viewport(&self) -> (i32, i32, i32, i32) {
        self.state.borrow().viewport
    }

    pub fn violations(&self) -> Vec<String> {
        self.state.borrow().violations.clone()
    }

    /// Drops recorded draws and uniform writes, keeping object state.
    pub fn reset_records(&self) {
        let mut s = self.state.borrow_mut();
        s.draws.clear();
        s.uniform_writes.clear();
    }
}

// ── uniform reflection ────────────────────────────────────────────────────

type StructFields = Vec<(String, String, Option<usize>)>;

/// Keeps the lines of `source` that survive `#ifdef`/`#ifndef`/`#else`/`#endif`
/// given the names `#define`d along the way. Dropped lines stay as empty lines
/// so compile logs keep their line numbers.
fn preprocess(source: &str) -> String {
    let mut defines = HashSet::new();
    // Per open conditional: (branch taken, enclosing block active).
    let mut blocks: Vec<(bool, bool)> = Vec::new();
    let mut out = String::with_capacity(source.len());

    for line in source.lines() {
        let active = blocks.last().map_or(true, |&(taken, outer)| taken && outer);
        let mut words = line.split_whitespace();
        let directive = words.next().unwrap_or_default();
        let argument = words.next();

        match directive {
            "#ifdef" | "#ifndef" => {
                let defined = argument.is_some_and(|name| defines.contains(name));
                blocks.push((defined == (directive == "#ifdef"), active));
            }
            "#else" => {
                if let Some(block) = blocks.last_mut() {
                    block.0 = !block.0;
                }
            }
            "#endif" => {
                blocks.pop();
            }
            _ if active => {
                if directive == "#define" {
                    if let Some(name) = argument {
                        defines.insert(name.to_string());
                    }
                }
                out.push_str(line);
            }
            _ => {}
        }
        out.push('\n');
    }

    out
}

/// Lists the uniform names a linker would expose for preprocessed `source`.
///
/// Understands plain uniforms, fixed-size arrays, structs and arrays of structs.
/// Remaining directive lines are skipped.
fn reflect_uniforms(source: &str) -> Vec<String> {
    let tokens = tokenize(source);
    let mut structs: HashMap<String, StructFields> = HashMap::new();
    let mut names = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].as_str() {
            "struct" => {
                let Some(name) = tokens.get(i + 1).cloned() else { break };
                i += 2;
                if tokens.get(i).map(String::as_str) != Some("{") {
                    continue;
                }
                i += 1;
                let mut fields = Vec::new();
                while i < tokens.len() && tokens[i] != "}" {
                    let ty = tokens[i].clone();
                    i += 1;
                    for (field, count) in parse_declarators(&tokens, &mut i) {
                        fields.push((ty.clone(), field, count));
                    }
                }
                structs.insert(name, fields);
                i += 1;
            }
            "uniform" => {
                i += 1;
                while matches!(tokens.get(i).map(String::as_str), Some("highp" | "mediump" | "lowp")) {
                    i += 1;
                }
                let Some(ty) = tokens.get(i).cloned() else { break };
                i += 1;
                if tokens.get(i).map(String::as_str) == Some("{") {
                    // Interface blocks are not reflected.
                    while i < tokens.len() && tokens[i] != "}" {
                        i += 1;
                    }
                    continue;
                }
                for (name, count) in parse_declarators(&tokens, &mut i) {
                    expand(&name, &ty, count, &structs, &mut names);
                }
            }
            _ => i += 1,
        }
    }

    names
}

/// Parses `a, b[4], c;` starting at `*i`, leaving `*i` past the semicolon.
fn parse_declarators(tokens: &[String], i: &mut usize) -> Vec<(String, Option<usize>)> {
    let mut out = Vec::new();
    while *i < tokens.len() {
        let name = tokens[*i].clone();
        *i += 1;
        let mut count = None;
        if tokens.get(*i).map(String::as_str) == Some("[") {
            count = tokens.get(*i + 1).and_then(|t| t.parse::<usize>().ok());
            while *i < tokens.len() && tokens[*i] != "]" {
                *i += 1;
            }
            *i += 1;
        }
        out.push((name, count));
        match tokens.get(*i).map(String::as_str) {
            Some(",") => *i += 1,
            Some(";") => {
                *i += 1;
                break;
            }
            _ => break,
        }
    }
    out
}

fn expand(
    name: &str,
    ty: &str,
    count: Option<usize>,
    structs: &HashMap<String, StructFields>,
    out: &mut Vec<String>,
) {
    match count {
        Some(n) => {
            if !structs.contains_key(ty) {
                out.push(name.to_string());
            }
            for k in 0..n {
                expand_one(&format!("{name}[{k}]"), ty, structs, out);
            }
        }
        None => expand_one(name, ty, structs, out),
    }
}

fn expand_one(name: &str, ty: &str, structs: &HashMap<String, StructFields>, out: &mut Vec<String>) {
    match structs.get(ty) {
        Some(fields) => {
            for (fty, field, count) in fields {
                expand(&format!("{name}.{field}"), fty, *count, structs, out);
            }
        }
        None => out.push(name.to_string()),
    }
}

fn tokenize(source: &str) -> Vec<String> {
    let stripped = strip_comments(source);
    let mut tokens = Vec::new();

    for line in stripped.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let mut current = String::new();
        for c in line.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                current.push(c);
                continue;
            }
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            if "{}[];,()=".contains(c) {
                tokens.push(c.to_string());
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }

    tokens
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for n in chars.by_ref() {
                        if n == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for n in chars.by_ref() {
                        if n == '\n' {
                            out.push('\n');
                        }
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn reflects_plain_uniforms() {
        let names = reflect_uniforms("uniform mat4 uPVM;\nuniform vec4 uColor; // tint\n");
        assert_eq!(sorted(names), vec!["uColor", "uPVM"]);
    }

    #[test]
    fn reflects_struct_arrays() {
        let src = "
            struct Light { vec3 position; float range; };
            uniform Light uLights[2];
        ";
        let names = sorted(reflect_uniforms(src));
        assert_eq!(
            names,
            vec!["uLights[0].position", "uLights[0].range", "uLights[1].position", "uLights[1].range"]
        );
    }

    #[test]
    fn reflects_struct_fields() {
        let src = "struct M { sampler2D diffuse; float shininess; };\n/* block */ uniform M uMaterial;";
        assert_eq!(sorted(reflect_uniforms(src)), vec!["uMaterial.diffuse", "uMaterial.shininess"]);
    }

    #[test]
    fn ignores_directives_and_inputs() {
        let src = "#version 400 core\nlayout (location = 0) in vec3 aPos;\nuniform float uTime;\n";
        assert_eq!(reflect_uniforms(src), vec!["uTime"]);
    }

    // ── preprocessing ─────────────────────────────────────────────────────

    const STAGED: &str = "\
#ifdef VERTEX_SHADER
uniform mat4 uPVM;
#else
uniform float uFallback;
#endif
#ifndef VERTEX_SHADER
#ifdef FRAGMENT_SHADER
uniform vec4 uTint;
#endif
#endif
";

    #[test]
    fn only_the_defined_stage_is_reflected() {
        let vertex = preprocess(&format!("#define VERTEX_SHADER\n{STAGED}"));
        let fragment = preprocess(&format!("#define FRAGMENT_SHADER\n{STAGED}"));

        assert_eq!(reflect_uniforms(&vertex), vec!["uPVM"]);
        assert_eq!(sorted(reflect_uniforms(&fragment)), vec!["uFallback", "uTint"]);
        assert_eq!(vertex.lines().count(), STAGED.lines().count() + 1);
    }

    #[test]
    fn error_in_inactive_branch_compiles() {
        let backend = HeadlessBackend::new();
        let sh = backend.create_shader(ShaderStage::Vertex).unwrap();
        backend.shader_source(sh, "#define VERTEX_SHADER\n#ifdef FRAGMENT_SHADER\n#error fragment only\n#endif\n");
        backend.compile_shader(sh);

        assert!(backend.shader_compile_status(sh));
    }

    #[test]
    fn stage_gated_uniform_has_no_location_in_the_other_stage() {
        let backend = HeadlessBackend::new();
        let source = "#ifdef VERTEX_SHADER\nuniform mat4 uPVM;\n#endif\n#ifdef FRAGMENT_SHADER\nvoid main() {}\n#endif\n";
        let vs = backend.create_shader(ShaderStage::Vertex).unwrap();
        let fs = backend.create_shader(ShaderStage::Fragment).unwrap();
        backend.shader_source(vs, &format!("#define VERTEX_SHADER\n{source}"));
        backend.shader_source(fs, "#define FRAGMENT_SHADER\nuniform vec4 uTint;\n#ifdef VERTEX_SHADER\nuniform float uHidden;\n#endif\n");
        backend.compile_shader(vs);
        backend.compile_shader(fs);

        let program = backend.create_program().unwrap();
        backend.attach_shader(program, vs);
        backend.attach_shader(program, fs);
        backend.link_program(program);

        assert!(backend.program_link_status(program));
        assert!(backend.uniform_location(program, "uPVM").is_some());
        assert!(backend.uniform_location(program, "uTint").is_some());
        assert!(backend.uniform_location(program, "uHidden").is_none());
    }

    // ── state tracking ────────────────────────────────────────────────────

    #[test]
    fn element_binding_belongs_to_vertex_array() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();

        let vao = backend.create_vertex_array().unwrap();
        let ebo = backend.create_buffer().unwrap();

        backend.bind_vertex_array(Some(vao));
        backend.bind_buffer(BufferTarget::ElementArray, Some(ebo));
        backend.bind_vertex_array(None);
        backend.bind_buffer(BufferTarget::ElementArray, None);

        assert_eq!(probe.vertex_array(vao).unwrap().element_buffer, Some(ebo));
    }

    #[test]
    fn unbinding_element_buffer_inside_vao_clears_it() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();

        let vao = backend.create_vertex_array().unwrap();
        let ebo = backend.create_buffer().unwrap();

        backend.bind_vertex_array(Some(vao));
        backend.bind_buffer(BufferTarget::ElementArray, Some(ebo));
        backend.bind_buffer(BufferTarget::ElementArray, None);
        backend.bind_vertex_array(None);

        assert_eq!(probe.vertex_array(vao).unwrap().element_buffer, None);
    }

    #[test]
    fn integer_attribute_is_captured_and_float_integer_rejected() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();

        let vao = backend.create_vertex_array().unwrap();
        let vbo = backend.create_buffer().unwrap();
        backend.bind_vertex_array(Some(vao));
        backend.bind_buffer(BufferTarget::Array, Some(vbo));

        let joints = VertexAttribute::integer(4, 4, AttributeKind::UnsignedByte, 8, 0);
        backend.vertex_attrib_pointer(&joints);
        assert!(probe.violations().is_empty());
        assert!(probe.vertex_array(vao).unwrap().attributes[0].attribute.integer);

        let broken = VertexAttribute {
            integer: true,
            ..VertexAttribute::float(5, 1, 8, 4)
        };
        backend.vertex_attrib_pointer(&broken);
        assert_eq!(probe.violations().len(), 1);
    }

    #[test]
    fn double_delete_is_a_violation() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();

        let b = backend.create_buffer().unwrap();
        backend.delete_buffer(b);
        backend.delete_buffer(b);

        assert_eq!(probe.violations().len(), 1);
        assert_eq!(probe.live_buffers(), 0);
    }

    #[test]
    fn compile_error_marker_fails_with_log() {
        let backend = HeadlessBackend::new();
        let sh = backend.create_shader(ShaderStage::Fragment).unwrap();
        backend.shader_source(sh, "void main() {}\n#error missing semicolon\n");
        backend.compile_shader(sh);

        assert!(!backend.shader_compile_status(sh));
        assert_eq!(backend.shader_info_log(sh), "0:2: error: missing semicolon");
    }
}
