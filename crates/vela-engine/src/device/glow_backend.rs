use glow::HasContext;

use crate::error::{Error, Result};

use super::backend::Backend;
use super::types::{
    AttributeKind, BufferTarget, BufferUsage, Capability, ClearMask, GlHandle, IndexType,
    PrimitiveMode, Sampling, ShaderStage, TextureFilter, TextureWrap, UniformLocation,
    UniformValue, VertexAttribute,
};

/// Driver message ids that are pure noise (buffer placement hints and similar).
const IGNORED_DEBUG_IDS: [u32; 5] = [1, 131169, 131185, 131218, 131204];

/// OpenGL backend on top of `glow`.
///
/// The wrapped context must be current on the calling thread for the whole
/// lifetime of this value.
pub struct GlowBackend {
    gl: glow::Context,
    name: String,
}

impl GlowBackend {
    /// Wraps a loaded context.
    ///
    /// When `debug_output` is set and the context was created with the debug
    /// flag, driver messages are forwarded to the `log` facade.
    pub fn new(mut gl: glow::Context, debug_output: bool) -> Self {
        let (renderer, version) = unsafe {
            (
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VERSION),
            )
        };
        log::info!("OpenGL renderer: {renderer}");
        log::info!("OpenGL version: {version}");

        if debug_output {
            install_debug_output(&mut gl);
        }

        Self {
            gl,
            name: format!("opengl ({renderer})"),
        }
    }
}

fn install_debug_output(gl: &mut glow::Context) {
    unsafe {
        let flags = gl.get_parameter_i32(glow::CONTEXT_FLAGS);
        if flags & glow::CONTEXT_FLAG_DEBUG_BIT as i32 == 0 {
            log::debug!("context has no debug flag; driver messages disabled");
            return;
        }

        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|source, kind, id, severity, message| {
            if IGNORED_DEBUG_IDS.contains(&id) {
                return;
            }
            let level = match severity {
                glow::DEBUG_SEVERITY_HIGH => log::Level::Error,
                glow::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
                glow::DEBUG_SEVERITY_LOW => log::Level::Info,
                _ => log::Level::Debug,
            };
            log::log!(
                level,
                "gl debug [{id}] source={} type={}: {message}",
                debug_source_name(source),
                debug_type_name(kind)
            );
        });
        gl.debug_message_control(glow::DONT_CARE, glow::DONT_CARE, glow::DONT_CARE, &[], true);
    }
    log::info!("OpenGL running in debug mode");
}

fn debug_source_name(source: u32) -> &'static str {
    match source {
        glow::DEBUG_SOURCE_API => "api",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "window system",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "shader compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "third party",
        glow::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    }
}

fn debug_type_name(kind: u32) -> &'static str {
    match kind {
        glow::DEBUG_TYPE_ERROR => "error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated behaviour",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined behaviour",
        glow::DEBUG_TYPE_PORTABILITY => "portability",
        glow::DEBUG_TYPE_PERFORMANCE => "performance",
        glow::DEBUG_TYPE_MARKER => "marker",
        glow::DEBUG_TYPE_PUSH_GROUP => "push group",
        glow::DEBUG_TYPE_POP_GROUP => "pop group",
        _ => "other",
    }
}

// ── enum mapping ──────────────────────────────────────────────────────────

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

fn attribute_kind(kind: AttributeKind) -> u32 {
    match kind {
        AttributeKind::Byte => glow::BYTE,
        AttributeKind::UnsignedByte => glow::UNSIGNED_BYTE,
        AttributeKind::Short => glow::SHORT,
        AttributeKind::UnsignedShort => glow::UNSIGNED_SHORT,
        AttributeKind::Int => glow::INT,
        AttributeKind::UnsignedInt => glow::UNSIGNED_INT,
        AttributeKind::Float => glow::FLOAT,
    }
}

fn index_type(ty: IndexType) -> u32 {
    match ty {
        IndexType::UnsignedByte => glow::UNSIGNED_BYTE,
        IndexType::UnsignedShort => glow::UNSIGNED_SHORT,
        IndexType::UnsignedInt => glow::UNSIGNED_INT,
    }
}

fn primitive_mode(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => glow::POINTS,
        PrimitiveMode::Lines => glow::LINES,
        PrimitiveMode::LineStrip => glow::LINE_STRIP,
        PrimitiveMode::LineLoop => glow::LINE_LOOP,
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveMode::TriangleFan => glow::TRIANGLE_FAN,
    }
}

fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn texture_wrap(wrap: TextureWrap) -> i32 {
    (match wrap {
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::ClampToBorder => glow::CLAMP_TO_BORDER,
    }) as i32
}

fn texture_filter(filter: TextureFilter) -> i32 {
    (match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        TextureFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        TextureFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

fn capability(cap: Capability) -> u32 {
    match cap {
        Capability::CullFace => glow::CULL_FACE,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::StencilTest => glow::STENCIL_TEST,
        Capability::Blend => glow::BLEND,
    }
}

// ── handle conversion ─────────────────────────────────────────────────────

fn buffer(h: GlHandle) -> glow::NativeBuffer {
    glow::NativeBuffer(h.non_zero())
}

fn vertex_array(h: GlHandle) -> glow::NativeVertexArray {
    glow::NativeVertexArray(h.non_zero())
}

fn shader(h: GlHandle) -> glow::NativeShader {
    glow::NativeShader(h.non_zero())
}

fn program(h: GlHandle) -> glow::NativeProgram {
    glow::NativeProgram(h.non_zero())
}

fn texture(h: GlHandle) -> glow::NativeTexture {
    glow::NativeTexture(h.non_zero())
}

fn created<T>(result: std::result::Result<T, String>, what: &str) -> Result<T> {
    result.map_err(|e| Error::Backend(format!("failed to create {what}: {e}")))
}

impl Backend for GlowBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_buffer(&self) -> Result<GlHandle> {
        let b = created(unsafe { self.gl.create_buffer() }, "buffer")?;
        Ok(GlHandle::from_non_zero(b.0))
    }

    fn bind_buffer(&self, target: BufferTarget, b: Option<GlHandle>) {
        unsafe { self.gl.bind_buffer(buffer_target(target), b.map(buffer)) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, buffer_usage(usage))
        }
    }

    fn delete_buffer(&self, b: GlHandle) {
        unsafe { self.gl.delete_buffer(buffer(b)) }
    }

    fn create_vertex_array(&self) -> Result<GlHandle> {
        let v = created(unsafe { self.gl.create_vertex_array() }, "vertex array")?;
        Ok(GlHandle::from_non_zero(v.0))
    }

    fn bind_vertex_array(&self, vao: Option<GlHandle>) {
        unsafe { self.gl.bind_vertex_array(vao.map(vertex_array)) }
    }

    fn vertex_attrib_pointer(&self, a: &VertexAttribute) {
        unsafe {
            if a.integer {
                self.gl.vertex_attrib_pointer_i32(
                    a.index,
                    a.components as i32,
                    attribute_kind(a.kind),
                    a.stride as i32,
                    a.offset as i32,
                )
            } else {
                self.gl.vertex_attrib_pointer_f32(
                    a.index,
                    a.components as i32,
                    attribute_kind(a.kind),
                    a.normalized,
                    a.stride as i32,
                    a.offset as i32,
                )
            }
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn delete_vertex_array(&self, vao: GlHandle) {
        unsafe { self.gl.delete_vertex_array(vertex_array(vao)) }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: usize, ty: IndexType) {
        unsafe {
            self.gl
                .draw_elements(primitive_mode(mode), count as i32, index_type(ty), 0)
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<GlHandle> {
        let s = created(unsafe { self.gl.create_shader(shader_stage(stage)) }, "shader")?;
        Ok(GlHandle::from_non_zero(s.0))
    }

    fn shader_source(&self, s: GlHandle, source: &str) {
        unsafe { self.gl.shader_source(shader(s), source) }
    }

    fn compile_shader(&self, s: GlHandle) {
        unsafe { self.gl.compile_shader(shader(s)) }
    }

    fn shader_compile_status(&self, s: GlHandle) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader(s)) }
    }

    fn shader_info_log(&self, s: GlHandle) -> String {
        unsafe { self.gl.get_shader_info_log(shader(s)) }
    }

    fn delete_shader(&self, s: GlHandle) {
        unsafe { self.gl.delete_shader(shader(s)) }
    }

    fn create_program(&self) -> Result<GlHandle> {
        let p = created(unsafe { self.gl.create_program() }, "program")?;
        Ok(GlHandle::from_non_zero(p.0))
    }

    fn attach_shader(&self, p: GlHandle, s: GlHandle) {
        unsafe { self.gl.attach_shader(program(p), shader(s)) }
    }

    fn link_program(&self, p: GlHandle) {
        unsafe { self.gl.link_program(program(p)) }
    }

    fn program_link_status(&self, p: GlHandle) -> bool {
        unsafe { self.gl.get_program_link_status(program(p)) }
    }

    fn program_info_log(&self, p: GlHandle) -> String {
        unsafe { self.gl.get_program_info_log(program(p)) }
    }

    fn use_program(&self, p: Option<GlHandle>) {
        unsafe { self.gl.use_program(p.map(program)) }
    }

    fn uniform_location(&self, p: GlHandle, name: &str) -> Option<UniformLocation> {
        unsafe { self.gl.get_uniform_location(program(p), name) }.map(|l| UniformLocation(l.0))
    }

    fn uniform(&self, location: UniformLocation, value: UniformValue) {
        let loc = glow::NativeUniformLocation(location.0);
        let loc = Some(&loc);
        unsafe {
            match value {
                UniformValue::Float1(x) => self.gl.uniform_1_f32(loc, x),
                UniformValue::Float2([x, y]) => self.gl.uniform_2_f32(loc, x, y),
                UniformValue::Float3([x, y, z]) => self.gl.uniform_3_f32(loc, x, y, z),
                UniformValue::Float4([x, y, z, w]) => self.gl.uniform_4_f32(loc, x, y, z, w),
                UniformValue::Int1(x) => self.gl.uniform_1_i32(loc, x),
                UniformValue::Int2([x, y]) => self.gl.uniform_2_i32(loc, x, y),
                UniformValue::Int3([x, y, z]) => self.gl.uniform_3_i32(loc, x, y, z),
                UniformValue::Int4([x, y, z, w]) => self.gl.uniform_4_i32(loc, x, y, z, w),
                UniformValue::Mat2(m) => self.gl.uniform_matrix_2_f32_slice(loc, false, &m),
                UniformValue::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(loc, false, &m),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(loc, false, &m),
            }
        }
    }

    fn delete_program(&self, p: GlHandle) {
        unsafe { self.gl.delete_program(program(p)) }
    }

    fn create_texture(&self) -> Result<GlHandle> {
        let t = created(unsafe { self.gl.create_texture() }, "texture")?;
        Ok(GlHandle::from_non_zero(t.0))
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&self, t: Option<GlHandle>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, t.map(texture)) }
    }

    fn texture_binding_2d(&self) -> Option<GlHandle> {
        let raw = unsafe { self.gl.get_parameter_i32(glow::TEXTURE_BINDING_2D) };
        GlHandle::new(raw as u32)
    }

    fn texture_sampling_2d(&self, sampling: Sampling) {
        unsafe {
            let gl = &self.gl;
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, texture_wrap(sampling.wrap_s));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, texture_wrap(sampling.wrap_t));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                texture_filter(sampling.min_filter),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                texture_filter(sampling.mag_filter),
            );
        }
    }

    fn texture_image_2d_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            )
        }
    }

    fn generate_mipmap_2d(&self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn delete_texture(&self, t: GlHandle) {
        unsafe { self.gl.delete_texture(texture(t)) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if mask.stencil {
            bits |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(bits) }
    }

    fn set_capability(&self, cap: Capability, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability(cap));
            } else {
                self.gl.disable(capability(cap));
            }
            if cap == Capability::StencilTest && enabled {
                self.gl.stencil_op(glow::KEEP, glow::KEEP, glow::REPLACE);
            }
        }
    }
}
