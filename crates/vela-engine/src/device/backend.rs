use crate::error::Result;

use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, GlHandle, IndexType, PrimitiveMode,
    Sampling, ShaderStage, UniformLocation, UniformValue, VertexAttribute,
};

/// Bind-to-edit graphics API consumed by the resource layer.
///
/// The surface is deliberately close to OpenGL 4.0 core: every call maps to one
/// (or a handful of) native entry points. Implementations must be used from the
/// thread that owns the native context.
///
/// Fallible calls are limited to object creation; everything else mirrors the
/// native API and reports problems through the debug output channel.
pub trait Backend {
    /// Human-readable backend name for diagnostics.
    fn name(&self) -> &str;

    // ── buffers ───────────────────────────────────────────────────────────
    fn create_buffer(&self) -> Result<GlHandle>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<GlHandle>);
    /// Uploads `data` to the buffer currently bound at `target`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: GlHandle);

    // ── vertex arrays ─────────────────────────────────────────────────────
    fn create_vertex_array(&self) -> Result<GlHandle>;
    fn bind_vertex_array(&self, vao: Option<GlHandle>);
    /// Registers `attribute` against the currently bound array buffer.
    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn delete_vertex_array(&self, vao: GlHandle);
    /// Indexed draw from the element buffer captured by the bound vertex array.
    fn draw_elements(&self, mode: PrimitiveMode, count: usize, index_type: IndexType);

    // ── shaders ───────────────────────────────────────────────────────────
    fn create_shader(&self, stage: ShaderStage) -> Result<GlHandle>;
    fn shader_source(&self, shader: GlHandle, source: &str);
    fn compile_shader(&self, shader: GlHandle);
    fn shader_compile_status(&self, shader: GlHandle) -> bool;
    fn shader_info_log(&self, shader: GlHandle) -> String;
    fn delete_shader(&self, shader: GlHandle);

    // ── programs ──────────────────────────────────────────────────────────
    fn create_program(&self) -> Result<GlHandle>;
    fn attach_shader(&self, program: GlHandle, shader: GlHandle);
    fn link_program(&self, program: GlHandle);
    fn program_link_status(&self, program: GlHandle) -> bool;
    fn program_info_log(&self, program: GlHandle) -> String;
    fn use_program(&self, program: Option<GlHandle>);
    fn uniform_location(&self, program: GlHandle, name: &str) -> Option<UniformLocation>;
    /// Writes `value` into the program currently in use.
    fn uniform(&self, location: UniformLocation, value: UniformValue);
    fn delete_program(&self, program: GlHandle);

    // ── textures ──────────────────────────────────────────────────────────
    fn create_texture(&self) -> Result<GlHandle>;
    /// Selects texture unit `unit` (0-based) for subsequent binds.
    fn active_texture(&self, unit: u32);
    fn bind_texture_2d(&self, texture: Option<GlHandle>);
    /// Texture bound to the active unit.
    fn texture_binding_2d(&self) -> Option<GlHandle>;
    fn texture_sampling_2d(&self, sampling: Sampling);
    fn texture_image_2d_rgba8(&self, width: u32, height: u32, pixels: &[u8]);
    fn generate_mipmap_2d(&self);
    fn delete_texture(&self, texture: GlHandle);

    // ── frame state ───────────────────────────────────────────────────────
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self, mask: ClearMask);
    fn set_capability(&self, capability: Capability, enabled: bool);
}
