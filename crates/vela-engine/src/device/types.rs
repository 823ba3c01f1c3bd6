use std::fmt;
use std::num::NonZeroU32;

/// Native object name handed out by the driver.
///
/// A live handle is never zero. "No object" is expressed with `Option<GlHandle>`
/// and ownership, not with a sentinel value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GlHandle(NonZeroU32);

impl GlHandle {
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub const fn from_non_zero(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    #[inline]
    pub const fn non_zero(self) -> NonZeroU32 {
        self.0
    }
}

impl fmt::Display for GlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolved uniform location inside a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

// ── buffers ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
}

// ── vertex layout ─────────────────────────────────────────────────────────

/// Numeric type of a single vertex attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeKind {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
}

impl AttributeKind {
    pub const fn size_in_bytes(self) -> u32 {
        match self {
            AttributeKind::Byte | AttributeKind::UnsignedByte => 1,
            AttributeKind::Short | AttributeKind::UnsignedShort => 2,
            AttributeKind::Int | AttributeKind::UnsignedInt | AttributeKind::Float => 4,
        }
    }
}

/// One attribute binding descriptor of a vertex layout.
///
/// Pure value data; replayed verbatim every time a layout object is rebuilt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    /// Shader input slot.
    pub index: u32,
    /// Component count (1..=4).
    pub components: u8,
    pub kind: AttributeKind,
    pub normalized: bool,
    /// Read by an `ivec`/`uvec` input without conversion to float. Only valid
    /// for the integer kinds, and never normalized.
    pub integer: bool,
    /// Distance between consecutive vertex records, in bytes.
    pub stride: u32,
    /// Byte offset of the attribute within the vertex record.
    pub offset: u32,
}

impl VertexAttribute {
    /// Float attribute, the common case for positions, normals and uvs.
    pub const fn float(index: u32, components: u8, stride: u32, offset: u32) -> Self {
        Self {
            index,
            components,
            kind: AttributeKind::Float,
            normalized: false,
            integer: false,
            stride,
            offset,
        }
    }

    /// Integer attribute consumed as-is by an `ivec`/`uvec` input.
    pub const fn integer(index: u32, components: u8, kind: AttributeKind, stride: u32, offset: u32) -> Self {
        Self {
            index,
            components,
            kind,
            normalized: false,
            integer: true,
            stride,
            offset,
        }
    }
}

/// Native index element type used by indexed draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
}

impl IndexType {
    pub const fn size_in_bytes(self) -> usize {
        match self {
            IndexType::UnsignedByte => 1,
            IndexType::UnsignedShort => 2,
            IndexType::UnsignedInt => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

// ── shaders ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Preprocessor symbol defined ahead of the stage's source text.
    pub const fn define(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX_SHADER",
            ShaderStage::Fragment => "FRAGMENT_SHADER",
        }
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

/// A single uniform write, already flattened to native components.
///
/// Matrices are column-major.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float1(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int1(i32),
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

// ── textures ──────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureWrap {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

/// Wrap and filter state of a 2D texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Sampling {
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
        }
    }
}

// ── frame state ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    CullFace,
    DepthTest,
    StencilTest,
    Blend,
}

/// Which framebuffer planes a clear touches.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl ClearMask {
    pub const ALL: Self = Self { color: true, depth: true, stencil: true };
    pub const COLOR: Self = Self { color: true, depth: false, stencil: false };
}
