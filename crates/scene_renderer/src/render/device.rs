//! Graphics device abstraction
//!
//! The renderer never talks to a graphics API directly. Everything it needs
//! (buffers, textures, framebuffers, shader programs, fixed-function state
//! and draw submission) goes through [`GraphicsDevice`], a GL-shaped,
//! object-safe trait. A windowed application implements it over its context;
//! [`RecordingDevice`](super::recording::RecordingDevice) implements it
//! headlessly for tests and tooling.

use bitflags::bitflags;

use crate::assets::IndexData;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Handle to a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Handle to a renderbuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderbufferHandle(pub u32);

/// Handle to an offscreen framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u32);

/// Handle to a compiled shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Location of a uniform within a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Location of a vertex attribute within a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub u32);

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex attribute data
    Vertex,
    /// Element indices
    Index,
}

/// Width of the indices in an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 8-bit
    U8,
    /// 16-bit
    U16,
    /// 32-bit
    U32,
}

impl IndexType {
    /// Index type matching stored index data
    pub const fn of(indices: &IndexData) -> Self {
        match indices {
            IndexData::U8(_) => Self::U8,
            IndexData::U16(_) => Self::U16,
            IndexData::U32(_) => Self::U32,
        }
    }
}

bitflags! {
    /// Buffers cleared by [`GraphicsDevice::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Colour attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
    }
}

/// Toggleable fixed-function state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Depth testing
    DepthTest,
    /// Face culling
    CullFace,
    /// Polygon offset for filled primitives
    PolygonOffsetFill,
}

/// Face selected for culling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// Back faces
    Back,
    /// Front faces
    Front,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    /// Pass when closer
    Less,
    /// Pass when closer or equal
    LessEqual,
}

/// Texel storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 8-bit RGBA colour
    Rgba8,
    /// 24-bit depth
    Depth24,
}

/// Minification and magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Texture creation parameters; all textures clamp to edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Storage format
    pub format: TextureFormat,
    /// Sampling filter
    pub filter: TextureFilter,
}

/// Depth attachment of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAttachment {
    /// Sampleable depth texture
    Texture(TextureHandle),
    /// Depth renderbuffer
    Renderbuffer(RenderbufferHandle),
}

/// Framebuffer creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferDesc {
    /// Colour attachment, `None` for depth-only targets
    pub color: Option<TextureHandle>,
    /// Depth attachment
    pub depth: Option<DepthAttachment>,
}

/// Result of a framebuffer completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// Ready to render into
    Complete,
    /// Not usable; carries the backend status text
    Incomplete(String),
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` or sampler unit
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `vec3`
    Vec3([f32; 3]),
    /// `mat4`, column-major
    Mat4([f32; 16]),
}

/// The graphics capability consumed by the renderer.
///
/// Creation calls never fail outright; compile, link and completeness results
/// are queried afterwards the way GL reports them, and the renderer turns a
/// negative answer into a [`RenderError`](super::RenderError).
pub trait GraphicsDevice {
    /// Create a buffer initialised with `data`
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferHandle;

    /// Release a buffer
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Create a texture with uninitialised contents
    fn create_texture(&mut self, desc: &TextureDesc) -> TextureHandle;

    /// Release a texture
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Create a 24-bit depth renderbuffer
    fn create_depth_renderbuffer(&mut self, width: u32, height: u32) -> RenderbufferHandle;

    /// Release a renderbuffer
    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle);

    /// Create a framebuffer with the given attachments
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> FramebufferHandle;

    /// Release a framebuffer (attachments are not released)
    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Completeness of a framebuffer
    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> FramebufferStatus;

    /// Bind a framebuffer, `None` for the default output
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    /// Set the viewport to `(0, 0, width, height)`
    fn viewport(&mut self, width: u32, height: u32);

    /// Set the colour used by subsequent colour clears
    fn clear_color(&mut self, rgba: [f32; 4]);

    /// Clear the selected buffers of the bound framebuffer
    fn clear(&mut self, flags: ClearFlags);

    /// Enable a capability
    fn enable(&mut self, capability: Capability);

    /// Disable a capability
    fn disable(&mut self, capability: Capability);

    /// Select the culled face
    fn cull_face(&mut self, face: Face);

    /// Select the depth comparison
    fn depth_func(&mut self, func: DepthFunc);

    /// Set the slope-scaled and constant depth offset
    fn polygon_offset(&mut self, factor: f32, units: f32);

    /// Create and compile a shader stage
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderHandle;

    /// Whether a shader stage compiled
    fn shader_compile_status(&self, shader: ShaderHandle) -> bool;

    /// Compiler output for a shader stage
    fn shader_info_log(&self, shader: ShaderHandle) -> String;

    /// Release a shader stage
    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Create a program from two compiled stages and link it
    fn create_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> ProgramHandle;

    /// Whether a program linked
    fn program_link_status(&self, program: ProgramHandle) -> bool;

    /// Linker output for a program
    fn program_info_log(&self, program: ProgramHandle) -> String;

    /// Release a program
    fn delete_program(&mut self, program: ProgramHandle);

    /// Make a program current, `None` to unbind
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Location of an active uniform
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Location of an active vertex attribute
    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;

    /// Write a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Source an attribute from a tightly packed float buffer
    fn bind_vertex_attribute(&mut self, location: AttribLocation, buffer: BufferHandle, components: u32);

    /// Stop sourcing an attribute from a buffer
    fn disable_vertex_attribute(&mut self, location: AttribLocation);

    /// Bind the element buffer, `None` to unbind
    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>);

    /// Bind a texture to a sampler unit, `None` to unbind
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>);

    /// Draw `count` vertices as triangles
    fn draw_arrays(&mut self, count: u32);

    /// Draw `count` indices from the bound element buffer as triangles
    fn draw_elements(&mut self, count: u32, index_type: IndexType);
}
