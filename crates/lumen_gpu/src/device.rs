//! The GPU command surface consumed by geometry, shaders and the draw batcher.
//!
//! Everything above this trait speaks in opaque handles and numeric locations.
//! Program compilation is a black box: source text in, handle or log out.

use crate::error::GpuResult;
use crate::state::RenderState;
use glam::{Mat3, Mat4, Vec3, Vec4};

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Create from a raw backend id
            pub fn from_raw(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw backend id
            pub fn raw(&self) -> u32 {
                self.0
            }
        }
    };
}

gpu_handle!(
    /// Handle to a linked shader program
    ProgramHandle
);
gpu_handle!(
    /// Handle to a vertex or index buffer
    BufferHandle
);
gpu_handle!(
    /// Handle to a 2D or cube texture
    TextureHandle
);
gpu_handle!(
    /// Handle to an offscreen depth framebuffer
    FramebufferHandle
);

/// Location of a uniform inside a linked program
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Buffer usage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Per-vertex attribute data
    Vertex,
    /// Triangle or line indices (u32)
    Index,
}

/// How often a buffer is rewritten
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
}

/// Layout of one float attribute inside an interleaved vertex buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeLayout {
    /// Float components (1-4)
    pub components: u32,
    /// Bytes between consecutive vertices
    pub stride: u32,
    /// Byte offset of the first component
    pub offset: u32,
}

/// Value written to a uniform slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    /// Texture unit index for a sampler uniform
    Sampler(u32),
}

/// Texture bind target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
}

/// Shape of a shadow depth target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadowTargetKind {
    /// Single 2D depth map (directional and spot lights)
    Planar,
    /// Six-face cube map storing light distance (point lights)
    Cube,
}

/// Cube map face, in the conventional +X, -X, +Y, -Y, +Z, -Z order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Look direction and up vector used when rendering this face
    pub fn basis(self) -> (Vec3, Vec3) {
        match self {
            CubeFace::PositiveX => (Vec3::X, -Vec3::Y),
            CubeFace::NegativeX => (-Vec3::X, -Vec3::Y),
            CubeFace::PositiveY => (Vec3::Y, Vec3::Z),
            CubeFace::NegativeY => (-Vec3::Y, -Vec3::Z),
            CubeFace::PositiveZ => (Vec3::Z, -Vec3::Y),
            CubeFace::NegativeZ => (-Vec3::Z, -Vec3::Y),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Offscreen depth target: a framebuffer plus the texture it renders into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowTarget {
    pub kind: ShadowTargetKind,
    pub framebuffer: FramebufferHandle,
    pub texture: TextureHandle,
    pub resolution: u32,
}

/// Commands the renderer needs from a graphics backend.
///
/// Implementations own every native resource they hand out; callers release
/// handles through the matching `destroy_*` call exactly once.
pub trait GpuDevice {
    /// Backend name for logging
    fn name(&self) -> &str;

    // ==================== Programs ====================

    /// Compile and link a program from vertex and fragment source
    fn compile_program(&mut self, vertex: &str, fragment: &str) -> GpuResult<ProgramHandle>;

    /// Destroy a program
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Resolve a vertex attribute location by name
    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    /// Resolve a uniform location by name
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Make a program current
    fn use_program(&mut self, program: ProgramHandle);

    /// Write a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    // ==================== Buffers ====================

    /// Create a buffer initialised with `data`
    fn create_buffer(&mut self, kind: BufferKind, usage: BufferUsage, data: &[u8]) -> BufferHandle;

    /// Replace the contents of a buffer
    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Bind a vertex buffer range to an attribute location
    fn bind_attribute(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout);

    /// Bind the index buffer used by the next indexed draw
    fn bind_index_buffer(&mut self, buffer: BufferHandle);

    // ==================== Textures ====================

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle, target: TextureTarget);

    // ==================== Shadow targets ====================

    /// Create an offscreen depth target
    fn create_shadow_target(&mut self, kind: ShadowTargetKind, resolution: u32) -> GpuResult<ShadowTarget>;

    /// Redirect rendering into a shadow target (cube targets take a face)
    fn begin_shadow_target(&mut self, target: &ShadowTarget, face: Option<CubeFace>);

    /// Restore rendering to the default framebuffer
    fn end_shadow_target(&mut self);

    /// Destroy a shadow target and its texture
    fn destroy_shadow_target(&mut self, target: ShadowTarget);

    // ==================== Drawing ====================

    /// Draw indexed triangles from the bound buffers
    fn draw_indexed(&mut self, index_count: u32);

    /// Draw a non-indexed line list from the bound buffers
    fn draw_lines(&mut self, vertex_count: u32);

    // ==================== Fixed-function state ====================

    /// Current fixed-function state
    fn render_state(&self) -> RenderState;

    /// Replace fixed-function state
    fn set_render_state(&mut self, state: RenderState);
}
