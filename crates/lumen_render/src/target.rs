//! What the draw batcher binds geometry against

use crate::error::{RenderError, Result};
use crate::material::Material;
use glam::Mat4;
use lumen_gpu::{GpuDevice, ProgramHandle, UniformLocation};
use lumen_shader::ShaderSource;
use lumen_shapes::AttributeLocations;

/// A program shapes can be drawn with.
///
/// Implemented by the lit [`ModelShader`](crate::ModelShader), the shadow
/// [`DepthShader`](crate::DepthShader) and the overlay
/// [`FlatShader`](crate::FlatShader).
pub trait ShaderTarget {
    /// Attribute slots geometry must feed
    fn attributes(&self) -> &AttributeLocations;

    /// Make the program current along with any textures it samples
    fn bind(&self, device: &mut dyn GpuDevice);

    /// Write per-instance uniforms. `material` is `None` in depth-only passes.
    fn set_instance(&self, device: &mut dyn GpuDevice, model: &Mat4, material: Option<&Material>);
}

/// Resolves named slots of one program, once, at construction
pub(crate) struct LocationResolver<'a> {
    device: &'a dyn GpuDevice,
    program: ProgramHandle,
    label: &'static str,
}

impl<'a> LocationResolver<'a> {
    pub(crate) fn new(device: &'a dyn GpuDevice, program: ProgramHandle, label: &'static str) -> Self {
        Self {
            device,
            program,
            label,
        }
    }

    fn missing(&self, name: &str) -> RenderError {
        RenderError::MissingLocation {
            program: self.label,
            name: name.to_string(),
        }
    }

    pub(crate) fn uniform(&self, name: &str) -> Result<UniformLocation> {
        self.optional_uniform(name).ok_or_else(|| self.missing(name))
    }

    /// Uniforms a driver may strip when the variant never reads them
    pub(crate) fn optional_uniform(&self, name: &str) -> Option<UniformLocation> {
        self.device.uniform_location(self.program, name)
    }

    pub(crate) fn attribute(&self, name: &str) -> Result<u32> {
        self.optional_attribute(name).ok_or_else(|| self.missing(name))
    }

    pub(crate) fn optional_attribute(&self, name: &str) -> Option<u32> {
        self.device.attribute_location(self.program, name)
    }
}

/// Compile generated source, logging the driver log on failure
pub(crate) fn compile(
    device: &mut dyn GpuDevice,
    source: &ShaderSource,
    label: &'static str,
) -> Result<ProgramHandle> {
    device
        .compile_program(&source.vertex, &source.fragment)
        .map_err(|e| {
            log::error!("Failed to compile {label} program: {e}");
            RenderError::from(e)
        })
}

/// Resolve a freshly compiled program's slots, destroying it on failure
pub(crate) fn resolve_or_destroy<T>(
    device: &mut dyn GpuDevice,
    program: ProgramHandle,
    label: &'static str,
    resolve: impl FnOnce(&LocationResolver<'_>) -> Result<T>,
) -> Result<T> {
    let result = resolve(&LocationResolver::new(device, program, label));
    if let Err(e) = &result {
        log::error!("Rejecting {label} program: {e}");
        device.destroy_program(program);
    }
    result
}
