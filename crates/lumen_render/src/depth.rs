//! Shadow depth program

use crate::error::Result;
use crate::material::Material;
use crate::target::{compile, resolve_or_destroy, ShaderTarget};
use glam::{Mat4, Vec3};
use lumen_gpu::{GpuDevice, ProgramHandle, UniformLocation, UniformValue};
use lumen_shader::{generate_depth, names, DepthKind};
use lumen_shapes::AttributeLocations;

/// Depth-only program shared by every shape in a shadow pass
#[derive(Debug)]
pub struct DepthShader {
    kind: DepthKind,
    program: ProgramHandle,
    attributes: AttributeLocations,
    model: UniformLocation,
    light_space: UniformLocation,
    /// Cube programs only
    light: Option<(UniformLocation, UniformLocation)>,
}

impl DepthShader {
    pub fn new(device: &mut dyn GpuDevice, kind: DepthKind) -> Result<Self> {
        let program = compile(device, &generate_depth(kind), "depth")?;
        let (attributes, model, light_space, light) =
            resolve_or_destroy(device, program, "depth", |resolver| {
                let attributes = AttributeLocations {
                    position: Some(resolver.attribute(names::POSITION)?),
                    ..Default::default()
                };
                let light = match kind {
                    DepthKind::Planar => None,
                    DepthKind::Cube => Some((
                        resolver.uniform(names::LIGHT_POS)?,
                        resolver.uniform(names::FAR_PLANE)?,
                    )),
                };
                Ok((
                    attributes,
                    resolver.uniform(names::MODEL)?,
                    resolver.uniform(names::LIGHT_SPACE)?,
                    light,
                ))
            })?;

        log::debug!("Depth program {:?} ready ({kind:?})", program);
        Ok(Self {
            kind,
            program,
            attributes,
            model,
            light_space,
            light,
        })
    }

    pub fn kind(&self) -> DepthKind {
        self.kind
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Set up the pass: light view-projection, plus light position and far
    /// plane for cube maps
    pub fn begin_pass(&self, device: &mut dyn GpuDevice, light_space: Mat4, light: Option<(Vec3, f32)>) {
        device.use_program(self.program);
        device.set_uniform(self.light_space, UniformValue::Mat4(light_space));
        if let (Some((pos_loc, far_loc)), Some((position, far))) = (self.light, light) {
            device.set_uniform(pos_loc, UniformValue::Vec3(position));
            device.set_uniform(far_loc, UniformValue::Float(far));
        }
    }

    pub fn release(self, device: &mut dyn GpuDevice) {
        device.destroy_program(self.program);
    }
}

impl ShaderTarget for DepthShader {
    fn attributes(&self) -> &AttributeLocations {
        &self.attributes
    }

    fn bind(&self, device: &mut dyn GpuDevice) {
        device.use_program(self.program);
    }

    fn set_instance(&self, device: &mut dyn GpuDevice, model: &Mat4, _material: Option<&Material>) {
        device.set_uniform(self.model, UniformValue::Mat4(*model));
    }
}
