//! Flat-colour program for overlays

use crate::error::Result;
use crate::material::Material;
use crate::target::{compile, resolve_or_destroy, ShaderTarget};
use glam::{Mat4, Vec4};
use lumen_gpu::{GpuDevice, ProgramHandle, UniformLocation, UniformValue};
use lumen_shader::{generate_flat, names};
use lumen_shapes::AttributeLocations;

/// Unlit solid colour. Each instance is drawn in its material's diffuse colour.
#[derive(Debug)]
pub struct FlatShader {
    program: ProgramHandle,
    attributes: AttributeLocations,
    model: UniformLocation,
    view: UniformLocation,
    projection: UniformLocation,
    color: UniformLocation,
}

impl FlatShader {
    pub fn new(device: &mut dyn GpuDevice) -> Result<Self> {
        let program = compile(device, &generate_flat(), "flat")?;
        let shader = resolve_or_destroy(device, program, "flat", |resolver| {
            Ok(Self {
                program,
                attributes: AttributeLocations {
                    position: Some(resolver.attribute(names::POSITION)?),
                    ..Default::default()
                },
                model: resolver.uniform(names::MODEL)?,
                view: resolver.uniform(names::VIEW)?,
                projection: resolver.uniform(names::PROJECTION)?,
                color: resolver.uniform(names::FLAT_COLOR)?,
            })
        })?;
        log::debug!("Flat program {:?} ready", program);
        Ok(shader)
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Bind and write the camera matrices
    pub fn set_camera(&self, device: &mut dyn GpuDevice, view: Mat4, projection: Mat4) {
        device.use_program(self.program);
        device.set_uniform(self.view, UniformValue::Mat4(view));
        device.set_uniform(self.projection, UniformValue::Mat4(projection));
    }

    pub fn set_color(&self, device: &mut dyn GpuDevice, color: Vec4) {
        device.set_uniform(self.color, UniformValue::Vec4(color));
    }

    pub fn release(self, device: &mut dyn GpuDevice) {
        device.destroy_program(self.program);
    }
}

impl ShaderTarget for FlatShader {
    fn attributes(&self) -> &AttributeLocations {
        &self.attributes
    }

    fn bind(&self, device: &mut dyn GpuDevice) {
        device.use_program(self.program);
    }

    fn set_instance(&self, device: &mut dyn GpuDevice, model: &Mat4, material: Option<&Material>) {
        device.set_uniform(self.model, UniformValue::Mat4(*model));
        if let Some(material) = material {
            self.set_color(device, material.diffuse.extend(1.0));
        }
    }
}
