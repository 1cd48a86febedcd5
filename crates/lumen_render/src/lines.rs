//! Debug wireframe lines streamed every frame

use crate::error::Result;
use crate::target::{compile, resolve_or_destroy};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use lumen_gpu::{
    with_state, AttributeLayout, BufferHandle, BufferKind, BufferUsage, GpuDevice, ProgramHandle,
    RenderState, UniformLocation, UniformValue,
};
use lumen_shader::{generate_lines, names};

/// One end of a debug line
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const STRIDE: u32 = std::mem::size_of::<LineVertex>() as u32;
    pub const COLOR_OFFSET: u32 = 12;

    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// Draws line lists on top of the scene
#[derive(Debug)]
pub struct DebugLineRenderer {
    program: ProgramHandle,
    position: u32,
    color: u32,
    view: UniformLocation,
    projection: UniformLocation,
    buffer: Option<BufferHandle>,
}

impl DebugLineRenderer {
    pub fn new(device: &mut dyn GpuDevice) -> Result<Self> {
        let program = compile(device, &generate_lines(), "lines")?;
        resolve_or_destroy(device, program, "lines", |resolver| {
            Ok(Self {
                program,
                position: resolver.attribute(names::POSITION)?,
                color: resolver.attribute(names::COLOR)?,
                view: resolver.uniform(names::VIEW)?,
                projection: resolver.uniform(names::PROJECTION)?,
                buffer: None,
            })
        })
    }

    /// Upload `vertices` (pairs form segments) and draw them without depth testing.
    /// Returns the number of segments drawn.
    pub fn draw(&mut self, device: &mut dyn GpuDevice, vertices: &[LineVertex], view: Mat4, projection: Mat4) -> u32 {
        let count = (vertices.len() / 2 * 2) as u32;
        if count == 0 {
            return 0;
        }

        let bytes: &[u8] = bytemuck::cast_slice(&vertices[..count as usize]);
        let buffer = match self.buffer {
            Some(buffer) => {
                device.update_buffer(buffer, bytes);
                buffer
            }
            None => {
                let buffer = device.create_buffer(BufferKind::Vertex, BufferUsage::Dynamic, bytes);
                self.buffer = Some(buffer);
                buffer
            }
        };

        with_state(device, RenderState::wireframe_overlay(), |device| {
            device.use_program(self.program);
            device.set_uniform(self.view, UniformValue::Mat4(view));
            device.set_uniform(self.projection, UniformValue::Mat4(projection));
            device.bind_attribute(
                self.position,
                buffer,
                AttributeLayout {
                    components: 3,
                    stride: LineVertex::STRIDE,
                    offset: 0,
                },
            );
            device.bind_attribute(
                self.color,
                buffer,
                AttributeLayout {
                    components: 4,
                    stride: LineVertex::STRIDE,
                    offset: LineVertex::COLOR_OFFSET,
                },
            );
            device.draw_lines(count);
        });
        count / 2
    }

    pub fn release(self, device: &mut dyn GpuDevice) {
        if let Some(buffer) = self.buffer {
            device.destroy_buffer(buffer);
        }
        device.destroy_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_gpu::{GpuCommand, HeadlessDevice};

    fn segment() -> [LineVertex; 2] {
        [
            LineVertex::new(Vec3::ZERO, [1.0, 0.0, 0.0, 1.0]),
            LineVertex::new(Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        ]
    }

    #[test]
    fn test_buffer_reused_across_frames() {
        let mut device = HeadlessDevice::new();
        let mut lines = DebugLineRenderer::new(&mut device).unwrap();

        assert_eq!(lines.draw(&mut device, &segment(), Mat4::IDENTITY, Mat4::IDENTITY), 1);
        assert_eq!(lines.draw(&mut device, &segment(), Mat4::IDENTITY, Mat4::IDENTITY), 1);

        assert_eq!(device.count(|c| matches!(c, GpuCommand::CreateBuffer { .. })), 1);
        assert_eq!(device.count(|c| matches!(c, GpuCommand::UpdateBuffer { .. })), 1);
        assert_eq!(device.count(|c| matches!(c, GpuCommand::DrawLines(2))), 2);
    }

    #[test]
    fn test_state_restored_after_draw() {
        let mut device = HeadlessDevice::new();
        let mut lines = DebugLineRenderer::new(&mut device).unwrap();
        let before = device.render_state();
        lines.draw(&mut device, &segment(), Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(device.render_state(), before);
    }

    #[test]
    fn test_empty_input_draws_nothing() {
        let mut device = HeadlessDevice::new();
        let mut lines = DebugLineRenderer::new(&mut device).unwrap();
        device.clear_commands();
        assert_eq!(lines.draw(&mut device, &[], Mat4::IDENTITY, Mat4::IDENTITY), 0);
        assert!(device.commands().is_empty());
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(LineVertex::STRIDE, 28);
    }
}
