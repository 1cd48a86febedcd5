//! Headless backend.
//!
//! Records every command instead of talking to a driver. Locations are
//! resolved by scanning the declarations of the submitted source, so a
//! program exposes exactly the attributes and uniforms it declares.

use crate::device::{
    AttributeLayout, BufferHandle, BufferKind, BufferUsage, CubeFace, FramebufferHandle,
    GpuDevice, ProgramHandle, ShadowTarget, ShadowTargetKind, TextureHandle, TextureTarget,
    UniformLocation, UniformValue,
};
use crate::error::{GpuError, GpuResult};
use crate::state::RenderState;
use std::collections::HashMap;

/// One recorded device call
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCommand {
    CompileProgram(ProgramHandle),
    DestroyProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    SetUniform {
        program: Option<ProgramHandle>,
        location: UniformLocation,
        value: UniformValue,
    },
    CreateBuffer {
        buffer: BufferHandle,
        kind: BufferKind,
        size: usize,
    },
    UpdateBuffer {
        buffer: BufferHandle,
        size: usize,
    },
    DestroyBuffer(BufferHandle),
    BindAttribute {
        location: u32,
        buffer: BufferHandle,
        layout: AttributeLayout,
    },
    BindIndexBuffer(BufferHandle),
    BindTexture {
        unit: u32,
        texture: TextureHandle,
        target: TextureTarget,
    },
    CreateShadowTarget(ShadowTarget),
    BeginShadowTarget {
        framebuffer: FramebufferHandle,
        face: Option<CubeFace>,
    },
    EndShadowTarget,
    DestroyShadowTarget(FramebufferHandle),
    DrawIndexed(u32),
    DrawLines(u32),
    SetRenderState(RenderState),
}

/// Declarations found in a program's source
#[derive(Debug, Default)]
struct ProgramInfo {
    vertex: String,
    fragment: String,
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, i32>,
    uniform_names: Vec<String>,
}

/// Recording backend with no native resources
pub struct HeadlessDevice {
    next_id: u32,
    programs: HashMap<ProgramHandle, ProgramInfo>,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    shadow_targets: HashMap<FramebufferHandle, ShadowTarget>,
    current_program: Option<ProgramHandle>,
    state: RenderState,
    pending_failure: Option<String>,
    commands: Vec<GpuCommand>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        log::debug!("Creating headless GPU device");
        Self {
            next_id: 1,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            shadow_targets: HashMap::new(),
            current_program: None,
            state: RenderState::default(),
            pending_failure: None,
            commands: Vec::new(),
        }
    }

    /// Make the next `compile_program` call fail with `log`
    pub fn fail_next_compile(&mut self, log: impl Into<String>) {
        self.pending_failure = Some(log.into());
    }

    /// Every command recorded so far
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Forget recorded commands (resources stay alive)
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded commands matching a predicate
    pub fn count(&self, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shadow_targets(&self) -> usize {
        self.shadow_targets.len()
    }

    /// Contents of a live buffer
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Source a program was compiled from
    pub fn program_source(&self, program: ProgramHandle) -> Option<(&str, &str)> {
        self.programs
            .get(&program)
            .map(|p| (p.vertex.as_str(), p.fragment.as_str()))
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    /// Name of the uniform behind a location
    pub fn uniform_name(&self, program: ProgramHandle, location: UniformLocation) -> Option<&str> {
        let info = self.programs.get(&program)?;
        usize::try_from(location.0)
            .ok()
            .and_then(|i| info.uniform_names.get(i))
            .map(String::as_str)
    }

    /// Every value written to the named uniform, in order
    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetUniform {
                    program: Some(program),
                    location,
                    value,
                } if self.uniform_name(*program, *location) == Some(name) => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GpuDevice for HeadlessDevice {
    fn name(&self) -> &str {
        "headless"
    }

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> GpuResult<ProgramHandle> {
        if let Some(log) = self.pending_failure.take() {
            return Err(GpuError::CompileFailed { log });
        }
        for (stage, source) in [("vertex", vertex), ("fragment", fragment)] {
            if !source.contains("void main") {
                return Err(GpuError::CompileFailed {
                    log: format!("{stage} shader has no entry point"),
                });
            }
        }

        let mut info = ProgramInfo {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
            ..Default::default()
        };
        let declarations = scan_declarations(vertex, fragment);
        for (index, name) in declarations.attributes.into_iter().enumerate() {
            info.attributes.entry(name).or_insert(index as u32);
        }
        for name in declarations.uniforms {
            if !info.uniforms.contains_key(&name) {
                info.uniforms.insert(name.clone(), info.uniform_names.len() as i32);
                info.uniform_names.push(name);
            }
        }

        let handle = ProgramHandle(self.allocate());
        log::debug!(
            "Headless program {:?}: {} attributes, {} uniforms",
            handle,
            info.attributes.len(),
            info.uniform_names.len()
        );
        self.programs.insert(handle, info);
        self.commands.push(GpuCommand::CompileProgram(handle));
        Ok(handle)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            log::warn!("Destroying unknown program {:?}", program);
        }
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.commands.push(GpuCommand::DestroyProgram(program));
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs.get(&program)?.attributes.get(name).copied()
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program)?
            .uniforms
            .get(name)
            .map(|&l| UniformLocation(l))
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.commands.push(GpuCommand::SetUniform {
            program: self.current_program,
            location,
            value,
        });
    }

    fn create_buffer(&mut self, kind: BufferKind, _usage: BufferUsage, data: &[u8]) -> BufferHandle {
        let buffer = BufferHandle(self.allocate());
        self.buffers.insert(buffer, data.to_vec());
        self.commands.push(GpuCommand::CreateBuffer {
            buffer,
            kind,
            size: data.len(),
        });
        buffer
    }

    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        match self.buffers.get_mut(&buffer) {
            Some(contents) => {
                contents.clear();
                contents.extend_from_slice(data);
            }
            None => log::warn!("Updating unknown buffer {:?}", buffer),
        }
        self.commands.push(GpuCommand::UpdateBuffer {
            buffer,
            size: data.len(),
        });
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("Destroying unknown buffer {:?}", buffer);
        }
        self.commands.push(GpuCommand::DestroyBuffer(buffer));
    }

    fn bind_attribute(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout) {
        self.commands.push(GpuCommand::BindAttribute {
            location,
            buffer,
            layout,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(GpuCommand::BindIndexBuffer(buffer));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle, target: TextureTarget) {
        self.commands.push(GpuCommand::BindTexture {
            unit,
            texture,
            target,
        });
    }

    fn create_shadow_target(&mut self, kind: ShadowTargetKind, resolution: u32) -> GpuResult<ShadowTarget> {
        if resolution == 0 {
            return Err(GpuError::AllocationFailed(
                "shadow target resolution must be non-zero".to_string(),
            ));
        }
        let target = ShadowTarget {
            kind,
            framebuffer: FramebufferHandle(self.allocate()),
            texture: TextureHandle(self.allocate()),
            resolution,
        };
        self.shadow_targets.insert(target.framebuffer, target);
        self.commands.push(GpuCommand::CreateShadowTarget(target));
        Ok(target)
    }

    fn begin_shadow_target(&mut self, target: &ShadowTarget, face: Option<CubeFace>) {
        self.commands.push(GpuCommand::BeginShadowTarget {
            framebuffer: target.framebuffer,
            face,
        });
    }

    fn end_shadow_target(&mut self) {
        self.commands.push(GpuCommand::EndShadowTarget);
    }

    fn destroy_shadow_target(&mut self, target: ShadowTarget) {
        self.shadow_targets.remove(&target.framebuffer);
        self.commands
            .push(GpuCommand::DestroyShadowTarget(target.framebuffer));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.commands.push(GpuCommand::DrawIndexed(index_count));
    }

    fn draw_lines(&mut self, vertex_count: u32) {
        self.commands.push(GpuCommand::DrawLines(vertex_count));
    }

    fn render_state(&self) -> RenderState {
        self.state
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
        self.commands.push(GpuCommand::SetRenderState(state));
    }
}

// ==================== Source scanning ====================

#[derive(Debug, Default)]
struct Declarations {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

/// A `type name[len];` declaration
#[derive(Clone, Debug)]
struct Field {
    ty: String,
    name: String,
    len: Option<usize>,
}

fn scan_declarations(vertex: &str, fragment: &str) -> Declarations {
    let mut structs: HashMap<String, Vec<Field>> = HashMap::new();
    let mut declarations = Declarations::default();

    for source in [vertex, fragment] {
        let mut open_struct: Option<(String, Vec<Field>)> = None;

        for line in source.lines() {
            let line = line.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if let Some((name, fields)) = open_struct.as_mut() {
                if line.starts_with('}') {
                    structs.insert(name.clone(), std::mem::take(fields));
                    open_struct = None;
                } else if let Some(field) = parse_field(line) {
                    fields.push(field);
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("struct ") {
                let name = rest.trim_end_matches('{').trim().to_string();
                open_struct = Some((name, Vec::new()));
            } else if let Some(rest) = line.strip_prefix("attribute ") {
                if let Some(field) = parse_field(rest) {
                    declarations.attributes.push(field.name);
                }
            } else if let Some(rest) = line.strip_prefix("uniform ") {
                if let Some(field) = parse_field(rest) {
                    expand_uniform(&field, &field.name, &structs, &mut declarations.uniforms);
                }
            }
        }
    }

    declarations
}

fn parse_field(line: &str) -> Option<Field> {
    let line = line.trim().strip_suffix(';')?;
    let mut tokens = line
        .split_whitespace()
        .filter(|t| !matches!(*t, "lowp" | "mediump" | "highp" | "const"));
    let ty = tokens.next()?.to_string();
    let declarator = tokens.next()?;

    match declarator.split_once('[') {
        Some((name, len)) => Some(Field {
            ty,
            name: name.to_string(),
            len: len.trim_end_matches(']').parse().ok(),
        }),
        None => Some(Field {
            ty,
            name: declarator.to_string(),
            len: None,
        }),
    }
}

fn expand_uniform(
    field: &Field,
    path: &str,
    structs: &HashMap<String, Vec<Field>>,
    out: &mut Vec<String>,
) {
    let mut paths = Vec::new();
    match field.len {
        Some(len) => {
            // GL also accepts the bare array name for element zero
            if !structs.contains_key(&field.ty) {
                paths.push(path.to_string());
            }
            paths.extend((0..len).map(|i| format!("{path}[{i}]")));
        }
        None => paths.push(path.to_string()),
    }

    match structs.get(&field.ty) {
        Some(members) => {
            for base in paths {
                if field.len.is_some() && !base.ends_with(']') {
                    continue;
                }
                for member in members {
                    expand_uniform(member, &format!("{base}.{}", member.name), structs, out);
                }
            }
        }
        None => out.extend(paths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "attribute vec3 aPosition;\nattribute vec2 aUv0;\nuniform mat4 uModel;\nvoid main() {}\n";
    const FS: &str = "struct Light {\n    vec3 position;\n    float radius;\n};\nuniform Light uLights[2];\nuniform sampler2D uTex[2];\nuniform mat4 uModel;\nvoid main() {}\n";

    #[test]
    fn test_locations_from_source() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(VS, FS).unwrap();

        assert_eq!(device.attribute_location(program, "aPosition"), Some(0));
        assert_eq!(device.attribute_location(program, "aUv0"), Some(1));
        assert!(device.uniform_location(program, "uModel").is_some());
        assert!(device.uniform_location(program, "uLights[1].radius").is_some());
        assert!(device.uniform_location(program, "uLights[2].radius").is_none());
        assert!(device.uniform_location(program, "uTex[0]").is_some());
        assert!(device.uniform_location(program, "uTex").is_some());
        assert!(device.uniform_location(program, "uMissing").is_none());
    }

    #[test]
    fn test_shared_uniform_has_one_location() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(VS, FS).unwrap();
        let model = device.uniform_location(program, "uModel").unwrap();
        assert_eq!(device.uniform_name(program, model), Some("uModel"));
    }

    #[test]
    fn test_compile_failure_injection() {
        let mut device = HeadlessDevice::new();
        device.fail_next_compile("0:1: syntax error");
        let err = device.compile_program(VS, FS).unwrap_err();
        assert!(err.to_string().contains("syntax error"));
        assert!(device.compile_program(VS, FS).is_ok());
    }

    #[test]
    fn test_missing_entry_point_fails() {
        let mut device = HeadlessDevice::new();
        assert!(device.compile_program("uniform mat4 uModel;", FS).is_err());
    }

    #[test]
    fn test_uniform_writes_tracked_by_name() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(VS, FS).unwrap();
        let radius = device.uniform_location(program, "uLights[0].radius").unwrap();

        device.use_program(program);
        device.set_uniform(radius, UniformValue::Float(2.0));

        assert_eq!(device.uniform_writes("uLights[0].radius"), vec![UniformValue::Float(2.0)]);
    }

    #[test]
    fn test_buffer_lifecycle() {
        let mut device = HeadlessDevice::new();
        let buffer = device.create_buffer(BufferKind::Vertex, BufferUsage::Dynamic, &[1, 2, 3]);
        device.update_buffer(buffer, &[4, 5]);
        assert_eq!(device.buffer_data(buffer), Some(&[4u8, 5][..]));
        device.destroy_buffer(buffer);
        assert_eq!(device.live_buffers(), 0);
    }
}
