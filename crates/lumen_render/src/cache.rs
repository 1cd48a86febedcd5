//! Compiled variants keyed by configuration

use crate::error::Result;
use crate::target::compile;
use lumen_gpu::{GpuDevice, ProgramHandle};
use lumen_shader::{generate, ShaderConfig};
use std::collections::HashMap;

/// Compiles each distinct variant once.
///
/// Generation is deterministic, so two equal configurations would produce
/// the same program anyway; the cache just skips the redundant compile.
#[derive(Debug, Default)]
pub struct ShaderCache {
    programs: HashMap<String, ProgramHandle>,
    hits: u64,
    misses: u64,
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program for `config`, compiling it on first request
    pub fn get_or_compile(&mut self, device: &mut dyn GpuDevice, config: &ShaderConfig) -> Result<ProgramHandle> {
        config.validate()?;
        let key = config.cache_key();
        if let Some(&program) = self.programs.get(&key) {
            self.hits += 1;
            return Ok(program);
        }

        let source = generate(config);
        let program = compile(device, &source, "model")?;
        self.misses += 1;
        log::info!(
            "Compiled shader variant {:?} ({} cached)",
            program,
            self.programs.len() + 1
        );
        self.programs.insert(key, program);
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Destroy every cached program
    pub fn release(self, device: &mut dyn GpuDevice) {
        for program in self.programs.into_values() {
            device.destroy_program(program);
        }
    }
}
