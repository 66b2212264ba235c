//! Mock driver for testing
//!
//! Provides a MockDriver that implements [`ShaderDriver`] and records every
//! call for test assertions, without requiring a GPU context. It also keeps
//! live-object counts so tests can prove that no stage or program object
//! outlives a failed build.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ffi::CStr;

use crate::driver::{ShaderDriver, ShaderStage};
use crate::uniforms::UniformValue;

/// Record of a driver call for test inspection
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateStage { stage: ShaderStage, id: u32 },
    CompileStage { id: u32, source: String },
    DeleteStage(u32),
    CreateProgram(u32),
    AttachStage { program: u32, stage: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    UniformLocation { program: u32, name: String },
    WriteUniform {
        location: Option<i32>,
        value: UniformValue,
    },
}

/// A driver that records calls instead of talking to a GPU.
///
/// Compilation fails for stages marked with [`MockDriver::fail_compile`] and
/// for any source containing an `#error` directive, which real GLSL
/// compilers reject as well.
#[derive(Debug, Default)]
pub struct MockDriver {
    /// All calls made to this driver
    pub calls: Vec<DriverCall>,
    next_id: u32,
    live_stages: BTreeMap<u32, ShaderStage>,
    live_programs: BTreeSet<u32>,
    failing_stages: HashSet<ShaderStage>,
    fail_link: bool,
    refuse_programs: bool,
    uniforms: HashMap<String, i32>,
    current: Option<u32>,
}

impl MockDriver {
    /// Create a new mock driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every compile of `stage` fail
    pub fn fail_compile(&mut self, stage: ShaderStage) -> &mut Self {
        self.failing_stages.insert(stage);
        self
    }

    /// Make every link fail
    pub fn fail_link(&mut self) -> &mut Self {
        self.fail_link = true;
        self
    }

    /// Make program creation return no object
    pub fn refuse_programs(&mut self) -> &mut Self {
        self.refuse_programs = true;
        self
    }

    /// Resolve `name` to `location` on every live program
    pub fn register_uniform(&mut self, name: &str, location: i32) -> &mut Self {
        self.uniforms.insert(name.to_string(), location);
        self
    }

    /// Clear all recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Get the number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    // === Probes ===

    /// Stage objects created and not yet deleted
    pub fn live_stages(&self) -> usize {
        self.live_stages.len()
    }

    /// Program objects created and not yet deleted
    pub fn live_programs(&self) -> usize {
        self.live_programs.len()
    }

    pub fn is_live_program(&self, program: u32) -> bool {
        self.live_programs.contains(&program)
    }

    /// Program made current by the last `use_program`
    pub fn current_program(&self) -> Option<u32> {
        self.current
    }

    /// Check if any stage was attached to any program
    pub fn has_attach(&self) -> bool {
        self.calls
            .iter()
            .any(|call| matches!(call, DriverCall::AttachStage { .. }))
    }

    /// Stages attached to `program`, in attach order
    pub fn attached_stages(&self, program: u32) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::AttachStage { program: p, stage } if *p == program => Some(*stage),
                _ => None,
            })
            .collect()
    }

    /// Kind of every stage ever created, in creation order
    pub fn created_stages(&self) -> Vec<ShaderStage> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::CreateStage { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    /// Source text of every compile request, in order
    pub fn compiled_sources(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::CompileStage { source, .. } => Some(source.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every uniform write as `(location, value)`
    pub fn uniform_writes(&self) -> Vec<(Option<i32>, UniformValue)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::WriteUniform { location, value } => Some((*location, *value)),
                _ => None,
            })
            .collect()
    }

    fn next_id(&mut self) -> u32 {
        // GL never hands out 0 for a live object
        self.next_id += 1;
        self.next_id
    }
}

impl ShaderDriver for MockDriver {
    type Stage = u32;
    type Program = u32;
    type Location = i32;

    fn create_stage(&mut self, stage: ShaderStage) -> Option<u32> {
        let id = self.next_id();
        self.live_stages.insert(id, stage);
        self.calls.push(DriverCall::CreateStage { stage, id });
        Some(id)
    }

    fn compile_stage(&mut self, stage: u32, source: &CStr) -> Result<(), String> {
        let source = source.to_string_lossy().into_owned();
        let failing = source.contains("#error")
            || self
                .live_stages
                .get(&stage)
                .is_some_and(|kind| self.failing_stages.contains(kind));
        self.calls.push(DriverCall::CompileStage { id: stage, source });

        if failing {
            Err(format!("0:1(1): error: mock compile failure for shader {stage}"))
        } else {
            Ok(())
        }
    }

    fn delete_stage(&mut self, stage: u32) {
        self.live_stages.remove(&stage);
        self.calls.push(DriverCall::DeleteStage(stage));
    }

    fn create_program(&mut self) -> Option<u32> {
        if self.refuse_programs {
            return None;
        }
        let id = self.next_id();
        self.live_programs.insert(id);
        self.calls.push(DriverCall::CreateProgram(id));
        Some(id)
    }

    fn attach_stage(&mut self, program: u32, stage: u32) {
        self.calls.push(DriverCall::AttachStage { program, stage });
    }

    fn link_program(&mut self, program: u32) -> Result<(), String> {
        self.calls.push(DriverCall::LinkProgram(program));
        if self.fail_link {
            Err(format!("error: mock link failure for program {program}"))
        } else if self.attached_stages(program).is_empty() {
            Err("error: no shaders attached".to_string())
        } else {
            Ok(())
        }
    }

    fn delete_program(&mut self, program: u32) {
        self.live_programs.remove(&program);
        if self.current == Some(program) {
            self.current = None;
        }
        self.calls.push(DriverCall::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.current = program;
        self.calls.push(DriverCall::UseProgram(program));
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        self.calls.push(DriverCall::UniformLocation {
            program,
            name: name.to_string(),
        });
        if self.live_programs.contains(&program) {
            self.uniforms.get(name).copied()
        } else {
            None
        }
    }

    fn write_uniform(&mut self, location: Option<&i32>, value: &UniformValue) {
        self.calls.push(DriverCall::WriteUniform {
            location: location.copied(),
            value: *value,
        });
    }

    fn raw_program_id(program: u32) -> u32 {
        program
    }
}
