//! Driver abstraction for shader compilation
//!
//! This module defines the GPU-facing operations the builder and uniform
//! setters need. Implementors wrap a real graphics API or stand in for one
//! in tests and offline validation.

use std::ffi::CStr;
use std::fmt;

use crate::uniforms::UniformValue;

/// A single shader unit compiled independently before linking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// Lowercase name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations a GPU driver exposes for building programs and setting uniforms.
///
/// Handles are opaque to callers. Drivers decide whether ids are reused
/// after deletion; callers must not assume either way.
pub trait ShaderDriver {
    /// Compiled-but-unlinked stage object
    type Stage: Copy + fmt::Debug;
    /// Linked program object
    type Program: Copy + fmt::Debug;
    /// Resolved uniform location
    type Location: fmt::Debug;

    /// Create an empty stage object, or `None` if the driver refused
    fn create_stage(&mut self, stage: ShaderStage) -> Option<Self::Stage>;

    /// Upload and compile source for a stage; `Err` carries the compile log
    fn compile_stage(&mut self, stage: Self::Stage, source: &CStr) -> Result<(), String>;

    fn delete_stage(&mut self, stage: Self::Stage);

    /// Create an empty program object, or `None` if the driver refused
    fn create_program(&mut self) -> Option<Self::Program>;

    fn attach_stage(&mut self, program: Self::Program, stage: Self::Stage);

    /// Link attached stages; `Err` carries the link log
    fn link_program(&mut self, program: Self::Program) -> Result<(), String>;

    fn delete_program(&mut self, program: Self::Program);

    /// Make `program` current, or clear the current program with `None`
    fn use_program(&mut self, program: Option<Self::Program>);

    /// Resolve a uniform name; `None` is the driver's "ignore" location
    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location>;

    /// Write a value to a location. Writes to the ignore location are dropped.
    fn write_uniform(&mut self, location: Option<&Self::Location>, value: &UniformValue);

    /// Non-negative integer id of a program, for callers using the `-1` convention
    fn raw_program_id(program: Self::Program) -> u32;
}
