//! Glint Program - shader program building and uniform access
//!
//! This crate provides:
//! - A [`ShaderDriver`] abstraction over the GPU's compile/link/uniform API
//! - Graphics (vertex + fragment) and compute program builders that release
//!   every intermediate stage object on every exit path
//! - Typed uniform setters, including `"<struct>.<field>"` qualified names
//!
//! Three drivers are available: [`GlDriver`] talks to a live OpenGL context,
//! [`NagaDriver`] validates GLSL offline, and [`MockDriver`] records calls for
//! tests.

pub mod builder;
pub mod driver;
pub mod gl_driver;
pub mod mock;
pub mod naga_driver;
pub mod uniforms;

pub use builder::{
    activate, build_compute_program, build_compute_program_from_source,
    build_graphics_program, build_graphics_program_from_sources, deactivate, destroy_program,
    raw_or_sentinel, INVALID_PROGRAM,
};
pub use driver::{ShaderDriver, ShaderStage};
pub use gl_driver::{GlDriver, GlLoadError};
pub use mock::{DriverCall, MockDriver};
pub use naga_driver::NagaDriver;
pub use uniforms::{set_struct_uniform, set_uniform, struct_field_name, UniformValue, Uniforms};

use glint_source::SourceError;
use thiserror::Error;

/// Errors produced while building a shader program
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to prepare {stage} shader source: {source}")]
    Source {
        stage: ShaderStage,
        source: SourceError,
    },

    #[error("driver could not create a {stage} shader object")]
    StageCreateFailed { stage: ShaderStage },

    #[error("driver could not create a program object")]
    ProgramCreateFailed,

    #[error("{stage} shader failed to compile:\n{log}")]
    StageCompileFailed { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    LinkFailed { log: String },
}
