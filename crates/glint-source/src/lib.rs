//! Glint Source - shader source loading and include splicing
//!
//! This crate provides:
//! - Whole-file loading of shader text into an owned [`SourceBuffer`]
//! - Splicing of a shared include file directly after the `#version` line
//!
//! Version pragmas must stay the first directive of the effective source, so
//! injected code always lands on the line after `#version`, never before it.

pub mod buffer;
pub mod loader;
pub mod splice;

pub use buffer::SourceBuffer;
pub use loader::{load, load_with_include};
pub use splice::{combine, find_version_line_end, splice, VERSION_DIRECTIVE};

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading or combining shader sources
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("could not open file {path:?}: {source}")]
    FileOpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not allocate {size} bytes for shader source {path:?}")]
    AllocationFailed { path: PathBuf, size: u64 },

    #[error("could not read from file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not load include file {path:?}: {source}")]
    IncludeLoadFailed {
        path: PathBuf,
        source: Box<SourceError>,
    },

    #[error("shader source did not contain a #version directive")]
    MissingVersionDirective,

    #[error("end of shader source reached before end of #version line")]
    TruncatedVersionLine,

    #[error("shader source contains a NUL byte at offset {offset}")]
    InteriorNul { offset: usize },
}
