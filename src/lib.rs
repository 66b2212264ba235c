//! Glint - GLSL shader loading, include splicing and program building
//!
//! The implementation lives in the workspace crates:
//! - `glint-source` - loading sources and splicing includes after `#version`
//! - `glint-program` - compiling, linking and uniform access over a driver
//! - `glint-config` - the `glint.toml` shader manifest
//!
//! This crate holds the `glint` command line tool.

pub mod commands;

pub use glint_config as config;
pub use glint_program as program;
pub use glint_source as source;
