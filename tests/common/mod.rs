//! Common test utilities and harness
//!
//! Provides an isolated shader directory with helpers for writing sources
//! and a manifest.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const VERTEX: &str = "#version 450
layout(location = 0) in vec3 a_position;
void main() {
    gl_Position = vec4(a_position, 1.0);
}
";

pub const FRAGMENT: &str = "#version 450
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(TINT, 1.0);
}
";

pub const COMPUTE: &str = "#version 450
layout(local_size_x = 64) in;
void main() {
    uint limit = WORKGROUP_LIMIT;
}
";

/// Defines the macros `FRAGMENT` and `COMPUTE` need
pub const FRAGMENT_INCLUDE: &str = "#define TINT vec3(1.0, 0.0, 1.0)\n";
pub const COMPUTE_INCLUDE: &str = "#define WORKGROUP_LIMIT 256u\n";

/// Test environment with an isolated shader directory
pub struct TestEnvironment {
    /// Temporary directory holding the manifest
    pub temp_dir: TempDir,
    /// Directory shader files are written to
    pub shader_dir: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let shader_dir = temp_dir.path().join("shaders");
        std::fs::create_dir_all(&shader_dir).expect("Failed to create shader directory");

        Self {
            temp_dir,
            shader_dir,
        }
    }

    /// Write a shader file and return its path
    pub fn write_shader(&self, name: &str, content: &str) -> PathBuf {
        let path = self.shader_dir.join(name);
        std::fs::write(&path, content).expect("Failed to write test shader");
        path
    }

    /// Write the stock sources and includes used by most tests
    pub fn write_stock_shaders(&self) {
        self.write_shader("basic.vert", VERTEX);
        self.write_shader("tint.frag", FRAGMENT);
        self.write_shader("tint.glsl", FRAGMENT_INCLUDE);
        self.write_shader("cull.comp", COMPUTE);
        self.write_shader("cull.glsl", COMPUTE_INCLUDE);
    }

    /// Write `glint.toml` and return its path
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join("glint.toml");
        std::fs::write(&path, content).expect("Failed to write test config");
        path
    }

    pub fn shader(&self, name: &str) -> PathBuf {
        self.shader_dir.join(name)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Manifest describing the stock shaders
pub const STOCK_MANIFEST: &str = r#"
[general]
shader_dir = "shaders"

[[program]]
name = "tint"
vertex = "basic.vert"
fragment = "tint.frag"
fragment_include = "tint.glsl"

[[program]]
name = "cull"
compute = "cull.comp"
include = "cull.glsl"
"#;
