//! OpenGL driver
//!
//! Thin wrapper over the raw `gl` entry points. A GL context must be current
//! on the calling thread for every method; the driver itself holds no state.

use std::ffi::{c_void, CStr, CString};
use std::ptr;

use gl::types::{GLchar, GLenum, GLint, GLuint};
use thiserror::Error;

use crate::driver::{ShaderDriver, ShaderStage};
use crate::uniforms::UniformValue;

/// Compiled-but-unlinked shader object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlShader(pub GLuint);

/// Linked program object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlProgram(pub GLuint);

/// Uniform location as returned by `glGetUniformLocation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlLocation(pub GLint);

/// Location GL silently ignores on write
const IGNORED_LOCATION: GLint = -1;

#[derive(Error, Debug)]
pub enum GlLoadError {
    #[error("OpenGL entry point {0} could not be loaded")]
    MissingEntryPoint(&'static str),
}

/// Driver backed by the current OpenGL context
#[derive(Debug)]
pub struct GlDriver {
    _private: (),
}

impl GlDriver {
    /// Load GL entry points through `loader` (e.g. a window's
    /// `get_proc_address`) and check the ones program building needs.
    pub fn load_with<F>(loader: F) -> Result<Self, GlLoadError>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let required: [(&'static str, bool); 6] = [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glCompileShader", gl::CompileShader::is_loaded()),
            ("glCreateProgram", gl::CreateProgram::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            ("glUseProgram", gl::UseProgram::is_loaded()),
            ("glGetUniformLocation", gl::GetUniformLocation::is_loaded()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, loaded)| !loaded) {
            log::error!("OpenGL entry point {} is missing", name);
            return Err(GlLoadError::MissingEntryPoint(*name));
        }

        // Double-precision uniforms need GL 4.0; only warn, most shaders never use them
        if !gl::Uniform1d::is_loaded() {
            log::warn!("glUniform1d not available, double uniforms will be dropped");
        }

        Ok(Self { _private: () })
    }
}

fn stage_enum(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        ShaderStage::Compute => gl::COMPUTE_SHADER,
    }
}

/// Read an info log of `length` bytes using one of the `glGet*InfoLog` calls
fn read_info_log(
    length: GLint,
    get_log: impl FnOnce(GLint, *mut GLint, *mut GLchar),
) -> String {
    let capacity = usize::try_from(length).unwrap_or(0);
    if capacity == 0 {
        return String::new();
    }

    let mut buffer = vec![0u8; capacity];
    let mut written: GLint = 0;
    get_log(length, &mut written, buffer.as_mut_ptr().cast());
    buffer.truncate(usize::try_from(written).unwrap_or(0));

    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

fn shader_info_log(shader: GLuint) -> String {
    let mut length: GLint = 0;
    unsafe {
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length);
    }
    read_info_log(length, |len, written, buf| unsafe {
        gl::GetShaderInfoLog(shader, len, written, buf);
    })
}

fn program_info_log(program: GLuint) -> String {
    let mut length: GLint = 0;
    unsafe {
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length);
    }
    read_info_log(length, |len, written, buf| unsafe {
        gl::GetProgramInfoLog(program, len, written, buf);
    })
}

impl ShaderDriver for GlDriver {
    type Stage = GlShader;
    type Program = GlProgram;
    type Location = GlLocation;

    fn create_stage(&mut self, stage: ShaderStage) -> Option<GlShader> {
        let id = unsafe { gl::CreateShader(stage_enum(stage)) };
        (id != 0).then_some(GlShader(id))
    }

    fn compile_stage(&mut self, stage: GlShader, source: &CStr) -> Result<(), String> {
        let mut success: GLint = 0;
        unsafe {
            let source_ptr = source.as_ptr();
            gl::ShaderSource(stage.0, 1, &source_ptr, ptr::null());
            gl::CompileShader(stage.0);
            gl::GetShaderiv(stage.0, gl::COMPILE_STATUS, &mut success);
        }

        if success == GLint::from(gl::TRUE) {
            Ok(())
        } else {
            Err(shader_info_log(stage.0))
        }
    }

    fn delete_stage(&mut self, stage: GlShader) {
        unsafe { gl::DeleteShader(stage.0) }
    }

    fn create_program(&mut self) -> Option<GlProgram> {
        let id = unsafe { gl::CreateProgram() };
        (id != 0).then_some(GlProgram(id))
    }

    fn attach_stage(&mut self, program: GlProgram, stage: GlShader) {
        unsafe { gl::AttachShader(program.0, stage.0) }
    }

    fn link_program(&mut self, program: GlProgram) -> Result<(), String> {
        let mut success: GLint = 0;
        unsafe {
            gl::LinkProgram(program.0);
            gl::GetProgramiv(program.0, gl::LINK_STATUS, &mut success);
        }

        if success == GLint::from(gl::TRUE) {
            Ok(())
        } else {
            Err(program_info_log(program.0))
        }
    }

    fn delete_program(&mut self, program: GlProgram) {
        unsafe { gl::DeleteProgram(program.0) }
    }

    fn use_program(&mut self, program: Option<GlProgram>) {
        unsafe { gl::UseProgram(program.map_or(0, |p| p.0)) }
    }

    fn uniform_location(&mut self, program: GlProgram, name: &str) -> Option<GlLocation> {
        // A name with a NUL byte can never match a uniform
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program.0, name.as_ptr()) };
        (location != IGNORED_LOCATION).then_some(GlLocation(location))
    }

    fn write_uniform(&mut self, location: Option<&GlLocation>, value: &UniformValue) {
        let loc = location.map_or(IGNORED_LOCATION, |l| l.0);
        unsafe {
            match value {
                UniformValue::Int(v) => gl::Uniform1i(loc, *v),
                UniformValue::Uint(v) => gl::Uniform1ui(loc, *v),
                UniformValue::Float(v) => gl::Uniform1f(loc, *v),
                UniformValue::Double(v) => {
                    if gl::Uniform1d::is_loaded() {
                        gl::Uniform1d(loc, *v);
                    }
                }
                UniformValue::Vec2(v) => gl::Uniform2fv(loc, 1, v.as_ptr()),
                UniformValue::Vec3(v) => gl::Uniform3fv(loc, 1, v.as_ptr()),
                UniformValue::Vec4(v) => gl::Uniform4fv(loc, 1, v.as_ptr()),
                UniformValue::Mat2(m) => gl::UniformMatrix2fv(loc, 1, gl::FALSE, m.as_ptr().cast()),
                UniformValue::Mat3(m) => gl::UniformMatrix3fv(loc, 1, gl::FALSE, m.as_ptr().cast()),
                UniformValue::Mat4(m) => gl::UniformMatrix4fv(loc, 1, gl::FALSE, m.as_ptr().cast()),
            }
        }
    }

    fn raw_program_id(program: GlProgram) -> u32 {
        program.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_enums() {
        assert_eq!(stage_enum(ShaderStage::Vertex), gl::VERTEX_SHADER);
        assert_eq!(stage_enum(ShaderStage::Fragment), gl::FRAGMENT_SHADER);
        assert_eq!(stage_enum(ShaderStage::Compute), gl::COMPUTE_SHADER);
    }

    #[test]
    fn test_read_info_log_empty() {
        let log = read_info_log(0, |_, _, _| panic!("should not query an empty log"));
        assert_eq!(log, "");
    }

    #[test]
    fn test_read_info_log_truncates_to_written() {
        let log = read_info_log(32, |len, written, buf| {
            assert_eq!(len, 32);
            let text = b"0:3(1): error: syntax error\n\0";
            unsafe {
                ptr::copy_nonoverlapping(text.as_ptr(), buf.cast::<u8>(), text.len());
                *written = (text.len() - 1) as GLint;
            }
        });
        assert_eq!(log, "0:3(1): error: syntax error");
    }

    #[test]
    fn test_raw_program_id() {
        assert_eq!(GlDriver::raw_program_id(GlProgram(42)), 42);
    }
}
