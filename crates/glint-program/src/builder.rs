//! Program building
//!
//! Loads and splices sources, compiles each stage, links them into one
//! program and releases the intermediate stage objects. Stage and program
//! objects are owned by a [`BuildScope`] while the build runs; dropping the
//! scope deletes whatever it still holds, so early returns cannot leak driver
//! objects.

use std::ffi::CString;
use std::path::Path;

use glint_source::{load_with_include, SourceBuffer};

use crate::driver::{ShaderDriver, ShaderStage};
use crate::BuildError;

/// Integer returned in place of a program id when a build failed
pub const INVALID_PROGRAM: i64 = -1;

/// Driver objects created during one build call
struct BuildScope<'d, D: ShaderDriver> {
    driver: &'d mut D,
    stages: Vec<D::Stage>,
    program: Option<D::Program>,
}

impl<'d, D: ShaderDriver> BuildScope<'d, D> {
    fn new(driver: &'d mut D) -> Self {
        Self {
            driver,
            stages: Vec::with_capacity(2),
            program: None,
        }
    }

    fn compile(&mut self, stage: ShaderStage, source: &CString) -> Result<(), BuildError> {
        let object = self.driver.create_stage(stage).ok_or_else(|| {
            log::error!("Could not create {} shader object", stage);
            BuildError::StageCreateFailed { stage }
        })?;
        self.stages.push(object);

        self.driver.compile_stage(object, source).map_err(|info_log| {
            log::error!("Failed to compile {} shader:\n{}", stage, info_log);
            BuildError::StageCompileFailed {
                stage,
                log: info_log,
            }
        })
    }

    /// Link every compiled stage into a new program and hand it out.
    ///
    /// The stage objects are deleted when the scope drops, after linking.
    fn link(mut self) -> Result<D::Program, BuildError> {
        let program = self.driver.create_program().ok_or_else(|| {
            log::error!("Could not create program object");
            BuildError::ProgramCreateFailed
        })?;
        self.program = Some(program);

        for &stage in &self.stages {
            self.driver.attach_stage(program, stage);
        }

        self.driver.link_program(program).map_err(|info_log| {
            log::error!("Failed to link shader program:\n{}", info_log);
            BuildError::LinkFailed { log: info_log }
        })?;

        Ok(self.program.take().unwrap_or(program))
    }
}

impl<D: ShaderDriver> Drop for BuildScope<'_, D> {
    fn drop(&mut self) {
        for stage in self.stages.drain(..) {
            self.driver.delete_stage(stage);
        }
        if let Some(program) = self.program.take() {
            self.driver.delete_program(program);
        }
    }
}

fn to_c_source(stage: ShaderStage, source: &SourceBuffer) -> Result<CString, BuildError> {
    source.to_c_string().map_err(|source| {
        log::error!("{} shader source is unusable: {}", stage, source);
        BuildError::Source { stage, source }
    })
}

fn load_stage(
    stage: ShaderStage,
    path: &Path,
    include_path: Option<&Path>,
) -> Result<SourceBuffer, BuildError> {
    load_with_include(path, include_path).map_err(|source| BuildError::Source { stage, source })
}

fn build_program<D: ShaderDriver>(
    driver: &mut D,
    sources: &[(ShaderStage, &SourceBuffer)],
) -> Result<D::Program, BuildError> {
    let sources = sources
        .iter()
        .map(|&(stage, source)| Ok((stage, to_c_source(stage, source)?)))
        .collect::<Result<Vec<_>, BuildError>>()?;

    let mut scope = BuildScope::new(driver);
    for (stage, source) in &sources {
        scope.compile(*stage, source)?;
    }
    let program = scope.link()?;

    log::debug!(
        "Built program {:?} from {} stage(s)",
        program,
        sources.len()
    );
    Ok(program)
}

/// Build a vertex + fragment program from in-memory sources
pub fn build_graphics_program_from_sources<D: ShaderDriver>(
    driver: &mut D,
    vertex: &SourceBuffer,
    fragment: &SourceBuffer,
) -> Result<D::Program, BuildError> {
    build_program(
        driver,
        &[(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)],
    )
}

/// Build a compute program from an in-memory source
pub fn build_compute_program_from_source<D: ShaderDriver>(
    driver: &mut D,
    compute: &SourceBuffer,
) -> Result<D::Program, BuildError> {
    build_program(driver, &[(ShaderStage::Compute, compute)])
}

/// Load, splice, compile and link a vertex + fragment program.
///
/// Each include path, when present, is spliced after the `#version` line of
/// its stage's source. Both sources are loaded before anything is compiled.
pub fn build_graphics_program<D: ShaderDriver>(
    driver: &mut D,
    vertex_path: impl AsRef<Path>,
    vertex_include: Option<&Path>,
    fragment_path: impl AsRef<Path>,
    fragment_include: Option<&Path>,
) -> Result<D::Program, BuildError> {
    let vertex = load_stage(ShaderStage::Vertex, vertex_path.as_ref(), vertex_include)?;
    let fragment = load_stage(ShaderStage::Fragment, fragment_path.as_ref(), fragment_include)?;

    build_graphics_program_from_sources(driver, &vertex, &fragment)
}

/// Load, splice, compile and link a compute program
pub fn build_compute_program<D: ShaderDriver>(
    driver: &mut D,
    path: impl AsRef<Path>,
    include: Option<&Path>,
) -> Result<D::Program, BuildError> {
    let compute = load_stage(ShaderStage::Compute, path.as_ref(), include)?;
    build_compute_program_from_source(driver, &compute)
}

/// Release a linked program
pub fn destroy_program<D: ShaderDriver>(driver: &mut D, program: D::Program) {
    driver.delete_program(program);
}

/// Make `program` the current program for subsequent draws and dispatches
pub fn activate<D: ShaderDriver>(driver: &mut D, program: D::Program) {
    driver.use_program(Some(program));
}

/// Clear the current program
pub fn deactivate<D: ShaderDriver>(driver: &mut D) {
    driver.use_program(None);
}

/// Map a build result onto the integer convention: the program id, or `-1`
pub fn raw_or_sentinel<D: ShaderDriver>(result: &Result<D::Program, BuildError>) -> i64 {
    match result {
        Ok(program) => i64::from(D::raw_program_id(*program)),
        Err(_) => INVALID_PROGRAM,
    }
}
