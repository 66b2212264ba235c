//! Subcommand implementations
//!
//! Kept out of `main.rs` so integration tests can drive them directly.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use glint_config::{Config, ProgramKind, ProgramSpec};
use glint_program::{
    build_compute_program, build_graphics_program, destroy_program, BuildError, ShaderDriver,
};

/// Outcome of building one manifest program
#[derive(Debug)]
pub struct CheckOutcome {
    pub name: String,
    pub kind: Option<ProgramKind>,
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Load `path`, splice `include` after its `#version` line and write the
/// result to `out`
pub fn splice(path: &Path, include: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let combined = glint_source::load_with_include(path, include)
        .with_context(|| format!("Failed to splice {}", path.display()))?;
    out.write_all(combined.as_bytes())
        .context("Failed to write combined source")?;
    Ok(())
}

fn build_spec<D: ShaderDriver>(driver: &mut D, spec: &ProgramSpec) -> Result<(), BuildError> {
    let program = match spec {
        ProgramSpec::Graphics {
            vertex,
            vertex_include,
            fragment,
            fragment_include,
        } => build_graphics_program(
            driver,
            vertex,
            vertex_include.as_deref(),
            fragment,
            fragment_include.as_deref(),
        )?,
        ProgramSpec::Compute { path, include } => {
            build_compute_program(driver, path, include.as_deref())?
        }
    };
    destroy_program(driver, program);
    Ok(())
}

/// Build every program named in `names` (all of them when empty)
///
/// Failures are reported per program rather than aborting the run. A name
/// missing from the manifest is itself a failed outcome.
pub fn check<D: ShaderDriver>(
    driver: &mut D,
    config: &Config,
    names: &[String],
) -> Vec<CheckOutcome> {
    let selected: Vec<&str> = if names.is_empty() {
        config.programs.iter().map(|p| p.name.as_str()).collect()
    } else {
        names.iter().map(String::as_str).collect()
    };

    selected
        .into_iter()
        .map(|name| {
            let outcome = config
                .resolve(name)
                .map_err(|e| e.to_string())
                .and_then(|spec| {
                    build_spec(driver, &spec)
                        .map(|()| spec.kind())
                        .map_err(|e| e.to_string())
                });

            match outcome {
                Ok(kind) => {
                    log::info!("{} ok", name);
                    CheckOutcome {
                        name: name.to_string(),
                        kind: Some(kind),
                        error: None,
                    }
                }
                Err(error) => CheckOutcome {
                    name: name.to_string(),
                    kind: config.program(name).and_then(|p| p.kind().ok()),
                    error: Some(error),
                },
            }
        })
        .collect()
}

/// Write one line per outcome and return whether all passed
pub fn report(outcomes: &[CheckOutcome], out: &mut impl Write) -> Result<bool> {
    for outcome in outcomes {
        match &outcome.error {
            None => writeln!(out, "OK   {}", outcome.name)?,
            Some(error) => {
                writeln!(out, "FAIL {}", outcome.name)?;
                for line in error.lines() {
                    writeln!(out, "     {}", line)?;
                }
            }
        }
    }
    Ok(outcomes.iter().all(CheckOutcome::passed))
}

/// Print every manifest program with its kind and resolved paths
pub fn list(config: &Config, out: &mut impl Write) -> Result<()> {
    let root = config.shader_root();
    for entry in &config.programs {
        let spec = entry.resolve(&root)?;
        writeln!(out, "{} ({})", entry.name, spec.kind().name())?;
        match &spec {
            ProgramSpec::Graphics {
                vertex,
                vertex_include,
                fragment,
                fragment_include,
            } => {
                write_stage(out, "vertex", vertex, vertex_include.as_deref())?;
                write_stage(out, "fragment", fragment, fragment_include.as_deref())?;
            }
            ProgramSpec::Compute { path, include } => {
                write_stage(out, "compute", path, include.as_deref())?;
            }
        }
    }
    Ok(())
}

fn write_stage(
    out: &mut impl Write,
    label: &str,
    path: &Path,
    include: Option<&Path>,
) -> Result<()> {
    write!(out, "  {:<8} {}", label, path.display())?;
    if let Some(include) = include {
        write!(out, " + {}", include.display())?;
    }
    writeln!(out)?;
    Ok(())
}
