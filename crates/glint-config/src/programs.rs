//! Program entries of the shader manifest
//!
//! Each `[[program]]` table names either a graphics program (vertex +
//! fragment, each with an optional include) or a compute program (one
//! source plus an optional include).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Kind of program an entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Graphics,
    Compute,
}

impl ProgramKind {
    pub const fn name(self) -> &'static str {
        match self {
            ProgramKind::Graphics => "graphics",
            ProgramKind::Compute => "compute",
        }
    }
}

/// A `[[program]]` table as written in the manifest
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProgramEntry {
    /// Program name, unique within the manifest
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_include: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_include: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<PathBuf>,
    /// Include spliced into the compute source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,
}

/// A validated entry with paths resolved against the shader root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSpec {
    Graphics {
        vertex: PathBuf,
        vertex_include: Option<PathBuf>,
        fragment: PathBuf,
        fragment_include: Option<PathBuf>,
    },
    Compute {
        path: PathBuf,
        include: Option<PathBuf>,
    },
}

impl ProgramSpec {
    pub fn kind(&self) -> ProgramKind {
        match self {
            ProgramSpec::Graphics { .. } => ProgramKind::Graphics,
            ProgramSpec::Compute { .. } => ProgramKind::Compute,
        }
    }
}

impl ProgramEntry {
    fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidProgram {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Determine the program kind, rejecting mixed or incomplete entries
    pub fn kind(&self) -> Result<ProgramKind, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("program name is empty"));
        }

        let has_graphics = self.vertex.is_some()
            || self.fragment.is_some()
            || self.vertex_include.is_some()
            || self.fragment_include.is_some();
        let has_compute = self.compute.is_some() || self.include.is_some();

        match (has_graphics, has_compute) {
            (true, true) => Err(self.invalid("mixes graphics and compute sources")),
            (false, false) => Err(self.invalid("has no shader sources")),
            (true, false) => {
                if self.vertex.is_none() {
                    Err(self.invalid("graphics program is missing `vertex`"))
                } else if self.fragment.is_none() {
                    Err(self.invalid("graphics program is missing `fragment`"))
                } else {
                    Ok(ProgramKind::Graphics)
                }
            }
            (false, true) => {
                if self.compute.is_none() {
                    Err(self.invalid("`include` given without `compute`"))
                } else {
                    Ok(ProgramKind::Compute)
                }
            }
        }
    }

    /// Validate and resolve relative paths against `root`
    pub fn resolve(&self, root: &Path) -> Result<ProgramSpec, ConfigError> {
        let join = |p: &Option<PathBuf>| p.as_ref().map(|p| root.join(p));

        match self.kind()? {
            ProgramKind::Graphics => Ok(ProgramSpec::Graphics {
                vertex: join(&self.vertex).ok_or_else(|| self.invalid("missing `vertex`"))?,
                vertex_include: join(&self.vertex_include),
                fragment: join(&self.fragment).ok_or_else(|| self.invalid("missing `fragment`"))?,
                fragment_include: join(&self.fragment_include),
            }),
            ProgramKind::Compute => Ok(ProgramSpec::Compute {
                path: join(&self.compute).ok_or_else(|| self.invalid("missing `compute`"))?,
                include: join(&self.include),
            }),
        }
    }
}
