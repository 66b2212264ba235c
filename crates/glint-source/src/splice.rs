//! Include splicing after the `#version` directive

use std::path::Path;

use crate::loader::load;
use crate::{SourceBuffer, SourceError};

/// Literal searched for in the base source
pub const VERSION_DIRECTIVE: &[u8] = b"#version";

/// Find the offset of the newline that ends the first `#version` line.
///
/// The search is a plain substring match; shader syntax (comments,
/// preprocessor state) is not interpreted.
pub fn find_version_line_end(source: &[u8]) -> Result<usize, SourceError> {
    let start = source
        .windows(VERSION_DIRECTIVE.len())
        .position(|window| window == VERSION_DIRECTIVE)
        .ok_or(SourceError::MissingVersionDirective)?;

    source[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|offset| start + offset)
        .ok_or(SourceError::TruncatedVersionLine)
}

/// Load the include file at `include_path` and splice it into `base`.
///
/// With no include path the base buffer is handed back untouched. Both
/// buffers are consumed on every path; on failure neither survives.
pub fn combine(
    base: SourceBuffer,
    include_path: Option<&Path>,
) -> Result<SourceBuffer, SourceError> {
    let Some(include_path) = include_path else {
        return Ok(base);
    };

    let include = load(include_path).map_err(|e| SourceError::IncludeLoadFailed {
        path: include_path.to_path_buf(),
        source: Box::new(e),
    })?;

    splice(base, include)
}

/// Insert `include` directly after the line holding `#version` in `base`
pub fn splice(base: SourceBuffer, include: SourceBuffer) -> Result<SourceBuffer, SourceError> {
    let line_end = find_version_line_end(base.as_bytes()).inspect_err(|e| match e {
        SourceError::MissingVersionDirective => {
            log::error!("Shader source file did not contain a #version")
        }
        _ => log::error!("End of shader source file reached before end of #version was found"),
    })?;

    let (head, tail) = base.as_bytes().split_at(line_end + 1);

    let mut combined = Vec::with_capacity(base.len() + include.len());
    combined.extend_from_slice(head);
    combined.extend_from_slice(include.as_bytes());
    combined.extend_from_slice(tail);

    log::debug!(
        "Spliced {} include bytes after byte {} of {}-byte source",
        include.len(),
        line_end,
        base.len()
    );
    Ok(SourceBuffer::from_bytes(combined))
}
