//! Whole-file shader source loading

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::splice::combine;
use crate::{SourceBuffer, SourceError};

/// Read a shader source file fully into memory.
///
/// The file is opened in binary mode and its length taken by seeking to the
/// end and back. The whole file is read in one operation; anything short of
/// exactly that length is a [`SourceError::ReadFailed`].
pub fn load(path: impl AsRef<Path>) -> Result<SourceBuffer, SourceError> {
    let path = path.as_ref();

    let mut file = File::open(path).map_err(|e| {
        log::error!("Could not open file {:?}: {}", path, e);
        SourceError::FileOpenFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    let read_failed = |e: io::Error| {
        log::error!("Could not read from file {:?}: {}", path, e);
        SourceError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }
    };

    // Seeking a directory reports a bogus length on some filesystems
    if !file.metadata().map_err(read_failed)?.is_file() {
        return Err(read_failed(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let length = file.seek(SeekFrom::End(0)).map_err(read_failed)?;
    file.seek(SeekFrom::Start(0)).map_err(read_failed)?;

    let alloc_failed = || {
        log::error!(
            "Could not allocate {} bytes for shader source {:?}",
            length,
            path
        );
        SourceError::AllocationFailed {
            path: path.to_path_buf(),
            size: length,
        }
    };

    // One spare byte so the buffer can be NUL-terminated at the driver
    // boundary without reallocating.
    let size = usize::try_from(length)
        .ok()
        .and_then(|len| len.checked_add(1))
        .ok_or_else(alloc_failed)?;

    let mut bytes = Vec::new();
    bytes.try_reserve_exact(size).map_err(|_| alloc_failed())?;
    bytes.resize(size - 1, 0);

    file.read_exact(&mut bytes).map_err(read_failed)?;

    log::debug!("Loaded {} bytes from {:?}", bytes.len(), path);
    Ok(SourceBuffer::from_bytes(bytes))
}

/// Load a source file and splice an optional include after its `#version` line
pub fn load_with_include(
    path: impl AsRef<Path>,
    include_path: Option<&Path>,
) -> Result<SourceBuffer, SourceError> {
    let base = load(path)?;
    combine(base, include_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn temp_source(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_load_reads_whole_file() {
        let file = temp_source(b"#version 450\nvoid main() {}\n");
        let buf = load(file.path()).unwrap();
        assert_eq!(buf.as_bytes(), b"#version 450\nvoid main() {}\n");
    }

    #[test]
    fn test_load_empty_file() {
        let file = temp_source(b"");
        let buf = load(file.path()).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_load_binary_bytes_untouched() {
        let file = temp_source(b"a\r\nb\xff\x00c");
        let buf = load(file.path()).unwrap();
        assert_eq!(buf.as_bytes(), b"a\r\nb\xff\x00c");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.vert");

        match load(&missing) {
            Err(SourceError::FileOpenFailed { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected FileOpenFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_load_directory_is_read_failure() {
        let dir = TempDir::new().unwrap();

        match load(dir.path()) {
            Err(SourceError::ReadFailed { path, source }) => {
                assert_eq!(path, dir.path());
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            other => panic!("expected ReadFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_load_with_include_none() {
        let file = temp_source(b"#version 450\nvoid main() {}\n");
        let buf = load_with_include(file.path(), None).unwrap();
        assert_eq!(buf.as_bytes(), b"#version 450\nvoid main() {}\n");
    }

    #[test]
    fn test_load_with_include_splices() {
        let base = temp_source(b"#version 450\nvoid main() {}\n");
        let include = temp_source(b"float helper();\n");
        let buf = load_with_include(base.path(), Some(include.path())).unwrap();
        assert_eq!(
            buf.as_bytes(),
            b"#version 450\nfloat helper();\nvoid main() {}\n"
        );
    }
}
