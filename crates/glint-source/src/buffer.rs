//! Owned shader source text

use std::ffi::CString;
use std::fmt;

use crate::SourceError;

/// Shader text as raw bytes, exactly as read from disk.
///
/// Files are read in binary mode, so the buffer is not required to be valid
/// UTF-8. Conversion to a NUL-terminated string only happens at the driver
/// boundary via [`SourceBuffer::to_c_string`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
}

impl SourceBuffer {
    /// Wrap already-owned bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Raw bytes of the source
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the buffer, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes, excluding any terminator
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Source as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Source as text with invalid sequences replaced
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// NUL-terminated copy for handing to a C driver.
    ///
    /// Fails if the text contains a NUL byte, since the driver would
    /// otherwise stop reading at that point and compile a truncated shader.
    pub fn to_c_string(&self) -> Result<CString, SourceError> {
        CString::new(self.bytes.clone()).map_err(|e| SourceError::InteriorNul {
            offset: e.nul_position(),
        })
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec())
    }
}

impl From<String> for SourceBuffer {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl From<Vec<u8>> for SourceBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for SourceBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("len", &self.bytes.len())
            .field("text", &self.to_string_lossy())
            .finish()
    }
}
