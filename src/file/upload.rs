//! Upload handle passed from the request layer into the file service.

use std::fmt;
use std::io::Cursor;

use tokio::io::AsyncRead;

/// A candidate upload: declared name, declared content type, byte length,
/// and the byte source to stream into storage.
pub struct UploadHandle {
    /// Client-supplied file name.
    pub file_name: String,
    /// Client-declared MIME type.
    pub content_type: String,
    /// Declared length in bytes.
    pub length: u64,
    source: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadHandle {
    /// Create a handle over an arbitrary byte source.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        length: u64,
        source: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            length,
            source: Box::new(source),
        }
    }

    /// Create a handle over an in-memory buffer. The length is taken from the buffer.
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let content = content.into();
        let length = content.len() as u64;
        Self::new(file_name, content_type, length, Cursor::new(content))
    }

    /// Mutable access to the byte source.
    pub fn source_mut(&mut self) -> &mut (dyn AsyncRead + Send + Unpin) {
        &mut *self.source
    }
}

impl fmt::Debug for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadHandle")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
