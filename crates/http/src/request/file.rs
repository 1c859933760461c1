use std::path::{Path, PathBuf};

/// Descriptor of a file the client uploaded with the request.
///
/// The request view only stores and hands these out; what the fields mean is
/// up to the host that produced them and the application consuming them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    path: PathBuf,
    size: u64,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self { file_name: file_name.into(), content_type: None, path: path.into(), size }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Name of the file as sent by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content type as claimed by the client, not verified.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Where the host stored the uploaded bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
