//! In-memory blobs moving through a session.

use crate::error::Result;
use crate::formats::{is_image_media_type, media_type_for_path};
use crate::validation::validate_input_path;
use std::path::Path;
use std::sync::Arc;

/// A picked file, before compression.
///
/// Bytes are shared so that in-flight compressions and previews can hold
/// them while the session moves on to another file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalArtifact {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl OriginalArtifact {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, typing it by extension.
    ///
    /// # Errors
    /// * `FileNotFound`, `FileTooLarge` or `Validation` (for directories) from
    ///   path validation
    /// * `Io` if the read fails
    pub async fn from_path(path: &Path) -> Result<Self> {
        validate_input_path(path)?;

        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, media_type_for_path(path), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }
}

/// Output of one compression run, tied to the original it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
    media_type: String,
    bytes: Arc<[u8]>,
    original_len: u64,
}

impl CompressedArtifact {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>, original_len: u64) -> Self {
        Self {
            media_type: media_type.into(),
            bytes: bytes.into(),
            original_len,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn original_len(&self) -> u64 {
        self.original_len
    }
}
