use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShrinkError {
    #[error("Not an image file: {name} ({media_type})")]
    Validation { name: String, media_type: String },

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid timeout: {0} seconds. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShrinkError {
    /// Short reason shown in the status area, without the category prefix.
    pub fn reason(&self) -> String {
        match self {
            ShrinkError::Compression(reason) | ShrinkError::Decode(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
