use crate::constants::MAX_INPUT_BYTES;
use crate::error::{Result, ShrinkError};
use std::fs;
use std::path::Path;

/// Validate a picked file before its bytes are read
///
/// The path must exist, name a regular file, and be no larger than
/// `MAX_INPUT_BYTES`. Returns the file size.
pub fn validate_input_path(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Err(ShrinkError::FileNotFound(path.to_path_buf()));
    }

    let metadata =
        fs::metadata(path).map_err(|_| ShrinkError::FileNotFound(path.to_path_buf()))?;

    if !metadata.is_file() {
        return Err(ShrinkError::Validation {
            name: path.display().to_string(),
            media_type: "inode/directory".to_string(),
        });
    }

    if metadata.len() > MAX_INPUT_BYTES {
        return Err(ShrinkError::FileTooLarge(metadata.len(), MAX_INPUT_BYTES));
    }

    Ok(metadata.len())
}

/// Make sure the download directory exists
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|_| ShrinkError::DirectoryCreationFailed(dir.to_path_buf()))
}
