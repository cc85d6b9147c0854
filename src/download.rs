use crate::artifact::CompressedArtifact;
use crate::error::{Result, ShrinkError};
use crate::utils::download_file_name;
use crate::validation::ensure_output_dir;
use crate::verbose;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Saves a compressed artifact as `<dir>/compressed_<original name>`.
///
/// Bytes go to a temporary file in `dir` first and are renamed into place,
/// so a failed write never leaves a truncated download behind. The
/// temporary handle is gone once this returns.
pub fn save_download(
    artifact: &CompressedArtifact,
    original_name: &str,
    dir: &Path,
) -> Result<PathBuf> {
    ensure_output_dir(dir)?;
    let target = dir.join(download_file_name(original_name));

    let mut transient = NamedTempFile::new_in(dir)?;
    transient.write_all(artifact.bytes())?;
    transient.flush()?;
    transient
        .persist(&target)
        .map_err(|e| ShrinkError::Io(e.error))?;

    verbose!("Wrote {} bytes to {:?}", artifact.len(), target);
    Ok(target)
}
