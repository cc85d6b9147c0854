use crate::artifact::{CompressedArtifact, OriginalArtifact};
use crate::compressor::{CompressOptions, Compressor};
use crate::config::PipelineConfig;
use crate::error::{Result, ShrinkError};
use crate::utils::{calculate_compression_ratio, format_ratio};
use crate::verbose;
use std::sync::Arc;
use tokio::time::timeout;

/// Result of one successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOutcome {
    pub artifact: CompressedArtifact,
    /// Percentage reduction, one decimal.
    pub ratio: f64,
}

impl CompressionOutcome {
    pub fn ratio_text(&self) -> String {
        format_ratio(self.ratio)
    }
}

/// Core compression pipeline: validate -> build options -> compress -> measure
///
/// # Arguments
/// * `compressor` - The capability doing the actual re-encoding
/// * `original` - The picked file
/// * `quality` - Slider value, 1-100
/// * `config` - Size ceilings and the compressor timeout
///
/// # Returns
/// * `Ok(CompressionOutcome)` - The compressed artifact and its ratio
/// * `Err(ShrinkError::Validation)` - `original` is not an image; the
///   compressor is never called
/// * `Err(ShrinkError::InvalidQuality)` - `quality` outside 1-100
/// * `Err(ShrinkError::Compression)` - The compressor failed or timed out
pub async fn compress_artifact<C: Compressor>(
    compressor: &C,
    original: &OriginalArtifact,
    quality: u8,
    config: &PipelineConfig,
) -> Result<CompressionOutcome> {
    if !original.is_image() {
        return Err(ShrinkError::Validation {
            name: original.name().to_string(),
            media_type: original.media_type().to_string(),
        });
    }

    let options = CompressOptions::new(quality, original.media_type(), config)?;
    verbose!("Compression options: {:?}", options);

    let call = compressor.compress(Arc::clone(original.bytes()), &options);
    let bytes = match timeout(config.timeout, call).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(ShrinkError::Compression(reason))) => return Err(ShrinkError::Compression(reason)),
        Ok(Err(other)) => return Err(ShrinkError::Compression(other.to_string())),
        Err(_) => {
            return Err(ShrinkError::Compression(format!(
                "timed out after {:?}",
                config.timeout
            )))
        }
    };

    let artifact = CompressedArtifact::new(original.media_type(), bytes, original.len());
    let ratio = calculate_compression_ratio(original.len(), artifact.len());
    verbose!(
        "Compressed {} from {} to {} bytes",
        original.name(),
        original.len(),
        artifact.len()
    );

    Ok(CompressionOutcome { artifact, ratio })
}
