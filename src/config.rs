use crate::constants::{
    DEFAULT_QUALITY, DEFAULT_TIMEOUT_SECS, MAX_DIMENSION_PX, MAX_OUTPUT_BYTES, MAX_QUALITY,
    MIN_QUALITY,
};
use crate::error::{Result, ShrinkError};
use std::time::Duration;

/// Runtime settings for a session and its pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub default_quality: u8,
    pub max_output_bytes: u64,
    pub max_dimension_px: u32,
    /// Upper bound on a single compressor call.
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            max_output_bytes: MAX_OUTPUT_BYTES,
            max_dimension_px: MAX_DIMENSION_PX,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    pub fn new(quality: Option<u8>, timeout_secs: Option<u64>) -> Result<Self> {
        let default_quality = validate_quality(quality.unwrap_or(DEFAULT_QUALITY))?;
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ShrinkError::InvalidTimeout(timeout_secs));
        }
        let timeout = Duration::from_secs(timeout_secs);

        Ok(Self {
            default_quality,
            timeout,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub fn validate_quality(quality: u8) -> Result<u8> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(ShrinkError::InvalidQuality(quality));
    }
    Ok(quality)
}
