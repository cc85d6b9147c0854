/// Utility functions for common operations
///
/// Size and ratio formatting shared by the pipeline, the session view and
/// the console presenter.
use crate::constants::{DOWNLOAD_PREFIX, PROGRESS_SPINNER_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Create a progress spinner with consistent styling
///
/// # Arguments
/// * `message` - Initial message to display
///
/// # Returns
/// * Configured `ProgressBar`, hidden when quiet mode is on
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(PROGRESS_SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}

/// Format file size in human-readable format
///
/// Steps by 1024 through B, KB, MB and GB and stops at GB, always with two
/// decimals.
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.50 KB", "5120.00 GB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Calculate compression ratio as a percentage, rounded to one decimal
///
/// # Arguments
/// * `original_size` - Original size in bytes
/// * `compressed_size` - Compressed size in bytes
///
/// # Returns
/// * Percentage reduction (negative when the output grew); `0.0` for an
///   empty original
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
    let rounded = (ratio * 10.0).round() / 10.0;
    // folds -0.0 into 0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{:.1}%", ratio)
}

/// Name under which a compressed copy is saved: `compressed_<file name>`.
///
/// Only the final path component of `original_name` is kept.
pub fn download_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{}{}", DOWNLOAD_PREFIX, base)
}
