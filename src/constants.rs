pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Ceiling handed to the compressor for the encoded output (10 MiB).
pub const MAX_OUTPUT_BYTES: u64 = 10 * 1024 * 1024;
/// Longest side of the compressed image, in pixels.
pub const MAX_DIMENSION_PX: u32 = 1920;

/// Largest file accepted from disk (100 MiB).
pub const MAX_INPUT_BYTES: u64 = 100 * 1024 * 1024;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Size-ceiling search
pub const SHRINK_FACTOR: f32 = 0.9;
pub const MAX_SHRINK_ITERATIONS: u32 = 10;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const DOWNLOAD_PREFIX: &str = "compressed_";
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const INFO_PREFIX: &str = "📋";

pub const COMPRESSION_FAILED_TEXT: &str = "Compression failed";
pub const COMPRESSION_FAILED_ALERT: &str = "Image compression failed, please try again!";
pub const NOT_AN_IMAGE_ALERT: &str = "Please choose an image file!";
pub const LOAD_FAILED_ALERT: &str = "Could not load that file, please try again!";
