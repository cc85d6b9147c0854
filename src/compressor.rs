use crate::config::{validate_quality, PipelineConfig};
use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_QUALITY, MAX_SHRINK_ITERATIONS,
    MIN_QUALITY, OXIPNG_PRESET, SHRINK_FACTOR, ZOPFLI_ITERATIONS,
};
use crate::error::{Result, ShrinkError};
use crate::formats::OutputFormat;
use crate::preview::decode_upright;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};
use oxipng::{Deflaters, Options};
use std::num::NonZeroU8;
use std::sync::Arc;

/// Parameters handed to a [`Compressor`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOptions {
    pub max_output_bytes: u64,
    pub max_dimension_px: u32,
    /// `quality / 100`, in `(0, 1]`.
    pub quality_fraction: f32,
    /// Media type of the input, kept for the output.
    pub media_type: String,
}

impl CompressOptions {
    pub fn new(quality: u8, media_type: &str, config: &PipelineConfig) -> Result<Self> {
        let quality = validate_quality(quality)?;
        Ok(Self {
            max_output_bytes: config.max_output_bytes,
            max_dimension_px: config.max_dimension_px,
            quality_fraction: f32::from(quality) / 100.0,
            media_type: media_type.to_string(),
        })
    }

    pub fn quality_percent(&self) -> u8 {
        quality_percent(self.quality_fraction)
    }
}

fn quality_percent(fraction: f32) -> u8 {
    (fraction * 100.0)
        .round()
        .clamp(f32::from(MIN_QUALITY), f32::from(MAX_QUALITY)) as u8
}

/// The image re-encoding capability the pipeline delegates to.
///
/// Implementations resolve once with the encoded bytes or fail with
/// `ShrinkError::Compression`.
#[allow(async_fn_in_trait)]
pub trait Compressor {
    async fn compress(&self, data: Arc<[u8]>, options: &CompressOptions) -> Result<Vec<u8>>;
}

/// Compressor backed by the `image` codecs and `oxipng`.
///
/// Work runs on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor;

impl Compressor for ImageCompressor {
    async fn compress(&self, data: Arc<[u8]>, options: &CompressOptions) -> Result<Vec<u8>> {
        let options = options.clone();
        tokio::task::spawn_blocking(move || compress_bytes(&data, &options))
            .await
            .map_err(|e| ShrinkError::Compression(format!("compression task aborted: {}", e)))?
    }
}

/// Synchronous core of [`ImageCompressor`]: decode upright -> fit -> encode, then
/// shrink until the output fits under `max_output_bytes`.
///
/// # Returns
/// * The encoded image, or the untouched input when re-encoding would not
///   make it smaller and no resize was needed
/// * `Err(ShrinkError::Compression)` for unreadable input, unsupported
///   media types, or output that stays above the ceiling
pub fn compress_bytes(data: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    let format = OutputFormat::from_media_type(&options.media_type)?;

    let mut img = decode_upright(data)
        .map_err(|e| ShrinkError::Compression(format!("cannot read source image: {}", e)))?;

    let resized = fit_within(&mut img, options.max_dimension_px);
    let mut quality = options.quality_fraction;
    let mut encoded = encode_image(&img, format, quality)?;

    let same_format = image::guess_format(data).ok() == Some(format.to_image_format());
    if same_format
        && !resized
        && encoded.len() >= data.len()
        && data.len() as u64 <= options.max_output_bytes
    {
        return Ok(data.to_vec());
    }

    let mut iteration = 0;
    while encoded.len() as u64 > options.max_output_bytes {
        if iteration >= MAX_SHRINK_ITERATIONS {
            return Err(ShrinkError::Compression(format!(
                "output is still {} bytes after {} attempts (limit {} bytes)",
                encoded.len(),
                MAX_SHRINK_ITERATIONS,
                options.max_output_bytes
            )));
        }
        iteration += 1;

        let (width, height) = img.dimensions();
        let width = ((width as f32 * SHRINK_FACTOR) as u32).max(1);
        let height = ((height as f32 * SHRINK_FACTOR) as u32).max(1);
        img = img.resize_exact(width, height, FilterType::Lanczos3);
        if format.is_lossy() {
            quality *= SHRINK_FACTOR;
        }
        encoded = encode_image(&img, format, quality)?;
    }

    Ok(encoded)
}

/// Downscales `img` so that its longer side is at most `max_dimension`,
/// keeping the aspect ratio. Returns whether a resize happened.
pub fn fit_within(img: &mut DynamicImage, max_dimension: u32) -> bool {
    let (width, height) = img.dimensions();
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return false;
    }
    *img = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    true
}

pub fn encode_image(img: &DynamicImage, format: OutputFormat, quality_fraction: f32) -> Result<Vec<u8>> {
    let quality = quality_percent(quality_fraction);
    let mut buf = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
                .map_err(encode_error)?;
        }
        OutputFormat::Png => {
            img.write_with_encoder(PngEncoder::new(&mut buf))
                .map_err(encode_error)?;
            buf = optimize_png(&buf, quality)?;
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
                .map_err(encode_error)?;
        }
    }

    Ok(buf)
}

fn optimize_png(png: &[u8], quality: u8) -> Result<Vec<u8>> {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    // higher quality buys more deflate effort, never lossy changes
    options.deflate = if quality >= 90 {
        NonZeroU8::new(ZOPFLI_ITERATIONS).map_or(
            Deflaters::Libdeflater {
                compression: LIBDEFLATER_HIGH_LEVEL,
            },
            |iterations| Deflaters::Zopfli { iterations },
        )
    } else if quality >= 70 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    oxipng::optimize_from_memory(png, &options)
        .map_err(|e| ShrinkError::Compression(format!("PNG optimization failed: {}", e)))
}

fn encode_error(err: ImageError) -> ShrinkError {
    ShrinkError::Compression(format!("encoding failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn encoded(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, format).unwrap();
        cursor.into_inner()
    }

    fn options(quality: u8, media_type: &str) -> CompressOptions {
        CompressOptions::new(quality, media_type, &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_options_from_quality() {
        let opts = options(80, "image/jpeg");
        assert_eq!(opts.max_output_bytes, 10 * 1024 * 1024);
        assert_eq!(opts.max_dimension_px, 1920);
        assert!((opts.quality_fraction - 0.8).abs() < f32::EPSILON);
        assert_eq!(opts.quality_percent(), 80);
        assert_eq!(opts.media_type, "image/jpeg");
    }

    #[test]
    fn test_options_reject_out_of_range_quality() {
        let config = PipelineConfig::default();
        assert!(matches!(
            CompressOptions::new(0, "image/png", &config),
            Err(ShrinkError::InvalidQuality(0))
        ));
        assert!(matches!(
            CompressOptions::new(101, "image/png", &config),
            Err(ShrinkError::InvalidQuality(101))
        ));
    }

    #[test]
    fn test_quality_percent_clamps() {
        assert_eq!(quality_percent(0.0), 1);
        assert_eq!(quality_percent(0.004), 1);
        assert_eq!(quality_percent(1.5), 100);
    }

    #[test]
    fn test_fit_within_landscape() {
        let mut img = gradient(4000, 2000);
        assert!(fit_within(&mut img, 1920));
        assert_eq!(img.dimensions(), (1920, 960));
    }

    #[test]
    fn test_fit_within_portrait() {
        let mut img = gradient(1000, 3840);
        assert!(fit_within(&mut img, 1920));
        assert_eq!(img.dimensions(), (500, 1920));
    }

    #[test]
    fn test_fit_within_small_image_untouched() {
        let mut img = gradient(1920, 1080);
        assert!(!fit_within(&mut img, 1920));
        assert_eq!(img.dimensions(), (1920, 1080));
    }

    #[test]
    fn test_compress_jpeg_low_quality_shrinks() {
        let source = encoded(&gradient(640, 480), ImageFormat::Jpeg);
        let output = compress_bytes(&source, &options(20, "image/jpeg")).unwrap();

        assert!(output.len() < source.len());
        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_compress_returns_source_when_not_smaller() {
        let img = gradient(320, 240);
        let mut source = Vec::new();
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut source, 10))
            .unwrap();

        let output = compress_bytes(&source, &options(100, "image/jpeg")).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_compress_resizes_large_image() {
        let source = encoded(&gradient(2400, 300), ImageFormat::Png);
        let output = compress_bytes(&source, &options(60, "image/png")).unwrap();

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (1920, 240));
        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_compress_keeps_webp_type() {
        let source = encoded(&gradient(64, 64), ImageFormat::Png);
        let output = compress_bytes(&source, &options(80, "image/webp")).unwrap();
        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_compress_shrinks_under_ceiling() {
        let mut source = Vec::new();
        DynamicImage::ImageRgb8(gradient(800, 800).to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut source, 100))
            .unwrap();
        let decoded_source = image::load_from_memory(&source).unwrap();
        let first_pass = encode_image(&decoded_source, OutputFormat::Jpeg, 0.8).unwrap();

        let mut opts = options(80, "image/jpeg");
        opts.max_output_bytes = (first_pass.len() as u64 * 95) / 100;

        let output = compress_bytes(&source, &opts).unwrap();
        assert!(output.len() as u64 <= opts.max_output_bytes);
        let decoded = image::load_from_memory(&output).unwrap();
        assert!(decoded.width() < 800);
    }

    #[test]
    fn test_compress_gives_up_above_ceiling() {
        let source = encoded(&gradient(200, 200), ImageFormat::Png);
        let mut opts = options(80, "image/jpeg");
        opts.max_output_bytes = 1;

        let result = compress_bytes(&source, &opts);
        assert!(matches!(result, Err(ShrinkError::Compression(_))));
    }

    #[test]
    fn test_compress_unsupported_media_type() {
        let source = encoded(&gradient(16, 16), ImageFormat::Png);
        let result = compress_bytes(&source, &options(80, "image/gif"));
        assert!(matches!(result, Err(ShrinkError::Compression(msg)) if msg.contains("image/gif")));
    }

    #[test]
    fn test_compress_avif_is_unsupported() {
        let source = encoded(&gradient(16, 16), ImageFormat::Png);
        let result = compress_bytes(&source, &options(80, "image/avif"));
        assert!(matches!(result, Err(ShrinkError::Compression(msg)) if msg.contains("image/avif")));
    }

    #[test]
    fn test_compress_rotates_exif_oriented_jpeg() {
        let mut plain = Vec::new();
        DynamicImage::ImageRgb8(gradient(120, 60).to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut plain, 100))
            .unwrap();
        let source = crate::preview::with_exif_orientation(&plain, 6);

        let output = compress_bytes(&source, &options(20, "image/jpeg")).unwrap();

        assert!(output.len() < source.len());
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (60, 120));
    }

    #[test]
    fn test_compress_garbage_input() {
        let result = compress_bytes(b"definitely not pixels", &options(80, "image/jpeg"));
        assert!(matches!(result, Err(ShrinkError::Compression(_))));
    }

    #[tokio::test]
    async fn test_image_compressor_async() {
        let source: Arc<[u8]> = encoded(&gradient(128, 96), ImageFormat::Png).into();
        let output = ImageCompressor
            .compress(Arc::clone(&source), &options(50, "image/png"))
            .await
            .unwrap();
        assert!(output.len() <= source.len());
    }
}
