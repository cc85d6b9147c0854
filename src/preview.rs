use crate::error::{Result, ShrinkError};
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageFormat, ImageReader, ImageResult};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// What a preview surface shows for a decoded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub color: String,
    pub format: Option<ImageFormat>,
}

impl Preview {
    pub fn megapixels(&self) -> f64 {
        (self.width as u64 * self.height as u64) as f64 / 1_000_000.0
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color)?;
        if let Some(format) = self.format {
            write!(f, " {:?}", format)?;
        }
        Ok(())
    }
}

/// Decodes `bytes` fully on the blocking pool.
///
/// Resolves once the whole image has decoded; any failure, including a
/// lost worker, is `ShrinkError::Decode`.
pub async fn decode_preview(bytes: Arc<[u8]>) -> Result<Preview> {
    tokio::task::spawn_blocking(move || decode_blocking(&bytes))
        .await
        .map_err(|e| ShrinkError::Decode(format!("preview task aborted: {}", e)))?
}

/// Decodes `bytes` and turns the pixels upright according to the EXIF
/// orientation tag, so width and height are the displayed ones.
pub fn decode_upright(bytes: &[u8]) -> ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

fn decode_blocking(bytes: &[u8]) -> Result<Preview> {
    let format = image::guess_format(bytes).ok();
    let img = decode_upright(bytes).map_err(|e| ShrinkError::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();

    Ok(Preview {
        width,
        height,
        color: format!("{:?}", img.color()),
        format,
    })
}

/// Splices a big-endian EXIF block holding only an Orientation tag right
/// after the JPEG start-of-image marker.
#[cfg(test)]
pub(crate) fn with_exif_orientation(jpeg: &[u8], orientation: u8) -> Vec<u8> {
    let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    app1.extend_from_slice(&[0x00, 0x01]);
    app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    app1.extend_from_slice(&[0x00, orientation, 0x00, 0x00]);
    app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
