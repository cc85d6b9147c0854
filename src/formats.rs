/// Media type handling
///
/// Files are typed the way a browser types a picked file: by extension. The
/// compressor keeps the media type of its input, so the encodable subset is
/// modelled as `OutputFormat`.
use crate::constants::FALLBACK_MEDIA_TYPE;
use crate::error::{Result, ShrinkError};
use image::ImageFormat;
use std::path::Path;

/// Media types the bundled compressor can write back out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy, quality-driven
    Jpeg,
    /// Lossless, quality picks the deflate effort
    Png,
    /// Lossless
    WebP,
}

impl OutputFormat {
    pub fn from_media_type(media_type: &str) -> Result<Self> {
        match media_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(OutputFormat::Jpeg),
            "image/png" => Ok(OutputFormat::Png),
            "image/webp" => Ok(OutputFormat::WebP),
            other => Err(ShrinkError::Compression(format!(
                "unsupported output type {}",
                other
            ))),
        }
    }

    /// Whether the quality setting changes the encoded pixels
    pub fn is_lossy(&self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }
}

/// Infers the media type of a file from its extension.
///
/// Image extensions known to the `image` crate map to their MIME type, a
/// handful of common document types map to theirs so that rejections name
/// something recognisable, and anything else is `application/octet-stream`.
pub fn media_type_for_path(path: &Path) -> String {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MEDIA_TYPE.to_string();
    };

    if let Some(format) = ImageFormat::from_extension(ext) {
        return format.to_mime_type().to_string();
    }

    let media_type = match ext.to_ascii_lowercase().as_str() {
        "heic" => "image/heic",
        "heif" => "image/heif",
        "jxl" => "image/jxl",
        "svg" => "image/svg+xml",
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => FALLBACK_MEDIA_TYPE,
    };
    media_type.to_string()
}

/// The acceptance test applied on selection: any `image/*` type passes.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_output_format_from_media_type() {
        assert_eq!(
            OutputFormat::from_media_type("image/jpeg").unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_media_type("IMAGE/PNG").unwrap(),
            OutputFormat::Png
        );
        assert_eq!(
            OutputFormat::from_media_type("image/webp").unwrap(),
            OutputFormat::WebP
        );

        for media_type in ["image/gif", "image/bmp", "image/avif"] {
            let result = OutputFormat::from_media_type(media_type);
            assert!(matches!(result, Err(ShrinkError::Compression(_))));
        }
    }

    #[test]
    fn test_output_format_lossy() {
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
        assert!(!OutputFormat::WebP.is_lossy());
    }

    #[test]
    fn test_media_type_for_path() {
        assert_eq!(media_type_for_path(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("photo.JPEG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("shot.png")), "image/png");
        assert_eq!(media_type_for_path(Path::new("anim.gif")), "image/gif");
        assert_eq!(media_type_for_path(Path::new("phone.heic")), "image/heic");
        assert_eq!(media_type_for_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            media_type_for_path(Path::new("README")),
            "application/octet-stream"
        );
        assert_eq!(
            media_type_for_path(Path::new("data.xyz")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_is_image_media_type() {
        assert!(is_image_media_type("image/png"));
        assert!(is_image_media_type("image/svg+xml"));
        assert!(!is_image_media_type("text/plain"));
        assert!(!is_image_media_type("application/octet-stream"));
        assert!(!is_image_media_type("img/png"));
    }
}
