#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_shrink::{CompressOptions, Compressor, OriginalArtifact, Presenter, Result, ShrinkError, ViewState};
use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    }))
}

pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut cursor, format)
        .unwrap();
    cursor.into_inner()
}

pub fn png_artifact(name: &str, width: u32, height: u32) -> OriginalArtifact {
    OriginalArtifact::new(name, "image/png", image_bytes(width, height, ImageFormat::Png))
}

pub fn write_image(dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, image_bytes(96, 64, format)).unwrap();
    path
}

/// Inserts an EXIF block whose only tag is Orientation after the JPEG SOI marker.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u8) -> Vec<u8> {
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x22]);
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(b"MM\0\x2A\0\0\0\x08");
    out.extend_from_slice(&[0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    out.extend_from_slice(&[0x00, orientation, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Records every view it is shown and every alert.
#[derive(Default)]
pub struct RecordingPresenter {
    pub frames: Vec<ViewState>,
    pub alerts: Vec<String>,
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &ViewState) {
        self.frames.push(view.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// Answers every call with a tiny PNG and remembers the options it saw.
#[derive(Default)]
pub struct StubCompressor {
    pub calls: RefCell<Vec<CompressOptions>>,
}

impl StubCompressor {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn qualities(&self) -> Vec<u8> {
        self.calls
            .borrow()
            .iter()
            .map(CompressOptions::quality_percent)
            .collect()
    }
}

impl Compressor for StubCompressor {
    async fn compress(&self, _data: Arc<[u8]>, options: &CompressOptions) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(options.clone());
        Ok(image_bytes(4, 4, ImageFormat::Png))
    }
}

/// Fails on chosen call numbers (1-based), succeeds otherwise.
pub struct FlakyCompressor {
    pub fail_on: Vec<usize>,
    pub calls: RefCell<usize>,
}

impl FlakyCompressor {
    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            fail_on,
            calls: RefCell::new(0),
        }
    }
}

impl Compressor for FlakyCompressor {
    async fn compress(&self, _data: Arc<[u8]>, _options: &CompressOptions) -> Result<Vec<u8>> {
        let call = {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            *calls
        };
        if self.fail_on.contains(&call) {
            return Err(ShrinkError::Compression("encoder ran out of memory".to_string()));
        }
        Ok(image_bytes(4, 4, ImageFormat::Png))
    }
}
