//! Presentation side of a session.
//!
//! The session keeps a [`ViewState`] that mirrors what a page would show
//! (readouts, previews, status line) and hands it to a [`Presenter`] after
//! every transition. Nothing here touches the pipeline.

use crate::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_FAILED_TEXT, COMPRESSION_RATIO_PREFIX, INFO_PREFIX,
    ORIGINAL_SIZE_PREFIX,
};
use crate::preview::Preview;
use crate::utils::create_progress_spinner;
use crate::{error, info, success, verbose, warn};
use indicatif::ProgressBar;
use std::fmt;
use std::time::Duration;

/// Pipeline state shown in the status area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Compressing,
    Done {
        ratio: String,
    },
    Failed {
        reason: String,
    },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Compressing => write!(f, "compressing"),
            Status::Done { ratio } => write!(f, "done (ratio {})", ratio),
            Status::Failed { reason } => write!(f, "failed ({})", reason),
        }
    }
}

/// Compressed-side size readout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SizeReadout {
    #[default]
    Empty,
    Value(String),
    Failed,
}

impl fmt::Display for SizeReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeReadout::Empty => Ok(()),
            SizeReadout::Value(size) => write!(f, "{}", size),
            SizeReadout::Failed => write!(f, "{}", COMPRESSION_FAILED_TEXT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub quality_readout: String,
    /// Compression section is revealed after the first successful pick.
    pub section_visible: bool,
    pub original_name: Option<String>,
    pub original_size: Option<String>,
    pub original_preview: Option<Preview>,
    pub compressed_size: SizeReadout,
    pub compressed_preview: Option<Preview>,
    pub compressed_loading: bool,
    pub ratio: Option<String>,
    pub status: Status,
}

impl ViewState {
    pub fn new(quality: u8) -> Self {
        Self {
            quality_readout: quality_readout(quality),
            section_visible: false,
            original_name: None,
            original_size: None,
            original_preview: None,
            compressed_size: SizeReadout::Empty,
            compressed_preview: None,
            compressed_loading: false,
            ratio: None,
            status: Status::Idle,
        }
    }

    pub fn download_enabled(&self) -> bool {
        matches!(self.compressed_size, SizeReadout::Value(_))
    }

    pub(crate) fn set_quality(&mut self, quality: u8) {
        self.quality_readout = quality_readout(quality);
    }

    pub(crate) fn load_original(&mut self, name: &str, size: String) {
        self.original_name = Some(name.to_string());
        self.original_size = Some(size);
        self.original_preview = None;
        self.status = Status::Idle;
        self.reset_compressed();
    }

    pub(crate) fn clear_original(&mut self) {
        self.original_name = None;
        self.original_size = None;
        self.original_preview = None;
        self.reset_compressed();
    }

    pub(crate) fn show_load_failure(&mut self, reason: String) {
        self.clear_original();
        self.status = Status::Failed { reason };
    }

    pub(crate) fn reset_compressed(&mut self) {
        self.compressed_size = SizeReadout::Empty;
        self.compressed_preview = None;
        self.compressed_loading = false;
        self.ratio = None;
    }

    pub(crate) fn start_compressing(&mut self) {
        self.compressed_loading = true;
        self.status = Status::Compressing;
    }

    pub(crate) fn show_compressed(&mut self, size: String, preview: Preview, ratio: String) {
        self.compressed_size = SizeReadout::Value(size);
        self.compressed_preview = Some(preview);
        self.compressed_loading = false;
        self.ratio = Some(ratio.clone());
        self.status = Status::Done { ratio };
    }

    pub(crate) fn show_failure(&mut self, reason: String) {
        self.compressed_size = SizeReadout::Failed;
        self.compressed_preview = None;
        self.compressed_loading = false;
        self.ratio = None;
        self.status = Status::Failed { reason };
    }
}

fn quality_readout(quality: u8) -> String {
    format!("{}%", quality)
}

/// Receives view updates and blocking notifications from a session.
pub trait Presenter {
    fn render(&mut self, view: &ViewState);

    /// A message the user has to acknowledge.
    fn alert(&mut self, message: &str);
}

/// Terminal presenter: prints readouts as they change and spins while a
/// compression is in flight.
#[derive(Default)]
pub struct ConsolePresenter {
    spinner: Option<ProgressBar>,
    last_status: Status,
    last_original: Option<(String, Preview)>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Presenter for ConsolePresenter {
    fn render(&mut self, view: &ViewState) {
        if let (Some(name), Some(size), Some(preview)) =
            (&view.original_name, &view.original_size, &view.original_preview)
        {
            let current = (name.clone(), preview.clone());
            if self.last_original.as_ref() != Some(&current) {
                info!("{} {}", INFO_PREFIX, name);
                info!("{} {} ({})", ORIGINAL_SIZE_PREFIX, size, preview);
                self.last_original = Some(current);
            }
        }

        if view.status == self.last_status {
            return;
        }
        self.last_status = view.status.clone();

        match &view.status {
            Status::Idle => self.stop_spinner(),
            Status::Compressing => {
                self.stop_spinner();
                let spinner =
                    create_progress_spinner(&format!("Compressing at {}...", view.quality_readout));
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
            Status::Done { .. } => {
                self.stop_spinner();
                info!("{} {}", COMPRESSED_SIZE_PREFIX, view.compressed_size);
                if let Some(ratio) = &view.ratio {
                    info!("{} {}", COMPRESSION_RATIO_PREFIX, ratio);
                }
                if let Some(preview) = &view.compressed_preview {
                    verbose!("Compressed preview: {} ({:.2} MP)", preview, preview.megapixels());
                }
                success!("{}", view.status);
            }
            Status::Failed { .. } => {
                self.stop_spinner();
                error!("{}", view.status);
            }
        }
    }

    fn alert(&mut self, message: &str) {
        self.stop_spinner();
        warn!("{}", message);
    }
}

impl Drop for ConsolePresenter {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
