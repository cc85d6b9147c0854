pub mod logger;

pub mod artifact;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod download;
pub mod error;
pub mod formats;
pub mod presenter;
pub mod preview;
pub mod processing;
pub mod session;
pub mod utils;
pub mod validation;

pub use artifact::{CompressedArtifact, OriginalArtifact};
pub use compressor::{CompressOptions, Compressor, ImageCompressor};
pub use config::PipelineConfig;
pub use download::save_download;
pub use error::{Result, ShrinkError};
pub use presenter::{ConsolePresenter, Presenter, SizeReadout, Status, ViewState};
pub use preview::{decode_preview, Preview};
pub use processing::{compress_artifact, CompressionOutcome};
pub use session::{Completion, CompressionTicket, Session};
pub use utils::{calculate_compression_ratio, format_file_size};
