//! Session controller.
//!
//! A [`Session`] owns everything a user interaction touches: the picked
//! file, the current compressed result, the quality setting and the view.
//! It runs on a single thread; the only suspension points are preview
//! decoding and the compressor call.
//!
//! Every compression start takes a new generation number and only the run
//! holding the current generation may publish its result. Picking another
//! file also advances the generation, so a slow run for an old file or an
//! old quality value can never overwrite newer state.

use crate::artifact::{CompressedArtifact, OriginalArtifact};
use crate::compressor::Compressor;
use crate::config::{validate_quality, PipelineConfig};
use crate::constants::{COMPRESSION_FAILED_ALERT, LOAD_FAILED_ALERT, NOT_AN_IMAGE_ALERT};
use crate::download::save_download;
use crate::error::{Result, ShrinkError};
use crate::presenter::{Presenter, ViewState};
use crate::preview::{decode_preview, Preview};
use crate::processing::{compress_artifact, CompressionOutcome};
use crate::utils::format_file_size;
use crate::verbose;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Claim on one compression run, issued by [`Session::begin_compression`].
#[derive(Debug, Clone)]
pub struct CompressionTicket {
    generation: u64,
    original: Arc<OriginalArtifact>,
    quality: u8,
}

impl CompressionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn original(&self) -> &OriginalArtifact {
        &self.original
    }
}

/// A finished run, ready to be published.
#[derive(Debug, Clone)]
pub struct CompressedRun {
    pub outcome: CompressionOutcome,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The run was published; carries the ratio.
    Applied { ratio: f64 },
    /// A newer run or a newer file took over; nothing changed.
    Superseded,
    /// No file selected, so nothing ran.
    Skipped,
}

pub struct Session<C, P> {
    compressor: C,
    presenter: P,
    config: PipelineConfig,
    quality: u8,
    original: Option<Arc<OriginalArtifact>>,
    compressed: Option<CompressedArtifact>,
    generation: u64,
    view: ViewState,
}

impl<C: Compressor, P: Presenter> Session<C, P> {
    pub fn new(compressor: C, presenter: P, config: PipelineConfig) -> Self {
        let quality = config.default_quality;
        Self {
            compressor,
            presenter,
            config,
            quality,
            original: None,
            compressed: None,
            generation: 0,
            view: ViewState::new(quality),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn original(&self) -> Option<&OriginalArtifact> {
        self.original.as_deref()
    }

    pub fn compressed(&self) -> Option<&CompressedArtifact> {
        self.compressed.as_ref()
    }

    /// Takes a newly picked file and compresses it at the current quality.
    ///
    /// Non-images are rejected with an alert and leave the session exactly
    /// as it was. Otherwise the previous file and its result are dropped
    /// before anything is awaited.
    pub async fn select_file(&mut self, original: OriginalArtifact) -> Result<Completion> {
        if !original.is_image() {
            self.presenter.alert(NOT_AN_IMAGE_ALERT);
            return Err(ShrinkError::Validation {
                name: original.name().to_string(),
                media_type: original.media_type().to_string(),
            });
        }

        self.generation += 1;
        let original = Arc::new(original);
        self.original = Some(Arc::clone(&original));
        self.compressed = None;
        self.view
            .load_original(original.name(), format_file_size(original.len()));
        self.presenter.render(&self.view);

        match decode_preview(Arc::clone(original.bytes())).await {
            Ok(preview) => self.view.original_preview = Some(preview),
            Err(err) => {
                self.original = None;
                self.view.show_load_failure(err.reason());
                self.presenter.render(&self.view);
                self.presenter.alert(LOAD_FAILED_ALERT);
                return Err(err);
            }
        }

        self.view.section_visible = true;
        self.presenter.render(&self.view);
        self.compress().await
    }

    /// Moves the quality slider; re-compresses once if a file is selected.
    pub async fn set_quality(&mut self, quality: u8) -> Result<Completion> {
        let quality = validate_quality(quality)?;
        self.quality = quality;
        self.view.set_quality(quality);
        self.presenter.render(&self.view);
        self.compress().await
    }

    /// Runs the pipeline for the current file and quality.
    pub async fn compress(&mut self) -> Result<Completion> {
        let Some(ticket) = self.begin_compression() else {
            return Ok(Completion::Skipped);
        };
        let result = self.execute(&ticket).await;
        self.finish_compression(ticket, result)
    }

    /// Starts a run: claims the next generation and shows the loading state.
    pub fn begin_compression(&mut self) -> Option<CompressionTicket> {
        let original = Arc::clone(self.original.as_ref()?);
        self.generation += 1;
        self.view.start_compressing();
        self.presenter.render(&self.view);

        Some(CompressionTicket {
            generation: self.generation,
            original,
            quality: self.quality,
        })
    }

    /// Does the work for a ticket without touching session state.
    pub async fn execute(&self, ticket: &CompressionTicket) -> Result<CompressedRun> {
        let outcome =
            compress_artifact(&self.compressor, &ticket.original, ticket.quality, &self.config)
                .await?;
        let preview = decode_preview(Arc::clone(outcome.artifact.bytes()))
            .await
            .map_err(|e| ShrinkError::Compression(format!("result does not decode: {}", e.reason())))?;

        Ok(CompressedRun { outcome, preview })
    }

    /// Publishes a run if its ticket is still current.
    ///
    /// Failures of a current run invalidate the compressed result, show the
    /// failure readout and raise an alert; the error is returned as well.
    pub fn finish_compression(
        &mut self,
        ticket: CompressionTicket,
        result: Result<CompressedRun>,
    ) -> Result<Completion> {
        if ticket.generation != self.generation {
            verbose!(
                "Discarding run #{} (current is #{})",
                ticket.generation,
                self.generation
            );
            return Ok(Completion::Superseded);
        }

        match result {
            Ok(run) => {
                let ratio = run.outcome.ratio;
                self.view.show_compressed(
                    format_file_size(run.outcome.artifact.len()),
                    run.preview,
                    run.outcome.ratio_text(),
                );
                self.compressed = Some(run.outcome.artifact);
                self.presenter.render(&self.view);
                Ok(Completion::Applied { ratio })
            }
            Err(err) => {
                self.compressed = None;
                self.view.show_failure(err.reason());
                self.presenter.render(&self.view);
                self.presenter.alert(COMPRESSION_FAILED_ALERT);
                Err(err)
            }
        }
    }

    /// Saves the current compressed result into `dir`.
    ///
    /// # Returns
    /// * `Ok(Some(path))` - Where the file landed
    /// * `Ok(None)` - Nothing compressed yet; no file is written
    pub fn download(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let (Some(compressed), Some(original)) = (&self.compressed, &self.original) else {
            return Ok(None);
        };
        save_download(compressed, original.name(), dir).map(Some)
    }
}
