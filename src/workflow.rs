//! The conversion workflow: selection state plus the convert/download loop.
//!
//! [`WorkflowState`] is a plain, serialisable state machine. Its transitions
//! are synchronous and can be tested without touching a decoder:
//!
//! | Transition | Source | Target format | Artifact | Last failure |
//! |------------|--------|---------------|----------|--------------|
//! | `select_file` | replaced | unchanged | cleared | cleared |
//! | `select_target_format` | unchanged | replaced | unchanged | unchanged |
//! | `publish` (same generation) | unchanged | unchanged | replaced | cleared |
//! | `record_failure` | unchanged | unchanged | unchanged | set |
//!
//! [`ConversionWorkflow`] wraps the state for a UI shell. Its `convert()`
//! snapshots the source and target format, runs the pipeline without holding
//! the lock, then publishes only if no new file was selected meanwhile, so
//! a stored artifact always derives from the currently selected source.
//! Overlapping `convert()` calls are rejected rather than queued.

use crate::config::ConversionConfig;
use crate::convert::convert_source;
use crate::delivery::DownloadSink;
use crate::error::{ImgConvError, WorkflowFailure};
use crate::format::TargetFormat;
use crate::output::{ConversionStats, ConvertedArtifact};
use crate::source::SourceFile;
use crate::view::WorkflowView;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Selected file, target format, converted artifact and last failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    source: Option<SourceFile>,
    target_format: TargetFormat,
    artifact: Option<ConvertedArtifact>,
    last_failure: Option<WorkflowFailure>,
    /// Bumped on every `select_file`; a conversion publishes only into the
    /// generation it started from.
    #[serde(default)]
    source_generation: u64,
}

impl WorkflowState {
    /// Empty state with `target_format` preselected.
    pub fn new(target_format: TargetFormat) -> Self {
        Self {
            target_format,
            ..Self::default()
        }
    }

    /// Replace the source and drop anything derived from the old one.
    pub fn select_file(&mut self, file: SourceFile) {
        self.source = Some(file);
        self.artifact = None;
        self.last_failure = None;
        self.source_generation = self.source_generation.wrapping_add(1);
    }

    /// Change the target format. An existing artifact stays as it is.
    pub fn select_target_format(&mut self, format: TargetFormat) {
        self.target_format = format;
    }

    /// Store `artifact` if `generation` is still current. Returns whether it
    /// was stored.
    pub fn publish(&mut self, artifact: ConvertedArtifact, generation: u64) -> bool {
        if generation != self.source_generation {
            return false;
        }
        self.artifact = Some(artifact);
        self.last_failure = None;
        true
    }

    /// Record a failed conversion for `generation`. The prior artifact is kept.
    pub fn record_failure(&mut self, failure: WorkflowFailure, generation: u64) -> bool {
        if generation != self.source_generation {
            return false;
        }
        self.last_failure = Some(failure);
        true
    }

    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    pub fn artifact(&self) -> Option<&ConvertedArtifact> {
        self.artifact.as_ref()
    }

    pub fn last_failure(&self) -> Option<&WorkflowFailure> {
        self.last_failure.as_ref()
    }

    pub fn source_generation(&self) -> u64 {
        self.source_generation
    }
}

/// What a `convert()` call did.
#[derive(Debug, Clone)]
pub enum ConvertOutcome {
    /// No file selected; nothing happened.
    NoSourceSelected,
    /// A new artifact was produced and published.
    Converted {
        artifact: ConvertedArtifact,
        stats: ConversionStats,
    },
}

/// Thread-safe workflow for a UI shell.
///
/// # Example
/// ```rust,no_run
/// use edgequake_imgconv::{ConversionConfig, ConversionWorkflow, DirectorySink, SourceFile, TargetFormat};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let workflow = ConversionWorkflow::new(ConversionConfig::default());
/// workflow.select_file(SourceFile::from_path("photo.png"));
/// workflow.select_target_format(TargetFormat::Jpeg);
/// workflow.convert().await?;
/// workflow.download(&DirectorySink::new("."))?; // ./converted-image.jpeg
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConversionWorkflow {
    config: ConversionConfig,
    state: Mutex<WorkflowState>,
    in_flight: AtomicBool,
}

impl ConversionWorkflow {
    pub fn new(config: ConversionConfig) -> Self {
        let state = WorkflowState::new(config.target_format);
        Self::with_state(config, state)
    }

    /// Resume from a previously serialised state.
    pub fn with_state(config: ConversionConfig, state: WorkflowState) -> Self {
        Self {
            config,
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn select_file(&self, file: SourceFile) {
        debug!("Selected source '{}'", file.name());
        self.lock().select_file(file);
    }

    pub fn select_target_format(&self, format: TargetFormat) {
        debug!("Selected target format {}", format);
        self.lock().select_target_format(format);
    }

    /// Convert the selected source into the selected format.
    ///
    /// # Returns
    /// - `Ok(NoSourceSelected)` when no file is selected (state untouched)
    /// - `Ok(Converted { .. })` when a new artifact was published
    ///
    /// # Errors
    /// - [`ImgConvError::ConversionInProgress`] if another call is running
    /// - [`ImgConvError::SourceChanged`] if a new file was selected meanwhile
    /// - any pipeline error; it is also recorded as
    ///   [`WorkflowState::last_failure`] and the previous artifact is kept
    pub async fn convert(&self) -> Result<ConvertOutcome, ImgConvError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let (source, format, generation) = {
            let state = self.lock();
            match state.source() {
                None => {
                    debug!("convert() with no source selected; ignoring");
                    return Ok(ConvertOutcome::NoSourceSelected);
                }
                Some(src) => (src.clone(), state.target_format(), state.source_generation()),
            }
        };

        match convert_source(&source, format, &self.config).await {
            Ok(output) => {
                if !self.lock().publish(output.artifact.clone(), generation) {
                    warn!("Source changed while converting '{}'; discarding result", source.name());
                    return Err(ImgConvError::SourceChanged);
                }
                Ok(ConvertOutcome::Converted {
                    artifact: output.artifact,
                    stats: output.stats,
                })
            }
            Err(e) => {
                warn!("Conversion of '{}' failed: {}", source.name(), e);
                self.lock().record_failure(WorkflowFailure::from(&e), generation);
                Err(e)
            }
        }
    }

    /// Save the current artifact through `sink` as `<stem>.<ext>`.
    ///
    /// Returns `Ok(None)` without calling the sink when there is no artifact,
    /// otherwise the filename that was saved.
    pub fn download(&self, sink: &dyn DownloadSink) -> Result<Option<String>, ImgConvError> {
        let Some(artifact) = self.lock().artifact().cloned() else {
            debug!("download() with no artifact; ignoring");
            return Ok(None);
        };
        let filename = artifact.file_name(&self.config.filename_stem);
        sink.save(&filename, &artifact)?;
        info!("Downloaded {} ({} bytes)", filename, artifact.byte_len());
        Ok(Some(filename))
    }

    /// Data URI of the current artifact, for display.
    pub fn preview(&self) -> Option<String> {
        self.lock().artifact().map(ConvertedArtifact::data_uri)
    }

    /// Whether a `convert()` call is running.
    pub fn is_converting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the current state, e.g. for persistence.
    pub fn snapshot(&self) -> WorkflowState {
        self.lock().clone()
    }

    /// Control gating and display data for a UI shell.
    pub fn view(&self) -> WorkflowView {
        WorkflowView::new(&self.lock(), self.is_converting())
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        // State transitions never panic midway, so a poisoned lock still
        // holds a consistent state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds the in-flight flag for the duration of one `convert()`.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ImgConvError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ImgConvError::ConversionInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
