//! # edgequake-imgconv
//!
//! Re-encode images between PNG, JPEG and WebP, preview the result as a
//! data URI, and save it as `converted-image.<ext>`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! SourceFile
//!  │
//!  ├─ 1. Input   read the selected file's bytes (async, the only suspension)
//!  ├─ 2. Decode  sniff the format and decode within limits (spawn_blocking)
//!  ├─ 3. Render  blit onto a natural-size RGBA surface
//!  ├─ 4. Encode  surface → PNG / JPEG / WebP
//!  └─ 5. Output  ConvertedArtifact: data URI preview + download
//! ```
//!
//! ## Quick Start
//!
//! One-shot conversion:
//!
//! ```rust,no_run
//! use edgequake_imgconv::{convert, ConversionConfig, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .target_format(TargetFormat::Jpeg)
//!         .build()?;
//!     let output = convert("photo.png", &config).await?;
//!     eprintln!("{}x{} → {} bytes",
//!         output.artifact.width,
//!         output.artifact.height,
//!         output.stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! For an interactive shell (select file, pick format, convert, download),
//! drive a [`ConversionWorkflow`] and render its [`WorkflowView`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgconv` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod delivery;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod view;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_FILENAME_STEM};
pub use convert::{convert, convert_bytes, convert_sync, convert_to_file, inspect};
pub use delivery::{DirectorySink, DownloadSink};
pub use error::{ImgConvError, WorkflowFailure};
pub use format::TargetFormat;
pub use output::{ConversionOutput, ConversionStats, ConvertedArtifact, SourceInfo};
pub use source::{SourceFile, SourceOrigin};
pub use view::{ButtonSize, ButtonStyle, ButtonVariant, WorkflowView};
pub use workflow::{ConversionWorkflow, ConvertOutcome, WorkflowState};
