//! CLI binary for edgequake-imgconv.
//!
//! A thin shim over the library crate: maps flags to `ConversionConfig`,
//! drives a `ConversionWorkflow` (select → convert → download) and prints
//! results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_imgconv::{
    convert_to_file, inspect, ConversionConfig, ConversionWorkflow, ConvertOutcome, DirectorySink,
    SourceFile, TargetFormat,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PNG (default) into ./converted-image.png
  imgconv photo.jpg

  # WebP into a specific directory
  imgconv --format webp photo.png -d out/

  # Explicit output path
  imgconv --format jpeg scan.png -o scan.jpeg

  # Print the data URI (for embedding in HTML/CSS)
  imgconv --format png --data-uri icon.bmp > icon.txt

  # Header-only inspection
  imgconv --inspect-only photo.webp

ENVIRONMENT VARIABLES:
  IMGCONV_FORMAT          Default target format (png, jpeg, webp)
  IMGCONV_OUTPUT_DIR      Default download directory
  RUST_LOG                Override log filter (e.g. edgequake_imgconv=debug)
"#;

/// Re-encode images between PNG, JPEG and WebP.
#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    version,
    about = "Re-encode images between PNG, JPEG and WebP",
    long_about = "Decode an image (PNG, JPEG, WebP, GIF, BMP), redraw it at its natural size and \
re-encode it as PNG, JPEG or WebP. The result is saved as converted-image.<ext> unless --output \
is given.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source image file.
    input: PathBuf,

    /// Target format.
    #[arg(short, long, env = "IMGCONV_FORMAT", value_enum, default_value = "png")]
    format: FormatArg,

    /// Write to this exact path instead of <dir>/converted-image.<ext>.
    #[arg(short, long, conflicts_with_all = ["output_dir", "json", "data_uri"])]
    output: Option<PathBuf>,

    /// Directory for the converted-image.<ext> download.
    #[arg(short = 'd', long, env = "IMGCONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Download filename stem.
    #[arg(long, env = "IMGCONV_FILENAME_STEM", default_value = edgequake_imgconv::DEFAULT_FILENAME_STEM)]
    filename_stem: String,

    /// Largest accepted source file, in bytes.
    #[arg(long, env = "IMGCONV_MAX_SOURCE_BYTES", default_value_t = 64 * 1024 * 1024)]
    max_source_bytes: u64,

    /// Largest accepted width or height, in pixels.
    #[arg(long, env = "IMGCONV_MAX_DIMENSION", default_value_t = 16_384)]
    max_dimension: u32,

    /// Print the artifact as a data URI on stdout instead of saving it.
    #[arg(long)]
    data_uri: bool,

    /// Output structured JSON (artifact + stats) on stdout.
    #[arg(long, conflicts_with = "data_uri")]
    json: bool,

    /// Print image header info only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMGCONV_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Webp,
}

impl From<FormatArg> for TargetFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => TargetFormat::Png,
            FormatArg::Jpeg => TargetFormat::Jpeg,
            FormatArg::Webp => TargetFormat::WebP,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&cli.input).await.context("Failed to inspect image")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize image info")?
            );
        } else {
            println!("File:         {}", info.name);
            if let Some(ref f) = info.detected_format {
                println!("Format:       {}", f);
            }
            if let Some(ref m) = info.mime_type {
                println!("MIME type:    {}", m);
            }
            println!("Dimensions:   {}x{}", info.width, info.height);
            println!("Size:         {} bytes", info.byte_len);
        }
        return Ok(());
    }

    let config = build_config(&cli)?;

    // ── Explicit output path ─────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let output = convert_to_file(&cli.input, output_path, &config)
            .await
            .context("Conversion failed")?;
        if !cli.quiet {
            eprintln!(
                "{}  {}x{}  {} bytes  {}ms  →  {}",
                green("✔"),
                output.artifact.width,
                output.artifact.height,
                output.stats.output_bytes,
                output.stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    // ── Workflow: select → convert → preview/download ────────────────────
    let workflow = ConversionWorkflow::new(config);
    workflow.select_file(SourceFile::from_path(&cli.input));

    let (artifact, stats) = match workflow.convert().await.context("Conversion failed")? {
        ConvertOutcome::Converted { artifact, stats } => (artifact, stats),
        ConvertOutcome::NoSourceSelected => anyhow::bail!("No input file selected"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "artifact": artifact,
            "stats": stats,
        }))
        .context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if cli.data_uri {
        if let Some(uri) = workflow.preview() {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{uri}").context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    let sink = DirectorySink::new(&cli.output_dir);
    let saved = workflow
        .download(&sink)
        .context("Failed to save converted image")?;

    if let (Some(filename), false) = (saved, cli.quiet) {
        eprintln!(
            "{}  {}x{}  {} → {}  {}ms  →  {}",
            green("✔"),
            artifact.width,
            artifact.height,
            stats.source_format.as_deref().unwrap_or("?"),
            artifact.format.label(),
            stats.total_duration_ms,
            bold(&sink.path_for(&filename).display().to_string()),
        );
        eprintln!(
            "   {} bytes in  /  {} bytes out",
            dim(&stats.source_bytes.to_string()),
            dim(&stats.output_bytes.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    ConversionConfig::builder()
        .target_format(cli.format.into())
        .filename_stem(cli.filename_stem.clone())
        .max_source_bytes(cli.max_source_bytes)
        .max_image_dimension(cli.max_dimension)
        .build()
        .context("Invalid configuration")
}
