use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};

use pasfoto::{
    composition::{AspectPreset, BackgroundColor, CompositionModel},
    config::Config,
    export::{ExportOptions, Exporter},
    media::RawImage,
    removal::{CornerMatting, ProcessingState, RemovalOrchestrator},
};

#[derive(Parser)]
#[command(
    name = "pasfoto",
    version,
    about = "Compose ID-style photos with a replaced background",
    long_about = "pasfoto strips the background from a photo, places the cut-out subject \
over a solid background inside a fixed-aspect frame, and exports the composed frame as a JPEG."
)]
struct Cli {
    /// Input photo (PNG or JPEG)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path (defaults to the configured download name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frame ratio (1:1, 3:4, 2:3)
    #[arg(short, long)]
    aspect: Option<String>,

    /// Background color (white, blue, red)
    #[arg(short, long)]
    background: Option<String>,

    /// Horizontal subject offset in pixels (0-200)
    #[arg(long)]
    offset_x: Option<i32>,

    /// Vertical subject offset in pixels (0-200)
    #[arg(long)]
    offset_y: Option<i32>,

    /// Zoom factor (0.05-3.0)
    #[arg(short, long)]
    zoom: Option<f32>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting pasfoto v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    // Editor placement: config defaults, overridden by flags
    let mut model = CompositionModel::new(config.composition);
    if let Some(token) = &cli.aspect {
        let aspect: AspectPreset = token.parse().map_err(pasfoto::PasfotoError::from)?;
        model.set_aspect(aspect);
    }
    if let Some(token) = &cli.background {
        let background: BackgroundColor = token.parse().map_err(pasfoto::PasfotoError::from)?;
        model.set_background(background);
    }
    model.set_offset(cli.offset_x, cli.offset_y);
    if let Some(zoom) = cli.zoom {
        model.set_scale(zoom);
    }

    // Background removal
    let input = RawImage::open(&cli.input)?;
    let mut orchestrator = RemovalOrchestrator::new(CornerMatting::new(config.removal.matting));
    orchestrator.on_transition(|state| {
        if let ProcessingState::Removing { progress, phase } = state {
            info!("removing background: {:?} {}%", phase, progress);
        }
    });

    let subject = match orchestrator.process(input).await {
        ProcessingState::Ready { subject } => subject,
        ProcessingState::Failed { reason } => bail!("background removal failed: {}", reason),
        other => bail!("unexpected processing state: {:?}", other),
    };
    info!(
        "subject ready: {}x{} cut-out",
        subject.width(),
        subject.height()
    );

    // Compose and export
    let frame = model.render(Some(&subject));
    let mut exporter = Exporter::new(config.export.quality);
    let bytes = exporter
        .export(&frame, ExportOptions::default())
        .context("export failed")?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    std::fs::write(&output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        "photo saved to {:?} ({}x{}, {} background)",
        output,
        frame.width,
        frame.height,
        model.params().background
    );
    Ok(())
}
