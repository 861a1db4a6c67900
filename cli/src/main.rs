use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cv_core::Rect;
use cv_video::{MeanShiftTracker, Tracker, TrackerConfig};
use cv_videoio::{open_video, VideoCapture};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "cv-track",
    version,
    about = "Track a colored region through a frame sequence with mean-shift",
    long_about = None
)]
struct Cli {
    /// Image-sequence directory or animated GIF
    #[arg(short, long)]
    input: PathBuf,

    /// Initial target rectangle in the first frame: x,y,width,height
    #[arg(short, long)]
    roi: Rect,

    /// JSON file with tracker settings (num_bins, intensity_range, max_iterations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Histogram bins per channel (overrides the config file)
    #[arg(long)]
    bins: Option<usize>,

    /// Intensity levels per channel (overrides the config file)
    #[arg(long)]
    range: Option<u32>,

    /// Mean-shift iterations per frame (overrides the config file)
    #[arg(long)]
    max_iter: Option<usize>,

    /// Write JSON-lines results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// One line of output per frame.
#[derive(Serialize)]
struct TrackRecord {
    frame: usize,
    rect: Rect,
    iterations: usize,
    converged: bool,
    similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Respect RUST_LOG; default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut source = open_video(&cli.input)
        .with_context(|| format!("failed to open input: {}", cli.input.display()))?;

    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = BufWriter::new(sink);

    run(source.as_mut(), cli.roi, config, &mut sink)?;
    sink.flush().context("failed to flush output")?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config: {}", path.display()))?
        }
        None => TrackerConfig::default(),
    };

    if let Some(bins) = cli.bins {
        config = config.with_num_bins(bins);
    }
    if let Some(range) = cli.range {
        config = config.with_intensity_range(range);
    }
    if let Some(max_iter) = cli.max_iter {
        config = config.with_max_iterations(max_iter);
    }
    Ok(config)
}

// ── Tracking loop ─────────────────────────────────────────────────────────────

fn run(
    source: &mut dyn VideoCapture,
    roi: Rect,
    config: TrackerConfig,
    sink: &mut dyn Write,
) -> Result<()> {
    let mut tracker = MeanShiftTracker::new(config).context("invalid tracker configuration")?;

    let first = source.read().context("failed to read the first frame")?;
    info!(
        width = first.width(),
        height = first.height(),
        roi = %roi,
        "initializing tracker"
    );
    tracker
        .initialize(&first, roi)
        .context("failed to initialize tracker")?;
    emit(
        sink,
        &TrackRecord {
            frame: 0,
            rect: roi,
            iterations: 0,
            converged: true,
            similarity: 1.0,
            error: None,
        },
    )?;

    let mut frame_index = 0usize;
    let mut failures = 0usize;
    let mut unconverged = 0usize;

    // The sources report end of stream through `grab`
    while source.grab().is_ok() {
        let frame = source.retrieve().context("failed to decode frame")?;
        frame_index += 1;

        match tracker.track_detailed(&frame) {
            Ok(outcome) => {
                if !outcome.converged {
                    unconverged += 1;
                }
                emit(
                    sink,
                    &TrackRecord {
                        frame: frame_index,
                        rect: outcome.rect,
                        iterations: outcome.iterations,
                        converged: outcome.converged,
                        similarity: outcome.similarity,
                        error: None,
                    },
                )?;
            }
            Err(e) => {
                // Keep the previous rectangle and carry on with the next frame
                failures += 1;
                warn!(frame = frame_index, "tracking error: {e}");
                emit(
                    sink,
                    &TrackRecord {
                        frame: frame_index,
                        rect: tracker.region().unwrap_or(roi),
                        iterations: 0,
                        converged: false,
                        similarity: 0.0,
                        error: Some(e.to_string()),
                    },
                )?;
            }
        }
    }

    info!(
        frames = frame_index + 1,
        failures, unconverged, "tracking finished"
    );
    Ok(())
}

fn emit(sink: &mut dyn Write, record: &TrackRecord) -> Result<()> {
    serde_json::to_writer(&mut *sink, record).context("failed to serialize result")?;
    sink.write_all(b"\n").context("failed to write result")?;
    Ok(())
}
