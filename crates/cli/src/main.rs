mod report;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use backdrop_core::geometry::CONTENT_TOP_PX;
use backdrop_core::{HeadlessPage, LayerSequencer, Phase, SectionsConfig};
use backdrop_protocol::SubsectionId;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

/// Frames allowed to settle before giving up on the simulation.
const FRAME_LIMIT: usize = 10_000;
const FRAME_MS: f64 = 16.0;
/// Smallest scroll increment the sweep accepts, in CSS pixels.
const MIN_STEP_PX: f64 = 1.0;
/// Upper bound on report lines for one sweep.
const MAX_POSITIONS: usize = 100_000;

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// Sections JSON, keyed by section name.
    #[arg(long)]
    config: PathBuf,

    /// Section to replay.
    #[arg(long)]
    section: String,

    /// Viewport height in CSS pixels.
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Fixed header height in CSS pixels.
    #[arg(long, default_value_t = CONTENT_TOP_PX)]
    header_height: f64,

    /// Subsection heights in page order (about, posts, gigs, videos).
    #[arg(long, value_delimiter = ',', default_values_t = [900.0, 1200.0, 800.0, 1000.0])]
    heights: Vec<f64>,

    /// Scroll increment between report lines.
    #[arg(long, default_value_t = 100.0)]
    step: f64,

    /// Log lifecycle events to stderr.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        })
        .init();

    let data = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("read config '{}'", cli.config.display()))?;
    let sections = SectionsConfig::from_json(&data).context("parse sections JSON")?;
    let section = sections.section(&cli.section)?;

    let page = build_page(&cli)?;
    let mut sequencer = LayerSequencer::new(page, section);
    sequencer.start();
    settle(&mut sequencer)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if sequencer.phase() == Phase::Inert {
        writeln!(out, "section '{}' has no subsection backgrounds", cli.section)?;
        return Ok(());
    }

    report::write_header(&mut out, sequencer.layers())?;
    for top in scroll_positions(sequencer.host().max_scroll(), cli.step) {
        sequencer.host_mut().scroll_to(top);
        sequencer.on_scroll();
        report::write_step(&mut out, top, sequencer.host())?;
    }
    Ok(())
}

fn build_page(cli: &Cli) -> Result<HeadlessPage> {
    if cli.heights.len() > SubsectionId::ALL.len() {
        bail!(
            "expected at most {} heights, got {}",
            SubsectionId::ALL.len(),
            cli.heights.len()
        );
    }
    if cli.step.is_nan() || cli.step < MIN_STEP_PX {
        bail!("--step must be at least {MIN_STEP_PX}px");
    }
    let lengths = [cli.viewport_height, cli.header_height];
    if let Some(bad) = lengths
        .iter()
        .chain(&cli.heights)
        .find(|px| !px.is_finite() || **px < 0.0)
    {
        bail!("lengths must be finite and non-negative, got {bad}");
    }
    let page = SubsectionId::ALL
        .into_iter()
        .zip(&cli.heights)
        .fold(
            HeadlessPage::new(cli.viewport_height).with_header_height(cli.header_height),
            |page, (id, &height)| page.with_section(id, height),
        );
    Ok(page)
}

/// Run animation frames until the sequencer stops asking for them.
fn settle(sequencer: &mut LayerSequencer<HeadlessPage>) -> Result<()> {
    let mut ran = 0;
    loop {
        let frames = sequencer.host_mut().take_frames();
        if frames.is_empty() {
            return Ok(());
        }
        for _ in frames {
            sequencer.host_mut().advance(FRAME_MS);
            sequencer.on_frame();
            ran += 1;
        }
        if ran > FRAME_LIMIT {
            bail!("page did not settle after {FRAME_LIMIT} frames");
        }
    }
}

/// `0, step, 2*step, ...` up to and including `max`, at most
/// [`MAX_POSITIONS`] entries.
fn scroll_positions(max: f64, step: f64) -> Vec<f64> {
    let mut positions = Vec::new();
    let mut top = 0.0;
    while top < max && positions.len() + 1 < MAX_POSITIONS {
        positions.push(top);
        top += step;
    }
    positions.push(max);
    positions
}
