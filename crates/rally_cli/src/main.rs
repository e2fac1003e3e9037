//! rally - score/shot overlay renderer
//!
//! `timeline` dumps the normalized event timeline, `plan` renders an overlay
//! track without video, `render` burns the overlay into a video file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rally_cli::{load_settings, plan_track, resolve_inputs, timeline_json, ExplicitInputs, PlanOptions};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rally")]
#[command(about = "Render scoreboard and shot overlays onto match video", long_about = None)]
struct Cli {
    /// Render settings (YAML, or JSON by extension)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized event timeline as JSON
    Timeline {
        /// Event log JSON
        #[arg(long)]
        events: PathBuf,

        /// Frame rate used to index events
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render an overlay track (per-frame draw commands) without any video
    Plan {
        /// Event log JSON
        #[arg(long)]
        events: PathBuf,

        #[arg(long, default_value = "30")]
        fps: u32,

        /// Frame rate of the display video, when it differs from --fps
        #[arg(long)]
        display_fps: Option<u32>,

        /// Number of frames to render
        #[arg(long)]
        frames: u64,

        #[arg(long, default_value = "1920")]
        width: u32,

        #[arg(long, default_value = "1080")]
        height: u32,

        /// Pre-extracted pose landmarks JSON
        #[arg(long)]
        landmarks: Option<PathBuf>,

        /// Output track JSON
        #[arg(long)]
        out: PathBuf,
    },

    /// Draw the overlay onto a video and write the result
    Render {
        /// Preset number
        #[arg(long)]
        select: Option<u32>,

        /// Preset table (YAML) replacing the built-in one
        #[arg(long)]
        presets: Option<PathBuf>,

        /// Event log JSON (without --select)
        #[arg(long)]
        events: Option<PathBuf>,

        /// Video sampled for pose landmarks (without --select)
        #[arg(long)]
        video: Option<PathBuf>,

        /// Video drawn on; defaults to --video
        #[arg(long)]
        display_video: Option<PathBuf>,

        /// Output video (without --select)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pre-extracted pose landmarks JSON
        #[arg(long)]
        landmarks: Option<PathBuf>,

        /// Show frames while rendering; press q to stop
        #[arg(long)]
        preview: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "rally=info,rally_cli=info,rally_core=info",
        1 => "rally=debug,rally_cli=debug,rally_core=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Timeline { events, fps, out } => {
            let json = timeline_json(&events, fps, &settings)?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Timeline written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Plan { events, fps, display_fps, frames, width, height, landmarks, out } => {
            let options = PlanOptions { events, fps, display_fps, width, height, frames, landmarks, out };
            let report = plan_track(&options, &settings)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Render {
            select,
            presets,
            events,
            video,
            display_video,
            output,
            landmarks,
            preview,
        } => {
            let inputs = resolve_inputs(
                select,
                presets.as_deref(),
                ExplicitInputs { events, video, display_video, output },
            )?;
            settings.preview |= preview;
            render(&inputs, landmarks, &settings)?;
        }
    }

    Ok(())
}

#[cfg(feature = "opencv")]
fn render(
    inputs: &rally_core::Preset,
    landmarks: Option<PathBuf>,
    settings: &rally_core::RenderSettings,
) -> Result<()> {
    use rally_cli::video::{OpenCvCanvas, OpenCvMetrics, VideoFileSink, VideoFileSource, WindowPreview};
    use rally_core::{load_timeline, write_frames, FrameSource, LandmarkTrack, NoPose, PipelineDriver, PoseOracle};

    let mut sampling = VideoFileSource::open(&inputs.sampling_video)
        .with_context(|| format!("Failed to open {}", inputs.sampling_video.display()))?;
    let mut display = VideoFileSource::open(inputs.display_video())
        .with_context(|| format!("Failed to open {}", inputs.display_video().display()))?;

    let sampling_info = sampling.info();
    let timeline = load_timeline(&inputs.events, sampling_info.whole_fps(), settings)
        .with_context(|| format!("Failed to build timeline from {}", inputs.events.display()))?;

    let mut oracle: Box<dyn PoseOracle<opencv::core::Mat>> = match landmarks {
        Some(path) => Box::new(
            LandmarkTrack::load(&path)
                .with_context(|| format!("Failed to load landmarks from {}", path.display()))?,
        ),
        None => Box::new(NoPose),
    };

    let mut window = settings.preview.then(|| WindowPreview::new("Rally overlay"));
    let preview = window.as_mut().map(|w| w as &mut dyn rally_core::Preview<opencv::core::Mat>);

    let driver = PipelineDriver::new(&timeline, settings, OpenCvMetrics);
    let run = driver.run(&mut sampling, &mut display, oracle.as_mut(), &mut OpenCvCanvas, preview)?;
    drop(window);

    let mut sink = VideoFileSink::create(&inputs.output, &display.info())
        .with_context(|| format!("Failed to create {}", inputs.output.display()))?;
    write_frames(&run.frames, &mut sink)?;

    tracing::info!(
        "Final video saved to {} ({} frames{})",
        inputs.output.display(),
        run.report.frames_rendered,
        if run.report.aborted { ", stopped early" } else { "" }
    );
    Ok(())
}

#[cfg(not(feature = "opencv"))]
fn render(
    _inputs: &rally_core::Preset,
    _landmarks: Option<PathBuf>,
    _settings: &rally_core::RenderSettings,
) -> Result<()> {
    anyhow::bail!("video rendering needs the `opencv` feature; rebuild with --features opencv or use `plan`")
}
