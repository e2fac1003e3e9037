//! Command implementations behind the `rally` binary.
//!
//! `track` runs the pipeline without video and writes an overlay track;
//! `video` (feature `opencv`) decodes, draws and encodes real files.

pub mod track;
#[cfg(feature = "opencv")]
pub mod video;

use anyhow::{bail, Context, Result};
use rally_core::{
    load_timeline, write_frames, FrameSource, HersheyMetrics, LandmarkTrack, NoPose, PipelineDriver, PoseOracle,
    Preset, PresetTable, RenderSettings, RunReport,
};
use std::path::{Path, PathBuf};
use track::{BlankSource, OverlayTrackSink, RecordingCanvas, TrackFrame};

/// Settings file if given, defaults otherwise.
pub fn load_settings(path: Option<&Path>) -> Result<RenderSettings> {
    match path {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(RenderSettings::default()),
    }
}

/// Explicit inputs, as opposed to a numbered preset.
#[derive(Debug, Clone, Default)]
pub struct ExplicitInputs {
    pub events: Option<PathBuf>,
    pub video: Option<PathBuf>,
    pub display_video: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Pick the run's files: preset `select` from the table (built-in unless
/// `presets` names a YAML file), or the explicit paths.
pub fn resolve_inputs(
    select: Option<u32>,
    presets: Option<&Path>,
    explicit: ExplicitInputs,
) -> Result<Preset> {
    if let Some(id) = select {
        let table = match presets {
            Some(path) => PresetTable::load(path)
                .with_context(|| format!("Failed to load presets from {}", path.display()))?,
            None => PresetTable::builtin(),
        };
        let preset = table.select(id)?.clone();
        tracing::info!("Using preset {} ({})", id, preset.name);
        return Ok(preset);
    }

    let (Some(events), Some(video), Some(output)) = (explicit.events, explicit.video, explicit.output)
    else {
        bail!("either --select or all of --events, --video and --output are required");
    };
    Ok(Preset {
        name: "custom".to_string(),
        events,
        sampling_video: video,
        display_video: explicit.display_video,
        output,
    })
}

/// Normalized timeline as pretty JSON.
pub fn timeline_json(events: &Path, fps: u32, settings: &RenderSettings) -> Result<String> {
    let timeline = load_timeline(events, fps, settings)
        .with_context(|| format!("Failed to build timeline from {}", events.display()))?;
    tracing::info!("{} events at {} fps", timeline.len(), fps);
    Ok(serde_json::to_string_pretty(timeline.events())?)
}

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub events: PathBuf,
    /// Sampling frame rate; events are indexed at this rate.
    pub fps: u32,
    /// Display (and output) frame rate, `fps` when unset.
    pub display_fps: Option<u32>,
    pub width: u32,
    pub height: u32,
    pub frames: u64,
    pub landmarks: Option<PathBuf>,
    pub out: PathBuf,
}

/// Render the overlay track for a video of the given shape and write it to `out`.
pub fn plan_track(options: &PlanOptions, settings: &RenderSettings) -> Result<RunReport> {
    if options.fps == 0 {
        bail!("--fps must be at least 1");
    }
    let timeline = load_timeline(&options.events, options.fps, settings)
        .with_context(|| format!("Failed to build timeline from {}", options.events.display()))?;

    let mut oracle: Box<dyn PoseOracle<TrackFrame>> = match &options.landmarks {
        Some(path) => Box::new(
            LandmarkTrack::load(path)
                .with_context(|| format!("Failed to load landmarks from {}", path.display()))?,
        ),
        None => Box::new(NoPose),
    };

    let display_fps = options.display_fps.unwrap_or(options.fps);
    if display_fps == 0 {
        bail!("--display-fps must be at least 1");
    }
    let mut sampling =
        BlankSource::new(options.fps as f64, options.width, options.height, options.frames);
    let mut display =
        BlankSource::new(display_fps as f64, options.width, options.height, options.frames);
    let driver = PipelineDriver::new(&timeline, settings, HersheyMetrics);
    let run = driver.run(&mut sampling, &mut display, oracle.as_mut(), &mut RecordingCanvas, None)?;

    // Output keeps the display stream's rate and size.
    let mut sink = OverlayTrackSink::new(&options.out, &display.info());
    sink.set_report(run.report.clone());
    write_frames(&run.frames, &mut sink)
        .with_context(|| format!("Failed to write overlay track {}", options.out.display()))?;
    Ok(run.report)
}
