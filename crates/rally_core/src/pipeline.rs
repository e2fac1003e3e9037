//! Pipeline Driver
//!
//! Reads the sampling and display sources in lockstep, one frame each per
//! iteration, and stops as soon as either runs dry. Rendered frames are
//! buffered in memory and only written once the whole input is consumed.

use crate::animation::{AnimationClock, FlashAnimation};
use crate::config::RenderSettings;
use crate::error::{OverlayError, Result};
use crate::pose::{PoseOracle, PoseSampler};
use crate::render::{Compositor, FrameContext, Overlay, TextMeasure};
use crate::score::{ScoreState, ScoreSummary};
use crate::timeline::{build_timeline_with, EventLog, Timeline};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Stream properties read when a source is opened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,
}

impl VideoInfo {
    /// Whole frames per second, truncated.
    pub fn whole_fps(&self) -> u32 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps as u32
        } else {
            0
        }
    }
}

pub trait FrameSource {
    type Frame;

    fn info(&self) -> VideoInfo;

    /// `Ok(None)` once the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Paints a display list onto a frame.
pub trait Canvas<F> {
    fn draw(&mut self, frame: &mut F, overlay: &Overlay) -> Result<()>;
}

pub trait FrameSink<F> {
    fn write_frame(&mut self, frame: &F) -> Result<()>;

    /// Flush and close the output.
    fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewControl {
    Continue,
    Abort,
}

/// Live preview window.
pub trait Preview<F> {
    fn show(&mut self, frame: &F) -> Result<PreviewControl>;
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub frames_rendered: u64,
    pub events_applied: u64,
    pub pose_samples: u64,
    pub pose_misses: u64,
    /// Stopped from the preview window before the input ran out.
    pub aborted: bool,
    pub final_score: ScoreSummary,
}

/// Rendered frames, still in memory, plus the run report.
#[derive(Debug)]
pub struct RenderedRun<F> {
    pub frames: Vec<F>,
    pub report: RunReport,
}

/// Load the event log and build its timeline at `sampling_fps`.
pub fn load_timeline<P: AsRef<Path>>(
    events_path: P,
    sampling_fps: u32,
    settings: &RenderSettings,
) -> Result<Timeline> {
    let log = EventLog::load(events_path)?;
    build_timeline_with(&log.records, sampling_fps, &settings.timeline_options())
}

pub struct PipelineDriver<'a, M> {
    timeline: &'a Timeline,
    settings: &'a RenderSettings,
    measure: M,
}

impl<'a, M: TextMeasure + Clone> PipelineDriver<'a, M> {
    pub fn new(timeline: &'a Timeline, settings: &'a RenderSettings, measure: M) -> Self {
        Self { timeline, settings, measure }
    }

    fn compositor(&self, display: &VideoInfo) -> Compositor<M> {
        let mut compositor = Compositor::new(display.width, display.height, self.measure.clone());
        compositor.layout = self.settings.layout.clone();
        compositor.animation = FlashAnimation::new(self.settings.animation_duration);
        compositor.flash = self.settings.flash;
        compositor.marker_label = self.settings.marker_label.clone();
        compositor.shot_info_hold_frames = self.settings.shot_info_hold_frames;
        compositor
    }

    /// Render every frame pair until either source is exhausted or the
    /// preview asks to stop.
    pub fn run<S, D>(
        &self,
        sampling: &mut S,
        display: &mut D,
        oracle: &mut dyn PoseOracle<S::Frame>,
        canvas: &mut dyn Canvas<D::Frame>,
        mut preview: Option<&mut dyn Preview<D::Frame>>,
    ) -> Result<RenderedRun<D::Frame>>
    where
        S: FrameSource,
        D: FrameSource,
    {
        let sampling_info = sampling.info();
        let display_info = display.info();
        let fps = sampling_info.whole_fps();
        if fps == 0 {
            return Err(OverlayError::Video(format!(
                "sampling source reports an unusable frame rate ({})",
                sampling_info.fps
            )));
        }
        if fps != self.timeline.fps() {
            log::warn!(
                "Timeline was built at {} fps but the sampling source runs at {} fps",
                self.timeline.fps(),
                fps
            );
        }

        let compositor = self.compositor(&display_info);
        let clock = AnimationClock::new(self.settings.clock, fps);
        let mut sampler = PoseSampler::new(
            fps,
            self.settings.pose_sample_rate,
            display_info.width,
            display_info.height,
        );

        log::info!(
            "Rendering: sampling {}x{} @ {} fps, display {}x{}, pose every {} frames",
            sampling_info.width,
            sampling_info.height,
            fps,
            display_info.width,
            display_info.height,
            sampler.every_n()
        );

        let mut state = ScoreState::new();
        let mut frames = Vec::new();
        let mut frame_number: u64 = 0;
        let mut events_applied = 0;
        let mut aborted = false;

        loop {
            let sample = sampling.read_frame()?;
            let shown = display.read_frame()?;
            let (Some(sample), Some(mut shown)) = (sample, shown) else {
                break;
            };

            frame_number += 1;
            let marker = sampler.observe(oracle, frame_number, &sample)?;

            let now = Instant::now();
            let (next, fired) = state.advance(self.timeline, frame_number, now);
            state = next;
            if fired.is_some() {
                events_applied += 1;
            }

            let overlay = compositor.render_frame(&FrameContext {
                frame_number,
                state: &state,
                timeline: self.timeline,
                marker,
                elapsed: clock.elapsed_for(&state, frame_number, now),
            });
            canvas.draw(&mut shown, &overlay)?;
            frames.push(shown);

            if let (Some(preview), Some(last)) = (preview.as_deref_mut(), frames.last()) {
                if preview.show(last)? == PreviewControl::Abort {
                    log::info!("Preview aborted at frame {}", frame_number);
                    aborted = true;
                    break;
                }
            }
        }

        let report = RunReport {
            frames_rendered: frame_number,
            events_applied,
            pose_samples: sampler.samples(),
            pose_misses: sampler.misses(),
            aborted,
            final_score: state.summary(),
        };
        log::info!(
            "Rendered {} frames, {} events applied, final score {}-{}",
            report.frames_rendered,
            report.events_applied,
            report.final_score.team1_score,
            report.final_score.team2_score
        );

        Ok(RenderedRun { frames, report })
    }
}

/// Write buffered frames in order, then close the sink.
pub fn write_frames<F>(frames: &[F], sink: &mut dyn FrameSink<F>) -> Result<()> {
    for frame in frames {
        sink.write_frame(frame)?;
    }
    sink.finish()?;
    log::info!("Wrote {} frames", frames.len());
    Ok(())
}
