//! # rally_core - Scoreboard and shot annotation for match video
//!
//! Turns a side-channel event log (timestamped shot/point records) into
//! per-frame overlays: scoreboard with a flash on score changes, the shot
//! that ended the point, coaching feedback, and a marker over the tracked
//! player.
//!
//! ## Pieces
//! - [`timeline`]: event log loading and frame indexing
//! - [`score`]: score/serve state machine
//! - [`animation`]: score flash colors
//! - [`pose`]: periodic sampling of the external pose oracle
//! - [`render`]: display-list compositor
//! - [`pipeline`]: lockstep frame loop over the I/O seams

pub mod animation;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pose;
pub mod render;
pub mod score;
pub mod timeline;

pub use animation::{color_at, AnimationClock, ClockSource, FlashAnimation, FlashStyle, Rgb};
pub use config::{Preset, PresetTable, RenderSettings};
pub use error::{OverlayError, Result};
pub use pipeline::{
    load_timeline, write_frames, Canvas, FrameSink, FrameSource, PipelineDriver, Preview,
    PreviewControl, RenderedRun, RunReport, VideoInfo,
};
pub use pose::{Landmark, LandmarkTrack, NoPose, PixelPoint, PoseOracle, PoseSampler};
pub use render::{Compositor, DrawCommand, FrameContext, HersheyMetrics, Overlay, TextMeasure};
pub use score::{EventStamp, ScoreState, ScoreSummary};
pub use timeline::{build_timeline, build_timeline_with, Event, EventLog, RawEvent, Timeline};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
