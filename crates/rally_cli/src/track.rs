//! Overlay-track backend
//!
//! Runs the pipeline without decoding any video: a blank source of N frames
//! stands in for both inputs, the canvas records each frame's display list,
//! and the sink writes the whole track as one JSON document for an external
//! compositor to burn in.

use rally_core::{Canvas, FrameSink, FrameSource, Overlay, RunReport, VideoInfo};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Track format version.
pub const TRACK_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFrame {
    pub frame: u64,
    #[serde(default)]
    pub overlay: Overlay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayTrack {
    pub version: String,
    /// RFC 3339
    pub generated_at: String,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    pub frames: Vec<TrackFrame>,
}

/// Source of `frame_count` empty frames with the given stream properties.
#[derive(Debug, Clone)]
pub struct BlankSource {
    info: VideoInfo,
    read: u64,
}

impl BlankSource {
    pub fn new(fps: f64, width: u32, height: u32, frame_count: u64) -> Self {
        Self {
            info: VideoInfo { fps, width, height, frame_count: Some(frame_count) },
            read: 0,
        }
    }
}

impl FrameSource for BlankSource {
    type Frame = TrackFrame;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self) -> rally_core::Result<Option<TrackFrame>> {
        if Some(self.read) >= self.info.frame_count {
            return Ok(None);
        }
        self.read += 1;
        Ok(Some(TrackFrame { frame: self.read, overlay: Overlay::new() }))
    }
}

/// Stores the display list on the frame instead of painting pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingCanvas;

impl Canvas<TrackFrame> for RecordingCanvas {
    fn draw(&mut self, frame: &mut TrackFrame, overlay: &Overlay) -> rally_core::Result<()> {
        frame.overlay = overlay.clone();
        Ok(())
    }
}

/// Collects frames and writes the track file on `finish`.
#[derive(Debug)]
pub struct OverlayTrackSink {
    path: PathBuf,
    track: OverlayTrack,
}

impl OverlayTrackSink {
    pub fn new<P: AsRef<Path>>(path: P, info: &VideoInfo) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            track: OverlayTrack {
                version: TRACK_VERSION.to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                fps: info.fps,
                width: info.width,
                height: info.height,
                report: None,
                frames: Vec::new(),
            },
        }
    }

    pub fn set_report(&mut self, report: RunReport) {
        self.track.report = Some(report);
    }
}

impl FrameSink<TrackFrame> for OverlayTrackSink {
    fn write_frame(&mut self, frame: &TrackFrame) -> rally_core::Result<()> {
        self.track.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> rally_core::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.track)?;
        fs::write(&self.path, json)?;
        log::info!("Overlay track saved to {}", self.path.display());
        Ok(())
    }
}

/// Load a track written by [`OverlayTrackSink`].
pub fn load_track<P: AsRef<Path>>(path: P) -> anyhow::Result<OverlayTrack> {
    let json = fs::read_to_string(path)?;
    let track: OverlayTrack = serde_json::from_str(&json)?;
    Ok(track)
}
