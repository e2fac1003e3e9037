//! Pose Sampler
//!
//! Boundary to the external pose-landmark oracle. The oracle is asked for
//! the head landmark every few frames; the last hit is reused until a new
//! one arrives.

use crate::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default oracle invocations per second of source video.
pub const DEFAULT_POSE_SAMPLE_RATE: u32 = 20;

/// Landmark position normalized to the sampled frame (0.0..=1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

/// Position in display-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Finds the tracked player's head on a sampled frame.
pub trait PoseOracle<F> {
    /// `Ok(None)` when no person is detected.
    fn locate(&mut self, frame_number: u64, frame: &F) -> Result<Option<Landmark>>;
}

/// Never detects anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPose;

impl<F> PoseOracle<F> for NoPose {
    fn locate(&mut self, _frame_number: u64, _frame: &F) -> Result<Option<Landmark>> {
        Ok(None)
    }
}

/// Landmarks precomputed by an external pose tool, keyed by frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkTrack {
    heads: BTreeMap<u64, Landmark>,
}

/// One frame of the landmark sidecar file. Landmark 0 is the head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub frame: u64,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LandmarkFile {
    frames: Vec<LandmarkFrame>,
}

impl LandmarkTrack {
    pub fn from_frames(frames: Vec<LandmarkFrame>) -> Self {
        let heads = frames
            .into_iter()
            .filter_map(|f| f.landmarks.first().copied().map(|head| (f.frame, head)))
            .collect();
        Self { heads }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LandmarkFile = serde_json::from_str(json)?;
        Ok(Self::from_frames(file.frames))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            OverlayError::Video(format!("Failed to read landmark file {}: {}", path.display(), e))
        })?;
        let track = Self::from_json_str(&json)?;
        log::info!("Loaded {} landmark frames from {}", track.len(), path.display());
        Ok(track)
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}

impl<F> PoseOracle<F> for LandmarkTrack {
    fn locate(&mut self, frame_number: u64, _frame: &F) -> Result<Option<Landmark>> {
        Ok(self.heads.get(&frame_number).copied())
    }
}

/// Samples the oracle periodically and keeps the last known marker position.
#[derive(Debug, Clone)]
pub struct PoseSampler {
    every_n: u64,
    display_width: u32,
    display_height: u32,
    last_marker: Option<PixelPoint>,
    samples: u64,
    misses: u64,
}

impl PoseSampler {
    /// Sample every `max(1, source_fps / sample_rate)` frames.
    pub fn new(source_fps: u32, sample_rate: u32, display_width: u32, display_height: u32) -> Self {
        let every_n = (source_fps / sample_rate.max(1)).max(1) as u64;
        Self {
            every_n,
            display_width,
            display_height,
            last_marker: None,
            samples: 0,
            misses: 0,
        }
    }

    pub fn every_n(&self) -> u64 {
        self.every_n
    }

    pub fn should_sample(&self, frame_number: u64) -> bool {
        frame_number % self.every_n == 0
    }

    /// Run the oracle if `frame_number` is a sampling frame; return the
    /// marker to draw on this frame.
    pub fn observe<F, O: PoseOracle<F> + ?Sized>(
        &mut self,
        oracle: &mut O,
        frame_number: u64,
        frame: &F,
    ) -> Result<Option<PixelPoint>> {
        if self.should_sample(frame_number) {
            self.samples += 1;
            match oracle.locate(frame_number, frame)? {
                Some(landmark) => self.last_marker = Some(self.to_display(landmark)),
                None => {
                    self.misses += 1;
                    log::debug!("Frame {}: no pose landmarks, keeping last marker", frame_number);
                }
            }
        }
        Ok(self.last_marker)
    }

    pub fn marker(&self) -> Option<PixelPoint> {
        self.last_marker
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    fn to_display(&self, landmark: Landmark) -> PixelPoint {
        PixelPoint {
            x: (landmark.x * self.display_width as f64) as i32,
            y: (landmark.y * self.display_height as f64) as i32,
        }
    }
}
