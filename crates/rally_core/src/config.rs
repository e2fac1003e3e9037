//! Render settings and the fixed table of input/output presets

use crate::animation::{ClockSource, FlashStyle, ANIMATION_DURATION};
use crate::error::{OverlayError, Result};
use crate::pose::DEFAULT_POSE_SAMPLE_RATE;
use crate::render::OverlayLayout;
use crate::timeline::{TimelineOptions, DEFAULT_FEEDBACK_SECONDS};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ========== Render settings ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Score flash length in seconds (default: 1.5)
    #[serde(default = "default_animation_duration")]
    pub animation_duration: f64,

    /// Seconds a feedback caption stays on screen (default: 5)
    #[serde(default = "default_feedback_seconds")]
    pub feedback_seconds: u32,

    /// Pose oracle calls per second of source video (default: 20)
    #[serde(default = "default_pose_sample_rate")]
    pub pose_sample_rate: u32,

    /// Clock the score flash runs on (default: wall)
    #[serde(default)]
    pub clock: ClockSource,

    /// Which score lines flash after a point: winner_only (default),
    /// winner_and_loser or foreground_perspective
    #[serde(default)]
    pub flash: FlashStyle,

    /// Reject unreadable score snapshots instead of ignoring them
    #[serde(default)]
    pub strict_scores: bool,

    /// Name drawn above the tracked player
    #[serde(default = "default_marker_label")]
    pub marker_label: String,

    /// Extra frames the shot description stays up after its event (default: 0)
    #[serde(default)]
    pub shot_info_hold_frames: u64,

    /// Show each composited frame in a window while rendering
    #[serde(default)]
    pub preview: bool,

    #[serde(default)]
    pub layout: OverlayLayout,
}

fn default_animation_duration() -> f64 {
    ANIMATION_DURATION
}

fn default_feedback_seconds() -> u32 {
    DEFAULT_FEEDBACK_SECONDS
}

fn default_pose_sample_rate() -> u32 {
    DEFAULT_POSE_SAMPLE_RATE
}

fn default_marker_label() -> String {
    "Pedro".to_string()
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            animation_duration: default_animation_duration(),
            feedback_seconds: default_feedback_seconds(),
            pose_sample_rate: default_pose_sample_rate(),
            clock: ClockSource::default(),
            flash: FlashStyle::default(),
            strict_scores: false,
            marker_label: default_marker_label(),
            shot_info_hold_frames: 0,
            preview: false,
            layout: OverlayLayout::default(),
        }
    }
}

impl RenderSettings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: RenderSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: RenderSettings =
            serde_json::from_str(json).map_err(|e| OverlayError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            OverlayError::InvalidConfig(format!("Failed to read settings {}: {}", path.display(), e))
        })?;

        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.animation_duration > 0.0 && self.animation_duration.is_finite()) {
            return Err(OverlayError::InvalidConfig(format!(
                "animation_duration must be positive, got {}",
                self.animation_duration
            )));
        }
        if self.pose_sample_rate == 0 {
            return Err(OverlayError::InvalidConfig("pose_sample_rate must be at least 1".to_string()));
        }
        let ratio = self.layout.feedback.max_width_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "layout.feedback.max_width_ratio must be in (0, 1], got {}",
                ratio
            )));
        }
        if self.layout.scoreboard.scale <= 0.0 || self.layout.shot_info.scale <= 0.0 {
            return Err(OverlayError::InvalidConfig("text scales must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeline_options(&self) -> TimelineOptions {
        TimelineOptions { feedback_seconds: self.feedback_seconds, strict_scores: self.strict_scores }
    }
}

// ========== Presets ==========

/// Event log, source video and output video for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub events: PathBuf,
    /// Video sampled for pose landmarks.
    pub sampling_video: PathBuf,
    /// Video drawn on and written out. Defaults to `sampling_video`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_video: Option<PathBuf>,
    pub output: PathBuf,
}

impl Preset {
    fn new(name: &str, events: &str, video: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            events: PathBuf::from(events),
            sampling_video: PathBuf::from(video),
            display_video: None,
            output: PathBuf::from(output),
        }
    }

    pub fn display_video(&self) -> &Path {
        self.display_video.as_deref().unwrap_or(&self.sampling_video)
    }
}

static BUILTIN_PRESETS: Lazy<BTreeMap<u32, Preset>> = Lazy::new(|| {
    BTreeMap::from([
        (1, Preset::new("demo", "pickleball.json", "pickleball_demo.mov", "pickleball_final.mp4")),
        (2, Preset::new("doubles", "pickleball2.json", "ai_pickleball_2v2.mp4", "pickleball2_final.mp4")),
        (3, Preset::new("singles", "pickleball3.json", "ai_pickleball_1v1.mp4", "pickleball3_final.mp4")),
    ])
});

/// Numbered presets, selected with an integer switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTable {
    presets: BTreeMap<u32, Preset>,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetTable {
    pub fn builtin() -> Self {
        Self { presets: BUILTIN_PRESETS.clone() }
    }

    /// YAML map of id -> preset; replaces the built-in table entirely.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: PresetTable = serde_yaml::from_str(yaml)?;
        if table.presets.is_empty() {
            return Err(OverlayError::InvalidConfig("preset table is empty".to_string()));
        }
        Ok(table)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            OverlayError::InvalidConfig(format!("Failed to read presets {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn select(&self, id: u32) -> Result<&Preset> {
        self.presets.get(&id).ok_or(OverlayError::UnknownPreset(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Preset)> {
        self.presets.iter().map(|(id, preset)| (*id, preset))
    }
}
