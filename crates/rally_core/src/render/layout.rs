//! Fixed overlay geometry, in display pixels

use crate::animation::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayLayout {
    pub scoreboard: ScoreboardLayout,
    pub shot_info: ShotInfoLayout,
    pub feedback: FeedbackLayout,
    pub marker: MarkerLayout,
}

// ========== Scoreboard (top left) ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreboardLayout {
    pub x: i32,
    pub y: i32,
    /// Vertical distance between the three lines.
    pub spacing: i32,
    pub scale: f64,
    /// Serving line scale relative to `scale`.
    pub serving_scale_factor: f64,
    pub thickness: i32,
    pub outline: i32,
    pub serving_color: Rgb,
}

impl Default for ScoreboardLayout {
    fn default() -> Self {
        Self {
            x: 30,
            y: 150,
            spacing: 90,
            scale: 2.1,
            serving_scale_factor: 0.8,
            thickness: 6,
            outline: 12,
            serving_color: Rgb::YELLOW,
        }
    }
}

// ========== Shot info (top right) ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotInfoLayout {
    /// Left edge, measured from the right border of the frame.
    pub right_offset: i32,
    pub y: i32,
    pub scale: f64,
    pub thickness: i32,
    pub outline: i32,
}

impl Default for ShotInfoLayout {
    fn default() -> Self {
        Self { right_offset: 600, y: 150, scale: 1.5, thickness: 4, outline: 8 }
    }
}

// ========== Feedback caption (bottom center) ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackLayout {
    pub scale: f64,
    pub thickness: i32,
    pub line_spacing: i32,
    /// Maximum caption width as a fraction of the frame width.
    pub max_width_ratio: f64,
    pub bottom_margin: i32,
    pub shadow_offset: i32,
}

impl Default for FeedbackLayout {
    fn default() -> Self {
        Self {
            scale: 1.2,
            thickness: 3,
            line_spacing: 45,
            max_width_ratio: 0.5,
            bottom_margin: 120,
            shadow_offset: 2,
        }
    }
}

// ========== Player marker ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerLayout {
    pub arrow_width: i32,
    pub arrow_height: i32,
    /// Distance from the head landmark up to the top of the arrow.
    pub lift: i32,
    pub arrow_color: Rgb,
    pub label_scale: f64,
    pub label_thickness: i32,
    pub label_outline: i32,
    /// Gap between the label baseline and the arrow.
    pub label_gap: i32,
}

impl Default for MarkerLayout {
    fn default() -> Self {
        Self {
            arrow_width: 45,
            arrow_height: 30,
            lift: 110,
            arrow_color: Rgb::RED,
            label_scale: 2.5,
            label_thickness: 6,
            label_outline: 15,
            label_gap: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let layout: OverlayLayout = serde_yaml::from_str(
            "scoreboard:\n  x: 50\nmarker:\n  arrow_color: [0, 0, 255]\n",
        )
        .unwrap();

        assert_eq!(layout.scoreboard.x, 50);
        assert_eq!(layout.scoreboard.y, 150);
        assert_eq!(layout.marker.arrow_color, Rgb(0, 0, 255));
        assert_eq!(layout.feedback, FeedbackLayout::default());
    }
}
