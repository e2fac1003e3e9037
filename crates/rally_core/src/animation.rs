//! Animation Engine
//!
//! Score text flashes after a point: white -> green (or red) -> white over
//! `duration` seconds, peaking at the midpoint.

use crate::score::{EventStamp, ScoreState};
use crate::timeline::Side;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default flash length in seconds.
pub const ANIMATION_DURATION: f64 = 1.5;

/// 8-bit red/green/blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
}

/// Which clock measures time since the last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// Real time since the event was applied. Matches a live preview, but
    /// drifts from the video when rendering is slower than real time.
    #[default]
    Wall,
    /// Frames since the event, divided by the sampling fps.
    Video,
}

/// Which score lines animate after a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashStyle {
    /// The winning side flashes green, the other line stays white.
    #[default]
    WinnerOnly,
    /// The winning side flashes green and the losing side red.
    WinnerAndLoser,
    /// Colors are judged from the foreground team's side: only the line of
    /// the team that won flashes, green for a Team 1 point and red for a
    /// Team 2 point. This is how the first renders of the overlay looked.
    ForegroundPerspective,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashAnimation {
    pub duration: f64,
}

impl Default for FlashAnimation {
    fn default() -> Self {
        Self { duration: ANIMATION_DURATION }
    }
}

impl FlashAnimation {
    pub fn new(duration: f64) -> Self {
        Self { duration }
    }

    /// Flash color `elapsed` seconds after a point.
    pub fn color_at(&self, elapsed: f64, is_winner: bool) -> Rgb {
        if elapsed.is_nan() || elapsed >= self.duration || elapsed < 0.0 {
            return Rgb::WHITE;
        }

        let progress = elapsed / self.duration;
        // Suppressed channels: 255 at either end, 0 at the midpoint.
        let fade = if progress < 0.5 { 1.0 - progress * 2.0 } else { (progress - 0.5) * 2.0 };
        let level = (255.0 * fade) as u8;

        if is_winner {
            Rgb(level, 255, level)
        } else {
            Rgb(255, level, level)
        }
    }

    /// Text colors for the Team 1 and Team 2 score lines.
    pub fn score_colors(&self, state: &ScoreState, elapsed: Option<f64>, style: FlashStyle) -> [Rgb; 2] {
        let mut colors = [Rgb::WHITE; 2];

        let (Some(elapsed), Some(winner)) =
            (elapsed, state.last_event_owner.as_ref().and_then(|owner| owner.side()))
        else {
            return colors;
        };

        match style {
            FlashStyle::WinnerOnly => {
                colors[side_index(winner)] = self.color_at(elapsed, true);
            }
            FlashStyle::WinnerAndLoser => {
                colors[side_index(winner)] = self.color_at(elapsed, true);
                colors[side_index(winner.other())] = self.color_at(elapsed, false);
            }
            FlashStyle::ForegroundPerspective => {
                colors[side_index(winner)] = self.color_at(elapsed, winner == Side::Team1);
            }
        }
        colors
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Team1 => 0,
        Side::Team2 => 1,
    }
}

/// [`FlashAnimation::color_at`] with the default duration.
pub fn color_at(elapsed: f64, is_winner: bool) -> Rgb {
    FlashAnimation::default().color_at(elapsed, is_winner)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    pub source: ClockSource,
    pub fps: u32,
}

impl AnimationClock {
    pub fn new(source: ClockSource, fps: u32) -> Self {
        Self { source, fps }
    }

    /// Seconds between `stamp` and the frame being rendered.
    pub fn elapsed(&self, stamp: &EventStamp, frame: u64, now: Instant) -> f64 {
        match self.source {
            ClockSource::Wall => now.saturating_duration_since(stamp.instant).as_secs_f64(),
            ClockSource::Video => {
                if self.fps == 0 {
                    return f64::INFINITY;
                }
                frame.saturating_sub(stamp.frame) as f64 / self.fps as f64
            }
        }
    }

    pub fn elapsed_for(&self, state: &ScoreState, frame: u64, now: Instant) -> Option<f64> {
        state.last_event_time.as_ref().map(|stamp| self.elapsed(stamp, frame, now))
    }
}
