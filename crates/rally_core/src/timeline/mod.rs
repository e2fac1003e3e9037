//! Event Timeline
//!
//! Loads the side-channel event log and turns every record into a
//! frame-indexed [`Event`]. Both log schemas are normalized here, once, so
//! playback only ever sees the canonical shape.

pub mod timestamp;
pub mod types;

pub use timestamp::{parse_timestamp, timestamp_to_frame};
pub use types::{
    CurrentRecord, Event, LegacyRecord, PointWinner, RawEvent, ScoreUpdate, Side,
    FAR_SIDE_TEAM, FOREGROUND_TEAM, SIDE_OUT_MARKER,
};

use crate::error::{OverlayError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Seconds a feedback caption stays up after its event.
pub const DEFAULT_FEEDBACK_SECONDS: u32 = 5;

/// Top-level keys that may hold the record list, in lookup order.
const EVENT_LIST_KEYS: [&str; 2] = ["shots", "points"];

/// Parsed event log, records in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    pub records: Vec<RawEvent>,
}

impl EventLog {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: serde_json::Value) -> Result<Self> {
        let list = EVENT_LIST_KEYS
            .iter()
            .find_map(|key| value.get_mut(*key).map(serde_json::Value::take))
            .ok_or(OverlayError::MissingEventList)?;

        let items: Vec<serde_json::Value> = serde_json::from_value(list)?;
        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| parse_record(index, item))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| OverlayError::EventLogRead {
            path: path.display().to_string(),
            source,
        })?;
        let log = Self::from_json_str(&json)?;
        log::info!("Loaded {} event records from {}", log.records.len(), path.display());
        Ok(log)
    }
}

fn parse_record(index: usize, item: serde_json::Value) -> Result<RawEvent> {
    if item.get("concluding_shot_player").is_some() {
        Ok(RawEvent::Legacy(serde_json::from_value(item)?))
    } else if item.get("shot_by_player").is_some() {
        Ok(RawEvent::Current(serde_json::from_value(item)?))
    } else {
        Err(OverlayError::UnknownSchema { index })
    }
}

/// Knobs for [`build_timeline_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineOptions {
    pub feedback_seconds: u32,
    /// Reject snapshots with fewer than two score tokens instead of ignoring them.
    pub strict_scores: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self { feedback_seconds: DEFAULT_FEEDBACK_SECONDS, strict_scores: false }
    }
}

/// Frame-indexed events in input order.
///
/// Input order is trusted: events are not sorted, and duplicates on the same
/// frame are kept (only the first one fires during playback).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    fps: u32,
    events: Vec<Event>,
}

impl Timeline {
    pub fn new(fps: u32, events: Vec<Event>) -> Self {
        Self { fps, events }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First event (in input order) that fires on `frame`.
    pub fn event_at(&self, frame: u64) -> Option<&Event> {
        self.events.iter().find(|e| e.frame_number == frame)
    }

    /// Feedback caption for `frame`: the last event whose window covers it wins.
    ///
    /// Returns `None` when that event has no (or empty) feedback text.
    pub fn feedback_at(&self, frame: u64) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find(|e| e.feedback_visible_at(frame))?
            .feedback_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Most recent event that fired at or before `frame`, if it fired no more
    /// than `hold_frames` frames ago.
    ///
    /// Among events sharing that frame the first in input order is returned,
    /// the same one [`Timeline::event_at`] applies.
    pub fn recent_event(&self, frame: u64, hold_frames: u64) -> Option<&Event> {
        let earliest = frame.saturating_sub(hold_frames);
        let latest = self
            .events
            .iter()
            .map(|e| e.frame_number)
            .filter(|&n| n <= frame && n >= earliest)
            .max()?;
        self.event_at(latest)
    }
}

/// Build the timeline with default options.
pub fn build_timeline(raw_events: &[RawEvent], sampling_fps: u32) -> Result<Timeline> {
    build_timeline_with(raw_events, sampling_fps, &TimelineOptions::default())
}

pub fn build_timeline_with(
    raw_events: &[RawEvent],
    sampling_fps: u32,
    options: &TimelineOptions,
) -> Result<Timeline> {
    let feedback_frames = options.feedback_seconds as u64 * sampling_fps as u64;

    let events = raw_events
        .iter()
        .map(|raw| normalize(raw, sampling_fps, feedback_frames, options.strict_scores))
        .collect::<Result<Vec<_>>>()?;

    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        log::info!(
            "Timeline built: {} events at {} fps (frames {}..={})",
            events.len(),
            sampling_fps,
            first.frame_number,
            last.frame_number
        );
    }

    Ok(Timeline::new(sampling_fps, events))
}

fn normalize(raw: &RawEvent, fps: u32, feedback_frames: u64, strict: bool) -> Result<Event> {
    let timestamp = raw.timestamp().to_string();
    let frame_number = timestamp_to_frame(&timestamp, fps)?;

    let (owner, descriptor, snapshot, update, feedback) = match raw {
        RawEvent::Legacy(r) => {
            let owner = PointWinner::from(r.point_winner.as_str());
            let update = if r.score_after_point.contains(SIDE_OUT_MARKER) {
                ScoreUpdate::SideOut
            } else {
                // Anything but the far-side label scores for Team 1.
                let side = match owner.side() {
                    Some(Side::Team2) => Side::Team2,
                    _ => Side::Team1,
                };
                ScoreUpdate::Increment { side }
            };
            let descriptor = format!("{} - {}", r.concluding_shot_player, r.concluding_shot_type);
            (owner, descriptor, &r.score_after_point, update, &r.feedback)
        }
        RawEvent::Current(r) => {
            let owner = PointWinner::from(r.point_winner.as_str());
            let update = snapshot_update(&timestamp, &r.current_score, strict)?;
            let descriptor = format!("{} - {}", r.shot_by_player, r.shot_type);
            (owner, descriptor, &r.current_score, update, &r.feedback)
        }
    };

    Ok(Event {
        timestamp,
        frame_number,
        feedback_end_frame: frame_number.saturating_add(feedback_frames),
        outcome_owner: owner,
        shot_descriptor: descriptor,
        score_snapshot: snapshot.clone(),
        score_update: update,
        feedback_text: feedback.clone(),
    })
}

/// Read a running score such as `"3-2"` or `"3-2-1"` (extra tokens ignored).
fn snapshot_update(timestamp: &str, score: &str, strict: bool) -> Result<ScoreUpdate> {
    if score.contains(SIDE_OUT_MARKER) {
        return Ok(ScoreUpdate::SideOut);
    }

    let malformed = || OverlayError::MalformedScore {
        timestamp: timestamp.to_string(),
        score: score.to_string(),
    };

    let parts: Vec<&str> = score.split('-').collect();
    if parts.len() < 2 {
        if strict {
            return Err(malformed());
        }
        log::warn!("Score {:?} at {} has fewer than two parts; score left unchanged", score, timestamp);
        return Ok(ScoreUpdate::Unchanged);
    }

    let team1 = parts[0].trim().parse().map_err(|_| malformed())?;
    let team2 = parts[1].trim().parse().map_err(|_| malformed())?;
    Ok(ScoreUpdate::Snapshot { team1, team2 })
}
