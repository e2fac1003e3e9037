//! Score State Machine
//!
//! Two team scores plus the serving side. Every transition returns a new
//! [`ScoreState`]; nothing is mutated in place.

use crate::timeline::{Event, PointWinner, ScoreUpdate, Side, Timeline};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// When the most recent event fired, in both clocks the animation can key off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStamp {
    pub frame: u64,
    pub instant: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreState {
    pub team1_score: u32,
    pub team2_score: u32,
    pub serving_team: Side,
    pub last_event_owner: Option<PointWinner>,
    pub last_event_time: Option<EventStamp>,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    /// 0-0, Team 1 serving.
    pub fn new() -> Self {
        Self {
            team1_score: 0,
            team2_score: 0,
            serving_team: Side::Team1,
            last_event_owner: None,
            last_event_time: None,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Team1 => self.team1_score,
            Side::Team2 => self.team2_score,
        }
    }

    /// State after `event` fires at `now`.
    pub fn apply_event(&self, event: &Event, now: Instant) -> ScoreState {
        let mut next = self.clone();

        match event.score_update {
            ScoreUpdate::SideOut => {
                next.serving_team = self.serving_team.other();
            }
            ScoreUpdate::Snapshot { team1, team2 } => {
                next.team1_score = team1;
                next.team2_score = team2;
            }
            ScoreUpdate::Increment { side: Side::Team1 } => {
                next.team1_score = self.team1_score.saturating_add(1);
            }
            ScoreUpdate::Increment { side: Side::Team2 } => {
                next.team2_score = self.team2_score.saturating_add(1);
            }
            ScoreUpdate::Unchanged => {}
        }

        next.last_event_owner = Some(event.outcome_owner.clone());
        next.last_event_time = Some(EventStamp { frame: event.frame_number, instant: now });
        next
    }

    /// Apply the event (if any) that fires on `frame`.
    ///
    /// At most one event is applied per frame: the first in input order.
    pub fn advance<'t>(
        &self,
        timeline: &'t Timeline,
        frame: u64,
        now: Instant,
    ) -> (ScoreState, Option<&'t Event>) {
        match timeline.event_at(frame) {
            Some(event) => {
                log::debug!(
                    "Frame {}: {} ({:?}) by {}",
                    frame,
                    event.shot_descriptor,
                    event.score_update,
                    event.outcome_owner.label()
                );
                (self.apply_event(event, now), Some(event))
            }
            None => (self.clone(), None),
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            team1_score: self.team1_score,
            team2_score: self.team2_score,
            serving_team: self.serving_team.number(),
            last_point_winner: self.last_event_owner.as_ref().map(|w| w.label().to_string()),
        }
    }
}

/// Serializable view of a [`ScoreState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub team1_score: u32,
    pub team2_score: u32,
    pub serving_team: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_point_winner: Option<String>,
}
