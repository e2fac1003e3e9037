//! Raw event-log records and the normalized timeline event

use serde::{Deserialize, Serialize};

/// Point-winner label for the team nearest the camera (Team 1).
pub const FOREGROUND_TEAM: &str = "Foreground Team";
/// Point-winner label for the team across the net (Team 2).
pub const FAR_SIDE_TEAM: &str = "Far Side Team";
/// Score text marking a change of serve without a point.
pub const SIDE_OUT_MARKER: &str = "Side Out";

/// One of the two teams on the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }

    /// 1 or 2, as printed on the scoreboard.
    pub fn number(self) -> u8 {
        match self {
            Side::Team1 => 1,
            Side::Team2 => 2,
        }
    }
}

/// `point_winner` as written in the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PointWinner {
    Foreground,
    FarSide,
    Other(String),
}

impl PointWinner {
    /// The scoreboard side this label names, if it names one.
    pub fn side(&self) -> Option<Side> {
        match self {
            PointWinner::Foreground => Some(Side::Team1),
            PointWinner::FarSide => Some(Side::Team2),
            PointWinner::Other(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PointWinner::Foreground => FOREGROUND_TEAM,
            PointWinner::FarSide => FAR_SIDE_TEAM,
            PointWinner::Other(label) => label,
        }
    }
}

impl From<String> for PointWinner {
    fn from(label: String) -> Self {
        match label.as_str() {
            FOREGROUND_TEAM => PointWinner::Foreground,
            FAR_SIDE_TEAM => PointWinner::FarSide,
            _ => PointWinner::Other(label),
        }
    }
}

impl From<&str> for PointWinner {
    fn from(label: &str) -> Self {
        PointWinner::from(label.to_string())
    }
}

impl From<PointWinner> for String {
    fn from(winner: PointWinner) -> Self {
        match winner {
            PointWinner::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

/// Older logs: the point-ending shot plus a score description after the point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecord {
    #[serde(alias = "timestamp")]
    pub timestamp_of_outcome: String,
    pub concluding_shot_player: String,
    pub concluding_shot_type: String,
    pub point_winner: String,
    pub score_after_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Newer logs: every shot carries the running `A-B[-C]` score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRecord {
    #[serde(alias = "timestamp")]
    pub timestamp_of_outcome: String,
    pub shot_by_player: String,
    pub shot_type: String,
    pub point_winner: String,
    pub current_score: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// A record from either log schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEvent {
    Legacy(LegacyRecord),
    Current(CurrentRecord),
}

impl RawEvent {
    pub fn timestamp(&self) -> &str {
        match self {
            RawEvent::Legacy(r) => &r.timestamp_of_outcome,
            RawEvent::Current(r) => &r.timestamp_of_outcome,
        }
    }
}

/// How applying an event changes the score state.
///
/// Chosen once when the timeline is built so the per-frame update never
/// looks at schema field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreUpdate {
    /// Serve changes hands, scores stay.
    SideOut,
    /// Overwrite both scores with the logged running score.
    Snapshot { team1: u32, team2: u32 },
    /// Add one point to a side.
    Increment { side: Side },
    /// Snapshot too short to read; scores stay.
    Unchanged,
}

/// A normalized, frame-indexed shot/point outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub frame_number: u64,
    /// Last frame (inclusive) on which the feedback caption is shown.
    pub feedback_end_frame: u64,
    pub outcome_owner: PointWinner,
    /// `"<player> - <shot type>"`
    pub shot_descriptor: String,
    /// Score text exactly as logged.
    pub score_snapshot: String,
    pub score_update: ScoreUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
}

impl Event {
    /// Whether the feedback window covers `frame`.
    pub fn feedback_visible_at(&self, frame: u64) -> bool {
        self.frame_number <= frame && frame <= self.feedback_end_frame
    }
}
