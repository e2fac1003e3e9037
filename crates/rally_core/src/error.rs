use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Malformed timestamp: {0:?} (expected minutes:seconds)")]
    MalformedTimestamp(String),

    #[error("Malformed score {score:?} at {timestamp}")]
    MalformedScore { timestamp: String, score: String },

    #[error("Failed to read event log {path}: {source}")]
    EventLogRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event log has neither a \"shots\" nor a \"points\" list")]
    MissingEventList,

    #[error("Event #{index} matches neither the legacy nor the current record schema")]
    UnknownSchema { index: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(u32),

    #[error("Video error: {0}")]
    Video(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Errors that stop a run before the first frame is read.
    pub fn is_fatal_at_startup(&self) -> bool {
        match self {
            OverlayError::MalformedTimestamp(_) => true,
            OverlayError::MalformedScore { .. } => true,
            OverlayError::EventLogRead { .. } => true,
            OverlayError::Json(_) => true,
            OverlayError::MissingEventList => true,
            OverlayError::UnknownSchema { .. } => true,
            OverlayError::InvalidConfig(_) => true,
            OverlayError::UnknownPreset(_) => true,
            OverlayError::Video(_) => false,
            OverlayError::Io(_) => false,
        }
    }
}

impl From<serde_yaml::Error> for OverlayError {
    fn from(err: serde_yaml::Error) -> Self {
        OverlayError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_classification() {
        assert!(OverlayError::MissingEventList.is_fatal_at_startup());
        assert!(OverlayError::UnknownPreset(9).is_fatal_at_startup());
        assert!(!OverlayError::Video("closed".into()).is_fatal_at_startup());
    }

    #[test]
    fn test_display_messages() {
        let err = OverlayError::MalformedTimestamp("1-30".to_string());
        assert_eq!(err.to_string(), "Malformed timestamp: \"1-30\" (expected minutes:seconds)");

        let err = OverlayError::MalformedScore {
            timestamp: "0:12".to_string(),
            score: "x-2".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed score \"x-2\" at 0:12");
    }
}
