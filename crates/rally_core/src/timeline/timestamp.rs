//! `m:ss` outcome timestamps and their frame index at a given sampling rate

use crate::error::{OverlayError, Result};

/// Convert a `minutes:seconds` timestamp (e.g. `"1:30"`, `"0:05.5"`) to seconds.
pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let malformed = || OverlayError::MalformedTimestamp(timestamp.to_string());

    let (minutes, seconds) = timestamp.split_once(':').ok_or_else(malformed)?;
    if seconds.contains(':') {
        return Err(malformed());
    }

    let minutes: f64 = minutes.trim().parse().map_err(|_| malformed())?;
    let seconds: f64 = seconds.trim().parse().map_err(|_| malformed())?;

    let total = minutes * 60.0 + seconds;
    if !total.is_finite() || minutes < 0.0 || seconds < 0.0 {
        return Err(malformed());
    }
    Ok(total)
}

/// Frame index of a timestamp, truncated toward zero.
///
/// Timestamps past the end of any representable video clamp to `u64::MAX`;
/// such events are kept but never fire.
pub fn timestamp_to_frame(timestamp: &str, fps: u32) -> Result<u64> {
    let seconds = parse_timestamp(timestamp)?;
    let frame = (seconds * fps as f64).floor();
    if frame >= u64::MAX as f64 {
        return Ok(u64::MAX);
    }
    Ok(frame as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1:30").unwrap(), 90.0);
        assert_eq!(parse_timestamp("0:05").unwrap(), 5.0);
        assert_eq!(parse_timestamp("12:00").unwrap(), 720.0);
        assert_eq!(parse_timestamp(" 0:07.5").unwrap(), 7.5);
    }

    #[test]
    fn test_timestamp_to_frame() {
        assert_eq!(timestamp_to_frame("0:05", 30).unwrap(), 150);
        assert_eq!(timestamp_to_frame("0:00", 30).unwrap(), 0);
        // 2.55s * 29 = 73.95 -> 73
        assert_eq!(timestamp_to_frame("0:2.55", 29).unwrap(), 73);
    }

    #[test]
    fn test_huge_timestamp_clamps() {
        assert_eq!(timestamp_to_frame("99999999999999999999:00", 30).unwrap(), u64::MAX);
        assert_eq!(timestamp_to_frame("0:01", 0).unwrap(), 0);
    }

    #[test]
    fn test_malformed_timestamps() {
        for bad in ["", "90", "1:2:3", "a:10", "1:b", "-1:00", "0:-5", ":"] {
            let result = parse_timestamp(bad);
            assert!(
                matches!(result, Err(OverlayError::MalformedTimestamp(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    proptest! {
        /// parse("m:s") == 60m + s
        #[test]
        fn prop_parse_is_linear(minutes in 0u32..600, seconds in 0u32..60) {
            let parsed = parse_timestamp(&format!("{minutes}:{seconds:02}")).unwrap();
            prop_assert_eq!(parsed, (minutes * 60 + seconds) as f64);
        }

        #[test]
        fn prop_frame_is_seconds_times_fps(seconds in 0u32..3600, fps in 1u32..121) {
            let ts = format!("{}:{}", seconds / 60, seconds % 60);
            prop_assert_eq!(timestamp_to_frame(&ts, fps).unwrap(), seconds as u64 * fps as u64);
        }
    }
}
