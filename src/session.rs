use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::Settings;
use crate::error::Result;
use crate::line::Line;
use crate::score::score_percent;

/// Snapshot of one play-through. This is the unit that gets saved, listed
/// and restored; the live copy is owned by a `GameEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// `None` until the session is first played; written as `0`, read from
    /// `0` or `null`.
    #[serde(rename = "beginDateAndTime", default, with = "begin_time")]
    pub begin: Option<DateTime<Utc>>,
    /// Accumulated active seconds.
    #[serde(rename = "timeLength", default)]
    pub elapsed_secs: f64,
    #[serde(default)]
    pub mistake_count: u32,
    #[serde(rename = "currentLine", default)]
    pub current_position: usize,
    #[serde(rename = "remainingLines", default)]
    pub remaining: VecDeque<Line>,
    /// Length of the batch when it started. Older records omit it, in which
    /// case the remaining length is used.
    #[serde(default)]
    pub original_length: usize,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queued_batches: Vec<Vec<Line>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            begin: None,
            elapsed_secs: 0.0,
            mistake_count: 0,
            current_position: 0,
            remaining: VecDeque::new(),
            original_length: 0,
            settings: Settings::default(),
            queued_batches: Vec::new(),
        }
    }
}

impl SessionState {
    pub fn new(remaining: Vec<Line>, settings: Settings) -> Self {
        Self {
            begin: Some(Utc::now()),
            original_length: remaining.len(),
            remaining: remaining.into(),
            settings,
            ..Self::default()
        }
    }

    /// Saturates instead of failing on out of range values read from disk.
    pub fn elapsed(&self) -> Duration {
        Duration::try_from_secs_f64(self.elapsed_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Entries still to be answered, later batches included.
    pub fn entries_left(&self) -> usize {
        self.remaining.len() + self.queued_batches.iter().map(Vec::len).sum::<usize>()
    }

    pub fn score(&self, round_to: Option<u32>) -> Result<f64> {
        score_percent(
            i64::from(self.mistake_count),
            self.original_length as i64,
            round_to,
        )
    }
}

mod begin_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Stamp(DateTime<Utc>),
        Naive(NaiveDateTime),
        Sentinel(i64),
        Null(()),
    }

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_str(&t.to_rfc3339()),
            None => s.serialize_i64(0),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Stamp(t) => Ok(Some(t)),
            Raw::Naive(t) => Ok(Some(t.and_utc())),
            Raw::Sentinel(0) | Raw::Null(()) => Ok(None),
            Raw::Sentinel(n) => Err(D::Error::custom(format!(
                "beginDateAndTime must be a timestamp or 0, got {n}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Side;

    fn sample() -> SessionState {
        let mut state = SessionState::new(
            vec![
                Line::new("hund", "dog", Side::Right, 1),
                Line::new("katze", "cat", Side::Left, 2),
            ],
            Settings::default(),
        );
        state.mistake_count = 1;
        state.current_position = 3;
        state.elapsed_secs = 12.5;
        state
    }

    #[test]
    fn json_roundtrip_keeps_entries_and_scalars() {
        let state = sample();
        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.remaining[0].answer_side, Side::Right);
        assert_eq!(back.remaining[1].index, 2);
    }

    #[test]
    fn uses_persisted_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        for key in [
            "beginDateAndTime",
            "timeLength",
            "mistakeCount",
            "currentLine",
            "remainingLines",
            "settings",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("queuedBatches").is_none());
    }

    #[test]
    fn zero_sentinel_means_unset() {
        let state: SessionState =
            serde_json::from_str(r#"{"beginDateAndTime": 0, "mistakeCount": 2}"#).unwrap();
        assert_eq!(state.begin, None);
        assert_eq!(state.mistake_count, 2);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["beginDateAndTime"], 0);
    }

    #[test]
    fn null_begin_time_means_unset() {
        let state: SessionState =
            serde_json::from_str(r#"{"beginDateAndTime": null, "currentLine": 1}"#).unwrap();
        assert_eq!(state.begin, None);
        assert_eq!(state.current_position, 1);
    }

    #[test]
    fn huge_elapsed_time_saturates() {
        let state: SessionState = serde_json::from_str(r#"{"timeLength": 1e30}"#).unwrap();
        assert_eq!(state.elapsed(), Duration::MAX);

        let state: SessionState = serde_json::from_str(r#"{"timeLength": -4.0}"#).unwrap();
        assert_eq!(state.elapsed(), Duration::ZERO);
    }

    #[test]
    fn other_numbers_are_rejected_as_begin_time() {
        let result = serde_json::from_str::<SessionState>(r#"{"beginDateAndTime": 5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn naive_timestamp_is_read_as_utc() {
        let state: SessionState =
            serde_json::from_str(r#"{"beginDateAndTime": "2024-03-01T10:00:00"}"#).unwrap();
        assert_eq!(state.begin.unwrap().to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn entries_left_counts_queued_batches() {
        let mut state = sample();
        state.queued_batches = vec![vec![Line::new("a", "b", Side::Left, 3)]];
        assert_eq!(state.entries_left(), 3);
    }
}
