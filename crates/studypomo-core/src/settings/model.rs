//! The settings record shared with the remote store.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::timer::SessionKind;

pub const STUDY_MINUTES_RANGE: (u32, u32) = (1, 120);
pub const SHORT_BREAK_MINUTES_RANGE: (u32, u32) = (1, 15);
pub const LONG_BREAK_MINUTES_RANGE: (u32, u32) = (2, 30);

/// User-facing pomodoro settings.
///
/// Wire format is camelCase to match the settings REST contract. `id` is
/// assigned by the server and never sent in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "deserialize_optional_id"
    )]
    pub id: Option<String>,
    #[serde(default = "default_study_minutes")]
    pub study_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_true")]
    pub show_timer: bool,
}

fn default_study_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: None,
            study_minutes: default_study_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            show_timer: true,
        }
    }
}

impl Settings {
    /// Full length of a session of the given kind, in seconds.
    pub fn duration_secs(&self, kind: SessionKind) -> u64 {
        let minutes = match kind {
            SessionKind::Study => self.study_minutes,
            SessionKind::ShortBreak => self.short_break_minutes,
            SessionKind::LongBreak => self.long_break_minutes,
        };
        u64::from(minutes).saturating_mul(60)
    }

    /// Check every field against its allowed range.
    ///
    /// Reports the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("Study minutes", self.study_minutes, STUDY_MINUTES_RANGE)?;
        check(
            "Short break minutes",
            self.short_break_minutes,
            SHORT_BREAK_MINUTES_RANGE,
        )?;
        check(
            "Long break minutes",
            self.long_break_minutes,
            LONG_BREAK_MINUTES_RANGE,
        )?;
        Ok(())
    }

    /// Copy with every numeric field pulled into range.
    pub fn clamped(&self) -> Self {
        Self {
            study_minutes: clamp(self.study_minutes, STUDY_MINUTES_RANGE),
            short_break_minutes: clamp(self.short_break_minutes, SHORT_BREAK_MINUTES_RANGE),
            long_break_minutes: clamp(self.long_break_minutes, LONG_BREAK_MINUTES_RANGE),
            ..self.clone()
        }
    }

    /// True when both records carry the same user-editable values.
    pub fn same_values(&self, other: &Settings) -> bool {
        self.study_minutes == other.study_minutes
            && self.short_break_minutes == other.short_break_minutes
            && self.long_break_minutes == other.long_break_minutes
            && self.show_timer == other.show_timer
    }
}

fn check(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

fn clamp(value: u32, (min, max): (u32, u32)) -> u32 {
    value.clamp(min, max)
}

/// Accepts ids sent as JSON strings or numbers.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
