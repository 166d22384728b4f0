use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Side effects requested by the timer engine.
///
/// The engine never performs I/O itself; every state change returns the
/// effects the session runner must carry out, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Drop every outstanding "session ended" notification.
    CancelNotifications,
    /// Schedule the "session ended" notification to fire after
    /// `remaining_secs`.
    ScheduleNotification {
        session: SessionKind,
        remaining_secs: u64,
    },
    /// Start the alarm from the beginning.
    PlayAlarm,
    /// Silence the alarm.
    StopAlarm,
}

/// User actions and the periodic tick, as consumed by
/// [`TimerEngine::handle`](crate::timer::TimerEngine::handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Skip,
    Reset,
    Tick,
    DismissBreak,
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "resume" => Ok(Command::Start),
            "pause" => Ok(Command::Pause),
            "skip" => Ok(Command::Skip),
            "reset" => Ok(Command::Reset),
            "tick" => Ok(Command::Tick),
            "dismiss" | "dismiss_break" => Ok(Command::DismissBreak),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_aliases() {
        assert_eq!("Start".parse::<Command>(), Ok(Command::Start));
        assert_eq!(" resume ".parse::<Command>(), Ok(Command::Start));
        assert_eq!("dismiss".parse::<Command>(), Ok(Command::DismissBreak));
        assert!("explode".parse::<Command>().is_err());
    }

    #[test]
    fn effect_serializes_with_type_tag() {
        let json = serde_json::to_value(Effect::ScheduleNotification {
            session: SessionKind::ShortBreak,
            remaining_secs: 300,
        })
        .unwrap();
        assert_eq!(json["type"], "schedule_notification");
        assert_eq!(json["session"], "short_break");
        assert_eq!(json["remaining_secs"], 300);
    }
}
