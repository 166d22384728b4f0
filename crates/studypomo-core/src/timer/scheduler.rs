//! Session transition rules.
//!
//! A finished Study session always counts toward the cycle and is followed
//! by a break; every `cadence`-th break is a long one. A finished break
//! always returns to Study. Expiry and skip share the same cadence.

use serde::{Deserialize, Serialize};

use super::session::SessionKind;

/// Completed study sessions between long breaks.
pub const LONG_BREAK_CADENCE: u32 = 4;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// The countdown reached zero.
    Expired,
    /// The user skipped ahead.
    Skipped,
}

/// Outcome of ending a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionKind,
    pub cycle_count: u32,
    pub break_modal_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScheduler {
    cadence: u32,
}

impl Default for SessionScheduler {
    fn default() -> Self {
        Self {
            cadence: LONG_BREAK_CADENCE,
        }
    }
}

impl SessionScheduler {
    /// A cadence of zero is treated as one (every break is long).
    pub fn with_cadence(cadence: u32) -> Self {
        Self {
            cadence: cadence.max(1),
        }
    }

    pub fn cadence(&self) -> u32 {
        self.cadence
    }

    /// Decide what follows `from` given the number of study sessions
    /// completed so far.
    pub fn transition(&self, from: SessionKind, cycle_count: u32, how: Completion) -> Transition {
        match from {
            SessionKind::Study => {
                let cycle_count = cycle_count.saturating_add(1);
                let next = if cycle_count % self.cadence == 0 {
                    SessionKind::LongBreak
                } else {
                    SessionKind::ShortBreak
                };
                Transition {
                    next,
                    cycle_count,
                    break_modal_open: how == Completion::Expired,
                }
            }
            SessionKind::ShortBreak | SessionKind::LongBreak => Transition {
                next: SessionKind::Study,
                cycle_count,
                break_modal_open: false,
            },
        }
    }
}
