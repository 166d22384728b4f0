//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads or perform I/O - the caller passes the current time into
//! every command and carries out the returned [`Effect`]s.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> (expiry) -> Idle (next session)
//! ```
//!
//! Remaining time is always `total - (now - started_at)`. Resuming from a
//! pause back-dates `started_at` so that formula reproduces the paused value,
//! and ticks missed while the process was suspended are absorbed by the next
//! one.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&Settings::default());
//! let effects = engine.start(Utc::now());
//! // Once per second while running:
//! let effects = engine.tick(Utc::now());
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::scheduler::{Completion, SessionScheduler};
use super::session::SessionKind;
use crate::effects::{Command, Effect};
use crate::settings::Settings;

/// Whether the countdown is moving.
///
/// A running timer always has a start timestamp and never a paused value;
/// a paused timer is the reverse; an idle timer has neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunState {
    /// Not started, including a fresh session entered after expiry or skip.
    Idle,
    Running { started_at: DateTime<Utc> },
    Paused { remaining_secs: u64 },
}

/// Read-only view of the engine handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub session: SessionKind,
    pub running: bool,
    pub current_remaining_seconds: u64,
    pub total_seconds: u64,
    pub start_timestamp: Option<DateTime<Utc>>,
    pub paused_remaining_seconds: Option<u64>,
    pub cycle_count: u32,
    pub session_just_expired: bool,
    pub break_modal_open: bool,
    pub alarm_active: bool,
    pub cycle_started: bool,
    pub show_timer: bool,
}

/// Core timer engine.
///
/// All mutation goes through the command methods below.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    settings: Settings,
    scheduler: SessionScheduler,
    session: SessionKind,
    run: RunState,
    /// Length of the current session, fixed when the session begins.
    total_secs: u64,
    remaining_secs: u64,
    cycle_count: u32,
    session_just_expired: bool,
    break_modal_open: bool,
    alarm_active: bool,
    cycle_started: bool,
}

impl TimerEngine {
    /// Create an idle engine at the start of a Study session.
    pub fn new(settings: &Settings) -> Self {
        Self::with_scheduler(settings, SessionScheduler::default())
    }

    pub fn with_scheduler(settings: &Settings, scheduler: SessionScheduler) -> Self {
        let total_secs = settings.duration_secs(SessionKind::Study);
        Self {
            settings: settings.clone(),
            scheduler,
            session: SessionKind::Study,
            run: RunState::Idle,
            total_secs,
            remaining_secs: total_secs,
            cycle_count: 0,
            session_just_expired: false,
            break_modal_open: false,
            alarm_active: false,
            cycle_started: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> SessionKind {
        self.session
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_running(&self) -> bool {
        matches!(self.run, RunState::Running { .. })
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn break_modal_open(&self) -> bool {
        self.break_modal_open
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm_active
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let (start_timestamp, paused_remaining_seconds) = match self.run {
            RunState::Idle => (None, None),
            RunState::Running { started_at } => (Some(started_at), None),
            RunState::Paused { remaining_secs } => (None, Some(remaining_secs)),
        };
        TimerSnapshot {
            session: self.session,
            running: self.is_running(),
            current_remaining_seconds: self.remaining_secs,
            total_seconds: self.total_secs,
            start_timestamp,
            paused_remaining_seconds,
            cycle_count: self.cycle_count,
            session_just_expired: self.session_just_expired,
            break_modal_open: self.break_modal_open,
            alarm_active: self.alarm_active,
            cycle_started: self.cycle_started,
            show_timer: self.settings.show_timer,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply a single command.
    pub fn handle(&mut self, command: Command, now: DateTime<Utc>) -> Vec<Effect> {
        debug!(?command, session = %self.session, "timer command");
        match command {
            Command::Start => self.start(now),
            Command::Pause => self.pause(now),
            Command::Skip => self.skip(),
            Command::Reset => self.reset(),
            Command::Tick => self.tick(now),
            Command::DismissBreak => self.dismiss_break(),
        }
    }

    /// Start or resume the current session. No-op while already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let (started_at, remaining) = match self.run {
            RunState::Running { .. } => return Vec::new(),
            RunState::Paused { remaining_secs } => {
                let elapsed = self.total_secs.saturating_sub(remaining_secs);
                (now - Duration::seconds(elapsed as i64), remaining_secs)
            }
            RunState::Idle => (now, self.total_secs),
        };

        self.run = RunState::Running { started_at };
        self.remaining_secs = remaining;
        self.cycle_started = true;
        self.break_modal_open = false;
        self.session_just_expired = false;

        let mut effects = self.silence_alarm();
        effects.push(Effect::CancelNotifications);
        effects.push(Effect::ScheduleNotification {
            session: self.session,
            remaining_secs: remaining,
        });
        effects
    }

    /// Freeze the countdown. When not running this only silences the alarm.
    ///
    /// If the session already ran out (ticks were missed), this behaves as
    /// the expiry instead.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let RunState::Running { started_at } = self.run else {
            return self.silence_alarm();
        };
        let remaining = self.remaining_at(started_at, now);
        if remaining == 0 {
            return self.expire_now();
        }

        self.run = RunState::Paused {
            remaining_secs: remaining,
        };
        self.remaining_secs = remaining;

        let mut effects = self.silence_alarm();
        effects.push(Effect::CancelNotifications);
        effects
    }

    /// Recompute the remaining time from the wall clock.
    ///
    /// Only meaningful while running. Returns the expiry effects when the
    /// countdown reaches zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let RunState::Running { started_at } = self.run else {
            return Vec::new();
        };
        let remaining = self.remaining_at(started_at, now);
        if remaining == 0 {
            return self.expire_now();
        }
        self.remaining_secs = remaining;
        Vec::new()
    }

    /// End the current session early and move to the next one.
    pub fn skip(&mut self) -> Vec<Effect> {
        let ended = self.session;
        self.advance(Completion::Skipped);
        self.session_just_expired = false;
        info!(from = %ended, to = %self.session, cycle = self.cycle_count, "session skipped");

        let mut effects = self.silence_alarm();
        effects.push(Effect::CancelNotifications);
        effects
    }

    /// Back to a fresh Study session with the cycle cleared.
    pub fn reset(&mut self) -> Vec<Effect> {
        self.session = SessionKind::Study;
        self.total_secs = self.settings.duration_secs(SessionKind::Study);
        self.remaining_secs = self.total_secs;
        self.run = RunState::Idle;
        self.cycle_count = 0;
        self.session_just_expired = false;
        self.break_modal_open = false;
        self.cycle_started = false;

        let mut effects = self.silence_alarm();
        effects.push(Effect::CancelNotifications);
        effects
    }

    /// Close the break modal without touching the cycle.
    pub fn dismiss_break(&mut self) -> Vec<Effect> {
        self.break_modal_open = false;
        self.session_just_expired = false;
        self.silence_alarm()
    }

    /// Adopt newly confirmed settings.
    ///
    /// A running session keeps its length; otherwise the current session is
    /// rebuilt from the new durations and returns to idle.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        if !self.is_running() {
            self.total_secs = self.settings.duration_secs(self.session);
            self.remaining_secs = self.total_secs;
            self.run = RunState::Idle;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn remaining_at(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - started_at).num_seconds().max(0) as u64;
        self.total_secs.saturating_sub(elapsed)
    }

    fn expire_now(&mut self) -> Vec<Effect> {
        self.remaining_secs = 0;
        self.run = RunState::Paused { remaining_secs: 0 };
        self.session_just_expired = true;
        self.expire()
    }

    /// Runs only right after the countdown hit zero.
    fn expire(&mut self) -> Vec<Effect> {
        let ended = self.session;
        self.advance(Completion::Expired);
        self.alarm_active = true;
        info!(from = %ended, to = %self.session, cycle = self.cycle_count, "session expired");
        vec![Effect::CancelNotifications, Effect::PlayAlarm]
    }

    fn advance(&mut self, how: Completion) {
        let t = self.scheduler.transition(self.session, self.cycle_count, how);
        self.session = t.next;
        self.cycle_count = t.cycle_count;
        self.break_modal_open = t.break_modal_open;
        self.total_secs = self.settings.duration_secs(t.next);
        self.remaining_secs = self.total_secs;
        self.run = RunState::Idle;
    }

    fn silence_alarm(&mut self) -> Vec<Effect> {
        if self.alarm_active {
            self.alarm_active = false;
            vec![Effect::StopAlarm]
        } else {
            Vec::new()
        }
    }
}
