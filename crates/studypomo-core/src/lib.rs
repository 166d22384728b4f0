//! # StudyPomo Core Library
//!
//! This library provides the pomodoro session engine behind the StudyPomo
//! study aid. The UI layer (the bundled CLI, or any other host) drives it
//! through [`StudySession`] and renders [`TimerSnapshot`]s.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based reducer over user commands and a
//!   1 Hz tick that returns side effects instead of performing them
//! - **Session Scheduler**: Study/break alternation with a long break every
//!   [`LONG_BREAK_CADENCE`] study sessions
//! - **Settings**: Active/pending reconciliation against a remote REST store
//! - **Notifications**: One OS notification mirrored to the countdown
//! - **Alarm**: A single owned audio resource rung on session end
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`StudySession`]: Engine plus the I/O it drives
//! - [`SettingsStore`]: Active and pending settings
//! - [`Config`]: Local configuration management

pub mod alarm;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod notify;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod timer;

pub use alarm::{AlarmController, AlarmSound, AudioBackend, RodioBackend, SilentBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use effects::{Command, Effect};
pub use error::{
    AudioError, ConfigError, CoreError, GatewayError, NotificationError, SessionClosed,
    SettingsError, ValidationError,
};
pub use notify::{
    DesktopNotifier, NotificationId, NotificationMirror, NotificationRequest, NotificationService,
    NullNotifier, StudyContext,
};
pub use session::StudySession;
pub use settings::{HttpSettingsGateway, Settings, SettingsGateway, SettingsStore};
pub use timer::{RunState, SessionKind, SessionScheduler, TimerEngine, TimerSnapshot, LONG_BREAK_CADENCE};
