//! The session host: timer engine plus the I/O it drives.
//!
//! Every operation applies a command to the [`TimerEngine`] synchronously,
//! then carries out the returned effects in order. Effect failures are
//! logged and never roll back engine state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::alarm::{AlarmController, AudioBackend};
use crate::clock::Clock;
use crate::effects::{Command, Effect};
use crate::error::SettingsError;
use crate::notify::{NotificationMirror, NotificationService, StudyContext};
use crate::settings::{Settings, SettingsGateway, SettingsStore};
use crate::timer::{TimerEngine, TimerSnapshot};

type Listener = Box<dyn FnMut(&TimerSnapshot) + Send>;

pub struct StudySession<G, N, A: AudioBackend> {
    engine: TimerEngine,
    settings: SettingsStore<G>,
    mirror: NotificationMirror<N>,
    alarm: AlarmController<A>,
    clock: Arc<dyn Clock>,
    context: StudyContext,
    listeners: Vec<Listener>,
}

impl<G, N, A> StudySession<G, N, A>
where
    G: SettingsGateway,
    N: NotificationService,
    A: AudioBackend,
{
    /// Build a session whose engine starts from the store's active settings.
    pub fn new(
        settings: SettingsStore<G>,
        mirror: NotificationMirror<N>,
        alarm: AlarmController<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine: TimerEngine::new(settings.active()),
            settings,
            mirror,
            alarm,
            clock,
            context: StudyContext::default(),
            listeners: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get_state(&self) -> TimerSnapshot {
        self.engine.snapshot()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn settings(&self) -> &SettingsStore<G> {
        &self.settings
    }

    pub fn mirror(&self) -> &NotificationMirror<N> {
        &self.mirror
    }

    pub fn alarm(&self) -> &AlarmController<A> {
        &self.alarm
    }

    pub fn context(&self) -> &StudyContext {
        &self.context
    }

    /// Register a callback invoked with the new state after every tick and
    /// every other state change.
    pub fn on_tick<F>(&mut self, callback: F)
    where
        F: FnMut(&TimerSnapshot) + Send + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    // ── Timer operations ─────────────────────────────────────────────

    pub async fn start(&mut self) -> TimerSnapshot {
        self.dispatch(Command::Start).await
    }

    pub async fn pause(&mut self) -> TimerSnapshot {
        self.dispatch(Command::Pause).await
    }

    pub async fn skip(&mut self) -> TimerSnapshot {
        self.dispatch(Command::Skip).await
    }

    pub async fn reset(&mut self) -> TimerSnapshot {
        self.dispatch(Command::Reset).await
    }

    pub async fn tick(&mut self) -> TimerSnapshot {
        self.dispatch(Command::Tick).await
    }

    pub async fn dismiss_break(&mut self) -> TimerSnapshot {
        self.dispatch(Command::DismissBreak).await
    }

    /// Apply `command` at the current wall-clock time.
    pub async fn dispatch(&mut self, command: Command) -> TimerSnapshot {
        let now = self.clock.now();
        let effects = self.engine.handle(command, now);
        self.run_effects(effects).await;
        self.publish()
    }

    /// Deep-link context for notifications scheduled from now on.
    pub fn set_context(&mut self, context: StudyContext) {
        self.context = context;
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn pending_settings(&self) -> &Settings {
        self.settings.pending()
    }

    pub fn pending_settings_mut(&mut self) -> &mut Settings {
        self.settings.pending_mut()
    }

    /// Hydrate from the remote settings record.
    pub async fn load_settings(&mut self) -> Result<TimerSnapshot, SettingsError> {
        self.settings.load().await?;
        self.engine.apply_settings(self.settings.active());
        Ok(self.publish())
    }

    /// Validate and persist `draft`; on success the engine adopts it.
    ///
    /// On failure the engine keeps running under the last confirmed
    /// settings.
    pub async fn save_settings(&mut self, draft: Settings) -> Result<TimerSnapshot, SettingsError> {
        self.settings.save(draft).await?;
        self.engine.apply_settings(self.settings.active());
        Ok(self.publish())
    }

    /// Persist the current pending draft.
    pub async fn save_pending_settings(&mut self) -> Result<TimerSnapshot, SettingsError> {
        let draft = self.settings.pending().clone();
        self.save_settings(draft).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Forget the user: default settings, fresh engine, nothing scheduled,
    /// nothing ringing.
    pub async fn logout(&mut self) -> TimerSnapshot {
        info!("logging out, resetting session");
        self.settings.reset_to_defaults();
        self.engine.apply_settings(self.settings.active());
        let effects = self.engine.reset();
        self.run_effects(effects).await;
        self.alarm.stop();
        self.context = StudyContext::default();
        self.publish()
    }

    /// Cancel outstanding notifications and release the audio resource.
    pub async fn shutdown(&mut self) {
        self.mirror.cancel_all().await;
        self.alarm.unload();
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            debug!(?effect, "running effect");
            match effect {
                Effect::CancelNotifications => self.mirror.cancel_all().await,
                Effect::ScheduleNotification {
                    session,
                    remaining_secs,
                } => {
                    if let Err(e) = self
                        .mirror
                        .schedule(session, remaining_secs, &self.context)
                        .await
                    {
                        warn!("failed to schedule session-end notification: {e}");
                    }
                }
                Effect::PlayAlarm => self.alarm.play(),
                Effect::StopAlarm => self.alarm.stop(),
            }
        }
    }

    fn publish(&mut self) -> TimerSnapshot {
        let snapshot = self.engine.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
        snapshot
    }
}
