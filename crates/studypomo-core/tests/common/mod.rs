//! Shared fakes for session integration tests.
//!
//! Each fake records what the session asked of it so tests can assert on
//! the I/O side of the engine without touching the network, the desktop
//! or the sound card.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use studypomo_core::{
    AlarmController, AlarmSound, AudioBackend, AudioError, GatewayError, ManualClock,
    NotificationError, NotificationId, NotificationMirror, NotificationRequest,
    NotificationService, Settings, SettingsGateway, SettingsStore, StudySession,
};

/// In-memory settings store. `fail` makes every call error.
#[derive(Default)]
pub struct FakeGateway {
    pub record: Mutex<Option<Settings>>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_record(record: Settings) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(GatewayError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl SettingsGateway for FakeGateway {
    async fn fetch(&self) -> Result<Option<Settings>, GatewayError> {
        self.check()?;
        Ok(self.record.lock().unwrap().clone())
    }

    async fn create(&self, settings: &Settings) -> Result<Settings, GatewayError> {
        self.check()?;
        let saved = Settings {
            id: Some("1".into()),
            ..settings.clone()
        };
        *self.record.lock().unwrap() = Some(saved.clone());
        Ok(saved)
    }

    async fn update(&self, id: &str, settings: &Settings) -> Result<Settings, GatewayError> {
        self.check()?;
        let saved = Settings {
            id: Some(id.to_string()),
            ..settings.clone()
        };
        *self.record.lock().unwrap() = Some(saved.clone());
        Ok(saved)
    }
}

/// Notification service that keeps scheduled requests in a map.
#[derive(Default)]
pub struct FakeNotifier {
    pub outstanding: Mutex<HashMap<NotificationId, (u64, NotificationRequest)>>,
    pub scheduled_total: AtomicUsize,
    pub fail_schedule: bool,
}

impl FakeNotifier {
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.lock().unwrap().len()
    }

    /// The single outstanding notification's delay and request.
    pub fn only(&self) -> Option<(u64, NotificationRequest)> {
        let map = self.outstanding.lock().unwrap();
        assert!(map.len() <= 1, "more than one notification outstanding");
        map.values().next().cloned()
    }
}

impl NotificationService for FakeNotifier {
    async fn schedule_once_after(
        &self,
        delay_secs: u64,
        request: &NotificationRequest,
    ) -> Result<NotificationId, NotificationError> {
        if self.fail_schedule {
            return Err(NotificationError::Service("permission denied".into()));
        }
        self.scheduled_total.fetch_add(1, Ordering::SeqCst);
        let id = NotificationId::new();
        self.outstanding
            .lock()
            .unwrap()
            .insert(id.clone(), (delay_secs, request.clone()));
        Ok(id)
    }

    async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        self.outstanding.lock().unwrap().remove(id);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.outstanding.lock().unwrap().clear();
        Ok(())
    }
}

/// Audio backend counting calls. Shared counters survive the session.
#[derive(Default, Clone)]
pub struct FakeAudio {
    pub loads: Arc<AtomicUsize>,
    pub plays: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
    pub unloads: Arc<AtomicUsize>,
}

impl FakeAudio {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioBackend for FakeAudio {
    type Handle = ();

    fn load(&mut self, _sound: &AlarmSound) -> Result<(), AudioError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn play(&mut self, _handle: &mut ()) -> Result<(), AudioError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self, _handle: &mut ()) -> Result<(), AudioError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unload(&mut self, _handle: ()) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

pub type TestSession = StudySession<FakeGateway, FakeNotifier, FakeAudio>;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 6, 14, 0, 0).unwrap()
}

/// Session on default settings (25/5/15) with a manual clock at [`t0`].
pub fn session() -> (TestSession, ManualClock, FakeAudio) {
    session_with(FakeGateway::default(), FakeNotifier::default())
}

pub fn session_with(gateway: FakeGateway, notifier: FakeNotifier) -> (TestSession, ManualClock, FakeAudio) {
    let clock = ManualClock::new(t0());
    let audio = FakeAudio::default();
    let session = StudySession::new(
        SettingsStore::new(gateway),
        NotificationMirror::new(notifier),
        AlarmController::new(audio.clone(), AlarmSound::default()),
        Arc::new(clock.clone()),
    );
    (session, clock, audio)
}

pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(f)
}
