//! Session-end alarm.
//!
//! [`AlarmController`] exclusively owns one audio resource, loaded on first
//! use and kept until [`AlarmController::unload`] (or drop). Playback errors
//! are logged and swallowed.

mod rodio_backend;

use std::path::PathBuf;

use tracing::{debug, warn};

pub use rodio_backend::{RodioAlarm, RodioBackend, SilentBackend};

use crate::error::AudioError;

/// Which sound the alarm plays.
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmSound {
    /// Audio file on disk.
    File(PathBuf),
    /// Generated sine tone.
    Tone { frequency_hz: f32, duration_ms: u64 },
}

impl Default for AlarmSound {
    fn default() -> Self {
        AlarmSound::Tone {
            frequency_hz: 880.0,
            duration_ms: 1500,
        }
    }
}

/// The OS audio subsystem as seen by the alarm.
pub trait AudioBackend {
    type Handle;

    fn load(&mut self, sound: &AlarmSound) -> Result<Self::Handle, AudioError>;

    /// Play from the beginning, replacing anything still playing.
    fn play(&mut self, handle: &mut Self::Handle) -> Result<(), AudioError>;

    fn stop(&mut self, handle: &mut Self::Handle) -> Result<(), AudioError>;

    fn unload(&mut self, handle: Self::Handle);
}

pub struct AlarmController<B: AudioBackend> {
    backend: B,
    sound: AlarmSound,
    handle: Option<B::Handle>,
    active: bool,
}

impl<B: AudioBackend> AlarmController<B> {
    pub fn new(backend: B, sound: AlarmSound) -> Self {
        Self {
            backend,
            sound,
            handle: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ring from the start. Loads the sound on first call.
    pub fn play(&mut self) {
        self.active = true;
        if self.handle.is_none() {
            match self.backend.load(&self.sound) {
                Ok(handle) => {
                    debug!(sound = ?self.sound, "alarm sound loaded");
                    self.handle = Some(handle);
                }
                Err(e) => {
                    warn!("failed to load alarm sound: {e}");
                    return;
                }
            }
        }
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = self.backend.play(handle) {
                warn!("failed to play alarm: {e}");
            }
        }
    }

    /// Silence the alarm. Safe to call when nothing is playing.
    pub fn stop(&mut self) {
        self.active = false;
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = self.backend.stop(handle) {
                warn!("failed to stop alarm: {e}");
            }
        }
    }

    /// Release the audio resource. A later `play` loads it again.
    pub fn unload(&mut self) {
        self.active = false;
        if let Some(handle) = self.handle.take() {
            self.backend.unload(handle);
            debug!("alarm sound unloaded");
        }
    }
}

impl<B: AudioBackend> Drop for AlarmController<B> {
    fn drop(&mut self) {
        self.unload();
    }
}
