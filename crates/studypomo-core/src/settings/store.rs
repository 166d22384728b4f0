//! Active/pending settings reconciliation.
//!
//! `active` governs the running engine and only changes after the gateway
//! confirms a save. `pending` is the user's draft and is never read by the
//! engine.

use tracing::{debug, info, warn};

use super::gateway::SettingsGateway;
use super::model::Settings;
use crate::error::SettingsError;

pub struct SettingsStore<G> {
    gateway: G,
    active: Settings,
    pending: Settings,
}

impl<G: SettingsGateway> SettingsStore<G> {
    /// Create a store with default settings. Call [`load`](Self::load) to
    /// hydrate from the remote record.
    pub fn new(gateway: G) -> Self {
        Self::with_active(gateway, Settings::default())
    }

    pub fn with_active(gateway: G, active: Settings) -> Self {
        Self {
            gateway,
            pending: active.clone(),
            active,
        }
    }

    pub fn active(&self) -> &Settings {
        &self.active
    }

    pub fn pending(&self) -> &Settings {
        &self.pending
    }

    /// Mutable access to the draft. Edits are not validated until saved.
    pub fn pending_mut(&mut self) -> &mut Settings {
        &mut self.pending
    }

    /// True when the draft differs from the active configuration.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.pending.same_values(&self.active)
    }

    /// Throw away the draft.
    pub fn discard_pending(&mut self) {
        self.pending = self.active.clone();
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Hydrate from the remote store.
    ///
    /// When no record exists the current (default) settings stay active.
    /// On failure nothing changes.
    pub async fn load(&mut self) -> Result<&Settings, SettingsError> {
        match self.gateway.fetch().await? {
            Some(remote) => {
                let remote = within_range(remote);
                info!(id = ?remote.id, study_minutes = remote.study_minutes, "loaded remote settings");
                self.active = remote.clone();
                self.pending = remote;
            }
            None => debug!("no remote settings record, keeping defaults"),
        }
        Ok(&self.active)
    }

    /// Persist the current draft.
    pub async fn save_pending(&mut self) -> Result<&Settings, SettingsError> {
        let draft = self.pending.clone();
        self.save(draft).await
    }

    /// Validate and persist `draft`.
    ///
    /// Updates the existing record when `active` has an id, otherwise
    /// creates one. On success `active` and `pending` both become the
    /// confirmed record. On any error `active` is untouched.
    pub async fn save(&mut self, draft: Settings) -> Result<&Settings, SettingsError> {
        draft.validate()?;

        let result = match &self.active.id {
            Some(id) => self.gateway.update(id, &draft).await,
            None => self.gateway.create(&draft).await,
        };

        match result {
            Ok(saved) => {
                let saved = within_range(saved);
                info!(
                    id = ?saved.id,
                    study_minutes = saved.study_minutes,
                    short_break_minutes = saved.short_break_minutes,
                    long_break_minutes = saved.long_break_minutes,
                    "settings saved"
                );
                self.active = saved.clone();
                self.pending = saved;
                Ok(&self.active)
            }
            Err(e) => {
                warn!("settings save failed, keeping last known good: {e}");
                Err(e.into())
            }
        }
    }

    /// Return to defaults, e.g. after logout.
    pub fn reset_to_defaults(&mut self) {
        self.active = Settings::default();
        self.pending = Settings::default();
    }
}

/// Pull a record from the remote store into the allowed ranges.
fn within_range(record: Settings) -> Settings {
    let clamped = record.clamped();
    if clamped != record {
        warn!(
            study_minutes = record.study_minutes,
            short_break_minutes = record.short_break_minutes,
            long_break_minutes = record.long_break_minutes,
            "remote settings out of range, clamping"
        );
    }
    clamped
}
