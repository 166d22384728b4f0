//! Mirroring the countdown into a single OS-level notification.
//!
//! Whenever the timer starts, the mirror replaces whatever was scheduled with
//! one "session ended" notification that fires when the countdown would
//! reach zero. Pausing, skipping, resetting or expiring cancels it.

mod desktop;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use desktop::{DesktopNotifier, NullNotifier};

use crate::error::NotificationError;
use crate::timer::SessionKind;

/// Route the navigation layer opens when a notification is tapped.
pub const STUDY_ROUTE: &str = "study";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for NotificationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the user is studying, carried into the notification so a tap can
/// land back on the right screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// Deep-link target consumed by the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub route: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub payload: NotificationPayload,
}

impl NotificationRequest {
    /// The notification shown when a session of `session` kind runs out.
    pub fn session_ended(session: SessionKind, context: &StudyContext) -> Self {
        let (title, body) = match session {
            SessionKind::Study => match &context.topic {
                Some(topic) => (
                    "Study session complete".to_string(),
                    format!("Nice work on {topic}. Time for a break."),
                ),
                None => (
                    "Study session complete".to_string(),
                    "Time for a break.".to_string(),
                ),
            },
            SessionKind::ShortBreak | SessionKind::LongBreak => (
                "Break is over".to_string(),
                "Ready to get back to studying?".to_string(),
            ),
        };

        let mut params = BTreeMap::new();
        params.insert("session".to_string(), session_param(session).to_string());
        if let Some(note_id) = &context.note_id {
            params.insert("noteId".to_string(), note_id.clone());
        }
        if let Some(topic) = &context.topic {
            params.insert("topic".to_string(), topic.clone());
        }

        Self {
            title,
            body,
            payload: NotificationPayload {
                route: STUDY_ROUTE.to_string(),
                params,
            },
        }
    }
}

fn session_param(session: SessionKind) -> &'static str {
    match session {
        SessionKind::Study => "study",
        SessionKind::ShortBreak => "short_break",
        SessionKind::LongBreak => "long_break",
    }
}

/// The OS notification subsystem.
pub trait NotificationService {
    /// Show `request` once, `delay_secs` from now.
    fn schedule_once_after(
        &self,
        delay_secs: u64,
        request: &NotificationRequest,
    ) -> impl Future<Output = Result<NotificationId, NotificationError>> + Send;

    fn cancel(
        &self,
        id: &NotificationId,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;

    fn cancel_all(&self) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

/// Keeps at most one "session ended" notification outstanding.
pub struct NotificationMirror<S> {
    service: S,
    outstanding: Option<NotificationId>,
}

impl<S: NotificationService> NotificationMirror<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            outstanding: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Id of the notification this mirror last scheduled, if still pending.
    pub fn outstanding(&self) -> Option<&NotificationId> {
        self.outstanding.as_ref()
    }

    /// Replace any pending notification with one firing in `remaining_secs`.
    ///
    /// Cancellation always completes before the new notification is
    /// scheduled.
    pub async fn schedule(
        &mut self,
        session: SessionKind,
        remaining_secs: u64,
        context: &StudyContext,
    ) -> Result<NotificationId, NotificationError> {
        self.cancel_all().await;

        let request = NotificationRequest::session_ended(session, context);
        let id = self
            .service
            .schedule_once_after(remaining_secs, &request)
            .await?;
        debug!(%id, %session, remaining_secs, "session-end notification scheduled");
        self.outstanding = Some(id.clone());
        Ok(id)
    }

    /// Cancel everything. Failures are logged; the countdown stays
    /// authoritative regardless.
    pub async fn cancel_all(&mut self) {
        let outstanding = self.outstanding.take();
        if let Err(e) = self.service.cancel_all().await {
            warn!("failed to cancel notifications: {e}");
            if let Some(id) = outstanding {
                if let Err(e) = self.service.cancel(&id).await {
                    warn!(%id, "failed to cancel notification: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        scheduled: Mutex<Vec<(NotificationId, u64, NotificationRequest)>>,
        fail_cancel_all: AtomicBool,
    }

    impl NotificationService for RecordingService {
        async fn schedule_once_after(
            &self,
            delay_secs: u64,
            request: &NotificationRequest,
        ) -> Result<NotificationId, NotificationError> {
            let id = NotificationId::new();
            self.scheduled
                .lock()
                .unwrap()
                .push((id.clone(), delay_secs, request.clone()));
            Ok(id)
        }

        async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
            self.scheduled.lock().unwrap().retain(|(i, _, _)| i != id);
            Ok(())
        }

        async fn cancel_all(&self) -> Result<(), NotificationError> {
            if self.fail_cancel_all.load(Ordering::SeqCst) {
                return Err(NotificationError::Service("denied".into()));
            }
            self.scheduled.lock().unwrap().clear();
            Ok(())
        }
    }

    fn block_on<F: Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[test]
    fn rescheduling_keeps_a_single_notification() {
        let mut mirror = NotificationMirror::new(RecordingService::default());
        let ctx = StudyContext::default();
        block_on(async {
            mirror.schedule(SessionKind::Study, 1500, &ctx).await.unwrap();
            mirror.schedule(SessionKind::Study, 1200, &ctx).await.unwrap();
        });
        let scheduled = mirror.service().scheduled.lock().unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].1, 1200);
        assert_eq!(mirror.outstanding(), Some(&scheduled[0].0));
    }

    #[test]
    fn cancel_all_clears_outstanding() {
        let mut mirror = NotificationMirror::new(RecordingService::default());
        block_on(async {
            mirror
                .schedule(SessionKind::Study, 60, &StudyContext::default())
                .await
                .unwrap();
            mirror.cancel_all().await;
        });
        assert!(mirror.outstanding().is_none());
        assert!(mirror.service().scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_cancel_all_falls_back_to_cancel_by_id() {
        let mut mirror = NotificationMirror::new(RecordingService::default());
        block_on(async {
            mirror
                .schedule(SessionKind::Study, 60, &StudyContext::default())
                .await
                .unwrap();
            mirror.service().fail_cancel_all.store(true, Ordering::SeqCst);
            mirror
                .schedule(SessionKind::ShortBreak, 300, &StudyContext::default())
                .await
                .unwrap();
        });
        let scheduled = mirror.service().scheduled.lock().unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].1, 300);
    }

    #[test]
    fn payload_deep_links_to_study_screen() {
        let ctx = StudyContext {
            note_id: Some("note-17".into()),
            topic: Some("Organic chemistry".into()),
        };
        let req = NotificationRequest::session_ended(SessionKind::Study, &ctx);
        assert_eq!(req.payload.route, STUDY_ROUTE);
        assert_eq!(req.payload.params["noteId"], "note-17");
        assert_eq!(req.payload.params["session"], "study");
        assert!(req.body.contains("Organic chemistry"));

        let req = NotificationRequest::session_ended(SessionKind::LongBreak, &StudyContext::default());
        assert_eq!(req.title, "Break is over");
        assert_eq!(req.payload.params.get("noteId"), None);
        assert_eq!(req.payload.params["session"], "long_break");
    }
}
