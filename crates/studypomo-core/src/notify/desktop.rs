use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{NotificationId, NotificationRequest, NotificationService};
use crate::error::NotificationError;

type PendingMap = Arc<Mutex<HashMap<NotificationId, JoinHandle<()>>>>;

/// Desktop notifications delivered through the platform notification
/// daemon.
///
/// Delayed delivery is a tokio task per notification, so scheduling must
/// happen inside a tokio runtime. Cancelling aborts the task.
#[derive(Clone)]
pub struct DesktopNotifier {
    app_name: String,
    pending: PendingMap,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of notifications waiting to be shown.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl NotificationService for DesktopNotifier {
    async fn schedule_once_after(
        &self,
        delay_secs: u64,
        request: &NotificationRequest,
    ) -> Result<NotificationId, NotificationError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| NotificationError::Unsupported(e.to_string()))?;

        let id = NotificationId::new();
        let task_id = id.clone();
        let pending = Arc::clone(&self.pending);
        let app_name = self.app_name.clone();
        let request = request.clone();

        let mut map = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let task = runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&task_id);

            debug!(
                id = %task_id,
                route = %request.payload.route,
                params = ?request.payload.params,
                "delivering notification"
            );
            let shown = tokio::task::spawn_blocking(move || {
                notify_rust::Notification::new()
                    .appname(&app_name)
                    .summary(&request.title)
                    .body(&request.body)
                    .show()
                    .map(drop)
                    .map_err(|e| e.to_string())
            })
            .await;
            match shown {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(id = %task_id, "failed to show notification: {e}"),
                Err(e) => warn!(id = %task_id, "notification task failed: {e}"),
            }
        });
        map.insert(id.clone(), task);
        Ok(id)
    }

    async fn cancel(&self, id: &NotificationId) -> Result<(), NotificationError> {
        let task = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        if let Some(task) = task {
            task.abort();
        }
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        let drained: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .collect();
        for (_, task) in drained {
            task.abort();
        }
        Ok(())
    }
}

/// Accepts every request and shows nothing. Used when notifications are
/// disabled in the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl NotificationService for NullNotifier {
    async fn schedule_once_after(
        &self,
        _delay_secs: u64,
        _request: &NotificationRequest,
    ) -> Result<NotificationId, NotificationError> {
        Ok(NotificationId::new())
    }

    async fn cancel(&self, _id: &NotificationId) -> Result<(), NotificationError> {
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotificationError> {
        Ok(())
    }
}
