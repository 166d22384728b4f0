//! Drives a [`StudySession`] from a 1 Hz tick and a command channel.
//!
//! Requests are handled one at a time in arrival order and always before a
//! tick that became due at the same moment, so a start or pause is applied
//! before the next tick reads the timer.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::alarm::AudioBackend;
use crate::effects::Command;
use crate::error::SessionClosed;
use crate::notify::{NotificationService, StudyContext};
use crate::session::StudySession;
use crate::settings::SettingsGateway;
use crate::timer::TimerSnapshot;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_BUFFER: usize = 32;

#[derive(Debug, Clone)]
pub enum Request {
    Command(Command),
    SetContext(StudyContext),
    Logout,
    Shutdown,
}

/// Cloneable handle for the UI layer.
#[derive(Clone)]
pub struct SessionHandle {
    requests: mpsc::Sender<Request>,
    state: watch::Receiver<TimerSnapshot>,
}

impl SessionHandle {
    pub async fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.request(Request::Command(command)).await
    }

    pub async fn request(&self, request: Request) -> Result<(), SessionClosed> {
        self.requests.send(request).await.map_err(|_| SessionClosed)
    }

    /// Latest published state.
    pub fn state(&self) -> TimerSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.state.clone()
    }

    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.request(Request::Shutdown).await
    }
}

/// The driver's end of the channels.
pub struct SessionInbox {
    requests: mpsc::Receiver<Request>,
    state: watch::Sender<TimerSnapshot>,
}

/// Create a handle/inbox pair seeded with `initial` state.
pub fn channel(initial: TimerSnapshot) -> (SessionHandle, SessionInbox) {
    let (req_tx, req_rx) = mpsc::channel(REQUEST_BUFFER);
    let (state_tx, state_rx) = watch::channel(initial);
    (
        SessionHandle {
            requests: req_tx,
            state: state_rx,
        },
        SessionInbox {
            requests: req_rx,
            state: state_tx,
        },
    )
}

/// Run until a [`Request::Shutdown`] arrives or every handle is dropped.
///
/// Returns the session after it has been shut down.
pub async fn run<G, N, A>(
    mut session: StudySession<G, N, A>,
    mut inbox: SessionInbox,
) -> StudySession<G, N, A>
where
    G: SettingsGateway,
    N: NotificationService,
    A: AudioBackend,
{
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    inbox.state.send_replace(session.get_state());
    info!("session runtime started");

    loop {
        tokio::select! {
            biased;
            request = inbox.requests.recv() => match request {
                Some(Request::Command(command)) => {
                    session.dispatch(command).await;
                }
                Some(Request::SetContext(context)) => session.set_context(context),
                Some(Request::Logout) => {
                    session.logout().await;
                }
                Some(Request::Shutdown) | None => break,
            },
            _ = ticker.tick() => {
                if !session.engine().is_running() {
                    continue;
                }
                session.tick().await;
            }
        }
        inbox.state.send_if_modified(|current| {
            let next = session.get_state();
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    debug!("session runtime stopping");
    session.shutdown().await;
    session
}
