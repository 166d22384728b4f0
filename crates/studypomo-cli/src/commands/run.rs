//! Interactive session driven by line commands on stdin.
//!
//! Every state change is printed to stdout as one JSON line. Logs go to
//! stderr so stdout stays machine-readable.

use std::sync::Arc;

use clap::Args;
use studypomo_core::runtime::{self, Request, SessionHandle};
use studypomo_core::{
    AlarmController, AudioBackend, Command, Config, DesktopNotifier, NotificationMirror,
    NotificationService, NullNotifier, RodioBackend, SettingsStore, SilentBackend, StudyContext,
    StudySession, SystemClock, TimerSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{gateway, CommandResult};

const APP_NAME: &str = "StudyPomo";

#[derive(Args)]
pub struct RunArgs {
    /// Note the session is attached to, carried in notification deep links
    #[arg(long)]
    pub note_id: Option<String>,
    /// Topic being studied
    #[arg(long)]
    pub topic: Option<String>,
}

pub async fn run(args: RunArgs, config: Config) -> CommandResult {
    let context = StudyContext {
        note_id: args.note_id,
        topic: args.topic,
    };
    if config.notifications.enabled {
        with_notifier(DesktopNotifier::new(APP_NAME), context, config).await
    } else {
        with_notifier(NullNotifier, context, config).await
    }
}

async fn with_notifier<N>(notifier: N, context: StudyContext, config: Config) -> CommandResult
where
    N: NotificationService,
{
    if config.alarm.enabled {
        let backend = RodioBackend::new(config.alarm.volume, config.alarm.looped);
        drive(notifier, backend, context, config).await
    } else {
        drive(notifier, SilentBackend, context, config).await
    }
}

async fn drive<N, A>(notifier: N, backend: A, context: StudyContext, config: Config) -> CommandResult
where
    N: NotificationService,
    A: AudioBackend,
{
    let alarm = AlarmController::new(backend, config.alarm_sound());
    let mut session = StudySession::new(
        SettingsStore::new(gateway(&config)?),
        NotificationMirror::new(notifier),
        alarm,
        Arc::new(SystemClock),
    );
    session.set_context(context);
    if let Err(e) = session.load_settings().await {
        warn!("could not load remote settings, using defaults: {e}");
    }

    let (handle, inbox) = runtime::channel(session.get_state());
    let printer = print_states(handle.subscribe());
    let reader = read_commands(handle);
    let (_, printed, read) = tokio::join!(runtime::run(session, inbox), printer, reader);
    printed?;
    read?;
    info!("session ended");
    Ok(())
}

fn print_state(state: &TimerSnapshot) -> CommandResult {
    println!("{}", serde_json::to_string(state)?);
    Ok(())
}

async fn print_states(mut states: watch::Receiver<TimerSnapshot>) -> CommandResult {
    print_state(&states.borrow_and_update())?;
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        print_state(&state)?;
    }
    Ok(())
}

async fn read_commands(handle: SessionHandle) -> CommandResult {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "status" => print_state(&handle.state())?,
            other => match other.parse::<Command>() {
                Ok(command) => {
                    if handle.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{e}"),
            },
        }
    }
    // Closed sessions reject the request; nothing left to stop.
    let _ = handle.request(Request::Shutdown).await;
    Ok(())
}
