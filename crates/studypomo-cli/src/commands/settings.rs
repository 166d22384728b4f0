use clap::Subcommand;
use serde_json::json;
use studypomo_core::{Config, Settings, SettingsStore};

use super::{gateway, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the stored settings as JSON
    Show,
    /// Change one or more settings
    Set {
        /// Study session length in minutes (1-120)
        #[arg(long)]
        study: Option<u32>,
        /// Short break length in minutes (1-15)
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break length in minutes (2-30)
        #[arg(long)]
        long_break: Option<u32>,
        /// Show the countdown while studying
        #[arg(long)]
        show_timer: Option<bool>,
    },
}

struct Overrides {
    study: Option<u32>,
    short_break: Option<u32>,
    long_break: Option<u32>,
    show_timer: Option<bool>,
}

impl Overrides {
    fn apply(&self, base: &Settings) -> Settings {
        Settings {
            id: base.id.clone(),
            study_minutes: self.study.unwrap_or(base.study_minutes),
            short_break_minutes: self.short_break.unwrap_or(base.short_break_minutes),
            long_break_minutes: self.long_break.unwrap_or(base.long_break_minutes),
            show_timer: self.show_timer.unwrap_or(base.show_timer),
        }
    }
}

fn print_settings(settings: &Settings) -> CommandResult {
    let out = json!({
        "id": settings.id,
        "studyMinutes": settings.study_minutes,
        "shortBreakMinutes": settings.short_break_minutes,
        "longBreakMinutes": settings.long_break_minutes,
        "showTimer": settings.show_timer,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub async fn run(action: SettingsAction, config: &Config) -> CommandResult {
    match action {
        SettingsAction::Show => {
            let mut store = SettingsStore::new(gateway(config)?);
            store.load().await?;
            print_settings(store.active())?;
        }
        SettingsAction::Set {
            study,
            short_break,
            long_break,
            show_timer,
        } => {
            let overrides = Overrides {
                study,
                short_break,
                long_break,
                show_timer,
            };
            // Reject out-of-range values before talking to the server.
            overrides.apply(&Settings::default()).validate()?;

            let mut store = SettingsStore::new(gateway(config)?);
            store.load().await?;
            let draft = overrides.apply(store.active());
            store.save(draft).await?;
            print_settings(store.active())?;
        }
    }
    Ok(())
}
