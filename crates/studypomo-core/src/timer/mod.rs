mod engine;
mod scheduler;
mod session;

pub use engine::{RunState, TimerEngine, TimerSnapshot};
pub use scheduler::{Completion, SessionScheduler, Transition, LONG_BREAK_CADENCE};
pub use session::SessionKind;
