use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Study,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn is_break(self) -> bool {
        !matches!(self, SessionKind::Study)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Study => "Study",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
