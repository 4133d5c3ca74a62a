use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a quiz session.
///
/// `NotStarted → InProgress → Completed`, with `Abandoned` reachable from
/// `InProgress`. `Completed` and `Abandoned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::NotStarted => "not started",
            SessionState::InProgress => "in progress",
            SessionState::Completed => "completed",
            SessionState::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Completed,
    Abandoned,
}

impl SessionOutcome {
    /// Maps a terminal state to its outcome; `None` for live states.
    #[must_use]
    pub fn from_state(state: SessionState) -> Option<Self> {
        match state {
            SessionState::Completed => Some(Self::Completed),
            SessionState::Abandoned => Some(Self::Abandoned),
            SessionState::NotStarted | SessionState::InProgress => None,
        }
    }
}
