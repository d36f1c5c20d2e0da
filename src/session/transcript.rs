use super::outcome::CallOutcome;
use super::state::CallStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who said a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
    System,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
            Speaker::System => "system",
        };
        f.write_str(name)
    }
}

/// A single finalized utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "role")]
    pub speaker: Speaker,

    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Read-only view of a call session, published after every change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSnapshot {
    pub call_id: String,

    pub status: CallStatus,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Finalized turns, in arrival order
    pub transcript: Vec<Turn>,

    /// Whether the remote assistant is currently speaking
    pub is_speaking: bool,

    /// Text of the most recent finalized turn
    pub last_message: Option<String>,

    /// Latest partial fragment, for live captions only
    pub live_caption: Option<String>,

    /// Most recent remote session error, if any
    pub last_error: Option<String>,

    /// Set once the finished call has been dispatched
    pub outcome: Option<CallOutcome>,
}
