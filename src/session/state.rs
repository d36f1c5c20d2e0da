use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single call session
///
/// `Idle -> Connecting -> Active -> Finished`. `Connecting` falls back to
/// `Idle` only when the remote session cannot be opened or fails before it
/// starts. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Idle,
    Connecting,
    Active,
    Finished,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Idle => "idle",
            CallStatus::Connecting => "connecting",
            CallStatus::Active => "active",
            CallStatus::Finished => "finished",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: CallStatus) -> bool {
        use CallStatus::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Idle)
                | (Connecting, Active)
                | (Connecting, Finished)
                | (Active, Finished)
        )
    }

    /// A remote session is (or is being) held open
    pub fn is_live(self) -> bool {
        matches!(self, CallStatus::Connecting | CallStatus::Active)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CallStatus::Idle.can_transition_to(CallStatus::Connecting));
        assert!(CallStatus::Connecting.can_transition_to(CallStatus::Active));
        assert!(CallStatus::Active.can_transition_to(CallStatus::Finished));
        assert!(CallStatus::Connecting.can_transition_to(CallStatus::Finished));
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!CallStatus::Idle.can_transition_to(CallStatus::Active));
        assert!(!CallStatus::Idle.can_transition_to(CallStatus::Finished));
        assert!(!CallStatus::Active.can_transition_to(CallStatus::Connecting));
        assert!(!CallStatus::Active.can_transition_to(CallStatus::Idle));
    }

    #[test]
    fn test_finished_is_terminal() {
        for next in [
            CallStatus::Idle,
            CallStatus::Connecting,
            CallStatus::Active,
            CallStatus::Finished,
        ] {
            assert!(!CallStatus::Finished.can_transition_to(next));
        }
    }
}
