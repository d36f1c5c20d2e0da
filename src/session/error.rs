use super::state::CallStatus;
use crate::voice::VoiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("Client token is not configured. Please add your client token in your profile.")]
    MissingClientToken,

    #[error("Assistant ID is not configured. Please add your Assistant ID in your profile.")]
    MissingAssistantId,

    #[error("Interview calls need an interview ID")]
    MissingInterview,

    #[error("Call cannot be started while {0}")]
    InvalidState(CallStatus),

    #[error(transparent)]
    Voice(#[from] VoiceError),
}

impl CallError {
    /// Errors the user fixes by completing their profile or request
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CallError::MissingClientToken
                | CallError::MissingAssistantId
                | CallError::MissingInterview
        )
    }
}
