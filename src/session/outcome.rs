use serde::{Deserialize, Serialize};

/// Where the user is sent once a call has finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Destination {
    Home,
    #[serde(rename_all = "camelCase")]
    Feedback { interview_id: String },
}

impl Destination {
    /// Application path for this destination
    pub fn path(&self) -> String {
        match self {
            Destination::Home => "/".to_string(),
            Destination::Feedback { interview_id } => {
                format!("/interview/{}/feedback", interview_id)
            }
        }
    }
}

/// The single action dispatched when a call reaches `Finished`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    pub destination: Destination,

    /// Failure notice shown to the user, if any
    pub notice: Option<String>,

    /// Feedback document produced for this call
    pub feedback_id: Option<String>,
}

impl CallOutcome {
    pub fn home() -> Self {
        Self {
            destination: Destination::Home,
            notice: None,
            feedback_id: None,
        }
    }

    pub fn feedback(interview_id: impl Into<String>, feedback_id: impl Into<String>) -> Self {
        Self {
            destination: Destination::Feedback {
                interview_id: interview_id.into(),
            },
            notice: None,
            feedback_id: Some(feedback_id.into()),
        }
    }

    pub fn failed(notice: impl Into<String>) -> Self {
        Self {
            destination: Destination::Home,
            notice: Some(notice.into()),
            feedback_id: None,
        }
    }
}
