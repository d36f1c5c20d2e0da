//! Feedback synthesis
//!
//! - `FeedbackGateway`: what a finished call talks to (at-most-once, no retry)
//! - `FeedbackService`: the server side that scores and stores a transcript
//! - `Assessor`: opaque scoring backend used by the service

mod gateway;
mod service;

pub use gateway::{HttpFeedbackGateway, LocalFeedbackGateway};
pub use service::{format_transcript, Assessment, Assessor, FeedbackService, HttpAssessor};

use crate::session::Turn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transcript of a finished interview call, sent once for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub interview_id: String,
    pub user_id: String,
    pub transcript: Vec<Turn>,
    /// Existing feedback document to overwrite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeedbackResponse {
    pub fn created(feedback_id: impl Into<String>) -> Self {
        Self {
            success: true,
            feedback_id: Some(feedback_id.into()),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            feedback_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Feedback request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feedback service returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Turns a transcript into a stored feedback document
#[async_trait::async_trait]
pub trait FeedbackGateway: Send + Sync {
    async fn create_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, GatewayError>;
}
