use super::{FeedbackRequest, FeedbackResponse};
use crate::session::Turn;
use crate::store::{CategoryScore, Feedback, Repository};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Scored assessment of an interview transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub total_score: u32,
    #[serde(default)]
    pub category_scores: Vec<CategoryScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
}

/// Scores a formatted transcript
#[async_trait::async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, formatted_transcript: &str) -> Result<Assessment>;
}

/// Assessor backed by a remote scoring endpoint
pub struct HttpAssessor {
    client: Client,
    url: String,
}

impl HttpAssessor {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build assessor HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[derive(Serialize)]
struct AssessRequest<'a> {
    transcript: &'a str,
}

#[async_trait::async_trait]
impl Assessor for HttpAssessor {
    async fn assess(&self, formatted_transcript: &str) -> Result<Assessment> {
        let response = self
            .client
            .post(&self.url)
            .json(&AssessRequest {
                transcript: formatted_transcript,
            })
            .send()
            .await
            .context("Assessor request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Assessor returned {}", status);
        }

        response
            .json::<Assessment>()
            .await
            .context("Invalid assessor response")
    }
}

/// `- role: content` per turn, one per line
pub fn format_transcript(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .map(|turn| format!("- {}: {}\n", turn.speaker, turn.text))
        .collect()
}

/// Validates, scores and stores feedback for a finished interview
pub struct FeedbackService {
    repo: Repository,
    assessor: Arc<dyn Assessor>,
}

impl FeedbackService {
    pub fn new(repo: Repository, assessor: Arc<dyn Assessor>) -> Self {
        Self { repo, assessor }
    }

    /// Never fails outright; every error becomes `success: false`
    pub async fn create(&self, request: FeedbackRequest) -> FeedbackResponse {
        match self.try_create(request).await {
            Ok(feedback_id) => FeedbackResponse::created(feedback_id),
            Err(e) => {
                error!("Error saving feedback: {:#}", e);
                FeedbackResponse::failed(format!("{:#}", e))
            }
        }
    }

    async fn try_create(&self, request: FeedbackRequest) -> Result<String> {
        if request.interview_id.trim().is_empty() {
            bail!("Interview ID is required");
        }
        if request.user_id.trim().is_empty() {
            bail!("User ID is required");
        }
        if request.transcript.is_empty() {
            bail!("Transcript is empty");
        }

        let requested_id = request.feedback_id.filter(|id| !id.trim().is_empty());
        if let Some(id) = &requested_id {
            let existing = self
                .repo
                .get_feedback(id)
                .await
                .context("Failed to load existing feedback")?;
            if let Some(existing) = existing {
                if existing.user_id != request.user_id {
                    bail!("Feedback {} belongs to another user", id);
                }
            }
        }

        let assessment = self
            .assessor
            .assess(&format_transcript(&request.transcript))
            .await
            .context("Failed to assess transcript")?;

        let feedback_id =
            requested_id.unwrap_or_else(|| format!("fb-{}", uuid::Uuid::new_v4()));

        let feedback = Feedback {
            id: feedback_id.clone(),
            interview_id: request.interview_id,
            user_id: request.user_id,
            transcript: request.transcript,
            total_score: assessment.total_score,
            category_scores: assessment.category_scores,
            strengths: assessment.strengths,
            areas_for_improvement: assessment.areas_for_improvement,
            final_assessment: assessment.final_assessment,
            created_at: Utc::now(),
        };

        self.repo
            .put_feedback(&feedback)
            .await
            .context("Failed to store feedback")?;

        info!(
            "Stored feedback {} for interview {} (score {})",
            feedback.id, feedback.interview_id, feedback.total_score
        );

        Ok(feedback_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Speaker;

    #[test]
    fn test_format_transcript() {
        let transcript = vec![
            Turn::new(Speaker::Assistant, "Hi, ready?"),
            Turn::new(Speaker::User, "Yes"),
        ];
        assert_eq!(
            format_transcript(&transcript),
            "- assistant: Hi, ready?\n- user: Yes\n"
        );
    }
}
