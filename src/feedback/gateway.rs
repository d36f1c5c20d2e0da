use super::{FeedbackGateway, FeedbackRequest, FeedbackResponse, FeedbackService, GatewayError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Gateway that posts to a remote `/api/feedback` endpoint
#[derive(Clone)]
pub struct HttpFeedbackGateway {
    client: Client,
    base_url: String,
}

impl HttpFeedbackGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl FeedbackGateway for HttpFeedbackGateway {
    async fn create_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, GatewayError> {
        let url = format!("{}/api/feedback", self.base_url);
        info!(
            "Requesting feedback for interview {} ({} turns)",
            request.interview_id,
            request.transcript.len()
        );

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<FeedbackResponse>().await?)
    }
}

/// Gateway that calls the in-process feedback service
#[derive(Clone)]
pub struct LocalFeedbackGateway {
    service: Arc<FeedbackService>,
}

impl LocalFeedbackGateway {
    pub fn new(service: Arc<FeedbackService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl FeedbackGateway for LocalFeedbackGateway {
    async fn create_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, GatewayError> {
        Ok(self.service.create(request.clone()).await)
    }
}
