#![allow(dead_code)]

use futures::channel::mpsc::{unbounded, UnboundedSender};
use interview_coach::feedback::{
    Assessment, Assessor, FeedbackGateway, FeedbackRequest, FeedbackResponse, GatewayError,
};
use interview_coach::session::{CallMode, Credentials, SessionConfig};
use interview_coach::voice::{
    CallRequest, RemoteCall, Subscription, VoiceClient, VoiceError, VoiceEvent, VoiceSession,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Voice client whose calls are fed by the test
#[derive(Default)]
pub struct FakeVoiceClient {
    opened: Mutex<Vec<CallRequest>>,
    senders: Mutex<Vec<UnboundedSender<VoiceEvent>>>,
    closes: Arc<AtomicUsize>,
    reject_with: Option<String>,
}

impl FakeVoiceClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reject_with: Some(reason.to_string()),
            ..Self::default()
        })
    }

    pub fn opened(&self) -> Vec<CallRequest> {
        self.opened.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Push an event into the `n`th opened call
    pub fn emit(&self, n: usize, event: VoiceEvent) {
        self.senders.lock().unwrap()[n]
            .unbounded_send(event)
            .expect("call event stream dropped");
    }

    /// Drop the event stream of the `n`th call, as if the remote side vanished
    pub fn hang_up_stream(&self, n: usize) {
        self.senders.lock().unwrap()[n].close_channel();
    }
}

struct FakeRemoteCall {
    closes: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl RemoteCall for FakeRemoteCall {
    async fn close(&mut self) -> Result<(), VoiceError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait::async_trait]
impl VoiceClient for FakeVoiceClient {
    async fn open(&self, request: CallRequest) -> Result<VoiceSession, VoiceError> {
        self.opened.lock().unwrap().push(request);

        if let Some(reason) = &self.reject_with {
            return Err(VoiceError::Rejected(reason.clone()));
        }

        let (tx, rx) = unbounded();
        self.senders.lock().unwrap().push(tx);

        Ok(VoiceSession {
            call: Box::new(FakeRemoteCall {
                closes: Arc::clone(&self.closes),
            }),
            events: Subscription::new(rx),
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub enum GatewayReply {
    Created(&'static str),
    /// Answers like `Created` after a pause
    Delayed(&'static str, Duration),
    Unsuccessful,
    Fails,
}

/// Gateway that records requests and answers with a fixed reply
pub struct FakeGateway {
    reply: GatewayReply,
    requests: Mutex<Vec<FeedbackRequest>>,
}

impl FakeGateway {
    pub fn new(reply: GatewayReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<FeedbackRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FeedbackGateway for FakeGateway {
    async fn create_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.reply {
            GatewayReply::Created(id) => Ok(FeedbackResponse::created(id)),
            GatewayReply::Delayed(id, pause) => {
                tokio::time::sleep(pause).await;
                Ok(FeedbackResponse::created(id))
            }
            GatewayReply::Unsuccessful => Ok(FeedbackResponse {
                success: false,
                feedback_id: None,
                message: None,
            }),
            GatewayReply::Fails => Err(GatewayError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }
}

/// Assessor with a canned score
pub struct StubAssessor;

#[async_trait::async_trait]
impl Assessor for StubAssessor {
    async fn assess(&self, formatted_transcript: &str) -> anyhow::Result<Assessment> {
        Ok(Assessment {
            total_score: 72,
            category_scores: Vec::new(),
            strengths: vec!["Clear answers".to_string()],
            areas_for_improvement: Vec::new(),
            final_assessment: format!("Reviewed {} lines", formatted_transcript.lines().count()),
        })
    }
}

pub fn interview_config(token: &str, assistant_id: &str) -> SessionConfig {
    let mut config = SessionConfig::new(CallMode::Interview, "user-1", "Ada");
    config.interview_id = Some("iv-1".to_string());
    config.questions = vec!["What is closures?".to_string(), "Explain hoisting".to_string()];
    config.credentials = Credentials {
        client_token: Some(token.to_string()),
        assistant_id: Some(assistant_id.to_string()),
    };
    config
}

pub fn generate_config() -> SessionConfig {
    let mut config = SessionConfig::new(CallMode::Generate, "user-1", "Ada");
    config.credentials = Credentials {
        client_token: Some("tok_123".to_string()),
        assistant_id: Some("asst_1".to_string()),
    };
    config
}
