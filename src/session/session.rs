use super::config::{CallMode, SessionConfig};
use super::error::CallError;
use super::outcome::CallOutcome;
use super::state::CallStatus;
use super::transcript::{CallSnapshot, Speaker, Turn};
use crate::feedback::{FeedbackGateway, FeedbackRequest, FeedbackResponse};
use crate::voice::{CallRequest, VoiceClient, VoiceEvent, VoiceSession};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shown when a finished interview could not be turned into feedback
pub const FEEDBACK_FAILED_NOTICE: &str = "We couldn't generate feedback for this interview.";

/// Controller for a single voice-interview call
///
/// Owns the remote voice session for its whole life. All state changes go
/// through `&mut self`, so one task drives a session at a time.
pub struct CallSession {
    /// Session configuration
    config: SessionConfig,

    /// Opens the remote call
    voice: Arc<dyn VoiceClient>,

    /// Receives the transcript of a finished interview
    gateway: Arc<dyn FeedbackGateway>,

    status: CallStatus,

    /// When the session was created
    started_at: DateTime<Utc>,

    /// Finalized turns, in arrival order
    transcript: Vec<Turn>,

    /// Whether the remote assistant is speaking
    is_speaking: bool,

    last_message: Option<String>,

    live_caption: Option<String>,

    last_error: Option<String>,

    /// Open remote call and its event subscription
    remote: Option<VoiceSession>,

    /// Set once the finished outcome has been dispatched
    dispatched: bool,

    outcome: Option<CallOutcome>,
}

impl CallSession {
    /// Create an idle session; nothing is opened until `start`
    pub fn new(
        config: SessionConfig,
        voice: Arc<dyn VoiceClient>,
        gateway: Arc<dyn FeedbackGateway>,
    ) -> Self {
        Self {
            config,
            voice,
            gateway,
            status: CallStatus::Idle,
            started_at: Utc::now(),
            transcript: Vec::new(),
            is_speaking: false,
            last_message: None,
            live_caption: None,
            last_error: None,
            remote: None,
            dispatched: false,
            outcome: None,
        }
    }

    pub fn call_id(&self) -> &str {
        &self.config.call_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn outcome(&self) -> Option<&CallOutcome> {
        self.outcome.as_ref()
    }

    pub fn snapshot(&self) -> CallSnapshot {
        CallSnapshot {
            call_id: self.config.call_id.clone(),
            status: self.status,
            started_at: self.started_at,
            transcript: self.transcript.clone(),
            is_speaking: self.is_speaking,
            last_message: self.last_message.clone(),
            live_caption: self.live_caption.clone(),
            last_error: self.last_error.clone(),
            outcome: self.outcome.clone(),
        }
    }

    /// Open the remote call
    ///
    /// Checks credentials first; when one is missing no remote session is
    /// opened and the session stays `Idle`.
    pub async fn start(&mut self) -> Result<(), CallError> {
        if self.status != CallStatus::Idle {
            return Err(CallError::InvalidState(self.status));
        }

        let (token, assistant_id) = self.required_credentials()?;
        if self.config.mode == CallMode::Interview && self.config.interview_id.is_none() {
            return Err(CallError::MissingInterview);
        }

        self.transition(CallStatus::Connecting);

        let request = CallRequest {
            call_id: self.config.call_id.clone(),
            token,
            assistant_id,
            variable_values: self.config.variable_values(),
        };

        info!(
            "Opening {} call {} with {} (assistant {})",
            self.config.mode,
            self.config.call_id,
            self.voice.name(),
            request.assistant_id
        );

        match self.voice.open(request).await {
            Ok(remote) => {
                self.remote = Some(remote);
                Ok(())
            }
            Err(e) => {
                error!("Failed to open call {}: {}", self.config.call_id, e);
                self.last_error = Some(e.to_string());
                self.transition(CallStatus::Idle);
                Err(e.into())
            }
        }
    }

    fn required_credentials(&self) -> Result<(String, String), CallError> {
        let credentials = &self.config.credentials;

        let token = non_blank(credentials.client_token.as_deref())
            .ok_or(CallError::MissingClientToken)?;
        let assistant_id = non_blank(credentials.assistant_id.as_deref())
            .ok_or(CallError::MissingAssistantId)?;

        Ok((token.to_string(), assistant_id.to_string()))
    }

    /// Wait for the next remote event
    ///
    /// `None` when no remote session is open or its event stream has closed.
    pub async fn next_event(&mut self) -> Option<VoiceEvent> {
        match self.remote.as_mut() {
            Some(remote) => remote.events.next().await,
            None => None,
        }
    }

    /// Apply one remote event
    ///
    /// Returns the outcome when this event finished the call.
    pub async fn handle_event(&mut self, event: VoiceEvent) -> Option<CallOutcome> {
        match event {
            VoiceEvent::Started => {
                if self.status == CallStatus::Connecting {
                    self.transition(CallStatus::Active);
                } else {
                    warn!("Ignoring call start while {}", self.status);
                }
                None
            }
            VoiceEvent::Transcript {
                speaker,
                text,
                is_final,
            } => {
                self.on_transcript(speaker, text, is_final);
                None
            }
            VoiceEvent::SpeechStarted => {
                if self.status == CallStatus::Active {
                    debug!("speech start");
                    self.is_speaking = true;
                }
                None
            }
            VoiceEvent::SpeechEnded => {
                if self.status == CallStatus::Active {
                    debug!("speech end");
                    self.is_speaking = false;
                }
                None
            }
            VoiceEvent::Error(details) => {
                self.on_remote_error(details).await;
                None
            }
            VoiceEvent::Ended => self.finish().await,
        }
    }

    fn on_transcript(&mut self, speaker: Speaker, text: String, is_final: bool) {
        if self.status != CallStatus::Active {
            debug!("Dropping transcript while {}", self.status);
            return;
        }

        if !is_final {
            self.live_caption = Some(text);
            return;
        }

        self.live_caption = None;
        if text.trim().is_empty() {
            return;
        }

        self.last_message = Some(text.clone());
        self.transcript.push(Turn::new(speaker, text));
    }

    async fn on_remote_error(&mut self, details: String) {
        error!("Voice session error on {}: {}", self.config.call_id, details);
        self.last_error = Some(details);

        // Before the call is live an error means it will never start
        if self.status == CallStatus::Connecting {
            self.release_remote().await;
            self.transition(CallStatus::Idle);
        }
    }

    /// Hang up from the caller's side
    pub async fn disconnect(&mut self) -> Option<CallOutcome> {
        info!("Disconnect requested for {}", self.config.call_id);
        self.finish().await
    }

    /// Enter `Finished` and dispatch the outcome, at most once
    async fn finish(&mut self) -> Option<CallOutcome> {
        if self.dispatched {
            debug!("Call {} already finished", self.config.call_id);
            return None;
        }
        if !self.status.is_live() {
            warn!("Ignoring end of call {} while {}", self.config.call_id, self.status);
            return None;
        }

        self.dispatched = true;
        self.transition(CallStatus::Finished);
        self.is_speaking = false;
        self.live_caption = None;
        self.release_remote().await;

        let outcome = self.dispatch_outcome().await;
        info!(
            "Call {} finished, routing to {}",
            self.config.call_id,
            outcome.destination.path()
        );

        self.outcome = Some(outcome.clone());
        Some(outcome)
    }

    async fn dispatch_outcome(&mut self) -> CallOutcome {
        // The transcript leaves the session whatever happens next
        let transcript = std::mem::take(&mut self.transcript);

        if self.config.mode == CallMode::Generate {
            return CallOutcome::home();
        }

        let Some(interview_id) = self.config.interview_id.clone() else {
            error!("Interview call {} has no interview ID", self.config.call_id);
            return CallOutcome::failed(FEEDBACK_FAILED_NOTICE);
        };

        let request = FeedbackRequest {
            interview_id: interview_id.clone(),
            user_id: self.config.user_id.clone(),
            transcript,
            feedback_id: self.config.feedback_id.clone(),
        };

        match self.gateway.create_feedback(&request).await {
            Ok(FeedbackResponse {
                success: true,
                feedback_id: Some(feedback_id),
                ..
            }) => CallOutcome::feedback(interview_id, feedback_id),
            Ok(response) => {
                error!(
                    "Error saving feedback for {}: {}",
                    interview_id,
                    response.message.as_deref().unwrap_or("no feedback id returned")
                );
                CallOutcome::failed(FEEDBACK_FAILED_NOTICE)
            }
            Err(e) => {
                error!("Error saving feedback for {}: {}", interview_id, e);
                CallOutcome::failed(FEEDBACK_FAILED_NOTICE)
            }
        }
    }

    async fn release_remote(&mut self) {
        if let Some(mut remote) = self.remote.take() {
            if let Err(e) = remote.call.close().await {
                warn!("Failed to close call {}: {}", self.config.call_id, e);
            }
        }
    }

    fn transition(&mut self, next: CallStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {} -> {}",
            self.status,
            next
        );
        info!("Call {}: {} -> {}", self.config.call_id, self.status, next);
        self.status = next;
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
