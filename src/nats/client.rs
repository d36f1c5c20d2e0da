use super::messages::{StartCallMessage, StartCallReply, StopCallMessage, VoiceEventMessage};
use crate::voice::{CallRequest, RemoteCall, Subscription, VoiceClient, VoiceError, VoiceEvent, VoiceSession};
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use tracing::{debug, info, warn};

const START_SUBJECT: &str = "voice.call.start";
const STOP_SUBJECT: &str = "voice.call.stop";

/// Voice client that talks to the hosted assistant through a NATS bridge
pub struct NatsVoiceClient {
    client: Client,
}

impl NatsVoiceClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    fn events_subject(call_id: &str) -> String {
        format!("voice.events.{}", call_id)
    }
}

#[async_trait::async_trait]
impl VoiceClient for NatsVoiceClient {
    async fn open(&self, request: CallRequest) -> Result<VoiceSession, VoiceError> {
        // Subscribe before asking for the call so no early event is missed
        let subject = Self::events_subject(&request.call_id);
        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| VoiceError::Transport(format!("subscribe {}: {}", subject, e)))?;

        info!("Subscribed to {}", subject);

        let message = StartCallMessage {
            call_id: request.call_id.clone(),
            token: request.token,
            assistant_id: request.assistant_id,
            variable_values: request.variable_values,
        };
        let payload = serde_json::to_vec(&message)?;

        let reply = self
            .client
            .request(START_SUBJECT.to_string(), payload.into())
            .await
            .map_err(|e| VoiceError::Transport(format!("start request: {}", e)))?;

        let reply: StartCallReply = serde_json::from_slice(&reply.payload)?;
        if !reply.ok {
            return Err(VoiceError::Rejected(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        info!("Voice call {} requested", request.call_id);

        let events = subscriber.filter_map(|msg| async move {
            match serde_json::from_slice::<VoiceEventMessage>(&msg.payload) {
                Ok(event) => Some(VoiceEvent::from(event)),
                Err(e) => {
                    warn!("Failed to parse voice event: {}", e);
                    None
                }
            }
        });

        Ok(VoiceSession {
            call: Box::new(NatsRemoteCall {
                client: self.client.clone(),
                call_id: request.call_id,
                closed: false,
            }),
            events: Subscription::new(events),
        })
    }

    fn name(&self) -> &str {
        "nats"
    }
}

struct NatsRemoteCall {
    client: Client,
    call_id: String,
    closed: bool,
}

impl NatsRemoteCall {
    async fn publish_stop(client: &Client, call_id: &str) -> Result<(), VoiceError> {
        let payload = serde_json::to_vec(&StopCallMessage {
            call_id: call_id.to_string(),
        })?;

        client
            .publish(STOP_SUBJECT.to_string(), payload.into())
            .await
            .map_err(|e| VoiceError::Transport(format!("stop publish: {}", e)))?;

        debug!("Published stop for {}", call_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteCall for NatsRemoteCall {
    async fn close(&mut self) -> Result<(), VoiceError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        Self::publish_stop(&self.client, &self.call_id).await
    }
}

impl Drop for NatsRemoteCall {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        warn!("Voice call {} dropped while open, sending stop", self.call_id);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            let call_id = std::mem::take(&mut self.call_id);
            runtime.spawn(async move {
                if let Err(e) = Self::publish_stop(&client, &call_id).await {
                    warn!("Failed to stop dropped call {}: {}", call_id, e);
                }
            });
        }
    }
}
