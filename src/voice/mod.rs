//! Voice session client abstraction
//!
//! A `VoiceClient` opens a remote call with the hosted voice assistant and
//! hands back a `VoiceSession`: an owned handle to the remote call plus a
//! subscription to its lifecycle and transcript events. Each call gets its own
//! session; nothing is shared between calls.
//!
//! Implementations:
//! - NATS bridge (`crate::nats::NatsVoiceClient`)
//! - In-process fakes in tests

use crate::session::Speaker;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Event emitted by the remote voice session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The remote call is live
    Started,
    /// The remote call has ended
    Ended,
    /// A transcript fragment; only final fragments become turns
    Transcript {
        speaker: Speaker,
        text: String,
        is_final: bool,
    },
    /// The remote assistant started speaking
    SpeechStarted,
    /// The remote assistant stopped speaking
    SpeechEnded,
    /// The remote session reported an error
    Error(String),
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Voice assistant rejected the call: {0}")]
    Rejected(String),

    #[error("Voice transport error: {0}")]
    Transport(String),

    #[error("Malformed voice message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parameters for opening a remote call
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub call_id: String,
    pub token: String,
    pub assistant_id: String,
    pub variable_values: BTreeMap<String, String>,
}

impl fmt::Debug for CallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRequest")
            .field("call_id", &self.call_id)
            .field("token", &"***")
            .field("assistant_id", &self.assistant_id)
            .field("variable_values", &self.variable_values)
            .finish()
    }
}

/// Handle to one open remote call
///
/// Implementations must release the remote call when dropped without `close`.
#[async_trait::async_trait]
pub trait RemoteCall: Send {
    /// Ask the remote side to hang up
    async fn close(&mut self) -> Result<(), VoiceError>;
}

/// Event subscription for one remote call; dropping it unsubscribes
pub struct Subscription {
    events: BoxStream<'static, VoiceEvent>,
}

impl Subscription {
    pub fn new<S>(events: S) -> Self
    where
        S: futures::Stream<Item = VoiceEvent> + Send + 'static,
    {
        Self {
            events: events.boxed(),
        }
    }

    /// Next event, or `None` once the remote side has gone away
    pub async fn next(&mut self) -> Option<VoiceEvent> {
        self.events.next().await
    }
}

/// An open remote call and its event subscription
pub struct VoiceSession {
    pub call: Box<dyn RemoteCall>,
    pub events: Subscription,
}

/// Opens remote calls with the hosted voice assistant
#[async_trait::async_trait]
pub trait VoiceClient: Send + Sync {
    async fn open(&self, request: CallRequest) -> Result<VoiceSession, VoiceError>;

    /// Client name for logging
    fn name(&self) -> &str;
}
