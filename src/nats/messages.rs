use crate::session::Speaker;
use crate::voice::VoiceEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request published on `voice.call.start`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallMessage {
    pub call_id: String,
    pub token: String,
    pub assistant_id: String,
    pub variable_values: BTreeMap<String, String>,
}

/// Reply to a start request
#[derive(Debug, Serialize, Deserialize)]
pub struct StartCallReply {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Published on `voice.call.stop`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopCallMessage {
    pub call_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptType {
    Partial,
    Final,
}

/// Event received on `voice.events.<call_id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VoiceEventMessage {
    CallStart,
    CallEnd,
    SpeechStart,
    SpeechEnd,
    #[serde(rename_all = "camelCase")]
    Transcript {
        role: Speaker,
        transcript_type: TranscriptType,
        transcript: String,
    },
    Error {
        message: String,
    },
}

impl From<VoiceEventMessage> for VoiceEvent {
    fn from(msg: VoiceEventMessage) -> Self {
        match msg {
            VoiceEventMessage::CallStart => VoiceEvent::Started,
            VoiceEventMessage::CallEnd => VoiceEvent::Ended,
            VoiceEventMessage::SpeechStart => VoiceEvent::SpeechStarted,
            VoiceEventMessage::SpeechEnd => VoiceEvent::SpeechEnded,
            VoiceEventMessage::Transcript {
                role,
                transcript_type,
                transcript,
            } => VoiceEvent::Transcript {
                speaker: role,
                text: transcript,
                is_final: transcript_type == TranscriptType::Final,
            },
            VoiceEventMessage::Error { message } => VoiceEvent::Error(message),
        }
    }
}
