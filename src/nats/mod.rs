pub mod client;
pub mod messages;

pub use client::NatsVoiceClient;
pub use messages::{StartCallMessage, StartCallReply, StopCallMessage, TranscriptType, VoiceEventMessage};
