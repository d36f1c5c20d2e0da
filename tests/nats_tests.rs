use interview_coach::nats::messages::{
    StartCallMessage, StartCallReply, StopCallMessage, TranscriptType, VoiceEventMessage,
};
use interview_coach::session::Speaker;
use interview_coach::voice::VoiceEvent;
use std::collections::BTreeMap;

#[test]
fn test_start_call_serialization() {
    let mut variable_values = BTreeMap::new();
    variable_values.insert("username".to_string(), "Ada".to_string());
    variable_values.insert("userid".to_string(), "u1".to_string());

    let msg = StartCallMessage {
        call_id: "call-1".to_string(),
        token: "tok_123".to_string(),
        assistant_id: "asst_1".to_string(),
        variable_values,
    };

    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["callId"], "call-1");
    assert_eq!(json["assistantId"], "asst_1");
    assert_eq!(json["variableValues"]["username"], "Ada");
    assert!(json["variableValues"].get("questions").is_none());
}

#[test]
fn test_start_reply_without_error_field() {
    let reply: StartCallReply = serde_json::from_str(r#"{"ok": true}"#).unwrap();
    assert!(reply.ok);
    assert!(reply.error.is_none());

    let reply: StartCallReply =
        serde_json::from_str(r#"{"ok": false, "error": "invalid token"}"#).unwrap();
    assert!(!reply.ok);
    assert_eq!(reply.error.as_deref(), Some("invalid token"));
}

#[test]
fn test_stop_call_serialization() {
    let json = serde_json::to_string(&StopCallMessage {
        call_id: "call-1".to_string(),
    })
    .unwrap();
    assert_eq!(json, r#"{"callId":"call-1"}"#);
}

#[test]
fn test_lifecycle_events() {
    let cases = [
        (r#"{"type": "call-start"}"#, VoiceEvent::Started),
        (r#"{"type": "call-end"}"#, VoiceEvent::Ended),
        (r#"{"type": "speech-start"}"#, VoiceEvent::SpeechStarted),
        (r#"{"type": "speech-end"}"#, VoiceEvent::SpeechEnded),
    ];

    for (json, expected) in cases {
        let msg: VoiceEventMessage = serde_json::from_str(json).unwrap();
        assert_eq!(VoiceEvent::from(msg), expected);
    }
}

#[test]
fn test_final_transcript_event() {
    let json = r#"{
        "type": "transcript",
        "role": "assistant",
        "transcriptType": "final",
        "transcript": "Hi, ready?"
    }"#;

    let msg: VoiceEventMessage = serde_json::from_str(json).unwrap();
    assert_eq!(
        VoiceEvent::from(msg),
        VoiceEvent::Transcript {
            speaker: Speaker::Assistant,
            text: "Hi, ready?".to_string(),
            is_final: true,
        }
    );
}

#[test]
fn test_partial_transcript_event() {
    let json = r#"{
        "type": "transcript",
        "role": "user",
        "transcriptType": "partial",
        "transcript": "I think"
    }"#;

    let msg: VoiceEventMessage = serde_json::from_str(json).unwrap();
    match &msg {
        VoiceEventMessage::Transcript {
            transcript_type, ..
        } => assert_eq!(*transcript_type, TranscriptType::Partial),
        other => panic!("unexpected message {:?}", other),
    }

    match VoiceEvent::from(msg) {
        VoiceEvent::Transcript { is_final, .. } => assert!(!is_final),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_error_event() {
    let msg: VoiceEventMessage =
        serde_json::from_str(r#"{"type": "error", "message": "assistant unavailable"}"#).unwrap();
    assert_eq!(
        VoiceEvent::from(msg),
        VoiceEvent::Error("assistant unavailable".to_string())
    );
}

#[test]
fn test_unknown_event_type_is_rejected() {
    assert!(serde_json::from_str::<VoiceEventMessage>(r#"{"type": "volume-level"}"#).is_err());
}
