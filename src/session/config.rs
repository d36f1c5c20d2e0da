use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What a call is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
    /// Practice/setup call with no target interview; no feedback is produced
    Generate,
    /// Interview against a stored question list; feedback is produced at the end
    Interview,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallMode::Generate => f.write_str("generate"),
            CallMode::Interview => f.write_str("interview"),
        }
    }
}

/// Per-user credentials for the hosted voice assistant
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub client_token: Option<String>,
    pub assistant_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_token", &self.client_token.as_ref().map(|_| "***"))
            .field("assistant_id", &self.assistant_id)
            .finish()
    }
}

/// Everything needed to set up one call session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Unique call identifier
    pub call_id: String,

    pub mode: CallMode,

    pub user_id: String,

    /// Display name passed to the assistant
    pub user_name: String,

    /// Target interview (interview mode)
    pub interview_id: Option<String>,

    /// Existing feedback document to overwrite
    pub feedback_id: Option<String>,

    /// Interview questions handed to the assistant
    #[serde(default)]
    pub questions: Vec<String>,

    #[serde(default)]
    pub credentials: Credentials,
}

impl SessionConfig {
    pub fn new(mode: CallMode, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            call_id: format!("call-{}", uuid::Uuid::new_v4()),
            mode,
            user_id: user_id.into(),
            user_name: user_name.into(),
            interview_id: None,
            feedback_id: None,
            questions: Vec::new(),
            credentials: Credentials::default(),
        }
    }

    /// Template variables sent to the assistant when the call opens
    pub fn variable_values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("username".to_string(), self.user_name.clone());
        values.insert("userid".to_string(), self.user_id.clone());

        if self.mode == CallMode::Interview {
            values.insert("questions".to_string(), format_questions(&self.questions));
        }

        values
    }
}

/// Render questions as a dash-prefixed, newline-joined list
pub fn format_questions(questions: &[String]) -> String {
    questions
        .iter()
        .map(|q| format!("- {}", q))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_mode_variables() {
        let config = SessionConfig::new(CallMode::Generate, "u1", "Ada");
        let values = config.variable_values();

        assert_eq!(values.len(), 2);
        assert_eq!(values["username"], "Ada");
        assert_eq!(values["userid"], "u1");
        assert!(!values.contains_key("questions"));
    }

    #[test]
    fn test_interview_mode_variables() {
        let mut config = SessionConfig::new(CallMode::Interview, "u1", "Ada");
        config.questions = vec!["What is closures?".into(), "Explain hoisting".into()];
        let values = config.variable_values();

        assert_eq!(values["questions"], "- What is closures?\n- Explain hoisting");
    }

    #[test]
    fn test_interview_mode_without_questions_sends_empty_string() {
        let config = SessionConfig::new(CallMode::Interview, "u1", "Ada");
        assert_eq!(config.variable_values()["questions"], "");
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = Credentials {
            client_token: Some("tok_123".into()),
            assistant_id: Some("asst_1".into()),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("tok_123"));
        assert!(debug.contains("asst_1"));
    }
}
