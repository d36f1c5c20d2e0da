use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub voice: VoiceConfig,
    pub feedback: FeedbackConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// NATS server bridging to the hosted voice assistant
    pub nats_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackConfig {
    /// Endpoint that scores a formatted transcript
    pub assessor_url: String,
    pub request_timeout_secs: u64,
    /// Remote feedback service for finished calls; in-process when unset
    #[serde(default)]
    pub gateway_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Root directory for the file backend
    pub path: String,
}

impl Config {
    /// Load configuration from `path` (any format the `config` crate knows),
    /// overlaid with `COACH__SECTION__KEY` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "interview-coach")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8080)?
            .set_default("voice.nats_url", "nats://localhost:4222")?
            .set_default("feedback.request_timeout_secs", 60)?
            .set_default("store.backend", "memory")?
            .set_default("store.path", "data")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("COACH").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "coach-test"

[service.http]
bind = "0.0.0.0"
port = 9000

[feedback]
assessor_url = "http://localhost:7000/assess"

[store]
backend = "file"
path = "/tmp/coach"
"#
        )
        .unwrap();

        let cfg = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.service.name, "coach-test");
        assert_eq!(cfg.service.http.port, 9000);
        assert_eq!(cfg.voice.nats_url, "nats://localhost:4222");
        assert_eq!(cfg.feedback.request_timeout_secs, 60);
        assert_eq!(cfg.store.backend, StoreBackend::File);
        assert!(cfg.feedback.gateway_url.is_none());
    }

    #[test]
    fn test_missing_assessor_url_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[service]\nname = \"coach-test\"").unwrap();

        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
