use anyhow::{Context, Result};
use clap::Parser;
use interview_coach::config::StoreBackend;
use interview_coach::feedback::{FeedbackGateway, HttpAssessor};
use interview_coach::{
    create_router, AppState, Config, FeedbackService, FileStore, HttpFeedbackGateway,
    LocalFeedbackGateway, NatsVoiceClient, Repository,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "interview-coach", about = "Voice mock-interview service")]
struct Args {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/interview-coach")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Interview Coach v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let repo = match cfg.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Repository::in_memory()
        }
        StoreBackend::File => {
            info!("Using file store at {}", cfg.store.path);
            let store = FileStore::open(&cfg.store.path)
                .await
                .context("Failed to open file store")?;
            Repository::new(Arc::new(store))
        }
    };

    let timeout = Duration::from_secs(cfg.feedback.request_timeout_secs);
    let assessor = Arc::new(HttpAssessor::new(&cfg.feedback.assessor_url, timeout)?);
    let feedback = Arc::new(FeedbackService::new(repo.clone(), assessor));

    let gateway: Arc<dyn FeedbackGateway> = match &cfg.feedback.gateway_url {
        Some(url) => {
            info!("Finished calls post feedback to {}", url);
            Arc::new(HttpFeedbackGateway::new(url, timeout).context("Failed to build feedback gateway")?)
        }
        None => Arc::new(LocalFeedbackGateway::new(feedback.clone())),
    };

    let voice = Arc::new(NatsVoiceClient::connect(&cfg.voice.nats_url).await?);

    let state = AppState::new(repo, feedback, gateway, voice);
    let app = create_router(state);

    let bind = args.bind.unwrap_or(cfg.service.http.bind);
    let port = args.port.unwrap_or(cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind, port))?;

    info!("HTTP server listening on {}:{}", bind, port);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
