pub mod config;
pub mod feedback;
pub mod http;
pub mod nats;
pub mod session;
pub mod store;
pub mod voice;

pub use config::Config;
pub use feedback::{
    FeedbackGateway, FeedbackRequest, FeedbackResponse, FeedbackService, HttpFeedbackGateway,
    LocalFeedbackGateway,
};
pub use http::{create_router, AppState};
pub use nats::NatsVoiceClient;
pub use session::{
    CallError, CallMode, CallOutcome, CallSession, CallSnapshot, CallStatus, Destination,
    RunningCall, SessionConfig, Speaker, Turn,
};
pub use store::{FileStore, MemoryStore, Repository};
pub use voice::{VoiceClient, VoiceEvent, VoiceSession};
