//! Call session management
//!
//! This module provides the `CallSession` controller that manages:
//! - Credential checks before any remote call is opened
//! - The `Idle -> Connecting -> Active -> Finished` state machine
//! - Transcript collection from finalized remote turns
//! - One-shot outcome dispatch (feedback or home) when the call ends
//! - `RunningCall`, which drives a session on its own task

mod config;
mod error;
mod outcome;
mod runner;
mod session;
mod state;
mod transcript;

pub use config::{format_questions, CallMode, Credentials, SessionConfig};
pub use error::CallError;
pub use outcome::{CallOutcome, Destination};
pub use runner::{run, CallCommand, RunningCall};
pub use session::{CallSession, FEEDBACK_FAILED_NOTICE};
pub use state::CallStatus;
pub use transcript::{CallSnapshot, Speaker, Turn};
