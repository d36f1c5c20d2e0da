//! HTTP API server
//!
//! This module provides a REST API for the interview coach:
//! - POST /api/users - Sign up
//! - GET /api/profile - Caller's profile (token masked)
//! - POST /api/profile/client-token - Save voice client token (and assistant ID)
//! - POST /api/profile/assistant-id - Save assistant ID
//! - POST /api/interview - Create an interview
//! - GET /api/interviews[/latest|/:id|/:id/feedback] - Interview queries
//! - POST /api/feedback - Score and store a transcript
//! - POST /api/calls - Start a call session
//! - POST /api/calls/:id/stop - Hang up
//! - GET /api/calls/:id - Call status, transcript and outcome
//! - GET /health - Health check
//!
//! Callers identify themselves with the `x-user-id` header.

mod calls;
mod handlers;
mod routes;
mod state;

pub use handlers::USER_HEADER;
pub use routes::create_router;
pub use state::{AppState, FinishedCall, FinishedCalls, TrackedCall, FINISHED_CALL_CAPACITY};
