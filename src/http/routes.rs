use super::calls;
use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Users and voice credentials
        .route("/api/users", post(handlers::sign_up))
        .route("/api/profile", get(handlers::get_profile))
        .route(
            "/api/profile/client-token",
            post(handlers::save_client_token),
        )
        .route(
            "/api/profile/assistant-id",
            post(handlers::save_assistant_id),
        )
        // Interviews
        .route("/api/interview", post(handlers::create_interview))
        .route("/api/interviews", get(handlers::list_interviews))
        .route("/api/interviews/latest", get(handlers::latest_interviews))
        .route(
            "/api/interviews/:interview_id",
            get(handlers::get_interview),
        )
        .route(
            "/api/interviews/:interview_id/feedback",
            get(handlers::get_interview_feedback),
        )
        // Feedback synthesis
        .route("/api/feedback", post(handlers::create_feedback))
        // Call sessions
        .route("/api/calls", post(calls::start_call))
        .route("/api/calls/:call_id", get(calls::get_call))
        .route("/api/calls/:call_id/stop", post(calls::stop_call))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
