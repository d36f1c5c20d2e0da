use super::handlers::{current_user, error_response};
use super::state::AppState;
use crate::session::{CallError, CallMode, CallSession, CallStatus, Credentials, RunningCall, SessionConfig};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallRequest {
    pub mode: CallMode,
    pub interview_id: Option<String>,
    pub feedback_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallResponse {
    pub success: bool,
    pub call_id: String,
    pub status: CallStatus,
}

/// POST /api/calls
/// Start a call with the caller's stored voice credentials
pub async fn start_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StartCallRequest>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut config = SessionConfig::new(req.mode, user.id.clone(), user.name.clone());
    config.credentials = Credentials {
        client_token: user.client_token.clone(),
        assistant_id: user.assistant_id.clone(),
    };
    config.feedback_id = req.feedback_id;

    if req.mode == CallMode::Interview {
        let Some(interview_id) = req.interview_id else {
            return error_response(StatusCode::BAD_REQUEST, CallError::MissingInterview.to_string());
        };

        match state.repo.get_interview(&interview_id).await {
            Ok(Some(interview)) => config.questions = interview.questions,
            Ok(None) => {
                return error_response(
                    StatusCode::NOT_FOUND,
                    format!("Interview {} not found", interview_id),
                );
            }
            Err(e) => {
                error!("Failed to load interview {}: {}", interview_id, e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }
        }
        config.interview_id = Some(interview_id);
    }

    let call_id = config.call_id.clone();
    info!("Starting {} call {} for user {}", req.mode, call_id, user.id);

    let mut session = CallSession::new(config, state.voice.clone(), state.gateway.clone());
    if let Err(e) = session.start().await {
        let status = if e.is_configuration() {
            warn!("Call {} not started: {}", call_id, e);
            StatusCode::BAD_REQUEST
        } else {
            error!("Call {} failed to start: {}", call_id, e);
            StatusCode::BAD_GATEWAY
        };
        return error_response(status, e.to_string());
    }

    let status = session.status();
    let call = RunningCall::spawn(session);
    state.track_call(call_id.clone(), user.id, call).await;

    (
        StatusCode::OK,
        Json(StartCallResponse {
            success: true,
            call_id,
            status,
        }),
    )
        .into_response()
}

/// POST /api/calls/:call_id/stop
/// Hang up; the outcome shows up on the call status once dispatched
pub async fn stop_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if let Some(tracked) = state
        .calls
        .read()
        .await
        .get(&call_id)
        .filter(|c| c.user_id == user.id)
    {
        tracked.call.disconnect();
    }

    match state.call_snapshot(&call_id, &user.id).await {
        Some(snapshot) => (StatusCode::ACCEPTED, Json(snapshot)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Call {} not found", call_id)),
    }
}

/// GET /api/calls/:call_id
/// Status, transcript and outcome of a call
pub async fn get_call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(call_id): Path<String>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.call_snapshot(&call_id, &user.id).await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Call {} not found", call_id)),
    }
}
