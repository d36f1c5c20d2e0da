use super::state::AppState;
use crate::feedback::FeedbackRequest;
use crate::session::Credentials;
use crate::store::{Interview, UserProfile};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Header carrying the signed-in user's id
pub const USER_HEADER: &str = "x-user-id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    /// Optional user ID (if not provided, generate UUID)
    pub uid: Option<String>,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub assistant_id: Option<String>,
    /// The token itself is never echoed back
    pub has_client_token: bool,
}

impl From<UserProfile> for ProfileResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            assistant_id: user.assistant_id,
            has_client_token: user
                .client_token
                .map(|t| !t.trim().is_empty())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveClientTokenRequest {
    pub client_token: Option<String>,
    pub assistant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAssistantIdRequest {
    pub assistant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub role: String,
    pub level: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub techstack: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default = "default_finalized")]
    pub finalized: bool,
}

fn default_finalized() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterviewResponse {
    pub success: bool,
    pub interview_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

/// Resolve the caller from the `x-user-id` header
pub(super) async fn current_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserProfile, Response> {
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

    match state.repo.get_user(user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(error_response(StatusCode::UNAUTHORIZED, "Not authenticated")),
        Err(e) => {
            error!("Failed to load user {}: {}", user_id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load user",
            ))
        }
    }
}

// ============================================================================
// Users & profile
// ============================================================================

/// POST /api/users
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Name and email are required");
    }

    let user_id = req
        .uid
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    match state.repo.get_user(&user_id).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(MessageResponse {
                    success: false,
                    message: "User already exists. Please sign in.".to_string(),
                }),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            error!("Error creating user: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create account. Please try again.",
            );
        }
    }

    let user = UserProfile::new(user_id.clone(), req.name.trim(), req.email.trim());
    if let Err(e) = state.repo.put_user(&user).await {
        error!("Error creating user: {}", e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create account. Please try again.",
        );
    }

    info!("Created user {}", user_id);

    (
        StatusCode::CREATED,
        Json(SignUpResponse {
            success: true,
            message: "Account created successfully. Please sign in.".to_string(),
            user_id,
        }),
    )
        .into_response()
}

/// GET /api/profile
pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match current_user(&state, &headers).await {
        Ok(user) => (StatusCode::OK, Json(ProfileResponse::from(user))).into_response(),
        Err(response) => response,
    }
}

/// POST /api/profile/client-token
/// Save the voice client token, and the assistant ID when given
pub async fn save_client_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveClientTokenRequest>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let Some(client_token) = req.client_token.filter(|t| !t.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing client token");
    };

    let credentials = Credentials {
        client_token: Some(client_token),
        assistant_id: req.assistant_id,
    };

    match state.repo.update_credentials(&user.id, credentials).await {
        Ok(_) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            error!("Error updating client token: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update client token",
            )
        }
    }
}

/// POST /api/profile/assistant-id
pub async fn save_assistant_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveAssistantIdRequest>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let Some(assistant_id) = req.assistant_id.filter(|a| !a.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Assistant ID is required");
    };

    let credentials = Credentials {
        client_token: None,
        assistant_id: Some(assistant_id),
    };

    match state.repo.update_credentials(&user.id, credentials).await {
        Ok(_) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            error!("Error updating assistant ID: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update assistant ID",
            )
        }
    }
}

// ============================================================================
// Interviews
// ============================================================================

/// POST /api/interview
pub async fn create_interview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateInterviewRequest>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if req.role.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Role is required");
    }

    let questions: Vec<String> = req
        .questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    let interview = Interview {
        id: format!("iv-{}", uuid::Uuid::new_v4()),
        user_id: user.id,
        role: req.role.trim().to_string(),
        level: req.level,
        kind: req.kind,
        techstack: req.techstack,
        questions,
        finalized: req.finalized,
        created_at: Utc::now(),
    };

    match state.repo.put_interview(&interview).await {
        Ok(()) => {
            info!(
                "Created interview {} ({} questions)",
                interview.id,
                interview.questions.len()
            );
            (
                StatusCode::CREATED,
                Json(CreateInterviewResponse {
                    success: true,
                    interview_id: interview.id,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to create interview: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/interviews
/// The caller's interviews, newest first
pub async fn list_interviews(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.repo.interviews_by_user(&user.id).await {
        Ok(interviews) => (StatusCode::OK, Json(interviews)).into_response(),
        Err(e) => {
            error!("Failed to list interviews: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/interviews/latest
/// Finalized interviews from other users
pub async fn latest_interviews(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LatestQuery>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let limit = query.limit.unwrap_or(20);
    match state.repo.latest_interviews(&user.id, limit).await {
        Ok(interviews) => (StatusCode::OK, Json(interviews)).into_response(),
        Err(e) => {
            error!("Failed to list latest interviews: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/interviews/:interview_id
pub async fn get_interview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(interview_id): Path<String>,
) -> impl IntoResponse {
    if let Err(response) = current_user(&state, &headers).await {
        return response;
    }

    match state.repo.get_interview(&interview_id).await {
        Ok(Some(interview)) => (StatusCode::OK, Json(interview)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", interview_id),
        ),
        Err(e) => {
            error!("Failed to load interview {}: {}", interview_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/interviews/:interview_id/feedback
/// The caller's feedback for an interview
pub async fn get_interview_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(interview_id): Path<String>,
) -> impl IntoResponse {
    let user = match current_user(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .repo
        .feedback_for_interview(&interview_id, &user.id)
        .await
    {
        Ok(Some(feedback)) => (StatusCode::OK, Json(feedback)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("No feedback for interview {}", interview_id),
        ),
        Err(e) => {
            error!("Failed to load feedback for {}: {}", interview_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// POST /api/feedback
/// Always answers 200 with `{success, feedbackId?}`; failures are in the body
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> impl IntoResponse {
    info!(
        "Creating feedback for interview {} ({} turns)",
        req.interview_id,
        req.transcript.len()
    );
    let response = state.feedback.create(req).await;
    (StatusCode::OK, Json(response))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
