use crate::{
    domain::entities::*,
    infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list_my_conversations(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<ConversationListResponse>> {
    let requester = auth_user.require_role(UserRole::Student)?;
    let conversations = state
        .conversation_service
        .list_for_student(&requester.user_id)
        .await?;
    Ok(Json(ConversationListResponse { conversations }))
}

pub async fn get_my_conversation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    let requester = auth_user.require_role(UserRole::Student)?;
    let conversation = state
        .conversation_service
        .get_conversation_with_analysis(&id, &requester)
        .await?;
    Ok(Json(conversation))
}

pub async fn reply_to_my_conversation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<Json<ReplyResponse>> {
    let requester = auth_user.require_role(UserRole::Student)?;
    let timestamp = state
        .conversation_service
        .reply(&id, &requester, &request.text)
        .await?;

    Ok(Json(ReplyResponse {
        success: true,
        timestamp,
    }))
}

/// Complaint intake. Name and email come from the stored profile unless the
/// request names the student explicitly.
pub async fn submit_complaint(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateComplaintRequest>,
) -> ApiResult<(StatusCode, Json<CreateComplaintResponse>)> {
    let requester = auth_user.require_role(UserRole::Student)?;

    let (profile_name, profile_email) = auth_user
        .profile
        .as_ref()
        .map(|p| (p.name.as_str(), p.email.as_str()))
        .unwrap_or_default();
    let student_name = match request.student_name.trim() {
        "" => profile_name,
        name => name,
    };
    let student_email = if profile_email.is_empty() {
        auth_user.email.as_deref().unwrap_or_default()
    } else {
        profile_email
    };

    let ticket_id = state
        .conversation_service
        .submit_complaint(&requester.user_id, student_name, student_email, &request.text)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateComplaintResponse {
            success: true,
            message: "Complaint submitted and analyzed".to_string(),
            ticket_id,
        }),
    ))
}
