use crate::{
    domain::entities::*,
    domain::ports::conversation_repository::{SortDirection, SortField},
    infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListConversationsParams {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Support inbox.
pub async fn list_conversations(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<ListConversationsParams>,
) -> ApiResult<Json<ConversationListResponse>> {
    auth_user.require_role(UserRole::Support)?;

    let conversations = state
        .conversation_service
        .list_for_support(
            SortField::from_query(params.sort_by.as_deref()),
            SortDirection::from_query(params.order.as_deref()),
        )
        .await?;

    Ok(Json(ConversationListResponse { conversations }))
}

/// Open to both roles; students only see their own tickets.
pub async fn get_conversation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    let requester = auth_user.requester()?;
    let conversation = state
        .conversation_service
        .get_conversation_with_analysis(&id, &requester)
        .await?;
    Ok(Json(conversation))
}

pub async fn reply_to_conversation(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<Json<ReplyResponse>> {
    let requester = auth_user.require_role(UserRole::Support)?;
    let timestamp = state
        .conversation_service
        .reply(&id, &requester, &request.text)
        .await?;

    Ok(Json(ReplyResponse {
        success: true,
        timestamp,
    }))
}

pub async fn get_suggestions(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuggestionListResponse>> {
    auth_user.require_role(UserRole::Support)?;
    let suggestions = state.conversation_service.suggest_replies(&id).await?;
    Ok(Json(SuggestionListResponse { suggestions }))
}
