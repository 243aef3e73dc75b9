use crate::{
    domain::entities::{AuthResponse, LoginRequest, RegisterRequest},
    infrastructure::http::middleware::{ApiError, ApiResult, AppState},
};
use axum::{extract::State, Json};

fn require_token(id_token: &str) -> ApiResult<()> {
    if id_token.trim().is_empty() {
        return Err(ApiError::BadRequest("idToken is required".to_string()));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    require_token(&request.id_token)?;
    let user = state.auth_service.register(request).await?;
    Ok(Json(AuthResponse::for_user(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    require_token(&request.id_token)?;
    let user = state.auth_service.login(request).await?;
    Ok(Json(AuthResponse::for_user(user)))
}
