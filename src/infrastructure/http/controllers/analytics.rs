use crate::{
    domain::entities::{AnalyticsOverview, UserRole},
    infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser},
};
use axum::{extract::State, Json};

pub async fn get_overview(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<AnalyticsOverview>> {
    auth_user.require_role(UserRole::Support)?;
    let overview = state.analytics_service.get_overview().await?;
    Ok(Json(overview))
}
