use crate::application::services::{
    AnalyticsService, AuthService, ConversationService,
};
use crate::domain::entities::{Requester, UserProfile, UserRole};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub conversation_service: ConversationService,
    pub analytics_service: AnalyticsService,
}

/// Caller identity attached to every authenticated request.
///
/// The profile (and with it the role) is resolved once, in `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: Option<String>,
    pub profile: Option<UserProfile>,
}

impl AuthenticatedUser {
    /// The caller as a requester of whatever role their profile holds.
    pub fn requester(&self) -> ApiResult<Requester> {
        let profile = self.profile.as_ref().ok_or_else(|| {
            ApiError::Forbidden("Access denied: user profile not found".to_string())
        })?;

        Ok(Requester {
            user_id: self.uid.clone(),
            role: profile.role,
        })
    }

    /// Like [`requester`](Self::requester) but only for the given role.
    pub fn require_role(&self, role: UserRole) -> ApiResult<Requester> {
        let requester = self.requester()?;
        if requester.role != role {
            tracing::warn!(uid = %self.uid, required = %role, actual = %requester.role, "Role check failed");
            return Err(ApiError::Forbidden(format!(
                "Access denied: you are not a {}",
                role
            )));
        }
        Ok(requester)
    }
}

/// Extract the bearer token from an `Authorization` header value.
pub fn parse_bearer(header: Option<&str>) -> ApiResult<&str> {
    let value = header.ok_or_else(|| {
        ApiError::Unauthorized("Authorization header is required".to_string())
    })?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthorized(
            "Authorization header must be 'Bearer <token>'".to_string(),
        )),
    }
}

/// Verify the bearer token with the identity service and attach an
/// [`AuthenticatedUser`] to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let token = parse_bearer(header)?.to_string();

    let identity = state.auth_service.verify_token(&token).await?;
    let profile = state.auth_service.get_profile(&identity.uid).await?;

    request.extensions_mut().insert(AuthenticatedUser {
        uid: identity.uid,
        email: identity.email,
        profile,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(role: Option<UserRole>) -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "uid-1".to_string(),
            email: None,
            profile: role.map(|role| UserProfile {
                uid: "uid-1".to_string(),
                name: "Ana".to_string(),
                email: String::new(),
                role,
                created_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(parse_bearer(None), Err(ApiError::Unauthorized(_))));
        assert!(matches!(parse_bearer(Some("abc")), Err(ApiError::Unauthorized(_))));
        assert!(matches!(parse_bearer(Some("Bearer ")), Err(ApiError::Unauthorized(_))));
        assert!(matches!(parse_bearer(Some("Basic abc")), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_require_role() {
        let student = user_with_role(Some(UserRole::Student));
        assert_eq!(
            student.require_role(UserRole::Student).unwrap(),
            Requester::student("uid-1")
        );
        assert!(matches!(
            student.require_role(UserRole::Support),
            Err(ApiError::Forbidden(_))
        ));

        let unregistered = user_with_role(None);
        assert!(matches!(unregistered.requester(), Err(ApiError::Forbidden(_))));
    }
}
