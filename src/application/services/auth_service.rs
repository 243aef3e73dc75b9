use crate::domain::entities::{LoginRequest, RegisterRequest, UserProfile, UserRole};
use crate::domain::ports::identity_verifier::{IdentityVerifier, VerifiedIdentity};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::email_validator::validate_and_normalize_email;
use chrono::Utc;
use std::sync::Arc;

/// Email to store for a registration: the requested one when given (and
/// it must be valid), otherwise the identity service's, normalized.
///
/// An identity email that fails validation is dropped rather than failing
/// the registration, since the caller cannot correct it.
pub fn resolve_profile_email(requested: &str, identity_email: Option<&str>) -> ApiResult<String> {
    if !requested.trim().is_empty() {
        return validate_and_normalize_email(requested);
    }

    match identity_email.filter(|e| !e.trim().is_empty()) {
        Some(email) => Ok(validate_and_normalize_email(email).unwrap_or_else(|e| {
            tracing::warn!("Ignoring identity-service email: {}", e);
            String::new()
        })),
        None => Ok(String::new()),
    }
}

/// Token verification and profile storage.
///
/// Tokens are issued and verified by the external identity service; this
/// service only keeps the profile (and therefore the role) for each uid.
#[derive(Clone)]
pub struct AuthService {
    identity_verifier: Arc<dyn IdentityVerifier>,
    user_repo: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(
        identity_verifier: Arc<dyn IdentityVerifier>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            identity_verifier,
            user_repo,
        }
    }

    pub async fn verify_token(&self, id_token: &str) -> ApiResult<VerifiedIdentity> {
        self.identity_verifier.verify_id_token(id_token).await
    }

    pub async fn get_profile(&self, uid: &str) -> ApiResult<Option<UserProfile>> {
        self.user_repo.get_user_profile(uid).await
    }

    #[tracing::instrument(skip(self, request), fields(role = %request.role))]
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<UserProfile> {
        let identity = self.verify_token(&request.id_token).await?;

        let role = request.role.parse::<UserRole>().map_err(|_| {
            ApiError::BadRequest("Role must be either 'student' or 'support'".to_string())
        })?;

        let email = resolve_profile_email(&request.email, identity.email.as_deref())?;

        let profile = UserProfile {
            uid: identity.uid.clone(),
            name: request.name.trim().to_string(),
            email,
            role,
            created_at: Utc::now(),
        };

        self.user_repo.upsert_user_profile(&profile).await?;

        let stored = self
            .user_repo
            .get_user_profile(&identity.uid)
            .await?
            .unwrap_or(profile);

        tracing::info!(uid = %stored.uid, role = %stored.role, "User registered");
        Ok(stored)
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> ApiResult<UserProfile> {
        let identity = self.verify_token(&request.id_token).await?;

        self.user_repo
            .get_user_profile(&identity.uid)
            .await?
            .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))
    }
}
