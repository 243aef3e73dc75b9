use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Identity established by the external identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify an ID token. Any failure is `ApiError::Unauthorized`.
    async fn verify_id_token(&self, id_token: &str) -> ApiResult<VerifiedIdentity>;
}
