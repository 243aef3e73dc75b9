use crate::domain::ports::identity_verifier::{IdentityVerifier, VerifiedIdentity};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// Verifies Firebase ID tokens through the Identity Toolkit
/// `accounts:lookup` endpoint.
pub struct FirebaseIdentityVerifier {
    http_client: Client,
    api_base: String,
    api_key: String,
}

impl FirebaseIdentityVerifier {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
}

fn identity_from_lookup(response: LookupResponse) -> Option<VerifiedIdentity> {
    response
        .users
        .into_iter()
        .next()
        .filter(|user| !user.local_id.is_empty())
        .map(|user| VerifiedIdentity {
            uid: user.local_id,
            email: user.email,
        })
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> ApiResult<VerifiedIdentity> {
        if id_token.trim().is_empty() {
            return Err(ApiError::Unauthorized("ID token is required".to_string()));
        }

        let url = format!("{}/accounts:lookup", self.api_base);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Identity service request failed: {}", e);
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })?;

        if !response.status().is_success() {
            tracing::debug!(
                status = response.status().as_u16(),
                "Identity service rejected token"
            );
            return Err(ApiError::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        let lookup: LookupResponse = response.json().await.map_err(|e| {
            tracing::warn!("Unreadable identity service response: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        identity_from_lookup(lookup)
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_maps_first_user() {
        let response: LookupResponse = serde_json::from_str(
            r#"{"users":[{"localId":"uid-1","email":"ana@example.com","emailVerified":true}]}"#,
        )
        .unwrap();

        assert_eq!(
            identity_from_lookup(response),
            Some(VerifiedIdentity {
                uid: "uid-1".to_string(),
                email: Some("ana@example.com".to_string()),
            })
        );
    }

    #[test]
    fn test_lookup_without_users_is_rejected() {
        let response: LookupResponse = serde_json::from_str(r#"{"kind":"x"}"#).unwrap();
        assert_eq!(identity_from_lookup(response), None);
    }

    #[tokio::test]
    async fn test_blank_token_rejected_without_network() {
        let verifier =
            FirebaseIdentityVerifier::new("http://127.0.0.1:9", "key", Duration::from_secs(1))
                .unwrap();
        let result = verifier.verify_id_token("  ").await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
