//! In-process stand-ins for the classifier and the identity service,
//! used by tests and local development.

use crate::domain::entities::RawClassifierOutput;
use crate::domain::errors::{AnalysisError, AnalysisResult};
use crate::domain::ports::identity_verifier::{IdentityVerifier, VerifiedIdentity};
use crate::domain::ports::text_generator::TextGenerator;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted text generator.
///
/// Queued responses are returned first, in order; afterwards every call
/// gets the default response. Records every prompt it receives.
pub struct MockTextGenerator {
    queued: Mutex<VecDeque<AnalysisResult<RawClassifierOutput>>>,
    default_response: AnalysisResult<RawClassifierOutput>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockTextGenerator {
    /// Always answers with a single candidate containing `text`
    pub fn returning(text: impl Into<String>) -> Self {
        Self::with_default(Ok(RawClassifierOutput::single(text)))
    }

    /// Always fails as if the upstream were down
    pub fn failing() -> Self {
        Self::with_default(Err(AnalysisError::UpstreamUnavailable(
            "Mock classifier failure".to_string(),
        )))
    }

    pub fn with_default(default_response: AnalysisResult<RawClassifierOutput>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default_response,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a one-off response ahead of the default
    pub fn then(self, response: AnalysisResult<RawClassifierOutput>) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_json(&self, prompt: &str) -> AnalysisResult<RawClassifierOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());

        let queued = self
            .queued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        queued.unwrap_or_else(|| self.default_response.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Accepts a fixed set of tokens
#[derive(Default)]
pub struct MockIdentityVerifier {
    identities: HashMap<String, VerifiedIdentity>,
}

impl MockIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: &str, uid: &str, email: Option<&str>) -> Self {
        self.identities.insert(
            token.to_string(),
            VerifiedIdentity {
                uid: uid.to_string(),
                email: email.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> ApiResult<VerifiedIdentity> {
        self.identities
            .get(id_token)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}
