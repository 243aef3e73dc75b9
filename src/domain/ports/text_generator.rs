use crate::domain::entities::RawClassifierOutput;
use crate::domain::errors::AnalysisResult;
use async_trait::async_trait;

/// Hosted generative model that answers a prompt with JSON text.
///
/// Implementations make exactly one outbound call per invocation. A
/// transport error or an empty candidate list is reported as
/// `AnalysisError::UpstreamUnavailable`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> AnalysisResult<RawClassifierOutput>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
