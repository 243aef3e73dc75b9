//! Gemini `generateContent` client used as the complaint classifier.
//!
//! Requests JSON output via `responseMimeType`; every candidate's first
//! text part becomes one entry of [`RawClassifierOutput`].

use crate::domain::entities::RawClassifierOutput;
use crate::domain::errors::{AnalysisError, AnalysisResult};
use crate::domain::ports::text_generator::TextGenerator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiClient {
    http_client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiTextPart<'a>>,
}

#[derive(Serialize)]
struct GeminiTextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

fn build_request(prompt: &str) -> GeminiRequest<'_> {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts: vec![GeminiTextPart { text: prompt }],
        }],
        generation_config: GeminiGenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

fn candidates_from_response(response: GeminiResponse) -> AnalysisResult<RawClassifierOutput> {
    if let Some(error) = response.error {
        return Err(AnalysisError::UpstreamUnavailable(error.message));
    }

    let candidates: Vec<String> = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .filter_map(|content| content.parts.into_iter().find_map(|p| p.text))
        .collect();

    if candidates.is_empty() {
        return Err(AnalysisError::UpstreamUnavailable(
            "Gemini returned no candidates".to_string(),
        ));
    }

    Ok(RawClassifierOutput { candidates })
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> AnalysisResult<RawClassifierOutput> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("Gemini request timed out: {}", e)
                } else if e.is_connect() {
                    format!("Gemini connection failed: {}", e)
                } else {
                    format!("Gemini request failed: {}", e)
                };
                tracing::warn!("{}", reason);
                AnalysisError::UpstreamUnavailable(reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(500).collect();
            tracing::warn!(status = status.as_u16(), "Gemini returned an error: {}", snippet);
            return Err(AnalysisError::UpstreamUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            AnalysisError::UpstreamUnavailable(format!("Unreadable Gemini response: {}", e))
        })?;

        candidates_from_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
