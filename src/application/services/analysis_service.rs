use crate::domain::entities::{AIAnalysis, RawClassifierOutput, Suggestion};
use crate::domain::errors::{AnalysisError, AnalysisResult};
use crate::domain::ports::text_generator::TextGenerator;
use serde::Deserialize;
use std::sync::Arc;

/// Quote arbitrary text as a JSON string literal for embedding in a prompt.
fn quoted(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

pub fn build_classification_prompt(complaint_text: &str) -> String {
    format!(
        "Analyze the following student complaint: {}.\n\
         Respond with a raw JSON object containing exactly these fields:\n\
         - summary (string): a short summary of the complaint.\n\
         - category (string): the complaint category (for example Academic, Facilities, Financial).\n\
         - priority_score (integer 1-10): how urgent the complaint is.\n\
         - reason (string): why this score and category were chosen.\n\
         - sentiment (string): the sentiment of the message (positive, negative or neutral).",
        quoted(complaint_text)
    )
}

pub fn build_suggestion_prompt(message_text: &str) -> String {
    format!(
        "You are a university support agent. Draft three replies to the student message {}.\n\
         Respond with a raw JSON array of exactly three objects, each with the fields:\n\
         - tone (string): one of formal, empathetic, concise, each used once.\n\
         - content (string): the full reply text.",
        quoted(message_text)
    )
}

/// Shape the classifier is asked to produce. Every field is required.
#[derive(Deserialize)]
struct ClassifierPayload {
    summary: String,
    category: String,
    priority_score: i32,
    reason: String,
    sentiment: String,
}

/// Turn untrusted classifier text into a trusted analysis.
///
/// Only the first candidate is considered. A successfully parsed analysis is
/// always marked processed, even when its score or category look degraded.
pub fn normalize_analysis(raw: &RawClassifierOutput) -> AnalysisResult<AIAnalysis> {
    let text = raw
        .candidates
        .first()
        .ok_or_else(|| AnalysisError::MalformedAnalysis("No candidate to parse".to_string()))?;

    let payload: ClassifierPayload = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::MalformedAnalysis(e.to_string()))?;

    let analysis = AIAnalysis {
        summary: payload.summary,
        category: payload.category,
        priority_score: payload.priority_score,
        reason: payload.reason,
        sentiment: payload.sentiment,
        is_processed: true,
    };

    if analysis.is_degraded() {
        tracing::warn!(
            priority_score = analysis.priority_score,
            category = %analysis.category,
            "Classifier returned a degraded analysis"
        );
    }

    Ok(analysis)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    List(Vec<Suggestion>),
    Wrapped { suggestions: Vec<Suggestion> },
}

pub fn parse_suggestions(raw: &RawClassifierOutput) -> AnalysisResult<Vec<Suggestion>> {
    let text = raw
        .candidates
        .first()
        .ok_or_else(|| AnalysisError::MalformedAnalysis("No candidate to parse".to_string()))?;

    let payload: SuggestionPayload = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::MalformedAnalysis(e.to_string()))?;

    Ok(match payload {
        SuggestionPayload::List(suggestions) => suggestions,
        SuggestionPayload::Wrapped { suggestions } => suggestions,
    })
}

/// Complaint classifier: prompt building, the outbound call and
/// normalization of its output.
#[derive(Clone)]
pub struct AnalysisService {
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// One outbound classifier call for `complaint_text`; no retry.
    pub async fn request_analysis(
        &self,
        complaint_text: &str,
    ) -> AnalysisResult<RawClassifierOutput> {
        if complaint_text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput);
        }

        let prompt = build_classification_prompt(complaint_text);
        let raw = self.generator.generate_json(&prompt).await?;

        if raw.candidates.is_empty() {
            return Err(AnalysisError::UpstreamUnavailable(format!(
                "{} returned no candidates",
                self.generator.provider_name()
            )));
        }

        Ok(raw)
    }

    #[tracing::instrument(skip(self, complaint_text), fields(provider = self.generator.provider_name()))]
    pub async fn analyze(&self, complaint_text: &str) -> AnalysisResult<AIAnalysis> {
        let result = match self.request_analysis(complaint_text).await {
            Ok(raw) => normalize_analysis(&raw),
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::counter!("ai_analysis_total", "outcome" => outcome).increment(1);

        result
    }

    /// Like [`analyze`](Self::analyze), but any failure yields
    /// [`AIAnalysis::fallback`].
    pub async fn analyze_or_fallback(&self, complaint_text: &str) -> AIAnalysis {
        match self.analyze(complaint_text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("AI analysis failed, using fallback: {}", e);
                AIAnalysis::fallback()
            }
        }
    }

    #[tracing::instrument(skip(self, message_text))]
    pub async fn suggest_replies(&self, message_text: &str) -> AnalysisResult<Vec<Suggestion>> {
        if message_text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput);
        }

        let prompt = build_suggestion_prompt(message_text);
        let raw = self.generator.generate_json(&prompt).await?;
        parse_suggestions(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::MockTextGenerator;

    const VALID: &str = r#"{"summary":"Wifi outage in dorm","category":"Facilities","priority_score":7,"reason":"Blocks coursework","sentiment":"negative"}"#;

    #[test]
    fn test_prompt_is_deterministic_and_names_fields() {
        let prompt = build_classification_prompt("AC in room 204 is broken");
        assert_eq!(prompt, build_classification_prompt("AC in room 204 is broken"));
        assert!(prompt.contains("\"AC in room 204 is broken\""));
        for field in ["summary", "category", "priority_score", "reason", "sentiment"] {
            assert!(prompt.contains(field), "prompt should mention {}", field);
        }
    }

    #[test]
    fn test_prompt_quotes_embedded_quotes() {
        let prompt = build_classification_prompt(r#"he said "no""#);
        assert!(prompt.contains(r#""he said \"no\"""#));
    }

    #[test]
    fn test_normalize_marks_processed() {
        let analysis = normalize_analysis(&RawClassifierOutput::single(VALID)).unwrap();
        assert_eq!(analysis.category, "Facilities");
        assert_eq!(analysis.priority_score, 7);
        assert!(analysis.is_processed);
    }

    #[test]
    fn test_normalize_keeps_out_of_range_score() {
        let raw = RawClassifierOutput::single(
            r#"{"summary":"s","category":"","priority_score":42,"reason":"r","sentiment":"neutral"}"#,
        );
        let analysis = normalize_analysis(&raw).unwrap();
        assert_eq!(analysis.priority_score, 42);
        assert!(analysis.is_processed);
        assert!(analysis.is_degraded());
    }

    #[test]
    fn test_normalize_uses_first_candidate_only() {
        let raw = RawClassifierOutput {
            candidates: vec!["not json".to_string(), VALID.to_string()],
        };
        assert!(matches!(
            normalize_analysis(&raw),
            Err(AnalysisError::MalformedAnalysis(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_bad_shapes() {
        let cases = [
            "plain text answer",
            r#"{"summary":"s","category":"c","reason":"r","sentiment":"n"}"#,
            r#"{"summary":"s","category":"c","priority_score":"high","reason":"r","sentiment":"n"}"#,
            r#"[1,2,3]"#,
        ];
        for case in cases {
            assert!(
                matches!(
                    normalize_analysis(&RawClassifierOutput::single(case)),
                    Err(AnalysisError::MalformedAnalysis(_))
                ),
                "expected malformed for {}",
                case
            );
        }
        assert!(normalize_analysis(&RawClassifierOutput::default()).is_err());
    }

    #[test]
    fn test_parse_suggestions_accepts_list_or_wrapper() {
        let list = RawClassifierOutput::single(r#"[{"tone":"formal","content":"Dear student"}]"#);
        assert_eq!(parse_suggestions(&list).unwrap().len(), 1);

        let wrapped = RawClassifierOutput::single(
            r#"{"suggestions":[{"tone":"concise","content":"On it."},{"tone":"empathetic","content":"Sorry!"}]}"#,
        );
        let suggestions = parse_suggestions(&wrapped).unwrap();
        assert_eq!(suggestions[1].tone, "empathetic");

        assert!(parse_suggestions(&RawClassifierOutput::single("{}")).is_err());
    }

    #[tokio::test]
    async fn test_empty_text_never_calls_classifier() {
        let generator = Arc::new(MockTextGenerator::returning(VALID));
        let service = AnalysisService::new(generator.clone());

        assert_eq!(
            service.request_analysis("   ").await,
            Err(AnalysisError::InvalidInput)
        );
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_upstream_failure() {
        let service = AnalysisService::new(Arc::new(MockTextGenerator::failing()));
        let analysis = service.analyze_or_fallback("Library closes too early").await;

        assert_eq!(analysis, AIAnalysis::fallback());
    }

    #[tokio::test]
    async fn test_fallback_on_zero_candidates() {
        let generator = MockTextGenerator::with_default(Ok(RawClassifierOutput::default()));
        let service = AnalysisService::new(Arc::new(generator));

        assert!(matches!(
            service.analyze("Scholarship payment late").await,
            Err(AnalysisError::UpstreamUnavailable(_))
        ));
    }
}
