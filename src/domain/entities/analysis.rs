use serde::{Deserialize, Serialize};

pub const FALLBACK_PRIORITY_SCORE: i32 = 5;
pub const FALLBACK_CATEGORY: &str = "Uncategorized";
pub const FALLBACK_SUMMARY: &str = "AI Analysis Failed";

/// Classifier verdict embedded 1:1 in a conversation.
///
/// `is_processed == false` means the verdict is a placeholder and its
/// priority data is not trustworthy yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIAnalysis {
    pub summary: String,
    pub category: String,
    pub priority_score: i32,
    pub reason: String,
    pub sentiment: String,
    pub is_processed: bool,
}

impl AIAnalysis {
    /// Placeholder stored when the classifier is unavailable or its output
    /// could not be parsed.
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            category: FALLBACK_CATEGORY.to_string(),
            priority_score: FALLBACK_PRIORITY_SCORE,
            reason: String::new(),
            sentiment: String::new(),
            is_processed: false,
        }
    }

    /// Scores outside 1..=10 or an empty category mark a degraded verdict.
    pub fn is_degraded(&self) -> bool {
        !(1..=10).contains(&self.priority_score) || self.category.trim().is_empty()
    }
}

/// Unparsed classifier response: the text of each returned candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClassifierOutput {
    pub candidates: Vec<String>,
}

impl RawClassifierOutput {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![text.into()],
        }
    }
}

/// A drafted support reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub tone: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionListResponse {
    pub suggestions: Vec<Suggestion>,
}
