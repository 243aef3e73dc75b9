use crate::domain::entities::{
    AIAnalysis, Conversation, ConversationStatus, NewConversation, NewMessage,
};
use crate::infrastructure::http::middleware::error::ApiResult;
use chrono::{DateTime, Utc};

/// Field the store orders a listing by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    PriorityScore,
    UpdatedAt,
}

impl SortField {
    /// Lenient parse of the `sort_by` query parameter; anything unknown
    /// falls back to the priority score.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("updated_at") => SortField::UpdatedAt,
            _ => SortField::PriorityScore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Only `asc` selects ascending order.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// Listing request: server-side ordering plus an optional owner filter.
///
/// Combining `student_id` with an ordering is not relied upon by callers;
/// owner-filtered listings are re-sorted in memory.
#[derive(Debug, Clone, Default)]
pub struct ConversationQuery {
    pub order_by: SortField,
    pub direction: SortDirection,
    pub student_id: Option<String>,
}

impl ConversationQuery {
    pub fn ordered(order_by: SortField, direction: SortDirection) -> Self {
        Self {
            order_by,
            direction,
            student_id: None,
        }
    }

    pub fn owned_by(student_id: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.into()),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Persist a new conversation and return its freshly assigned id.
    async fn create_conversation(&self, conversation: &NewConversation) -> ApiResult<String>;

    async fn get_conversation_by_id(&self, id: &str) -> ApiResult<Option<Conversation>>;

    /// Append `message` to the transcript, set `last_message`, refresh
    /// `updated_at` and optionally change the status, all in one atomic
    /// update. Returns the timestamp stamped on the message.
    async fn append_message(
        &self,
        id: &str,
        message: &NewMessage,
        status: Option<ConversationStatus>,
    ) -> ApiResult<DateTime<Utc>>;

    /// Replace only the embedded analysis.
    async fn merge_analysis(&self, id: &str, analysis: &AIAnalysis) -> ApiResult<()>;

    /// Ordered, optionally owner-filtered listing. Undecodable documents
    /// are skipped.
    async fn query_conversations(&self, query: &ConversationQuery)
        -> ApiResult<Vec<Conversation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_defaults_to_priority() {
        assert_eq!(SortField::from_query(None), SortField::PriorityScore);
        assert_eq!(SortField::from_query(Some("bogus")), SortField::PriorityScore);
        assert_eq!(SortField::from_query(Some("priority_score")), SortField::PriorityScore);
        assert_eq!(SortField::from_query(Some("updated_at")), SortField::UpdatedAt);
    }

    #[test]
    fn test_sort_direction_defaults_to_desc() {
        assert_eq!(SortDirection::from_query(None), SortDirection::Desc);
        assert_eq!(SortDirection::from_query(Some("ASC")), SortDirection::Desc);
        assert_eq!(SortDirection::from_query(Some("asc")), SortDirection::Asc);
    }
}
