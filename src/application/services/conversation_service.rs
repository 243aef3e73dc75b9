use crate::application::services::analysis_service::AnalysisService;
use crate::domain::entities::{
    Conversation, ConversationStatus, MessageSender, NewConversation, NewMessage, Requester,
    Suggestion, UserRole,
};
use crate::domain::errors::AnalysisError;
use crate::domain::ports::conversation_repository::{
    ConversationQuery, ConversationRepository, SortDirection, SortField,
};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

fn require_text(text: &str) -> ApiResult<()> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text must not be empty".to_string()));
    }
    Ok(())
}

fn ensure_owner(conversation: &Conversation, requester: &Requester) -> ApiResult<()> {
    if requester.is_student() && !conversation.is_owned_by(&requester.user_id) {
        tracing::warn!(
            conversation_id = %conversation.id,
            requester = %requester.user_id,
            "Student attempted to access another student's conversation"
        );
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ConversationService {
    conversation_repo: Arc<dyn ConversationRepository>,
    analysis_service: AnalysisService,
}

impl ConversationService {
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        analysis_service: AnalysisService,
    ) -> Self {
        Self {
            conversation_repo,
            analysis_service,
        }
    }

    async fn load(&self, id: &str) -> ApiResult<Conversation> {
        self.conversation_repo
            .get_conversation_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))
    }

    /// Create a ticket from a new complaint.
    ///
    /// A classifier failure never fails the submission; the ticket is stored
    /// with the fallback analysis instead.
    #[tracing::instrument(skip(self, student_name, student_email, text))]
    pub async fn submit_complaint(
        &self,
        student_id: &str,
        student_name: &str,
        student_email: &str,
        text: &str,
    ) -> ApiResult<String> {
        require_text(text)?;

        let analysis = self.analysis_service.analyze_or_fallback(text).await;

        let conversation = NewConversation::from_complaint(
            student_id,
            student_name,
            student_email,
            text,
            analysis,
            Utc::now(),
        );
        let ticket_id = self
            .conversation_repo
            .create_conversation(&conversation)
            .await?;

        metrics::counter!("complaints_submitted_total").increment(1);
        tracing::info!(
            ticket_id = %ticket_id,
            is_processed = conversation.ai_analysis.is_processed,
            priority_score = conversation.ai_analysis.priority_score,
            "Complaint submitted"
        );

        Ok(ticket_id)
    }

    /// Fetch a conversation for display, analyzing it first if no analysis
    /// has succeeded yet.
    ///
    /// Once `is_processed` is set the analysis is never recomputed, even if
    /// more messages arrive. Ownership is checked before any analysis so a
    /// rejected read leaves the store untouched.
    #[tracing::instrument(skip(self))]
    pub async fn get_conversation_with_analysis(
        &self,
        id: &str,
        requester: &Requester,
    ) -> ApiResult<Conversation> {
        let mut conversation = self.load(id).await?;
        ensure_owner(&conversation, requester)?;

        if conversation.ai_analysis.is_processed {
            metrics::counter!("ai_lazy_analysis_total", "outcome" => "skipped").increment(1);
            return Ok(conversation);
        }

        let analysis = match self.analysis_service.analyze(&conversation.transcript()).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(conversation_id = %id, "Lazy analysis failed: {}", e);
                metrics::counter!("ai_lazy_analysis_total", "outcome" => "failed").increment(1);
                return Ok(conversation);
            }
        };

        match self.conversation_repo.merge_analysis(id, &analysis).await {
            Ok(()) => {
                metrics::counter!("ai_lazy_analysis_total", "outcome" => "merged").increment(1);
                tracing::info!(conversation_id = %id, "Lazy analysis merged");
                conversation.ai_analysis = analysis;
            }
            Err(e) => {
                tracing::warn!(conversation_id = %id, "Failed to persist lazy analysis: {}", e);
                metrics::counter!("ai_lazy_analysis_total", "outcome" => "failed").increment(1);
            }
        }

        Ok(conversation)
    }

    /// Support inbox, ordered by the store.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_support(
        &self,
        order_by: SortField,
        direction: SortDirection,
    ) -> ApiResult<Vec<Conversation>> {
        self.conversation_repo
            .query_conversations(&ConversationQuery::ordered(order_by, direction))
            .await
    }

    /// A student's own tickets, newest activity first.
    ///
    /// The store only filters by owner; ordering happens here because a
    /// combined filter and order is not guaranteed by every backend.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_student(&self, student_id: &str) -> ApiResult<Vec<Conversation>> {
        let mut conversations = self
            .conversation_repo
            .query_conversations(&ConversationQuery::owned_by(student_id))
            .await?;

        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    /// Append a reply. Support replies move the ticket to `in_progress`;
    /// student replies require ownership and leave the status alone.
    #[tracing::instrument(skip(self, text))]
    pub async fn reply(
        &self,
        id: &str,
        requester: &Requester,
        text: &str,
    ) -> ApiResult<DateTime<Utc>> {
        require_text(text)?;

        let (sender, status) = match requester.role {
            UserRole::Support => (MessageSender::Support, Some(ConversationStatus::InProgress)),
            UserRole::Student => {
                let conversation = self.load(id).await?;
                ensure_owner(&conversation, requester)?;
                (MessageSender::Student, None)
            }
        };

        let message = NewMessage {
            sender,
            text: text.to_string(),
        };
        let timestamp = self
            .conversation_repo
            .append_message(id, &message, status)
            .await?;

        metrics::counter!("conversation_replies_total", "sender" => sender.as_str()).increment(1);

        Ok(timestamp)
    }

    /// Draft support replies for the conversation's latest message.
    #[tracing::instrument(skip(self))]
    pub async fn suggest_replies(&self, id: &str) -> ApiResult<Vec<Suggestion>> {
        let conversation = self.load(id).await?;

        self.analysis_service
            .suggest_replies(&conversation.last_message)
            .await
            .map_err(|e| match e {
                AnalysisError::InvalidInput => {
                    ApiError::BadRequest("Conversation has no message to answer".to_string())
                }
                other => {
                    tracing::error!(conversation_id = %id, "Suggestion generation failed: {}", other);
                    ApiError::Internal(format!("Failed to generate AI suggestions: {}", other))
                }
            })
    }
}
