use crate::domain::entities::{
    AIAnalysis, Conversation, ConversationStatus, Message, NewConversation, NewMessage,
};
use crate::domain::ports::conversation_repository::{
    ConversationQuery, ConversationRepository, SortDirection, SortField,
};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use crate::shared::utils::timestamp::{format_timestamp, next_timestamp_after, parse_timestamp};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;

const CONVERSATION_COLUMNS: &str = "id, student_id, student_name, student_email, status, \
     last_message, messages, ai_summary, ai_category, ai_priority_score, ai_reason, \
     ai_sentiment, ai_is_processed, created_at, updated_at";

/// Decode one stored document. Any malformed field makes the whole row
/// undecodable.
fn conversation_from_row(row: &AnyRow) -> ApiResult<Conversation> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ConversationStatus>()
        .map_err(ApiError::Internal)?;

    let messages_json: String = row.try_get("messages")?;
    let messages: Vec<Message> = serde_json::from_str(&messages_json)?;

    let priority_score: i64 = row.try_get("ai_priority_score")?;
    let priority_score = i32::try_from(priority_score)
        .map_err(|_| ApiError::Internal(format!("Priority score out of range: {}", priority_score)))?;
    let is_processed: i64 = row.try_get("ai_is_processed")?;

    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Conversation {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        student_name: row.try_get("student_name")?,
        student_email: row.try_get("student_email")?,
        last_message: row.try_get("last_message")?,
        status,
        messages,
        ai_analysis: AIAnalysis {
            summary: row.try_get("ai_summary")?,
            category: row.try_get("ai_category")?,
            priority_score,
            reason: row.try_get("ai_reason")?,
            sentiment: row.try_get("ai_sentiment")?,
            is_processed: is_processed != 0,
        },
        created_at: parse_stored_timestamp(&created_at)?,
        updated_at: parse_stored_timestamp(&updated_at)?,
    })
}

fn parse_stored_timestamp(value: &str) -> ApiResult<DateTime<Utc>> {
    parse_timestamp(value)
        .map_err(|e| ApiError::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}

fn order_clause(query: &ConversationQuery) -> String {
    let direction = match query.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };

    match query.order_by {
        SortField::PriorityScore => {
            format!("ai_priority_score {}, updated_at DESC, id ASC", direction)
        }
        SortField::UpdatedAt => format!("updated_at {}, id ASC", direction),
    }
}

#[async_trait]
impl ConversationRepository for Database {
    async fn create_conversation(&self, conversation: &NewConversation) -> ApiResult<String> {
        let conversation_id = uuid::Uuid::new_v4().to_string();
        let messages_json = serde_json::to_string(&conversation.messages)?;
        let analysis = &conversation.ai_analysis;

        sqlx::query(
            "INSERT INTO conversations (id, student_id, student_name, student_email, status,
                 last_message, messages, ai_summary, ai_category, ai_priority_score, ai_reason,
                 ai_sentiment, ai_is_processed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&conversation_id)
        .bind(&conversation.student_id)
        .bind(&conversation.student_name)
        .bind(&conversation.student_email)
        .bind(conversation.status.as_str())
        .bind(&conversation.last_message)
        .bind(&messages_json)
        .bind(&analysis.summary)
        .bind(&analysis.category)
        .bind(i64::from(analysis.priority_score))
        .bind(&analysis.reason)
        .bind(&analysis.sentiment)
        .bind(i64::from(analysis.is_processed))
        .bind(format_timestamp(&conversation.created_at))
        .bind(format_timestamp(&conversation.updated_at))
        .execute(&self.pool)
        .await?;

        tracing::info!(
            conversation_id = %conversation_id,
            student_id = %conversation.student_id,
            "Conversation created"
        );

        Ok(conversation_id)
    }

    async fn get_conversation_by_id(&self, id: &str) -> ApiResult<Option<Conversation>> {
        let sql = format!(
            "SELECT {} FROM conversations WHERE id = ?",
            CONVERSATION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let conversation = conversation_from_row(&row).map_err(|e| {
                    tracing::error!(conversation_id = %id, "Corrupt conversation document: {}", e);
                    e
                })?;
                Ok(Some(conversation))
            }
            None => Ok(None),
        }
    }

    async fn append_message(
        &self,
        id: &str,
        message: &NewMessage,
        status: Option<ConversationStatus>,
    ) -> ApiResult<DateTime<Utc>> {
        let mut tx = self.pool.begin().await?;

        // No-op write first so this transaction holds the write lock before
        // it reads the previous updated_at.
        let touched = sqlx::query("UPDATE conversations SET updated_at = updated_at WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(ApiError::NotFound("Conversation not found".to_string()));
        }

        let previous: String =
            sqlx::query_scalar("SELECT updated_at FROM conversations WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let timestamp = next_timestamp_after(Utc::now(), parse_timestamp(&previous).ok());
        let entry = Message::new(message.sender, message.text.clone(), timestamp);
        let entry_json = serde_json::to_string(&entry)?;

        sqlx::query(
            "UPDATE conversations
             SET messages = json_insert(messages, '$[#]', json(?)),
                 last_message = ?,
                 updated_at = ?,
                 status = COALESCE(?, status)
             WHERE id = ?",
        )
        .bind(&entry_json)
        .bind(&message.text)
        .bind(format_timestamp(&timestamp))
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            conversation_id = %id,
            sender = message.sender.as_str(),
            status = ?status,
            "Message appended"
        );

        Ok(timestamp)
    }

    async fn merge_analysis(&self, id: &str, analysis: &AIAnalysis) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE conversations
             SET ai_summary = ?, ai_category = ?, ai_priority_score = ?, ai_reason = ?,
                 ai_sentiment = ?, ai_is_processed = ?
             WHERE id = ?",
        )
        .bind(&analysis.summary)
        .bind(&analysis.category)
        .bind(i64::from(analysis.priority_score))
        .bind(&analysis.reason)
        .bind(&analysis.sentiment)
        .bind(i64::from(analysis.is_processed))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Conversation not found".to_string()));
        }

        Ok(())
    }

    async fn query_conversations(
        &self,
        query: &ConversationQuery,
    ) -> ApiResult<Vec<Conversation>> {
        let filter = if query.student_id.is_some() {
            " WHERE student_id = ?"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {} FROM conversations{} ORDER BY {}",
            CONVERSATION_COLUMNS,
            filter,
            order_clause(query)
        );

        let mut statement = sqlx::query(&sql);
        if let Some(student_id) = &query.student_id {
            statement = statement.bind(student_id);
        }
        let rows = statement.fetch_all(&self.pool).await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            match conversation_from_row(row) {
                Ok(conversation) => conversations.push(conversation),
                Err(e) => {
                    let id: String = row.try_get("id").unwrap_or_default();
                    tracing::warn!(conversation_id = %id, "Skipping corrupt conversation: {}", e);
                    metrics::counter!("listing_corrupt_documents_total").increment(1);
                }
            }
        }

        Ok(conversations)
    }
}
