use crate::domain::entities::{AnalyticsOverview, Conversation, DailyTicketStats};
use crate::domain::ports::conversation_repository::{
    ConversationQuery, ConversationRepository, SortDirection, SortField,
};
use crate::infrastructure::http::middleware::error::ApiResult;
use chrono::{Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const UNCATEGORIZED_BUCKET: &str = "Others";
const DAILY_WINDOW_DAYS: i64 = 7;

/// Aggregate the dashboard figures over `conversations`, with `today` as the
/// last day of the daily window.
pub fn build_overview(conversations: &[Conversation], today: NaiveDate) -> AnalyticsOverview {
    let mut issue_distribution: BTreeMap<String, u64> = BTreeMap::new();
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    let mut scored = 0u64;
    let mut score_total = 0f64;

    for conversation in conversations {
        let category = conversation.ai_analysis.category.trim();
        let bucket = if category.is_empty() {
            UNCATEGORIZED_BUCKET
        } else {
            category
        };
        *issue_distribution.entry(bucket.to_string()).or_insert(0) += 1;

        if conversation.ai_analysis.priority_score > 0 {
            scored += 1;
            score_total += f64::from(conversation.ai_analysis.priority_score);
        }

        *per_day
            .entry(conversation.updated_at.date_naive())
            .or_insert(0) += 1;
    }

    let average_priority_score = if scored > 0 {
        score_total / scored as f64
    } else {
        0.0
    };

    let daily_tickets = (0..DAILY_WINDOW_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            DailyTicketStats {
                date: date.format("%Y-%m-%d").to_string(),
                count: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect();

    AnalyticsOverview {
        issue_distribution,
        average_priority_score,
        daily_tickets,
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    conversation_repo: Arc<dyn ConversationRepository>,
}

impl AnalyticsService {
    pub fn new(conversation_repo: Arc<dyn ConversationRepository>) -> Self {
        Self { conversation_repo }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_overview(&self) -> ApiResult<AnalyticsOverview> {
        let conversations = self
            .conversation_repo
            .query_conversations(&ConversationQuery::ordered(
                SortField::UpdatedAt,
                SortDirection::Desc,
            ))
            .await?;

        Ok(build_overview(&conversations, Utc::now().date_naive()))
    }
}
