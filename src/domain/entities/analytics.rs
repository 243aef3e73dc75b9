use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub issue_distribution: BTreeMap<String, u64>,
    pub average_priority_score: f64,
    pub daily_tickets: Vec<DailyTicketStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTicketStats {
    pub date: String,
    pub count: u64,
}
