use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::analysis::AIAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Open,
    InProgress,
    Resolved,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Open => "open",
            ConversationStatus::InProgress => "in_progress",
            ConversationStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ConversationStatus::Open),
            "in_progress" => Ok(ConversationStatus::InProgress),
            "resolved" => Ok(ConversationStatus::Resolved),
            _ => Err(format!("Invalid conversation status: {}", s)),
        }
    }
}

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Student,
    Support,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::Student => "student",
            MessageSender::Support => "support",
        }
    }
}

/// One immutable transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: MessageSender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: MessageSender, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }
}

/// A support ticket and its full transcript.
///
/// `id` is assigned by the store and attached on read; it is never part of
/// the persisted body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub last_message: String,
    pub status: ConversationStatus,
    pub messages: Vec<Message>,
    pub ai_analysis: AIAnalysis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_owned_by(&self, student_id: &str) -> bool {
        self.student_id == student_id
    }

    /// All message texts in chronological order, joined by single spaces.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body of a conversation about to be created. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub last_message: String,
    pub status: ConversationStatus,
    pub messages: Vec<Message>,
    pub ai_analysis: AIAnalysis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewConversation {
    /// A freshly submitted complaint: one student message, status `open`.
    pub fn from_complaint(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        student_email: impl Into<String>,
        text: &str,
        ai_analysis: AIAnalysis,
        now: DateTime<Utc>,
    ) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            student_id: student_id.into(),
            student_name: student_name.into(),
            student_email: student_email.into(),
            last_message: text.to_string(),
            status: ConversationStatus::Open,
            messages: vec![Message::new(MessageSender::Student, text, now)],
            ai_analysis,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A message waiting to be appended; the store stamps it with the
/// operation time.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: MessageSender,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComplaintRequest {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateComplaintResponse {
    pub success: bool,
    pub message: String,
    pub ticket_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            ConversationStatus::Open,
            ConversationStatus::InProgress,
            ConversationStatus::Resolved,
        ] {
            assert_eq!(status.as_str().parse::<ConversationStatus>(), Ok(status));
        }
        assert!("closed".parse::<ConversationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ConversationStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_new_complaint_has_single_student_message() {
        let now = Utc::now();
        let conv = NewConversation::from_complaint(
            "student-1",
            "Ana",
            "ana@example.com",
            "The library wifi is down",
            AIAnalysis::fallback(),
            now,
        );

        assert_eq!(conv.status, ConversationStatus::Open);
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].sender, MessageSender::Student);
        assert_eq!(conv.last_message, "The library wifi is down");
        assert_eq!(conv.created_at, conv.updated_at);
        assert_eq!(conv.messages[0].timestamp, conv.created_at);
    }

    #[test]
    fn test_transcript_joins_in_order() {
        let now = Utc::now();
        let conv = Conversation {
            id: "c1".to_string(),
            student_id: "s1".to_string(),
            student_name: String::new(),
            student_email: String::new(),
            last_message: "second".to_string(),
            status: ConversationStatus::Open,
            messages: vec![
                Message::new(MessageSender::Student, "first", now),
                Message::new(MessageSender::Support, "second", now),
            ],
            ai_analysis: AIAnalysis::fallback(),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(conv.transcript(), "first second");
        assert!(conv.is_owned_by("s1"));
        assert!(!conv.is_owned_by("s2"));
    }
}
