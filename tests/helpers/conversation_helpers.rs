#![allow(dead_code)]
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use eduresolve::application::services::{AnalysisService, ConversationService};
use eduresolve::bootstrap::{build_app_state, Providers};
use eduresolve::domain::entities::{AIAnalysis, NewConversation, UserProfile, UserRole};
use eduresolve::domain::ports::conversation_repository::ConversationRepository;
use eduresolve::domain::ports::user_repository::UserRepository;
use eduresolve::infrastructure::http::build_router;
use eduresolve::infrastructure::persistence::Database;
use eduresolve::infrastructure::providers::{MockIdentityVerifier, MockTextGenerator};
use std::sync::Arc;

pub const VALID_ANALYSIS: &str = r#"{"summary":"Dorm wifi is down","category":"Facilities","priority_score":8,"reason":"Blocks coursework","sentiment":"negative"}"#;

pub const STUDENT_TOKEN: &str = "student-token";
pub const OTHER_STUDENT_TOKEN: &str = "other-student-token";
pub const SUPPORT_TOKEN: &str = "support-token";
pub const UNREGISTERED_TOKEN: &str = "unregistered-token";

pub const STUDENT_ID: &str = "student-1";
pub const OTHER_STUDENT_ID: &str = "student-2";
pub const SUPPORT_ID: &str = "support-1";

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

pub fn conversation_service(db: &Database, generator: Arc<MockTextGenerator>) -> ConversationService {
    ConversationService::new(Arc::new(db.clone()), AnalysisService::new(generator))
}

/// Store a conversation directly, bypassing intake.
pub async fn insert_conversation(
    db: &Database,
    student_id: &str,
    text: &str,
    analysis: AIAnalysis,
    updated_at: DateTime<Utc>,
) -> String {
    let conversation = NewConversation::from_complaint(
        student_id,
        "Test Student",
        "student@example.edu",
        text,
        analysis,
        updated_at,
    );
    db.create_conversation(&conversation)
        .await
        .expect("Failed to create conversation")
}

pub fn processed_analysis(priority_score: i32) -> AIAnalysis {
    AIAnalysis {
        summary: format!("Priority {}", priority_score),
        category: "Academic".to_string(),
        priority_score,
        reason: "Test fixture".to_string(),
        sentiment: "neutral".to_string(),
        is_processed: true,
    }
}

/// Conversations with the given priorities, each updated one minute after
/// the previous one.
pub async fn insert_with_priorities(db: &Database, scores: &[i32]) -> Vec<String> {
    let mut ids = Vec::new();
    for (i, score) in scores.iter().enumerate() {
        let id = insert_conversation(
            db,
            STUDENT_ID,
            &format!("Complaint {}", i),
            processed_analysis(*score),
            base_time() + Duration::minutes(i as i64),
        )
        .await;
        ids.push(id);
    }
    ids
}

pub async fn create_profile(db: &Database, uid: &str, name: &str, role: UserRole) -> UserProfile {
    let profile = UserProfile {
        uid: uid.to_string(),
        name: name.to_string(),
        email: format!("{}@example.edu", uid),
        role,
        created_at: Utc::now(),
    };
    db.upsert_user_profile(&profile)
        .await
        .expect("Failed to create profile");
    profile
}

pub fn mock_identities() -> MockIdentityVerifier {
    MockIdentityVerifier::new()
        .with_identity(STUDENT_TOKEN, STUDENT_ID, Some("student-1@example.edu"))
        .with_identity(OTHER_STUDENT_TOKEN, OTHER_STUDENT_ID, None)
        .with_identity(SUPPORT_TOKEN, SUPPORT_ID, Some("support-1@example.edu"))
        .with_identity(UNREGISTERED_TOKEN, "nobody", None)
}

/// Full router over `db` with mock collaborators and the standard profiles
/// registered.
pub async fn build_test_app(db: &Database, generator: Arc<MockTextGenerator>) -> Router {
    create_profile(db, STUDENT_ID, "Ana Student", UserRole::Student).await;
    create_profile(db, OTHER_STUDENT_ID, "Ben Student", UserRole::Student).await;
    create_profile(db, SUPPORT_ID, "Sam Support", UserRole::Support).await;

    let state = build_app_state(
        db.clone(),
        Providers {
            generator,
            verifier: Arc::new(mock_identities()),
        },
    );
    build_router(state, std::time::Duration::from_secs(30))
}
