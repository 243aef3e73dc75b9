use eduresolve::application::services::AnalysisService;
use eduresolve::domain::entities::{AIAnalysis, ConversationStatus, MessageSender, RawClassifierOutput};
use eduresolve::domain::errors::AnalysisError;
use eduresolve::domain::ports::conversation_repository::{ConversationQuery, ConversationRepository};
use eduresolve::infrastructure::http::middleware::ApiError;
use eduresolve::infrastructure::providers::MockTextGenerator;
use std::sync::Arc;

mod helpers;
use helpers::*;

#[tokio::test]
async fn test_submit_complaint_stores_one_student_message_with_analysis() {
    let db = setup_test_db().await;
    let generator = Arc::new(MockTextGenerator::returning(VALID_ANALYSIS));
    let service = conversation_service(&db, generator.clone());

    let ticket_id = service
        .submit_complaint(STUDENT_ID, "Ana", "ana@example.edu", "The dorm wifi has been down for two days")
        .await
        .expect("Submission should succeed");

    let stored = db
        .get_conversation_by_id(&ticket_id)
        .await
        .unwrap()
        .expect("Conversation should exist");

    assert_eq!(stored.id, ticket_id);
    assert_eq!(stored.student_id, STUDENT_ID);
    assert_eq!(stored.status, ConversationStatus::Open);
    assert_eq!(stored.messages.len(), 1);
    assert_eq!(stored.messages[0].sender, MessageSender::Student);
    assert_eq!(stored.messages[0].text, "The dorm wifi has been down for two days");
    assert_eq!(stored.last_message, stored.messages[0].text);
    assert_eq!(stored.created_at, stored.updated_at);

    assert!(stored.ai_analysis.is_processed);
    assert_eq!(stored.ai_analysis.category, "Facilities");
    assert_eq!(stored.ai_analysis.priority_score, 8);
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_submit_complaint_uses_fallback_when_classifier_fails() {
    let db = setup_test_db().await;
    let service = conversation_service(&db, Arc::new(MockTextGenerator::failing()));

    let ticket_id = service
        .submit_complaint(STUDENT_ID, "Ana", "", "Exam results are missing")
        .await
        .expect("Classifier failure must not fail submission");

    let stored = db.get_conversation_by_id(&ticket_id).await.unwrap().unwrap();
    assert_eq!(stored.ai_analysis, AIAnalysis::fallback());
    assert!(!stored.ai_analysis.is_processed);
    assert_eq!(stored.ai_analysis.priority_score, 5);
    assert_eq!(stored.ai_analysis.category, "Uncategorized");
}

#[tokio::test]
async fn test_submit_complaint_uses_fallback_on_malformed_output() {
    let db = setup_test_db().await;
    let generator = MockTextGenerator::with_default(Ok(RawClassifierOutput::single(
        "Sure! Here is the analysis you asked for.",
    )));
    let service = conversation_service(&db, Arc::new(generator));

    let ticket_id = service
        .submit_complaint(STUDENT_ID, "Ana", "", "Canteen food is cold")
        .await
        .unwrap();

    let stored = db.get_conversation_by_id(&ticket_id).await.unwrap().unwrap();
    assert_eq!(stored.ai_analysis, AIAnalysis::fallback());
}

#[tokio::test]
async fn test_empty_complaint_is_rejected_without_mutation() {
    let db = setup_test_db().await;
    let generator = Arc::new(MockTextGenerator::returning(VALID_ANALYSIS));
    let service = conversation_service(&db, generator.clone());

    for text in ["", "   \n\t"] {
        let result = service.submit_complaint(STUDENT_ID, "Ana", "", text).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    let all = db
        .query_conversations(&ConversationQuery::default())
        .await
        .unwrap();
    assert!(all.is_empty());
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_classifier_prompt_embeds_complaint_text() {
    let db = setup_test_db().await;
    let generator = Arc::new(MockTextGenerator::returning(VALID_ANALYSIS));
    let service = conversation_service(&db, generator.clone());

    service
        .submit_complaint(STUDENT_ID, "Ana", "", "Library \"quiet zone\" is noisy")
        .await
        .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(r#""Library \"quiet zone\" is noisy""#));
}

#[tokio::test]
async fn test_zero_candidates_is_upstream_failure() {
    let generator = Arc::new(MockTextGenerator::with_default(Ok(RawClassifierOutput::default())));
    let service = AnalysisService::new(generator);

    assert!(matches!(
        service.analyze("Parking permits are delayed").await,
        Err(AnalysisError::UpstreamUnavailable(_))
    ));
}
