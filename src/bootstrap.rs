use crate::application::services::{
    AnalysisService, AnalyticsService, AuthService, ConversationService,
};
use crate::config::Config;
use crate::domain::ports::conversation_repository::ConversationRepository;
use crate::domain::ports::identity_verifier::IdentityVerifier;
use crate::domain::ports::text_generator::TextGenerator;
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::{FirebaseIdentityVerifier, GeminiClient};
use std::sync::Arc;

/// External collaborators: the classifier and the identity service.
pub struct Providers {
    pub generator: Arc<dyn TextGenerator>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

pub fn build_providers(config: &Config) -> Result<Providers, reqwest::Error> {
    let generator = GeminiClient::new(
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
        config.classifier_timeout,
    )?;
    tracing::info!(model = %config.gemini_model, "Classifier client initialized");

    let verifier = FirebaseIdentityVerifier::new(
        config.identity_api_base.clone(),
        config.firebase_api_key.clone(),
        config.classifier_timeout,
    )?;
    tracing::info!("Identity verifier initialized");

    Ok(Providers {
        generator: Arc::new(generator),
        verifier: Arc::new(verifier),
    })
}

pub fn build_app_state(db: Database, providers: Providers) -> AppState {
    let conversation_repo: Arc<dyn ConversationRepository> = Arc::new(db.clone());
    let user_repo: Arc<dyn UserRepository> = Arc::new(db);

    let analysis_service = AnalysisService::new(providers.generator);
    let conversation_service =
        ConversationService::new(conversation_repo.clone(), analysis_service);
    let analytics_service = AnalyticsService::new(conversation_repo);
    let auth_service = AuthService::new(providers.verifier, user_repo);

    AppState {
        auth_service,
        conversation_service,
        analytics_service,
    }
}
