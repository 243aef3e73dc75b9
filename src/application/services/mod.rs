pub mod analysis_service;
pub mod analytics_service;
pub mod auth_service;
pub mod conversation_service;

pub use analysis_service::AnalysisService;
pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use conversation_service::ConversationService;
