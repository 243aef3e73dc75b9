use crate::infrastructure::providers::{
    firebase_identity::DEFAULT_IDENTITY_API_BASE,
    gemini::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL},
};
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub firebase_api_key: String,
    pub identity_api_base: String,
    pub classifier_timeout: Duration,
    pub request_timeout: Duration,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

/// Parse a port variable, using `default` when it is unset.
fn parse_port(value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort),
        None => Ok(default),
    }
}

fn secs_or(name: &str, default: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://eduresolve.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = parse_port(env::var("SERVER_PORT").ok(), 8080)?;

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingGeminiApiKey)?;

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        let gemini_api_base =
            env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());

        let firebase_api_key = env::var("FIREBASE_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingFirebaseApiKey)?;

        let identity_api_base = env::var("IDENTITY_API_BASE")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_API_BASE.to_string());

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "eduresolve".to_string());

        let metrics_port = parse_port(env::var("METRICS_PORT").ok(), 9000)?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            gemini_api_key,
            gemini_model,
            gemini_api_base,
            firebase_api_key,
            identity_api_base,
            classifier_timeout: secs_or("CLASSIFIER_TIMEOUT_SECS", 30),
            request_timeout: secs_or("REQUEST_TIMEOUT_SECS", 60),
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingGeminiApiKey,

    #[error("FIREBASE_API_KEY environment variable not set")]
    MissingFirebaseApiKey,

    #[error("Invalid port number")]
    InvalidPort,
}
