use crate::infrastructure::http::controllers as api;
use crate::infrastructure::http::middleware::{require_auth, AppState};
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub const API_PREFIX: &str = "/api/v1";
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    // Bearer token required; role checks happen per handler
    let protected = Router::new()
        .route(
            "/conversations",
            get(api::conversations::list_conversations),
        )
        .route(
            "/conversations/:id",
            get(api::conversations::get_conversation),
        )
        .route(
            "/conversations/:id/suggestions",
            get(api::conversations::get_suggestions),
        )
        .route(
            "/conversations/:id/reply",
            post(api::conversations::reply_to_conversation),
        )
        .route(
            "/student/conversations",
            get(api::student::list_my_conversations),
        )
        .route(
            "/student/conversations/:id",
            get(api::student::get_my_conversation),
        )
        .route(
            "/student/conversations/:id/reply",
            post(api::student::reply_to_my_conversation),
        )
        .route("/student/complaints", post(api::student::submit_complaint))
        .route("/analytics/overview", get(api::analytics::get_overview))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_routes = Router::new()
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(api::health::health))
        .nest(API_PREFIX, api_routes)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
