use crate::api::{handlers, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Account directory
        .route("/api/human_resource/accounts", get(handlers::list_accounts))
        .route(
            "/api/human_resource/accounts/index",
            post(handlers::index_accounts),
        )
        .route(
            "/api/human_resource/accounts/:id",
            delete(handlers::delete_account),
        )
        // Chat message notifications
        .route(
            "/api/chat/messages/events",
            post(handlers::report_message_event),
        )
        // Realtime subscriptions, reported by the socket gateway
        .route(
            "/api/chat/conversations/:id/connections",
            put(handlers::connect_conversation).delete(handlers::disconnect_conversation),
        )
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
