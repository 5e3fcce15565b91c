use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::listing::ListingParams;
use crate::metrics::gather_metrics;
use crate::models::{Account, ActorContext, MessageEvent};
use crate::notifications::DispatchDecision;
use crate::search::ResultPage;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Prometheus scrape endpoint
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// List accounts of the caller's tenant
pub async fn list_accounts(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(params): Query<ListingParams>,
) -> Result<Json<ResultPage>> {
    params.validate()?;

    let request = params.into_request(actor, &state.listing_config)?;
    let page = state.listing.list(&request).await?;

    Ok(Json(page))
}

/// Upsert accounts into the search index
pub async fn index_accounts(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(accounts): Json<Vec<Account>>,
) -> Result<Json<IndexAccountsResponse>> {
    if let Some(foreign) = accounts.iter().find(|a| a.company_id != actor.company_id) {
        return Err(AppError::Validation(format!(
            "Account {} belongs to another company",
            foreign.id
        )));
    }

    let indexed = state.search.index_accounts(&accounts).await?;

    tracing::info!(
        company_id = actor.company_id,
        indexed,
        "Accounts indexed"
    );

    Ok(Json(IndexAccountsResponse { indexed }))
}

#[derive(Debug, Serialize)]
pub struct IndexAccountsResponse {
    pub indexed: usize,
}

/// Remove an account of the caller's tenant from the index
pub async fn delete_account(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    if !state.search.contains_account(actor.company_id, id).await? {
        return Err(AppError::NotFound(format!("Account {} not found", id)));
    }

    state.search.delete_account(id).await?;
    tracing::info!(company_id = actor.company_id, account_id = id, "Account removed from index");

    Ok(StatusCode::NO_CONTENT)
}

/// Report a created chat message; notifications run in the background
pub async fn report_message_event(
    State(state): State<AppState>,
    Json(event): Json<MessageEvent>,
) -> (StatusCode, Json<MessageEventResponse>) {
    let decision = state.listing.notify(&event).unwrap_or_else(|| {
        tracing::warn!(
            message_id = event.message.id,
            "No notification dispatcher configured"
        );
        DispatchDecision::Skipped
    });

    (
        StatusCode::ACCEPTED,
        Json(MessageEventResponse {
            message_id: event.message.id,
            decision,
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct MessageEventResponse {
    pub message_id: u64,
    pub decision: DispatchDecision,
}

/// A client subscribed to a conversation's realtime channel
pub async fn connect_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<u64>,
) -> Json<PresenceResponse> {
    state.presence.connect(conversation_id);
    Json(PresenceResponse::read(&state, conversation_id))
}

/// A client left a conversation's realtime channel
pub async fn disconnect_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<u64>,
) -> Json<PresenceResponse> {
    state.presence.disconnect(conversation_id);
    Json(PresenceResponse::read(&state, conversation_id))
}

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub conversation_id: u64,
    pub connections: usize,
}

impl PresenceResponse {
    fn read(state: &AppState, conversation_id: u64) -> Self {
        Self {
            conversation_id,
            connections: state.presence.connection_count(conversation_id),
        }
    }
}
