//! # HTTP Surface (axum)
//!
//! Movement endpoints acknowledge *acceptance*: a 202 relayed from a
//! controller means the command was admitted, not that the physical action
//! finished. Callers observe completion through the controller's `/status`
//! and the event stream.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use shared_types::{BarrierAction, BarrierEvent, BarrierId, PrincipalId, VerifyRemoteRequest};
use tracing::warn;

use crate::service::AuthorityService;

/// Header carrying the caller's principal identity.
///
/// Caller authentication itself belongs to the excluded account layer; the
/// surface behind it (the permission check) is fully enforced here.
pub const PRINCIPAL_HEADER: &str = "x-principal";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<AuthorityService>,
    max_event_limit: usize,
}

/// Build the authority router.
pub fn router(service: Arc<AuthorityService>, max_event_limit: usize) -> Router {
    let state = AppState {
        service,
        max_event_limit,
    };
    Router::new()
        .route("/barrier/event", post(receive_event))
        .route("/api/verify/remote", post(verify_remote))
        .route("/api/barriers/:barrier_id/open", post(open_barrier))
        .route("/api/barriers/:barrier_id/close", post(close_barrier))
        .route(
            "/api/barriers/:barrier_id/service/start",
            post(service_start),
        )
        .route("/api/barriers/:barrier_id/service/end", post(service_end))
        .route("/api/events", get(list_events))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn verify_remote(
    State(state): State<AppState>,
    Json(request): Json<VerifyRemoteRequest>,
) -> Response {
    let response = state
        .service
        .verify_remote(&request.barrier_id, &request.frame_hex)
        .await;
    (StatusCode::OK, Json(response)).into_response()
}

async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<BarrierEvent>,
) -> Response {
    match state.service.record_event(event).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "received_ok"})),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "failed to save event");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"status": "error", "message": "Failed to save event data."})),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    #[serde(default = "default_event_limit")]
    limit: usize,
}

fn default_event_limit() -> usize {
    100
}

async fn list_events(State(state): State<AppState>, Query(query): Query<EventsQuery>) -> Response {
    let limit = query.limit.clamp(1, state.max_event_limit);
    match state.service.recent_events(limit).await {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to read events");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"status": "error", "message": "Error reading events."})),
            )
                .into_response()
        }
    }
}

async fn open_barrier(
    state: State<AppState>,
    barrier_id: Path<String>,
    headers: HeaderMap,
) -> Response {
    relay_action(state, barrier_id, headers, BarrierAction::Open).await
}

async fn close_barrier(
    state: State<AppState>,
    barrier_id: Path<String>,
    headers: HeaderMap,
) -> Response {
    relay_action(state, barrier_id, headers, BarrierAction::Close).await
}

async fn service_start(
    state: State<AppState>,
    barrier_id: Path<String>,
    headers: HeaderMap,
) -> Response {
    relay_action(state, barrier_id, headers, BarrierAction::ServiceStart).await
}

async fn service_end(
    state: State<AppState>,
    barrier_id: Path<String>,
    headers: HeaderMap,
) -> Response {
    relay_action(state, barrier_id, headers, BarrierAction::ServiceEnd).await
}

async fn relay_action(
    State(state): State<AppState>,
    Path(barrier_id): Path<String>,
    headers: HeaderMap,
    action: BarrierAction,
) -> Response {
    let Some(principal) = principal_from(&headers) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "message": format!("Missing {PRINCIPAL_HEADER} header."),
            })),
        )
            .into_response();
    };

    let barrier = BarrierId::new(barrier_id);
    match state.service.relay(&principal, &barrier, action).await {
        Ok(outcome) => {
            let status =
                StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(outcome.body)).into_response()
        }
        Err(e) => {
            let status = StatusCode::from_u16(e.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(serde_json::json!({
                    "status": "error",
                    "reason": e.reason(),
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

fn principal_from(headers: &HeaderMap) -> Option<PrincipalId> {
    headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(PrincipalId::new)
}
