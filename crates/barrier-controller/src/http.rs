//! # Controller Command Surface (axum)
//!
//! The endpoints the authority relays into, plus `/status`. Movement
//! responses are acknowledgements: 202 means the command was admitted and a
//! task is driving the mechanism; completion shows up in `/status` and the
//! event stream.
//!
//! No permission checks happen here — the authority already authorized the
//! caller and forwards their identity in the `x-user-id` header, which is
//! used for event attribution only.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use barrier_actuator::BarrierActuator;
use shared_types::{CommandResponse, PrincipalId, StatusResponse, TriggerMethod};
use tracing::{info, warn};

/// Header carrying the caller identity the authority attached.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Build the controller router.
pub fn router(actuator: Arc<BarrierActuator>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/open", post(open))
        .route("/close", post(close))
        .route("/service/start", post(service_start))
        .route("/service/end", post(service_end))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(actuator)
}

async fn status(State(actuator): State<Arc<BarrierActuator>>) -> Response {
    let snapshot = actuator.snapshot();
    (
        StatusCode::OK,
        Json(StatusResponse {
            barrier_status: snapshot.position().as_str().to_string(),
            service_mode: snapshot.service_mode,
        }),
    )
        .into_response()
}

async fn open(State(actuator): State<Arc<BarrierActuator>>, headers: HeaderMap) -> Response {
    let Some(user) = caller(&headers) else {
        return missing_user_header();
    };
    info!(user = %user, "open requested");

    let snapshot = actuator.snapshot();
    if snapshot.service_mode {
        return reply(
            StatusCode::CONFLICT,
            CommandResponse::error("Service mode active."),
        );
    }
    if snapshot.in_motion {
        return reply(StatusCode::OK, CommandResponse::ok("Barrier in motion."));
    }
    if snapshot.is_open {
        return reply(
            StatusCode::OK,
            CommandResponse::ok("Barrier already open."),
        );
    }

    tokio::spawn(async move {
        if let Err(e) = actuator.open(TriggerMethod::Api, Some(user)).await {
            warn!(error = %e, "api-triggered open failed");
        }
    });
    reply(
        StatusCode::ACCEPTED,
        CommandResponse::ok("Opening initiated."),
    )
}

async fn close(State(actuator): State<Arc<BarrierActuator>>, headers: HeaderMap) -> Response {
    let Some(user) = caller(&headers) else {
        return missing_user_header();
    };
    info!(user = %user, "close requested");

    let snapshot = actuator.snapshot();
    if snapshot.service_mode {
        return reply(
            StatusCode::CONFLICT,
            CommandResponse::error("Service mode active."),
        );
    }
    if snapshot.in_motion {
        return reply(StatusCode::OK, CommandResponse::ok("Barrier in motion."));
    }
    if !snapshot.is_open {
        return reply(
            StatusCode::OK,
            CommandResponse::ok("Barrier already closed."),
        );
    }

    tokio::spawn(async move {
        if let Err(e) = actuator.close(TriggerMethod::Api, Some(user)).await {
            warn!(error = %e, "api-triggered close failed");
        }
    });
    reply(
        StatusCode::ACCEPTED,
        CommandResponse::ok("Closing initiated."),
    )
}

async fn service_start(
    State(actuator): State<Arc<BarrierActuator>>,
    headers: HeaderMap,
) -> Response {
    let Some(user) = caller(&headers) else {
        return missing_user_header();
    };
    info!(user = %user, "service start requested");

    let snapshot = actuator.snapshot();
    if snapshot.service_mode {
        return reply(
            StatusCode::OK,
            CommandResponse::ok("Service mode already active."),
        );
    }

    let will_open = !snapshot.is_open && !snapshot.in_motion;
    tokio::spawn(async move {
        if let Err(e) = actuator.enter_service(TriggerMethod::Api, Some(user)).await {
            warn!(error = %e, "service start failed");
        }
    });

    if will_open {
        reply(
            StatusCode::ACCEPTED,
            CommandResponse::ok("Service mode enabled. Opening initiated."),
        )
    } else {
        reply(
            StatusCode::OK,
            CommandResponse::ok("Service mode enabled."),
        )
    }
}

async fn service_end(
    State(actuator): State<Arc<BarrierActuator>>,
    headers: HeaderMap,
) -> Response {
    let Some(user) = caller(&headers) else {
        return missing_user_header();
    };
    info!(user = %user, "service end requested");

    let snapshot = actuator.snapshot();
    if !snapshot.service_mode {
        return reply(
            StatusCode::OK,
            CommandResponse::ok("Service mode was not active."),
        );
    }
    if snapshot.in_motion {
        return reply(
            StatusCode::CONFLICT,
            CommandResponse::error("Cannot end service mode while barrier is in motion."),
        );
    }

    if snapshot.is_open {
        tokio::spawn(async move {
            if let Err(e) = actuator.exit_service(TriggerMethod::Api, Some(user)).await {
                warn!(error = %e, "service end failed, staying in service mode");
            }
        });
        return reply(
            StatusCode::ACCEPTED,
            CommandResponse::ok("Attempting to end service mode by closing the barrier."),
        );
    }

    // Barrier already closed: ending service mode is immediate.
    match actuator.exit_service(TriggerMethod::Api, Some(user)).await {
        Ok(()) => reply(
            StatusCode::OK,
            CommandResponse::ok("Service mode disabled (barrier was already closed)."),
        ),
        Err(e) => reply(
            StatusCode::CONFLICT,
            CommandResponse::error(format!("Cannot end service mode: {e}.")),
        ),
    }
}

fn caller(headers: &HeaderMap) -> Option<PrincipalId> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(PrincipalId::new)
}

fn missing_user_header() -> Response {
    warn!("request rejected, missing {USER_ID_HEADER} header");
    reply(
        StatusCode::BAD_REQUEST,
        CommandResponse::error(format!("Missing {USER_ID_HEADER} header.")),
    )
}

fn reply(status: StatusCode, body: CommandResponse) -> Response {
    (status, Json(body)).into_response()
}
