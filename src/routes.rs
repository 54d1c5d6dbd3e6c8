use axum::{
    error_handling::HandleErrorLayer,
    extract::{rejection::JsonRejection, Request, State},
    routing::{get, post},
    BoxError, Json, Router,
};
use serde_json::{json, Value};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::{ChatRequest, LearnerReply};
use crate::error::RelayError;
use crate::state::AppState;
use crate::translate::{TranslateRequest, TranslateResponse};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // REST API routes
        .route("/api/translate", post(translate))
        .route("/api/chat", post(chat))
}

/// Full application: routes plus the CORS, tracing and timeout layers.
pub fn create_app(state: AppState) -> anyhow::Result<Router> {
    let system_config = &state.config.system_config;
    let cors = system_config.cors_layer()?;
    let timeout = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .timeout(system_config.request_timeout());

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Ok(create_routes()
        .layer(timeout)
        .layer(cors)
        .layer(trace)
        .with_state(state))
}

/// Requests cut off by the deadline still answer with the `{"error"}` body.
async fn handle_middleware_error(err: BoxError) -> RelayError {
    let reason = if err.is::<Elapsed>() {
        "request deadline exceeded".to_string()
    } else {
        err.to_string()
    };
    RelayError::ServiceUnavailable {
        service: "Upstream service",
        reason,
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy"
    }))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, RelayError> {
    let Json(request) = payload.map_err(|e| RelayError::InvalidArgument(e.body_text()))?;
    request.validate()?;

    let response = state.translator.translate(request).await?;
    Ok(Json(response))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<LearnerReply>, RelayError> {
    let Json(request) = payload.map_err(|e| RelayError::InvalidArgument(e.body_text()))?;
    request.validate()?;

    let reply = state.tutor.respond(request).await?;
    Ok(Json(reply))
}
