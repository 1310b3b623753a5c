// ABOUTME: HTTP route layer: thin axum adapters over the connection broker facade
// ABOUTME: Maps broker errors to typed JSON responses and handles the OAuth redirect leg
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tether Contributors

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::broker::{CallbackParams, ConnectionBroker};
use crate::errors::{AppError, AppResult};
use crate::models::ServiceType;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Broker facade
    pub broker: Arc<ConnectionBroker>,
}

/// Build the connection management router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/agents/:agent_id/connections",
            get(handle_all_statuses),
        )
        .route(
            "/agents/:agent_id/connections/:service",
            post(handle_initiate)
                .get(handle_status)
                .delete(handle_disconnect),
        )
        .route(
            "/agents/:agent_id/connections/:service/test",
            post(handle_test),
        )
        .route("/oauth/callback", get(handle_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "code": self.code.as_str(),
        });
        (self.code.http_status(), Json(body)).into_response()
    }
}

fn parse_service(raw: &str) -> AppResult<ServiceType> {
    raw.parse::<ServiceType>()
}

#[derive(Debug, Default, Deserialize)]
struct InitiateRequest {
    return_url: Option<String>,
}

async fn handle_initiate(
    State(state): State<AppState>,
    Path((agent_id, service)): Path<(Uuid, String)>,
    body: Option<Json<InitiateRequest>>,
) -> Result<Response, AppError> {
    let service = parse_service(&service)?;
    let return_url = body.and_then(|Json(req)| req.return_url);
    let response = state
        .broker
        .initiate_connection(agent_id, service, return_url)
        .await?;
    Ok(Json(response).into_response())
}

/// Query parameters delivered by the provider redirect plus the values we
/// embedded in the callback URL at initiate time
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    oauth_token: Option<String>,
    oauth_verifier: Option<String>,
    state: Option<String>,
    agent_id: Option<Uuid>,
    denied: Option<String>,
}

async fn handle_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    if let Some(token) = query.denied {
        return Err(AppError::provider_auth(format!(
            "User denied authorization for request token '{token}'"
        )));
    }

    let params = CallbackParams {
        request_token: query.oauth_token.unwrap_or_default(),
        verifier: query.oauth_verifier.unwrap_or_default(),
        state: query.state.unwrap_or_default(),
        agent_id: query.agent_id.ok_or_else(|| {
            AppError::malformed_callback("Callback is missing the agent_id parameter")
        })?,
    };

    let outcome = state.broker.handle_callback(params).await?;

    // Mid-redirect users need an explicit success signal; send them back to
    // the return URL when one was registered, otherwise answer with JSON.
    match &outcome.return_url {
        Some(url) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            let target = format!("{url}{separator}connected={}&status=success", outcome.service);
            Ok(Redirect::to(&target).into_response())
        }
        None => Ok(Json(outcome).into_response()),
    }
}

async fn handle_status(
    State(state): State<AppState>,
    Path((agent_id, service)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let service = parse_service(&service)?;
    let status = state.broker.get_connection_status(agent_id, service).await;
    Ok(Json(status).into_response())
}

async fn handle_all_statuses(
    State(state): State<AppState>,
    Path(agent_id): Path<Uuid>,
) -> Response {
    let statuses = state.broker.get_all_connection_statuses(agent_id).await;
    Json(statuses).into_response()
}

async fn handle_disconnect(
    State(state): State<AppState>,
    Path((agent_id, service)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let service = parse_service(&service)?;
    state.broker.disconnect(agent_id, service).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn handle_test(
    State(state): State<AppState>,
    Path((agent_id, service)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let service = parse_service(&service)?;
    let outcome = state.broker.test_connection(agent_id, service).await;
    Ok(Json(outcome).into_response())
}
