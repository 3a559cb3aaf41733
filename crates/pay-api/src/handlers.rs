//! # Request Handlers
//!
//! Axum request handlers for the synchronous transport.
//! Each tool request is dispatched exactly once and the provider response is
//! returned as the body, unchanged.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pay_core::{ToolError, UpstreamError};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, kind: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            kind: kind.into(),
            code,
            field: None,
            details: None,
        }
    }

    /// 400 for envelopes that never reach the dispatcher
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(error, "bad_request", 400)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&ToolError> for ErrorResponse {
    fn from(err: &ToolError) -> Self {
        let mut response = Self::new(err.to_string(), err.kind(), err.status_code());
        response.field = err.field().map(String::from);
        if let ToolError::Upstream(UpstreamError::Provider { code: Some(code), .. }) = err {
            response.details = Some(code.clone());
        }
        response
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(response: ErrorResponse) -> ApiError {
    let status = StatusCode::from_u16(response.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

fn tool_error_to_response(err: ToolError) -> ApiError {
    error_response(ErrorResponse::from(&err))
}

fn rejection_to_response(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection.body_text());
    error_response(ErrorResponse::bad_request("Invalid JSON body").with_details(rejection.body_text()))
}

/// Tool name from the first of `tool_name`, `toolName` or `name`
fn tool_name(body: &Map<String, Value>) -> Option<&str> {
    ["tool_name", "toolName", "name"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|name| !name.trim().is_empty())
}

/// Arguments from `arguments` or `parameters`; absent or null means `{}`
fn tool_arguments(body: &Map<String, Value>) -> Value {
    ["arguments", "parameters"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

fn envelope(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    let Json(value) = payload.map_err(rejection_to_response)?;
    match value {
        Value::Object(body) if !body.is_empty() => Ok(body),
        _ => Err(error_response(ErrorResponse::bad_request("No data provided"))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Full catalog, in registration order
pub async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    let tools = state.dispatcher.catalog();
    Json(json!({
        "count": tools.len(),
        "tools": tools,
    }))
}

pub async fn metadata(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metadata())
}

/// `POST /mcp/request` with `{tool_name, arguments}`
#[instrument(skip(state, payload))]
pub async fn mcp_request(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = envelope(payload)?;
    let name = tool_name(&body)
        .ok_or_else(|| error_response(ErrorResponse::bad_request("No tool name provided")))?;

    let result = state
        .dispatcher
        .dispatch(name, &tool_arguments(&body))
        .await
        .map_err(tool_error_to_response)?;

    Ok(Json(result))
}

/// `POST /mcp` with a `{type, name, parameters}` envelope
#[instrument(skip(state, payload))]
pub async fn mcp_envelope(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = envelope(payload)?;

    match body.get("type").and_then(Value::as_str) {
        Some("metadata") => Ok(Json(json!({
            "type": "metadata",
            "data": state.metadata(),
        }))),
        Some("tool") => {
            let name = body
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| error_response(ErrorResponse::bad_request("No tool name provided")))?;

            let result = state
                .dispatcher
                .dispatch(name, &tool_arguments(&body))
                .await
                .map_err(tool_error_to_response)?;

            Ok(Json(json!({
                "type": "tool_result",
                "data": result,
            })))
        }
        Some(other) => Err(error_response(ErrorResponse::bad_request(format!(
            "Unsupported request type: {}",
            other
        )))),
        None => Err(error_response(ErrorResponse::bad_request(
            "No request type provided",
        ))),
    }
}
