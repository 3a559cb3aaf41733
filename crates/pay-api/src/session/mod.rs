//! # Session Transport
//!
//! Long-lived JSON-RPC 2.0 session over a line-delimited byte stream
//! (stdin/stdout in production). One JSON object per line in each
//! direction; stdout carries protocol messages only.
//!
//! The catalog is advertised in the `initialize` result and again on
//! `tools/list`. Every `tools/call` is dispatched independently; dispatch
//! failures come back as `isError` results rather than protocol errors.

pub mod prompts;
pub mod resources;

use pay_core::{Dispatcher, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// Transport failure that ends the session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Incoming request or notification
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Session-protocol adapter over the shared dispatcher
#[derive(Debug, Clone)]
pub struct Session {
    dispatcher: Arc<Dispatcher>,
}

impl Session {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serve until the reader reaches EOF.
    ///
    /// A line that is not valid UTF-8 gets a parse error and the session
    /// keeps going; only I/O and encoding failures end it.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "Session transport ready ({} tools)",
            self.dispatcher.registry().len()
        );

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let raw = trim_line_ending(&buf);

            let response = match std::str::from_utf8(raw) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!("Session message is not UTF-8: {}", e);
                    Some(RpcResponse::failure(
                        Value::Null,
                        RpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                    ))
                }
            };
            if let Some(response) = response {
                write_message(&mut writer, &response).await?;
            }
        }

        info!("Session closed by peer");
        Ok(())
    }

    /// Handle one framed message; `None` for notifications
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparsable session message: {}", e);
                return Some(RpcResponse::failure(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        let request: RpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(RpcResponse::failure(
                    id,
                    RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                ));
            }
        };

        let Some(id) = request.id.clone() else {
            debug!("Notification: {}", request.method);
            return None;
        };

        Some(match self.handle_request(&request).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    #[instrument(skip(self, request), fields(method = %request.method))]
    async fn handle_request(&self, request: &RpcRequest) -> Result<Value, RpcError> {
        let params = request.params.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tool_listing() })),
            "tools/call" => self.call_tool(&params).await,
            "resources/list" => {
                let listing: Vec<Value> =
                    resources::samples().iter().map(|r| r.listing()).collect();
                Ok(json!({ "resources": listing }))
            }
            "resources/read" => {
                let uri = str_param(&params, "uri")?;
                let resource = resources::find(uri)
                    .ok_or_else(|| RpcError::invalid_params(format!("Unknown resource: {}", uri)))?;
                Ok(json!({ "contents": [resource.contents()] }))
            }
            "prompts/list" => {
                let listing: Vec<Value> = prompts::PROMPTS.iter().map(|p| p.listing()).collect();
                Ok(json!({ "prompts": listing }))
            }
            "prompts/get" => {
                let name = str_param(&params, "name")?;
                let prompt = prompts::find(name)
                    .ok_or_else(|| RpcError::invalid_params(format!("Unknown prompt: {}", name)))?;
                let arguments = object_param(&params, "arguments")?;
                Ok(json!({
                    "description": prompt.description,
                    "messages": [{
                        "role": "user",
                        "content": { "type": "text", "text": prompt.render(&arguments) }
                    }]
                }))
            }
            other => {
                warn!("Unknown session method: {}", other);
                Err(RpcError::new(
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", other),
                ))
            }
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": crate::state::SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "prompts": { "listChanged": false },
            },
            "instructions": crate::state::SERVER_DESCRIPTION,
            "tools": self.tool_listing(),
        })
    }

    fn tool_listing(&self) -> Vec<Value> {
        self.dispatcher
            .catalog()
            .into_iter()
            .map(|definition| {
                json!({
                    "name": definition.name,
                    "description": definition.description,
                    "inputSchema": definition.input_schema(),
                })
            })
            .collect()
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, RpcError> {
        let name = str_param(params, "name")?;
        let arguments = params
            .get("arguments")
            .filter(|value| !value.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        match self.dispatcher.dispatch(name, &arguments).await {
            Ok(result) => Ok(tool_content(&result, false)),
            Err(err) => Ok(tool_content(&error_body(&err), true)),
        }
    }
}

fn tool_content(body: &Value, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": body.to_string() }],
        "isError": is_error,
    })
}

fn error_body(err: &ToolError) -> Value {
    let mut body = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    if let Some(field) = err.field() {
        body["field"] = Value::from(field);
    }
    if let ToolError::Upstream(upstream) = err {
        if let Some(code) = upstream.code() {
            body["code"] = Value::from(code);
        }
    }
    body
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RpcError::invalid_params(format!("Missing string parameter '{}'", key)))
}

fn object_param(params: &Value, key: &str) -> Result<Map<String, Value>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(RpcError::invalid_params(format!(
            "Parameter '{}' must be an object",
            key
        ))),
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

async fn write_message<W>(writer: &mut W, response: &RpcResponse) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = serde_json::to_vec(response)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}
