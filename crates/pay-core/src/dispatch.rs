//! # Dispatcher
//!
//! Resolves a tool name, normalizes its arguments, forwards the resulting
//! `RemoteCall` to the capability client and hands back the client's
//! response untouched.
//!
//! Each dispatch is independent: the dispatcher holds only the read-only
//! registry and the shared client, never retries, and never panics on a
//! client failure.

use crate::capability::{RemoteCall, SharedCapabilityClient};
use crate::error::{ToolError, ToolResult};
use crate::registry::ToolRegistry;
use crate::schema::ToolDefinition;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Outcome of one dispatch: the provider response, or a typed error
pub type InvocationResult = ToolResult<Value>;

/// Shared dispatch table for every transport adapter
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    client: SharedCapabilityClient,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, client: SharedCapabilityClient) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Catalog snapshot, in registration order
    pub fn catalog(&self) -> Vec<&ToolDefinition> {
        self.registry.list()
    }

    /// Resolve and normalize without calling the client.
    pub fn normalize(&self, tool_name: &str, arguments: &Value) -> ToolResult<RemoteCall> {
        self.registry.resolve(tool_name)?.normalize(arguments)
    }

    /// Invoke `tool_name` with raw `arguments`.
    #[instrument(
        skip(self, arguments),
        fields(invocation_id = %Uuid::new_v4(), provider = self.client.provider_name())
    )]
    pub async fn dispatch(&self, tool_name: &str, arguments: &Value) -> InvocationResult {
        let tool = self.registry.resolve(tool_name).map_err(|e| {
            warn!("Rejected call to unknown tool: {}", tool_name);
            e
        })?;

        let call = tool.normalize(arguments).map_err(|e| {
            warn!("Invalid arguments for {}: {}", tool.name(), e);
            e
        })?;

        debug!("Dispatching {} as {}", tool.name(), call.label());

        match call.execute(self.client.as_ref()).await {
            Ok(response) => {
                info!("Tool {} completed ({})", tool.name(), call.label());
                Ok(response)
            }
            Err(cause) => {
                error!("Tool {} failed upstream: {}", tool.name(), cause);
                Err(ToolError::Upstream(cause))
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.len())
            .field("provider", &self.client.provider_name())
            .finish()
    }
}
