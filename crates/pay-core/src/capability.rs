//! # Capability Client
//!
//! Boundary trait for the payment provider's authenticated API, plus the
//! `RemoteCall` value the normalizer produces for it.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 CapabilityClient (trait)                 │
//! │  ├── fetch(resource, id)                                 │
//! │  ├── list(resource, filters)                             │
//! │  ├── create(resource, payload)                           │
//! │  └── act(resource, id, action, payload)                  │
//! └──────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!       ┌───────┴───────┐         ┌───────┴───────┐
//!       │RazorpayClient │         │  test doubles │
//!       └───────────────┘         └───────────────┘
//! ```

use crate::error::UpstreamResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// JSON object handed to the client as a request payload or filter set
pub type Payload = Map<String, Value>;

/// Entity kinds owned by the remote payment service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Payment,
    Order,
    Customer,
    PaymentLink,
    Refund,
    Settlement,
    /// Combined settlement reconciliation report
    SettlementReport,
    Subscription,
    Plan,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Payment => "payment",
            Resource::Order => "order",
            Resource::Customer => "customer",
            Resource::PaymentLink => "payment_link",
            Resource::Refund => "refund",
            Resource::Settlement => "settlement",
            Resource::SettlementReport => "settlement_report",
            Resource::Subscription => "subscription",
            Resource::Plan => "plan",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State transitions on an existing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Cancel,
    Pause,
    Resume,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Cancel => "cancel",
            LifecycleAction::Pause => "pause",
            LifecycleAction::Resume => "resume",
        }
    }
}

/// Normalized parameters for exactly one remote operation.
///
/// Built fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Fetch {
        resource: Resource,
        id: String,
    },
    List {
        resource: Resource,
        filters: Payload,
    },
    Create {
        resource: Resource,
        payload: Payload,
    },
    Act {
        resource: Resource,
        id: String,
        action: LifecycleAction,
        payload: Payload,
    },
}

impl RemoteCall {
    pub fn resource(&self) -> Resource {
        match self {
            RemoteCall::Fetch { resource, .. }
            | RemoteCall::List { resource, .. }
            | RemoteCall::Create { resource, .. }
            | RemoteCall::Act { resource, .. } => *resource,
        }
    }

    /// Request payload or filters; empty for fetches
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            RemoteCall::Fetch { .. } => None,
            RemoteCall::List { filters, .. } => Some(filters),
            RemoteCall::Create { payload, .. } | RemoteCall::Act { payload, .. } => Some(payload),
        }
    }

    /// Short label for logging (e.g., "create order")
    pub fn label(&self) -> String {
        match self {
            RemoteCall::Fetch { resource, .. } => format!("fetch {resource}"),
            RemoteCall::List { resource, .. } => format!("list {resource}"),
            RemoteCall::Create { resource, .. } => format!("create {resource}"),
            RemoteCall::Act { resource, action, .. } => format!("{} {resource}", action.as_str()),
        }
    }

    /// Invoke the matching client operation
    pub async fn execute(&self, client: &dyn CapabilityClient) -> UpstreamResult<Value> {
        match self {
            RemoteCall::Fetch { resource, id } => client.fetch(*resource, id).await,
            RemoteCall::List { resource, filters } => client.list(*resource, filters).await,
            RemoteCall::Create { resource, payload } => client.create(*resource, payload).await,
            RemoteCall::Act {
                resource,
                id,
                action,
                payload,
            } => client.act(*resource, id, *action, payload).await,
        }
    }
}

/// Typed remote-call wrapper over the payment provider's API.
///
/// Implementations own authentication and must be safe to share across
/// tasks; the dispatcher holds one instance for every transport.
#[async_trait]
pub trait CapabilityClient: Send + Sync {
    /// Fetch one entity by id
    async fn fetch(&self, resource: Resource, id: &str) -> UpstreamResult<Value>;

    /// List a page of entities
    async fn list(&self, resource: Resource, filters: &Payload) -> UpstreamResult<Value>;

    /// Create an entity
    async fn create(&self, resource: Resource, payload: &Payload) -> UpstreamResult<Value>;

    /// Apply a lifecycle action to an existing entity
    async fn act(
        &self,
        resource: Resource,
        id: &str,
        action: LifecycleAction,
        payload: &Payload,
    ) -> UpstreamResult<Value>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared capability client (dynamic dispatch)
pub type SharedCapabilityClient = Arc<dyn CapabilityClient>;
