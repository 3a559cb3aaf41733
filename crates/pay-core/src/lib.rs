//! # pay-core
//!
//! Tool dispatch core for rzp-mcp-rs.
//!
//! This crate provides:
//! - `ToolDefinition` and `ParamSpec` schemas for the tool catalog
//! - `ToolRegistry` with alias canonicalization (`order.create` -> `order_create`)
//! - `Normalizer` turning loose argument bags into typed `RemoteCall`s
//! - `Dispatcher` shared by every transport adapter
//! - `CapabilityClient` trait implemented by payment provider clients
//! - `ToolError` / `UpstreamError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{build_registry, CatalogProfile, Dispatcher};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(build_registry(CatalogProfile::Full, &[])?);
//! let dispatcher = Dispatcher::new(registry, Arc::new(client));
//!
//! let order = dispatcher
//!     .dispatch("order.create", &serde_json::json!({ "amount": 50000 }))
//!     .await?;
//! ```

pub mod capability;
pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod schema;

// Re-exports for convenience
pub use capability::{
    CapabilityClient, LifecycleAction, Payload, RemoteCall, Resource, SharedCapabilityClient,
};
pub use catalog::{all_tools, build_registry, CatalogProfile, LEGACY_ALIASES};
pub use dispatch::{Dispatcher, InvocationResult};
pub use error::{ToolError, ToolResult, UpstreamError, UpstreamResult};
pub use normalize::{Arguments, Binding, Normalizer, Rule, DEFAULT_CURRENCY};
pub use registry::{Tool, ToolRegistry};
pub use schema::{ParamSpec, ParamType, ParamValue, ToolDefinition};
