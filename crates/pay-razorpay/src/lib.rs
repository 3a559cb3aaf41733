//! # pay-razorpay
//!
//! Razorpay capability client for rzp-mcp-rs.
//!
//! `RazorpayClient` implements `pay_core::CapabilityClient` over the
//! Razorpay REST API (`/v1/...`) with HTTP basic auth. Payment link bodies
//! are regrouped into the nested `customer` / `notify` shape the API
//! expects, and provider error envelopes are decoded into
//! `UpstreamError::Provider`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_core::{build_registry, CatalogProfile, Dispatcher};
//! use pay_razorpay::RazorpayClient;
//! use std::sync::Arc;
//!
//! // Reads RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET
//! let client = RazorpayClient::from_env()?;
//! let registry = Arc::new(build_registry(CatalogProfile::Full, &[])?);
//! let dispatcher = Dispatcher::new(registry, Arc::new(client));
//!
//! let payment = dispatcher
//!     .dispatch("payment_fetch", &serde_json::json!({ "payment_id": "pay_29QQoUBi66xm2f" }))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod wire;

// Re-exports
pub use client::RazorpayClient;
pub use config::RazorpayConfig;
