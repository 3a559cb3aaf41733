//! # pay-api
//!
//! Transport adapters for rzp-mcp-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server (synchronous request/response binding)
//! - JSON-RPC session over stdio (persistent-session binding)
//!
//! Both bind the same `pay_core::Dispatcher`.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health`, `/mcp/health` | Health check |
//! | GET | `/`, `/mcp/metadata` | Server metadata and catalog |
//! | GET | `/mcp/tools` | Tool catalog |
//! | POST | `/mcp/request` | Invoke `{tool_name, arguments}` |
//! | POST | `/mcp` | `{type: "metadata"}` or `{type: "tool", name, parameters}` |

pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::create_router;
pub use session::Session;
pub use state::{AppConfig, AppState, ToolsConfig};
