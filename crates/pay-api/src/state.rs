//! # Application State
//!
//! Shared state for both transports.
//! Contains the dispatcher (registry + Razorpay client) and configuration.

use anyhow::Context;
use pay_core::{build_registry, CatalogProfile, Dispatcher, SharedCapabilityClient};
use pay_razorpay::RazorpayClient;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Server name advertised by metadata and `initialize`
pub const SERVER_NAME: &str = "Razorpay MCP Server";

pub const SERVER_DESCRIPTION: &str = "Model Context Protocol server for Razorpay integration";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Catalog profile override from `TOOL_CATALOG`
    pub catalog_profile: Option<CatalogProfile>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let catalog_profile = match std::env::var("TOOL_CATALOG") {
            Ok(value) => Some(value.parse::<CatalogProfile>()?),
            Err(_) => None,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            catalog_profile,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Catalog selection from `config/tools.toml`
///
/// ```toml
/// profile = "core"
/// disabled = ["settlement_create_ondemand"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub profile: Option<CatalogProfile>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl ToolsConfig {
    /// Load from the first `config/tools.toml` found, or defaults
    pub fn load() -> anyhow::Result<Self> {
        let config_paths = [
            "config/tools.toml",
            "../config/tools.toml",
            "../../config/tools.toml",
        ];

        for path in config_paths {
            if let Ok(content) = std::fs::read_to_string(path) {
                let config = Self::parse(&content)
                    .with_context(|| format!("Failed to parse {}", path))?;
                tracing::info!(
                    "Loaded tool config from {} ({} disabled)",
                    path,
                    config.disabled.len()
                );
                return Ok(config);
            }
        }

        tracing::debug!("No tool config found, registering the full catalog");
        Ok(Self::default())
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Effective profile: environment override, then file, then default
    pub fn resolve_profile(&self, config: &AppConfig) -> CatalogProfile {
        config
            .catalog_profile
            .or(self.profile)
            .unwrap_or_default()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// One dispatch table for every transport
    pub dispatcher: Arc<Dispatcher>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by the Razorpay client from environment credentials
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let tools = ToolsConfig::load()?;

        let client = RazorpayClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Razorpay: {}", e))?;
        if client.config().is_live_mode() {
            tracing::warn!("Using live Razorpay keys");
        }

        Self::with_client(config, &tools, Arc::new(client))
    }

    /// Create state around an existing capability client
    pub fn with_client(
        config: AppConfig,
        tools: &ToolsConfig,
        client: SharedCapabilityClient,
    ) -> anyhow::Result<Self> {
        let profile = tools.resolve_profile(&config);
        let registry = build_registry(profile, &tools.disabled)?;

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(registry), client)),
            config,
        })
    }

    /// Metadata document shared by `GET /mcp/metadata` and `POST /mcp`
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "description": SERVER_DESCRIPTION,
            "tools": self.dispatcher.catalog(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, port: u16) -> AppConfig {
        AppConfig {
            host: host.to_string(),
            port,
            environment: "test".to_string(),
            catalog_profile: None,
        }
    }

    #[test]
    fn test_app_config_defaults() {
        // Clear env vars for test
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("TOOL_CATALOG");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.catalog_profile, None);
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("0.0.0.0", 3000).socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        assert!(config("not a host", 3000).socket_addr().is_err());
    }

    #[test]
    fn test_tools_config_parse() {
        let tools = ToolsConfig::parse(
            r#"
            profile = "core"
            disabled = ["payment_link_create"]
            "#,
        )
        .unwrap();

        assert_eq!(tools.profile, Some(CatalogProfile::Core));
        assert_eq!(tools.disabled, vec!["payment_link_create".to_string()]);
        assert!(ToolsConfig::parse("profile = \"everything\"").is_err());
    }

    #[test]
    fn test_profile_precedence() {
        let tools = ToolsConfig {
            profile: Some(CatalogProfile::Core),
            disabled: Vec::new(),
        };
        assert_eq!(tools.resolve_profile(&config("127.0.0.1", 1)), CatalogProfile::Core);

        let mut overridden = config("127.0.0.1", 1);
        overridden.catalog_profile = Some(CatalogProfile::Full);
        assert_eq!(tools.resolve_profile(&overridden), CatalogProfile::Full);

        assert_eq!(
            ToolsConfig::default().resolve_profile(&config("127.0.0.1", 1)),
            CatalogProfile::Full
        );
    }
}
