//! # Error Types
//!
//! Typed error handling for tool dispatch.
//! Every dispatch returns `Result<Value, ToolError>`; capability clients
//! report their failures as `UpstreamError`, which the dispatcher wraps.

use thiserror::Error;

/// Failure reported by a capability client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    Network(String),

    /// The provider rejected the request
    #[error("Provider error [{status}]: {message}")]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Client misconfiguration (missing keys, bad base URL)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl UpstreamError {
    /// Remote error code, when the provider supplied one
    pub fn code(&self) -> Option<&str> {
        match self {
            UpstreamError::Provider { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the failure is transient.
    ///
    /// Informational only: the dispatcher never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Network(_) => true,
            UpstreamError::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for capability client calls
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Core error type for registry and dispatch operations
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name did not resolve against the registry
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// Missing or malformed argument
    #[error("Invalid argument '{field}': {message}")]
    Validation { field: String, message: String },

    /// Capability client failure
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Two tools registered under the same name
    #[error("Duplicate tool: {name}")]
    DuplicateTool { name: String },

    /// Registry lookup of a definition that does not exist
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    /// Catalog or server misconfiguration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ToolError {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a required field that was not supplied
    pub fn missing(field: impl Into<String>) -> Self {
        Self::validation(field, "required field is missing")
    }

    /// Stable tag used in error responses
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::Validation { .. } => "validation_error",
            ToolError::Upstream(_) => "upstream_error",
            ToolError::DuplicateTool { .. } => "duplicate_tool",
            ToolError::NotFound { .. } => "not_found",
            ToolError::Configuration(_) => "configuration_error",
        }
    }

    /// Offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            ToolError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ToolError::UnknownTool { .. } => 404,
            ToolError::Validation { .. } => 400,
            ToolError::Upstream(_) => 502,
            ToolError::DuplicateTool { .. } => 500,
            ToolError::NotFound { .. } => 404,
            ToolError::Configuration(_) => 500,
        }
    }
}

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;
