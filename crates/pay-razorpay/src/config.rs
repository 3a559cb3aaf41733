//! # Razorpay Configuration
//!
//! Configuration management for the Razorpay integration.
//! Credentials are loaded from environment variables.

use pay_core::UpstreamError;
use reqwest::Url;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Razorpay API configuration
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API key id (rzp_test_... or rzp_live_...)
    pub key_id: String,

    /// API key secret
    pub key_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RazorpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `RAZORPAY_KEY_ID`
    /// - `RAZORPAY_KEY_SECRET`
    ///
    /// Optional:
    /// - `RAZORPAY_API_BASE_URL`
    pub fn from_env() -> Result<Self, UpstreamError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let key_id = env::var("RAZORPAY_KEY_ID").map_err(|_| {
            UpstreamError::Configuration("RAZORPAY_KEY_ID not set".to_string())
        })?;

        let key_secret = env::var("RAZORPAY_KEY_SECRET").map_err(|_| {
            UpstreamError::Configuration("RAZORPAY_KEY_SECRET not set".to_string())
        })?;

        let mut config = Self::new(key_id, key_secret);
        if let Ok(url) = env::var("RAZORPAY_API_BASE_URL") {
            config = config.with_api_base_url(url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Check key formats
    pub fn validate(&self) -> Result<(), UpstreamError> {
        if !self.is_test_mode() && !self.is_live_mode() {
            return Err(UpstreamError::Configuration(
                "RAZORPAY_KEY_ID must start with rzp_test_ or rzp_live_".to_string(),
            ));
        }
        if self.key_secret.trim().is_empty() {
            return Err(UpstreamError::Configuration(
                "RAZORPAY_KEY_SECRET must not be empty".to_string(),
            ));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(UpstreamError::Configuration(format!(
                "invalid API base URL: {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.key_id.starts_with("rzp_live_")
    }

    /// Absolute URL for path segments relative to `/v1/`.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?` and `#` in an
    /// identifier cannot change the path or add a query.
    pub fn endpoint(&self, segments: &[String]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.api_base_url).map_err(|e| {
            UpstreamError::Configuration(format!(
                "invalid API base URL {}: {}",
                self.api_base_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                UpstreamError::Configuration(format!(
                    "API base URL cannot carry a path: {}",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
