//! Configuration for the booking front desk.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hotel REST API
    pub api: ApiConfig,
    /// Workflow tuning handed to the reducer environment
    pub workflow: WorkflowConfig,
    /// Logging and metrics
    pub observability: ObservabilityConfig,
}

/// Hotel REST API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without trailing slash (e.g. `http://localhost:8000/api`)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer token, if the API requires one
    pub token: Option<String>,
}

impl ApiConfig {
    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Booking workflow tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Quiet period before a client search is issued, in milliseconds
    pub client_search_debounce_ms: u64,
    /// Shortest search term that triggers a query
    pub client_search_min_chars: usize,
    /// Longest payment method text kept
    pub payment_method_max_len: usize,
}

impl WorkflowConfig {
    /// Quiet period before a client search is issued
    #[must_use]
    pub const fn client_search_debounce(&self) -> Duration {
        Duration::from_millis(self.client_search_debounce_ms)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            client_search_debounce_ms: 300,
            client_search_min_chars: 2,
            payment_method_max_len: crate::payment::DEFAULT_METHOD_MAX_LEN,
        }
    }
}

/// Logging and metrics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive)
    pub log_level: String,
    /// Metrics port
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (the environment, or a map in tests).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = WorkflowConfig::default();

        Self {
            api: ApiConfig {
                base_url: lookup("HOTEL_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "http://localhost:8000/api".to_string()),
                timeout_secs: lookup("HOTEL_API_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
                token: lookup("HOTEL_API_TOKEN").filter(|token| !token.is_empty()),
            },
            workflow: WorkflowConfig {
                client_search_debounce_ms: lookup("CLIENT_SEARCH_DEBOUNCE_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.client_search_debounce_ms),
                client_search_min_chars: lookup("CLIENT_SEARCH_MIN_CHARS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.client_search_min_chars),
                payment_method_max_len: lookup("PAYMENT_METHOD_MAX_LEN")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.payment_method_max_len),
            },
            observability: ObservabilityConfig {
                log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
                metrics_port: lookup("METRICS_PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(9090),
            },
        }
    }
}
