/// Environment variable names used by this crate for convenient
/// configuration of the relay from microservices.
///
/// These are purely helpers; [`RelayConfig`](crate::config::RelayConfig)
/// itself remains decoupled from environment access.

/// Collector endpoint URL, e.g. `http://127.0.0.1:8090`.
pub const RELAY_API_URL_ENV: &str = "LOG_RELAY_API_URL";

/// Authentication endpoint URL.
pub const RELAY_AUTH_URL_ENV: &str = "LOG_RELAY_AUTH_URL";

/// API key presented to the collector.
pub const RELAY_API_KEY_ENV: &str = "LOG_RELAY_API_KEY";

/// Logical application name reported with every error record.
pub const RELAY_APPLICATION_ENV: &str = "LOG_RELAY_APPLICATION";

/// Deployment environment name, e.g. `production`.
pub const RELAY_ENVIRONMENT_ENV: &str = "LOG_RELAY_ENVIRONMENT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, `None` if unset or not unicode.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
