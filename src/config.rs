use crate::env::{
    env_opt, env_or, RELAY_API_KEY_ENV, RELAY_API_URL_ENV, RELAY_APPLICATION_ENV,
    RELAY_AUTH_URL_ENV, RELAY_ENVIRONMENT_ENV,
};
use crate::mask::MaskOverride;
use crate::record::EnvironmentDetail;

/// Default collector endpoint: a relay agent on the local host.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8090";

/// Default authentication endpoint.
pub const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:8091";

/// Resolved appender configuration.
///
/// Plain named fields constructed by ordinary code; parse your own config
/// format (or use [`RelayConfig::from_env`]) and hand the result to
/// [`RelayAppender`](crate::appender::RelayAppender). All values are taken
/// as already validated.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_url: String,
    pub auth_url: String,
    pub api_key: Option<String>,
    /// Logical application name reported with every error record.
    pub application: Option<String>,
    /// Deployment environment name, e.g. `production`.
    pub environment: Option<String>,
    /// Whether the built-in masks are registered at startup. Defaults to
    /// enabled; set to `false` to start with an empty mask registry.
    pub mask_enabled: bool,
    /// Explicit per-mask toggles applied after the built-ins.
    pub masks: Vec<MaskOverride>,
    /// If `true`, an additional `fmt` layer echoes events to stdout when
    /// the relay is installed via [`init_relay`](crate::init::init_relay).
    pub enable_stdout: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_key: None,
            application: None,
            environment: None,
            mask_enabled: true,
            masks: Vec::new(),
            enable_stdout: true,
        }
    }
}

impl RelayConfig {
    /// Build a configuration from `LOG_RELAY_*` environment variables,
    /// falling back to the defaults for anything unset. Explicit field
    /// assignment on the returned value wins over both.
    pub fn from_env() -> Self {
        RelayConfig {
            api_url: env_or(RELAY_API_URL_ENV, DEFAULT_API_URL),
            auth_url: env_or(RELAY_AUTH_URL_ENV, DEFAULT_AUTH_URL),
            api_key: env_opt(RELAY_API_KEY_ENV),
            application: env_opt(RELAY_APPLICATION_ENV),
            environment: env_opt(RELAY_ENVIRONMENT_ENV),
            ..RelayConfig::default()
        }
    }

    /// Environment descriptor the adapter stamps onto every error record:
    /// this host's name plus the configured identifiers.
    pub fn environment_detail(&self) -> EnvironmentDetail {
        EnvironmentDetail {
            device_name: gethostname::gethostname().into_string().ok(),
            application: self.application.clone(),
            environment: self.environment.clone(),
        }
    }
}

/// Client identifier reported to the collector, `name-version` of this
/// crate as built.
pub fn client_name() -> String {
    format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RelayConfig::default();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.api_key, None);
        assert!(config.mask_enabled);
        assert!(config.masks.is_empty());
    }

    #[test]
    fn from_env_reads_overrides() {
        // Unique variable to stay independent of parallel tests.
        std::env::set_var(RELAY_APPLICATION_ENV, "orders-service");

        let config = RelayConfig::from_env();
        assert_eq!(config.application.as_deref(), Some("orders-service"));

        std::env::remove_var(RELAY_APPLICATION_ENV);
    }

    #[test]
    fn environment_detail_carries_identifiers() {
        let config = RelayConfig {
            application: Some("orders-service".into()),
            environment: Some("staging".into()),
            ..RelayConfig::default()
        };

        let detail = config.environment_detail();
        assert_eq!(detail.application.as_deref(), Some("orders-service"));
        assert_eq!(detail.environment.as_deref(), Some("staging"));
        assert!(detail.device_name.is_some());
    }

    #[test]
    fn client_name_embeds_version() {
        let name = client_name();
        assert!(name.starts_with("tracing-relay-"));
        assert!(name.contains(env!("CARGO_PKG_VERSION")));
    }
}
