use crate::appender::RelayAppender;
use crate::config::RelayConfig;
use crate::delivery::LogDelivery;
use crate::layer::RelayLayer;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Handle to an installed relay, kept by the application for shutdown.
pub struct RelayHandle {
    appender: Arc<RelayAppender>,
}

impl RelayHandle {
    /// Flush and close the delivery backend. Safe to call from any thread;
    /// failures are reported on stderr, never raised.
    pub fn shutdown(&self) {
        self.appender.stop();
    }

    pub fn appender(&self) -> &Arc<RelayAppender> {
        &self.appender
    }
}

/// Install a global `tracing` subscriber that relays every event to the
/// provided delivery backend using the given [`RelayConfig`].
///
/// **Parameters**
/// - `delivery`: implementation of [`LogDelivery`] that will receive
///   normalized [`LogMessage`](crate::record::LogMessage)s.
/// - `config`: resolved configuration; `enable_stdout` additionally stacks
///   a `tracing_subscriber::fmt` layer so events stay visible on the
///   console.
///
/// **Effects**
///
/// Starts the appender (activating the delivery backend) and installs a
/// [`Registry`] combined with [`RelayLayer`] as the global default
/// subscriber, so all `tracing` events in the process are observed.
pub fn init_relay_with_config(
    delivery: Arc<dyn LogDelivery>,
    config: RelayConfig,
) -> RelayHandle {
    let enable_stdout = config.enable_stdout;

    let appender = Arc::new(RelayAppender::new(config, delivery));
    appender.start();

    let layer = RelayLayer::new(appender.clone());

    if enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }

    RelayHandle { appender }
}

/// Install the relay with configuration resolved from `LOG_RELAY_*`
/// environment variables. The recommended entrypoint for typical
/// microservices.
pub fn init_relay(delivery: Arc<dyn LogDelivery>) -> RelayHandle {
    init_relay_with_config(delivery, RelayConfig::from_env())
}
