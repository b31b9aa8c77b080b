use crate::adapter::EventAdapter;
use crate::config::RelayConfig;
use crate::delivery::LogDelivery;
use crate::event::LogEvent;
use crate::guard::ReentrancyGuard;
use crate::mask::{Masker, MASK_CREDITCARD, MASK_SSN};
use std::sync::{Arc, OnceLock};

/// Lifecycle shell around the adapter, guard and delivery backend.
///
/// `start` wires everything up once; `append` is the guarded entry point the
/// [`RelayLayer`](crate::layer::RelayLayer) feeds captured events into. No
/// failure escapes this type: startup, per-event and shutdown errors are
/// reported on stderr and swallowed, so application log calls never observe
/// an error originating here. Reporting through `tracing` itself would
/// re-enter the layer, which is exactly what the guard exists to stop.
pub struct RelayAppender {
    config: RelayConfig,
    delivery: Arc<dyn LogDelivery>,
    guard: ReentrancyGuard,
    adapter: OnceLock<EventAdapter>,
}

impl RelayAppender {
    pub fn new(config: RelayConfig, delivery: Arc<dyn LogDelivery>) -> Self {
        RelayAppender {
            config,
            delivery,
            guard: ReentrancyGuard::new(),
            adapter: OnceLock::new(),
        }
    }

    /// Activate the delivery backend and bind the adapter. Idempotent: once
    /// started, later calls do nothing.
    ///
    /// On activation failure the error is reported and the appender stays
    /// inert — `append` becomes a no-op and the host application keeps
    /// running unshipped.
    pub fn start(&self) {
        if self.is_started() {
            return;
        }

        let masker = build_masker(&self.config);
        let adapter = EventAdapter::new(self.config.environment_detail());

        match self.delivery.activate(&self.config, masker) {
            Ok(()) => {
                let _ = self.adapter.set(adapter);
            }
            Err(e) => report("starting relay delivery", &e),
        }
    }

    pub fn is_started(&self) -> bool {
        self.adapter.get().is_some()
    }

    /// Guarded append: drops the event silently when this thread is already
    /// inside [`sub_append`](Self::sub_append), which breaks recursion when
    /// processing itself emits log events.
    pub fn append(&self, event: LogEvent) {
        let Some(_token) = self.guard.enter() else {
            return;
        };
        self.sub_append(event);
    }

    fn sub_append(&self, event: LogEvent) {
        let Some(adapter) = self.adapter.get() else {
            return;
        };

        let thrown = adapter.thrown(&event).cloned();
        let error = if thrown.is_some() || adapter.is_error_severity(&event) {
            Some(adapter.error_record(&event, thrown.as_ref()))
        } else {
            None
        };
        let message = adapter.log_message(&event, error);

        if let Err(e) = self.delivery.append(message) {
            report("appending event to relay delivery", &e);
        }
    }

    /// Close the delivery backend. Failures are reported, never raised.
    pub fn stop(&self) {
        if let Err(e) = self.delivery.close() {
            report("closing relay delivery", &e);
        }
    }
}

fn report(action: &str, err: &dyn std::error::Error) {
    eprintln!("tracing-relay: error {action}: {err}");
}

fn build_masker(config: &RelayConfig) -> Masker {
    let mut masker = Masker::new();

    if config.mask_enabled {
        masker.add_mask(MASK_CREDITCARD);
        masker.add_mask(MASK_SSN);

        for mask in &config.masks {
            if mask.enabled {
                masker.add_mask(&mask.value);
            } else {
                masker.remove_mask(&mask.value);
            }
        }
    }

    masker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{BufferDelivery, DeliveryError};
    use crate::event::Severity;
    use crate::mask::{MaskOverride, MASK_IP};
    use crate::record::LogMessage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn started(delivery: Arc<BufferDelivery>) -> RelayAppender {
        let appender = RelayAppender::new(RelayConfig::default(), delivery);
        appender.start();
        appender
    }

    #[test]
    fn append_converts_and_forwards() {
        let delivery = Arc::new(BufferDelivery::new());
        let appender = started(delivery.clone());

        appender.append(LogEvent::new(Severity::Info, "hello"));

        let messages = delivery.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message.as_deref(), Some("hello"));
        assert_eq!(messages[0].level, "info");
        // Plain info: no error record attached.
        assert!(messages[0].error.is_none());
    }

    #[test]
    fn error_severity_gets_error_record() {
        let delivery = Arc::new(BufferDelivery::new());
        let appender = started(delivery.clone());

        appender.append(LogEvent::new(Severity::Error, "it broke"));

        let messages = delivery.messages();
        assert!(messages[0].error.is_some());
    }

    struct CountingDelivery {
        activations: AtomicUsize,
    }

    impl LogDelivery for CountingDelivery {
        fn activate(&self, _config: &RelayConfig, _masker: Masker) -> Result<(), DeliveryError> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn append(&self, _message: LogMessage) -> Result<(), DeliveryError> {
            Ok(())
        }
        fn close(&self) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    #[test]
    fn start_is_idempotent() {
        let delivery = Arc::new(CountingDelivery {
            activations: AtomicUsize::new(0),
        });
        let appender = RelayAppender::new(RelayConfig::default(), delivery.clone());

        appender.start();
        appender.start();
        appender.start();

        assert_eq!(delivery.activations.load(Ordering::SeqCst), 1);
        assert!(appender.is_started());
    }

    struct FailingDelivery;

    impl LogDelivery for FailingDelivery {
        fn activate(&self, _config: &RelayConfig, _masker: Masker) -> Result<(), DeliveryError> {
            Err(DeliveryError::Activation("collector unreachable".into()))
        }
        fn append(&self, _message: LogMessage) -> Result<(), DeliveryError> {
            panic!("append must not be reached when activation failed");
        }
        fn close(&self) -> Result<(), DeliveryError> {
            Err(DeliveryError::Closed)
        }
    }

    #[test]
    fn startup_failure_leaves_appender_inert() {
        let appender = RelayAppender::new(RelayConfig::default(), Arc::new(FailingDelivery));
        appender.start();

        assert!(!appender.is_started());
        // Dropped, not panicked: FailingDelivery::append would panic.
        appender.append(LogEvent::new(Severity::Error, "lost"));
        // Shutdown failure is reported, not raised.
        appender.stop();
    }

    #[test]
    fn mask_defaults_and_overrides() {
        let delivery = Arc::new(BufferDelivery::new());
        let config = RelayConfig {
            masks: vec![
                MaskOverride::enabled(MASK_IP),
                MaskOverride::disabled(MASK_SSN),
            ],
            ..RelayConfig::default()
        };
        let appender = RelayAppender::new(config, delivery.clone());
        appender.start();

        let masker = delivery.masker().expect("masker handed to delivery");
        assert!(masker.has_mask(MASK_CREDITCARD));
        assert!(masker.has_mask(MASK_IP));
        assert!(!masker.has_mask(MASK_SSN));
    }

    #[test]
    fn mask_disabled_yields_empty_registry() {
        let delivery = Arc::new(BufferDelivery::new());
        let config = RelayConfig {
            mask_enabled: false,
            masks: vec![MaskOverride::enabled(MASK_IP)],
            ..RelayConfig::default()
        };
        let appender = RelayAppender::new(config, delivery.clone());
        appender.start();

        assert!(delivery.masker().expect("masker").is_empty());
    }

    struct ReenteringDelivery {
        appender: Mutex<Option<Arc<RelayAppender>>>,
        appended: AtomicUsize,
    }

    impl LogDelivery for ReenteringDelivery {
        fn activate(&self, _config: &RelayConfig, _masker: Masker) -> Result<(), DeliveryError> {
            Ok(())
        }
        fn append(&self, _message: LogMessage) -> Result<(), DeliveryError> {
            self.appended.fetch_add(1, Ordering::SeqCst);
            // Simulate delivery logging through the same appender.
            if let Some(appender) = self.appender.lock().unwrap().as_ref() {
                appender.append(LogEvent::new(Severity::Error, "from inside delivery"));
            }
            Ok(())
        }
        fn close(&self) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    #[test]
    fn reentrant_append_is_a_no_op() {
        let delivery = Arc::new(ReenteringDelivery {
            appender: Mutex::new(None),
            appended: AtomicUsize::new(0),
        });
        let appender = Arc::new(RelayAppender::new(RelayConfig::default(), delivery.clone()));
        appender.start();
        *delivery.appender.lock().unwrap() = Some(appender.clone());

        appender.append(LogEvent::new(Severity::Error, "outer"));

        // The nested append was refused; only the outer event arrived.
        assert_eq!(delivery.appended.load(Ordering::SeqCst), 1);

        // The guard is idle again: a later append processes normally
        // (and re-enters once more, still refused).
        appender.append(LogEvent::new(Severity::Error, "second"));
        assert_eq!(delivery.appended.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn per_event_failure_does_not_stop_later_events() {
        let delivery = Arc::new(BufferDelivery::new());
        let appender = started(delivery.clone());

        appender.append(LogEvent::new(Severity::Info, "first"));
        delivery.close().unwrap();
        // Reported and lost, not raised.
        appender.append(LogEvent::new(Severity::Info, "second"));

        assert_eq!(delivery.messages().len(), 1);
    }
}
