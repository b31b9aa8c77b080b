use crate::config::RelayConfig;
use crate::mask::Masker;
use crate::record::LogMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Failure reported by a [`LogDelivery`] implementation.
#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("delivery activation failed: {0}")]
    Activation(String),

    #[error("delivery rejected message: {0}")]
    Rejected(String),

    #[error("delivery is closed")]
    Closed,
}

/// Destination for normalized [`LogMessage`]s.
///
/// Implementations own everything past the hand-off point: queuing,
/// batching, transport, retry and their own worker threads. The appender
/// shell calls these methods synchronously on whatever application thread
/// emitted the event and catches every error itself, so implementations may
/// fail freely but must never block for long.
pub trait LogDelivery: Send + Sync {
    /// Bring the backend up with the resolved configuration.
    ///
    /// **Parameters**
    /// - `config`: validated [`RelayConfig`] (endpoint, credentials,
    ///   application/environment identifiers).
    /// - `masker`: mask registry assembled at startup; the backend applies
    ///   it to outbound payloads if it masks at all.
    ///
    /// **Returns**
    /// - `Ok(())` once the backend is ready to accept messages.
    /// - `Err(..)` if activation failed; the appender reports the error and
    ///   stays inert (every later append becomes a no-op).
    ///
    /// Called at most once, before any `append`.
    fn activate(&self, config: &RelayConfig, masker: Masker) -> Result<(), DeliveryError>;

    /// Accept one normalized message.
    ///
    /// **Returns**
    /// - `Ok(())` if the message was taken over by the backend.
    /// - `Err(..)` if it was refused; the appender reports the error, that
    ///   single message is lost and later events are unaffected.
    ///
    /// Must be safe to call from many threads at once.
    fn append(&self, message: LogMessage) -> Result<(), DeliveryError>;

    /// Flush and shut the backend down.
    fn close(&self) -> Result<(), DeliveryError>;
}

/// A delivery that simply drops all messages.
///
/// Useful for measuring the overhead of capture and normalization without
/// any backend, and for wiring the relay up in environments where shipping
/// is disabled.
#[derive(Clone, Default)]
pub struct NoopDelivery;

impl LogDelivery for NoopDelivery {
    fn activate(&self, _config: &RelayConfig, _masker: Masker) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn append(&self, _message: LogMessage) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn close(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// In-memory delivery that keeps every appended message.
///
/// Intended for tests and local inspection; `append` fails once the
/// delivery has been closed, which makes shutdown behavior observable.
#[derive(Default)]
pub struct BufferDelivery {
    messages: Mutex<Vec<LogMessage>>,
    masker: Mutex<Option<Masker>>,
    closed: AtomicBool,
}

impl BufferDelivery {
    pub fn new() -> Self {
        BufferDelivery::default()
    }

    /// Snapshot of everything appended so far.
    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages.lock().expect("buffer poisoned").clone()
    }

    /// The masker handed over at activation, if activation happened.
    pub fn masker(&self) -> Option<Masker> {
        self.masker.lock().expect("buffer poisoned").clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl LogDelivery for BufferDelivery {
    fn activate(&self, _config: &RelayConfig, masker: Masker) -> Result<(), DeliveryError> {
        *self.masker.lock().expect("buffer poisoned") = Some(masker);
        Ok(())
    }

    fn append(&self, message: LogMessage) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }
        self.messages.lock().expect("buffer poisoned").push(message);
        Ok(())
    }

    fn close(&self) -> Result<(), DeliveryError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
