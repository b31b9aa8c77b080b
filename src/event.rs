use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a captured event, ordered lowest to highest.
///
/// Mirrors the host framework's levels plus `Fatal`, which has no `tracing`
/// counterpart but can be set on directly constructed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// Canonical upper-case name, e.g. `"ERROR"`.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity::Trace,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

/// Code location an event was emitted from.
///
/// `line` is `None` when the lookup failed or the host framework did not
/// provide one; consumers decide how to degrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub class: String,
    pub method: String,
    pub line: Option<u32>,
}

/// One stack frame of a thrown error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Frame {
    pub class: String,
    pub method: String,
    pub line: Option<u32>,
}

/// Error attached to an event, with its cause chain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ThrownInfo {
    pub type_name: String,
    pub message: Option<String>,
    pub frames: Vec<Frame>,
    pub cause: Option<Box<ThrownInfo>>,
}

impl ThrownInfo {
    pub fn new(type_name: impl Into<String>, message: Option<String>) -> Self {
        ThrownInfo {
            type_name: type_name.into(),
            message,
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Build a `ThrownInfo` from a `std::error::Error`, following its
    /// `source()` chain into `cause` links.
    ///
    /// Rust errors carry no runtime type name, so the label is parsed from
    /// the `Debug` rendering: everything before the first `(`, `{` or space.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        ThrownInfo {
            type_name: type_label(err),
            message: Some(err.to_string()),
            frames: Vec::new(),
            cause: err.source().map(|cause| Box::new(ThrownInfo::from_error(cause))),
        }
    }
}

fn type_label(err: &(dyn std::error::Error + 'static)) -> String {
    let debug = format!("{:?}", err);
    let end = debug
        .find(|c: char| c == '(' || c == '{' || c.is_whitespace())
        .unwrap_or(debug.len());
    let label = debug[..end].trim();
    if label.is_empty() {
        "Error".to_string()
    } else {
        label.to_string()
    }
}

/// A captured log event, decoupled from the host framework.
///
/// The [`RelayLayer`](crate::layer::RelayLayer) fills one of these per
/// `tracing` event; `context_map` and `context_stack` are snapshots of the
/// emitting thread's diagnostic context taken at capture time.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: Option<String>,
    pub thrown: Option<ThrownInfo>,
    pub thread_name: String,
    pub call_site: Option<CallSite>,
    pub context_map: BTreeMap<String, String>,
    pub context_stack: Vec<String>,
}

impl LogEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        LogEvent {
            message: Some(message.into()),
            severity,
            ..LogEvent::default()
        }
    }

    /// Epoch milliseconds of the event timestamp.
    pub fn epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

impl Default for LogEvent {
    fn default() -> Self {
        LogEvent {
            timestamp: Utc::now(),
            severity: Severity::Info,
            message: None,
            thrown: None,
            thread_name: current_thread_name(),
            call_site: None,
            context_map: BTreeMap::new(),
            context_stack: Vec::new(),
        }
    }
}

pub(crate) fn current_thread_name() -> String {
    std::thread::current()
        .name()
        .unwrap_or("unnamed")
        .to_string()
}
