use crate::event::{Frame, ThrownInfo};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where the process is running: host name plus the configured application
/// and environment identifiers. Opaque to the adapter, attached to every
/// [`ErrorRecord`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvironmentDetail {
    pub device_name: Option<String>,
    pub application: Option<String>,
    pub environment: Option<String>,
}

/// Detail of the HTTP request active when an event was captured, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebRequestDetail {
    pub request_url: Option<String>,
    pub http_method: Option<String>,
    pub client_ip: Option<String>,
    pub headers: BTreeMap<String, String>,
}

/// What went wrong, in exactly one of two shapes: derived from a thrown
/// error, or synthesized from the emitting call site when nothing was thrown.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorDetail {
    Thrown {
        type_name: String,
        message: Option<String>,
        frames: Vec<Frame>,
        cause: Option<Box<ThrownInfo>>,
    },
    Source {
        type_name: String,
        message: Option<String>,
        class: Option<String>,
        method: Option<String>,
        line: u32,
    },
}

impl ErrorDetail {
    pub fn type_name(&self) -> &str {
        match self {
            ErrorDetail::Thrown { type_name, .. } => type_name,
            ErrorDetail::Source { type_name, .. } => type_name,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorDetail::Thrown { message, .. } => message.as_deref(),
            ErrorDetail::Source { message, .. } => message.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub occurred: DateTime<Utc>,
    pub environment: EnvironmentDetail,
    pub error: ErrorDetail,
    pub user_name: Option<String>,
    pub web_request: Option<WebRequestDetail>,
    pub server_variables: BTreeMap<String, String>,
}

/// Normalized message handed to the delivery backend. Built fresh per event
/// and never touched again by this crate after [`LogDelivery::append`]
/// returns.
///
/// [`LogDelivery::append`]: crate::delivery::LogDelivery::append
#[derive(Debug, Clone, Serialize)]
pub struct LogMessage {
    pub message: Option<String>,
    /// JSON object of the merged diagnostic properties. Absent when there
    /// were none, or when serialization failed.
    pub data: Option<String>,
    pub error: Option<ErrorRecord>,
    pub thread_name: String,
    pub epoch_millis: i64,
    /// Lower-cased severity name, e.g. `"error"`.
    pub level: String,
    pub transaction_id: Option<String>,
    /// `"class.method"` of the emitting call site.
    pub source_method: Option<String>,
    pub source_line: Option<u32>,
}
