use crate::context;
use crate::event::{LogEvent, Severity, ThrownInfo};
use crate::record::{EnvironmentDetail, ErrorDetail, ErrorRecord, LogMessage};
use std::collections::BTreeMap;

/// Reserved diagnostic-properties key for the top of the context stack.
pub const NESTED_CONTEXT_KEY: &str = "NDC";

/// Error-type label used when no error was thrown and the detail is
/// synthesized from the call site.
pub const STRING_EXCEPTION: &str = "StringException";

/// Maps captured [`LogEvent`]s into the normalized record model.
///
/// The adapter is stateless apart from the immutable [`EnvironmentDetail`]
/// it was constructed with, so one instance can serve any number of threads.
/// Per-event reads of user, web request and transaction id go through the
/// thread-scoped [`context`] module.
#[derive(Debug, Clone)]
pub struct EventAdapter {
    environment: EnvironmentDetail,
}

impl EventAdapter {
    pub fn new(environment: EnvironmentDetail) -> Self {
        EventAdapter { environment }
    }

    /// The event's attached error, untouched.
    pub fn thrown<'a>(&self, event: &'a LogEvent) -> Option<&'a ThrownInfo> {
        event.thrown.as_ref()
    }

    /// Build an [`ErrorRecord`] for the event.
    ///
    /// With a thrown error the detail carries its type, frames and cause
    /// chain; without one it is synthesized from the call site, with a
    /// missing line number degrading to `0`. The detail's message is always
    /// the event's formatted message. User and web request are attached only
    /// when the request scope has them; the environment-variable snapshot is
    /// always attached.
    pub fn error_record(&self, event: &LogEvent, thrown: Option<&ThrownInfo>) -> ErrorRecord {
        let error = match thrown {
            Some(info) => ErrorDetail::Thrown {
                type_name: info.type_name.clone(),
                message: self.message(event),
                frames: info.frames.clone(),
                cause: info.cause.clone(),
            },
            None => {
                let (class, method, line) = match &event.call_site {
                    Some(site) => (
                        Some(site.class.clone()),
                        Some(site.method.clone()),
                        site.line.unwrap_or(0),
                    ),
                    None => (None, None, 0),
                };

                ErrorDetail::Source {
                    type_name: STRING_EXCEPTION.to_string(),
                    message: self.message(event),
                    class,
                    method,
                    line,
                }
            }
        };

        ErrorRecord {
            occurred: event.timestamp,
            environment: self.environment.clone(),
            error,
            user_name: context::user(),
            web_request: context::web_request(),
            // vars_os + lossy conversion: vars() panics on non-unicode
            // values, and nothing may panic past this boundary.
            server_variables: std::env::vars_os()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
        }
    }

    /// Build the [`LogMessage`] shipped to delivery.
    ///
    /// Diagnostic properties are attached as a JSON object only when
    /// non-empty and only when serialization succeeds; a failure drops the
    /// field silently. Unlike [`error_record`](Self::error_record), a missing
    /// call-site line leaves `source_line` absent instead of zero.
    pub fn log_message(&self, event: &LogEvent, error: Option<ErrorRecord>) -> LogMessage {
        let properties = self.properties(event);
        let data = if properties.is_empty() {
            None
        } else {
            serde_json::to_string(&properties).ok()
        };

        let (source_method, source_line) = match &event.call_site {
            Some(site) => (Some(format!("{}.{}", site.class, site.method)), site.line),
            None => (None, None),
        };

        LogMessage {
            message: self.message(event),
            data,
            error,
            thread_name: event.thread_name.clone(),
            epoch_millis: event.epoch_millis(),
            level: event.severity.name().to_ascii_lowercase(),
            transaction_id: context::transaction_id(),
            source_method,
            source_line,
        }
    }

    /// The event's formatted message, if it carries one.
    pub fn message(&self, event: &LogEvent) -> Option<String> {
        event.message.clone()
    }

    /// Merge the event's diagnostic map and stack into one property map.
    ///
    /// The flat map goes in first; the stack's top value is then written
    /// under [`NESTED_CONTEXT_KEY`], but only when it is non-empty — an
    /// empty top must not create the key.
    pub fn properties(&self, event: &LogEvent) -> BTreeMap<String, String> {
        let mut properties = event.context_map.clone();

        if let Some(top) = event.context_stack.last() {
            if !top.is_empty() {
                properties.insert(NESTED_CONTEXT_KEY.to_string(), top.clone());
            }
        }

        properties
    }

    /// True only for the two highest severities.
    pub fn is_error_severity(&self, event: &LogEvent) -> bool {
        matches!(event.severity, Severity::Error | Severity::Fatal)
    }
}
