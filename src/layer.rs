use crate::appender::RelayAppender;
use crate::context;
use crate::event::{current_thread_name, CallSite, LogEvent, Severity, ThrownInfo};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that captures every event into a
/// [`LogEvent`] and routes it through the guarded append path of a
/// [`RelayAppender`].
///
/// Capture is synchronous on the emitting thread: fields and message via a
/// visitor, the diagnostic map and stack snapshotted from [`context`], the
/// thrown error from any field recorded as a `std::error::Error`. The call
/// site maps the event's module path to the class slot and the innermost
/// enclosing span's name to the method slot; events outside any span carry
/// no call site.
pub struct RelayLayer {
    appender: Arc<RelayAppender>,
}

impl RelayLayer {
    pub fn new(appender: Arc<RelayAppender>) -> Self {
        RelayLayer { appender }
    }

    pub fn appender(&self) -> &Arc<RelayAppender> {
        &self.appender
    }
}

impl<S> Layer<S> for RelayLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut thrown: Option<ThrownInfo> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
            thrown: &mut thrown,
        };
        event.record(&mut visitor);

        let meta = event.metadata();

        // Event fields land in the same property map as the thread's
        // diagnostic context; same-named event fields win.
        let (mut context_map, context_stack) = context::diagnostic_snapshot();
        context_map.extend(fields);

        let call_site = ctx.event_span(event).map(|span| CallSite {
            class: meta.module_path().unwrap_or_else(|| meta.target()).to_string(),
            method: span.name().to_string(),
            line: meta.line(),
        });

        self.appender.append(LogEvent {
            timestamp: Utc::now(),
            severity: Severity::from(*meta.level()),
            message,
            thrown,
            thread_name: current_thread_name(),
            call_site,
            context_map,
            context_stack,
        });
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut BTreeMap<String, String>,
    message: &'a mut Option<String>,
    thrown: &'a mut Option<ThrownInfo>,
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if self.thrown.is_none() {
            *self.thrown = Some(ThrownInfo::from_error(value));
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
