//! Thread-affine diagnostic and request context.
//!
//! Two scopes live here, both stored in `thread_local!` cells:
//!
//! - the diagnostic scope: a key/value map plus a value stack that
//!   applications fill while handling work, snapshotted into every captured
//!   [`LogEvent`](crate::event::LogEvent);
//! - the request scope: current user, web-request detail and transaction id,
//!   read by the [`EventAdapter`](crate::adapter::EventAdapter) while
//!   normalizing an event.
//!
//! Nothing here is shared across threads; each application thread sees only
//! the values it set itself.

use crate::record::WebRequestDetail;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Default)]
struct DiagnosticState {
    map: BTreeMap<String, String>,
    stack: Vec<String>,
}

#[derive(Default)]
struct RequestState {
    user: Option<String>,
    web_request: Option<WebRequestDetail>,
    transaction_id: Option<String>,
}

thread_local! {
    static DIAGNOSTICS: RefCell<DiagnosticState> = RefCell::new(DiagnosticState::default());
    static REQUEST: RefCell<RequestState> = RefCell::new(RequestState::default());
}

/// Set a diagnostic key for the current thread.
pub fn put(key: impl Into<String>, value: impl Into<String>) {
    DIAGNOSTICS.with(|d| {
        d.borrow_mut().map.insert(key.into(), value.into());
    });
}

pub fn get(key: &str) -> Option<String> {
    DIAGNOSTICS.with(|d| d.borrow().map.get(key).cloned())
}

pub fn remove(key: &str) -> Option<String> {
    DIAGNOSTICS.with(|d| d.borrow_mut().map.remove(key))
}

/// Push a value onto the current thread's diagnostic stack.
pub fn push(value: impl Into<String>) {
    DIAGNOSTICS.with(|d| d.borrow_mut().stack.push(value.into()));
}

pub fn pop() -> Option<String> {
    DIAGNOSTICS.with(|d| d.borrow_mut().stack.pop())
}

pub fn peek() -> Option<String> {
    DIAGNOSTICS.with(|d| d.borrow().stack.last().cloned())
}

/// Drop every diagnostic key and stack entry on the current thread.
pub fn clear_diagnostics() {
    DIAGNOSTICS.with(|d| {
        let mut state = d.borrow_mut();
        state.map.clear();
        state.stack.clear();
    });
}

/// Copy of the current thread's diagnostic map and stack, taken when an
/// event is captured.
pub(crate) fn diagnostic_snapshot() -> (BTreeMap<String, String>, Vec<String>) {
    DIAGNOSTICS.with(|d| {
        let state = d.borrow();
        (state.map.clone(), state.stack.clone())
    })
}

pub fn set_user(user: impl Into<String>) {
    REQUEST.with(|r| r.borrow_mut().user = Some(user.into()));
}

pub fn user() -> Option<String> {
    REQUEST.with(|r| r.borrow().user.clone())
}

pub fn set_web_request(detail: WebRequestDetail) {
    REQUEST.with(|r| r.borrow_mut().web_request = Some(detail));
}

pub fn web_request() -> Option<WebRequestDetail> {
    REQUEST.with(|r| r.borrow().web_request.clone())
}

pub fn set_transaction_id(id: impl Into<String>) {
    REQUEST.with(|r| r.borrow_mut().transaction_id = Some(id.into()));
}

pub fn transaction_id() -> Option<String> {
    REQUEST.with(|r| r.borrow().transaction_id.clone())
}

/// Drop the current thread's user, web-request and transaction id.
pub fn clear_request() {
    REQUEST.with(|r| *r.borrow_mut() = RequestState::default());
}
