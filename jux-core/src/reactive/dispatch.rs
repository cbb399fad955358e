//! Listener dispatch isolation.
//!
//! A panicking listener must not stop the remaining listeners of the same
//! dispatch from being notified. Every listener call goes through
//! [`isolate`], which catches the panic and hands it to the thread's
//! uncaught handler.
//!
//! The handler is thread-local, like the rest of the engine. When none is
//! installed the panic is logged at error level.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::observable::ObservableId;

/// A listener panic caught during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPanic {
    /// The observable whose dispatch was running.
    pub source: ObservableId,
    /// The panic message, when the payload was a string.
    pub message: String,
}

type Handler = Rc<dyn Fn(&ListenerPanic)>;

thread_local! {
    static UNCAUGHT_HANDLER: RefCell<Option<Handler>> = const { RefCell::new(None) };
}

/// Install the uncaught handler for listener panics on this thread,
/// replacing any previous one.
pub fn set_uncaught_handler<F>(handler: F)
where
    F: Fn(&ListenerPanic) + 'static,
{
    UNCAUGHT_HANDLER.with(|slot| *slot.borrow_mut() = Some(Rc::new(handler)));
}

/// Remove the uncaught handler of this thread, restoring the logging
/// default. Returns whether a handler was installed.
pub fn take_uncaught_handler() -> bool {
    UNCAUGHT_HANDLER.with(|slot| slot.borrow_mut().take().is_some())
}

/// Run one listener callback, routing a panic to the uncaught handler.
pub(crate) fn isolate<F>(source: ObservableId, callback: F)
where
    F: FnOnce(),
{
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        report(ListenerPanic {
            source,
            message: panic_message(payload.as_ref()),
        });
    }
}

fn report(failure: ListenerPanic) {
    // Clone out of the slot so the handler may itself replace the handler.
    let handler = UNCAUGHT_HANDLER.with(|slot| slot.borrow().clone());
    match handler {
        Some(handler) => handler(&failure),
        None => tracing::error!(
            source = %failure.source,
            message = %failure.message,
            "listener panicked during dispatch"
        ),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
