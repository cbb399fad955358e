//! Value-change dispatch for scalar observables.
//!
//! An [`ExpressionHelper`] wraps a [`ListenerHelper`] and, while at least
//! one change listener is registered, remembers the last value reported to
//! them. Firing an event notifies the invalidation listeners first. If
//! change listeners exist, it then reads the observable's value (forcing a
//! recompute for bindings) and notifies them only when the value differs
//! from the remembered one.

use std::cell::RefCell;

use super::dispatch::isolate;
use super::listener::{ListenerHelper, ListenerState};
use super::observable::{ChangeListener, InvalidationListener, ObservableValue};

#[derive(Debug)]
pub(crate) struct ExpressionHelper<T> {
    listeners: ListenerHelper<ChangeListener<T>>,
    current: Option<T>,
}

impl<T> Default for ExpressionHelper<T> {
    fn default() -> Self {
        Self {
            listeners: ListenerHelper::Empty,
            current: None,
        }
    }
}

impl<T: Clone + PartialEq> ExpressionHelper<T> {
    pub(crate) fn add_invalidation(&mut self, listener: InvalidationListener) {
        self.listeners.add_invalidation(listener);
    }

    pub(crate) fn remove_invalidation(&mut self, listener: &InvalidationListener) {
        self.listeners.remove_invalidation(listener);
    }

    /// Register a change listener. `current` is the observable's value at
    /// registration time; it becomes the baseline for the first event.
    pub(crate) fn add_change(&mut self, listener: ChangeListener<T>, current: T) {
        if !self.listeners.has_change_listeners() {
            self.current = Some(current);
        }
        self.listeners.add_change(listener);
    }

    pub(crate) fn remove_change(&mut self, listener: &ChangeListener<T>) {
        self.listeners.remove_change(listener);
        if !self.listeners.has_change_listeners() {
            self.current = None;
        }
    }

    pub(crate) fn has_change_listeners(&self) -> bool {
        self.listeners.has_change_listeners()
    }

    pub(crate) fn state(&self) -> ListenerState {
        self.listeners.state()
    }
}

/// Notify the listeners of `observable` that it became invalid.
///
/// No borrow of `helper` is held while listeners run, so listeners may
/// register or remove listeners on the same observable.
pub(crate) fn fire_value_changed<T, O>(helper: &RefCell<ExpressionHelper<T>>, observable: &O)
where
    T: Clone + PartialEq,
    O: ObservableValue<T>,
{
    let snapshot = helper.borrow().listeners.snapshot();
    let source = observable.id();

    for listener in snapshot.invalidation() {
        isolate(source, || listener.invalidated(observable));
    }

    if snapshot.change().is_empty() {
        return;
    }

    let new = observable.get();
    let old = helper.borrow_mut().current.replace(new.clone());
    let Some(old) = old else {
        return;
    };
    if old == new {
        return;
    }
    for listener in snapshot.change() {
        isolate(source, || listener.changed(observable, &old, &new));
    }
}
