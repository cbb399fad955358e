//! Constant observables.
//!
//! A [`Constant`] lifts a plain value into the dependency graph. It never
//! invalidates, so registering a listener on it does nothing and allocates
//! nothing.

use std::fmt;
use std::rc::Rc;

use super::listener::ListenerState;
use super::observable::{ChangeListener, InvalidationListener, Observable, ObservableId, ObservableValue};

/// An immutable observable value.
pub struct Constant<T> {
    id: ObservableId,
    value: Rc<T>,
}

impl<T> Constant<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self {
            id: ObservableId::new(),
            value: Rc::new(value),
        }
    }

    /// Borrow the wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Always [`ListenerState::Empty`].
    pub fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }
}

impl<T> Clone for Constant<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> Observable for Constant<T> {
    fn id(&self) -> ObservableId {
        self.id
    }

    fn add_listener(&self, _listener: InvalidationListener) {}

    fn remove_listener(&self, _listener: &InvalidationListener) {}
}

impl<T: Clone> ObservableValue<T> for Constant<T> {
    fn get(&self) -> T {
        (*self.value).clone()
    }

    fn add_change_listener(&self, _listener: ChangeListener<T>) {}

    fn remove_change_listener(&self, _listener: &ChangeListener<T>) {}
}

impl<T: fmt::Debug> fmt::Debug for Constant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constant")
            .field("id", &self.id)
            .field("value", &self.value)
            .finish()
    }
}

pub type BooleanConstant = Constant<bool>;
pub type IntegerConstant = Constant<i32>;
pub type LongConstant = Constant<i64>;
pub type DoubleConstant = Constant<f64>;
pub type StringConstant = Constant<String>;
pub type ObjectConstant<T> = Constant<Option<T>>;
