//! Property Implementation
//!
//! A Property is a writable observable value: the source end of the
//! dependency graph. Bindings read properties; code outside the graph writes
//! them.
//!
//! # Validity
//!
//! A property tracks whether its current value has been read since the last
//! write. Writing a different value marks it invalid and fires its
//! listeners, but only on the valid → invalid transition. Further writes
//! before anyone calls `get()` change the value silently, because every
//! dependent is already invalid and will read the latest value anyway.
//!
//! # Sharing
//!
//! Clones share state: a clone handed to a binding sees every write made
//! through the original.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::binding::BindingValue;
use super::expression::{fire_value_changed, ExpressionHelper};
use super::listener::ListenerState;
use super::observable::{ChangeListener, InvalidationListener, Observable, ObservableId, ObservableValue};

/// A writable observable value.
///
/// # Example
///
/// ```rust
/// use jux_core::prelude::*;
///
/// let count = IntegerProperty::new(0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Property<T: BindingValue> {
    inner: Rc<PropertyInner<T>>,
}

struct PropertyInner<T> {
    id: ObservableId,
    value: RefCell<T>,
    valid: Cell<bool>,
    helper: RefCell<ExpressionHelper<T>>,
}

impl<T: BindingValue> Property<T> {
    /// Create a property holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                id: ObservableId::new(),
                value: RefCell::new(value),
                valid: Cell::new(true),
                helper: RefCell::new(ExpressionHelper::default()),
            }),
        }
    }

    /// Store `value`. Listeners fire if it differs from the current value
    /// and the property was valid.
    pub fn set(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        *self.inner.value.borrow_mut() = value;
        self.mark_invalid();
    }

    /// Replace the value with `f(&current)`.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.inner.value.borrow());
        self.set(next);
    }

    /// Whether the current value has been read since the last write.
    pub fn is_valid(&self) -> bool {
        self.inner.valid.get()
    }

    /// Shape of the listener storage.
    pub fn listener_state(&self) -> ListenerState {
        self.inner.helper.borrow().state()
    }

    fn mark_invalid(&self) {
        if self.inner.valid.get() {
            self.inner.valid.set(false);
            fire_value_changed(&self.inner.helper, self);
        }
    }
}

impl<T: BindingValue> Observable for Property<T> {
    fn id(&self) -> ObservableId {
        self.inner.id
    }

    fn add_listener(&self, listener: InvalidationListener) {
        self.inner.helper.borrow_mut().add_invalidation(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.inner.helper.borrow_mut().remove_invalidation(listener);
    }
}

impl<T: BindingValue> ObservableValue<T> for Property<T> {
    fn get(&self) -> T {
        self.inner.valid.set(true);
        self.inner.value.borrow().clone()
    }

    fn add_change_listener(&self, listener: ChangeListener<T>) {
        let current = self.get();
        self.inner.helper.borrow_mut().add_change(listener, current);
    }

    fn remove_change_listener(&self, listener: &ChangeListener<T>) {
        self.inner.helper.borrow_mut().remove_change(listener);
    }
}

impl<T: BindingValue> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: BindingValue + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: BindingValue + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("valid", &self.inner.valid.get())
            .finish()
    }
}

pub type BooleanProperty = Property<bool>;
pub type IntegerProperty = Property<i32>;
pub type LongProperty = Property<i64>;
pub type DoubleProperty = Property<f64>;
pub type StringProperty = Property<String>;
pub type ObjectProperty<T> = Property<Option<T>>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
