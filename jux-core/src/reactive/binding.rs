//! Binding Implementation
//!
//! A Binding is a derived observable value with a lazily cached result.
//!
//! # How Bindings Work
//!
//! 1. On construction the binding registers an observer on each of its
//!    dependencies. The compute function does not run.
//!
//! 2. The first `get()` runs the compute function, caches the result and
//!    marks the binding valid. Later reads return the cache.
//!
//! 3. When a dependency fires an invalidation, the observer calls
//!    `invalidate()`. A valid binding becomes invalid and fires its own
//!    listeners; an invalid binding ignores the call, which keeps wide
//!    dependency fan-out cheap.
//!
//! 4. If value-change listeners are registered, firing reads the new value
//!    right away so the listeners get old and new values. Without them the
//!    binding stays lazy.
//!
//! # Disposal
//!
//! The observer holds a strong reference to the binding, so a dependency
//! keeps every binding built on it alive, along with the listeners
//! registered on that binding. Call `dispose()` to unregister from all
//! dependencies once a binding is no longer needed.
//!
//! # Errors
//!
//! Compute functions return [`ComputeResult`]. An error, or a panic inside
//! the compute function, is logged as a warning and the domain's fallback
//! (`T::default()`: `false`, `0`, `0.0`, `""` or `None`) is cached as the
//! value. The binding still becomes valid.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::ComputeResult;

use super::dispatch::panic_message;
use super::expression::{fire_value_changed, ExpressionHelper};
use super::listener::ListenerState;
use super::observable::{
    ChangeListener, Dependency, InvalidationListener, Observable, ObservableId, ObservableValue,
};

/// Value types a binding can hold.
///
/// `Default` supplies the fallback cached when the compute function fails.
pub trait BindingValue: Clone + PartialEq + Default + 'static {}

impl<T: Clone + PartialEq + Default + 'static> BindingValue for T {}

type ComputeFn<T> = dyn Fn() -> ComputeResult<T>;

/// A lazily evaluated value derived from other observables.
///
/// # Example
///
/// ```rust
/// use jux_core::prelude::*;
///
/// let width = IntegerProperty::new(3);
/// let w = width.clone();
/// let area = Binding::with_dependencies(move || Ok(w.get() * w.get()), [dependency(&width)]);
///
/// assert_eq!(area.get(), 9);
/// width.set(4);
/// assert_eq!(area.get(), 16);
/// area.dispose();
/// ```
pub struct Binding<T: BindingValue> {
    inner: Rc<BindingInner<T>>,
}

struct BindingInner<T> {
    id: ObservableId,
    compute: Box<ComputeFn<T>>,
    value: RefCell<T>,
    valid: Cell<bool>,
    helper: RefCell<ExpressionHelper<T>>,
    dependencies: RefCell<SmallVec<[Dependency; 2]>>,
    /// The listener registered on every dependency.
    observer: RefCell<Option<InvalidationListener>>,
    disposed: Cell<bool>,
}

impl<T: BindingValue> Binding<T> {
    /// Create an unbound binding. It only becomes invalid through explicit
    /// `invalidate()` calls until dependencies are bound.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> ComputeResult<T> + 'static,
    {
        Self {
            inner: Rc::new(BindingInner {
                id: ObservableId::new(),
                compute: Box::new(compute),
                value: RefCell::new(T::default()),
                valid: Cell::new(false),
                helper: RefCell::new(ExpressionHelper::default()),
                dependencies: RefCell::new(SmallVec::new()),
                observer: RefCell::new(None),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Create a binding that is invalidated whenever any of `dependencies`
    /// fires.
    pub fn with_dependencies<F, I>(compute: F, dependencies: I) -> Self
    where
        F: Fn() -> ComputeResult<T> + 'static,
        I: IntoIterator<Item = Dependency>,
    {
        let binding = Self::new(compute);
        binding.bind(dependencies);
        binding
    }

    /// Create a binding whose observer consults `filter` before
    /// invalidating. `filter` receives the binding and the dependency that
    /// fired; returning `false` suppresses the invalidation.
    pub(crate) fn with_observer<F, I, P>(compute: F, dependencies: I, filter: P) -> Self
    where
        F: Fn() -> ComputeResult<T> + 'static,
        I: IntoIterator<Item = Dependency>,
        P: Fn(&Binding<T>, &dyn Observable) -> bool + 'static,
    {
        let binding = Self::new(compute);
        let target = binding.clone();
        *binding.inner.observer.borrow_mut() = Some(InvalidationListener::new(move |source| {
            if filter(&target, source) {
                target.invalidate();
            }
        }));
        binding.bind(dependencies);
        binding
    }

    /// Start observing `dependencies`. Binding a dependency twice registers
    /// the observer twice.
    pub fn bind<I>(&self, dependencies: I)
    where
        I: IntoIterator<Item = Dependency>,
    {
        if self.inner.disposed.get() {
            tracing::warn!(binding = %self.inner.id, "bind called on a disposed binding");
            return;
        }
        let observer = self.observer();
        for dependency in dependencies {
            dependency.add_listener(observer.clone());
            self.inner.dependencies.borrow_mut().push(dependency);
        }
    }

    /// Stop observing the dependencies with the ids of `dependencies`. One
    /// registration is removed per id given.
    pub fn unbind(&self, dependencies: &[Dependency]) {
        let Some(observer) = self.inner.observer.borrow().clone() else {
            return;
        };
        for dependency in dependencies {
            let removed = {
                let mut bound = self.inner.dependencies.borrow_mut();
                bound
                    .iter()
                    .position(|d| d.id() == dependency.id())
                    .map(|pos| bound.remove(pos))
            };
            if let Some(bound) = removed {
                bound.remove_listener(&observer);
            }
        }
    }

    /// Unregister from every dependency. The binding must not be used
    /// afterwards.
    pub fn dispose(&self) {
        let dependencies = std::mem::take(&mut *self.inner.dependencies.borrow_mut());
        let observer = self.inner.observer.borrow_mut().take();
        if let Some(observer) = observer {
            for dependency in &dependencies {
                dependency.remove_listener(&observer);
            }
        }
        self.inner.disposed.set(true);
    }

    /// Whether `dispose()` has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// The observables this binding is registered on.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.inner.dependencies.borrow().iter().cloned().collect()
    }

    /// Whether the cached value is current.
    pub fn is_valid(&self) -> bool {
        self.inner.valid.get()
    }

    /// Mark the cached value stale and notify listeners. Does nothing if
    /// the binding is already invalid.
    pub fn invalidate(&self) {
        if self.inner.valid.get() {
            self.inner.valid.set(false);
            fire_value_changed(&self.inner.helper, self);
        }
    }

    /// Shape of the listener storage.
    pub fn listener_state(&self) -> ListenerState {
        self.inner.helper.borrow().state()
    }

    /// Whether value-change listeners are registered, which makes
    /// invalidation recompute eagerly.
    pub fn has_change_listeners(&self) -> bool {
        self.inner.helper.borrow().has_change_listeners()
    }

    fn observer(&self) -> InvalidationListener {
        self.inner
            .observer
            .borrow_mut()
            .get_or_insert_with(|| {
                let target = self.clone();
                InvalidationListener::new(move |_| target.invalidate())
            })
            .clone()
    }

    fn compute(&self) -> T {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.inner.compute)())) {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                tracing::warn!(
                    binding = %self.inner.id,
                    error = %err,
                    "binding computation failed, using fallback value"
                );
                T::default()
            }
            Err(payload) => {
                tracing::warn!(
                    binding = %self.inner.id,
                    panic = %panic_message(payload.as_ref()),
                    "binding computation panicked, using fallback value"
                );
                T::default()
            }
        }
    }
}

impl<T: BindingValue> Observable for Binding<T> {
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

impl<T: BindingValue> ObservableValue<T> for Binding<T> {
    /// Return the cached value, computing it first if the binding is
    /// invalid.
    fn get(&self) -> T {
        if !self.inner.valid.get() {
            let value = self.compute();
            *self.inner.value.borrow_mut() = value;
            self.inner.valid.set(true);
        }
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

impl<T: BindingValue> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: BindingValue + fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.inner.id)
            .field("valid", &self.inner.valid.get())
            .field("value", &*self.inner.value.borrow())
            .field("dependency_count", &self.inner.dependencies.borrow().len())
            .finish()
    }
}

pub type BooleanBinding = Binding<bool>;
pub type IntegerBinding = Binding<i32>;
pub type LongBinding = Binding<i64>;
pub type DoubleBinding = Binding<f64>;
pub type StringBinding = Binding<String>;
pub type ObjectBinding<T> = Binding<Option<T>>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
