//! Observable contract and listener types.
//!
//! Every reactive entity in the engine implements [`Observable`]: it can be
//! watched through [`InvalidationListener`]s, which carry no payload. Scalar
//! observables additionally implement [`ObservableValue`], exposing their
//! current value and accepting [`ChangeListener`]s that receive the old and
//! new value.
//!
//! Listeners are compared by identity. Cloning a listener yields a handle
//! that removes the same registration; two listeners built from identical
//! closures are distinct.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of an observable.
///
/// Clones of a handle type (a property, a binding, a list) share the id of
/// the original. Short-circuit observers use it to tell which dependency
/// fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservableId(u64);

impl ObservableId {
    /// Generate a new unique id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ObservableId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObservableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can be watched for invalidation.
pub trait Observable {
    /// Identity of this observable.
    fn id(&self) -> ObservableId;

    /// Register an invalidation listener. Registering the same listener
    /// twice notifies it twice.
    fn add_listener(&self, listener: InvalidationListener);

    /// Remove one registration of `listener`, if present.
    fn remove_listener(&self, listener: &InvalidationListener);
}

/// An observable holding a value of type `T`.
pub trait ObservableValue<T>: Observable {
    /// The current value.
    fn get(&self) -> T;

    /// Register a value-change listener.
    fn add_change_listener(&self, listener: ChangeListener<T>);

    /// Remove one registration of `listener`, if present.
    fn remove_change_listener(&self, listener: &ChangeListener<T>);
}

/// A shared, type-erased dependency of a binding.
pub type Dependency = Rc<dyn Observable>;

/// Wrap an observable handle as a [`Dependency`].
pub fn dependency<O>(observable: &O) -> Dependency
where
    O: Observable + Clone + 'static,
{
    Rc::new(observable.clone())
}

/// Callback notified with no payload when an observable becomes invalid.
#[derive(Clone)]
pub struct InvalidationListener(Rc<dyn Fn(&dyn Observable)>);

impl InvalidationListener {
    /// Create a listener from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Observable) + 'static,
    {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn invalidated(&self, observable: &dyn Observable) {
        (self.0)(observable)
    }
}

impl PartialEq for InvalidationListener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for InvalidationListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidationListener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

type ChangeFn<T> = dyn Fn(&dyn ObservableValue<T>, &T, &T);

/// Callback notified with the old and new value when a scalar observable
/// changes.
pub struct ChangeListener<T>(Rc<ChangeFn<T>>);

impl<T> ChangeListener<T> {
    /// Create a listener from a closure receiving `(observable, old, new)`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn ObservableValue<T>, &T, &T) + 'static,
    {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn changed(&self, observable: &dyn ObservableValue<T>, old: &T, new: &T) {
        (self.0)(observable, old, new)
    }
}

impl<T> Clone for ChangeListener<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for ChangeListener<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> fmt::Debug for ChangeListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeListener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn observable_ids_are_unique() {
        let id1 = ObservableId::new();
        let id2 = ObservableId::new();
        let id3 = ObservableId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn listener_identity_follows_clones() {
        let a = InvalidationListener::new(|_| {});
        let b = a.clone();
        let c = InvalidationListener::new(|_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn change_listener_receives_old_and_new() {
        struct Fixed;
        impl Observable for Fixed {
            fn id(&self) -> ObservableId {
                ObservableId::from_raw_for_tests(0)
            }
            fn add_listener(&self, _: InvalidationListener) {}
            fn remove_listener(&self, _: &InvalidationListener) {}
        }
        impl ObservableValue<i32> for Fixed {
            fn get(&self) -> i32 {
                0
            }
            fn add_change_listener(&self, _: ChangeListener<i32>) {}
            fn remove_change_listener(&self, _: &ChangeListener<i32>) {}
        }

        let seen = Rc::new(Cell::new((0, 0)));
        let seen_clone = seen.clone();
        let listener = ChangeListener::new(move |_, old: &i32, new: &i32| {
            seen_clone.set((*old, *new));
        });

        listener.changed(&Fixed, &1, &2);
        assert_eq!(seen.get(), (1, 2));
    }

    impl ObservableId {
        fn from_raw_for_tests(raw: u64) -> Self {
            Self(raw)
        }
    }
}
