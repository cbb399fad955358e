//! Listener storage.
//!
//! Most observables have no listener at all, and most of the rest have
//! exactly one. [`ListenerHelper`] keeps those cases allocation-free and
//! only moves to growable storage once a second listener arrives:
//!
//! - `Empty`: nothing registered.
//! - `SingleInvalidation` / `SingleChange`: one listener, stored inline.
//! - `Generic`: two arrays, one per listener kind.
//!
//! The arrays in `Generic` sit behind `Rc`. Dispatch takes a [`Snapshot`],
//! which clones the `Rc`s instead of the arrays. A listener that adds or
//! removes listeners while the snapshot is alive goes through
//! `Rc::make_mut`, which copies the array only in that case. The current
//! dispatch keeps iterating the old array: listeners removed during a
//! dispatch are still notified in that round, listeners added during it are
//! not.

use std::rc::Rc;

use super::observable::InvalidationListener;

/// Shape of an observable's listener storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// No listener registered, nothing allocated.
    Empty,
    /// Exactly one listener, stored inline.
    Single,
    /// Two or more listeners in growable storage.
    Many,
}

/// Storage for invalidation listeners plus one other listener kind `L`
/// (value-change listeners for scalars, change listeners for collections).
#[derive(Debug, Clone)]
pub(crate) enum ListenerHelper<L> {
    Empty,
    SingleInvalidation(InvalidationListener),
    SingleChange(L),
    Generic(Generic<L>),
}

#[derive(Debug, Clone)]
pub(crate) struct Generic<L> {
    invalidation: Rc<Vec<InvalidationListener>>,
    change: Rc<Vec<L>>,
}

impl<L> Default for ListenerHelper<L> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<L: Clone + PartialEq> ListenerHelper<L> {
    pub(crate) fn add_invalidation(&mut self, listener: InvalidationListener) {
        *self = match std::mem::take(self) {
            Self::Empty => Self::SingleInvalidation(listener),
            Self::SingleInvalidation(first) => Self::generic(vec![first, listener], Vec::new()),
            Self::SingleChange(change) => Self::generic(vec![listener], vec![change]),
            Self::Generic(mut generic) => {
                Rc::make_mut(&mut generic.invalidation).push(listener);
                Self::Generic(generic)
            }
        };
    }

    pub(crate) fn remove_invalidation(&mut self, listener: &InvalidationListener) {
        match self {
            Self::SingleInvalidation(current) if current == listener => *self = Self::Empty,
            Self::Generic(generic) => {
                if let Some(pos) = generic.invalidation.iter().position(|l| l == listener) {
                    Rc::make_mut(&mut generic.invalidation).remove(pos);
                    self.collapse();
                }
            }
            _ => {}
        }
    }

    pub(crate) fn add_change(&mut self, listener: L) {
        *self = match std::mem::take(self) {
            Self::Empty => Self::SingleChange(listener),
            Self::SingleInvalidation(invalidation) => {
                Self::generic(vec![invalidation], vec![listener])
            }
            Self::SingleChange(first) => Self::generic(Vec::new(), vec![first, listener]),
            Self::Generic(mut generic) => {
                Rc::make_mut(&mut generic.change).push(listener);
                Self::Generic(generic)
            }
        };
    }

    pub(crate) fn remove_change(&mut self, listener: &L) {
        match self {
            Self::SingleChange(current) if current == listener => *self = Self::Empty,
            Self::Generic(generic) => {
                if let Some(pos) = generic.change.iter().position(|l| l == listener) {
                    Rc::make_mut(&mut generic.change).remove(pos);
                    self.collapse();
                }
            }
            _ => {}
        }
    }

    /// Fall back to the inline shapes once `Generic` holds one listener or
    /// none.
    fn collapse(&mut self) {
        let Self::Generic(generic) = self else {
            return;
        };
        let collapsed = match (generic.invalidation.len(), generic.change.len()) {
            (0, 0) => Self::Empty,
            (1, 0) => Self::SingleInvalidation(generic.invalidation[0].clone()),
            (0, 1) => Self::SingleChange(generic.change[0].clone()),
            _ => return,
        };
        *self = collapsed;
    }

    fn generic(invalidation: Vec<InvalidationListener>, change: Vec<L>) -> Self {
        Self::Generic(Generic {
            invalidation: Rc::new(invalidation),
            change: Rc::new(change),
        })
    }
}

impl<L> ListenerHelper<L> {
    pub(crate) fn state(&self) -> ListenerState {
        match self {
            Self::Empty => ListenerState::Empty,
            Self::SingleInvalidation(_) | Self::SingleChange(_) => ListenerState::Single,
            Self::Generic(_) => ListenerState::Many,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) fn has_change_listeners(&self) -> bool {
        match self {
            Self::SingleChange(_) => true,
            Self::Generic(generic) => !generic.change.is_empty(),
            _ => false,
        }
    }
}

impl<L: Clone> ListenerHelper<L> {
    /// Capture the current listeners for one dispatch round.
    pub(crate) fn snapshot(&self) -> Snapshot<L> {
        match self {
            Self::Empty => Snapshot {
                invalidation: Listeners::None,
                change: Listeners::None,
            },
            Self::SingleInvalidation(listener) => Snapshot {
                invalidation: Listeners::One(listener.clone()),
                change: Listeners::None,
            },
            Self::SingleChange(listener) => Snapshot {
                invalidation: Listeners::None,
                change: Listeners::One(listener.clone()),
            },
            Self::Generic(generic) => Snapshot {
                invalidation: Listeners::Many(Rc::clone(&generic.invalidation)),
                change: Listeners::Many(Rc::clone(&generic.change)),
            },
        }
    }
}

/// The listeners of one dispatch round.
pub(crate) struct Snapshot<L> {
    invalidation: Listeners<InvalidationListener>,
    change: Listeners<L>,
}

impl<L> Snapshot<L> {
    pub(crate) fn invalidation(&self) -> &[InvalidationListener] {
        self.invalidation.as_slice()
    }

    pub(crate) fn change(&self) -> &[L] {
        self.change.as_slice()
    }
}

enum Listeners<L> {
    None,
    One(L),
    Many(Rc<Vec<L>>),
}

impl<L> Listeners<L> {
    fn as_slice(&self) -> &[L] {
        match self {
            Self::None => &[],
            Self::One(listener) => std::slice::from_ref(listener),
            Self::Many(listeners) => listeners.as_slice(),
        }
    }
}
