//! Observable Set
//!
//! [`IndexedSet`] wraps an [`IndexSet`], so iteration follows insertion
//! order. A change carries one [`SetChangeRecord`] per element whose
//! membership differs between the start and the end of the batch: adding
//! and then removing the same element inside one batch reports nothing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::CollectionError;
use crate::reactive::{InvalidationListener, ListenerState, Observable, ObservableId};

use super::change::{fire_change, Change, CollectionListener, CollectionListeners};

/// One element entering or leaving a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "element", rename_all = "snake_case")]
pub enum SetChangeRecord<E> {
    Added(E),
    Removed(E),
}

impl<E> SetChangeRecord<E> {
    pub fn element(&self) -> &E {
        match self {
            Self::Added(element) | Self::Removed(element) => element,
        }
    }
}

impl<E: Clone + Eq + Hash> SetChangeRecord<E> {
    /// Replay this record onto `set`.
    pub fn apply(&self, set: &mut IndexSet<E>) {
        match self {
            Self::Added(element) => {
                set.insert(element.clone());
            }
            Self::Removed(element) => {
                set.shift_remove(element);
            }
        }
    }
}

pub type SetChange<E> = Change<SetChangeRecord<E>>;

pub type SetChangeListener<E> = CollectionListener<SetChangeRecord<E>>;

impl<E> Change<SetChangeRecord<E>> {
    pub fn was_added(&self) -> bool {
        matches!(self.current(), SetChangeRecord::Added(_))
    }

    pub fn was_removed(&self) -> bool {
        matches!(self.current(), SetChangeRecord::Removed(_))
    }

    pub fn element_added(&self) -> Option<&E> {
        match self.current() {
            SetChangeRecord::Added(element) => Some(element),
            SetChangeRecord::Removed(_) => None,
        }
    }

    pub fn element_removed(&self) -> Option<&E> {
        match self.current() {
            SetChangeRecord::Removed(element) => Some(element),
            SetChangeRecord::Added(_) => None,
        }
    }
}

impl<E: Clone + Eq + Hash> Change<SetChangeRecord<E>> {
    /// Replay every record onto `set`.
    pub fn apply_to(&self, set: &mut IndexSet<E>) {
        for record in self.records() {
            record.apply(set);
        }
    }
}

/// An observable set.
///
/// Mutators return `Err(CollectionError::Unsupported)` on read-only
/// implementations.
pub trait ObservableSet<E>: Observable {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, value: &E) -> bool;

    /// A copy of the current elements in iteration order.
    fn to_vec(&self) -> Vec<E>;

    fn add_set_listener(&self, listener: SetChangeListener<E>);

    fn remove_set_listener(&self, listener: &SetChangeListener<E>);

    /// Shape of the listener storage.
    fn listener_state(&self) -> ListenerState;

    /// Add `value`. Returns whether it was absent.
    fn insert(&self, value: E) -> Result<bool, CollectionError>;

    /// Remove `value`. Returns whether it was present.
    fn remove(&self, value: &E) -> Result<bool, CollectionError>;

    fn clear(&self) -> Result<(), CollectionError>;
}

// ----------------------------------------------------------------------------
// IndexedSet
// ----------------------------------------------------------------------------

/// A mutable observable set backed by an [`IndexSet`]. Clones share the
/// same set.
pub struct IndexedSet<E> {
    inner: Rc<IndexedSetInner<E>>,
}

struct IndexedSetInner<E> {
    id: ObservableId,
    values: RefCell<IndexSet<E>>,
    depth: Cell<usize>,
    /// Elements touched in the open batch, with their membership when
    /// first touched.
    touched: RefCell<IndexMap<E, bool>>,
    listeners: RefCell<CollectionListeners<SetChangeRecord<E>>>,
}

impl<E: Clone + Eq + Hash + 'static> IndexedSet<E> {
    pub fn new() -> Self {
        Self::from(IndexSet::new())
    }

    /// Open a batch. Batches nest; the outermost `end_change()` reports.
    pub fn begin_change(&self) {
        self.inner.depth.set(self.inner.depth.get() + 1);
    }

    pub fn end_change(&self) {
        let depth = self.inner.depth.get();
        if depth == 0 {
            tracing::warn!(set = %self.inner.id, "end_change called without a matching begin_change");
            return;
        }
        self.inner.depth.set(depth - 1);
        if depth > 1 {
            return;
        }

        let touched = std::mem::take(&mut *self.inner.touched.borrow_mut());
        let records: Vec<SetChangeRecord<E>> = {
            let values = self.inner.values.borrow();
            touched
                .into_iter()
                .filter_map(|(element, was_present)| {
                    match (was_present, values.contains(&element)) {
                        (false, true) => Some(SetChangeRecord::Added(element)),
                        (true, false) => Some(SetChangeRecord::Removed(element)),
                        _ => None,
                    }
                })
                .collect()
        };
        if !records.is_empty() {
            fire_change(&self.inner.listeners, self, records.into());
        }
    }

    /// Run `f` inside one batch.
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        self.begin_change();
        let result = f(self);
        self.end_change();
        result
    }

    /// Add every element of `values`.
    pub fn insert_all(&self, values: impl IntoIterator<Item = E>) {
        self.batch(|set| {
            for value in values {
                set.insert_value(value);
            }
        });
    }

    /// Keep only the elements matching `keep`. Returns whether anything
    /// was removed.
    pub fn retain<F>(&self, mut keep: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        let doomed: Vec<E> = self
            .inner
            .values
            .borrow()
            .iter()
            .filter(|v| !keep(v))
            .cloned()
            .collect();
        self.batch(|set| {
            for value in &doomed {
                set.remove_value(value);
            }
        });
        !doomed.is_empty()
    }

    fn insert_value(&self, value: E) -> bool {
        self.touch(&value);
        self.begin_change();
        let inserted = self.inner.values.borrow_mut().insert(value);
        self.end_change();
        inserted
    }

    fn remove_value(&self, value: &E) -> bool {
        self.touch(value);
        self.begin_change();
        let removed = self.inner.values.borrow_mut().shift_remove(value);
        self.end_change();
        removed
    }

    fn touch(&self, value: &E) {
        let present = self.inner.values.borrow().contains(value);
        self.inner
            .touched
            .borrow_mut()
            .entry(value.clone())
            .or_insert(present);
    }
}

impl<E: Clone + Eq + Hash + 'static> Observable for IndexedSet<E> {
    fn id(&self) -> ObservableId {
        self.inner.id
    }

    fn add_listener(&self, listener: InvalidationListener) {
        self.inner.listeners.borrow_mut().add_invalidation(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.inner.listeners.borrow_mut().remove_invalidation(listener);
    }
}

impl<E: Clone + Eq + Hash + 'static> ObservableSet<E> for IndexedSet<E> {
    fn len(&self) -> usize {
        self.inner.values.borrow().len()
    }

    fn contains(&self, value: &E) -> bool {
        self.inner.values.borrow().contains(value)
    }

    fn to_vec(&self) -> Vec<E> {
        self.inner.values.borrow().iter().cloned().collect()
    }

    fn add_set_listener(&self, listener: SetChangeListener<E>) {
        self.inner.listeners.borrow_mut().add_change(listener);
    }

    fn remove_set_listener(&self, listener: &SetChangeListener<E>) {
        self.inner.listeners.borrow_mut().remove_change(listener);
    }

    fn listener_state(&self) -> ListenerState {
        self.inner.listeners.borrow().state()
    }

    fn insert(&self, value: E) -> Result<bool, CollectionError> {
        Ok(self.insert_value(value))
    }

    fn remove(&self, value: &E) -> Result<bool, CollectionError> {
        Ok(self.remove_value(value))
    }

    fn clear(&self) -> Result<(), CollectionError> {
        self.retain(|_| false);
        Ok(())
    }
}

impl<E: Clone + Eq + Hash + 'static> Default for IndexedSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<IndexSet<E>> for IndexedSet<E> {
    fn from(values: IndexSet<E>) -> Self {
        Self {
            inner: Rc::new(IndexedSetInner {
                id: ObservableId::new(),
                values: RefCell::new(values),
                depth: Cell::new(0),
                touched: RefCell::new(IndexMap::new()),
                listeners: RefCell::new(CollectionListeners::default()),
            }),
        }
    }
}

impl<E: Eq + Hash> FromIterator<E> for IndexedSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<IndexSet<_>>())
    }
}

impl<E> Clone for IndexedSet<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for IndexedSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedSet")
            .field("id", &self.inner.id)
            .field("values", &*self.inner.values.borrow())
            .finish()
    }
}
