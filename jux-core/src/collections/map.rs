//! Observable Map
//!
//! [`IndexedMap`] wraps an [`IndexMap`]. A change carries one
//! [`MapChangeRecord`] per key whose value differs between the start and
//! the end of the batch. Two puts on the same key inside one batch report
//! the value from before the first put and the value after the last one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CollectionError;
use crate::reactive::{InvalidationListener, ListenerState, Observable, ObservableId};

use super::change::{fire_change, Change, CollectionListener, CollectionListeners};

/// The value of one key changing. `removed` is the previous value and
/// `added` the new one; `None` means the key was (or became) absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapChangeRecord<K, V> {
    pub key: K,
    pub removed: Option<V>,
    pub added: Option<V>,
}

impl<K: Clone + Eq + Hash, V: Clone> MapChangeRecord<K, V> {
    /// Replay this record onto `map`.
    pub fn apply(&self, map: &mut IndexMap<K, V>) {
        match &self.added {
            Some(value) => {
                map.insert(self.key.clone(), value.clone());
            }
            None => {
                map.shift_remove(&self.key);
            }
        }
    }
}

pub type MapChange<K, V> = Change<MapChangeRecord<K, V>>;

pub type MapChangeListener<K, V> = CollectionListener<MapChangeRecord<K, V>>;

impl<K, V> Change<MapChangeRecord<K, V>> {
    pub fn key(&self) -> &K {
        &self.current().key
    }

    pub fn was_added(&self) -> bool {
        self.current().added.is_some()
    }

    pub fn was_removed(&self) -> bool {
        self.current().removed.is_some()
    }

    pub fn value_added(&self) -> Option<&V> {
        self.current().added.as_ref()
    }

    pub fn value_removed(&self) -> Option<&V> {
        self.current().removed.as_ref()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Change<MapChangeRecord<K, V>> {
    /// Replay every record onto `map`.
    pub fn apply_to(&self, map: &mut IndexMap<K, V>) {
        for record in self.records() {
            record.apply(map);
        }
    }
}

/// An observable map.
///
/// Mutators return `Err(CollectionError::Unsupported)` on read-only
/// implementations.
pub trait ObservableMap<K, V>: Observable {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, key: &K) -> bool;

    fn get(&self, key: &K) -> Option<V>;

    /// A copy of the current entries in iteration order.
    fn entries(&self) -> Vec<(K, V)>;

    fn keys(&self) -> Vec<K> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    fn values(&self) -> Vec<V> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    fn add_map_listener(&self, listener: MapChangeListener<K, V>);

    fn remove_map_listener(&self, listener: &MapChangeListener<K, V>);

    /// Shape of the listener storage.
    fn listener_state(&self) -> ListenerState;

    /// Store `value` under `key`, returning the previous value.
    fn insert(&self, key: K, value: V) -> Result<Option<V>, CollectionError>;

    /// Remove `key`, returning its value.
    fn remove(&self, key: &K) -> Result<Option<V>, CollectionError>;

    fn clear(&self) -> Result<(), CollectionError>;
}

// ----------------------------------------------------------------------------
// IndexedMap
// ----------------------------------------------------------------------------

/// A mutable observable map backed by an [`IndexMap`]. Clones share the
/// same map.
pub struct IndexedMap<K, V> {
    inner: Rc<IndexedMapInner<K, V>>,
}

struct IndexedMapInner<K, V> {
    id: ObservableId,
    entries: RefCell<IndexMap<K, V>>,
    depth: Cell<usize>,
    /// Keys touched in the open batch, with their value when first
    /// touched.
    touched: RefCell<IndexMap<K, Option<V>>>,
    listeners: RefCell<CollectionListeners<MapChangeRecord<K, V>>>,
}

impl<K, V> IndexedMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    pub fn new() -> Self {
        Self::from(IndexMap::new())
    }

    /// Open a batch. Batches nest; the outermost `end_change()` reports.
    pub fn begin_change(&self) {
        self.inner.depth.set(self.inner.depth.get() + 1);
    }

    pub fn end_change(&self) {
        let depth = self.inner.depth.get();
        if depth == 0 {
            tracing::warn!(map = %self.inner.id, "end_change called without a matching begin_change");
            return;
        }
        self.inner.depth.set(depth - 1);
        if depth > 1 {
            return;
        }

        let touched = std::mem::take(&mut *self.inner.touched.borrow_mut());
        let records: Vec<MapChangeRecord<K, V>> = {
            let entries = self.inner.entries.borrow();
            touched
                .into_iter()
                .filter_map(|(key, removed)| {
                    let added = entries.get(&key).cloned();
                    (removed != added).then_some(MapChangeRecord {
                        key,
                        removed,
                        added,
                    })
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

    /// Store every entry of `entries`.
    pub fn insert_all(&self, entries: impl IntoIterator<Item = (K, V)>) {
        self.batch(|map| {
            for (key, value) in entries {
                map.insert_entry(key, value);
            }
        });
    }

    /// Keep only the entries matching `keep`. Returns whether anything was
    /// removed.
    pub fn retain<F>(&self, mut keep: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<K> = self
            .inner
            .entries
            .borrow()
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        self.batch(|map| {
            for key in &doomed {
                map.remove_entry(key);
            }
        });
        !doomed.is_empty()
    }

    fn insert_entry(&self, key: K, value: V) -> Option<V> {
        self.touch(&key);
        self.begin_change();
        let previous = self.inner.entries.borrow_mut().insert(key, value);
        self.end_change();
        previous
    }

    fn remove_entry(&self, key: &K) -> Option<V> {
        self.touch(key);
        self.begin_change();
        let previous = self.inner.entries.borrow_mut().shift_remove(key);
        self.end_change();
        previous
    }

    fn touch(&self, key: &K) {
        let current = self.inner.entries.borrow().get(key).cloned();
        self.inner
            .touched
            .borrow_mut()
            .entry(key.clone())
            .or_insert(current);
    }
}

impl<K, V> Observable for IndexedMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
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

impl<K, V> ObservableMap<K, V> for IndexedMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.entries.borrow().get(key).cloned()
    }

    fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn add_map_listener(&self, listener: MapChangeListener<K, V>) {
        self.inner.listeners.borrow_mut().add_change(listener);
    }

    fn remove_map_listener(&self, listener: &MapChangeListener<K, V>) {
        self.inner.listeners.borrow_mut().remove_change(listener);
    }

    fn listener_state(&self) -> ListenerState {
        self.inner.listeners.borrow().state()
    }

    fn insert(&self, key: K, value: V) -> Result<Option<V>, CollectionError> {
        Ok(self.insert_entry(key, value))
    }

    fn remove(&self, key: &K) -> Result<Option<V>, CollectionError> {
        Ok(self.remove_entry(key))
    }

    fn clear(&self) -> Result<(), CollectionError> {
        self.retain(|_, _| false);
        Ok(())
    }
}

impl<K, V> Default for IndexedMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<IndexMap<K, V>> for IndexedMap<K, V> {
    fn from(entries: IndexMap<K, V>) -> Self {
        Self {
            inner: Rc::new(IndexedMapInner {
                id: ObservableId::new(),
                entries: RefCell::new(entries),
                depth: Cell::new(0),
                touched: RefCell::new(IndexMap::new()),
                listeners: RefCell::new(CollectionListeners::default()),
            }),
        }
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for IndexedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<IndexMap<_, _>>())
    }
}

impl<K, V> Clone for IndexedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IndexedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedMap")
            .field("id", &self.inner.id)
            .field("entries", &*self.inner.entries.borrow())
            .finish()
    }
}
