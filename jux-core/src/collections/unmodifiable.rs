//! Read-only views.
//!
//! An unmodifiable wrapper registers a relay listener on its source and
//! re-broadcasts every source change to its own listeners, so a view can
//! be observed like the collection behind it. Every mutator fails with
//! [`CollectionError::Unsupported`].
//!
//! The relay holds the wrapper weakly. Dropping the last handle of a
//! wrapper unregisters the relay from the source.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::CollectionError;
use crate::reactive::{InvalidationListener, ListenerState, Observable, ObservableId};

use super::change::{
    fire_change, Change, CollectionListener, CollectionListeners, ListChangeListener,
    ListChangeRecord,
};
use super::list::ObservableList;
use super::map::{MapChangeListener, MapChangeRecord, ObservableMap};
use super::set::{ObservableSet, SetChangeListener, SetChangeRecord};

/// State shared by the wrappers: identity, own listeners and the listener
/// registered on the source.
struct Relay<R> {
    id: ObservableId,
    listeners: RefCell<CollectionListeners<R>>,
    listener: CollectionListener<R>,
}

impl<R: 'static> Relay<R> {
    /// `forward` runs for every source change while the wrapper whose
    /// inner state is behind `weak` is alive.
    fn new<T, F>(weak: &Weak<T>, forward: F) -> Self
    where
        T: 'static,
        F: Fn(Rc<T>, Rc<[R]>) + 'static,
    {
        let weak = weak.clone();
        Self {
            id: ObservableId::new(),
            listeners: RefCell::new(CollectionListeners::default()),
            listener: CollectionListener::new(move |change: &mut Change<R>| {
                if let Some(inner) = weak.upgrade() {
                    forward(inner, change.shared_records());
                }
            }),
        }
    }

    fn add_invalidation(&self, listener: InvalidationListener) {
        self.listeners.borrow_mut().add_invalidation(listener);
    }

    fn remove_invalidation(&self, listener: &InvalidationListener) {
        self.listeners.borrow_mut().remove_invalidation(listener);
    }

    fn add_change(&self, listener: CollectionListener<R>) {
        self.listeners.borrow_mut().add_change(listener);
    }

    fn remove_change(&self, listener: &CollectionListener<R>) {
        self.listeners.borrow_mut().remove_change(listener);
    }

    fn state(&self) -> ListenerState {
        self.listeners.borrow().state()
    }
}

fn unsupported<T>() -> Result<T, CollectionError> {
    Err(CollectionError::Unsupported("collection is unmodifiable"))
}

// ----------------------------------------------------------------------------
// List
// ----------------------------------------------------------------------------

/// A read-only, observable view of another list. Clones share the view.
pub struct UnmodifiableList<E> {
    inner: Rc<UnmodifiableListInner<E>>,
}

struct UnmodifiableListInner<E> {
    source: Rc<dyn ObservableList<E>>,
    relay: Relay<ListChangeRecord<E>>,
}

impl<E: Clone + 'static> UnmodifiableList<E> {
    pub fn new<L>(source: &L) -> Self
    where
        L: ObservableList<E> + Clone + 'static,
    {
        let source: Rc<dyn ObservableList<E>> = Rc::new(source.clone());
        let inner = Rc::new_cyclic(|weak| UnmodifiableListInner {
            source: Rc::clone(&source),
            relay: Relay::new(weak, |inner, records| {
                let view = UnmodifiableList { inner };
                fire_change(&view.inner.relay.listeners, &view, records);
            }),
        });
        source.add_list_listener(inner.relay.listener.clone());
        Self { inner }
    }
}

impl<E> Drop for UnmodifiableListInner<E> {
    fn drop(&mut self) {
        self.source.remove_list_listener(&self.relay.listener);
    }
}

impl<E: Clone + 'static> Observable for UnmodifiableList<E> {
    fn id(&self) -> ObservableId {
        self.inner.relay.id
    }

    fn add_listener(&self, listener: InvalidationListener) {
        self.inner.relay.add_invalidation(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.inner.relay.remove_invalidation(listener);
    }
}

impl<E: Clone + 'static> ObservableList<E> for UnmodifiableList<E> {
    fn len(&self) -> usize {
        self.inner.source.len()
    }

    fn get(&self, index: usize) -> Option<E> {
        self.inner.source.get(index)
    }

    fn to_vec(&self) -> Vec<E> {
        self.inner.source.to_vec()
    }

    fn add_list_listener(&self, listener: ListChangeListener<E>) {
        self.inner.relay.add_change(listener);
    }

    fn remove_list_listener(&self, listener: &ListChangeListener<E>) {
        self.inner.relay.remove_change(listener);
    }

    fn listener_state(&self) -> ListenerState {
        self.inner.relay.state()
    }

    fn insert_all(&self, _index: usize, _values: Vec<E>) -> Result<(), CollectionError> {
        unsupported()
    }

    fn remove(&self, _index: usize) -> Result<E, CollectionError> {
        unsupported()
    }

    fn remove_range(&self, _from: usize, _to: usize) -> Result<(), CollectionError> {
        unsupported()
    }

    fn set(&self, _index: usize, _value: E) -> Result<E, CollectionError> {
        unsupported()
    }

    fn set_all(&self, _values: Vec<E>) -> Result<(), CollectionError> {
        unsupported()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        unsupported()
    }
}

impl<E> Clone for UnmodifiableList<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for UnmodifiableList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmodifiableList")
            .field("id", &self.inner.relay.id)
            .field("source", &self.inner.source.id())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Set
// ----------------------------------------------------------------------------

/// A read-only, observable view of another set.
pub struct UnmodifiableSet<E> {
    inner: Rc<UnmodifiableSetInner<E>>,
}

struct UnmodifiableSetInner<E> {
    source: Rc<dyn ObservableSet<E>>,
    relay: Relay<SetChangeRecord<E>>,
}

impl<E: Clone + 'static> UnmodifiableSet<E> {
    pub fn new<S>(source: &S) -> Self
    where
        S: ObservableSet<E> + Clone + 'static,
    {
        let source: Rc<dyn ObservableSet<E>> = Rc::new(source.clone());
        let inner = Rc::new_cyclic(|weak| UnmodifiableSetInner {
            source: Rc::clone(&source),
            relay: Relay::new(weak, |inner, records| {
                let view = UnmodifiableSet { inner };
                fire_change(&view.inner.relay.listeners, &view, records);
            }),
        });
        source.add_set_listener(inner.relay.listener.clone());
        Self { inner }
    }
}

impl<E> Drop for UnmodifiableSetInner<E> {
    fn drop(&mut self) {
        self.source.remove_set_listener(&self.relay.listener);
    }
}

impl<E: Clone + 'static> Observable for UnmodifiableSet<E> {
    fn id(&self) -> ObservableId {
        self.inner.relay.id
    }

    fn add_listener(&self, listener: InvalidationListener) {
        self.inner.relay.add_invalidation(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.inner.relay.remove_invalidation(listener);
    }
}

impl<E: Clone + 'static> ObservableSet<E> for UnmodifiableSet<E> {
    fn len(&self) -> usize {
        self.inner.source.len()
    }

    fn contains(&self, value: &E) -> bool {
        self.inner.source.contains(value)
    }

    fn to_vec(&self) -> Vec<E> {
        self.inner.source.to_vec()
    }

    fn add_set_listener(&self, listener: SetChangeListener<E>) {
        self.inner.relay.add_change(listener);
    }

    fn remove_set_listener(&self, listener: &SetChangeListener<E>) {
        self.inner.relay.remove_change(listener);
    }

    fn listener_state(&self) -> ListenerState {
        self.inner.relay.state()
    }

    fn insert(&self, _value: E) -> Result<bool, CollectionError> {
        unsupported()
    }

    fn remove(&self, _value: &E) -> Result<bool, CollectionError> {
        unsupported()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        unsupported()
    }
}

impl<E> Clone for UnmodifiableSet<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for UnmodifiableSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmodifiableSet")
            .field("id", &self.inner.relay.id)
            .field("source", &self.inner.source.id())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Map
// ----------------------------------------------------------------------------

/// A read-only, observable view of another map.
pub struct UnmodifiableMap<K, V> {
    inner: Rc<UnmodifiableMapInner<K, V>>,
}

struct UnmodifiableMapInner<K, V> {
    source: Rc<dyn ObservableMap<K, V>>,
    relay: Relay<MapChangeRecord<K, V>>,
}

impl<K: Clone + 'static, V: Clone + 'static> UnmodifiableMap<K, V> {
    pub fn new<M>(source: &M) -> Self
    where
        M: ObservableMap<K, V> + Clone + 'static,
    {
        let source: Rc<dyn ObservableMap<K, V>> = Rc::new(source.clone());
        let inner = Rc::new_cyclic(|weak| UnmodifiableMapInner {
            source: Rc::clone(&source),
            relay: Relay::new(weak, |inner, records| {
                let view = UnmodifiableMap { inner };
                fire_change(&view.inner.relay.listeners, &view, records);
            }),
        });
        source.add_map_listener(inner.relay.listener.clone());
        Self { inner }
    }
}

impl<K, V> Drop for UnmodifiableMapInner<K, V> {
    fn drop(&mut self) {
        self.source.remove_map_listener(&self.relay.listener);
    }
}

impl<K: Clone + 'static, V: Clone + 'static> Observable for UnmodifiableMap<K, V> {
    fn id(&self) -> ObservableId {
        self.inner.relay.id
    }

    fn add_listener(&self, listener: InvalidationListener) {
        self.inner.relay.add_invalidation(listener);
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        self.inner.relay.remove_invalidation(listener);
    }
}

impl<K: Clone + 'static, V: Clone + 'static> ObservableMap<K, V> for UnmodifiableMap<K, V> {
    fn len(&self) -> usize {
        self.inner.source.len()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.inner.source.contains_key(key)
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.source.get(key)
    }

    fn entries(&self) -> Vec<(K, V)> {
        self.inner.source.entries()
    }

    fn add_map_listener(&self, listener: MapChangeListener<K, V>) {
        self.inner.relay.add_change(listener);
    }

    fn remove_map_listener(&self, listener: &MapChangeListener<K, V>) {
        self.inner.relay.remove_change(listener);
    }

    fn listener_state(&self) -> ListenerState {
        self.inner.relay.state()
    }

    fn insert(&self, _key: K, _value: V) -> Result<Option<V>, CollectionError> {
        unsupported()
    }

    fn remove(&self, _key: &K) -> Result<Option<V>, CollectionError> {
        unsupported()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        unsupported()
    }
}

impl<K, V> Clone for UnmodifiableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for UnmodifiableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmodifiableMap")
            .field("id", &self.inner.relay.id)
            .field("source", &self.inner.source.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::collections::{IndexedMap, IndexedSet, ListChange, VecList};

    #[test]
    fn list_view_relays_changes() {
        let list = VecList::from(vec![1, 2]);
        let view = UnmodifiableList::new(&list);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        view.add_list_listener(ListChangeListener::new(move |change: &mut ListChange<i32>| {
            while change.next() {
                seen_clone.borrow_mut().push(change.added_sub_list().to_vec());
            }
        }));

        list.push(3).unwrap();
        assert_eq!(*seen.borrow(), vec![vec![3]]);
        assert_eq!(view.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn list_view_rejects_mutation() {
        let list = VecList::from(vec![1]);
        let view = UnmodifiableList::new(&list);
        assert!(matches!(view.push(2), Err(CollectionError::Unsupported(_))));
        assert!(view.set(0, 5).is_err());
        assert!(view.remove(0).is_err());
        assert!(view.clear().is_err());
        assert!(view.set_all(vec![]).is_err());
        assert_eq!(list.to_vec(), vec![1]);
    }

    #[test]
    fn view_invalidation_listeners_fire() {
        let list = VecList::from(vec!['a']);
        let view = UnmodifiableList::new(&list);
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        view.add_listener(InvalidationListener::new(move |_| count_clone.set(count_clone.get() + 1)));
        list.push('b').unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dropping_the_view_detaches_the_relay() {
        let list = VecList::from(vec![1]);
        let view = UnmodifiableList::new(&list);
        assert_eq!(list.listener_state(), ListenerState::Single);
        drop(view);
        assert_eq!(list.listener_state(), ListenerState::Empty);
    }

    #[test]
    fn set_and_map_views() {
        let set: IndexedSet<i32> = [1].into_iter().collect();
        let set_view = UnmodifiableSet::new(&set);
        assert!(set_view.insert(2).is_err());
        set.insert(2).unwrap();
        assert!(set_view.contains(&2));

        let map: IndexedMap<&str, i32> = IndexedMap::new();
        let map_view = UnmodifiableMap::new(&map);
        let relayed = Rc::new(Cell::new(0));
        let relayed_clone = relayed.clone();
        map_view.add_map_listener(MapChangeListener::new(move |_| relayed_clone.set(relayed_clone.get() + 1)));
        map.insert("k", 1).unwrap();
        assert_eq!(relayed.get(), 1);
        assert_eq!(map_view.get(&"k"), Some(1));
        assert!(map_view.remove(&"k").is_err());
    }
}
