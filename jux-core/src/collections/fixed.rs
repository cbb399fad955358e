//! Immutable empty and single-element collections.
//!
//! These never change, so they never notify: listener registration is a
//! no-op and the listener storage is always empty. Every mutator fails with
//! [`CollectionError::Unsupported`].

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::CollectionError;
use crate::reactive::{InvalidationListener, ListenerState, Observable, ObservableId};

use super::change::ListChangeListener;
use super::list::ObservableList;
use super::map::{MapChangeListener, ObservableMap};
use super::set::{ObservableSet, SetChangeListener};

fn immutable<T>() -> Result<T, CollectionError> {
    Err(CollectionError::Unsupported("collection is immutable"))
}

macro_rules! inert_observable {
    ($ty:ident < $($param:ident),+ > where $($bound:tt)*) => {
        impl<$($param),+> Observable for $ty<$($param),+> where $($bound)* {
            fn id(&self) -> ObservableId {
                self.id
            }

            fn add_listener(&self, _listener: InvalidationListener) {}

            fn remove_listener(&self, _listener: &InvalidationListener) {}
        }
    };
}

// ----------------------------------------------------------------------------
// Lists
// ----------------------------------------------------------------------------

/// A list that is always empty.
pub struct EmptyList<E> {
    id: ObservableId,
    _marker: PhantomData<fn() -> E>,
}

impl<E> EmptyList<E> {
    pub fn new() -> Self {
        Self {
            id: ObservableId::new(),
            _marker: PhantomData,
        }
    }
}

impl<E> Default for EmptyList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EmptyList<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EmptyList<E> {}

impl<E> fmt::Debug for EmptyList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmptyList({})", self.id)
    }
}

inert_observable!(EmptyList<E> where E: 'static);

impl<E: 'static> ObservableList<E> for EmptyList<E> {
    fn len(&self) -> usize {
        0
    }

    fn get(&self, _index: usize) -> Option<E> {
        None
    }

    fn to_vec(&self) -> Vec<E> {
        Vec::new()
    }

    fn add_list_listener(&self, _listener: ListChangeListener<E>) {}

    fn remove_list_listener(&self, _listener: &ListChangeListener<E>) {}

    fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }

    fn insert_all(&self, _index: usize, _values: Vec<E>) -> Result<(), CollectionError> {
        immutable()
    }

    fn remove(&self, _index: usize) -> Result<E, CollectionError> {
        immutable()
    }

    fn remove_range(&self, _from: usize, _to: usize) -> Result<(), CollectionError> {
        immutable()
    }

    fn set(&self, _index: usize, _value: E) -> Result<E, CollectionError> {
        immutable()
    }

    fn set_all(&self, _values: Vec<E>) -> Result<(), CollectionError> {
        immutable()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        immutable()
    }
}

/// A list holding exactly one element.
#[derive(Debug, Clone)]
pub struct SingletonList<E> {
    id: ObservableId,
    value: E,
}

impl<E> SingletonList<E> {
    pub fn new(value: E) -> Self {
        Self {
            id: ObservableId::new(),
            value,
        }
    }
}

inert_observable!(SingletonList<E> where E: Clone + 'static);

impl<E: Clone + 'static> ObservableList<E> for SingletonList<E> {
    fn len(&self) -> usize {
        1
    }

    fn get(&self, index: usize) -> Option<E> {
        (index == 0).then(|| self.value.clone())
    }

    fn to_vec(&self) -> Vec<E> {
        vec![self.value.clone()]
    }

    fn add_list_listener(&self, _listener: ListChangeListener<E>) {}

    fn remove_list_listener(&self, _listener: &ListChangeListener<E>) {}

    fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }

    fn insert_all(&self, _index: usize, _values: Vec<E>) -> Result<(), CollectionError> {
        immutable()
    }

    fn remove(&self, _index: usize) -> Result<E, CollectionError> {
        immutable()
    }

    fn remove_range(&self, _from: usize, _to: usize) -> Result<(), CollectionError> {
        immutable()
    }

    fn set(&self, _index: usize, _value: E) -> Result<E, CollectionError> {
        immutable()
    }

    fn set_all(&self, _values: Vec<E>) -> Result<(), CollectionError> {
        immutable()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        immutable()
    }
}

// ----------------------------------------------------------------------------
// Sets
// ----------------------------------------------------------------------------

/// A set that is always empty.
pub struct EmptySet<E> {
    id: ObservableId,
    _marker: PhantomData<fn() -> E>,
}

impl<E> EmptySet<E> {
    pub fn new() -> Self {
        Self {
            id: ObservableId::new(),
            _marker: PhantomData,
        }
    }
}

impl<E> Default for EmptySet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EmptySet<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EmptySet<E> {}

impl<E> fmt::Debug for EmptySet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmptySet({})", self.id)
    }
}

inert_observable!(EmptySet<E> where E: 'static);

impl<E: 'static> ObservableSet<E> for EmptySet<E> {
    fn len(&self) -> usize {
        0
    }

    fn contains(&self, _value: &E) -> bool {
        false
    }

    fn to_vec(&self) -> Vec<E> {
        Vec::new()
    }

    fn add_set_listener(&self, _listener: SetChangeListener<E>) {}

    fn remove_set_listener(&self, _listener: &SetChangeListener<E>) {}

    fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }

    fn insert(&self, _value: E) -> Result<bool, CollectionError> {
        immutable()
    }

    fn remove(&self, _value: &E) -> Result<bool, CollectionError> {
        immutable()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        immutable()
    }
}

/// A set holding exactly one element.
#[derive(Debug, Clone)]
pub struct SingletonSet<E> {
    id: ObservableId,
    value: E,
}

impl<E> SingletonSet<E> {
    pub fn new(value: E) -> Self {
        Self {
            id: ObservableId::new(),
            value,
        }
    }
}

inert_observable!(SingletonSet<E> where E: Clone + Eq + Hash + 'static);

impl<E: Clone + Eq + Hash + 'static> ObservableSet<E> for SingletonSet<E> {
    fn len(&self) -> usize {
        1
    }

    fn contains(&self, value: &E) -> bool {
        *value == self.value
    }

    fn to_vec(&self) -> Vec<E> {
        vec![self.value.clone()]
    }

    fn add_set_listener(&self, _listener: SetChangeListener<E>) {}

    fn remove_set_listener(&self, _listener: &SetChangeListener<E>) {}

    fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }

    fn insert(&self, _value: E) -> Result<bool, CollectionError> {
        immutable()
    }

    fn remove(&self, _value: &E) -> Result<bool, CollectionError> {
        immutable()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        immutable()
    }
}

// ----------------------------------------------------------------------------
// Maps
// ----------------------------------------------------------------------------

/// A map that is always empty.
pub struct EmptyMap<K, V> {
    id: ObservableId,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> EmptyMap<K, V> {
    pub fn new() -> Self {
        Self {
            id: ObservableId::new(),
            _marker: PhantomData,
        }
    }
}

impl<K, V> Default for EmptyMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for EmptyMap<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for EmptyMap<K, V> {}

impl<K, V> fmt::Debug for EmptyMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmptyMap({})", self.id)
    }
}

inert_observable!(EmptyMap<K, V> where K: 'static, V: 'static);

impl<K: 'static, V: 'static> ObservableMap<K, V> for EmptyMap<K, V> {
    fn len(&self) -> usize {
        0
    }

    fn contains_key(&self, _key: &K) -> bool {
        false
    }

    fn get(&self, _key: &K) -> Option<V> {
        None
    }

    fn entries(&self) -> Vec<(K, V)> {
        Vec::new()
    }

    fn add_map_listener(&self, _listener: MapChangeListener<K, V>) {}

    fn remove_map_listener(&self, _listener: &MapChangeListener<K, V>) {}

    fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }

    fn insert(&self, _key: K, _value: V) -> Result<Option<V>, CollectionError> {
        immutable()
    }

    fn remove(&self, _key: &K) -> Result<Option<V>, CollectionError> {
        immutable()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        immutable()
    }
}

/// A map holding exactly one entry.
#[derive(Debug, Clone)]
pub struct SingletonMap<K, V> {
    id: ObservableId,
    key: K,
    value: V,
}

impl<K, V> SingletonMap<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            id: ObservableId::new(),
            key,
            value,
        }
    }
}

inert_observable!(SingletonMap<K, V> where K: Clone + Eq + 'static, V: Clone + 'static);

impl<K: Clone + Eq + 'static, V: Clone + 'static> ObservableMap<K, V> for SingletonMap<K, V> {
    fn len(&self) -> usize {
        1
    }

    fn contains_key(&self, key: &K) -> bool {
        *key == self.key
    }

    fn get(&self, key: &K) -> Option<V> {
        (*key == self.key).then(|| self.value.clone())
    }

    fn entries(&self) -> Vec<(K, V)> {
        vec![(self.key.clone(), self.value.clone())]
    }

    fn add_map_listener(&self, _listener: MapChangeListener<K, V>) {}

    fn remove_map_listener(&self, _listener: &MapChangeListener<K, V>) {}

    fn listener_state(&self) -> ListenerState {
        ListenerState::Empty
    }

    fn insert(&self, _key: K, _value: V) -> Result<Option<V>, CollectionError> {
        immutable()
    }

    fn remove(&self, _key: &K) -> Result<Option<V>, CollectionError> {
        immutable()
    }

    fn clear(&self) -> Result<(), CollectionError> {
        immutable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_ignores_listeners_and_mutation() {
        let list: EmptyList<i32> = EmptyList::new();
        list.add_list_listener(ListChangeListener::new(|_| {}));
        assert_eq!(list.listener_state(), ListenerState::Empty);
        assert!(list.is_empty());
        assert_eq!(list.get(0), None);
        assert!(matches!(list.push(1), Err(CollectionError::Unsupported(_))));
    }

    #[test]
    fn singleton_list_reads() {
        let list = SingletonList::new("only");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0), Some("only"));
        assert_eq!(list.get(1), None);
        assert!(list.set(0, "other").is_err());
        assert_eq!(list.to_vec(), vec!["only"]);
    }

    #[test]
    fn fixed_sets_and_maps() {
        let set = SingletonSet::new(3);
        assert!(set.contains(&3));
        assert!(!set.contains(&4));
        assert!(set.insert(4).is_err());

        let empty: EmptySet<i32> = EmptySet::new();
        assert!(ObservableSet::is_empty(&empty));

        let map = SingletonMap::new("k", 1);
        assert_eq!(map.get(&"k"), Some(1));
        assert_eq!(map.get(&"x"), None);
        assert_eq!(map.keys(), vec!["k"]);
        assert!(map.clear().is_err());

        let none: EmptyMap<&str, i32> = EmptyMap::new();
        assert_eq!(none.len(), 0);
        none.add_listener(InvalidationListener::new(|_| {}));
        assert_eq!(ObservableMap::listener_state(&none), ListenerState::Empty);
    }
}
