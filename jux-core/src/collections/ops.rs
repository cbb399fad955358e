//! Constructors and bulk list operations.
//!
//! Every mutating utility here runs inside a single batch, so an operation
//! that changes the list reports exactly one change to each listener, and
//! one that changes nothing reports none.

use std::cmp::Ordering;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use rand::Rng;

use crate::error::CollectionError;

use super::fixed::{EmptyList, EmptyMap, EmptySet, SingletonList, SingletonMap, SingletonSet};
use super::list::{ObservableList, VecList};
use super::map::{IndexedMap, ObservableMap};
use super::set::{IndexedSet, ObservableSet};
use super::unmodifiable::{UnmodifiableList, UnmodifiableMap, UnmodifiableSet};

// ----------------------------------------------------------------------------
// Constructors
// ----------------------------------------------------------------------------

pub fn observable_list<E: Clone + 'static>(values: Vec<E>) -> VecList<E> {
    VecList::from(values)
}

pub fn empty_list<E>() -> EmptyList<E> {
    EmptyList::new()
}

pub fn singleton_list<E>(value: E) -> SingletonList<E> {
    SingletonList::new(value)
}

/// A read-only view of `source` that relays its changes.
pub fn unmodifiable_list<E, L>(source: &L) -> UnmodifiableList<E>
where
    E: Clone + 'static,
    L: ObservableList<E> + Clone + 'static,
{
    UnmodifiableList::new(source)
}

pub fn observable_set<E>(values: impl IntoIterator<Item = E>) -> IndexedSet<E>
where
    E: Clone + Eq + Hash + 'static,
{
    IndexedSet::from(values.into_iter().collect::<IndexSet<E>>())
}

pub fn empty_set<E>() -> EmptySet<E> {
    EmptySet::new()
}

pub fn singleton_set<E>(value: E) -> SingletonSet<E> {
    SingletonSet::new(value)
}

pub fn unmodifiable_set<E, S>(source: &S) -> UnmodifiableSet<E>
where
    E: Clone + 'static,
    S: ObservableSet<E> + Clone + 'static,
{
    UnmodifiableSet::new(source)
}

pub fn observable_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> IndexedMap<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    IndexedMap::from(entries.into_iter().collect::<IndexMap<K, V>>())
}

pub fn empty_map<K, V>() -> EmptyMap<K, V> {
    EmptyMap::new()
}

pub fn singleton_map<K, V>(key: K, value: V) -> SingletonMap<K, V> {
    SingletonMap::new(key, value)
}

pub fn unmodifiable_map<K, V, M>(source: &M) -> UnmodifiableMap<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
    M: ObservableMap<K, V> + Clone + 'static,
{
    UnmodifiableMap::new(source)
}

// ----------------------------------------------------------------------------
// Reordering
// ----------------------------------------------------------------------------

/// Stable sort in natural order, reported as one permutation.
pub fn sort<E: Clone + Ord + 'static>(list: &VecList<E>) {
    list.sort();
}

pub fn sort_by<E, F>(list: &VecList<E>, compare: F)
where
    E: Clone + 'static,
    F: FnMut(&E, &E) -> Ordering,
{
    list.sort_by(compare);
}

/// Shuffle with the thread-local generator.
pub fn shuffle<E: Clone + 'static>(list: &VecList<E>) {
    list.shuffle_with(&mut rand::thread_rng());
}

pub fn shuffle_with<E: Clone + 'static, R: Rng + ?Sized>(list: &VecList<E>, rng: &mut R) {
    list.shuffle_with(rng);
}

pub fn reverse<E: Clone + 'static>(list: &VecList<E>) {
    list.reverse();
}

pub fn rotate<E: Clone + 'static>(list: &VecList<E>, distance: isize) {
    list.rotate(distance);
}

// ----------------------------------------------------------------------------
// Bulk writes
// ----------------------------------------------------------------------------

/// A new list holding the elements of every list in `lists`, in order.
pub fn concat<E: Clone + 'static>(lists: &[&dyn ObservableList<E>]) -> VecList<E> {
    let values: Vec<E> = lists.iter().flat_map(|list| list.to_vec()).collect();
    VecList::from(values)
}

/// Overwrite every element with `value`.
pub fn fill<E: Clone + 'static>(list: &VecList<E>, value: E) {
    let len = list.len();
    if len == 0 {
        return;
    }
    let filled = list.set_all(vec![value; len]);
    debug_assert!(filled.is_ok());
}

/// Replace every element equal to `old` with `new`. Returns whether
/// anything was replaced.
pub fn replace_all<E>(list: &VecList<E>, old: &E, new: E) -> bool
where
    E: Clone + PartialEq + 'static,
{
    let hits: Vec<usize> = list.with(|values| {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == old)
            .map(|(i, _)| i)
            .collect()
    });
    if hits.is_empty() {
        return false;
    }
    list.batch(|list| {
        for index in hits {
            let replaced = list.set(index, new.clone());
            debug_assert!(replaced.is_ok(), "index {index} out of range");
        }
    });
    true
}

/// Copy `source` over the front of `dest`. Elements of `dest` past the
/// length of `source` are left alone.
pub fn copy<E: Clone + 'static>(
    dest: &VecList<E>,
    source: &dyn ObservableList<E>,
) -> Result<(), CollectionError> {
    let values = source.to_vec();
    if values.len() > dest.len() {
        return Err(CollectionError::IndexOutOfBounds {
            index: values.len() - 1,
            len: dest.len(),
        });
    }
    dest.batch(|dest| {
        values
            .into_iter()
            .enumerate()
            .try_for_each(|(index, value)| dest.set(index, value).map(drop))
    })
}
