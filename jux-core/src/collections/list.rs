//! Observable List
//!
//! [`ObservableList`] is the contract shared by every list flavour: read
//! access, listener registration and the structural mutators. [`VecList`]
//! is the mutable implementation, backed by a `Vec`.
//!
//! # How Mutation Works
//!
//! 1. Every mutator opens a batch on the list's change builder, changes
//!    the backing `Vec` and reports what it did to the builder.
//!
//! 2. Closing the outermost batch turns the accumulated sub-changes into
//!    one [`ListChange`](super::ListChange) and dispatches it: invalidation
//!    listeners first, then each change listener with its own cursor.
//!
//! 3. `begin_change()`/`end_change()` (or [`VecList::batch`]) widen the
//!    batch around several mutators, so `clear()` followed by a bulk add
//!    reports once.
//!
//! No borrow of the list is held while listeners run, so listeners may
//! read or mutate the list that notified them.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{check_index, check_range, CollectionError};
use crate::reactive::{InvalidationListener, ListenerState, Observable, ObservableId};
use crate::sort;

use super::builder::ListChangeBuilder;
use super::change::{fire_change, CollectionListeners, ListChangeListener, ListChangeRecord};

/// An observable sequence.
///
/// Mutators return `Err(CollectionError::Unsupported)` on read-only
/// implementations.
pub trait ObservableList<E>: Observable {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`, or `None` if out of range.
    fn get(&self, index: usize) -> Option<E>;

    /// A copy of the current contents.
    fn to_vec(&self) -> Vec<E>;

    fn add_list_listener(&self, listener: ListChangeListener<E>);

    fn remove_list_listener(&self, listener: &ListChangeListener<E>);

    /// Shape of the listener storage.
    fn listener_state(&self) -> ListenerState;

    /// Insert `values` at `index`, shifting later elements.
    fn insert_all(&self, index: usize, values: Vec<E>) -> Result<(), CollectionError>;

    /// Remove the element at `index`.
    fn remove(&self, index: usize) -> Result<E, CollectionError>;

    /// Remove the elements in `from..to`.
    fn remove_range(&self, from: usize, to: usize) -> Result<(), CollectionError>;

    /// Replace the element at `index`, returning the previous one.
    fn set(&self, index: usize, value: E) -> Result<E, CollectionError>;

    /// Replace the whole contents, reported as one change.
    fn set_all(&self, values: Vec<E>) -> Result<(), CollectionError>;

    fn push(&self, value: E) -> Result<(), CollectionError> {
        self.insert_all(self.len(), vec![value])
    }

    fn push_all(&self, values: Vec<E>) -> Result<(), CollectionError> {
        self.insert_all(self.len(), values)
    }

    fn insert(&self, index: usize, value: E) -> Result<(), CollectionError> {
        self.insert_all(index, vec![value])
    }

    fn clear(&self) -> Result<(), CollectionError> {
        self.remove_range(0, self.len())
    }
}

// ----------------------------------------------------------------------------
// VecList
// ----------------------------------------------------------------------------

/// A mutable observable list backed by a `Vec`.
///
/// Clones share the same list.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use jux_core::prelude::*;
///
/// let list = VecList::from(vec![1, 2, 3]);
/// let events = Rc::new(Cell::new(0));
/// let seen = events.clone();
/// list.add_list_listener(ListChangeListener::new(move |_| seen.set(seen.get() + 1)));
///
/// list.batch(|l| {
///     l.clear().unwrap();
///     l.push_all(vec![7, 8, 9, 10]).unwrap();
/// });
/// assert_eq!(list.to_vec(), vec![7, 8, 9, 10]);
/// assert_eq!(events.get(), 1);
/// ```
pub struct VecList<E> {
    inner: Rc<VecListInner<E>>,
}

struct VecListInner<E> {
    id: ObservableId,
    values: RefCell<Vec<E>>,
    builder: RefCell<ListChangeBuilder<E>>,
    listeners: RefCell<CollectionListeners<ListChangeRecord<E>>>,
}

impl<E: Clone + 'static> VecList<E> {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Open a batch. Mutations until the matching `end_change()` are
    /// reported as one change. Batches nest.
    pub fn begin_change(&self) {
        self.inner.builder.borrow_mut().begin_change();
    }

    /// Close a batch. Closing the outermost batch dispatches the change.
    pub fn end_change(&self) {
        let records = {
            let values = self.inner.values.borrow();
            self.inner.builder.borrow_mut().end_change(&values)
        };
        if let Some(records) = records {
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

    /// Read the contents without copying them.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates this list.
    pub fn with<R>(&self, f: impl FnOnce(&[E]) -> R) -> R {
        f(&self.inner.values.borrow())
    }

    /// Modify the element at `index` in place. Reported as an update.
    pub fn update<F>(&self, index: usize, f: F) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut E),
    {
        let mut value = self
            .get(index)
            .ok_or(CollectionError::IndexOutOfBounds { index, len: self.len() })?;
        f(&mut value);
        self.begin_change();
        self.inner.values.borrow_mut()[index] = value;
        self.inner.builder.borrow_mut().next_update(index);
        self.end_change();
        Ok(())
    }

    /// Keep only the elements matching `keep`. Returns whether anything
    /// was removed.
    pub fn retain<F>(&self, mut keep: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        let kept: Vec<bool> = self.inner.values.borrow().iter().map(&mut keep).collect();
        if kept.iter().all(|&k| k) {
            return false;
        }
        self.begin_change();
        for index in (0..kept.len()).rev().filter(|&i| !kept[i]) {
            let value = self.inner.values.borrow_mut().remove(index);
            self.inner.builder.borrow_mut().next_remove(index, value);
        }
        self.end_change();
        true
    }

    /// Stable sort by `compare`, reported as a permutation.
    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&E, &E) -> Ordering,
    {
        let len = self.len();
        let sorted = self.reorder(0, len, |range| sort::sort_by(range, compare));
        debug_assert!(sorted.is_ok(), "full range rejected: {sorted:?}");
    }

    /// Stable sort of `from..to` by `compare`.
    pub fn sort_range_by<F>(&self, from: usize, to: usize, compare: F) -> Result<(), CollectionError>
    where
        F: FnMut(&E, &E) -> Ordering,
    {
        self.reorder(from, to, |range| sort::sort_by(range, compare))
    }

    /// Reverse the order of the elements.
    pub fn reverse(&self) {
        let len = self.len();
        let reversed = self.reorder(0, len, |range| {
            range.reverse();
            (0..len).map(|i| len - 1 - i).collect()
        });
        debug_assert!(reversed.is_ok(), "full range rejected: {reversed:?}");
    }

    /// Move every element `distance` positions towards the end, wrapping
    /// around. Negative distances rotate towards the front.
    pub fn rotate(&self, distance: isize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let shift = distance.rem_euclid(len as isize) as usize;
        let rotated = self.reorder(0, len, |range| {
            range.rotate_right(shift);
            (0..len).map(|i| (i + shift) % len).collect()
        });
        debug_assert!(rotated.is_ok(), "full range rejected: {rotated:?}");
    }

    /// Randomly permute the elements using `rng`.
    pub fn shuffle_with<R: Rng + ?Sized>(&self, rng: &mut R) {
        let len = self.len();
        let shuffled = self.reorder(0, len, |range| {
            let mut order: Vec<usize> = (0..len).collect();
            order.shuffle(rng);
            let permutation = sort::invert(&order);
            sort::apply_permutation(range, &permutation);
            permutation
        });
        debug_assert!(shuffled.is_ok(), "full range rejected: {shuffled:?}");
    }

    /// Reorder `from..to` with `reorder`, which returns the permutation it
    /// applied relative to the range, and report it.
    fn reorder<F>(&self, from: usize, to: usize, reorder: F) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut [E]) -> Vec<usize>,
    {
        check_range(from, to, self.len())?;
        // Work on a copy so `reorder` runs with no borrow of the list held.
        let mut range = self.inner.values.borrow()[from..to].to_vec();
        let relative = reorder(&mut range);
        let originals: Vec<E> = relative.iter().map(|&p| range[p].clone()).collect();
        self.inner.values.borrow_mut().splice(from..to, range);

        let permutation = relative.into_iter().map(|p| p + from).collect();
        self.begin_change();
        self.inner.builder.borrow_mut().next_permutation(
            from,
            to,
            permutation,
            originals,
            &self.inner.values.borrow(),
        );
        self.end_change();
        Ok(())
    }
}

impl<E: Clone + Ord + 'static> VecList<E> {
    /// Stable sort by natural order.
    pub fn sort(&self) {
        self.sort_by(E::cmp);
    }
}

impl<E: Clone + PartialEq + 'static> VecList<E> {
    pub fn contains(&self, value: &E) -> bool {
        self.inner.values.borrow().contains(value)
    }

    pub fn index_of(&self, value: &E) -> Option<usize> {
        self.inner.values.borrow().iter().position(|v| v == value)
    }

    /// Remove the first element equal to `value`.
    pub fn remove_item(&self, value: &E) -> bool {
        match self.index_of(value) {
            Some(index) => self.remove(index).is_ok(),
            None => false,
        }
    }

    /// Remove every element contained in `values`.
    pub fn remove_all(&self, values: &[E]) -> bool {
        self.retain(|v| !values.contains(v))
    }
}

impl<E: Clone + 'static> Observable for VecList<E> {
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

impl<E: Clone + 'static> ObservableList<E> for VecList<E> {
    fn len(&self) -> usize {
        self.inner.values.borrow().len()
    }

    fn get(&self, index: usize) -> Option<E> {
        self.inner.values.borrow().get(index).cloned()
    }

    fn to_vec(&self) -> Vec<E> {
        self.inner.values.borrow().clone()
    }

    fn add_list_listener(&self, listener: ListChangeListener<E>) {
        self.inner.listeners.borrow_mut().add_change(listener);
    }

    fn remove_list_listener(&self, listener: &ListChangeListener<E>) {
        self.inner.listeners.borrow_mut().remove_change(listener);
    }

    fn listener_state(&self) -> ListenerState {
        self.inner.listeners.borrow().state()
    }

    fn insert_all(&self, index: usize, values: Vec<E>) -> Result<(), CollectionError> {
        let len = self.len();
        if index > len {
            return Err(CollectionError::IndexOutOfBounds { index, len });
        }
        if values.is_empty() {
            return Ok(());
        }
        let count = values.len();
        self.begin_change();
        self.inner.values.borrow_mut().splice(index..index, values);
        self.inner.builder.borrow_mut().next_add(index, index + count);
        self.end_change();
        Ok(())
    }

    fn remove(&self, index: usize) -> Result<E, CollectionError> {
        check_index(index, self.len())?;
        self.begin_change();
        let value = self.inner.values.borrow_mut().remove(index);
        self.inner.builder.borrow_mut().next_remove(index, value.clone());
        self.end_change();
        Ok(value)
    }

    fn remove_range(&self, from: usize, to: usize) -> Result<(), CollectionError> {
        check_range(from, to, self.len())?;
        if from == to {
            return Ok(());
        }
        self.begin_change();
        let removed: Vec<E> = self.inner.values.borrow_mut().drain(from..to).collect();
        {
            let mut builder = self.inner.builder.borrow_mut();
            for value in removed {
                builder.next_remove(from, value);
            }
        }
        self.end_change();
        Ok(())
    }

    fn set(&self, index: usize, value: E) -> Result<E, CollectionError> {
        check_index(index, self.len())?;
        self.begin_change();
        let old = std::mem::replace(&mut self.inner.values.borrow_mut()[index], value);
        self.inner.builder.borrow_mut().next_set(index, old.clone());
        self.end_change();
        Ok(old)
    }

    fn set_all(&self, values: Vec<E>) -> Result<(), CollectionError> {
        self.begin_change();
        let old = std::mem::replace(&mut *self.inner.values.borrow_mut(), values);
        let len = self.len();
        {
            let mut builder = self.inner.builder.borrow_mut();
            for value in old {
                builder.next_remove(0, value);
            }
            builder.next_add(0, len);
        }
        self.end_change();
        Ok(())
    }
}

impl<E: Clone + 'static> Default for VecList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<Vec<E>> for VecList<E> {
    fn from(values: Vec<E>) -> Self {
        Self {
            inner: Rc::new(VecListInner {
                id: ObservableId::new(),
                values: RefCell::new(values),
                builder: RefCell::new(ListChangeBuilder::default()),
                listeners: RefCell::new(CollectionListeners::default()),
            }),
        }
    }
}

impl<E> FromIterator<E> for VecList<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<E> Clone for VecList<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for VecList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecList")
            .field("id", &self.inner.id)
            .field("values", &*self.inner.values.borrow())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::collections::change::ListChange;

    /// Records every change and replays it onto a mirror of the list.
    struct Recorder {
        log: Rc<RefCell<Vec<Vec<ListChangeRecord<char>>>>>,
        mirror: Rc<RefCell<Vec<char>>>,
    }

    impl Recorder {
        fn check(&self, list: &VecList<char>) {
            assert_eq!(*self.mirror.borrow(), list.to_vec());
        }

        fn events(&self) -> usize {
            self.log.borrow().len()
        }
    }

    fn recording(list: &VecList<char>) -> Recorder {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mirror = Rc::new(RefCell::new(list.to_vec()));
        let (log_clone, mirror_clone) = (log.clone(), mirror.clone());
        list.add_list_listener(ListChangeListener::new(move |change: &mut ListChange<char>| {
            change.apply_to(&mut mirror_clone.borrow_mut());
            log_clone.borrow_mut().push(change.records().to_vec());
        }));
        Recorder { log, mirror }
    }

    fn list(values: &str) -> VecList<char> {
        values.chars().collect()
    }

    #[test]
    fn push_and_get() {
        let l = list("ab");
        l.push('c').unwrap();
        assert_eq!(l.len(), 3);
        assert_eq!(l.get(2), Some('c'));
        assert_eq!(l.get(3), None);
    }

    #[test]
    fn every_mutation_reports_once() {
        let l = list("abcd");
        let rec = recording(&l);

        l.insert(1, 'x').unwrap();
        l.remove(0).unwrap();
        l.set(0, 'y').unwrap();
        l.remove_range(1, 3).unwrap();
        l.update(0, |v| *v = 'Y').unwrap();

        rec.check(&l);
        let log = rec.log.borrow();
        assert_eq!(log.len(), 5);
        assert!(matches!(log[4][0], ListChangeRecord::Update { from: 0, to: 1, .. }));
        assert_eq!(l.to_vec(), vec!['Y', 'd']);
    }

    #[test]
    fn set_all_in_a_batch_reports_once() {
        let l = list("abc");
        let rec = recording(&l);

        l.batch(|l| {
            l.clear().unwrap();
            l.push_all("wxyz".chars().collect()).unwrap();
        });

        rec.check(&l);
        let log = rec.log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(
            log[0],
            vec![ListChangeRecord::Replace {
                from: 0,
                to: 4,
                removed: vec!['a', 'b', 'c'],
                added: vec!['w', 'x', 'y', 'z'],
            }]
        );
    }

    #[test]
    fn set_all_alone_reports_once() {
        let l = list("abc");
        let rec = recording(&l);
        l.set_all(vec!['q']).unwrap();
        rec.check(&l);
        assert_eq!(rec.events(), 1);
    }

    #[test]
    fn out_of_range_mutations_fail() {
        let l = list("ab");
        assert_eq!(
            l.insert(3, 'x'),
            Err(CollectionError::IndexOutOfBounds { index: 3, len: 2 })
        );
        assert!(l.remove(2).is_err());
        assert!(l.set(5, 'x').is_err());
        assert!(l.remove_range(1, 0).is_err());
        assert!(l.update(2, |_| {}).is_err());
        assert_eq!(l.to_vec(), vec!['a', 'b']);
    }

    #[test]
    fn no_op_mutations_do_not_fire() {
        let l = list("ab");
        let rec = recording(&l);
        l.insert_all(1, Vec::new()).unwrap();
        l.remove_range(1, 1).unwrap();
        assert!(!l.retain(|_| true));
        l.batch(|_| {});
        assert_eq!(rec.events(), 0);
    }

    #[test]
    fn sort_reports_permutation() {
        let l = list("cab");
        let rec = recording(&l);
        l.sort();
        assert_eq!(l.to_vec(), vec!['a', 'b', 'c']);
        assert_eq!(
            rec.log.borrow()[0],
            vec![ListChangeRecord::Permutation {
                from: 0,
                to: 3,
                permutation: vec![2, 0, 1],
            }]
        );

        l.sort();
        assert_eq!(rec.events(), 1);
        rec.check(&l);
    }

    #[test]
    fn sort_range_uses_absolute_indices() {
        let l = list("zdcbz");
        let rec = recording(&l);
        l.sort_range_by(1, 4, |a, b| a.cmp(b)).unwrap();
        assert_eq!(l.to_vec(), vec!['z', 'b', 'c', 'd', 'z']);
        assert_eq!(
            rec.log.borrow()[0],
            vec![ListChangeRecord::Permutation {
                from: 1,
                to: 4,
                permutation: vec![3, 2, 1],
            }]
        );
    }

    #[test]
    fn disjoint_range_sorts_in_one_batch() {
        let l = list("bazzdc");
        let rec = recording(&l);
        l.batch(|l| {
            l.sort_range_by(0, 2, |a, b| a.cmp(b)).unwrap();
            l.sort_range_by(4, 6, |a, b| a.cmp(b)).unwrap();
        });
        assert_eq!(l.to_vec(), vec!['a', 'b', 'z', 'z', 'c', 'd']);
        assert_eq!(
            rec.log.borrow()[0],
            vec![ListChangeRecord::Permutation {
                from: 0,
                to: 6,
                permutation: vec![1, 0, 2, 3, 5, 4],
            }]
        );
        rec.check(&l);

        // The batch closed, so later mutations still report.
        l.push('e').unwrap();
        assert_eq!(rec.events(), 2);
        rec.check(&l);
    }

    #[test]
    fn overlapping_range_sorts_in_one_batch() {
        let l = list("edcba");
        let rec = recording(&l);
        l.batch(|l| {
            l.sort_range_by(0, 3, |a, b| a.cmp(b)).unwrap();
            l.sort_range_by(2, 5, |a, b| a.cmp(b)).unwrap();
            l.sort_range_by(4, 5, |a, b| a.cmp(b)).unwrap();
        });
        assert_eq!(l.to_vec(), vec!['c', 'd', 'a', 'b', 'e']);
        assert_eq!(rec.events(), 1);
        rec.check(&l);
    }

    #[test]
    fn reverse_rotate_shuffle_replay() {
        let l = list("abcdefgh");
        let rec = recording(&l);
        l.reverse();
        l.rotate(3);
        l.rotate(-1);
        l.shuffle_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(rec.events(), 4);
        rec.check(&l);

        let mut sorted = l.to_vec();
        sorted.sort();
        assert_eq!(sorted, "abcdefgh".chars().collect::<Vec<_>>());
    }

    #[test]
    fn retain_and_remove_all() {
        let l = list("abcabc");
        let rec = recording(&l);
        assert!(l.remove_all(&['a']));
        assert_eq!(l.to_vec(), vec!['b', 'c', 'b', 'c']);
        assert!(l.remove_item(&'c'));
        assert_eq!(l.to_vec(), vec!['b', 'b', 'c']);
        assert!(!l.remove_item(&'z'));
        assert_eq!(rec.events(), 2);
        rec.check(&l);
    }

    #[test]
    fn sort_then_mutation_in_one_batch_replays() {
        let l = list("dcba");
        let rec = recording(&l);
        l.batch(|l| {
            l.sort();
            l.push('e').unwrap();
            l.update(0, |v| *v = 'A').unwrap();
        });
        assert_eq!(rec.events(), 1);
        assert_eq!(l.to_vec(), vec!['A', 'b', 'c', 'd', 'e']);
        rec.check(&l);
    }

    #[test]
    fn invalidation_listeners_fire_per_change() {
        let l = list("a");
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        l.add_listener(InvalidationListener::new(move |_| count_clone.set(count_clone.get() + 1)));
        l.push('b').unwrap();
        l.batch(|l| {
            l.push('c').unwrap();
            l.push('d').unwrap();
        });
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn listener_may_mutate_the_list() {
        let l = list("a");
        let source = l.clone();
        l.add_list_listener(ListChangeListener::new(move |_| {
            if source.len() < 3 {
                source.push('z').unwrap();
            }
        }));
        l.push('b').unwrap();
        assert_eq!(l.to_vec(), vec!['a', 'b', 'z']);
    }

    #[test]
    fn sole_listener_round_trip_returns_to_empty() {
        let l = list("a");
        let listener = ListChangeListener::new(|_| {});
        l.add_list_listener(listener.clone());
        assert_eq!(l.listener_state(), ListenerState::Single);
        l.remove_list_listener(&listener);
        assert_eq!(l.listener_state(), ListenerState::Empty);
    }
}
