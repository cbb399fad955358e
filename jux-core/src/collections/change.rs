//! Change cursors and collection listeners.
//!
//! A collection mutation (or a whole batch of them) is reported as one
//! [`Change`]: an immutable sequence of records plus a cursor. Listeners
//! step through it with `next()`, reading the current record through the
//! accessors of the record type. Every listener receives its own cursor,
//! positioned before the first record.
//!
//! List records are defined here. Set and map records live next to their
//! collections.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::reactive::{isolate, ListenerHelper, Observable};

/// A replayable cursor over the records of one change notification.
pub struct Change<R> {
    records: Rc<[R]>,
    cursor: Option<usize>,
}

impl<R> Change<R> {
    pub(crate) fn new(records: Rc<[R]>) -> Self {
        Self {
            records,
            cursor: None,
        }
    }

    /// Advance to the next record. Returns `false` once the records are
    /// exhausted.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.records.len() {
            self.cursor = Some(next);
            true
        } else {
            self.cursor = Some(self.records.len());
            false
        }
    }

    /// Move the cursor back before the first record.
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// All records of this change, in order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// The record under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if `next()` has not been called or returned `false`.
    pub fn current(&self) -> &R {
        match self.cursor {
            Some(index) if index < self.records.len() => &self.records[index],
            Some(_) => panic!("change cursor is past the last record"),
            None => panic!("change cursor read before calling next()"),
        }
    }

    pub(crate) fn shared_records(&self) -> Rc<[R]> {
        Rc::clone(&self.records)
    }
}

impl<R> Clone for Change<R> {
    fn clone(&self) -> Self {
        Self {
            records: Rc::clone(&self.records),
            cursor: self.cursor,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Change<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("cursor", &self.cursor)
            .field("records", &self.records)
            .finish()
    }
}

/// Callback notified with a [`Change`] after a collection mutation.
pub struct CollectionListener<R>(Rc<dyn Fn(&mut Change<R>)>);

impl<R> CollectionListener<R> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Change<R>) + 'static,
    {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn on_changed(&self, change: &mut Change<R>) {
        (self.0)(change)
    }
}

impl<R> Clone for CollectionListener<R> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<R> PartialEq for CollectionListener<R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<R> fmt::Debug for CollectionListener<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionListener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

pub(crate) type CollectionListeners<R> = ListenerHelper<CollectionListener<R>>;

/// Notify the invalidation listeners of `observable`, then hand every
/// change listener a fresh cursor over `records`.
pub(crate) fn fire_change<R>(
    helper: &RefCell<CollectionListeners<R>>,
    observable: &dyn Observable,
    records: Rc<[R]>,
) {
    let snapshot = helper.borrow().snapshot();
    let source = observable.id();
    tracing::trace!(
        collection = %source,
        records = records.len(),
        listeners = snapshot.invalidation().len() + snapshot.change().len(),
        "dispatching collection change"
    );

    for listener in snapshot.invalidation() {
        isolate(source, || listener.invalidated(observable));
    }
    for listener in snapshot.change() {
        let mut change = Change::new(Rc::clone(&records));
        isolate(source, || listener.on_changed(&mut change));
    }
}

// ----------------------------------------------------------------------------
// List records
// ----------------------------------------------------------------------------

/// One sub-change of a list change. Positions are indices in the list as
/// it is after the whole change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListChangeRecord<E> {
    /// The elements in `from..to` were reordered. `permutation[i - from]`
    /// is the new index of the element previously at `i`.
    Permutation {
        from: usize,
        to: usize,
        permutation: Vec<usize>,
    },
    /// `removed` was taken out at `from` and `added` now occupies
    /// `from..to`. Either side may be empty.
    Replace {
        from: usize,
        to: usize,
        removed: Vec<E>,
        added: Vec<E>,
    },
    /// The elements in `from..to` were modified in place; `values` are
    /// their new contents.
    Update {
        from: usize,
        to: usize,
        values: Vec<E>,
    },
}

impl<E> ListChangeRecord<E> {
    pub fn from(&self) -> usize {
        match self {
            Self::Permutation { from, .. } | Self::Replace { from, .. } | Self::Update { from, .. } => *from,
        }
    }

    pub fn to(&self) -> usize {
        match self {
            Self::Permutation { to, .. } | Self::Replace { to, .. } | Self::Update { to, .. } => *to,
        }
    }
}

impl<E: Clone> ListChangeRecord<E> {
    /// Replay this record onto `list`, which must hold the list's contents
    /// as they were after the preceding records of the same change.
    pub fn apply(&self, list: &mut Vec<E>) {
        match self {
            Self::Permutation {
                from,
                to,
                permutation,
            } => {
                let moved = list[*from..*to].to_vec();
                for (offset, value) in moved.into_iter().enumerate() {
                    list[permutation[offset]] = value;
                }
            }
            Self::Replace {
                from,
                removed,
                added,
                ..
            } => {
                list.splice(*from..*from + removed.len(), added.iter().cloned());
            }
            Self::Update { from, to, values } => {
                list[*from..*to].clone_from_slice(values);
            }
        }
    }
}

pub type ListChange<E> = Change<ListChangeRecord<E>>;

pub type ListChangeListener<E> = CollectionListener<ListChangeRecord<E>>;

impl<E> Change<ListChangeRecord<E>> {
    /// Start of the current record's range.
    pub fn from(&self) -> usize {
        self.current().from()
    }

    /// End (exclusive) of the current record's range.
    pub fn to(&self) -> usize {
        self.current().to()
    }

    pub fn was_permutated(&self) -> bool {
        matches!(self.current(), ListChangeRecord::Permutation { .. })
    }

    pub fn was_added(&self) -> bool {
        matches!(self.current(), ListChangeRecord::Replace { added, .. } if !added.is_empty())
    }

    pub fn was_removed(&self) -> bool {
        matches!(self.current(), ListChangeRecord::Replace { removed, .. } if !removed.is_empty())
    }

    pub fn was_replaced(&self) -> bool {
        self.was_added() && self.was_removed()
    }

    pub fn was_updated(&self) -> bool {
        matches!(self.current(), ListChangeRecord::Update { .. })
    }

    /// Elements removed by the current record; empty unless it is a
    /// removal or replacement.
    pub fn removed(&self) -> &[E] {
        match self.current() {
            ListChangeRecord::Replace { removed, .. } => removed,
            _ => &[],
        }
    }

    /// Elements added by the current record; empty unless it is an
    /// addition or replacement.
    pub fn added_sub_list(&self) -> &[E] {
        match self.current() {
            ListChangeRecord::Replace { added, .. } => added,
            _ => &[],
        }
    }

    pub fn added_size(&self) -> usize {
        self.added_sub_list().len()
    }

    pub fn removed_size(&self) -> usize {
        self.removed().len()
    }

    /// New index of the element previously at `index`. Identity for
    /// records that are not permutations.
    pub fn permutation(&self, index: usize) -> usize {
        match self.current() {
            ListChangeRecord::Permutation {
                from, permutation, ..
            } => permutation[index - from],
            _ => index,
        }
    }
}

impl<E: Clone> Change<ListChangeRecord<E>> {
    /// Replay every record onto `list`, a mirror of the source list as it
    /// was before the change.
    pub fn apply_to(&self, list: &mut Vec<E>) {
        for record in self.records() {
            record.apply(list);
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Change<ListChangeRecord<E>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (i, record) in self.records().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match record {
                ListChangeRecord::Permutation { from, to, permutation } => {
                    write!(f, "permutated {from}..{to} {permutation:?}")?
                }
                ListChangeRecord::Replace { from, to, removed, added } => {
                    write!(f, "{removed:?} replaced by {added:?} at {from}..{to}")?
                }
                ListChangeRecord::Update { from, to, .. } => write!(f, "updated {from}..{to}")?,
            }
        }
        write!(f, " }}")
    }
}
