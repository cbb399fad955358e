//! Observable Collections
//!
//! Lists, sets and maps that describe their own mutations.
//!
//! # Changes
//!
//! A mutation, or a batch of them, is delivered to change listeners as one
//! [`Change`]: a cursor over the records of that batch. Listeners call
//! `next()` to step through the records and read each one through the
//! accessors of the collection kind ([`ListChange`], [`SetChange`],
//! [`MapChange`]). Every listener gets its own cursor.
//!
//! List records come in three shapes:
//!
//! - a permutation of `from..to`, with `permutation(old) == new`;
//! - a replacement of `from..to`, carrying the removed elements (a pure
//!   add has nothing removed, a pure remove has an empty range);
//! - an update of `from..to`, for elements changed in place.
//!
//! Positions are expressed in the final list. Applying the records in order
//! to a copy of the list taken before the change reproduces the list after
//! it.
//!
//! # Batching
//!
//! `begin_change()` and `end_change()` nest. Only the outermost
//! `end_change()` dispatches, and a batch that ends up changing nothing
//! dispatches nothing.
//!
//! # Read-only collections
//!
//! Unmodifiable views relay the changes of the collection they wrap. Empty
//! and singleton collections never change. Both reject every mutator with
//! [`CollectionError::Unsupported`](crate::error::CollectionError).

mod builder;
mod change;
mod fixed;
mod list;
mod map;
mod ops;
mod set;
mod unmodifiable;

pub use change::{
    Change, CollectionListener, ListChange, ListChangeListener, ListChangeRecord,
};
pub use fixed::{EmptyList, EmptyMap, EmptySet, SingletonList, SingletonMap, SingletonSet};
pub use list::{ObservableList, VecList};
pub use map::{IndexedMap, MapChange, MapChangeListener, MapChangeRecord, ObservableMap};
pub use ops::{
    concat, copy, empty_list, empty_map, empty_set, fill, observable_list, observable_map,
    observable_set, replace_all, reverse, rotate, shuffle, shuffle_with, singleton_list,
    singleton_map, singleton_set, sort, sort_by, unmodifiable_list, unmodifiable_map,
    unmodifiable_set,
};
pub use set::{IndexedSet, ObservableSet, SetChange, SetChangeListener, SetChangeRecord};
pub use unmodifiable::{UnmodifiableList, UnmodifiableMap, UnmodifiableSet};
