//! JUX Core
//!
//! This crate provides the reactive engine of the JUX UI toolkit.
//! It implements:
//!
//! - Observable values: properties, constants and lazily evaluated bindings
//! - A bindings factory: arithmetic with numeric promotion, short-circuit
//!   boolean logic, string formatting, ternaries and collection accessors
//! - Observable lists, sets and maps that report batched, replayable changes
//! - A stable merge sort that reports how elements moved
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Observable contract, listener storage, properties, bindings
//! - `bindings`: Factory functions building derived bindings
//! - `collections`: Observable collections and their change events
//! - `sort`: Permutation-tracking sort used by list reordering
//! - `error`: Binding and collection error types
//!
//! Everything is single-threaded. A dependency keeps every binding built on
//! it alive until the binding is disposed.
//!
//! # Example
//!
//! ```rust
//! use jux_core::prelude::*;
//! use jux_core::bindings::{concat, size};
//!
//! let name = StringProperty::new("World".into());
//! let greeting = concat(["Hello, ".into(), (&name).into(), "!".into()]);
//! assert_eq!(greeting.get(), "Hello, World!");
//!
//! name.set("JUX".into());
//! assert_eq!(greeting.get(), "Hello, JUX!");
//!
//! let items = VecList::from(vec![3, 1, 2]);
//! let count = size(&items);
//! items.push(4).unwrap();
//! items.sort();
//! assert_eq!(items.to_vec(), vec![1, 2, 3, 4]);
//! assert_eq!(count.get(), 4);
//! ```

pub mod bindings;
pub mod collections;
pub mod error;
pub mod reactive;
pub mod sort;

/// The types most programs need.
pub mod prelude {
    pub use crate::collections::{
        IndexedMap, IndexedSet, ListChange, ListChangeListener, MapChangeListener, ObservableList,
        ObservableMap, ObservableSet, SetChangeListener, VecList,
    };
    pub use crate::error::{BindingError, CollectionError, ComputeResult};
    pub use crate::reactive::{
        dependency, Binding, BooleanBinding, BooleanProperty, ChangeListener, DoubleBinding,
        DoubleProperty, IntegerBinding, IntegerProperty, InvalidationListener, LongBinding,
        LongProperty, ObjectBinding, ObjectProperty, Observable, ObservableValue, Property,
        StringBinding, StringProperty,
    };
}
