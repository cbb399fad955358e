//! Reactive Primitives
//!
//! This module implements the scalar half of the engine: the observable
//! contract, listener storage and dispatch, constants, properties and the
//! binding core.
//!
//! # Concepts
//!
//! ## Observables
//!
//! An [`Observable`] can be watched through invalidation listeners. An
//! [`ObservableValue`] also has a current value and accepts change
//! listeners that receive old and new values.
//!
//! ## Properties
//!
//! A [`Property`] is a writable value. It is where changes enter the graph.
//!
//! ## Bindings
//!
//! A [`Binding`] is a derived value computed from its dependencies. It is
//! pull-based: invalidation travels eagerly from dependencies to dependents,
//! but values are only recomputed when read.
//!
//! ## Constants
//!
//! A [`Constant`] lifts a plain value into the graph. It never changes, so
//! it never notifies.
//!
//! # Implementation Notes
//!
//! Everything here is single-threaded: handles share state through `Rc`,
//! and interior mutability uses `Cell`/`RefCell`. Notification is a
//! synchronous, reentrant call chain. No `RefCell` borrow is held while a
//! listener runs, so listeners may mutate the graph. Cyclic bindings are
//! not detected and will recurse.

mod binding;
mod constant;
mod dispatch;
mod expression;
mod listener;
mod observable;
mod property;

pub use binding::{
    Binding, BindingValue, BooleanBinding, DoubleBinding, IntegerBinding, LongBinding,
    ObjectBinding, StringBinding,
};
pub use constant::{
    BooleanConstant, Constant, DoubleConstant, IntegerConstant, LongConstant, ObjectConstant,
    StringConstant,
};
pub use dispatch::{set_uncaught_handler, take_uncaught_handler, ListenerPanic};
pub use listener::ListenerState;
pub use observable::{
    dependency, ChangeListener, Dependency, InvalidationListener, Observable, ObservableId,
    ObservableValue,
};
pub use property::{
    BooleanProperty, DoubleProperty, IntegerProperty, LongProperty, ObjectProperty, Property,
    StringProperty,
};

pub(crate) use dispatch::isolate;
pub(crate) use listener::ListenerHelper;
