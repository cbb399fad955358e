//! Bindings Factory
//!
//! Ready-made derived bindings. Every function here returns a lazily
//! evaluated [`Binding`](crate::reactive::Binding) whose dependencies are
//! the observed inputs; constant inputs never become dependencies.
//!
//! Functions whose names clash across value domains (`equal`, `not_equal`,
//! the ordering comparisons) live in their domain module: [`number`],
//! [`boolean`], [`string`] and [`object`]. The rest are re-exported here.
//!
//! ```rust
//! use jux_core::prelude::*;
//! use jux_core::bindings::{add, and, number};
//!
//! let a = IntegerProperty::new(2);
//! let total = add(&a, 0.5);
//! assert_eq!(total.double_value(), 2.5);
//!
//! let positive = number::greater_than(&a, 0);
//! let enabled = BooleanProperty::new(true);
//! let show = and(&enabled, &positive);
//! assert!(show.get());
//! ```

pub mod boolean;
pub mod collection;
pub mod number;
pub mod object;
pub mod string;

mod create;
mod operand;
mod when;

pub use boolean::{and, not, or};
pub use collection::{
    boolean_value_at, boolean_value_at_key, double_value_at, double_value_at_key, integer_value_at,
    integer_value_at_key, is_empty, is_not_empty, long_value_at, long_value_at_key, map_is_empty,
    map_is_not_empty, map_size, set_is_empty, set_is_not_empty, set_size, size, string_value_at,
    string_value_at_key, value_at, value_at_key, ListIndex, NumberValue,
};
pub use create::{
    create_boolean_binding, create_double_binding, create_integer_binding, create_long_binding,
    create_object_binding, create_string_binding,
};
pub use number::{
    add, divide, max, min, multiply, negate, subtract, NumberBinding, NumberDomain, NumberOperand,
};
pub use operand::Operand;
pub use string::{concat, convert, format, DisplayValue, StringArg};
pub use when::{when, Then, ThenNumber, When};
