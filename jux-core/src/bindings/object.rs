//! Object bindings over optional values.

use crate::reactive::{Binding, BooleanBinding};

use super::operand::{dependencies, Operand};

/// `a == b`.
pub fn equal<T>(a: impl Into<Operand<Option<T>>>, b: impl Into<Operand<Option<T>>>) -> BooleanBinding
where
    T: Clone + PartialEq + 'static,
{
    let (a, b) = (a.into(), b.into());
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get() == b.get()), deps)
}

/// `a != b`.
pub fn not_equal<T>(
    a: impl Into<Operand<Option<T>>>,
    b: impl Into<Operand<Option<T>>>,
) -> BooleanBinding
where
    T: Clone + PartialEq + 'static,
{
    let (a, b) = (a.into(), b.into());
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get() != b.get()), deps)
}

/// Whether `a` holds no value.
pub fn is_null<T>(a: impl Into<Operand<Option<T>>>) -> BooleanBinding
where
    T: Clone + 'static,
{
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get().is_none()), deps)
}

/// Whether `a` holds a value.
pub fn is_not_null<T>(a: impl Into<Operand<Option<T>>>) -> BooleanBinding
where
    T: Clone + 'static,
{
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get().is_some()), deps)
}
