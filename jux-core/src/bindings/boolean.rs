//! Boolean bindings.
//!
//! `and` and `or` short-circuit their invalidation, not just their
//! evaluation. The binding listens to both operands, but an invalidation
//! from the second operand only propagates when it can change the result:
//! for `and` while the first operand is `true`, for `or` while it is
//! `false`. An invalidation from the first operand always propagates.
//!
//! The check compares observable identity. For `and(x, x)` every
//! invalidation comes from the first operand, so it always propagates.

use crate::reactive::{Binding, BooleanBinding, Observable};

use super::operand::{dependencies, Operand};

/// `a && b`, invalidated by `b` only while `a` is `true`.
pub fn and(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> BooleanBinding {
    short_circuit(a.into(), b.into(), true)
}

/// `a || b`, invalidated by `b` only while `a` is `false`.
pub fn or(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> BooleanBinding {
    short_circuit(a.into(), b.into(), false)
}

/// `b` matters only while `a` equals `relevant_when`.
fn short_circuit(a: Operand<bool>, b: Operand<bool>, relevant_when: bool) -> BooleanBinding {
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    let first = a.clone();
    let first_id = a.id();
    let compute = move || {
        Ok(if relevant_when {
            a.get() && b.get()
        } else {
            a.get() || b.get()
        })
    };
    Binding::with_observer(compute, deps, move |binding, source: &dyn Observable| {
        source.id() == first_id || (binding.is_valid() && first.get() == relevant_when)
    })
}

/// `!a`.
pub fn not(a: impl Into<Operand<bool>>) -> BooleanBinding {
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    Binding::with_dependencies(move || Ok(!a.get()), deps)
}

/// `a == b`.
pub fn equal(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> BooleanBinding {
    let (a, b) = (a.into(), b.into());
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get() == b.get()), deps)
}

/// `a != b`.
pub fn not_equal(a: impl Into<Operand<bool>>, b: impl Into<Operand<bool>>) -> BooleanBinding {
    let (a, b) = (a.into(), b.into());
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get() != b.get()), deps)
}
