//! Numeric bindings.
//!
//! # Type Promotion
//!
//! Every binary arithmetic or comparison function picks its computation
//! domain from the operands: double if either operand is a double, else long
//! if either is a long, else integer. [`NumberDomain`] is ordered so that
//! promotion is `max`.
//!
//! Integer and long arithmetic wraps on overflow. Integer and long division
//! by zero is a compute error, so the binding falls back to `0`. Double
//! arithmetic follows IEEE 754.

use std::fmt;

use crate::error::{BindingError, ComputeResult};
use crate::reactive::{
    Binding, BooleanBinding, Constant, Dependency, DoubleBinding, IntegerBinding,
    InvalidationListener, ListenerState, LongBinding, Observable, ObservableId, ObservableValue,
    Property,
};

use super::operand::{dependencies, Operand};

/// The value domain of a numeric operand or binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumberDomain {
    Integer,
    Long,
    Double,
}

impl NumberDomain {
    /// The domain a binary operation over `self` and `other` computes in.
    pub fn promote(self, other: NumberDomain) -> NumberDomain {
        self.max(other)
    }
}

/// A numeric input of a derived binding.
#[derive(Clone)]
pub enum NumberOperand {
    Integer(Operand<i32>),
    Long(Operand<i64>),
    Double(Operand<f64>),
}

impl NumberOperand {
    pub fn domain(&self) -> NumberDomain {
        match self {
            Self::Integer(_) => NumberDomain::Integer,
            Self::Long(_) => NumberDomain::Long,
            Self::Double(_) => NumberDomain::Double,
        }
    }

    pub fn int_value(&self) -> i32 {
        match self {
            Self::Integer(op) => op.get(),
            Self::Long(op) => op.get() as i32,
            Self::Double(op) => op.get() as i32,
        }
    }

    pub fn long_value(&self) -> i64 {
        match self {
            Self::Integer(op) => i64::from(op.get()),
            Self::Long(op) => op.get(),
            Self::Double(op) => op.get() as i64,
        }
    }

    pub fn double_value(&self) -> f64 {
        match self {
            Self::Integer(op) => f64::from(op.get()),
            Self::Long(op) => op.get() as f64,
            Self::Double(op) => op.get(),
        }
    }

    pub fn id(&self) -> ObservableId {
        match self {
            Self::Integer(op) => op.id(),
            Self::Long(op) => op.id(),
            Self::Double(op) => op.id(),
        }
    }

    pub fn as_dependency(&self) -> Option<Dependency> {
        match self {
            Self::Integer(op) => op.as_dependency(),
            Self::Long(op) => op.as_dependency(),
            Self::Double(op) => op.as_dependency(),
        }
    }
}

impl fmt::Debug for NumberOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberOperand")
            .field("domain", &self.domain())
            .field("id", &self.id())
            .finish()
    }
}

macro_rules! number_operand {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for NumberOperand {
            fn from(value: $ty) -> Self {
                Self::$variant(Operand::constant(value))
            }
        }

        impl From<Operand<$ty>> for NumberOperand {
            fn from(operand: Operand<$ty>) -> Self {
                Self::$variant(operand)
            }
        }

        impl From<&Property<$ty>> for NumberOperand {
            fn from(property: &Property<$ty>) -> Self {
                Self::$variant(Operand::observed(property))
            }
        }

        impl From<&Binding<$ty>> for NumberOperand {
            fn from(binding: &Binding<$ty>) -> Self {
                Self::$variant(Operand::observed(binding))
            }
        }

        impl From<&Constant<$ty>> for NumberOperand {
            fn from(constant: &Constant<$ty>) -> Self {
                Self::$variant(constant.into())
            }
        }
    };
}

number_operand!(Integer, i32);
number_operand!(Long, i64);
number_operand!(Double, f64);

impl From<&NumberBinding> for NumberOperand {
    fn from(binding: &NumberBinding) -> Self {
        match binding {
            NumberBinding::Integer(b) => Self::Integer(Operand::observed(b)),
            NumberBinding::Long(b) => Self::Long(Operand::observed(b)),
            NumberBinding::Double(b) => Self::Double(Operand::observed(b)),
        }
    }
}

impl From<NumberBinding> for NumberOperand {
    fn from(binding: NumberBinding) -> Self {
        Self::from(&binding)
    }
}

/// A numeric binding tagged with its domain.
#[derive(Clone)]
pub enum NumberBinding {
    Integer(IntegerBinding),
    Long(LongBinding),
    Double(DoubleBinding),
}

impl NumberBinding {
    pub fn domain(&self) -> NumberDomain {
        match self {
            Self::Integer(_) => NumberDomain::Integer,
            Self::Long(_) => NumberDomain::Long,
            Self::Double(_) => NumberDomain::Double,
        }
    }

    pub fn int_value(&self) -> i32 {
        match self {
            Self::Integer(b) => b.get(),
            Self::Long(b) => b.get() as i32,
            Self::Double(b) => b.get() as i32,
        }
    }

    pub fn long_value(&self) -> i64 {
        match self {
            Self::Integer(b) => i64::from(b.get()),
            Self::Long(b) => b.get(),
            Self::Double(b) => b.get() as i64,
        }
    }

    pub fn double_value(&self) -> f64 {
        match self {
            Self::Integer(b) => f64::from(b.get()),
            Self::Long(b) => b.get() as f64,
            Self::Double(b) => b.get(),
        }
    }

    pub fn as_integer(&self) -> Option<&IntegerBinding> {
        match self {
            Self::Integer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<&LongBinding> {
        match self {
            Self::Long(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<&DoubleBinding> {
        match self {
            Self::Double(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::Integer(b) => b.is_valid(),
            Self::Long(b) => b.is_valid(),
            Self::Double(b) => b.is_valid(),
        }
    }

    pub fn invalidate(&self) {
        match self {
            Self::Integer(b) => b.invalidate(),
            Self::Long(b) => b.invalidate(),
            Self::Double(b) => b.invalidate(),
        }
    }

    pub fn dispose(&self) {
        match self {
            Self::Integer(b) => b.dispose(),
            Self::Long(b) => b.dispose(),
            Self::Double(b) => b.dispose(),
        }
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        match self {
            Self::Integer(b) => b.dependencies(),
            Self::Long(b) => b.dependencies(),
            Self::Double(b) => b.dependencies(),
        }
    }

    pub fn listener_state(&self) -> ListenerState {
        match self {
            Self::Integer(b) => b.listener_state(),
            Self::Long(b) => b.listener_state(),
            Self::Double(b) => b.listener_state(),
        }
    }
}

impl Observable for NumberBinding {
    fn id(&self) -> ObservableId {
        match self {
            Self::Integer(b) => b.id(),
            Self::Long(b) => b.id(),
            Self::Double(b) => b.id(),
        }
    }

    fn add_listener(&self, listener: InvalidationListener) {
        match self {
            Self::Integer(b) => b.add_listener(listener),
            Self::Long(b) => b.add_listener(listener),
            Self::Double(b) => b.add_listener(listener),
        }
    }

    fn remove_listener(&self, listener: &InvalidationListener) {
        match self {
            Self::Integer(b) => b.remove_listener(listener),
            Self::Long(b) => b.remove_listener(listener),
            Self::Double(b) => b.remove_listener(listener),
        }
    }
}

impl fmt::Debug for NumberBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(b) => f.debug_tuple("Integer").field(b).finish(),
            Self::Long(b) => f.debug_tuple("Long").field(b).finish(),
            Self::Double(b) => f.debug_tuple("Double").field(b).finish(),
        }
    }
}

// ----------------------------------------------------------------------------
// Arithmetic
// ----------------------------------------------------------------------------

fn arithmetic<I, L, D>(a: NumberOperand, b: NumberOperand, int: I, long: L, double: D) -> NumberBinding
where
    I: Fn(i32, i32) -> ComputeResult<i32> + 'static,
    L: Fn(i64, i64) -> ComputeResult<i64> + 'static,
    D: Fn(f64, f64) -> f64 + 'static,
{
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    match a.domain().promote(b.domain()) {
        NumberDomain::Integer => NumberBinding::Integer(Binding::with_dependencies(
            move || int(a.int_value(), b.int_value()),
            deps,
        )),
        NumberDomain::Long => NumberBinding::Long(Binding::with_dependencies(
            move || long(a.long_value(), b.long_value()),
            deps,
        )),
        NumberDomain::Double => NumberBinding::Double(Binding::with_dependencies(
            move || Ok(double(a.double_value(), b.double_value())),
            deps,
        )),
    }
}

/// `-a`, in `a`'s domain.
pub fn negate(a: impl Into<NumberOperand>) -> NumberBinding {
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    match a.domain() {
        NumberDomain::Integer => {
            NumberBinding::Integer(Binding::with_dependencies(move || Ok(a.int_value().wrapping_neg()), deps))
        }
        NumberDomain::Long => {
            NumberBinding::Long(Binding::with_dependencies(move || Ok(a.long_value().wrapping_neg()), deps))
        }
        NumberDomain::Double => {
            NumberBinding::Double(Binding::with_dependencies(move || Ok(-a.double_value()), deps))
        }
    }
}

/// `a + b` in the promoted domain.
pub fn add(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> NumberBinding {
    arithmetic(
        a.into(),
        b.into(),
        |x, y| Ok(x.wrapping_add(y)),
        |x, y| Ok(x.wrapping_add(y)),
        |x, y| x + y,
    )
}

/// `a - b` in the promoted domain.
pub fn subtract(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> NumberBinding {
    arithmetic(
        a.into(),
        b.into(),
        |x, y| Ok(x.wrapping_sub(y)),
        |x, y| Ok(x.wrapping_sub(y)),
        |x, y| x - y,
    )
}

/// `a * b` in the promoted domain.
pub fn multiply(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> NumberBinding {
    arithmetic(
        a.into(),
        b.into(),
        |x, y| Ok(x.wrapping_mul(y)),
        |x, y| Ok(x.wrapping_mul(y)),
        |x, y| x * y,
    )
}

/// `a / b` in the promoted domain. Integer and long division truncate;
/// dividing by zero yields the fallback `0`.
pub fn divide(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> NumberBinding {
    arithmetic(
        a.into(),
        b.into(),
        |x, y| {
            if y == 0 {
                Err(BindingError::DivisionByZero)
            } else {
                Ok(x.wrapping_div(y))
            }
        },
        |x, y| {
            if y == 0 {
                Err(BindingError::DivisionByZero)
            } else {
                Ok(x.wrapping_div(y))
            }
        },
        |x, y| x / y,
    )
}

/// The smaller of `a` and `b` in the promoted domain.
pub fn min(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> NumberBinding {
    arithmetic(
        a.into(),
        b.into(),
        |x, y| Ok(x.min(y)),
        |x, y| Ok(x.min(y)),
        |x, y| if x.is_nan() || y.is_nan() { f64::NAN } else { x.min(y) },
    )
}

/// The larger of `a` and `b` in the promoted domain.
pub fn max(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> NumberBinding {
    arithmetic(
        a.into(),
        b.into(),
        |x, y| Ok(x.max(y)),
        |x, y| Ok(x.max(y)),
        |x, y| if x.is_nan() || y.is_nan() { f64::NAN } else { x.max(y) },
    )
}

// ----------------------------------------------------------------------------
// Comparison
// ----------------------------------------------------------------------------

fn compare<I, L, D>(a: NumberOperand, b: NumberOperand, int: I, long: L, double: D) -> BooleanBinding
where
    I: Fn(i32, i32) -> bool + 'static,
    L: Fn(i64, i64) -> bool + 'static,
    D: Fn(f64, f64) -> bool + 'static,
{
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    match a.domain().promote(b.domain()) {
        NumberDomain::Integer => {
            Binding::with_dependencies(move || Ok(int(a.int_value(), b.int_value())), deps)
        }
        NumberDomain::Long => {
            Binding::with_dependencies(move || Ok(long(a.long_value(), b.long_value())), deps)
        }
        NumberDomain::Double => {
            Binding::with_dependencies(move || Ok(double(a.double_value(), b.double_value())), deps)
        }
    }
}

/// `a == b`, exact.
pub fn equal(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> BooleanBinding {
    equal_with_epsilon(a, b, 0.0)
}

/// `|a - b| <= epsilon` in the promoted domain.
pub fn equal_with_epsilon(
    a: impl Into<NumberOperand>,
    b: impl Into<NumberOperand>,
    epsilon: f64,
) -> BooleanBinding {
    compare(
        a.into(),
        b.into(),
        move |x, y| f64::from(x.abs_diff(y)) <= epsilon,
        move |x, y| x.abs_diff(y) as f64 <= epsilon,
        move |x, y| (x - y).abs() <= epsilon,
    )
}

/// `a != b`, exact.
pub fn not_equal(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> BooleanBinding {
    not_equal_with_epsilon(a, b, 0.0)
}

/// `|a - b| > epsilon` in the promoted domain.
pub fn not_equal_with_epsilon(
    a: impl Into<NumberOperand>,
    b: impl Into<NumberOperand>,
    epsilon: f64,
) -> BooleanBinding {
    compare(
        a.into(),
        b.into(),
        move |x, y| f64::from(x.abs_diff(y)) > epsilon,
        move |x, y| x.abs_diff(y) as f64 > epsilon,
        move |x, y| (x - y).abs() > epsilon,
    )
}

pub fn greater_than(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> BooleanBinding {
    compare(a.into(), b.into(), |x, y| x > y, |x, y| x > y, |x, y| x > y)
}

pub fn less_than(a: impl Into<NumberOperand>, b: impl Into<NumberOperand>) -> BooleanBinding {
    compare(a.into(), b.into(), |x, y| x < y, |x, y| x < y, |x, y| x < y)
}

pub fn greater_than_or_equal(
    a: impl Into<NumberOperand>,
    b: impl Into<NumberOperand>,
) -> BooleanBinding {
    compare(a.into(), b.into(), |x, y| x >= y, |x, y| x >= y, |x, y| x >= y)
}

pub fn less_than_or_equal(
    a: impl Into<NumberOperand>,
    b: impl Into<NumberOperand>,
) -> BooleanBinding {
    compare(a.into(), b.into(), |x, y| x <= y, |x, y| x <= y, |x, y| x <= y)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
