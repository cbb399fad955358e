//! Ternary expressions: `when(condition).then(a).otherwise(b)`.
//!
//! The resulting binding listens to the condition and both branches, but
//! only invalidates for the condition and for the branch the condition
//! currently selects. A change in the inactive branch cannot change the
//! result, so it is ignored.
//!
//! ```rust
//! use jux_core::prelude::*;
//! use jux_core::bindings::when;
//!
//! let logged_in = BooleanProperty::new(false);
//! let label = when(&logged_in).then("Log out").otherwise("Log in");
//! assert_eq!(label.get(), "Log in");
//! logged_in.set(true);
//! assert_eq!(label.get(), "Log out");
//! ```

use smallvec::SmallVec;

use crate::error::ComputeResult;
use crate::reactive::{Binding, BindingValue, Dependency, Observable, ObservableId};

use super::number::{NumberBinding, NumberDomain, NumberOperand};
use super::operand::{dependencies, Operand};

/// Start a ternary expression on `condition`.
pub fn when(condition: impl Into<Operand<bool>>) -> When {
    When {
        condition: condition.into(),
    }
}

/// A ternary expression awaiting its `then` branch.
#[derive(Debug, Clone)]
pub struct When {
    condition: Operand<bool>,
}

impl When {
    /// The value while the condition is `true`.
    pub fn then<T: BindingValue>(self, value: impl Into<Operand<T>>) -> Then<T> {
        Then {
            condition: self.condition,
            then: value.into(),
        }
    }

    /// A numeric `then` branch. The result domain is promoted across both
    /// branches.
    pub fn then_number(self, value: impl Into<NumberOperand>) -> ThenNumber {
        ThenNumber {
            condition: self.condition,
            then: value.into(),
        }
    }
}

/// A ternary expression awaiting its `otherwise` branch.
#[derive(Debug, Clone)]
pub struct Then<T> {
    condition: Operand<bool>,
    then: Operand<T>,
}

impl<T: BindingValue> Then<T> {
    /// The value while the condition is `false`; completes the expression.
    pub fn otherwise(self, value: impl Into<Operand<T>>) -> Binding<T> {
        let Then { condition, then } = self;
        let otherwise = value.into();
        let deps = dependencies([
            condition.as_dependency(),
            then.as_dependency(),
            otherwise.as_dependency(),
        ]);
        let branches = Branches {
            condition: condition.clone(),
            then: then.id(),
            otherwise: otherwise.id(),
        };
        ternary(
            branches,
            deps,
            move || Ok(if condition.get() { then.get() } else { otherwise.get() }),
        )
    }
}

/// A numeric ternary expression awaiting its `otherwise` branch.
#[derive(Debug, Clone)]
pub struct ThenNumber {
    condition: Operand<bool>,
    then: NumberOperand,
}

impl ThenNumber {
    /// The value while the condition is `false`; completes the expression.
    pub fn otherwise(self, value: impl Into<NumberOperand>) -> NumberBinding {
        let ThenNumber { condition, then } = self;
        let otherwise = value.into();
        let deps = dependencies([
            condition.as_dependency(),
            then.as_dependency(),
            otherwise.as_dependency(),
        ]);
        let branches = Branches {
            condition: condition.clone(),
            then: then.id(),
            otherwise: otherwise.id(),
        };
        match then.domain().promote(otherwise.domain()) {
            NumberDomain::Integer => NumberBinding::Integer(ternary(branches, deps, move || {
                Ok(if condition.get() { then.int_value() } else { otherwise.int_value() })
            })),
            NumberDomain::Long => NumberBinding::Long(ternary(branches, deps, move || {
                Ok(if condition.get() { then.long_value() } else { otherwise.long_value() })
            })),
            NumberDomain::Double => NumberBinding::Double(ternary(branches, deps, move || {
                Ok(if condition.get() { then.double_value() } else { otherwise.double_value() })
            })),
        }
    }
}

struct Branches {
    condition: Operand<bool>,
    then: ObservableId,
    otherwise: ObservableId,
}

impl Branches {
    /// Whether an invalidation of `source` can change a binding whose
    /// validity is `valid`.
    fn affects(&self, valid: bool, source: ObservableId) -> bool {
        if source == self.condition.id() {
            return true;
        }
        if !valid {
            return false;
        }
        if self.condition.get() {
            source == self.then
        } else {
            source == self.otherwise
        }
    }
}

fn ternary<T, F>(branches: Branches, deps: SmallVec<[Dependency; 2]>, compute: F) -> Binding<T>
where
    T: BindingValue,
    F: Fn() -> ComputeResult<T> + 'static,
{
    Binding::with_observer(compute, deps, move |binding, source: &dyn Observable| {
        branches.affects(binding.is_valid(), source.id())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{BooleanProperty, DoubleProperty, IntegerProperty, ObservableValue, StringProperty};

    #[test]
    fn selects_branch_by_condition() {
        let flag = BooleanProperty::new(true);
        let chosen = when(&flag).then(1_i32).otherwise(2);
        assert_eq!(chosen.get(), 1);

        flag.set(false);
        assert!(!chosen.is_valid());
        assert_eq!(chosen.get(), 2);
    }

    #[test]
    fn inactive_branch_is_ignored() {
        let flag = BooleanProperty::new(true);
        let yes = StringProperty::new("yes".into());
        let no = StringProperty::new("no".into());
        let chosen = when(&flag).then(&yes).otherwise(&no);
        assert_eq!(chosen.get(), "yes");

        no.set("nope".into());
        assert!(chosen.is_valid());

        yes.set("yep".into());
        assert!(!chosen.is_valid());
        assert_eq!(chosen.get(), "yep");

        flag.set(false);
        assert_eq!(chosen.get(), "nope");

        yes.set("ignored".into());
        assert!(chosen.is_valid());
    }

    #[test]
    fn numeric_branches_promote() {
        let flag = BooleanProperty::new(false);
        let count = IntegerProperty::new(3);
        let ratio = DoubleProperty::new(0.25);
        let chosen = when(&flag).then_number(&count).otherwise(&ratio);
        assert_eq!(chosen.domain(), NumberDomain::Double);
        assert_eq!(chosen.double_value(), 0.25);

        count.set(4);
        assert!(chosen.is_valid());

        flag.set(true);
        assert_eq!(chosen.double_value(), 4.0);

        let ints = when(&flag).then_number(1).otherwise(2);
        assert_eq!(ints.domain(), NumberDomain::Integer);
        assert_eq!(ints.int_value(), 1);
    }

    #[test]
    fn same_observable_in_both_branches() {
        let flag = BooleanProperty::new(false);
        let value = IntegerProperty::new(1);
        let chosen = when(&flag).then(&value).otherwise(&value);
        assert_eq!(chosen.get(), 1);

        value.set(2);
        assert!(!chosen.is_valid());
        assert_eq!(chosen.get(), 2);
    }

    #[test]
    fn constant_branches_only_depend_on_condition() {
        let flag = BooleanProperty::new(false);
        let chosen = when(&flag).then(true).otherwise(false);
        assert_eq!(chosen.dependencies().len(), 1);
        assert!(!chosen.get());
    }
}
