//! Operands of factory bindings.
//!
//! An [`Operand`] is either a constant or an observed value. Factory
//! functions accept `impl Into<Operand<T>>`, so plain values and observable
//! handles can be mixed freely. Only observed operands become dependencies
//! of the resulting binding.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::reactive::{
    Binding, BindingValue, Constant, Dependency, ObservableId, ObservableValue, Property,
};

/// A constant or observed input of a derived binding.
pub struct Operand<T> {
    value: Rc<dyn ObservableValue<T>>,
    dependency: Dependency,
    constant: bool,
}

impl<T: Clone + 'static> Operand<T> {
    /// A constant operand.
    pub fn constant(value: T) -> Self {
        let constant = Rc::new(Constant::new(value));
        Self {
            value: constant.clone(),
            dependency: constant,
            constant: true,
        }
    }

    /// An operand observing `observable`.
    pub fn observed<O>(observable: &O) -> Self
    where
        O: ObservableValue<T> + Clone + 'static,
    {
        let shared = Rc::new(observable.clone());
        Self {
            value: shared.clone(),
            dependency: shared,
            constant: false,
        }
    }
}

impl<T> Operand<T> {
    /// Read the operand's current value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Identity of the underlying observable.
    pub fn id(&self) -> ObservableId {
        self.dependency.id()
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// The dependency to register, or `None` for constants.
    pub fn as_dependency(&self) -> Option<Dependency> {
        (!self.constant).then(|| Rc::clone(&self.dependency))
    }
}

impl<T> Clone for Operand<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            dependency: Rc::clone(&self.dependency),
            constant: self.constant,
        }
    }
}

impl<T> fmt::Debug for Operand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operand")
            .field("id", &self.id())
            .field("constant", &self.constant)
            .finish()
    }
}

/// Collect the non-constant dependencies among `candidates`.
pub(crate) fn dependencies<I>(candidates: I) -> SmallVec<[Dependency; 2]>
where
    I: IntoIterator<Item = Option<Dependency>>,
{
    candidates.into_iter().flatten().collect()
}

macro_rules! constant_operand {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand<$ty> {
                fn from(value: $ty) -> Self {
                    Operand::constant(value)
                }
            }
        )*
    };
}

constant_operand!(bool, i32, i64, f64, String);

impl From<&str> for Operand<String> {
    fn from(value: &str) -> Self {
        Operand::constant(value.to_string())
    }
}

impl<T: Clone + 'static> From<Option<T>> for Operand<Option<T>> {
    fn from(value: Option<T>) -> Self {
        Operand::constant(value)
    }
}

impl<T: BindingValue> From<&Property<T>> for Operand<T> {
    fn from(property: &Property<T>) -> Self {
        Operand::observed(property)
    }
}

impl<T: BindingValue> From<Property<T>> for Operand<T> {
    fn from(property: Property<T>) -> Self {
        Operand::observed(&property)
    }
}

impl<T: BindingValue> From<&Binding<T>> for Operand<T> {
    fn from(binding: &Binding<T>) -> Self {
        Operand::observed(binding)
    }
}

impl<T: BindingValue> From<Binding<T>> for Operand<T> {
    fn from(binding: Binding<T>) -> Self {
        Operand::observed(&binding)
    }
}

impl<T: Clone + 'static> From<&Constant<T>> for Operand<T> {
    fn from(constant: &Constant<T>) -> Self {
        let shared = Rc::new(constant.clone());
        Self {
            value: shared.clone(),
            dependency: shared,
            constant: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{IntegerProperty, Observable};

    #[test]
    fn constants_have_no_dependency() {
        let op: Operand<i32> = 5.into();
        assert!(op.is_constant());
        assert!(op.as_dependency().is_none());
        assert_eq!(op.get(), 5);
    }

    #[test]
    fn observed_operand_tracks_the_source() {
        let property = IntegerProperty::new(1);
        let op: Operand<i32> = (&property).into();
        assert_eq!(op.id(), property.id());

        property.set(9);
        assert_eq!(op.get(), 9);
        assert!(op.as_dependency().is_some());
    }

    #[test]
    fn dependencies_skip_constants() {
        let property = IntegerProperty::new(1);
        let a: Operand<i32> = (&property).into();
        let b: Operand<i32> = 2.into();
        let deps = dependencies([a.as_dependency(), b.as_dependency()]);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id(), property.id());
    }
}
