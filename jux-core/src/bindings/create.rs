//! Custom binding constructors, one per value domain.

use crate::error::ComputeResult;
use crate::reactive::{
    Binding, BindingValue, BooleanBinding, Dependency, DoubleBinding, IntegerBinding, LongBinding,
    ObjectBinding, StringBinding,
};

/// Create a boolean binding from a compute function and its dependencies.
pub fn create_boolean_binding<F, I>(compute: F, dependencies: I) -> BooleanBinding
where
    F: Fn() -> ComputeResult<bool> + 'static,
    I: IntoIterator<Item = Dependency>,
{
    Binding::with_dependencies(compute, dependencies)
}

/// Create an integer binding from a compute function and its dependencies.
pub fn create_integer_binding<F, I>(compute: F, dependencies: I) -> IntegerBinding
where
    F: Fn() -> ComputeResult<i32> + 'static,
    I: IntoIterator<Item = Dependency>,
{
    Binding::with_dependencies(compute, dependencies)
}

/// Create a long binding from a compute function and its dependencies.
pub fn create_long_binding<F, I>(compute: F, dependencies: I) -> LongBinding
where
    F: Fn() -> ComputeResult<i64> + 'static,
    I: IntoIterator<Item = Dependency>,
{
    Binding::with_dependencies(compute, dependencies)
}

/// Create a double binding from a compute function and its dependencies.
pub fn create_double_binding<F, I>(compute: F, dependencies: I) -> DoubleBinding
where
    F: Fn() -> ComputeResult<f64> + 'static,
    I: IntoIterator<Item = Dependency>,
{
    Binding::with_dependencies(compute, dependencies)
}

/// Create a string binding from a compute function and its dependencies.
pub fn create_string_binding<F, I>(compute: F, dependencies: I) -> StringBinding
where
    F: Fn() -> ComputeResult<String> + 'static,
    I: IntoIterator<Item = Dependency>,
{
    Binding::with_dependencies(compute, dependencies)
}

/// Create an object binding from a compute function and its dependencies.
pub fn create_object_binding<T, F, I>(compute: F, dependencies: I) -> ObjectBinding<T>
where
    Option<T>: BindingValue,
    F: Fn() -> ComputeResult<Option<T>> + 'static,
    I: IntoIterator<Item = Dependency>,
{
    Binding::with_dependencies(compute, dependencies)
}
