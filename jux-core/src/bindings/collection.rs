//! Bindings over observable collections.
//!
//! The collection itself is a dependency: any change to it invalidates the
//! binding. Element accessors take their index (or key) either as a
//! constant or as an observed value, which then is a dependency too.
//!
//! An index outside the list yields the default of the binding's domain
//! (`None`, `false`, `0`, `0.0`, `""`) and is logged at debug level. A
//! missing map key yields the same default without logging.

use std::fmt;
use std::hash::Hash;

use crate::collections::{ObservableList, ObservableMap, ObservableSet};
use crate::reactive::{
    dependency, Binding, BindingValue, BooleanBinding, Dependency, DoubleBinding, IntegerBinding,
    IntegerProperty, LongBinding, ObjectBinding, Observable, StringBinding,
};

use super::operand::{dependencies, Operand};

// ----------------------------------------------------------------------------
// Index operands
// ----------------------------------------------------------------------------

/// Position argument of the `value_at` family.
#[derive(Clone)]
pub enum ListIndex {
    Fixed(usize),
    /// An observed integer. Negative values are out of range.
    Observed(Operand<i32>),
}

impl ListIndex {
    /// The current position, or `None` if it is negative.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Fixed(index) => Some(*index),
            Self::Observed(operand) => usize::try_from(operand.get()).ok(),
        }
    }

    fn as_dependency(&self) -> Option<Dependency> {
        match self {
            Self::Fixed(_) => None,
            Self::Observed(operand) => operand.as_dependency(),
        }
    }
}

impl fmt::Debug for ListIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(index) => write!(f, "Fixed({index})"),
            Self::Observed(operand) => write!(f, "Observed({})", operand.id()),
        }
    }
}

impl From<usize> for ListIndex {
    fn from(index: usize) -> Self {
        Self::Fixed(index)
    }
}

impl From<Operand<i32>> for ListIndex {
    fn from(operand: Operand<i32>) -> Self {
        Self::Observed(operand)
    }
}

impl From<&IntegerProperty> for ListIndex {
    fn from(property: &IntegerProperty) -> Self {
        Self::Observed(Operand::observed(property))
    }
}

impl From<&IntegerBinding> for ListIndex {
    fn from(binding: &IntegerBinding) -> Self {
        Self::Observed(Operand::observed(binding))
    }
}

/// Numeric element types readable through the typed numeric accessors.
pub trait NumberValue: Clone + 'static {
    fn to_i32(&self) -> i32;
    fn to_i64(&self) -> i64;
    fn to_f64(&self) -> f64;
}

macro_rules! number_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NumberValue for $ty {
                fn to_i32(&self) -> i32 {
                    *self as i32
                }

                fn to_i64(&self) -> i64 {
                    *self as i64
                }

                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

number_value!(i8, i16, i32, i64, u8, u16, u32, f32, f64);

// ----------------------------------------------------------------------------
// Size
// ----------------------------------------------------------------------------

fn len_binding<C, F, T>(collection: &C, read: F) -> Binding<T>
where
    C: Observable + Clone + 'static,
    F: Fn(&C) -> T + 'static,
    T: BindingValue,
{
    let source = collection.clone();
    Binding::with_dependencies(move || Ok(read(&source)), [dependency(collection)])
}

/// Lengths past `i32::MAX` saturate.
fn int_len(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Number of elements in `list`.
pub fn size<E, L>(list: &L) -> IntegerBinding
where
    L: ObservableList<E> + Clone + 'static,
{
    len_binding(list, |l| int_len(l.len()))
}

pub fn is_empty<E, L>(list: &L) -> BooleanBinding
where
    L: ObservableList<E> + Clone + 'static,
{
    len_binding(list, |l| l.is_empty())
}

pub fn is_not_empty<E, L>(list: &L) -> BooleanBinding
where
    L: ObservableList<E> + Clone + 'static,
{
    len_binding(list, |l| !l.is_empty())
}

pub fn set_size<E, S>(set: &S) -> IntegerBinding
where
    S: ObservableSet<E> + Clone + 'static,
{
    len_binding(set, |s| int_len(s.len()))
}

pub fn set_is_empty<E, S>(set: &S) -> BooleanBinding
where
    S: ObservableSet<E> + Clone + 'static,
{
    len_binding(set, |s| s.is_empty())
}

pub fn set_is_not_empty<E, S>(set: &S) -> BooleanBinding
where
    S: ObservableSet<E> + Clone + 'static,
{
    len_binding(set, |s| !s.is_empty())
}

pub fn map_size<K, V, M>(map: &M) -> IntegerBinding
where
    M: ObservableMap<K, V> + Clone + 'static,
{
    len_binding(map, |m| int_len(m.len()))
}

pub fn map_is_empty<K, V, M>(map: &M) -> BooleanBinding
where
    M: ObservableMap<K, V> + Clone + 'static,
{
    len_binding(map, |m| m.is_empty())
}

pub fn map_is_not_empty<K, V, M>(map: &M) -> BooleanBinding
where
    M: ObservableMap<K, V> + Clone + 'static,
{
    len_binding(map, |m| !m.is_empty())
}

// ----------------------------------------------------------------------------
// Element access
// ----------------------------------------------------------------------------

fn element_binding<E, L, T, F>(list: &L, index: ListIndex, convert: F) -> Binding<T>
where
    L: ObservableList<E> + Clone + 'static,
    T: BindingValue,
    F: Fn(E) -> T + 'static,
{
    let source = list.clone();
    let deps = dependencies([Some(dependency(list)), index.as_dependency()]);
    Binding::with_dependencies(
        move || {
            let element = index.position().and_then(|position| source.get(position));
            Ok(match element {
                Some(element) => convert(element),
                None => {
                    tracing::debug!(
                        list = %source.id(),
                        ?index,
                        len = source.len(),
                        "list index out of range"
                    );
                    T::default()
                }
            })
        },
        deps,
    )
}

/// The element at `index`, or `None` when `index` is out of range.
///
/// # Example
///
/// ```rust
/// use jux_core::prelude::*;
/// use jux_core::bindings::value_at;
///
/// let list = VecList::from(vec!["a", "b"]);
/// let cursor = IntegerProperty::new(1);
/// let current = value_at(&list, &cursor);
/// assert_eq!(current.get(), Some("b"));
///
/// cursor.set(5);
/// assert_eq!(current.get(), None);
/// ```
pub fn value_at<E, L>(list: &L, index: impl Into<ListIndex>) -> ObjectBinding<E>
where
    E: Clone + PartialEq + 'static,
    L: ObservableList<E> + Clone + 'static,
{
    element_binding(list, index.into(), Some)
}

pub fn boolean_value_at<L>(list: &L, index: impl Into<ListIndex>) -> BooleanBinding
where
    L: ObservableList<bool> + Clone + 'static,
{
    element_binding(list, index.into(), |value| value)
}

pub fn integer_value_at<E, L>(list: &L, index: impl Into<ListIndex>) -> IntegerBinding
where
    E: NumberValue,
    L: ObservableList<E> + Clone + 'static,
{
    element_binding(list, index.into(), |value: E| value.to_i32())
}

pub fn long_value_at<E, L>(list: &L, index: impl Into<ListIndex>) -> LongBinding
where
    E: NumberValue,
    L: ObservableList<E> + Clone + 'static,
{
    element_binding(list, index.into(), |value: E| value.to_i64())
}

pub fn double_value_at<E, L>(list: &L, index: impl Into<ListIndex>) -> DoubleBinding
where
    E: NumberValue,
    L: ObservableList<E> + Clone + 'static,
{
    element_binding(list, index.into(), |value: E| value.to_f64())
}

pub fn string_value_at<L>(list: &L, index: impl Into<ListIndex>) -> StringBinding
where
    L: ObservableList<String> + Clone + 'static,
{
    element_binding(list, index.into(), |value| value)
}

// ----------------------------------------------------------------------------
// Map access
// ----------------------------------------------------------------------------

fn entry_binding<K, V, M, T, F>(map: &M, key: Operand<K>, convert: F) -> Binding<T>
where
    K: Clone + Eq + Hash + 'static,
    M: ObservableMap<K, V> + Clone + 'static,
    T: BindingValue,
    F: Fn(V) -> T + 'static,
{
    let source = map.clone();
    let deps = dependencies([Some(dependency(map)), key.as_dependency()]);
    Binding::with_dependencies(
        move || Ok(source.get(&key.get()).map(&convert).unwrap_or_default()),
        deps,
    )
}

/// The value stored under `key`, or `None` when the key is absent.
pub fn value_at_key<K, V, M>(map: &M, key: impl Into<Operand<K>>) -> ObjectBinding<V>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
    M: ObservableMap<K, V> + Clone + 'static,
{
    entry_binding(map, key.into(), Some)
}

pub fn boolean_value_at_key<K, M>(map: &M, key: impl Into<Operand<K>>) -> BooleanBinding
where
    K: Clone + Eq + Hash + 'static,
    M: ObservableMap<K, bool> + Clone + 'static,
{
    entry_binding(map, key.into(), |value| value)
}

pub fn integer_value_at_key<K, V, M>(map: &M, key: impl Into<Operand<K>>) -> IntegerBinding
where
    K: Clone + Eq + Hash + 'static,
    V: NumberValue,
    M: ObservableMap<K, V> + Clone + 'static,
{
    entry_binding(map, key.into(), |value: V| value.to_i32())
}

pub fn long_value_at_key<K, V, M>(map: &M, key: impl Into<Operand<K>>) -> LongBinding
where
    K: Clone + Eq + Hash + 'static,
    V: NumberValue,
    M: ObservableMap<K, V> + Clone + 'static,
{
    entry_binding(map, key.into(), |value: V| value.to_i64())
}

pub fn double_value_at_key<K, V, M>(map: &M, key: impl Into<Operand<K>>) -> DoubleBinding
where
    K: Clone + Eq + Hash + 'static,
    V: NumberValue,
    M: ObservableMap<K, V> + Clone + 'static,
{
    entry_binding(map, key.into(), |value: V| value.to_f64())
}

pub fn string_value_at_key<K, M>(map: &M, key: impl Into<Operand<K>>) -> StringBinding
where
    K: Clone + Eq + Hash + 'static,
    M: ObservableMap<K, String> + Clone + 'static,
{
    entry_binding(map, key.into(), |value| value)
}
