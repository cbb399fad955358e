//! String bindings.
//!
//! [`concat`] and [`format`] take a mix of constant and observed
//! [`StringArg`]s. Only observed arguments become dependencies, but every
//! argument is stringified again on each evaluation. An absent value
//! (`None`) renders as `"null"`.
//!
//! # Format Patterns
//!
//! [`format`] uses brace placeholders: `{}` takes the next argument, `{n}`
//! takes argument `n`, and `{{` / `}}` are literal braces. A pattern that
//! refers to a missing argument is a compute error, so the binding falls
//! back to `""`.

use std::fmt;
use std::rc::Rc;

use crate::error::{BindingError, ComputeResult};
use crate::reactive::{
    Binding, BindingValue, BooleanBinding, Dependency, IntegerBinding, ObservableValue, Property,
    StringBinding,
};

use super::number::NumberBinding;
use super::operand::{dependencies, Operand};

/// Conversion of a bound value to its display string.
pub trait DisplayValue {
    fn display_string(&self) -> String;
}

macro_rules! display_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DisplayValue for $ty {
                fn display_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_value!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String);

impl DisplayValue for &'static str {
    fn display_string(&self) -> String {
        (*self).to_string()
    }
}

impl<T: DisplayValue> DisplayValue for Option<T> {
    fn display_string(&self) -> String {
        match self {
            Some(value) => value.display_string(),
            None => "null".to_string(),
        }
    }
}

/// One argument of [`concat`] or [`format`].
#[derive(Clone)]
pub struct StringArg {
    render: Rc<dyn Fn() -> String>,
    dependency: Option<Dependency>,
}

impl StringArg {
    /// A constant argument.
    pub fn constant<T: DisplayValue + 'static>(value: T) -> Self {
        Self {
            render: Rc::new(move || value.display_string()),
            dependency: None,
        }
    }

    /// An argument observing `observable`.
    pub fn observed<T, O>(observable: &O) -> Self
    where
        T: DisplayValue,
        O: ObservableValue<T> + Clone + 'static,
    {
        let shared = Rc::new(observable.clone());
        let source = shared.clone();
        Self {
            render: Rc::new(move || source.get().display_string()),
            dependency: Some(shared),
        }
    }

    fn render(&self) -> String {
        (self.render)()
    }
}

impl fmt::Debug for StringArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringArg")
            .field("observed", &self.dependency.is_some())
            .finish()
    }
}

impl From<&str> for StringArg {
    fn from(value: &str) -> Self {
        Self::constant(value.to_string())
    }
}

impl From<String> for StringArg {
    fn from(value: String) -> Self {
        Self::constant(value)
    }
}

impl<T: BindingValue + DisplayValue> From<&Property<T>> for StringArg {
    fn from(property: &Property<T>) -> Self {
        Self::observed(property)
    }
}

impl<T: BindingValue + DisplayValue> From<&Binding<T>> for StringArg {
    fn from(binding: &Binding<T>) -> Self {
        Self::observed(binding)
    }
}

impl From<&NumberBinding> for StringArg {
    fn from(binding: &NumberBinding) -> Self {
        match binding {
            NumberBinding::Integer(b) => Self::observed(b),
            NumberBinding::Long(b) => Self::observed(b),
            NumberBinding::Double(b) => Self::observed(b),
        }
    }
}

impl<T: DisplayValue + 'static> From<Operand<T>> for StringArg {
    fn from(operand: Operand<T>) -> Self {
        let dependency = operand.as_dependency();
        Self {
            render: Rc::new(move || operand.get().display_string()),
            dependency,
        }
    }
}

/// Concatenate the display strings of `args`.
///
/// # Example
///
/// ```rust
/// use jux_core::prelude::*;
/// use jux_core::bindings::concat;
///
/// let name = StringProperty::new("World".into());
/// let greeting = concat(["Hello, ".into(), (&name).into(), "!".into()]);
/// assert_eq!(greeting.get(), "Hello, World!");
/// ```
pub fn concat<I>(args: I) -> StringBinding
where
    I: IntoIterator<Item = StringArg>,
{
    let args: Vec<StringArg> = args.into_iter().collect();
    let deps = dependencies(args.iter().map(|arg| arg.dependency.clone()));
    Binding::with_dependencies(
        move || Ok(args.iter().map(StringArg::render).collect::<String>()),
        deps,
    )
}

/// Render `pattern` with the display strings of `args`.
pub fn format<I>(pattern: impl Into<String>, args: I) -> StringBinding
where
    I: IntoIterator<Item = StringArg>,
{
    let pattern = pattern.into();
    let args: Vec<StringArg> = args.into_iter().collect();
    let deps = dependencies(args.iter().map(|arg| arg.dependency.clone()));
    Binding::with_dependencies(
        move || {
            let rendered: Vec<String> = args.iter().map(StringArg::render).collect();
            render_pattern(&pattern, &rendered)
        },
        deps,
    )
}

/// The display string of `value`.
pub fn convert<T>(value: impl Into<Operand<T>>) -> StringBinding
where
    T: DisplayValue + 'static,
{
    concat([StringArg::from(value.into())])
}

fn render_pattern(pattern: &str, args: &[String]) -> ComputeResult<String> {
    let invalid = |reason: String| BindingError::Format {
        pattern: pattern.to_string(),
        reason,
    };

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut spec = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => spec.push(ch),
                        None => return Err(invalid("unclosed '{'".to_string())),
                    }
                }
                let index = if spec.is_empty() {
                    next_arg += 1;
                    next_arg - 1
                } else {
                    spec.trim()
                        .parse::<usize>()
                        .map_err(|_| invalid(format!("invalid placeholder {{{spec}}}")))?
                };
                let arg = args
                    .get(index)
                    .ok_or_else(|| invalid(format!("missing argument {index}")))?;
                out.push_str(arg);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid("unmatched '}'".to_string())),
            _ => out.push(c),
        }
    }
    Ok(out)
}

// ----------------------------------------------------------------------------
// Comparison
// ----------------------------------------------------------------------------

fn compare_strings<F>(a: Operand<String>, b: Operand<String>, op: F) -> BooleanBinding
where
    F: Fn(&str, &str) -> bool + 'static,
{
    let deps = dependencies([a.as_dependency(), b.as_dependency()]);
    Binding::with_dependencies(move || Ok(op(&a.get(), &b.get())), deps)
}

pub fn equal(a: impl Into<Operand<String>>, b: impl Into<Operand<String>>) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x == y)
}

pub fn not_equal(a: impl Into<Operand<String>>, b: impl Into<Operand<String>>) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x != y)
}

pub fn equal_ignore_case(
    a: impl Into<Operand<String>>,
    b: impl Into<Operand<String>>,
) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x.to_lowercase() == y.to_lowercase())
}

pub fn not_equal_ignore_case(
    a: impl Into<Operand<String>>,
    b: impl Into<Operand<String>>,
) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x.to_lowercase() != y.to_lowercase())
}

/// Lexicographic `a > b`.
pub fn greater_than(a: impl Into<Operand<String>>, b: impl Into<Operand<String>>) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x > y)
}

/// Lexicographic `a < b`.
pub fn less_than(a: impl Into<Operand<String>>, b: impl Into<Operand<String>>) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x < y)
}

pub fn greater_than_or_equal(
    a: impl Into<Operand<String>>,
    b: impl Into<Operand<String>>,
) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x >= y)
}

pub fn less_than_or_equal(
    a: impl Into<Operand<String>>,
    b: impl Into<Operand<String>>,
) -> BooleanBinding {
    compare_strings(a.into(), b.into(), |x, y| x <= y)
}

/// Number of characters in `a`.
pub fn length(a: impl Into<Operand<String>>) -> IntegerBinding {
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    Binding::with_dependencies(
        move || Ok(i32::try_from(a.get().chars().count()).unwrap_or(i32::MAX)),
        deps,
    )
}

pub fn is_empty(a: impl Into<Operand<String>>) -> BooleanBinding {
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    Binding::with_dependencies(move || Ok(a.get().is_empty()), deps)
}

pub fn is_not_empty(a: impl Into<Operand<String>>) -> BooleanBinding {
    let a = a.into();
    let deps = dependencies([a.as_dependency()]);
    Binding::with_dependencies(move || Ok(!a.get().is_empty()), deps)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
