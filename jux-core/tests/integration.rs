//! Integration Tests for the Reactive Engine
//!
//! These tests drive properties, bindings and collections together through
//! the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use jux_core::bindings::{self, add, and, concat, number, size, value_at, when};
use jux_core::collections::ListChangeRecord;
use jux_core::prelude::*;
use jux_core::reactive::{set_uncaught_handler, take_uncaught_handler, ListenerState};

fn counter() -> (Rc<Cell<u32>>, InvalidationListener) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, InvalidationListener::new(move |_| c.set(c.get() + 1)))
}

/// A binding computes once, no matter how often it is read.
#[test]
fn binding_is_lazy() {
    let calls = Rc::new(Cell::new(0));
    let base = IntegerProperty::new(10);

    let b = base.clone();
    let c = calls.clone();
    let doubled = Binding::with_dependencies(
        move || {
            c.set(c.get() + 1);
            Ok(b.get() * 2)
        },
        [dependency(&base)],
    );
    assert_eq!(calls.get(), 0);

    for _ in 0..5 {
        assert_eq!(doubled.get(), 20);
    }
    assert_eq!(calls.get(), 1);

    base.set(11);
    base.set(12);
    assert_eq!(calls.get(), 1);
    assert_eq!(doubled.get(), 24);
    assert_eq!(calls.get(), 2);
}

/// Invalidation travels through a chain of bindings, once per valid link.
#[test]
fn invalidation_reaches_every_dependent() {
    let width = IntegerProperty::new(2);
    let height = IntegerProperty::new(3);
    let area = number::multiply(&width, &height);
    let label = concat(["area=".into(), (&area).into()]);
    let (fired, listener) = counter();
    label.add_listener(listener);

    assert_eq!(label.get(), "area=6");
    width.set(4);
    assert!(!label.is_valid());
    height.set(5);
    assert_eq!(fired.get(), 1);
    assert_eq!(label.get(), "area=20");
}

#[test]
fn greeting_recomputes_once_per_change() {
    let name = StringProperty::new("World".into());
    let computes = Rc::new(Cell::new(0_u32));
    let (n, c) = (name.clone(), computes.clone());
    let greeting = bindings::create_string_binding(
        move || {
            c.set(c.get() + 1);
            Ok(format!("Hello, {}!", n.get()))
        },
        [dependency(&name)],
    );
    let (fired, listener) = counter();
    greeting.add_listener(listener);

    assert_eq!(greeting.get(), "Hello, World!");
    assert_eq!(computes.get(), 1);

    name.set("JUX".into());
    assert_eq!(fired.get(), 1);
    assert_eq!(computes.get(), 1);
    assert_eq!(greeting.get(), "Hello, JUX!");
    assert_eq!(greeting.get(), "Hello, JUX!");
    assert_eq!(computes.get(), 2);
    assert!(greeting.is_valid());

    let formatted = concat(["Hello, ".into(), (&name).into(), "!".into()]);
    assert_eq!(formatted.get(), greeting.get());
}

/// With `a` false, changes to `b` cannot change `and(a, b)`.
#[test]
fn and_short_circuits_the_second_operand() {
    let a = BooleanProperty::new(false);
    let b = BooleanProperty::new(true);
    let both = and(&a, &b);
    assert!(!both.get());

    b.set(false);
    b.set(true);
    assert!(both.is_valid());

    a.set(true);
    assert!(!both.is_valid());
    assert!(both.get());

    b.set(false);
    assert!(!both.is_valid());
    assert!(!both.get());
}

#[test]
fn same_operand_twice_always_propagates() {
    let x = BooleanProperty::new(false);
    let twice = and(&x, &x);
    assert!(!twice.get());
    x.set(true);
    assert!(!twice.is_valid());
    assert!(twice.get());
}

#[test]
fn arithmetic_promotes_to_the_widest_operand() {
    let count = IntegerProperty::new(3);
    let ratio = DoubleProperty::new(0.5);

    let sum = add(&ratio, 2);
    assert_eq!(sum.domain(), number::NumberDomain::Double);
    assert_eq!(sum.double_value(), 2.5);

    let ints = add(&count, 4);
    assert_eq!(ints.domain(), number::NumberDomain::Integer);
    assert_eq!(ints.int_value(), 7);

    let long = add(&count, 1_i64 << 33);
    assert_eq!(long.domain(), number::NumberDomain::Long);
    assert_eq!(long.long_value(), (1_i64 << 33) + 3);
}

#[test]
fn ternary_ignores_the_inactive_branch() {
    let flag = BooleanProperty::new(true);
    let yes = StringProperty::new("yes".into());
    let no = StringProperty::new("no".into());
    let choice = when(&flag).then(&yes).otherwise(&no);

    assert_eq!(choice.get(), "yes");
    no.set("nope".into());
    assert!(choice.is_valid());

    flag.set(false);
    assert_eq!(choice.get(), "nope");
    yes.set("yep".into());
    assert!(choice.is_valid());
}

/// Clearing and refilling a list inside one batch is one change.
#[test]
fn batched_set_all_reports_once() {
    let list = VecList::from(vec!["a", "b"]);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    list.add_list_listener(ListChangeListener::new(move |change: &mut ListChange<&str>| {
        sink.borrow_mut().push(change.records().to_vec());
    }));

    list.batch(|l| {
        l.set_all(vec!["x", "y", "z"]).unwrap();
        l.push("w").unwrap();
    });

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        vec![ListChangeRecord::Replace {
            from: 0,
            to: 4,
            removed: vec!["a", "b"],
            added: vec!["x", "y", "z", "w"],
        }]
    );
}

#[test]
fn sort_reports_where_each_element_went() {
    let list = VecList::from(vec![30, 10, 20]);
    let moves = Rc::new(RefCell::new(Vec::new()));
    let sink = moves.clone();
    list.add_list_listener(ListChangeListener::new(move |change: &mut ListChange<i32>| {
        while change.next() {
            assert!(change.was_permutated());
            for old in change.from()..change.to() {
                sink.borrow_mut().push((old, change.permutation(old)));
            }
        }
    }));

    list.sort();
    assert_eq!(list.to_vec(), vec![10, 20, 30]);
    assert_eq!(*moves.borrow(), vec![(0, 2), (1, 0), (2, 1)]);
}

#[test]
fn collection_bindings_follow_their_list() {
    let list = VecList::from(vec![1, 2, 3]);
    let len = size(&list);
    let first = value_at(&list, 0_usize);
    let empty = bindings::is_empty(&list);

    assert_eq!(len.get(), 3);
    assert_eq!(first.get(), Some(1));

    list.reverse();
    assert_eq!(first.get(), Some(3));
    list.clear().unwrap();
    assert_eq!(len.get(), 0);
    assert_eq!(first.get(), None);
    assert!(empty.get());
}

/// Adding and removing the only listener leaves nothing allocated.
#[test]
fn listener_lifecycle_returns_to_empty() {
    let property = IntegerProperty::new(0);
    let listener = InvalidationListener::new(|_| {});
    property.add_listener(listener.clone());
    assert_eq!(property.listener_state(), ListenerState::Single);
    property.remove_listener(&listener);
    assert_eq!(property.listener_state(), ListenerState::Empty);

    let list: VecList<i32> = VecList::new();
    let change = ListChangeListener::new(|_| {});
    list.add_list_listener(change.clone());
    list.remove_list_listener(&change);
    assert_eq!(list.listener_state(), ListenerState::Empty);
}

#[test]
fn dispose_detaches_from_dependencies() {
    let source = IntegerProperty::new(1);
    let doubled = number::multiply(&source, 2);
    assert_eq!(doubled.int_value(), 2);
    assert_eq!(source.listener_state(), ListenerState::Single);

    doubled.dispose();
    assert_eq!(source.listener_state(), ListenerState::Empty);
    source.set(5);
    assert!(doubled.is_valid());
}

#[test]
fn panicking_listener_does_not_starve_the_others() {
    let reported = Rc::new(RefCell::new(Vec::new()));
    let sink = reported.clone();
    set_uncaught_handler(move |panic| sink.borrow_mut().push(panic.message.clone()));

    let property = IntegerProperty::new(0);
    let (fired, listener) = counter();
    property.add_listener(InvalidationListener::new(|_| panic!("listener failed")));
    property.add_listener(listener);

    property.set(1);
    assert_eq!(fired.get(), 1);
    assert_eq!(*reported.borrow(), vec!["listener failed".to_string()]);
    assert!(take_uncaught_handler());
}

#[test]
fn compute_errors_fall_back_to_the_default() {
    let divisor = IntegerProperty::new(0);
    let quotient = number::divide(10, &divisor);
    assert_eq!(quotient.int_value(), 0);
    assert!(quotient.is_valid());

    divisor.set(5);
    assert_eq!(quotient.int_value(), 2);
}
