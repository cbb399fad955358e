//! Property tests for observable collections.
//!
//! Every change a list reports must replay onto a mirror of the list and
//! reproduce it exactly, whatever sequence of mutations produced it.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use proptest::prelude::*;

use jux_core::collections::{
    ListChangeRecord, MapChange, MapChangeRecord, SetChange, SetChangeRecord,
};
use jux_core::prelude::*;
use jux_core::sort;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Insert(usize, i32),
    Remove(usize),
    RemoveRange(usize, usize),
    Set(usize, i32),
    Update(usize),
    SetAll(Vec<i32>),
    Sort,
    SortRange(usize, usize),
    Reverse,
    Rotate(isize),
    Retain(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Push),
        (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        any::<usize>().prop_map(Op::Remove),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::RemoveRange(a, b)),
        (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        any::<usize>().prop_map(Op::Update),
        prop::collection::vec(-5..5, 0..6).prop_map(Op::SetAll),
        Just(Op::Sort),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::SortRange(a, b)),
        Just(Op::Reverse),
        (-4_isize..4).prop_map(Op::Rotate),
        (1..4).prop_map(Op::Retain),
    ]
}

fn run(list: &VecList<i32>, op: &Op) {
    let len = list.len();
    let pick = |i: usize| if len == 0 { 0 } else { i % len };
    match op {
        Op::Push(v) => list.push(*v).unwrap(),
        Op::Insert(i, v) => list.insert(i % (len + 1), *v).unwrap(),
        Op::Remove(i) if len > 0 => {
            list.remove(pick(*i)).unwrap();
        }
        Op::RemoveRange(a, b) => {
            let (a, b) = (a % (len + 1), b % (len + 1));
            list.remove_range(a.min(b), a.max(b)).unwrap();
        }
        Op::Set(i, v) if len > 0 => {
            list.set(pick(*i), *v).unwrap();
        }
        Op::Update(i) if len > 0 => list.update(pick(*i), |v| *v = v.wrapping_add(1)).unwrap(),
        Op::SetAll(values) => list.set_all(values.clone()).unwrap(),
        Op::Sort => list.sort(),
        Op::SortRange(a, b) => {
            let (a, b) = (a % (len + 1), b % (len + 1));
            list.sort_range_by(a.min(b), a.max(b), |x, y| x.cmp(y)).unwrap();
        }
        Op::Reverse => list.reverse(),
        Op::Rotate(d) => list.rotate(*d),
        Op::Retain(m) => {
            list.retain(|v| v % m != 0);
        }
        _ => {}
    }
}

/// Attach a listener that replays every change onto a mirror.
fn mirror(list: &VecList<i32>) -> Rc<RefCell<Vec<i32>>> {
    let mirror = Rc::new(RefCell::new(list.to_vec()));
    let m = mirror.clone();
    list.add_list_listener(ListChangeListener::new(move |change: &mut ListChange<i32>| {
        change.apply_to(&mut m.borrow_mut());
    }));
    mirror
}

proptest! {
    #[test]
    fn replay_reproduces_the_list(
        initial in prop::collection::vec(-50..50, 0..12),
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let list = VecList::from(initial);
        let mirror = mirror(&list);
        for op in &ops {
            run(&list, op);
            prop_assert_eq!(&*mirror.borrow(), &list.to_vec());
        }
    }

    #[test]
    fn replay_reproduces_a_batched_list(
        initial in prop::collection::vec(-50..50, 0..12),
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let list = VecList::from(initial);
        let mirror = mirror(&list);
        let events = Rc::new(RefCell::new(0));
        let e = events.clone();
        list.add_list_listener(ListChangeListener::new(move |_| *e.borrow_mut() += 1));

        list.batch(|l| {
            for op in &ops {
                run(l, op);
            }
        });
        prop_assert_eq!(&*mirror.borrow(), &list.to_vec());
        prop_assert!(*events.borrow() <= 1);
    }

    #[test]
    fn sort_permutation_maps_old_to_new(values in prop::collection::vec(-20..20, 0..64)) {
        let mut sorted = values.clone();
        let permutation = sort::sort(&mut sorted);

        let mut expected = values.clone();
        expected.sort();
        prop_assert_eq!(&sorted, &expected);

        for (old, &new) in permutation.iter().enumerate() {
            prop_assert_eq!(values[old], sorted[new]);
        }
        let mut seen = permutation.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..values.len()).collect::<Vec<_>>());
    }

    #[test]
    fn sort_is_stable(keys in prop::collection::vec(0..4, 0..40)) {
        let mut tagged: Vec<(i32, usize)> = keys.iter().copied().zip(0..).collect();
        sort::sort_by(&mut tagged, |a, b| a.0.cmp(&b.0));
        for pair in tagged.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0 || pair[0].1 < pair[1].1);
        }
    }

    #[test]
    fn set_replay_reproduces_the_set(
        ops in prop::collection::vec((any::<bool>(), 0..8_u8), 1..30),
    ) {
        let set: IndexedSet<u8> = IndexedSet::new();
        let mirror = Rc::new(RefCell::new(IndexSet::new()));
        let m = mirror.clone();
        set.add_set_listener(SetChangeListener::new(move |change: &mut SetChange<u8>| {
            change.apply_to(&mut m.borrow_mut());
        }));

        set.batch(|s| {
            for (add, value) in ops.iter().take(ops.len() / 2) {
                if *add { s.insert(*value).unwrap(); } else { s.remove(value).unwrap(); }
            }
        });
        for (add, value) in ops.iter().skip(ops.len() / 2) {
            if *add { set.insert(*value).unwrap(); } else { set.remove(value).unwrap(); }
        }

        let mut expected = set.to_vec();
        let mut actual: Vec<u8> = mirror.borrow().iter().copied().collect();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn map_replay_reproduces_the_map(
        ops in prop::collection::vec((0..5_u8, prop::option::of(0..3_i32)), 1..30),
    ) {
        let map: IndexedMap<u8, i32> = IndexedMap::new();
        let mirror = Rc::new(RefCell::new(IndexMap::new()));
        let m = mirror.clone();
        map.add_map_listener(MapChangeListener::new(move |change: &mut MapChange<u8, i32>| {
            change.apply_to(&mut m.borrow_mut());
        }));

        map.batch(|map| {
            for (key, value) in &ops {
                match value {
                    Some(value) => { map.insert(*key, *value).unwrap(); }
                    None => { map.remove(key).unwrap(); }
                }
            }
        });

        let mut expected = map.entries();
        let mut actual: Vec<(u8, i32)> = mirror.borrow().iter().map(|(k, v)| (*k, *v)).collect();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn range_sorts_in_one_batch_replay() {
    let cases: [&[(usize, usize)]; 4] = [
        &[(0, 2), (4, 6)],
        &[(4, 6), (0, 2)],
        &[(0, 4), (2, 6)],
        &[(1, 2), (3, 5), (0, 6)],
    ];
    for ranges in cases {
        let list = VecList::from(vec![2, 1, 9, 8, 4, 3]);
        let mirror = mirror(&list);
        list.batch(|l| {
            for &(from, to) in ranges {
                l.sort_range_by(from, to, |a, b| a.cmp(b)).unwrap();
            }
        });
        assert_eq!(*mirror.borrow(), list.to_vec(), "ranges {ranges:?}");

        list.push(0).unwrap();
        list.sort();
        assert_eq!(*mirror.borrow(), list.to_vec(), "ranges {ranges:?}");
    }
}

#[test]
fn list_records_survive_json() {
    let list = VecList::from(vec!["b".to_string(), "a".to_string()]);
    let recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = recorded.clone();
    list.add_list_listener(ListChangeListener::new(move |change: &mut ListChange<String>| {
        sink.borrow_mut().extend(change.records().iter().cloned());
    }));

    list.sort();
    list.push("c".to_string()).unwrap();
    list.update(0, |v| v.push('!')).unwrap();

    let json = serde_json::to_string(&*recorded.borrow()).unwrap();
    assert!(json.contains(r#""kind":"permutation""#));
    let replayed: Vec<ListChangeRecord<String>> = serde_json::from_str(&json).unwrap();
    assert_eq!(replayed, *recorded.borrow());

    let mut mirror = vec!["b".to_string(), "a".to_string()];
    for record in &replayed {
        record.apply(&mut mirror);
    }
    assert_eq!(mirror, list.to_vec());
}

#[test]
fn set_and_map_records_survive_json() {
    let set_records = vec![SetChangeRecord::Added(3), SetChangeRecord::Removed(4)];
    let json = serde_json::to_string(&set_records).unwrap();
    let back: Vec<SetChangeRecord<i32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set_records);

    let map_record = MapChangeRecord {
        key: "k".to_string(),
        removed: Some(1),
        added: None,
    };
    let json = serde_json::to_value(&map_record).unwrap();
    assert_eq!(json["key"], "k");
    let back: MapChangeRecord<String, i32> = serde_json::from_value(json).unwrap();
    assert_eq!(back, map_record);
}
