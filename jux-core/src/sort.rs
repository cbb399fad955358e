//! Permutation-tracking Sort
//!
//! Observable lists report a sort as a permutation: for every element, where
//! it was and where it went. This module sorts and computes that permutation
//! in the same pass.
//!
//! # Algorithm
//!
//! A stable top-down merge sort runs over an array of indices into the
//! value slice, comparing the values the indices point at. Once the index
//! array is in sorted order, `order[new] = old`, which inverts directly
//! into the permutation `permutation[old] = new`. The values are then moved
//! into place by following the permutation's cycles.
//!
//! Runs shorter than [`INSERTION_SORT_THRESHOLD`] are insertion-sorted.
//! Two runs already in order are copied instead of merged.
//!
//! Time is O(n log n) comparisons, auxiliary space O(n).

use std::cmp::Ordering;

use crate::error::{check_range, CollectionError};

/// Runs shorter than this are insertion-sorted.
pub const INSERTION_SORT_THRESHOLD: usize = 7;

/// Sort `items` stably by `compare`.
///
/// Returns the permutation: `permutation[old] == new` for every element.
pub fn sort_by<E, F>(items: &mut [E], mut compare: F) -> Vec<usize>
where
    F: FnMut(&E, &E) -> Ordering,
{
    let order = sorted_order(items, &mut compare);
    let permutation = invert(&order);
    apply_permutation(items, &permutation);
    permutation
}

/// Sort `items` stably by their natural order.
pub fn sort<E: Ord>(items: &mut [E]) -> Vec<usize> {
    sort_by(items, E::cmp)
}

/// Sort the sub-range `items[from..to]` stably by `compare`.
///
/// The returned permutation has `to - from` entries in absolute indices:
/// entry `i` is the new index of the element previously at `from + i`.
pub fn sort_range_by<E, F>(
    items: &mut [E],
    from: usize,
    to: usize,
    compare: F,
) -> Result<Vec<usize>, CollectionError>
where
    F: FnMut(&E, &E) -> Ordering,
{
    check_range(from, to, items.len())?;
    let mut permutation = sort_by(&mut items[from..to], compare);
    for target in &mut permutation {
        *target += from;
    }
    Ok(permutation)
}

/// The stable sorted order of `items`: entry `k` is the index of the
/// element that belongs at position `k`.
pub fn sorted_order<E, F>(items: &[E], compare: &mut F) -> Vec<usize>
where
    F: FnMut(&E, &E) -> Ordering,
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut aux = order.clone();
    merge_sort(&mut aux, &mut order, items, compare);
    order
}

/// `src` and `dest` hold the same indices on entry; `dest` holds them
/// sorted on exit. `src` is scratch space.
fn merge_sort<E, F>(src: &mut [usize], dest: &mut [usize], items: &[E], compare: &mut F)
where
    F: FnMut(&E, &E) -> Ordering,
{
    let len = dest.len();
    if len < INSERTION_SORT_THRESHOLD {
        for i in 1..len {
            let mut j = i;
            while j > 0 && compare(&items[dest[j - 1]], &items[dest[j]]) == Ordering::Greater {
                dest.swap(j, j - 1);
                j -= 1;
            }
        }
        return;
    }

    let mid = len / 2;
    merge_sort(&mut dest[..mid], &mut src[..mid], items, compare);
    merge_sort(&mut dest[mid..], &mut src[mid..], items, compare);

    if compare(&items[src[mid - 1]], &items[src[mid]]) != Ordering::Greater {
        dest.copy_from_slice(src);
        return;
    }

    let (mut p, mut q) = (0, mid);
    for slot in dest.iter_mut() {
        let take_left =
            q >= len || (p < mid && compare(&items[src[p]], &items[src[q]]) != Ordering::Greater);
        if take_left {
            *slot = src[p];
            p += 1;
        } else {
            *slot = src[q];
            q += 1;
        }
    }
}

/// Turn `order[new] = old` into `permutation[old] = new` (and back).
pub fn invert(order: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; order.len()];
    for (position, &index) in order.iter().enumerate() {
        inverse[index] = position;
    }
    inverse
}

/// Move every element at `i` to `permutation[i]`.
pub fn apply_permutation<E>(items: &mut [E], permutation: &[usize]) {
    debug_assert_eq!(items.len(), permutation.len());
    let mut placed = vec![false; items.len()];
    for start in 0..items.len() {
        if placed[start] {
            continue;
        }
        let mut current = start;
        loop {
            placed[current] = true;
            let target = permutation[current];
            if target == start {
                break;
            }
            items.swap(start, target);
            current = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_permutation<E: Clone + PartialEq + std::fmt::Debug>(
        original: &[E],
        sorted: &[E],
        permutation: &[usize],
    ) {
        for (old, &new) in permutation.iter().enumerate() {
            assert_eq!(sorted[new], original[old]);
        }
    }

    #[test]
    fn sorts_short_input_with_insertion_sort() {
        let original = vec![3, 1, 2];
        let mut items = original.clone();
        let permutation = sort(&mut items);
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(permutation, vec![2, 0, 1]);
        check_permutation(&original, &items, &permutation);
    }

    #[test]
    fn sorts_long_input_with_merges() {
        let original: Vec<i32> = (0..50).map(|i| (i * 37) % 23).collect();
        let mut items = original.clone();
        let permutation = sort(&mut items);

        let mut expected = original.clone();
        expected.sort();
        assert_eq!(items, expected);
        check_permutation(&original, &items, &permutation);
    }

    #[test]
    fn sort_is_stable() {
        let original: Vec<(u8, usize)> = (0..20).map(|i| ((i % 3) as u8, i)).collect();
        let mut items = original.clone();
        sort_by(&mut items, |a, b| a.0.cmp(&b.0));

        for pair in items.windows(2) {
            if pair[0].0 == pair[1].0 {
                assert!(pair[0].1 < pair[1].1);
            }
        }
    }

    #[test]
    fn already_sorted_input_is_identity() {
        let mut items: Vec<u32> = (0..16).collect();
        let permutation = sort(&mut items);
        assert_eq!(permutation, (0..16).collect::<Vec<usize>>());
    }

    #[test]
    fn empty_and_single() {
        let mut empty: Vec<i32> = Vec::new();
        assert!(sort(&mut empty).is_empty());

        let mut single = vec![9];
        assert_eq!(sort(&mut single), vec![0]);
    }

    #[test]
    fn sub_range_reports_absolute_indices() {
        let mut items = vec![9, 5, 4, 3, 0];
        let permutation = sort_range_by(&mut items, 1, 4, |a: &i32, b: &i32| a.cmp(b)).unwrap();
        assert_eq!(items, vec![9, 3, 4, 5, 0]);
        assert_eq!(permutation, vec![3, 2, 1]);
    }

    #[test]
    fn sub_range_rejects_bad_bounds() {
        let mut items = vec![1, 2, 3];
        assert!(sort_range_by(&mut items, 2, 1, |a: &i32, b: &i32| a.cmp(b)).is_err());
        assert!(sort_range_by(&mut items, 0, 4, |a: &i32, b: &i32| a.cmp(b)).is_err());
    }

    #[test]
    fn descending_comparator() {
        let original = vec!["b", "d", "a", "c", "e", "f", "g", "h"];
        let mut items = original.clone();
        let permutation = sort_by(&mut items, |a, b| b.cmp(a));
        assert_eq!(items, vec!["h", "g", "f", "e", "d", "c", "b", "a"]);
        check_permutation(&original, &items, &permutation);
    }

    #[test]
    fn apply_and_invert_agree() {
        let permutation = vec![2, 0, 3, 1];
        let mut items = vec!['a', 'b', 'c', 'd'];
        apply_permutation(&mut items, &permutation);
        assert_eq!(items, vec!['b', 'd', 'a', 'c']);
        assert_eq!(invert(&invert(&permutation)), permutation);
    }
}
