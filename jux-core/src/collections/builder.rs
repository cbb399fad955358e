//! Accumulation of list mutations into one change.
//!
//! # How Batching Works
//!
//! Every list mutation runs between `begin_change()` and `end_change()`.
//! The pair nests: only the outermost `end_change()` builds the change and
//! returns it for dispatch, so a bulk operation made of many inner
//! mutations reports once.
//!
//! While a batch is open the builder keeps three kinds of pending state:
//!
//! - **Add/remove sub-changes**, sorted by position, never touching each
//!   other. Each one covers the added range `from..to` in current
//!   coordinates and the original elements removed at `from`. A mutation
//!   that touches an existing sub-change is merged into it; mutations after
//!   it shift its successors.
//!
//! - **Updated positions**, in current coordinates. Adds and removes shift
//!   them; removing an updated element drops it.
//!
//! - **A pending permutation**, composed across consecutive sorts while no
//!   add or remove happened. Once elements are added or removed the
//!   permutation is no longer expressible and is converted into a
//!   replacement of its range.
//!
//! On commit the permutation comes first, followed by replacements and
//! updates ordered by position. Updates inside added ranges are dropped,
//! since the added elements are reported with their final values.

use crate::collections::change::ListChangeRecord;

#[derive(Debug, Clone)]
struct SubChange<E> {
    from: usize,
    to: usize,
    removed: Vec<E>,
}

#[derive(Debug, Clone)]
struct PendingPermutation<E> {
    from: usize,
    to: usize,
    /// `permutation[i - from]` is the current index of the element that
    /// was at `i` when the batch started.
    permutation: Vec<usize>,
    /// The elements of `from..to` when the batch started.
    originals: Vec<E>,
}

#[derive(Debug)]
pub(crate) struct ListChangeBuilder<E> {
    depth: usize,
    changes: Vec<SubChange<E>>,
    updates: Vec<usize>,
    permutation: Option<PendingPermutation<E>>,
}

impl<E> Default for ListChangeBuilder<E> {
    fn default() -> Self {
        Self {
            depth: 0,
            changes: Vec::new(),
            updates: Vec::new(),
            permutation: None,
        }
    }
}

impl<E: Clone> ListChangeBuilder<E> {
    pub(crate) fn begin_change(&mut self) {
        self.depth += 1;
    }

    /// Close one batch level. The outermost call returns the accumulated
    /// records, or `None` if nothing observable happened. `list` is the
    /// list's content after the batch.
    pub(crate) fn end_change(&mut self, list: &[E]) -> Option<Vec<ListChangeRecord<E>>> {
        if self.depth == 0 {
            tracing::warn!("end_change called without a matching begin_change");
            return None;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return None;
        }
        let records = self.commit(list);
        (!records.is_empty()).then_some(records)
    }

    /// Elements were inserted at `from..to`.
    pub(crate) fn next_add(&mut self, from: usize, to: usize) {
        self.flush_permutation();
        let count = to - from;
        if count == 0 {
            return;
        }
        for update in &mut self.updates {
            if *update >= from {
                *update += count;
            }
        }

        let index = self.changes.partition_point(|c| c.to < from);
        match self.changes.get_mut(index) {
            Some(change) if change.from <= from => change.to += count,
            _ => self.changes.insert(
                index,
                SubChange {
                    from,
                    to,
                    removed: Vec::new(),
                },
            ),
        }
        for change in &mut self.changes[index + 1..] {
            change.from += count;
            change.to += count;
        }
    }

    /// The element `value` was removed from `index`.
    pub(crate) fn next_remove(&mut self, index: usize, value: E) {
        self.flush_permutation();
        self.updates.retain(|&u| u != index);
        for update in &mut self.updates {
            if *update > index {
                *update -= 1;
            }
        }

        let at = self.changes.partition_point(|c| c.to < index);
        let touches = matches!(self.changes.get(at), Some(change) if change.from <= index);
        if touches {
            let change = &mut self.changes[at];
            if index < change.to {
                // One of this change's own additions.
                change.to -= 1;
            } else {
                change.removed.push(value);
            }
        } else {
            self.changes.insert(
                at,
                SubChange {
                    from: index,
                    to: index,
                    removed: vec![value],
                },
            );
        }
        for change in &mut self.changes[at + 1..] {
            change.from -= 1;
            change.to -= 1;
        }

        if self.changes[at].from == self.changes[at].to && self.changes[at].removed.is_empty() {
            self.changes.remove(at);
        } else if at + 1 < self.changes.len() && self.changes[at].to == self.changes[at + 1].from {
            let next = self.changes.remove(at + 1);
            let change = &mut self.changes[at];
            change.to = next.to;
            change.removed.extend(next.removed);
        }
    }

    /// The element at `index` was replaced; `old` was its previous value.
    pub(crate) fn next_set(&mut self, index: usize, old: E) {
        self.next_remove(index, old);
        self.next_add(index, index + 1);
    }

    /// The element at `index` was modified in place.
    pub(crate) fn next_update(&mut self, index: usize) {
        if let Err(pos) = self.updates.binary_search(&index) {
            self.updates.insert(pos, index);
        }
    }

    /// The elements of `from..to` were reordered: the element at `i` moved
    /// to `permutation[i - from]`. `originals` is the range's content
    /// before the reorder and `list` the whole list after it.
    pub(crate) fn next_permutation(
        &mut self,
        from: usize,
        to: usize,
        permutation: Vec<usize>,
        originals: Vec<E>,
        list: &[E],
    ) {
        if from == to {
            return;
        }
        if !self.changes.is_empty() {
            // Already mid add/remove: report the sorted range as replaced.
            for (offset, value) in originals.into_iter().enumerate().rev() {
                self.next_remove(from + offset, value);
            }
            self.next_add(from, to);
            return;
        }

        for update in &mut self.updates {
            if (from..to).contains(update) {
                *update = permutation[*update - from];
            }
        }
        self.updates.sort_unstable();

        self.permutation = Some(match self.permutation.take() {
            None => PendingPermutation {
                from,
                to,
                permutation,
                originals,
            },
            Some(previous) => compose(previous, from, to, &permutation, originals, list),
        });
    }

    /// Turn a pending permutation into a replacement of its range, before
    /// an add or remove changes the coordinates it refers to.
    fn flush_permutation(&mut self) {
        let Some(pending) = self.permutation.take() else {
            return;
        };
        if is_identity(&pending) {
            return;
        }
        self.changes.push(SubChange {
            from: pending.from,
            to: pending.to,
            removed: pending.originals,
        });
    }

    fn commit(&mut self, list: &[E]) -> Vec<ListChangeRecord<E>> {
        let mut records = Vec::new();

        if let Some(pending) = self.permutation.take() {
            if !is_identity(&pending) {
                records.push(ListChangeRecord::Permutation {
                    from: pending.from,
                    to: pending.to,
                    permutation: pending.permutation,
                });
            }
        }

        let changes = std::mem::take(&mut self.changes);
        let updates = std::mem::take(&mut self.updates);
        let in_added = |position: usize| changes.iter().any(|c| (c.from..c.to).contains(&position));
        let update_ranges = ranges(updates.into_iter().filter(|&u| !in_added(u)));

        let mut updates = update_ranges.into_iter().peekable();
        for change in changes.iter() {
            while let Some(&(from, to)) = updates.peek() {
                if from >= change.from {
                    break;
                }
                records.push(update_record(list, from, to));
                updates.next();
            }
            records.push(ListChangeRecord::Replace {
                from: change.from,
                to: change.to,
                removed: change.removed.clone(),
                added: list[change.from..change.to].to_vec(),
            });
        }
        for (from, to) in updates {
            records.push(update_record(list, from, to));
        }
        records
    }
}

fn update_record<E: Clone>(list: &[E], from: usize, to: usize) -> ListChangeRecord<E> {
    ListChangeRecord::Update {
        from,
        to,
        values: list[from..to].to_vec(),
    }
}

/// Group sorted positions into contiguous `(from, to)` ranges.
fn ranges(positions: impl Iterator<Item = usize>) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for position in positions {
        match ranges.last_mut() {
            Some((_, to)) if *to == position => *to += 1,
            _ => ranges.push((position, position + 1)),
        }
    }
    ranges
}

fn is_identity<E>(pending: &PendingPermutation<E>) -> bool {
    pending
        .permutation
        .iter()
        .enumerate()
        .all(|(offset, &target)| target == pending.from + offset)
}

/// Compose an earlier pending permutation with a later one over
/// `from..to`. `originals` is the later range's content before it was
/// reordered and `list` the list after it.
///
/// The result covers both ranges and any gap between them. Positions in the
/// gap map to themselves.
fn compose<E: Clone>(
    previous: PendingPermutation<E>,
    from: usize,
    to: usize,
    permutation: &[usize],
    originals: Vec<E>,
    list: &[E],
) -> PendingPermutation<E> {
    let start = previous.from.min(from);
    let end = previous.to.max(to);
    let mut composed = Vec::with_capacity(end - start);
    let mut composed_originals = Vec::with_capacity(end - start);

    for i in start..end {
        let middle = if (previous.from..previous.to).contains(&i) {
            previous.permutation[i - previous.from]
        } else {
            i
        };
        let target = if (from..to).contains(&middle) {
            permutation[middle - from]
        } else {
            middle
        };
        composed.push(target);

        let original = if (previous.from..previous.to).contains(&i) {
            previous.originals[i - previous.from].clone()
        } else if (from..to).contains(&i) {
            // Untouched by the earlier permutation, so still in place when
            // the later one ran.
            originals[i - from].clone()
        } else {
            // Between the two ranges: neither moved it.
            list[i].clone()
        };
        composed_originals.push(original);
    }

    PendingPermutation {
        from: start,
        to: end,
        permutation: composed,
        originals: composed_originals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(from: usize, to: usize, removed: &[char], added: &[char]) -> ListChangeRecord<char> {
        ListChangeRecord::Replace {
            from,
            to,
            removed: removed.to_vec(),
            added: added.to_vec(),
        }
    }

    /// Apply `mutate` to `list` inside one batch and return the records.
    fn batch(
        list: &mut Vec<char>,
        mutate: impl FnOnce(&mut Vec<char>, &mut ListChangeBuilder<char>),
    ) -> Vec<ListChangeRecord<char>> {
        let mut builder = ListChangeBuilder::default();
        builder.begin_change();
        mutate(list, &mut builder);
        builder.end_change(list).unwrap_or_default()
    }

    fn insert(list: &mut Vec<char>, b: &mut ListChangeBuilder<char>, index: usize, value: char) {
        list.insert(index, value);
        b.next_add(index, index + 1);
    }

    fn remove(list: &mut Vec<char>, b: &mut ListChangeBuilder<char>, index: usize) {
        let value = list.remove(index);
        b.next_remove(index, value);
    }

    #[test]
    fn single_add() {
        let mut list = vec!['a', 'b'];
        let records = batch(&mut list, |l, b| insert(l, b, 1, 'x'));
        assert_eq!(records, vec![replace(1, 2, &[], &['x'])]);
    }

    #[test]
    fn adjacent_adds_merge() {
        let mut list = vec!['a'];
        let records = batch(&mut list, |l, b| {
            insert(l, b, 1, 'x');
            insert(l, b, 2, 'y');
            insert(l, b, 1, 'w');
        });
        assert_eq!(records, vec![replace(1, 4, &[], &['w', 'x', 'y'])]);
    }

    #[test]
    fn removing_an_added_element_cancels() {
        let mut list = vec!['a', 'b'];
        let records = batch(&mut list, |l, b| {
            insert(l, b, 1, 'x');
            remove(l, b, 1);
        });
        assert!(records.is_empty());
    }

    #[test]
    fn consecutive_removes_collect_in_order() {
        let mut list = vec!['a', 'b', 'c', 'd'];
        let records = batch(&mut list, |l, b| {
            remove(l, b, 1);
            remove(l, b, 1);
        });
        assert_eq!(records, vec![replace(1, 1, &['b', 'c'], &[])]);
    }

    #[test]
    fn remove_before_a_removal_merges() {
        let mut list = vec!['a', 'b', 'c', 'd'];
        let records = batch(&mut list, |l, b| {
            remove(l, b, 2);
            remove(l, b, 1);
        });
        assert_eq!(records, vec![replace(1, 1, &['b', 'c'], &[])]);
    }

    #[test]
    fn separate_changes_stay_separate_and_sorted() {
        let mut list = vec!['a', 'b', 'c', 'd', 'e'];
        let records = batch(&mut list, |l, b| {
            remove(l, b, 3);
            insert(l, b, 0, 'z');
        });
        assert_eq!(list, vec!['z', 'a', 'b', 'c', 'e']);
        assert_eq!(
            records,
            vec![replace(0, 1, &[], &['z']), replace(4, 4, &['d'], &[])]
        );
    }

    #[test]
    fn clear_then_add_is_one_replacement() {
        let mut list = vec!['a', 'b', 'c'];
        let records = batch(&mut list, |l, b| {
            while !l.is_empty() {
                remove(l, b, 0);
            }
            for (i, v) in ['x', 'y'].into_iter().enumerate() {
                insert(l, b, i, v);
            }
        });
        assert_eq!(records, vec![replace(0, 2, &['a', 'b', 'c'], &['x', 'y'])]);
    }

    #[test]
    fn set_reports_replacement() {
        let mut list = vec!['a', 'b'];
        let records = batch(&mut list, |l, b| {
            let old = std::mem::replace(&mut l[1], 'q');
            b.next_set(1, old);
        });
        assert_eq!(records, vec![replace(1, 2, &['b'], &['q'])]);
    }

    #[test]
    fn updates_group_and_shift() {
        let mut list = vec!['a', 'b', 'c', 'd'];
        let records = batch(&mut list, |l, b| {
            l[1] = 'B';
            b.next_update(1);
            l[2] = 'C';
            b.next_update(2);
            insert(l, b, 0, 'z');
        });
        assert_eq!(
            records,
            vec![
                replace(0, 1, &[], &['z']),
                ListChangeRecord::Update {
                    from: 2,
                    to: 4,
                    values: vec!['B', 'C'],
                },
            ]
        );
    }

    #[test]
    fn removed_update_is_dropped() {
        let mut list = vec!['a', 'b'];
        let records = batch(&mut list, |l, b| {
            b.next_update(0);
            remove(l, b, 0);
        });
        assert_eq!(records, vec![replace(0, 0, &['a'], &[])]);
    }

    #[test]
    fn permutations_compose() {
        let mut list = vec!['c', 'b', 'a'];
        let records = batch(&mut list, |l, b| {
            // Swap 0 and 1, then 1 and 2.
            let originals = l.clone();
            l.swap(0, 1);
            b.next_permutation(0, 3, vec![1, 0, 2], originals, l);
            let originals = l.clone();
            l.swap(1, 2);
            b.next_permutation(0, 3, vec![0, 2, 1], originals, l);
        });
        assert_eq!(list, vec!['b', 'a', 'c']);
        assert_eq!(
            records,
            vec![ListChangeRecord::Permutation {
                from: 0,
                to: 3,
                permutation: vec![2, 0, 1],
            }]
        );
    }

    #[test]
    fn disjoint_permutations_cover_the_gap() {
        let mut list = vec!['b', 'a', 'x', 'y', 'd', 'c'];
        let records = batch(&mut list, |l, b| {
            let originals = l[0..2].to_vec();
            l.swap(0, 1);
            b.next_permutation(0, 2, vec![1, 0], originals, l);
            let originals = l[4..6].to_vec();
            l.swap(4, 5);
            b.next_permutation(4, 6, vec![5, 4], originals, l);
        });
        assert_eq!(list, vec!['a', 'b', 'x', 'y', 'c', 'd']);
        assert_eq!(
            records,
            vec![ListChangeRecord::Permutation {
                from: 0,
                to: 6,
                permutation: vec![1, 0, 2, 3, 5, 4],
            }]
        );
    }

    #[test]
    fn disjoint_permutations_then_add_replace_the_union() {
        let mut list = vec!['b', 'a', 'x', 'd', 'c'];
        let records = batch(&mut list, |l, b| {
            let originals = l[3..5].to_vec();
            l.swap(3, 4);
            b.next_permutation(3, 5, vec![4, 3], originals, l);
            let originals = l[0..2].to_vec();
            l.swap(0, 1);
            b.next_permutation(0, 2, vec![1, 0], originals, l);
            insert(l, b, 5, 'e');
        });
        assert_eq!(list, vec!['a', 'b', 'x', 'c', 'd', 'e']);
        assert_eq!(
            records,
            vec![replace(
                0,
                6,
                &['b', 'a', 'x', 'd', 'c'],
                &['a', 'b', 'x', 'c', 'd', 'e'],
            )]
        );
    }

    #[test]
    fn identity_permutation_reports_nothing() {
        let mut list = vec!['a', 'b'];
        let records = batch(&mut list, |l, b| {
            b.next_permutation(0, 2, vec![0, 1], l.clone(), l);
        });
        assert!(records.is_empty());
    }

    #[test]
    fn permutation_then_add_becomes_replacement() {
        let mut list = vec!['b', 'a', 'c'];
        let records = batch(&mut list, |l, b| {
            let originals = l[0..2].to_vec();
            l.swap(0, 1);
            b.next_permutation(0, 2, vec![1, 0], originals, l);
            insert(l, b, 3, 'd');
        });
        assert_eq!(list, vec!['a', 'b', 'c', 'd']);
        assert_eq!(
            records,
            vec![
                replace(0, 2, &['b', 'a'], &['a', 'b']),
                replace(3, 4, &[], &['d']),
            ]
        );
    }

    #[test]
    fn nested_batches_commit_once() {
        let mut builder: ListChangeBuilder<char> = ListChangeBuilder::default();
        let list = vec!['a'];
        builder.begin_change();
        builder.begin_change();
        builder.next_add(0, 1);
        assert!(builder.end_change(&list).is_none());
        assert_eq!(builder.depth, 1);
        let records = builder.end_change(&list).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(builder.depth, 0);
    }

    #[test]
    fn unbalanced_end_is_ignored() {
        let mut builder: ListChangeBuilder<char> = ListChangeBuilder::default();
        assert!(builder.end_change(&[]).is_none());
    }
}
