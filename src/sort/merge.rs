//! Stable merge sort over indices.
//!
//! The comparators in this crate are not guaranteed to be total orders
//! (primary-attribute pinning is not transitive, and the sibling comparator
//! answers `Greater` for both argument orders of a prefix pair). The
//! standard library's sorts are allowed to panic when handed such a
//! comparator, so sorting goes through this merge sort instead. It calls the
//! comparator a bounded number of times, always terminates, always yields a
//! permutation, and keeps elements the comparator calls equal in their
//! original order.

use std::cmp::Ordering;

/// Returns the permutation of `0..len` that orders the items.
///
/// `compare(i, j)` compares the items originally at indices `i` and `j`.
/// Runs are merged bottom-up; on `Equal` (or `Less`) the left run wins,
/// which makes the sort stable.
///
/// ```
/// use sortxml::sort::merge::sorted_order;
///
/// let words = ["pear", "fig", "plum", "kiwi"];
/// let order = sorted_order(words.len(), |i, j| words[i].len().cmp(&words[j].len()));
/// assert_eq!(order, vec![1, 0, 2, 3]);
/// ```
pub fn sorted_order<F>(len: usize, mut compare: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut scratch = vec![0; len];
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(
                &order[start..mid],
                &order[mid..end],
                &mut scratch[start..end],
                &mut compare,
            );
            start = end;
        }
        std::mem::swap(&mut order, &mut scratch);
        width *= 2;
    }
    order
}

fn merge<F>(left: &[usize], right: &[usize], out: &mut [usize], compare: &mut F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        let take_left = j >= right.len()
            || (i < left.len() && compare(left[i], right[j]) != Ordering::Greater);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

/// Rearranges `items` into the given permutation.
pub fn apply_order<T>(items: &mut Vec<T>, order: &[usize]) {
    debug_assert_eq!(items.len(), order.len());
    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(order.iter().filter_map(|&i| slots[i].take()));
}

/// Stably sorts `items` with a comparator that need not be a total order.
pub fn stable_sort_by<T, F>(items: &mut Vec<T>, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let order = sorted_order(items.len(), |i, j| compare(&items[i], &items[j]));
    apply_order(items, &order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_and_single() {
        assert!(sorted_order(0, |_, _| Ordering::Equal).is_empty());
        assert_eq!(sorted_order(1, |_, _| Ordering::Equal), vec![0]);
    }

    #[test]
    fn test_sorts_numbers() {
        let mut v = vec![5, 3, 9, 1, 4, 8, 2, 7, 6, 0];
        stable_sort_by(&mut v, |a, b| a.cmp(b));
        assert_eq!(v, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_stable_on_ties() {
        let mut v = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (1, 'e')];
        stable_sort_by(&mut v, |a, b| a.0.cmp(&b.0));
        assert_eq!(v, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c'), (1, 'e')]);
    }

    #[test]
    fn test_all_equal_keeps_order() {
        let order = sorted_order(7, |_, _| Ordering::Equal);
        assert_eq!(order, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_inconsistent_comparator_still_yields_permutation() {
        // Claims every pair is Greater in both directions.
        let mut order = sorted_order(9, |_, _| Ordering::Greater);
        order.sort_unstable();
        assert_eq!(order, (0..9).collect::<Vec<_>>());

        // Rock-paper-scissors cycle.
        let beats = |a: usize, b: usize| match (a % 3, b % 3) {
            (x, y) if x == y => Ordering::Equal,
            (0, 1) | (1, 2) | (2, 0) => Ordering::Less,
            _ => Ordering::Greater,
        };
        let mut order = sorted_order(12, beats);
        order.sort_unstable();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_apply_order_moves_without_cloning() {
        let mut v = vec![String::from("x"), String::from("y"), String::from("z")];
        apply_order(&mut v, &[2, 0, 1]);
        assert_eq!(v, vec!["z", "x", "y"]);
    }
}
