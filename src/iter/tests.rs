use super::*;
use proptest::prelude::*;

fn collect_all<I: SortedIterator>(mut iter: I) -> Vec<I::Item> {
    let mut out = Vec::new();
    while let Some(item) = iter.next() {
        out.push(item);
    }
    out
}

fn is_sorted_ascending<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|pair| pair[0] <= pair[1])
}

#[test]
fn vec_sorted_iterator_emits_in_order() {
    let iter = VecSortedIterator::new(vec![1, 2, 2, 5, 9]);
    assert_eq!(collect_all(iter), vec![1, 2, 2, 5, 9]);
}

#[test]
fn vec_sorted_iterator_seek_skips_forward() {
    let mut iter = VecSortedIterator::new(vec![1, 3, 5, 7, 9]);
    iter.seek(&5).unwrap();
    assert_eq!(iter.next(), Some(5));
    assert_eq!(iter.next(), Some(7));
}

#[test]
fn vec_sorted_iterator_seek_backward_is_rejected() {
    let mut iter = VecSortedIterator::new(vec![1, 3, 5]);
    assert_eq!(iter.next(), Some(1));
    assert!(iter.seek(&0).is_err());
}

#[test]
fn merge_interleaves_two_streams_in_order() {
    let a: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![1, 4, 7]));
    let b: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![2, 3, 7, 8]));
    let merged = Merge::new(vec![a, b]);
    assert_eq!(collect_all(merged), vec![1, 2, 3, 4, 7, 7, 8]);
}

#[test]
fn distinct_collapses_merge_duplicates() {
    let a: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![1, 4, 7]));
    let b: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![2, 3, 7, 8]));
    let merged = Merge::new(vec![a, b]);
    let distinct = Distinct::new(merged);
    assert_eq!(collect_all(distinct), vec![1, 2, 3, 4, 7, 8]);
}

#[test]
fn intersect_keeps_only_common_elements() {
    let a: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![1, 2, 3, 4, 5, 6]));
    let b: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![2, 4, 6, 8]));
    let intersected = Intersect::new(vec![a, b]);
    assert_eq!(collect_all(intersected), vec![2, 4, 6]);
}

#[test]
fn intersect_of_three_streams() {
    let a: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![1, 2, 3, 4, 5]));
    let b: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![2, 3, 4, 5]));
    let c: Box<dyn SortedIterator<Item = i32>> =
        Box::new(VecSortedIterator::new(vec![3, 4]));
    let intersected = Intersect::new(vec![a, b, c]);
    assert_eq!(collect_all(intersected), vec![3, 4]);
}

#[test]
fn filter_drops_non_matching_elements() {
    let source = VecSortedIterator::new(vec![1, 2, 3, 4, 5, 6]);
    let filtered = Filter::new(source, |value: &i32| value % 2 == 0);
    assert_eq!(collect_all(filtered), vec![2, 4, 6]);
}

#[test]
fn limit_stops_after_n_elements() {
    let source = VecSortedIterator::new(vec![1, 2, 3, 4, 5]);
    let limited = Limit::new(source, 3);
    assert_eq!(collect_all(limited), vec![1, 2, 3]);
}

#[test]
fn map_sorted_applies_forward_and_inverse() {
    let source = VecSortedIterator::new(vec![1, 2, 3]);
    let mapped = MapSorted::new(source, |value: &i32| value * 10, |value: &i32| value / 10);
    assert_eq!(collect_all(mapped), vec![10, 20, 30]);
}

#[test]
fn on_consumed_fires_once_source_is_exhausted() {
    let source = VecSortedIterator::new(vec![1, 2]);
    let fired = std::cell::Cell::new(0);
    let mut wrapped = OnConsumed::new(source, || fired.set(fired.get() + 1));
    assert_eq!(wrapped.next(), Some(1));
    assert_eq!(fired.get(), 0);
    assert_eq!(wrapped.next(), Some(2));
    assert_eq!(wrapped.next(), None);
    assert_eq!(fired.get(), 1);
    assert_eq!(wrapped.next(), None);
    assert_eq!(fired.get(), 1);
}

#[test]
fn on_finalise_fires_only_on_recycle() {
    let source = VecSortedIterator::new(vec![1, 2]);
    let fired = std::cell::Cell::new(0);
    let mut wrapped = OnFinalise::new(source, || fired.set(fired.get() + 1));
    assert_eq!(wrapped.next(), Some(1));
    assert_eq!(fired.get(), 0);
    wrapped.recycle();
    assert_eq!(fired.get(), 1);
}

proptest! {
    #[test]
    fn merge_of_two_sorted_vecs_is_always_sorted(
        mut a in prop::collection::vec(0i32..100, 0..30),
        mut b in prop::collection::vec(0i32..100, 0..30),
    ) {
        a.sort();
        b.sort();
        let left: Box<dyn SortedIterator<Item = i32>> = Box::new(VecSortedIterator::new(a.clone()));
        let right: Box<dyn SortedIterator<Item = i32>> = Box::new(VecSortedIterator::new(b.clone()));
        let merged = collect_all(Merge::new(vec![left, right]));

        prop_assert!(is_sorted_ascending(&merged));
        prop_assert_eq!(merged.len(), a.len() + b.len());
    }

    #[test]
    fn distinct_of_sorted_vec_never_repeats_and_stays_sorted(
        mut values in prop::collection::vec(0i32..20, 0..40),
    ) {
        values.sort();
        let source = VecSortedIterator::new(values);
        let out = collect_all(Distinct::new(source));

        prop_assert!(is_sorted_ascending(&out));
        prop_assert!(out.windows(2).all(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn intersect_of_two_sorted_vecs_is_subset_of_both_and_sorted(
        mut a in prop::collection::vec(0i32..30, 0..30),
        mut b in prop::collection::vec(0i32..30, 0..30),
    ) {
        a.sort();
        b.sort();
        let left: Box<dyn SortedIterator<Item = i32>> = Box::new(VecSortedIterator::new(a.clone()));
        let right: Box<dyn SortedIterator<Item = i32>> = Box::new(VecSortedIterator::new(b.clone()));
        let out = collect_all(Intersect::new(vec![left, right]));

        prop_assert!(is_sorted_ascending(&out));
        for value in &out {
            prop_assert!(a.contains(value));
            prop_assert!(b.contains(value));
        }
    }
}
