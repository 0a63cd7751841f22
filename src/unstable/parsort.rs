use std::cmp::Ordering;

use rayon::slice::ParallelSliceMut;

/// Sorts the slice, but might not preserve the order of equal elements.
///
/// # Current implementation
///
/// A parallel introspective sort: rayon splits the slice across its worker pool and sorts
/// the pieces with a pattern-defeating quicksort that falls back to heapsort when
/// partitioning degrades, so the worst case stays *O*(*n* \* log(*n*)) without auxiliary
/// allocations per element.
#[inline]
pub fn sort<T>(arr: &mut [T])
where
    T: Ord + Send,
{
    arr.par_sort_unstable();
}

/// Sorts the slice with a comparator function, but might not preserve the order of equal
/// elements.
///
/// The comparator is invoked from rayon's worker threads, possibly concurrently, which is
/// why it has to be `Fn + Sync` rather than `FnMut`. A comparator panic on any worker is
/// resumed on the calling thread once the workers have quiesced, with the slice holding a
/// permutation of its original elements.
#[inline]
pub fn sort_by<T, F>(arr: &mut [T], compare: F)
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    arr.par_sort_unstable_by(compare);
}
