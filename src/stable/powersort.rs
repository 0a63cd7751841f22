use std::cmp::Ordering;
use std::mem::size_of;

use super::merge::merge_2_runs;
use super::{insertion_sort, provide_run, Run, MAX_INSERTION};

/// Sorts the slice.
///
/// This sort is stable (i.e., does not reorder equal elements) and *O*(*n* \* log(*n*))
/// worst-case.
///
/// # Current implementation
///
/// The current algorithm is an adaptive, iterative merge sort in the
/// [powersort](https://arxiv.org/abs/1805.04154) family: natural runs are detected and
/// merged pairwise in the order a near-optimal binary merge tree prescribes, so pre-sorted
/// stretches of the input are exploited instead of being cut apart at fixed block sizes.
///
/// It allocates temporary storage the size of `self`, but for short slices a
/// non-allocating insertion sort is used instead.
#[inline]
pub fn sort<T>(arr: &mut [T])
where
    T: Ord,
{
    merge_sort(arr, |a, b| a.lt(b));
}

/// Sorts the slice with a comparator function.
///
/// The comparator must define a total ordering for the elements in the slice. If the
/// ordering is not total, the order of the elements is unspecified, but the slice still
/// ends up holding a permutation of its original elements. The same holds if the
/// comparator unwinds.
#[inline]
pub fn sort_by<T, F>(arr: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(arr, |a, b| compare(a, b) == Ordering::Less);
}

/// Runs are identified by traversing the slice backwards, so the run on top of the stack
/// is the leftmost one found so far. Once the next run is known, the boundary between it
/// and the top run gets its merge-tree depth assigned, and pending boundaries deeper than
/// it are merged before the new run is pushed. Deferring each merge until its boundary
/// depth is known is what makes the merge order near-optimal; see the
/// [powersort paper](https://arxiv.org/abs/1805.04154).
fn merge_sort<T, F>(v: &mut [T], mut is_less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    // Sorting has no meaningful behavior on zero-sized types.
    if size_of::<T>() == 0 {
        return;
    }

    let len = v.len();

    // Short arrays get sorted in-place via insertion sort to avoid allocations.
    if len <= MAX_INSERTION {
        insertion_sort(v, &mut is_less);
        return;
    }

    // Allocate a buffer to use as scratch memory. We keep the length 0 so we only ever
    // keep shallow copies of the contents of `v` in it, without risking the dtors running
    // on copies if `is_less` panics. A whole merged span passes through it, hence the
    // full-length capacity.
    let mut buf = Vec::with_capacity(len);

    // Each merge removes a run, and a run's boundary depth bounds the stack height, so
    // the stack never outgrows the merge tree's height.
    let max_stack_height = len.ilog2() as usize + 2;
    let mut runs: Vec<Run> = Vec::with_capacity(max_stack_height);
    let mut end = len;

    while end > 0 {
        let start = provide_run(v, end, &mut is_less);
        let next_run = Run {
            start,
            len: end - start,
            power: 0,
        };
        end = start;

        if runs.len() >= 1 {
            unsafe {
                let last_run = runs.last_mut().unwrap_unchecked();

                last_run.power = merge_tree_depth(
                    next_run.start,
                    last_run.start,
                    last_run.start + last_run.len,
                    len,
                );

                while runs.len() >= 2 && runs[runs.len() - 2].power > runs[runs.len() - 1].power {
                    merge_2_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
                }
            }
        }

        runs.push(next_run);
    }

    // Collapse what remains, left to right.
    unsafe {
        while runs.len() >= 2 {
            merge_2_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
        }
    }

    // Finally, exactly one run must remain in the stack.
    debug_assert!(runs.len() == 1 && runs[0].start == 0 && runs[0].len == len);

    /// Depth at which the merge-tree paths of two adjacent runs separate: the first
    /// differing bit of the runs' doubled midpoints, taken as binary fractions of the
    /// slice length. Computed in `u64` so the shift cannot overflow on 32-bit targets.
    #[inline]
    fn merge_tree_depth(left: usize, mid: usize, right: usize, len: usize) -> u8 {
        let l2 = (left + mid) as u64;
        let r2 = (mid + right) as u64;
        let a = (l2 << 30) / len as u64;
        let b = (r2 << 30) / len as u64;

        (a ^ b).leading_zeros() as u8
    }
}
