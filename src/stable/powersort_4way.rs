use std::cmp::Ordering;
use std::mem::size_of;

use super::merge::{merge_2_runs, merge_3_runs, merge_4_runs};
use super::{insertion_sort, provide_run, Run, MAX_INSERTION};

/// Sorts the slice.
///
/// This sort is stable (i.e., does not reorder equal elements) and *O*(*n* \* log(*n*))
/// worst-case.
///
/// # Current implementation
///
/// Like [`powersort::sort`](super::powersort::sort), but over a 4-ary merge tree: run
/// boundaries of equal depth belong to the same tree node and get merged together, three
/// or four runs in one staged step, which halves the number of times each element moves
/// through memory.
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

    // Scratch for the staged merges; a whole merged span passes through it. Length stays 0
    // so only shallow copies of `v`'s contents ever live in it.
    let mut buf = Vec::with_capacity(len);

    // A 4-ary tree node contributes at most 3 runs of equal boundary depth to the stack.
    let max_stack_height = 3 * (len.ilog2() as usize / 2) + 2;
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

                // Boundaries of equal depth are grouped into one 3- or 4-run step; a lone
                // deep boundary merges pairwise.
                while runs.len() >= 2 && runs[runs.len() - 2].power > runs[runs.len() - 1].power {
                    if runs.len() >= 3 && runs[runs.len() - 2].power != runs[runs.len() - 3].power {
                        merge_2_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
                    } else if runs.len() >= 4
                        && runs[runs.len() - 2].power != runs[runs.len() - 4].power
                    {
                        merge_3_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
                    } else if runs.len() >= 4 {
                        merge_4_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
                    } else {
                        break;
                    }
                }
            }
        }

        runs.push(next_run);
    }

    // Bring the stack height to 1 modulo 3, then collapse four runs at a time; this lands
    // on exactly one run regardless of how many the scan produced.
    unsafe {
        if runs.len() % 3 == 0 && runs.len() >= 3 {
            merge_3_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
        } else if runs.len() % 3 == 2 {
            merge_2_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
        }

        while runs.len() >= 4 {
            merge_4_runs(v, buf.as_mut_ptr(), &mut runs, &mut is_less);
        }
    }

    // Finally, exactly one run must remain in the stack.
    debug_assert!(runs.len() == 1 && runs[0].start == 0 && runs[0].len == len);

    /// Node depth in the 4-ary merge tree for the boundary between two adjacent runs: the
    /// 2-bit digit position where the runs' normalized midpoints first differ.
    #[inline]
    fn merge_tree_depth(left: usize, mid: usize, right: usize, len: usize) -> u8 {
        let l2 = (left + mid) as u64;
        let r2 = (mid + right) as u64;
        let a = (l2 << 30) / len as u64;
        let b = (r2 << 30) / len as u64;

        (((a ^ b).leading_zeros() - 1) / 2 + 1) as u8
    }
}
