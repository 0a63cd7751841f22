//! Stable run-merging sort families.
//!
//! Both families detect natural runs the same way and share the staged merge routines in
//! [`merge`]; they differ in how many adjacent runs a single merge step may consume and in
//! the policy that decides when a pending run boundary gets merged.

mod insert;
mod merge;

pub mod powersort;
pub mod powersort_4way;

// Slices of up to this length get sorted using insertion sort.
const MAX_INSERTION: usize = 20;
// Very short runs are extended using insertion sort to span at least this many elements.
const MIN_RUN: usize = 24;

/// A sorted region of the slice, plus the merge-tree depth of the boundary between it and
/// its left neighbor. The depth is filled in once that neighbor has been found.
#[derive(Clone, Copy)]
struct Run {
    start: usize,
    len: usize,
    power: u8,
}

/// Finds the next natural run ending at `end` (exclusive), reversing it if it is strictly
/// descending, and extends it to span at least [`MIN_RUN`] elements. Returns the run's
/// start index.
fn provide_run<T, F>(v: &mut [T], end: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let mut start = end - 1;
    if start > 0 {
        start -= 1;
        unsafe {
            if is_less(v.get_unchecked(start + 1), v.get_unchecked(start)) {
                while start > 0 && is_less(v.get_unchecked(start), v.get_unchecked(start - 1)) {
                    start -= 1;
                }
                v[start..end].reverse();
            } else {
                while start > 0 && !is_less(v.get_unchecked(start), v.get_unchecked(start - 1)) {
                    start -= 1;
                }
            }
        }
    }

    // Insert some more elements into the run if it's too short. Insertion sort is faster
    // than merge sort on short sequences, so this significantly improves performance.
    while start > 0 && end - start < MIN_RUN {
        start -= 1;
        insert::insert_head(&mut v[start..end], is_less);
    }

    start
}

/// Insertion sorts the whole slice, used below [`MAX_INSERTION`].
fn insertion_sort<T, F>(v: &mut [T], is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    if v.len() >= 2 {
        for i in (0..v.len() - 1).rev() {
            insert::insert_head(&mut v[i..], is_less);
        }
    }
}
