//! Staged merge routines shared by the stable families.
//!
//! The entry points are the `merge_*_runs` functions, which consume the top two, three or
//! four runs of the run stack and push back the merged result. All merging bottoms out in
//! [`merge_unguarded`], a branchless two-way merge into disjoint storage; multi-run merges
//! stage their intermediate results in the scratch buffer and come back with a guarded
//! merge, so a comparison unwinding at any point leaves the slice holding a permutation of
//! its original elements.

use std::mem;
use std::ptr;

use super::Run;

/// Merges the two runs on top of the stack.
///
/// # Safety
///
/// `runs` must hold at least 2 runs, adjacent in the slice with the topmost leftmost, and
/// `buf` must be valid for writes of the merged span's length.
pub(super) unsafe fn merge_2_runs<T, F>(
    v: &mut [T],
    buf: *mut T,
    runs: &mut Vec<Run>,
    is_less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let mut run_1 = runs.pop().unwrap_unchecked();
    let run_2 = runs.pop().unwrap_unchecked();

    merge_2way(
        &mut v[run_1.start..run_2.start + run_2.len],
        run_1.len,
        buf,
        is_less,
    );

    run_1.len = run_1.len + run_2.len;
    runs.push(run_1);
}

/// Merges the three runs on top of the stack.
///
/// # Safety
///
/// Same as [`merge_2_runs`], with at least 3 runs on the stack.
pub(super) unsafe fn merge_3_runs<T, F>(
    v: &mut [T],
    buf: *mut T,
    runs: &mut Vec<Run>,
    is_less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let mut run_1 = runs.pop().unwrap_unchecked();
    let run_2 = runs.pop().unwrap_unchecked();
    let run_3 = runs.pop().unwrap_unchecked();

    merge_3way(
        &mut v[run_1.start..run_3.start + run_3.len],
        run_1.len,
        run_1.len + run_2.len,
        buf,
        is_less,
    );

    run_1.len = run_1.len + run_2.len + run_3.len;
    runs.push(run_1);
}

/// Merges the four runs on top of the stack.
///
/// # Safety
///
/// Same as [`merge_2_runs`], with at least 4 runs on the stack.
pub(super) unsafe fn merge_4_runs<T, F>(
    v: &mut [T],
    buf: *mut T,
    runs: &mut Vec<Run>,
    is_less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    let mut run_1 = runs.pop().unwrap_unchecked();
    let run_2 = runs.pop().unwrap_unchecked();
    let run_3 = runs.pop().unwrap_unchecked();
    let run_4 = runs.pop().unwrap_unchecked();

    merge_4way(
        &mut v[run_1.start..run_4.start + run_4.len],
        run_1.len,
        run_1.len + run_2.len,
        run_1.len + run_2.len + run_3.len,
        buf,
        is_less,
    );

    run_1.len = run_1.len + run_2.len + run_3.len + run_4.len;
    runs.push(run_1);
}

unsafe fn merge_2way<T, F>(v: &mut [T], g1: usize, buf: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    // `v` stays untouched until the merge into `buf` is complete, so an unwinding
    // comparison loses nothing.
    merge_unguarded(v.as_ptr(), v.len(), g1, buf, is_less);
    ptr::copy_nonoverlapping(buf, v.as_mut_ptr(), v.len());
}

unsafe fn merge_3way<T, F>(v: &mut [T], g1: usize, g2: usize, buf: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    // merge runs 1,2 into buf
    merge_unguarded(v.as_ptr(), g2, g1, buf, is_less);
    // copy run 3 into buf, so it contains all of the runs
    ptr::copy_nonoverlapping(v.as_ptr().add(g2), buf.add(g2), v.len() - g2);
    // merge runs 1,2,3 which reside in buf back into v
    merge_guarded(buf, v.len(), g2, v.as_mut_ptr(), is_less);
}

unsafe fn merge_4way<T, F>(
    v: &mut [T],
    g1: usize,
    g2: usize,
    g3: usize,
    buf: *mut T,
    is_less: &mut F,
) where
    F: FnMut(&T, &T) -> bool,
{
    // merge runs 1,2 into buf
    merge_unguarded(v.as_ptr(), g2, g1, buf, is_less);
    // merge runs 3,4 into buf
    merge_unguarded(
        v.as_ptr().add(g2),
        v.len() - g2,
        g3 - g2,
        buf.add(g2),
        is_less,
    );
    // merge the two buf halves back into v
    merge_guarded(buf, v.len(), g2, v.as_mut_ptr(), is_less);
}

/// Like [`merge_unguarded`], for the case where `dest` is the live slice region the merged
/// elements came from.
unsafe fn merge_guarded<T, F>(src: *const T, len: usize, mid: usize, dest: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    // If `is_less` unwinds mid-merge, `dest` holds duplicates of some elements and is
    // missing others; the guard then restores the full set from `src`, which the merge
    // loop never writes to.
    let drop_guard = CopyOnDrop { src, dest, len };

    merge_unguarded(src, len, mid, dest, is_less);
    mem::forget(drop_guard);

    struct CopyOnDrop<T> {
        src: *const T,
        dest: *mut T,
        len: usize,
    }

    impl<T> Drop for CopyOnDrop<T> {
        fn drop(&mut self) {
            unsafe {
                ptr::copy_nonoverlapping(self.src, self.dest, self.len);
            }
        }
    }
}

/// Merges non-decreasing runs `src[..mid]` and `src[mid..len]` into `dest`, copying each
/// element exactly once and leaving `src` unchanged.
///
/// # Safety
///
/// Both runs must be non-empty, so `0 < mid < len`. `src` must contain `len` initialized
/// elements, `dest` must be valid for `len` writes and not overlap `src`, and `T` must not
/// be a zero-sized type.
unsafe fn merge_unguarded<T, F>(src: *const T, len: usize, mid: usize, dest: *mut T, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    debug_assert!(mid > 0);
    debug_assert!(mid < len);

    let (src_mid, src_end) = (src.add(mid), src.add(len));

    let mut left = src;
    let mut right = src_mid;
    let mut out = dest;

    while left < src_mid && right < src_end {
        // If equal, prefer the left run to maintain stability.
        let is_l = is_less(&*right, &*left);
        let to_copy = if is_l { right } else { left };
        ptr::copy_nonoverlapping(to_copy, out, 1);
        out = out.add(1);
        right = right.add(is_l as usize);
        left = left.add(!is_l as usize);
    }

    // One of the runs is fully consumed; copy over whatever the other still holds.
    let (rest, rest_len) = if left < src_mid {
        (left, src_mid.offset_from_unsigned(left))
    } else {
        (right, src_end.offset_from_unsigned(right))
    };
    ptr::copy_nonoverlapping(rest, out, rest_len);
}
