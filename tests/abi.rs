//! Exercises the external entry points the way a foreign caller would: raw buffers, raw
//! comparator function pointers, opaque contexts, and status codes. Everything in here is
//! deterministic, randomized coverage lives in the per-family suites.

use std::mem::{align_of, offset_of, size_of};
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering::SeqCst};
use std::thread;

use sort_bridge_rs::abi::*;
use sort_bridge_rs::ffi_types::{Block1024, Decimal128, RawString};
use sort_bridge_rs::CmpResult;

// A deterministic permutation of 0..1024, scrambled enough to produce many short runs.
fn scrambled() -> Vec<i32> {
    (0..1024).map(|i| (i * 733) & 1023).collect()
}

fn is_ascending(v: &[i32]) -> bool {
    v.windows(2).all(|w| w[0] <= w[1])
}

unsafe extern "C" fn cmp_i32_asc(a: &i32, b: &i32, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if a < b { -1 } else { 0 },
        failed: false,
    }
}

unsafe extern "C" fn cmp_i32_desc(a: &i32, b: &i32, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if a > b { -1 } else { 1 },
        failed: false,
    }
}

// Not-less is "any order value other than -1"; report it as 7 to pin that down.
unsafe extern "C" fn cmp_i32_asc_odd_encoding(a: &i32, b: &i32, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if a < b { -1 } else { 7 },
        failed: false,
    }
}

unsafe extern "C" fn cmp_i32_counting(a: &i32, b: &i32, ctx: *mut u8) -> CmpResult {
    let count = &*(ctx as *const AtomicU32);
    count.fetch_add(1, SeqCst);
    cmp_i32_asc(a, b, ptr::null_mut())
}

// Counts the context down; the invocation that reaches it at 1 reports failure.
unsafe extern "C" fn cmp_i32_failing(a: &i32, b: &i32, ctx: *mut u8) -> CmpResult {
    let remaining = &*(ctx as *const AtomicU32);
    if remaining.fetch_sub(1, SeqCst) == 1 {
        CmpResult {
            order: 0,
            failed: true,
        }
    } else {
        cmp_i32_asc(a, b, ptr::null_mut())
    }
}

unsafe extern "C" fn cmp_u64_asc(a: &u64, b: &u64, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if a < b { -1 } else { 0 },
        failed: false,
    }
}

unsafe extern "C" fn cmp_decimal_desc(a: &Decimal128, b: &Decimal128, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if b < a { -1 } else { 0 },
        failed: false,
    }
}

unsafe extern "C" fn cmp_block_desc(a: &Block1024, b: &Block1024, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if b < a { -1 } else { 0 },
        failed: false,
    }
}

// Orders string records by the first two payload bytes only, so records with the same key
// prefix are tied and expose (in)stability.
unsafe extern "C" fn cmp_raw_string_prefix(a: &RawString, b: &RawString, _ctx: *mut u8) -> CmpResult {
    CmpResult {
        order: if a.as_bytes()[..2] < b.as_bytes()[..2] {
            -1
        } else {
            0
        },
        failed: false,
    }
}

#[test]
fn record_layouts_match_the_documented_abi() {
    assert_eq!(size_of::<CmpResult>(), 2);
    assert_eq!(align_of::<CmpResult>(), 1);
    assert_eq!(offset_of!(CmpResult, order), 0);
    assert_eq!(offset_of!(CmpResult, failed), 1);

    assert_eq!(size_of::<RawString>(), 3 * size_of::<usize>());
    assert_eq!(align_of::<RawString>(), align_of::<usize>());

    assert_eq!(size_of::<Decimal128>(), 16);
    assert_eq!(offset_of!(Decimal128, units), 0);
    assert_eq!(offset_of!(Decimal128, nanos), 8);

    assert_eq!(size_of::<Block1024>(), 1024);
    assert_eq!(align_of::<Block1024>(), align_of::<i64>());
}

#[test]
fn natural_order_sorts_a_small_buffer() {
    let mut v = [5, 3, 4, 1, 2];
    unsafe { powersort_stable_i32(v.as_mut_ptr(), v.len()) };
    assert_eq!(v, [1, 2, 3, 4, 5]);

    let mut v = [5, 3, 4, 1, 2];
    unsafe { powersort_4way_stable_i32(v.as_mut_ptr(), v.len()) };
    assert_eq!(v, [1, 2, 3, 4, 5]);

    let mut v = [5, 3, 4, 1, 2];
    unsafe { parsort_unstable_i32(v.as_mut_ptr(), v.len()) };
    assert_eq!(v, [1, 2, 3, 4, 5]);
}

#[test]
fn natural_order_sorts_integers_at_merge_sizes() {
    let input = scrambled();

    let mut v = input.clone();
    unsafe { powersort_stable_i32(v.as_mut_ptr(), v.len()) };
    assert!(is_ascending(&v));

    let mut v = input.clone();
    unsafe { powersort_4way_stable_i32(v.as_mut_ptr(), v.len()) };
    assert!(is_ascending(&v));

    let mut v = input.clone();
    unsafe { parsort_unstable_i32(v.as_mut_ptr(), v.len()) };
    assert!(is_ascending(&v));

    let input: Vec<u64> = input.iter().map(|&x| (x as u64) << 33 | 1).collect();

    let mut v = input.clone();
    unsafe { powersort_stable_u64(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));

    let mut v = input.clone();
    unsafe { powersort_4way_stable_u64(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));

    let mut v = input.clone();
    unsafe { parsort_unstable_u64(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn natural_order_sorts_string_records() {
    let build = || -> Vec<RawString> {
        scrambled()
            .iter()
            .map(|&x| RawString::new(&format!("{:06}", x)))
            .collect()
    };

    let mut v = build();
    unsafe { powersort_stable_raw_string(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));

    let mut v = build();
    unsafe { powersort_4way_stable_raw_string(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn natural_order_sorts_decimal_records() {
    let build = || -> Vec<Decimal128> {
        scrambled()
            .iter()
            .map(|&x| Decimal128::new(x * 37 - 9_000))
            .collect()
    };

    let mut v = build();
    unsafe { powersort_stable_decimal128(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));

    let mut v = build();
    unsafe { powersort_4way_stable_decimal128(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn natural_order_sorts_block_records() {
    let build = || -> Vec<Block1024> {
        scrambled()
            .iter()
            .map(|&x| Block1024::new(x - 512))
            .collect()
    };

    let mut v = build();
    unsafe { powersort_stable_block1024(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));

    let mut v = build();
    unsafe { powersort_4way_stable_block1024(v.as_mut_ptr(), v.len()) };
    assert!(v.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn comparator_controls_the_order() {
    let input: Vec<i32> = (0..50).map(|i| (i * 13) % 50).collect();

    let mut v = input.clone();
    let status =
        unsafe { powersort_stable_i32_by(v.as_mut_ptr(), v.len(), cmp_i32_desc, ptr::null_mut()) };
    assert_eq!(status, SORT_OK);
    assert!(v.windows(2).all(|w| w[0] > w[1]));

    let mut v = input.clone();
    let status = unsafe {
        powersort_4way_stable_i32_by(v.as_mut_ptr(), v.len(), cmp_i32_desc, ptr::null_mut())
    };
    assert_eq!(status, SORT_OK);
    assert!(v.windows(2).all(|w| w[0] > w[1]));

    let mut v = input.clone();
    let status =
        unsafe { parsort_unstable_i32_by(v.as_mut_ptr(), v.len(), cmp_i32_desc, ptr::null_mut()) };
    assert_eq!(status, SORT_OK);
    assert!(v.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn any_order_value_other_than_minus_one_means_not_less() {
    let mut v = scrambled();
    let status = unsafe {
        powersort_stable_i32_by(v.as_mut_ptr(), v.len(), cmp_i32_asc_odd_encoding, ptr::null_mut())
    };
    assert_eq!(status, SORT_OK);
    assert!(is_ascending(&v));
}

#[test]
fn context_reaches_every_comparator_invocation() {
    let count = AtomicU32::new(0);
    let mut v = scrambled();
    let len = v.len();

    let status = unsafe {
        powersort_stable_i32_by(
            v.as_mut_ptr(),
            len,
            cmp_i32_counting,
            &count as *const AtomicU32 as *mut u8,
        )
    };
    assert_eq!(status, SORT_OK);
    assert!(is_ascending(&v));
    // Any comparison sort of n distinct keys needs at least n - 1 comparisons.
    assert!(count.load(SeqCst) as usize >= len - 1);
}

#[test]
fn comparator_failure_surfaces_as_a_status() {
    for len in [5_usize, 50, 2_000] {
        let input: Vec<i32> = (0..len as i32).rev().collect();
        let mut expected = input.clone();
        expected.sort_unstable();

        // Fail on the third invocation.
        let remaining = AtomicU32::new(3);
        let mut v = input.clone();
        let status = unsafe {
            powersort_stable_i32_by(
                v.as_mut_ptr(),
                v.len(),
                cmp_i32_failing,
                &remaining as *const AtomicU32 as *mut u8,
            )
        };
        assert_eq!(status, SORT_FAILED);
        v.sort_unstable();
        assert_eq!(v, expected);

        let remaining = AtomicU32::new(3);
        let mut v = input.clone();
        let status = unsafe {
            powersort_4way_stable_i32_by(
                v.as_mut_ptr(),
                v.len(),
                cmp_i32_failing,
                &remaining as *const AtomicU32 as *mut u8,
            )
        };
        assert_eq!(status, SORT_FAILED);
        v.sort_unstable();
        assert_eq!(v, expected);

        let remaining = AtomicU32::new(3);
        let mut v = input.clone();
        let status = unsafe {
            parsort_unstable_i32_by(
                v.as_mut_ptr(),
                v.len(),
                cmp_i32_failing,
                &remaining as *const AtomicU32 as *mut u8,
            )
        };
        assert_eq!(status, SORT_FAILED);
        v.sort_unstable();
        assert_eq!(v, expected);
    }
}

#[test]
fn late_comparator_failure_still_keeps_every_element() {
    let input = scrambled();
    let mut expected = input.clone();
    expected.sort_unstable();

    for fail_at in [100_u32, 2_000, 4_000] {
        let remaining = AtomicU32::new(fail_at);
        let mut v = input.clone();
        let status = unsafe {
            powersort_4way_stable_i32_by(
                v.as_mut_ptr(),
                v.len(),
                cmp_i32_failing,
                &remaining as *const AtomicU32 as *mut u8,
            )
        };
        assert_eq!(status, SORT_FAILED);
        v.sort_unstable();
        assert_eq!(v, expected);

        let remaining = AtomicU32::new(fail_at);
        let mut v = input.clone();
        let status = unsafe {
            parsort_unstable_i32_by(
                v.as_mut_ptr(),
                v.len(),
                cmp_i32_failing,
                &remaining as *const AtomicU32 as *mut u8,
            )
        };
        assert_eq!(status, SORT_FAILED);
        v.sort_unstable();
        assert_eq!(v, expected);
    }
}

#[test]
fn stable_families_keep_equal_records_in_input_order() {
    let keys = [
        12, 3, 5, 19, 1, 8, 15, 5, 0, 17, 6, 11, 2, 14, 9, 16, 4, 13, 7, 10,
    ];
    let build = || -> Vec<RawString> {
        keys.iter()
            .enumerate()
            .map(|(seq, &key)| RawString::new(&format!("{:02}_{:02}", key, seq)))
            .collect()
    };

    for sort in [powersort_stable_raw_string_by, powersort_4way_stable_raw_string_by] {
        let mut v = build();
        let status =
            unsafe { sort(v.as_mut_ptr(), v.len(), cmp_raw_string_prefix, ptr::null_mut()) };
        assert_eq!(status, SORT_OK);

        // The records tied on key 05 entered at positions 2 and 7 and must come out in
        // that order, adjacent to each other.
        let first = v
            .iter()
            .position(|r| r.as_bytes().starts_with(b"05"))
            .unwrap();
        assert_eq!(v[first].as_bytes(), b"05_02");
        assert_eq!(v[first + 1].as_bytes(), b"05_07");
    }
}

#[test]
fn comparator_sorts_decimal_and_block_records() {
    let mut v: Vec<Decimal128> = scrambled()
        .iter()
        .map(|&x| Decimal128::new(x * 101 - 50_000))
        .collect();
    let status = unsafe {
        powersort_stable_decimal128_by(v.as_mut_ptr(), v.len(), cmp_decimal_desc, ptr::null_mut())
    };
    assert_eq!(status, SORT_OK);
    assert!(v.windows(2).all(|w| w[0] >= w[1]));

    let mut v: Vec<Block1024> = scrambled().iter().map(|&x| Block1024::new(x)).collect();
    let status = unsafe {
        powersort_4way_stable_block1024_by(v.as_mut_ptr(), v.len(), cmp_block_desc, ptr::null_mut())
    };
    assert_eq!(status, SORT_OK);
    assert!(v.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn null_and_empty_buffers_are_trivially_sorted() {
    unsafe {
        powersort_stable_i32(ptr::null_mut(), 0);
        powersort_4way_stable_i32(ptr::null_mut(), 0);
        parsort_unstable_i32(ptr::null_mut(), 0);
        powersort_stable_raw_string(ptr::null_mut(), 0);

        let status = powersort_stable_i32_by(ptr::null_mut(), 0, cmp_i32_asc, ptr::null_mut());
        assert_eq!(status, SORT_OK);
        let status = parsort_unstable_i32_by(ptr::null_mut(), 0, cmp_i32_asc, ptr::null_mut());
        assert_eq!(status, SORT_OK);

        // A null buffer is treated as empty no matter what length rides along with it.
        powersort_stable_i32(ptr::null_mut(), 3);
        let status = powersort_4way_stable_i32_by(ptr::null_mut(), 3, cmp_i32_asc, ptr::null_mut());
        assert_eq!(status, SORT_OK);
    }

    let mut v = [42];
    unsafe { powersort_stable_i32(v.as_mut_ptr(), v.len()) };
    assert_eq!(v, [42]);

    let mut v = vec![7; 100];
    let status =
        unsafe { parsort_unstable_i32_by(v.as_mut_ptr(), v.len(), cmp_i32_asc, ptr::null_mut()) };
    assert_eq!(status, SORT_OK);
    assert_eq!(v, vec![7; 100]);
}

#[test]
fn concurrent_invocations_keep_their_own_comparators() {
    let handles: Vec<_> = (0..8)
        .map(|t| {
            thread::spawn(move || {
                for _ in 0..25 {
                    let mut v = scrambled();
                    let status = unsafe {
                        if t % 2 == 0 {
                            powersort_stable_i32_by(
                                v.as_mut_ptr(),
                                v.len(),
                                cmp_i32_asc,
                                ptr::null_mut(),
                            )
                        } else {
                            powersort_stable_i32_by(
                                v.as_mut_ptr(),
                                v.len(),
                                cmp_i32_desc,
                                ptr::null_mut(),
                            )
                        }
                    };
                    assert_eq!(status, SORT_OK);
                    if t % 2 == 0 {
                        assert!(is_ascending(&v));
                    } else {
                        assert!(v.windows(2).all(|w| w[0] >= w[1]));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn parallel_comparator_context_is_shared_across_workers() {
    let count = AtomicU32::new(0);
    let mut v = scrambled();
    let len = v.len();

    let status = unsafe {
        parsort_unstable_i32_by(
            v.as_mut_ptr(),
            len,
            cmp_i32_counting,
            &count as *const AtomicU32 as *mut u8,
        )
    };
    assert_eq!(status, SORT_OK);
    assert!(is_ascending(&v));
    assert!(count.load(SeqCst) as usize >= len - 1);
}

#[test]
fn comparator_driven_u64_sort_round_trips() {
    let input: Vec<u64> = (0..300u64).map(|i| (i * 0x9E37_79B9) % 1_000).collect();
    let mut expected = input.clone();
    expected.sort_unstable();

    for sort in [
        powersort_stable_u64_by,
        powersort_4way_stable_u64_by,
        parsort_unstable_u64_by,
    ] {
        let mut v = input.clone();
        let status = unsafe { sort(v.as_mut_ptr(), v.len(), cmp_u64_asc, ptr::null_mut()) };
        assert_eq!(status, SORT_OK);
        assert_eq!(v, expected);
    }
}
