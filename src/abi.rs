//! The externally callable entry points.
//!
//! Symbols follow the scheme `<family>_<stability>_<element>[_by]`: each sort family is
//! instantiated per element type, once in the element's natural order and once taking a
//! caller comparator. Natural-order entry points cannot fail and return nothing. `_by`
//! entry points return [`SORT_OK`], or [`SORT_FAILED`] when the comparator reported a
//! failed comparison; in that case the sort stopped early and the buffer holds an
//! unspecified permutation of its original elements. Nothing ever unwinds across the
//! boundary, and no call observes state from any other call.

use std::panic::{self, AssertUnwindSafe};
use std::slice;

use paste::paste;

use crate::comp::{CmpFn, ForeignCmp};
use crate::ffi_types::{Block1024, Decimal128, RawString};
use crate::{stable, unstable};

/// The sort ran to completion.
pub const SORT_OK: u32 = 0;
/// The comparator reported a failure and the sort stopped early.
pub const SORT_FAILED: u32 = 1;

/// Reborrows a foreign buffer as a slice for the duration of one sort call.
///
/// A null or empty buffer becomes the empty slice, so trivial calls are valid no matter
/// what the caller passed for the other argument.
///
/// # Safety
///
/// Unless `data` is null or `len` is 0, `data` must point to `len` initialized elements
/// that nothing else reads or writes during the call.
unsafe fn view<'a, T>(data: *mut T, len: usize) -> &'a mut [T] {
    if data.is_null() || len == 0 {
        &mut []
    } else {
        slice::from_raw_parts_mut(data, len)
    }
}

/// Runs a sort and fences any unwind into a status code. This catches the resumed unwind
/// of a failed comparison, and with it any comparator panic, so no unwinding can cross the
/// boundary.
fn fence_unwind(sort: impl FnOnce()) -> u32 {
    match panic::catch_unwind(AssertUnwindSafe(sort)) {
        Ok(()) => SORT_OK,
        Err(_) => SORT_FAILED,
    }
}

macro_rules! stable_abi {
    ($algo:ident, $elem:ty, $tag:ident) => {
        paste! {
            #[doc = concat!("Sorts `len` `", stringify!($elem), "` elements in their natural order, stable.")]
            ///
            /// # Safety
            ///
            /// `data` and `len` must satisfy the buffer contract of the module docs.
            #[no_mangle]
            pub unsafe extern "C" fn [<$algo _stable_ $tag>](data: *mut $elem, len: usize) {
                stable::$algo::sort(view(data, len));
            }

            #[doc = concat!("Sorts `len` `", stringify!($elem), "` elements with a caller comparator, stable.")]
            ///
            /// Returns [`SORT_OK`], or [`SORT_FAILED`] if the comparator reported a failed
            /// comparison.
            ///
            /// # Safety
            ///
            /// `data` and `len` must satisfy the buffer contract of the module docs, and
            /// `cmp_fn` must be callable with `ctx` for the duration of the call.
            #[no_mangle]
            pub unsafe extern "C" fn [<$algo _stable_ $tag _by>](
                data: *mut $elem,
                len: usize,
                cmp_fn: CmpFn<$elem>,
                ctx: *mut u8,
            ) -> u32 {
                let v = view(data, len);
                let cmp = ForeignCmp::new(cmp_fn, ctx);
                fence_unwind(move || stable::$algo::sort_by(v, |a, b| cmp.compare(a, b)))
            }
        }
    };
}

macro_rules! parallel_abi {
    ($algo:ident, $elem:ty, $tag:ident) => {
        paste! {
            #[doc = concat!("Sorts `len` `", stringify!($elem), "` elements in their natural order, unstable and parallel.")]
            ///
            /// # Safety
            ///
            /// `data` and `len` must satisfy the buffer contract of the module docs.
            #[no_mangle]
            pub unsafe extern "C" fn [<$algo _unstable_ $tag>](data: *mut $elem, len: usize) {
                unstable::$algo::sort(view(data, len));
            }

            #[doc = concat!("Sorts `len` `", stringify!($elem), "` elements with a caller comparator, unstable and parallel.")]
            ///
            /// Returns [`SORT_OK`], or [`SORT_FAILED`] if the comparator reported a failed
            /// comparison.
            ///
            /// # Safety
            ///
            /// `data` and `len` must satisfy the buffer contract of the module docs, and
            /// `cmp_fn` must be callable with `ctx` for the duration of the call, from any
            /// thread and from several threads at once.
            #[no_mangle]
            pub unsafe extern "C" fn [<$algo _unstable_ $tag _by>](
                data: *mut $elem,
                len: usize,
                cmp_fn: CmpFn<$elem>,
                ctx: *mut u8,
            ) -> u32 {
                let v = view(data, len);
                let cmp = ForeignCmp::new(cmp_fn, ctx);
                fence_unwind(move || unstable::$algo::sort_by(v, |a, b| cmp.compare(a, b)))
            }
        }
    };
}

stable_abi!(powersort, i32, i32);
stable_abi!(powersort, u64, u64);
stable_abi!(powersort, RawString, raw_string);
stable_abi!(powersort, Decimal128, decimal128);
stable_abi!(powersort, Block1024, block1024);

stable_abi!(powersort_4way, i32, i32);
stable_abi!(powersort_4way, u64, u64);
stable_abi!(powersort_4way, RawString, raw_string);
stable_abi!(powersort_4way, Decimal128, decimal128);
stable_abi!(powersort_4way, Block1024, block1024);

parallel_abi!(parsort, i32, i32);
parallel_abi!(parsort, u64, u64);
