//! The comparator bridge.
//!
//! Every foreign comparison passes through [`ForeignCmp`], in both directions: the raw
//! function pointer and context go in, and the three-state result comes back out as either
//! an [`Ordering`] or a local unwind that the entry points fence off. No comparator state
//! is ever registered globally; each sort invocation carries its own capability, so
//! concurrent invocations on the same element type cannot observe each other's comparator.

use std::cmp::Ordering;
use std::mem::{align_of, offset_of, size_of};
use std::panic;

/// Result record a foreign comparator returns for a single comparison.
///
/// `order == -1` means the first argument is strictly less; any other value means
/// not-less. The sorts only ever consume a strict-less predicate, so equality is never
/// represented separately. When `failed` is true no ordering decision was made and the
/// sort has to stop.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CmpResult {
    pub order: i8,
    pub failed: bool,
}

/// Comparator signature shared with foreign callers.
///
/// The context pointer is opaque to the bridge and passed back verbatim on every call.
pub type CmpFn<T> = unsafe extern "C" fn(&T, &T, *mut u8) -> CmpResult;

/// The local translation of one bridged comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOutcome {
    Less,
    NotLess,
    Failed,
}

/// Unwind payload for a failed comparison. Private to the crate: the entry points catch it
/// before it can reach the boundary, callers only ever see a status code.
pub(crate) struct CmpAborted;

/// A caller-supplied comparator plus its opaque context, scoped to one sort invocation.
pub struct ForeignCmp<T> {
    cmp_fn: CmpFn<T>,
    ctx: *mut u8,
}

impl<T> Clone for ForeignCmp<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ForeignCmp<T> {}

// The parallel family calls the comparator from its worker threads; the `_by` entry points
// of that family make thread-safety of `cmp_fn` and `ctx` part of their contract.
unsafe impl<T> Send for ForeignCmp<T> {}
unsafe impl<T> Sync for ForeignCmp<T> {}

impl<T> ForeignCmp<T> {
    /// # Safety
    ///
    /// `cmp_fn` must be callable with references to initialized `T` values plus `ctx` for
    /// the whole sort invocation. If the capability is handed to the parallel family, both
    /// must tolerate concurrent calls from other threads.
    pub unsafe fn new(cmp_fn: CmpFn<T>, ctx: *mut u8) -> Self {
        Self { cmp_fn, ctx }
    }

    /// Calls the foreign comparator once and translates its three-state result.
    #[inline]
    pub fn outcome(&self, a: &T, b: &T) -> CmpOutcome {
        let res = unsafe { (self.cmp_fn)(a, b, self.ctx) };
        if res.failed {
            CmpOutcome::Failed
        } else if res.order == -1 {
            CmpOutcome::Less
        } else {
            CmpOutcome::NotLess
        }
    }

    /// Like [`outcome`](Self::outcome), but raises a failed comparison as a local unwind.
    ///
    /// The unwind carries [`CmpAborted`] and is resumed without going through the panic
    /// hook, so a failure stays invisible until the entry point turns it into a status
    /// code. The sorts are unwind-safe: they leave the buffer holding a permutation of its
    /// original elements when a comparison unwinds out of them.
    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match self.outcome(a, b) {
            CmpOutcome::Less => Ordering::Less,
            CmpOutcome::NotLess => Ordering::Greater,
            CmpOutcome::Failed => panic::resume_unwind(Box::new(CmpAborted)),
        }
    }
}

// The record crosses the boundary by value, so its layout is pinned like the element types.
const _: () = assert!(size_of::<CmpResult>() == 2);
const _: () = assert!(align_of::<CmpResult>() == 1);
const _: () = assert!(offset_of!(CmpResult, order) == 0);
const _: () = assert!(offset_of!(CmpResult, failed) == 1);
