//! Rust sorts behind a C ABI.
//!
//! This crate packages three sort families so runtimes in other languages can sort their
//! own buffers with them:
//!
//! * [`unstable::parsort`], a parallel unstable introspective sort for the integer
//!   element types,
//! * [`stable::powersort`], a stable natural merge sort with a near-optimal binary merge
//!   order,
//! * [`stable::powersort_4way`], its 4-way variant, merging up to four runs per step.
//!
//! The [`abi`] module holds the entry points, one pair of symbols per family and element
//! type. Elements are viewed in place, never copied into Rust-owned storage, which is why
//! the element records in [`ffi_types`] pin their layout with compile-time assertions.
//!
//! Caller comparators cross the boundary through [`comp::ForeignCmp`], a per-invocation
//! capability of function pointer plus opaque context. A comparator reports each
//! comparison as less / not-less / failed; a failure stops the sort early and surfaces as
//! a status code, with the buffer left holding a permutation of its original elements and
//! no unwind ever crossing the boundary.

pub mod abi;
pub mod comp;
pub mod ffi_types;
pub mod stable;
pub mod unstable;

pub use abi::{SORT_FAILED, SORT_OK};
pub use comp::{CmpFn, CmpOutcome, CmpResult, ForeignCmp};
