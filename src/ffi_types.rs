//! Element records shared with foreign callers.
//!
//! Every record is `#[repr(C)]` and its layout is part of the ABI: the sort entry points
//! reinterpret caller buffers as slices of these types without copying, so size, alignment
//! and field offsets are pinned by the assertions at the bottom of this file. Every ordering
//! defined here is total and cannot panic, the natural-order entry points rely on that.

use std::cmp::Ordering;
use std::fmt;
use std::mem::{align_of, offset_of, size_of, ManuallyDrop};
use std::slice;

/// An owned heap string record, laid out like the raw parts of a Rust `String`.
///
/// Foreign callers allocate the payload through their own runtime and only hand buffers of
/// these records across the boundary; the bridge never frees or reallocates a caller's
/// payload, it only moves the records around. Ordering is lexicographic over the payload
/// bytes, which both sides can agree on without caring about encodings.
#[repr(C)]
pub struct RawString {
    data: *mut u8,
    capacity: usize,
    len: usize,
}

impl RawString {
    pub fn new(s: &str) -> Self {
        let mut bytes = ManuallyDrop::new(s.as_bytes().to_vec());
        Self {
            data: bytes.as_mut_ptr(),
            capacity: bytes.capacity(),
            len: bytes.len(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() || self.len == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.data, self.len) }
        }
    }
}

impl PartialEq for RawString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for RawString {}

impl PartialOrd for RawString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RawString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Clone for RawString {
    fn clone(&self) -> Self {
        let mut bytes = ManuallyDrop::new(self.as_bytes().to_vec());
        Self {
            data: bytes.as_mut_ptr(),
            capacity: bytes.capacity(),
            len: bytes.len(),
        }
    }
}

impl Drop for RawString {
    fn drop(&mut self) {
        // Only Rust-constructed records are ever dropped; the sorts move records with
        // shallow copies and never drop buffer elements.
        if !self.data.is_null() && self.capacity != 0 {
            unsafe {
                drop(Vec::from_raw_parts(self.data, self.len, self.capacity));
            }
        }
    }
}

impl fmt::Debug for RawString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawString({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

// The payload is exclusively owned through the record, there is no shared interior state.
unsafe impl Send for RawString {}
unsafe impl Sync for RawString {}

/// A 128-bit fixed-point decimal: a signed count of whole units plus a count of nano-units.
///
/// The derived ordering compares `units` first and `nanos` second, which is the ABI ordering.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal128 {
    pub units: i64,
    pub nanos: i64,
}

impl Decimal128 {
    /// A decimal value monotone in `val`, three fractional digits spread into `nanos`.
    pub fn new(val: i32) -> Self {
        Self {
            units: i64::from(val / 1_000),
            nanos: i64::from(val % 1_000) * 1_000_000,
        }
    }
}

/// A fixed 1024-byte block.
///
/// The ordering probes three spread-out words and compares their wrapping sum, so comparing
/// two blocks does not touch the whole kibibyte.
#[repr(C)]
#[derive(Clone)]
pub struct Block1024 {
    words: [i64; 128],
}

impl Block1024 {
    /// A block whose sort key is monotone in `val`.
    pub fn new(val: i32) -> Self {
        let mut words = [0; 128];
        for (i, word) in words.iter_mut().enumerate() {
            *word = i64::from(val).wrapping_add(i as i64);
        }
        Self { words }
    }

    fn key(&self) -> i64 {
        self.words[0]
            .wrapping_add(self.words[64])
            .wrapping_add(self.words[127])
    }
}

impl PartialEq for Block1024 {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Block1024 {}

impl PartialOrd for Block1024 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Block1024 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Debug for Block1024 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block1024 {{ key: {} }}", self.key())
    }
}

// Both sides of the boundary have to agree on these layouts; a mismatch must fail the build
// instead of corrupting buffers at run time.
const _: () = assert!(size_of::<RawString>() == 3 * size_of::<usize>());
const _: () = assert!(align_of::<RawString>() == align_of::<usize>());
const _: () = assert!(offset_of!(RawString, data) == 0);
const _: () = assert!(offset_of!(RawString, capacity) == size_of::<usize>());
const _: () = assert!(offset_of!(RawString, len) == 2 * size_of::<usize>());

const _: () = assert!(size_of::<Decimal128>() == 16);
const _: () = assert!(align_of::<Decimal128>() == align_of::<i64>());
const _: () = assert!(offset_of!(Decimal128, units) == 0);
const _: () = assert!(offset_of!(Decimal128, nanos) == 8);

const _: () = assert!(size_of::<Block1024>() == 1024);
const _: () = assert!(align_of::<Block1024>() == align_of::<i64>());
