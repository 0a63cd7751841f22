use std::cmp::Ordering;

pub mod patterns;

/// The interface a sort implementation has to provide to be run through the generic test suite.
///
/// The `Send` bounds exist so that parallel implementations can be driven through the same
/// suite as single-threaded ones.
pub trait Sort {
    fn name() -> String;

    fn sort<T>(arr: &mut [T])
    where
        T: Ord + Send;

    fn sort_by<T, F>(arr: &mut [T], compare: F)
    where
        T: Send,
        F: FnMut(&T, &T) -> Ordering + Send;
}
