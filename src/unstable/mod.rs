//! Unstable sort family.

pub mod parsort;
