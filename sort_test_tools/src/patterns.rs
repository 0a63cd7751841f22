use std::env;

use once_cell::sync::OnceCell;
use rand::distributions::uniform::SampleRange;
use rand::prelude::*;
use zipf::ZipfDistribution;

/// The seed all patterns derive from. Stable for the duration of the test process so that
/// failures can be reproduced, overridable via the `SORT_TEST_SEED` environment variable.
pub fn base_seed() -> u64 {
    static SEED: OnceCell<u64> = OnceCell::new();

    *SEED.get_or_init(|| match env::var("SORT_TEST_SEED") {
        Ok(val) => val
            .parse()
            .expect("SORT_TEST_SEED must be a valid unsigned 64-bit integer"),
        Err(_) => thread_rng().gen(),
    })
}

fn rng_for(len: usize) -> StdRng {
    // Mix the length in so that patterns of different sizes don't share a prefix.
    StdRng::seed_from_u64(base_seed() ^ (len as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Fully random, the whole `i32` domain.
pub fn random(len: usize) -> Vec<i32> {
    let mut rng = rng_for(len);
    (0..len).map(|_| rng.gen()).collect()
}

/// Random values drawn uniformly from `range`. Narrow ranges give duplicate-heavy inputs.
pub fn random_uniform<R>(len: usize, range: R) -> Vec<i32>
where
    R: SampleRange<i32> + Clone,
{
    let mut rng = rng_for(len);
    (0..len).map(|_| rng.gen_range(range.clone())).collect()
}

/// Random values with a zipfian distribution, a few values make up most of the input.
pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    if len == 0 {
        return Vec::new();
    }

    let mut rng = rng_for(len);
    let dist = ZipfDistribution::new(len, exponent).expect("invalid zipf parameters");
    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

pub fn ascending(len: usize) -> Vec<i32> {
    (0..len as i32).collect()
}

pub fn descending(len: usize) -> Vec<i32> {
    (0..len as i32).rev().collect()
}

pub fn all_equal(len: usize) -> Vec<i32> {
    vec![9; len]
}

/// Ascending first half, descending second half.
pub fn pipe_organ(len: usize) -> Vec<i32> {
    let mut v = ascending(len / 2);
    v.extend((0..(len - len / 2) as i32).rev());
    v
}

/// `saws` sorted sub-sequences, alternating between ascending and descending.
pub fn saw_mixed(len: usize, saws: usize) -> Vec<i32> {
    if len == 0 {
        return Vec::new();
    }

    let saw_len = (len / saws.max(1)).max(1);
    let mut v = random_uniform(len, 0..=(saw_len as i32 * 2));
    for (i, chunk) in v.chunks_mut(saw_len).enumerate() {
        if i % 2 == 0 {
            chunk.sort_unstable();
        } else {
            chunk.sort_unstable_by_key(|val| std::cmp::Reverse(*val));
        }
    }
    v
}

pub fn saw_ascending(len: usize, saws: usize) -> Vec<i32> {
    let mut v = saw_mixed(len, saws);
    let saw_len = (len / saws.max(1)).max(1);
    for chunk in v.chunks_mut(saw_len) {
        chunk.sort_unstable();
    }
    v
}

pub fn saw_descending(len: usize, saws: usize) -> Vec<i32> {
    let mut v = saw_mixed(len, saws);
    let saw_len = (len / saws.max(1)).max(1);
    for chunk in v.chunks_mut(saw_len) {
        chunk.sort_unstable_by_key(|val| std::cmp::Reverse(*val));
    }
    v
}
