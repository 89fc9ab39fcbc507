//! # Generator — Sieving-Prime Production
//!
//! The outer engine needs every prime up to sqrt(stop) as a sieving prime.
//! Those are produced by an inner segmented sieve over
//! `[pre_sieve_limit + 1, sqrt(stop)]` whose consumer pushes each prime it
//! finds straight into the outer engine's ingest interface, keeping both
//! segment loops cache-local. The inner sieve is in turn seeded by a tiny
//! non-segmented bit sieve up to stop^(1/4), where the recursion bottoms
//! out.

use std::sync::Arc;

use crate::pmath;
use crate::presieve::PreSieve;
use crate::segment::{SegmentConsumer, SegmentSieve};
use crate::wheel::BIT_VALUES;

/// Segment size of the inner sieve. Its range is at most sqrt(max_stop),
/// so one L1-sized window is always appropriate.
const GENERATOR_SIEVE_BYTES: usize = 32 * 1024;

struct PrimeGenerator<'a, C: SegmentConsumer> {
    outer: &'a mut SegmentSieve<C>,
}

impl<C: SegmentConsumer> SegmentConsumer for PrimeGenerator<'_, C> {
    fn segment_processed(&mut self, sieve: &[u8], low: u64) {
        for (i, &byte) in sieve.iter().enumerate() {
            let mut bits = byte;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                self.outer.sieve_prime(low + 30 * i as u64 + BIT_VALUES[bit] as u64);
            }
        }
    }
}

/// Feeds every prime in `(presieve.limit(), sqrt_stop]` into `outer`, in
/// ascending order.
pub fn feed_sieving_primes<C: SegmentConsumer>(
    outer: &mut SegmentSieve<C>,
    presieve: Arc<PreSieve>,
    sqrt_stop: u64,
) {
    let start = presieve.limit() as u64 + 1;
    debug_assert!(start <= sqrt_stop);
    let mut inner = SegmentSieve::new(
        start,
        sqrt_stop,
        GENERATOR_SIEVE_BYTES,
        presieve.clone(),
        PrimeGenerator { outer },
    );

    // tiny sieve up to sqrt(sqrt_stop): bit i stands for the integer i,
    // odd bits start set
    let n = pmath::isqrt(sqrt_stop);
    let mut is_prime = vec![0xAAAA_AAAAu32; n as usize / 32 + 1];
    let mut i = 3u64;
    while i * i <= n {
        if is_prime[(i / 32) as usize] & (1 << (i % 32)) != 0 {
            let mut j = i * i;
            while j <= n {
                is_prime[(j / 32) as usize] &= !(1 << (j % 32));
                j += 2 * i;
            }
        }
        i += 2;
    }
    for p in presieve.limit() as u64 + 1..=n {
        if is_prime[(p / 32) as usize] & (1 << (p % 32)) != 0 {
            inner.sieve_prime(p);
        }
    }
    inner.finish();
}
