//! # EratSmall — Cross-Off for Small Sieving Primes
//!
//! Small sieving primes have many multiples per segment (a prime p crosses
//! roughly `30 * segment_bytes / p` bits each time), so per-step table
//! dispatch would dominate. Instead each prime is aligned to the start of
//! its wheel revolution with at most seven guarded steps, then a loop
//! clears all eight residue bits of one revolution per iteration using
//! byte offsets precomputed for the prime. One revolution advances by
//! exactly p bytes.
//!
//! Residual state (byte offset past the segment end, wheel index) is kept
//! per prime and carries over to the next segment.

use crate::wheel::{self, WHEEL30};

struct SmallPrime {
    prime_div_30: u32,
    /// p % 30; the revolution stride in bytes is 30 * (p/30) + (p%30) = p.
    prime_mod_30: u32,
    multiple_index: u32,
    wheel_index: u32,
}

pub struct EratSmall {
    limit: u64,
    stop: u64,
    primes: Vec<SmallPrime>,
}

impl EratSmall {
    pub fn new(limit: u64, stop: u64) -> EratSmall {
        EratSmall { limit, stop, primes: Vec::new() }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Adds a sieving prime, positioned relative to the segment base `low`.
    pub fn store(&mut self, prime: u64, low: u64) {
        debug_assert!(prime <= self.limit);
        if let Some((multiple_index, wheel_index)) = wheel::first_multiple(prime, low, self.stop) {
            self.primes.push(SmallPrime {
                prime_div_30: (prime / 30) as u32,
                prime_mod_30: (prime % 30) as u32,
                multiple_index: multiple_index as u32,
                wheel_index,
            });
        }
    }

    /// Crosses off the multiples of all stored primes within the segment.
    pub fn cross_off(&mut self, sieve: &mut [u8]) {
        let len = sieve.len();
        for sp in &mut self.primes {
            let d = sp.prime_div_30 as usize;
            let stride = 30 * d + sp.prime_mod_30 as usize;
            let mut i = sp.multiple_index as usize;
            let mut wi = sp.wheel_index as usize;

            // align to the start of a revolution
            while i < len && wi & 7 != 0 {
                let e = &WHEEL30[wi];
                sieve[i] &= e.unset_bit;
                i += e.next_multiple_factor as usize * d + e.correct as usize;
                wi = e.next as usize;
            }

            if i < len {
                // offsets and masks of one full revolution
                let mut off = [0usize; 8];
                let mut mask = [0u8; 8];
                let mut o = 0;
                let mut w = wi;
                for k in 0..8 {
                    let e = &WHEEL30[w];
                    off[k] = o;
                    mask[k] = e.unset_bit;
                    o += e.next_multiple_factor as usize * d + e.correct as usize;
                    w = e.next as usize;
                }
                debug_assert_eq!(o, stride);

                while i + stride <= len {
                    sieve[i + off[0]] &= mask[0];
                    sieve[i + off[1]] &= mask[1];
                    sieve[i + off[2]] &= mask[2];
                    sieve[i + off[3]] &= mask[3];
                    sieve[i + off[4]] &= mask[4];
                    sieve[i + off[5]] &= mask[5];
                    sieve[i + off[6]] &= mask[6];
                    sieve[i + off[7]] &= mask[7];
                    i += stride;
                }

                while i < len {
                    let e = &WHEEL30[wi];
                    sieve[i] &= e.unset_bit;
                    i += e.next_multiple_factor as usize * d + e.correct as usize;
                    wi = e.next as usize;
                }
            }

            sp.multiple_index = (i - len) as u32;
            sp.wheel_index = wi as u32;
        }
    }
}
