//! # PreSieve — Tiled Pattern of Small-Prime Multiples
//!
//! Crossing off the primes 7..=limit (limit in [13, 23]) costs more than
//! every other prime combined, so their combined multiples pattern is built
//! once and copied into each fresh segment instead. The pattern spans
//! `7 * 11 * ... * limit` bytes, the period of the combined pattern on the
//! wheel, and is read-only after construction; a facade configuration
//! builds it once and workers share it.
//!
//! Primes up to the limit never enter the cross-off engines. Pattern sizes:
//! 1001 bytes for limit 13, ~316 KiB for the default 19, ~7 MiB for 23.

use crate::wheel::{self, WHEEL30};

const PRESIEVE_PRIMES: [u64; 6] = [7, 11, 13, 17, 19, 23];

pub struct PreSieve {
    limit: u32,
    pattern: Vec<u8>,
}

impl PreSieve {
    /// Builds the pattern for primes 7..=limit; the limit is clamped to
    /// [13, 23].
    pub fn new(limit: u32) -> PreSieve {
        let limit = limit.clamp(13, 23);
        let size: u64 = PRESIEVE_PRIMES.iter().filter(|&&p| p <= limit as u64).product();
        let mut pattern = vec![0xffu8; size as usize];
        for &p in PRESIEVE_PRIMES.iter().filter(|&&p| p <= limit as u64) {
            Self::cross_off(&mut pattern, p);
        }
        PreSieve { limit, pattern }
    }

    /// Crosses every multiple p*q (q coprime to 30, q >= 1) off the
    /// pattern, starting with p itself. The pattern length is a multiple of
    /// p, so tiling it continues the sequence seamlessly.
    fn cross_off(pattern: &mut [u8], p: u64) {
        debug_assert_eq!(pattern.len() as u64 % p, 0);
        let d = (p / 30) as usize;
        let mut i = ((p - 7) / 30) as usize;
        let mut wi = wheel::wheel_start_index(p) as usize;
        while i < pattern.len() {
            let e = &WHEEL30[wi];
            pattern[i] &= e.unset_bit;
            i += e.next_multiple_factor as usize * d + e.correct as usize;
            wi = e.next as usize;
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Copies the pattern into a segment buffer, phase-aligned to the
    /// segment base `low` (a multiple of 30).
    pub fn apply(&self, sieve: &mut [u8], low: u64) {
        debug_assert_eq!(low % 30, 0);
        let size = self.pattern.len();
        let mut offset = ((low / 30) % size as u64) as usize;
        let mut done = 0;
        while done < sieve.len() {
            let n = (size - offset).min(sieve.len() - done);
            sieve[done..done + n].copy_from_slice(&self.pattern[offset..offset + n]);
            done += n;
            offset = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::BIT_VALUES;

    fn bit_is_set(buf: &[u8], i: usize, bit: usize) -> bool {
        buf[i] & (1 << bit) != 0
    }

    /// The pattern must clear exactly the wheel positions divisible by one
    /// of its primes.
    #[test]
    fn pattern_matches_divisibility() {
        for limit in [13u32, 19, 23] {
            let ps = PreSieve::new(limit);
            let primes: Vec<u64> =
                PRESIEVE_PRIMES.iter().copied().filter(|&p| p <= limit as u64).collect();
            let size = ps.pattern.len();
            let check_window = |base_bytes: usize, len: usize| {
                let mut buf = vec![0u8; len];
                ps.apply(&mut buf, 30 * base_bytes as u64);
                for i in 0..len {
                    for (bit, &bv) in BIT_VALUES.iter().enumerate() {
                        let v = 30 * (base_bytes + i) as u64 + bv as u64;
                        let divisible = primes.iter().any(|&p| v % p == 0);
                        assert_eq!(
                            !bit_is_set(&buf, i, bit),
                            divisible,
                            "limit {} value {}",
                            limit,
                            v
                        );
                    }
                }
            };
            // head of the pattern (several full tilings for the small one)
            check_window(0, 20_000.min(size * 4));
            // the wrap seam at the end of one pattern period
            if size > 2048 {
                check_window(size - 2048, 4096);
            }
        }
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PreSieve::new(0).limit(), 13);
        assert_eq!(PreSieve::new(17).limit(), 17);
        assert_eq!(PreSieve::new(100).limit(), 23);
        assert_eq!(PreSieve::new(13).pattern.len(), 1001);
    }

    /// Applying at an offset must equal the slice of the infinite tiling.
    #[test]
    fn apply_is_phase_aligned() {
        let ps = PreSieve::new(13);
        let mut reference = vec![0u8; 4004];
        ps.apply(&mut reference, 0);
        for low_bytes in [1usize, 500, 1000, 1001, 1500] {
            let mut buf = vec![0u8; 2000];
            ps.apply(&mut buf, 30 * low_bytes as u64);
            assert_eq!(&buf[..], &reference[low_bytes..low_bytes + 2000], "offset {}", low_bytes);
        }
    }
}
