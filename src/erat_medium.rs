//! # EratMedium — Bucketed Cross-Off for Medium Sieving Primes
//!
//! Medium sieving primes (`p / 30 <= segment_bytes`) have at most a handful
//! of multiples per segment. Their records live in one bucket list; every
//! segment the list is drained, each record crosses off whatever multiples
//! fall inside the segment, and the record is pushed back with its residual
//! offset unless its next multiple already lies beyond `stop`.

use crate::bucket::{BucketArena, NIL};
use crate::wheel::{self, SievingPrime, WHEEL30};

pub struct EratMedium {
    arena: BucketArena,
    head: u32,
    stop: u64,
}

impl EratMedium {
    pub fn new(stop: u64) -> EratMedium {
        EratMedium { arena: BucketArena::new(), head: NIL, stop }
    }

    pub fn store(&mut self, prime: u64, low: u64) {
        if let Some((multiple_index, wheel_index)) = wheel::first_multiple(prime, low, self.stop) {
            let record = SievingPrime::new((prime / 30) as u32, multiple_index as u32, wheel_index);
            self.arena.push(&mut self.head, record);
        }
    }

    /// Crosses off one segment. `low` is the segment base, used to detect
    /// records whose remaining multiples all exceed `stop`.
    pub fn cross_off(&mut self, sieve: &mut [u8], low: u64) {
        let len = sieve.len();
        let mut bucket = std::mem::replace(&mut self.head, NIL);
        while bucket != NIL {
            for k in 0..self.arena.len_of(bucket) {
                let record = self.arena.record(bucket, k);
                let d = record.prime_div_30() as usize;
                let mut i = record.multiple_index() as usize;
                let mut wi = record.wheel_index() as usize;
                while i < len {
                    let e = &WHEEL30[wi];
                    sieve[i] &= e.unset_bit;
                    i += e.next_multiple_factor as usize * d + e.correct as usize;
                    wi = e.next as usize;
                }
                // the next multiple is in byte low/30 + i; drop the record
                // once that byte starts past stop
                if low + 30 * i as u64 + 7 <= self.stop {
                    let record = SievingPrime::new(d as u32, (i - len) as u32, wi as u32);
                    self.arena.push(&mut self.head, record);
                }
            }
            let next = self.arena.next_of(bucket);
            self.arena.free(bucket);
            bucket = next;
        }
    }
}
