//! # Finder — Counting, Printing and Streaming of Sieved Segments
//!
//! Consumes the bitmaps produced by the segment driver. Prime counting is a
//! popcount over 8-byte words; k-tuplet counting uses one 256-entry table
//! per tuplet size, giving the number of patterns starting in a byte. All
//! k-tuplet patterns are byte-aligned on the modulo-30 wheel (a twin
//! occupies bit pairs (1,2), (3,4) or (6,7); the septuplet pattern fills
//! bits 1..7), so no state is carried between bytes.

use crate::prime_sieve::{PrimeSieve, CALLBACK_PRIMES, PRINT_PRIMES};
use crate::segment::SegmentConsumer;
use crate::wheel::BIT_VALUES;

/// Bitmasks of the prime k-tuplet patterns inside one byte, indexed by
/// counter slot (1 = twins .. 6 = septuplets).
const TUPLET_MASKS: [&[u8]; 7] = [
    &[],
    &[0x06, 0x18, 0xc0],       // (11,13) (17,19) (29,31)
    &[0x07, 0x0e, 0x1c, 0x38], // (7,11,13) (11,13,17) (13,17,19) (17,19,23)
    &[0x1e],                   // (11,13,17,19)
    &[0x1f, 0x3e],             // (7,...,19) (11,...,23)
    &[0x3f],                   // (7,...,23)
    &[0xfe],                   // (11,...,31)
];

pub struct PrimeFinder<'p, 's> {
    ps: &'p mut PrimeSieve,
    sink: Option<&'s mut dyn FnMut(u64)>,
    kcounts: [[u8; 256]; 7],
}

impl<'p, 's> PrimeFinder<'p, 's> {
    pub(crate) fn new(ps: &'p mut PrimeSieve, sink: Option<&'s mut dyn FnMut(u64)>) -> PrimeFinder<'p, 's> {
        let mut kcounts = [[0u8; 256]; 7];
        for (k, table) in kcounts.iter_mut().enumerate().skip(1) {
            if ps.is_count(k) {
                for (byte, slot) in table.iter_mut().enumerate() {
                    *slot = TUPLET_MASKS[k]
                        .iter()
                        .filter(|&&m| byte as u8 & m == m)
                        .count() as u8;
                }
            }
        }
        PrimeFinder { ps, sink, kcounts }
    }

    fn count(&mut self, sieve: &[u8]) {
        if self.ps.is_count(0) {
            let mut n = 0u64;
            let mut chunks = sieve.chunks_exact(8);
            for chunk in chunks.by_ref() {
                n += u64::from_le_bytes(chunk.try_into().unwrap()).count_ones() as u64;
            }
            for &byte in chunks.remainder() {
                n += byte.count_ones() as u64;
            }
            self.ps.counts_mut()[0] += n;
        }
        for k in 1..7 {
            if self.ps.is_count(k) {
                let table = &self.kcounts[k];
                let n: u64 = sieve.iter().map(|&b| table[b as usize] as u64).sum();
                self.ps.counts_mut()[k] += n;
            }
        }
    }

    fn emit(&mut self, sieve: &[u8], low: u64) {
        let flags = self.ps.flags();
        if flags & (PRINT_PRIMES | CALLBACK_PRIMES) != 0 {
            for (i, &byte) in sieve.iter().enumerate() {
                let mut bits = byte;
                while bits != 0 {
                    let bit = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    let prime = low + 30 * i as u64 + BIT_VALUES[bit] as u64;
                    if flags & CALLBACK_PRIMES != 0 {
                        if let Some(sink) = self.sink.as_mut() {
                            sink(prime);
                        }
                    }
                    if flags & PRINT_PRIMES != 0 {
                        println!("{}", prime);
                    }
                }
            }
        }
        for k in 1..7 {
            if self.ps.is_print(k) {
                for (i, &byte) in sieve.iter().enumerate() {
                    for &mask in TUPLET_MASKS[k] {
                        if byte & mask == mask {
                            let mut text = String::from("(");
                            let mut bits = mask;
                            while bits != 0 {
                                let bit = bits.trailing_zeros() as usize;
                                bits &= bits - 1;
                                if text.len() > 1 {
                                    text.push_str(", ");
                                }
                                text.push_str(&(low + 30 * i as u64 + BIT_VALUES[bit] as u64).to_string());
                            }
                            text.push(')');
                            println!("{}", text);
                        }
                    }
                }
            }
        }
    }
}

impl SegmentConsumer for PrimeFinder<'_, '_> {
    fn segment_processed(&mut self, sieve: &[u8], low: u64) {
        self.count(sieve);
        if self.ps.flags() & (crate::prime_sieve::PRINT_FLAGS | CALLBACK_PRIMES) != 0 {
            self.emit(sieve, low);
        }
        if self.ps.is_status() {
            self.ps.update_status(30 * sieve.len() as u64);
        }
    }
}
