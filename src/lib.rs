//! # segsieve — Core Library
//!
//! A segmented sieve of Eratosthenes for counting, printing and streaming
//! prime numbers and prime k-tuplets (twins through septuplets) in an
//! inclusive interval `[start, stop]` of u64. The engine combines:
//!
//! 1. **Wheel-30 factorization** ([`wheel`]) — only the 8 residues coprime
//!    to 30 are stored, one byte per 30 integers.
//! 2. **Pre-sieving** ([`presieve`]) — the multiples pattern of the primes
//!    7..=19 (configurable up to 23) is memcpy-tiled into each segment
//!    instead of being crossed off.
//! 3. **Cache-sized segments** ([`segment`]) — the bitmap window defaults
//!    to 32 KiB, fitting the L1 data cache.
//! 4. **Three cross-off engines** ([`erat_small`], [`erat_medium`],
//!    [`erat_big`]) — sieving primes are routed by size: unrolled
//!    revolution loops for primes with many multiples per segment, a
//!    bucket list for primes with a few, and per-future-segment bucket
//!    queues for primes that skip segments entirely.
//! 5. **Layered production** ([`generator`]) — sieving primes up to
//!    sqrt(stop) come from an inner segmented sieve, itself seeded by a
//!    tiny bit sieve up to stop^(1/4).
//!
//! ## Module Organization
//!
//! **Engine** (the sieve itself):
//! - [`wheel`] — modulo-30 tables and the sieving-prime record
//! - [`presieve`] — tiled small-prime pattern
//! - [`bucket`] — arena-backed bucket lists
//! - [`erat_small`], [`erat_medium`], [`erat_big`] — the cross-off tiers
//! - [`segment`] — the segment driver
//! - [`finder`] — counting, k-tuplet recognition, printing, callbacks
//! - [`generator`] — sieving-prime production
//!
//! **API and drivers**:
//! - [`prime_sieve`] — the [`PrimeSieve`] facade (configuration, flags,
//!   counters, status)
//! - [`parallel`] — [`ParallelPrimeSieve`] (rayon interval splitting) and
//!   the nth-prime search
//! - [`iterator`] — [`PrimeIterator`] for lazy forward/backward streaming
//! - [`expr`] — arithmetic expression evaluation for CLI values
//! - [`pmath`] — integer helpers
//!
//! ## Limits
//!
//! `start` and `stop` must not exceed [`max_stop`] (2^64 minus a safety
//! margin for wheel arithmetic). A facade instance is single-threaded;
//! parallelism happens only through [`ParallelPrimeSieve`], which gives
//! each worker its own facade.

pub mod bucket;
pub mod erat_big;
pub mod erat_medium;
pub mod erat_small;
pub mod expr;
pub mod finder;
pub mod generator;
pub mod iterator;
pub mod parallel;
pub mod pmath;
pub mod presieve;
pub mod prime_sieve;
pub mod segment;
pub mod wheel;

pub use iterator::PrimeIterator;
pub use parallel::ParallelPrimeSieve;
pub use prime_sieve::{
    max_stop, PrimeSieve, CALCULATE_STATUS, CALLBACK_PRIMES, COUNT_PRIMES, COUNT_QUADRUPLETS,
    COUNT_QUINTUPLETS, COUNT_SEPTUPLETS, COUNT_SEXTUPLETS, COUNT_TRIPLETS, COUNT_TWINS,
    PRINT_PRIMES, PRINT_QUADRUPLETS, PRINT_QUINTUPLETS, PRINT_SEPTUPLETS, PRINT_SEXTUPLETS,
    PRINT_STATUS, PRINT_TRIPLETS, PRINT_TWINS,
};
