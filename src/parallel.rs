//! # Parallel — Multi-Threaded Sieve Driver
//!
//! Splits `[start, stop]` into chunks, runs one independent [`PrimeSieve`]
//! per rayon task and sums the per-worker counters. Chunk boundaries are
//! cut at values congruent to 1 mod 30 so that every 30-integer byte
//! window (and with it every k-tuplet pattern) lies entirely within one
//! worker. Workers share only the read-only pre-sieve table and the
//! mutex-guarded status.
//!
//! Printing and callback runs stay on the calling thread: output order is
//! part of their contract.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::pmath;
use crate::prime_sieve::{
    max_stop, PrimeSieve, SharedStatus, CALLBACK_PRIMES, COUNT_PRIMES, PRINT_FLAGS, PRINT_STATUS,
};

/// Minimum interval span per worker; smaller runs stay sequential.
const MIN_THREAD_INTERVAL: u64 = 1 << 27;

/// Primes collected per batch while walking toward the nth prime.
const NTH_PRIME_BATCH: u64 = (4 << 20) / 8;

pub struct ParallelPrimeSieve {
    ps: PrimeSieve,
    num_threads: usize,
}

impl Default for ParallelPrimeSieve {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelPrimeSieve {
    pub fn new() -> ParallelPrimeSieve {
        ParallelPrimeSieve { ps: PrimeSieve::new(), num_threads: 0 }
    }

    /// 0 selects the rayon pool size.
    pub fn set_num_threads(&mut self, threads: usize) {
        self.num_threads = threads;
    }

    pub fn get_num_threads(&self) -> usize {
        self.ideal_num_threads()
    }

    pub fn set_start(&mut self, start: u64) -> Result<()> {
        self.ps.set_start(start)
    }

    pub fn set_stop(&mut self, stop: u64) -> Result<()> {
        self.ps.set_stop(stop)
    }

    pub fn set_sieve_size(&mut self, kib: u32) {
        self.ps.set_sieve_size(kib)
    }

    pub fn set_pre_sieve(&mut self, limit: u32) {
        self.ps.set_pre_sieve(limit)
    }

    pub fn set_flags(&mut self, flags: u32) -> Result<()> {
        self.ps.set_flags(flags)
    }

    pub fn add_flags(&mut self, flags: u32) -> Result<()> {
        self.ps.add_flags(flags)
    }

    pub fn inner(&self) -> &PrimeSieve {
        &self.ps
    }

    pub fn get_seconds(&self) -> f64 {
        self.ps.get_seconds()
    }

    pub fn counts(&self) -> &[u64; 7] {
        self.ps.counts()
    }

    fn ideal_num_threads(&self) -> usize {
        let interval = self.ps.get_stop().saturating_sub(self.ps.get_start()) + 1;
        let cap = (interval / MIN_THREAD_INTERVAL).max(1) as usize;
        let pool = if self.num_threads > 0 { self.num_threads } else { rayon::current_num_threads() };
        pool.min(cap).max(1)
    }

    /// Sieves with the current configuration, in parallel when the
    /// interval is large enough and no ordered output is requested.
    pub fn sieve(&mut self) -> Result<()> {
        if self.ps.get_stop() < self.ps.get_start() {
            bail!("STOP must be >= START");
        }
        let threads = self.ideal_num_threads();
        if threads <= 1 || self.ps.get_flags() & (PRINT_FLAGS | CALLBACK_PRIMES) != 0 {
            return self.ps.sieve();
        }

        let timer = Instant::now();
        let start = self.ps.get_start();
        let stop = self.ps.get_stop();
        let interval = stop - start + 1;
        let shared = Arc::new(SharedStatus::new(
            interval as f64,
            self.ps.get_flags() & PRINT_STATUS != 0,
        ));
        // build the pre-sieve table once; workers share it read-only
        self.ps.presieve_table();

        let chunks = split_interval(start, stop, threads as u64);
        debug!(workers = chunks.len(), start, stop, "parallel sieve");
        let counts = chunks
            .par_iter()
            .map(|&(lo, hi)| -> Result<[u64; 7]> {
                let mut worker = PrimeSieve::worker(&self.ps, lo, hi, shared.clone());
                worker.sieve()?;
                Ok(*worker.counts())
            })
            .try_reduce(
                || [0u64; 7],
                |mut acc, c| {
                    for (a, b) in acc.iter_mut().zip(c.iter()) {
                        *a += b;
                    }
                    Ok(acc)
                },
            )?;

        self.ps.set_parallel_results(counts, timer.elapsed().as_secs_f64());
        Ok(())
    }

    pub fn sieve_interval(&mut self, start: u64, stop: u64) -> Result<()> {
        self.set_start(start)?;
        self.set_stop(stop)?;
        self.sieve()
    }

    pub fn count_primes(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.set_start(start)?;
        self.set_stop(stop)?;
        self.set_flags(COUNT_PRIMES)?;
        self.sieve()?;
        Ok(self.ps.get_prime_count())
    }

    /// The nth prime greater than or equal to `start`, found by counting
    /// whole batches and only materializing the final one.
    pub fn nth_prime(&mut self, n: u64, start: u64) -> Result<u64> {
        if n == 0 {
            bail!("n must be >= 1");
        }
        let timer = Instant::now();
        let mut remaining = n;
        let mut low = start;
        loop {
            let distance = nth_prime_distance(remaining, low);
            let high = pmath::add_overflow_safe(low, distance).min(max_stop());
            let count = self.count_primes(low, high)?;
            if count >= remaining {
                let mut primes = Vec::with_capacity(count as usize);
                let mut collector = PrimeSieve::new();
                collector.set_sieve_size(self.ps.get_sieve_size());
                collector.generate_primes(low, high, |p| primes.push(p))?;
                let nth = primes[(remaining - 1) as usize];
                let counts = *self.ps.counts();
                self.ps.set_parallel_results(counts, timer.elapsed().as_secs_f64());
                return Ok(nth);
            }
            remaining -= count;
            if high >= max_stop() {
                bail!("nth prime exceeds {}", max_stop());
            }
            low = high + 1;
        }
    }
}

/// Interval length expected to contain `remaining` primes near `low`, with
/// headroom; capped so one batch never materializes more than a few
/// hundred thousand primes.
fn nth_prime_distance(remaining: u64, low: u64) -> u64 {
    let batch = remaining.min(NTH_PRIME_BATCH) as f64;
    let ln = (low.max(100) as f64).ln();
    (batch * ln * 1.2) as u64 + 30_000
}

/// Splits `[start, stop]` into up to `pieces` chunks whose boundaries are
/// congruent to 1 mod 30.
fn split_interval(start: u64, stop: u64, pieces: u64) -> Vec<(u64, u64)> {
    let interval = stop - start + 1;
    let chunk = (interval / pieces).max(1);
    let mut bounds = Vec::new();
    let mut low = start;
    for _ in 1..pieces {
        let raw = low.saturating_add(chunk);
        if raw >= stop {
            break;
        }
        let cut = raw + (31 - raw % 30) % 30;
        if cut >= stop {
            break;
        }
        bounds.push((low, cut));
        low = cut + 1;
    }
    bounds.push((low, stop));
    bounds
}
