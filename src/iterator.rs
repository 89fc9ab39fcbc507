//! # Iterator — Lazy Prime Streaming
//!
//! [`PrimeIterator`] walks primes forward and backward from an arbitrary
//! position without sieving more than a batch at a time. Batches are sized
//! adaptively: small at first so short walks stay cheap, growing after a
//! few regenerations, and never below the density of sieving primes near
//! the current position (which bounds the amortized cost per returned
//! prime).
//!
//! Cursor semantics: after `skip_to(n)`, `next_prime()` returns the first
//! prime >= n and `previous_prime()` the first prime < n; afterwards each
//! call continues strictly beyond the last returned prime in its
//! direction. Walking below 2 yields the sentinel 0.

use anyhow::{bail, Result};

use crate::prime_sieve::{max_stop, PrimeSieve};

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;

pub struct PrimeIterator {
    primes: Vec<u64>,
    /// Index of the next forward candidate; the last returned prime (when
    /// `fresh` is false) is `primes[i - 1]`.
    i: usize,
    start: u64,
    fresh: bool,
    generations: u64,
    ps: PrimeSieve,
}

impl PrimeIterator {
    pub fn new(start: u64) -> Result<PrimeIterator> {
        let mut it = PrimeIterator {
            primes: Vec::new(),
            i: 0,
            start: 0,
            fresh: true,
            generations: 0,
            ps: PrimeSieve::new(),
        };
        it.skip_to(start)?;
        Ok(it)
    }

    /// Repositions the iterator near `start`. When the cached batch already
    /// covers `start` the cursor is moved by binary search and the cache is
    /// kept.
    pub fn skip_to(&mut self, start: u64) -> Result<()> {
        if start > max_stop() {
            bail!("start must be <= {}", max_stop());
        }
        self.start = start;
        self.fresh = true;
        self.generations = 0;
        if !self.primes.is_empty()
            && self.primes[0] <= start
            && *self.primes.last().unwrap() >= start
        {
            self.i = self.primes.partition_point(|&p| p < start);
        } else {
            self.primes.clear();
            self.i = 0;
        }
        Ok(())
    }

    pub fn next_prime(&mut self) -> Result<u64> {
        if self.i >= self.primes.len() {
            self.generate_next_batch()?;
        }
        let prime = self.primes[self.i];
        self.i += 1;
        self.fresh = false;
        Ok(prime)
    }

    pub fn previous_prime(&mut self) -> Result<u64> {
        let back = if self.fresh { 1 } else { 2 };
        if self.i < back {
            self.generate_previous_batch()?;
            let k = self.i - 1;
            let prime = self.primes[k];
            self.i = k + 1;
            self.fresh = false;
            return Ok(prime);
        }
        let k = self.i - back;
        let prime = self.primes[k];
        self.i = k + 1;
        self.fresh = false;
        Ok(prime)
    }

    fn generate_next_batch(&mut self) -> Result<()> {
        let mut low = match self.primes.last() {
            Some(&last) if !self.fresh && last != 0 => {
                if last >= max_stop() {
                    bail!("next prime would exceed {}", max_stop());
                }
                last + 1
            }
            _ => self.start,
        };
        loop {
            if low > max_stop() {
                bail!("next prime would exceed {}", max_stop());
            }
            let high = low.saturating_add(self.batch_interval(low)).min(max_stop());
            let mut batch = Vec::new();
            self.ps.generate_primes(low, high, |p| batch.push(p))?;
            if !batch.is_empty() {
                self.primes = batch;
                self.i = 0;
                return Ok(());
            }
            if high >= max_stop() {
                bail!("next prime would exceed {}", max_stop());
            }
            low = high + 1;
        }
    }

    /// Rebuilds the cache below the current front and leaves the cursor at
    /// its end. Going below 2 stores the single sentinel 0.
    fn generate_previous_batch(&mut self) -> Result<()> {
        let high = match self.primes.first() {
            Some(&front) if !self.fresh => {
                if front == 0 {
                    // already at the bottom sentinel
                    self.i = 1;
                    return Ok(());
                }
                front - 1
            }
            _ => self.start.saturating_sub(1),
        };
        let mut high = high;
        loop {
            if high < 2 {
                self.primes = vec![0];
                self.i = 1;
                return Ok(());
            }
            let low = high.saturating_sub(self.batch_interval(high));
            let mut batch = Vec::new();
            self.ps.generate_primes(low, high, |p| batch.push(p))?;
            if !batch.is_empty() {
                self.primes = batch;
                self.i = self.primes.len();
                return Ok(());
            }
            if low == 0 {
                self.primes = vec![0];
                self.i = 1;
                return Ok(());
            }
            high = low - 1;
        }
    }

    /// Batch interval length near `n`: enough values for the target prime
    /// count at the local density ln(n).
    fn batch_interval(&mut self, n: u64) -> u64 {
        self.generations += 1;
        let x = (n as f64).max(10.0);
        let sqrtx = x.sqrt();
        let sqrtx_primes = (sqrtx / (sqrtx.ln() - 1.0)) as u64;
        let max_primes = (MIB * 512) / 8;
        let base = if self.generations < 10 { KIB * 32 } else { MIB * 4 } / 8;
        let primes = base.max(sqrtx_primes).min(max_primes);
        (primes as f64 * x.ln()) as u64
    }
}
