//! # PrimeSieve — Public Facade
//!
//! Holds the sieve configuration (interval, flags, sieve size, pre-sieve
//! limit), runs the segmented engine, and exposes the seven counters,
//! status percentage and elapsed time. The primes 2, 3, 5 and the k-tuplets
//! that straddle the wheel's first gap are handled by a fixed table before
//! the engine runs, which keeps the wheel machinery free of special cases.
//!
//! `sieve()` is a blocking compute call; a facade instance is never shared
//! between threads. The parallel driver gives each worker its own facade
//! and wires them to one [`SharedStatus`] so progress is reported under a
//! single lock.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{bail, Result};
use tracing::debug;

use crate::finder::PrimeFinder;
use crate::generator;
use crate::pmath;
use crate::presieve::PreSieve;
use crate::segment::SegmentSieve;

pub const COUNT_PRIMES: u32 = 1 << 0;
pub const COUNT_TWINS: u32 = 1 << 1;
pub const COUNT_TRIPLETS: u32 = 1 << 2;
pub const COUNT_QUADRUPLETS: u32 = 1 << 3;
pub const COUNT_QUINTUPLETS: u32 = 1 << 4;
pub const COUNT_SEXTUPLETS: u32 = 1 << 5;
pub const COUNT_SEPTUPLETS: u32 = 1 << 6;
pub const PRINT_PRIMES: u32 = 1 << 7;
pub const PRINT_TWINS: u32 = 1 << 8;
pub const PRINT_TRIPLETS: u32 = 1 << 9;
pub const PRINT_QUADRUPLETS: u32 = 1 << 10;
pub const PRINT_QUINTUPLETS: u32 = 1 << 11;
pub const PRINT_SEXTUPLETS: u32 = 1 << 12;
pub const PRINT_SEPTUPLETS: u32 = 1 << 13;
/// Set internally by [`PrimeSieve::generate_primes`]; the four C-style
/// callback variants collapse into one `FnMut(u64)` sink.
pub const CALLBACK_PRIMES: u32 = 1 << 14;
pub const CALCULATE_STATUS: u32 = 1 << 15;
pub const PRINT_STATUS: u32 = 1 << 16;

pub(crate) const PRINT_FLAGS: u32 = 0x7f << 7;

const DEFAULT_SIEVE_SIZE_KIB: u32 = 32;
const DEFAULT_PRE_SIEVE: u32 = 19;

/// Largest permitted `start`/`stop`. The wheel's first-multiple setup may
/// add up to 10 * (2^32 - 1) to a candidate, which must not overflow u64.
pub fn max_stop() -> u64 {
    u64::MAX - 10 * u32::MAX as u64
}

struct SmallPrimeEntry {
    min: u64,
    max: u64,
    index: usize,
    text: &'static str,
}

/// Primes and k-tuplets below the wheel's first spoke, handled outside the
/// engine.
const SMALL_PRIMES: [SmallPrimeEntry; 8] = [
    SmallPrimeEntry { min: 2, max: 2, index: 0, text: "2" },
    SmallPrimeEntry { min: 3, max: 3, index: 0, text: "3" },
    SmallPrimeEntry { min: 5, max: 5, index: 0, text: "5" },
    SmallPrimeEntry { min: 3, max: 5, index: 1, text: "(3, 5)" },
    SmallPrimeEntry { min: 5, max: 7, index: 1, text: "(5, 7)" },
    SmallPrimeEntry { min: 5, max: 11, index: 2, text: "(5, 7, 11)" },
    SmallPrimeEntry { min: 5, max: 13, index: 3, text: "(5, 7, 11, 13)" },
    SmallPrimeEntry { min: 5, max: 17, index: 4, text: "(5, 7, 11, 13, 17)" },
];

/// Progress shared between the parallel driver's workers. Workers post
/// processed spans under the lock; the holder of `print` writes `\rNN%` on
/// each whole-percent increase.
pub(crate) struct SharedStatus {
    interval: f64,
    print: bool,
    state: Mutex<SharedState>,
}

struct SharedState {
    processed: u64,
    last_percent: i64,
}

impl SharedStatus {
    pub(crate) fn new(interval: f64, print: bool) -> SharedStatus {
        SharedStatus {
            interval,
            print,
            state: Mutex::new(SharedState { processed: 0, last_percent: -1 }),
        }
    }

    fn update(&self, span: u64) -> f64 {
        let mut state = self.state.lock().unwrap();
        state.processed += span;
        let percent = (state.processed as f64 / self.interval * 100.0).min(100.0);
        if self.print && percent as i64 > state.last_percent {
            state.last_percent = percent as i64;
            print!("\r{}%", percent as i64);
            let _ = std::io::stdout().flush();
        }
        percent
    }
}

pub struct PrimeSieve {
    start: u64,
    stop: u64,
    flags: u32,
    sieve_size_kib: u32,
    pre_sieve: u32,
    counts: [u64; 7],
    interval: f64,
    processed: u64,
    status: f64,
    seconds: f64,
    presieve_table: Option<Arc<PreSieve>>,
    shared: Option<Arc<SharedStatus>>,
}

impl Default for PrimeSieve {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimeSieve {
    pub fn new() -> PrimeSieve {
        PrimeSieve {
            start: 0,
            stop: 0,
            flags: COUNT_PRIMES,
            sieve_size_kib: DEFAULT_SIEVE_SIZE_KIB,
            pre_sieve: DEFAULT_PRE_SIEVE,
            counts: [0; 7],
            interval: 0.0,
            processed: 0,
            status: -1.0,
            seconds: 0.0,
            presieve_table: None,
            shared: None,
        }
    }

    /// A child facade for one chunk of a parallel run; shares the parent's
    /// configuration, pre-sieve table and status.
    pub(crate) fn worker(parent: &PrimeSieve, start: u64, stop: u64, shared: Arc<SharedStatus>) -> PrimeSieve {
        PrimeSieve {
            start,
            stop,
            flags: parent.flags,
            sieve_size_kib: parent.sieve_size_kib,
            pre_sieve: parent.pre_sieve,
            counts: [0; 7],
            interval: 0.0,
            processed: 0,
            status: -1.0,
            seconds: 0.0,
            presieve_table: parent.presieve_table.clone(),
            shared: Some(shared),
        }
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Fails when `start` exceeds [`max_stop`].
    pub fn set_start(&mut self, start: u64) -> Result<()> {
        if start > max_stop() {
            bail!("START must be <= {}", max_stop());
        }
        self.start = start;
        Ok(())
    }

    /// Fails when `stop` exceeds [`max_stop`].
    pub fn set_stop(&mut self, stop: u64) -> Result<()> {
        if stop > max_stop() {
            bail!("STOP must be <= {}", max_stop());
        }
        self.stop = stop;
        Ok(())
    }

    /// Sieve array size in KiB, rounded up to a power of two and clamped to
    /// [1, 4096]. 32 KiB (the usual L1 data cache size) performs best below
    /// ~10^15, the L2 size above.
    pub fn set_sieve_size(&mut self, kib: u32) {
        self.sieve_size_kib = kib.max(1).next_power_of_two().clamp(1, 4096);
    }

    /// Pre-sieve limit, clamped to [13, 23]. 13 uses 1001 bytes, the
    /// default 19 about 316 KiB, 23 about 7 MiB.
    pub fn set_pre_sieve(&mut self, limit: u32) {
        let limit = limit.clamp(13, 23);
        if limit != self.pre_sieve {
            self.pre_sieve = limit;
            self.presieve_table = None;
        }
    }

    /// Fails when the bitset contains bits above the defined flags.
    pub fn set_flags(&mut self, flags: u32) -> Result<()> {
        if flags >= 1 << 20 {
            bail!("invalid flags");
        }
        self.flags = flags;
        Ok(())
    }

    pub fn add_flags(&mut self, flags: u32) -> Result<()> {
        if flags >= 1 << 20 {
            bail!("invalid flags");
        }
        self.flags |= flags;
        Ok(())
    }

    // ── Getters ─────────────────────────────────────────────────────

    pub fn get_start(&self) -> u64 {
        self.start
    }

    pub fn get_stop(&self) -> u64 {
        self.stop
    }

    pub fn get_flags(&self) -> u32 {
        self.flags
    }

    pub fn get_sieve_size(&self) -> u32 {
        self.sieve_size_kib
    }

    pub fn get_pre_sieve(&self) -> u32 {
        self.pre_sieve
    }

    /// Progress of the current or last run in percent, -1 before any run.
    pub fn get_status(&self) -> f64 {
        self.status
    }

    pub fn get_seconds(&self) -> f64 {
        self.seconds
    }

    pub fn get_prime_count(&self) -> u64 {
        self.counts[0]
    }

    pub fn get_twin_count(&self) -> u64 {
        self.counts[1]
    }

    pub fn get_triplet_count(&self) -> u64 {
        self.counts[2]
    }

    pub fn get_quadruplet_count(&self) -> u64 {
        self.counts[3]
    }

    pub fn get_quintuplet_count(&self) -> u64 {
        self.counts[4]
    }

    pub fn get_sextuplet_count(&self) -> u64 {
        self.counts[5]
    }

    pub fn get_septuplet_count(&self) -> u64 {
        self.counts[6]
    }

    pub fn counts(&self) -> &[u64; 7] {
        &self.counts
    }

    // ── Internal plumbing ───────────────────────────────────────────

    pub(crate) fn is_count(&self, index: usize) -> bool {
        self.flags & (COUNT_PRIMES << index) != 0
    }

    pub(crate) fn is_print(&self, index: usize) -> bool {
        self.flags & (PRINT_PRIMES << index) != 0
    }

    pub(crate) fn is_status(&self) -> bool {
        self.flags & (CALCULATE_STATUS | PRINT_STATUS) != 0
    }

    pub(crate) fn flags(&self) -> u32 {
        self.flags
    }

    pub(crate) fn counts_mut(&mut self) -> &mut [u64; 7] {
        &mut self.counts
    }

    pub(crate) fn update_status(&mut self, span: u64) {
        if let Some(shared) = &self.shared {
            self.status = shared.update(span);
        } else {
            self.processed += span;
            let old = self.status as i64;
            self.status = (self.processed as f64 / self.interval * 100.0).min(100.0);
            if self.flags & PRINT_STATUS != 0 {
                let percent = self.status as i64;
                if percent > old {
                    print!("\r{}%", percent);
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }

    pub(crate) fn presieve_table(&mut self) -> Arc<PreSieve> {
        match &self.presieve_table {
            Some(table) if table.limit() == self.pre_sieve => table.clone(),
            _ => {
                let table = Arc::new(PreSieve::new(self.pre_sieve));
                self.presieve_table = Some(table.clone());
                table
            }
        }
    }

    pub(crate) fn set_parallel_results(&mut self, counts: [u64; 7], seconds: f64) {
        self.counts = counts;
        self.seconds = seconds;
        if self.is_status() {
            self.status = 100.0;
        }
    }

    // ── Sieving ─────────────────────────────────────────────────────

    /// Zeroes the counters and resets status to -1.
    pub fn reset(&mut self) {
        self.counts = [0; 7];
        self.processed = 0;
        self.interval = self.stop.saturating_sub(self.start) as f64 + 1.0;
        self.status = -1.0;
        self.seconds = 0.0;
        if self.is_status() {
            self.update_status(0);
        }
    }

    /// Sieves `[start, stop]` with the current configuration. Fails when
    /// `stop < start`.
    pub fn sieve(&mut self) -> Result<()> {
        self.do_sieve(None)
    }

    pub fn sieve_interval(&mut self, start: u64, stop: u64) -> Result<()> {
        self.set_start(start)?;
        self.set_stop(stop)?;
        self.sieve()
    }

    pub fn sieve_with_flags(&mut self, start: u64, stop: u64, flags: u32) -> Result<()> {
        self.set_start(start)?;
        self.set_stop(stop)?;
        self.set_flags(flags)?;
        self.sieve()
    }

    fn do_sieve<'s>(&mut self, mut sink: Option<&'s mut dyn FnMut(u64)>) -> Result<()> {
        if self.stop < self.start {
            bail!("STOP must be >= START");
        }
        let timer = Instant::now();
        self.reset();
        debug!(
            start = self.start,
            stop = self.stop,
            sieve_kib = self.sieve_size_kib,
            pre_sieve = self.pre_sieve,
            "sieve run"
        );

        if self.start <= 5 {
            for entry in &SMALL_PRIMES {
                self.do_small_prime(entry, &mut sink);
            }
        }

        if self.stop >= 7 {
            let presieve = self.presieve_table();
            let sieve_bytes = self.sieve_size_kib as usize * 1024;
            let engine_start = self.start.max(7);
            let stop = self.stop;
            let sqrt_stop = pmath::isqrt(stop);
            let sink = sink.take();
            let mut engine = SegmentSieve::new(
                engine_start,
                stop,
                sieve_bytes,
                presieve.clone(),
                PrimeFinder::new(self, sink),
            );
            if engine.needs_sieving_primes() {
                generator::feed_sieving_primes(&mut engine, presieve, sqrt_stop);
            }
            engine.finish();
        }

        self.seconds = timer.elapsed().as_secs_f64();
        if self.is_status() {
            self.status = 100.0;
            if self.flags & PRINT_STATUS != 0 && self.shared.is_none() {
                print!("\r100%");
                let _ = std::io::stdout().flush();
            }
        }
        Ok(())
    }

    fn do_small_prime(&mut self, entry: &SmallPrimeEntry, sink: &mut Option<&mut dyn FnMut(u64)>) {
        if self.start <= entry.min && entry.max <= self.stop {
            if entry.index == 0 && self.flags & CALLBACK_PRIMES != 0 {
                if let Some(callback) = sink.as_mut() {
                    callback(entry.min);
                }
            }
            if self.is_count(entry.index) {
                self.counts[entry.index] += 1;
            }
            if self.is_print(entry.index) {
                println!("{}", entry.text);
            }
        }
    }

    /// Invokes `callback` for every prime in `[start, stop]` in ascending
    /// order. Lowers the pre-sieve limit to 17 to keep initialization cheap
    /// for short intervals.
    pub fn generate_primes<F: FnMut(u64)>(&mut self, start: u64, stop: u64, mut callback: F) -> Result<()> {
        self.set_start(start)?;
        self.set_stop(stop)?;
        self.flags = CALLBACK_PRIMES;
        self.set_pre_sieve(17);
        self.do_sieve(Some(&mut callback))
    }

    // ── Convenience wrappers ────────────────────────────────────────

    pub fn count_primes(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_PRIMES)?;
        Ok(self.counts[0])
    }

    pub fn count_twins(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_TWINS)?;
        Ok(self.counts[1])
    }

    pub fn count_triplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_TRIPLETS)?;
        Ok(self.counts[2])
    }

    pub fn count_quadruplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_QUADRUPLETS)?;
        Ok(self.counts[3])
    }

    pub fn count_quintuplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_QUINTUPLETS)?;
        Ok(self.counts[4])
    }

    pub fn count_sextuplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_SEXTUPLETS)?;
        Ok(self.counts[5])
    }

    pub fn count_septuplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_with_flags(start, stop, COUNT_SEPTUPLETS)?;
        Ok(self.counts[6])
    }

    pub fn print_primes(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_PRIMES)
    }

    pub fn print_twins(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_TWINS)
    }

    pub fn print_triplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_TRIPLETS)
    }

    pub fn print_quadruplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_QUADRUPLETS)
    }

    pub fn print_quintuplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_QUINTUPLETS)
    }

    pub fn print_sextuplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_SEXTUPLETS)
    }

    pub fn print_septuplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_with_flags(start, stop, PRINT_SEPTUPLETS)
    }
}
