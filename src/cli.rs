//! # CLI Execution
//!
//! Argument handling and result printing for the `segsieve` binary, kept
//! out of `main.rs` to leave the entry point slim. Interval bounds accept
//! arithmetic expressions (`1e13`, `2^32-1`); `--count` takes a digit
//! string selecting which k-tuplet counters to enable; `--print` takes a
//! single tuplet size and implies quiet mode.

use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;

use segsieve::prime_sieve::{
    CALCULATE_STATUS, COUNT_PRIMES, PRINT_PRIMES, PRINT_STATUS,
};
use segsieve::{expr, ParallelPrimeSieve};

#[derive(Parser)]
#[command(
    name = "segsieve",
    about = "Count and print primes and prime k-tuplets",
    version,
    disable_version_flag = true,
    after_help = "Examples:\n  segsieve 1e10              count the primes below 10^10\n  segsieve 1e9 -c123         count primes, twins and triplets\n  segsieve 100 200 -p        print the primes in [100, 200]\n  segsieve 1000 -n           print the 1000th prime"
)]
pub struct Args {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// STOP or START STOP; accepts expressions like 1e13 or 2^32-1
    #[arg(value_name = "NUMBER", num_args = 1..=2, required = true)]
    numbers: Vec<String>,

    /// Count primes (1) and/or k-tuplets (2..6); digits combine, e.g. -c12
    #[arg(short = 'c', long = "count", value_name = "DIGITS", num_args = 0..=1, default_missing_value = "1")]
    count: Option<String>,

    /// Print primes (1) or k-tuplets (2..6), one per line
    #[arg(short = 'p', long = "print", value_name = "K", num_args = 0..=1, default_missing_value = "1")]
    print: Option<String>,

    /// Sieve the interval [START, START + N]
    #[arg(short = 'd', long = "dist", value_name = "N")]
    dist: Option<String>,

    /// Find the nth prime: NUMBER is n, the optional second value is START
    #[arg(short = 'n', long = "nthprime")]
    nth_prime: bool,

    /// Quiet mode, print results as bare numbers
    #[arg(short, long)]
    quiet: bool,

    /// Sieve size in KiB, 1 to 4096
    #[arg(short = 's', long = "size", value_name = "KIB")]
    size: Option<u32>,

    /// Number of worker threads (default: all cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    threads: Option<usize>,

    /// Do not print the progress percentage
    #[arg(long = "no-status")]
    no_status: bool,

    /// Print the elapsed time
    #[arg(long)]
    time: bool,
}

const COUNT_LABELS: [&str; 7] = [
    "Primes",
    "Twin primes",
    "Prime triplets",
    "Prime quadruplets",
    "Prime quintuplets",
    "Prime sextuplets",
    "Prime septuplets",
];

pub fn configure_rayon(threads: Option<usize>) {
    if let Some(n) = threads {
        if n > 0 {
            let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    configure_rayon(args.threads);

    let mut numbers = Vec::new();
    for value in &args.numbers {
        numbers.push(expr::eval(value)?);
    }
    if let Some(dist) = &args.dist {
        if numbers.len() != 1 {
            bail!("--dist expects a single START value");
        }
        let dist = expr::eval(dist)?;
        let stop = numbers[0]
            .checked_add(dist)
            .ok_or_else(|| anyhow::anyhow!("START + dist overflows"))?;
        numbers.push(stop);
    }

    let quiet = args.quiet || args.print.is_some();
    let show_time = args.time || !quiet;

    let mut sieve = ParallelPrimeSieve::new();
    if let Some(kib) = args.size {
        sieve.set_sieve_size(kib);
    }
    if let Some(threads) = args.threads {
        sieve.set_num_threads(threads);
    }

    if args.nth_prime {
        let n = numbers[0];
        let start = numbers.get(1).copied().unwrap_or(0);
        let nth = sieve.nth_prime(n, start)?;
        if quiet {
            println!("{}", nth);
        } else {
            println!("Nth prime: {}", nth);
        }
        if show_time {
            println!("Seconds: {:.3}", sieve.get_seconds());
        }
        return Ok(());
    }

    let (start, stop) = match numbers.len() {
        1 => (0, numbers[0]),
        _ => (numbers[0], numbers[1]),
    };

    let mut flags = 0u32;
    if let Some(digits) = &args.count {
        for c in digits.chars() {
            match c.to_digit(10) {
                Some(k @ 1..=6) => flags |= COUNT_PRIMES << (k - 1),
                _ => bail!("invalid count digits '{}': expected digits 1..6", digits),
            }
        }
    }
    if let Some(value) = &args.print {
        match value.parse::<u32>() {
            Ok(k @ 1..=6) => flags |= PRINT_PRIMES << (k - 1),
            _ => bail!("invalid print argument '{}': expected 1..6", value),
        }
    }
    if flags == 0 {
        flags = COUNT_PRIMES;
    }
    if !quiet && !args.no_status {
        flags |= CALCULATE_STATUS | PRINT_STATUS;
    }
    debug!(start, stop, flags, "cli sieve");

    sieve.set_start(start)?;
    sieve.set_stop(stop)?;
    sieve.set_flags(flags)?;
    sieve.sieve()?;

    if flags & PRINT_STATUS != 0 {
        println!();
    }
    for (i, label) in COUNT_LABELS.iter().enumerate() {
        if flags & (COUNT_PRIMES << i) != 0 {
            if quiet {
                println!("{}", sieve.counts()[i]);
            } else {
                println!("{}: {}", label, sieve.counts()[i]);
            }
        }
    }
    if show_time {
        println!("Seconds: {:.3}", sieve.get_seconds());
    }
    Ok(())
}
