//! Property-based tests using proptest.
//!
//! Mathematical invariants that must hold for arbitrary intervals and
//! configurations, checked against a naive reference sieve.

use proptest::prelude::*;

use segsieve::{PrimeIterator, PrimeSieve};

fn naive_count(start: u64, stop: u64) -> u64 {
    if stop < 2 {
        return 0;
    }
    let mut composite = vec![false; stop as usize + 1];
    let mut p = 2usize;
    while p * p <= stop as usize {
        if !composite[p] {
            for m in (p * p..=stop as usize).step_by(p) {
                composite[m] = true;
            }
        }
        p += 1;
    }
    (start.max(2)..=stop).filter(|&n| !composite[n as usize]).count() as u64
}

fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The engine's count equals the naive sieve's on arbitrary intervals.
    #[test]
    fn prop_count_matches_naive(start in 0u64..200_000, width in 0u64..20_000) {
        let stop = start + width;
        let mut ps = PrimeSieve::new();
        let engine = ps.count_primes(start, stop).unwrap();
        prop_assert_eq!(engine, naive_count(start, stop),
            "count_primes({}, {})", start, stop);
    }

    /// Any sieve size yields identical counts.
    #[test]
    fn prop_sieve_size_is_invisible(kib in 1u32..200, start in 0u64..100_000) {
        let stop = start + 50_000;
        let mut reference = PrimeSieve::new();
        let expected = reference.count_primes(start, stop).unwrap();
        let mut ps = PrimeSieve::new();
        ps.set_sieve_size(kib);
        prop_assert_eq!(ps.count_primes(start, stop).unwrap(), expected);
    }

    /// The callback stream reproduces exactly the primes of the interval.
    #[test]
    fn prop_callback_yields_the_primes(start in 0u64..100_000, width in 0u64..5_000) {
        let stop = start + width;
        let mut primes = Vec::new();
        let mut ps = PrimeSieve::new();
        ps.generate_primes(start, stop, |p| primes.push(p)).unwrap();
        for w in primes.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
        for &p in &primes {
            prop_assert!((start..=stop).contains(&p));
            prop_assert!(is_prime_u64(p), "{} is not prime", p);
        }
        prop_assert_eq!(primes.len() as u64, naive_count(start, stop));
    }

    /// next_prime returns the first prime at or after the start position.
    #[test]
    fn prop_iterator_next(start in 0u64..1_000_000) {
        let mut it = PrimeIterator::new(start).unwrap();
        let p = it.next_prime().unwrap();
        prop_assert!(p >= start.max(2));
        prop_assert!(is_prime_u64(p));
        // nothing prime in between
        for n in start..p {
            prop_assert!(!is_prime_u64(n));
        }
    }

    /// previous_prime returns the first prime below the start position, or
    /// the 0 sentinel when there is none.
    #[test]
    fn prop_iterator_previous(start in 0u64..100_000) {
        let mut it = PrimeIterator::new(start).unwrap();
        let p = it.previous_prime().unwrap();
        if start <= 2 {
            prop_assert_eq!(p, 0);
        } else {
            prop_assert!(p < start);
            prop_assert!(is_prime_u64(p));
            for n in p + 1..start {
                prop_assert!(!is_prime_u64(n));
            }
        }
    }

    /// Twin counting is consistent with the prime stream.
    #[test]
    fn prop_twins_match_stream(start in 0u64..50_000) {
        let stop = start + 10_000;
        let mut primes = Vec::new();
        let mut ps = PrimeSieve::new();
        ps.generate_primes(start, stop, |p| primes.push(p)).unwrap();
        let expected = primes.windows(2).filter(|w| w[1] - w[0] == 2).count() as u64;
        // a twin only counts when both members are inside [start, stop],
        // which the stream guarantees by construction
        let mut counter = PrimeSieve::new();
        prop_assert_eq!(counter.count_twins(start, stop).unwrap(), expected);
    }
}
