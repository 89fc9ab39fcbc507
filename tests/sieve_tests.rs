//! End-to-end tests of the public sieve API: known prime counting function
//! values, k-tuplet counts, configuration invariances and the documented
//! failure modes.

use segsieve::{max_stop, ParallelPrimeSieve, PrimeIterator, PrimeSieve};

// --- Prime counts ---

#[test]
fn pi_of_one_hundred() {
    let mut ps = PrimeSieve::new();
    assert_eq!(ps.count_primes(1, 100).unwrap(), 25);
}

#[test]
fn pi_known_values() {
    let mut ps = PrimeSieve::new();
    assert_eq!(ps.count_primes(1, 10).unwrap(), 4);
    assert_eq!(ps.count_primes(1, 1_000).unwrap(), 168);
    assert_eq!(ps.count_primes(1, 100_000).unwrap(), 9_592);
    assert_eq!(ps.count_primes(1, 10_000_000).unwrap(), 664_579);
}

#[test]
fn pi_difference_at_ten_to_the_twelve() {
    let mut ps = PrimeSieve::new();
    let count = ps.count_primes(1_000_000_000_000, 1_000_000_000_000 + 1_000_000).unwrap();
    assert_eq!(count, 37_607);
}

#[test]
fn degenerate_intervals() {
    let mut ps = PrimeSieve::new();
    assert_eq!(ps.count_primes(0, 0).unwrap(), 0);
    assert_eq!(ps.count_primes(1, 1).unwrap(), 0);
    assert_eq!(ps.count_primes(2, 2).unwrap(), 1);
}

// --- k-tuplets ---

#[test]
fn twin_count_and_list() {
    let mut ps = PrimeSieve::new();
    assert_eq!(ps.count_twins(1, 100).unwrap(), 8);
}

#[test]
fn sextuplets_below_ten_million() {
    let mut ps = PrimeSieve::new();
    // only (7, 11, 13, 17, 19, 23)
    assert_eq!(ps.count_sextuplets(1, 10_000_000).unwrap(), 1);
}

#[test]
fn all_counters_at_once() {
    let mut ps = PrimeSieve::new();
    let flags = segsieve::COUNT_PRIMES
        | segsieve::COUNT_TWINS
        | segsieve::COUNT_TRIPLETS
        | segsieve::COUNT_QUADRUPLETS
        | segsieve::COUNT_QUINTUPLETS
        | segsieve::COUNT_SEXTUPLETS
        | segsieve::COUNT_SEPTUPLETS;
    ps.sieve_with_flags(1, 100, flags).unwrap();
    assert_eq!(ps.get_prime_count(), 25);
    assert_eq!(ps.get_twin_count(), 8);
    assert_eq!(ps.get_triplet_count(), 8);
    assert_eq!(ps.get_quadruplet_count(), 2);
    assert_eq!(ps.get_quintuplet_count(), 3);
    assert_eq!(ps.get_sextuplet_count(), 1);
    assert_eq!(ps.get_septuplet_count(), 1);
}

// --- Configuration invariances ---

#[test]
fn segment_size_is_invisible() {
    let mut reference = PrimeSieve::new();
    let expected = reference.count_primes(0, 2_000_000).unwrap();
    for kib in [1u32, 16, 512, 4096] {
        let mut ps = PrimeSieve::new();
        ps.set_sieve_size(kib);
        assert_eq!(ps.count_primes(0, 2_000_000).unwrap(), expected, "{} KiB", kib);
    }
}

#[test]
fn pre_sieve_is_invisible() {
    let mut reference = PrimeSieve::new();
    let expected = reference.count_twins(0, 2_000_000).unwrap();
    for limit in 13..=23u32 {
        let mut ps = PrimeSieve::new();
        ps.set_pre_sieve(limit);
        assert_eq!(ps.count_twins(0, 2_000_000).unwrap(), expected, "pre-sieve {}", limit);
    }
}

#[test]
fn repeated_sieve_is_idempotent() {
    let mut ps = PrimeSieve::new();
    ps.set_start(0).unwrap();
    ps.set_stop(1_000_000).unwrap();
    ps.sieve().unwrap();
    let first = ps.get_prime_count();
    ps.sieve().unwrap();
    assert_eq!(ps.get_prime_count(), first);
}

// --- Round trips ---

#[test]
fn callback_matches_count() {
    let expected = {
        let mut ps = PrimeSieve::new();
        ps.count_primes(0, 1_000_000).unwrap()
    };
    let mut collected = Vec::new();
    let mut ps = PrimeSieve::new();
    ps.generate_primes(0, 1_000_000, |p| collected.push(p)).unwrap();
    assert_eq!(collected.len() as u64, expected);
    assert!(collected.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(collected.first(), Some(&2));
    assert_eq!(collected.last(), Some(&999_983));
}

#[test]
fn callback_offset_interval() {
    // the first primes past 10^12: 10^12 + 39 and the twin pair +61, +63
    let mut primes = Vec::new();
    let mut ps = PrimeSieve::new();
    ps.generate_primes(1_000_000_000_000, 1_000_000_000_063, |p| primes.push(p)).unwrap();
    assert_eq!(primes, vec![1_000_000_000_039, 1_000_000_000_061, 1_000_000_000_063]);

    // wider window: the stream length matches the counter
    let mut count = 0u64;
    let mut ps2 = PrimeSieve::new();
    ps2.generate_primes(1_000_000_000_000, 1_000_000_000_000 + 10_000, |_| count += 1).unwrap();
    let mut counter = PrimeSieve::new();
    assert_eq!(count, counter.count_primes(1_000_000_000_000, 1_000_000_000_000 + 10_000).unwrap());
}

// --- Failure modes ---

#[test]
fn boundary_guards() {
    let mut ps = PrimeSieve::new();
    assert!(ps.set_stop(max_stop()).is_ok());
    assert!(ps.set_stop(max_stop() + 1).is_err());
    assert!(ps.sieve_interval(10, 9).is_err());
    assert!(ps.set_flags(1 << 20).is_err());
}

// --- Parallel driver ---

#[test]
fn parallel_driver_matches_sequential() {
    let mut seq = PrimeSieve::new();
    let expected = seq.count_primes(0, 5_000_000).unwrap();
    let mut par = ParallelPrimeSieve::new();
    assert_eq!(par.count_primes(0, 5_000_000).unwrap(), expected);
}

#[test]
fn nth_prime_scenarios() {
    let mut par = ParallelPrimeSieve::new();
    assert_eq!(par.nth_prime(1, 0).unwrap(), 2);
    assert_eq!(par.nth_prime(1_000, 0).unwrap(), 7_919);
    assert_eq!(par.nth_prime(1, 1_000_000_000_000).unwrap(), 1_000_000_000_039);
}

// --- Iterator ---

#[test]
fn iterator_walks_both_ways() {
    let mut it = PrimeIterator::new(1_000).unwrap();
    assert_eq!(it.next_prime().unwrap(), 1_009);
    assert_eq!(it.next_prime().unwrap(), 1_013);
    assert_eq!(it.next_prime().unwrap(), 1_019);
    assert_eq!(it.next_prime().unwrap(), 1_021);
    assert_eq!(it.next_prime().unwrap(), 1_031);
    assert_eq!(it.previous_prime().unwrap(), 1_021);
}

#[test]
fn iterator_agrees_with_callback() {
    let mut from_callback = Vec::new();
    let mut ps = PrimeSieve::new();
    ps.generate_primes(500, 10_000, |p| from_callback.push(p)).unwrap();

    let mut it = PrimeIterator::new(500).unwrap();
    let mut from_iterator = Vec::new();
    loop {
        let p = it.next_prime().unwrap();
        if p > 10_000 {
            break;
        }
        from_iterator.push(p);
    }
    assert_eq!(from_iterator, from_callback);
}
