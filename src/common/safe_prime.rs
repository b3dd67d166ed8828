// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Safe prime search with a combined sieve over q and p = 2q + 1.
// Algorithm described in: "Safe Prime Generation with a Combined Sieve" https://eprint.iacr.org/2003/186.pdf

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self as sync_mpsc, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_prime::nt_funcs::{is_prime, is_prime64};
use num_traits::{One, ToPrimitive};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use super::random::get_random_positive_int;

const MIN_SAFE_PRIME_BITS: usize = 16;
const SIEVE_LIMIT: u64 = 1000;

// Odd primes below the sieve limit.
static SMALL_PRIMES: Lazy<Vec<u64>> = Lazy::new(|| (3..SIEVE_LIMIT).filter(|&p| is_prime64(p)).collect());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafePrimeError {
    #[error("safe prime size must be at least {min_bits} bits, got {got_bits}")]
    BitLengthTooSmall { min_bits: usize, got_bits: usize },
    #[error("number of primes must be greater than 0")]
    NumPrimesInvalid,
    #[error("generator work cancelled (timeout or explicit cancellation)")]
    GeneratorCancelled,
    #[error("generator workers exited before producing enough primes")]
    WorkersExited,
}

/// A Sophie Germain prime `q` and its safe prime `p = 2q + 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GermainSafePrime {
    q: BigInt,
    p: BigInt,
}

impl GermainSafePrime {
    /// The Sophie Germain prime `q`.
    pub fn prime(&self) -> &BigInt {
        &self.q
    }

    /// The safe prime `p = 2q + 1`.
    pub fn safe_prime(&self) -> &BigInt {
        &self.p
    }

    pub fn validate(&self) -> bool {
        probably_prime(&self.q) && probably_prime(&self.p) && self.p == (&self.q << 1) + BigInt::one()
    }
}

/// Probabilistic primality (BPSW via num-prime).
pub fn probably_prime(n: &BigInt) -> bool {
    match n.to_biguint() {
        Some(n) => is_prime(&n, None).probably(),
        None => false,
    }
}

// q must not be 0 mod r, and 2q + 1 must not be 0 mod r, i.e. q != (r - 1) / 2 mod r
fn passes_sieve(q: &BigInt) -> bool {
    SMALL_PRIMES.iter().all(|&r| {
        let rem = q.mod_floor(&BigInt::from(r)).to_u64().unwrap_or(0);
        rem != 0 && rem != (r - 1) / 2
    })
}

fn search_safe_prime<R: RngCore + CryptoRng + ?Sized>(
    p_bit_len: usize,
    rng: &mut R,
    stop: &AtomicBool,
) -> Result<GermainSafePrime, SafePrimeError> {
    if p_bit_len < MIN_SAFE_PRIME_BITS {
        return Err(SafePrimeError::BitLengthTooSmall {
            min_bits: MIN_SAFE_PRIME_BITS,
            got_bits: p_bit_len,
        });
    }
    let q_bit_len = p_bit_len - 1;
    // top two bits of q are set so that a product of two such safe primes has
    // exactly 2 * p_bit_len bits
    let base = (BigInt::one() << (q_bit_len - 1)) + (BigInt::one() << (q_bit_len - 2));
    let span = BigInt::one() << (q_bit_len - 2);

    let mut attempts: u64 = 0;
    loop {
        if stop.load(Ordering::Relaxed) {
            return Err(SafePrimeError::GeneratorCancelled);
        }
        attempts += 1;
        let mut q = &base + get_random_positive_int(rng, &span);
        if q.is_even() {
            q += 1u32;
        }
        if !passes_sieve(&q) {
            continue;
        }
        if !probably_prime(&q) {
            continue;
        }
        let p = (&q << 1) + BigInt::one();
        if probably_prime(&p) {
            debug!(target: "tss-lib", "found {}-bit safe prime after {} candidates", p_bit_len, attempts);
            return Ok(GermainSafePrime { q, p });
        }
    }
}

/// Generates one safe prime of exactly `p_bit_len` bits.
pub fn generate_safe_prime<R: RngCore + CryptoRng + ?Sized>(
    p_bit_len: usize,
    rng: &mut R,
) -> Result<GermainSafePrime, SafePrimeError> {
    search_safe_prime(p_bit_len, rng, &AtomicBool::new(false))
}

/// Generates `num_primes` distinct safe primes of `p_bit_len` bits on
/// `concurrency` blocking workers. Fails with `GeneratorCancelled` when
/// `timeout` elapses first.
pub async fn get_random_safe_primes_concurrent(
    p_bit_len: usize,
    num_primes: usize,
    concurrency: usize,
    timeout: Duration,
) -> Result<Vec<GermainSafePrime>, SafePrimeError> {
    if num_primes == 0 {
        return Err(SafePrimeError::NumPrimesInvalid);
    }
    if p_bit_len < MIN_SAFE_PRIME_BITS {
        return Err(SafePrimeError::BitLengthTooSmall {
            min_bits: MIN_SAFE_PRIME_BITS,
            got_bits: p_bit_len,
        });
    }

    let stop = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<GermainSafePrime>(num_primes);
    for _ in 0..concurrency.max(1) {
        let tx = tx.clone();
        let stop = stop.clone();
        tokio::task::spawn_blocking(move || {
            let mut rng = OsRng;
            while let Ok(sp) = search_safe_prime(p_bit_len, &mut rng, &stop) {
                if tx.blocking_send(sp).is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    let collect = async {
        let mut primes: Vec<GermainSafePrime> = Vec::with_capacity(num_primes);
        while primes.len() < num_primes {
            match rx.recv().await {
                Some(sp) => {
                    if !primes.iter().any(|known| known.p == sp.p) {
                        primes.push(sp);
                    }
                }
                None => return Err(SafePrimeError::WorkersExited),
            }
        }
        Ok(primes)
    };
    let result = tokio::time::timeout(timeout, collect).await;
    stop.store(true, Ordering::Relaxed);
    match result {
        Ok(primes) => primes,
        Err(_) => Err(SafePrimeError::GeneratorCancelled),
    }
}

/// Blocking counterpart of `get_random_safe_primes_concurrent` for callers
/// outside an async runtime. Workers are scoped threads and are all joined
/// before returning.
pub fn get_random_safe_primes_blocking(
    p_bit_len: usize,
    num_primes: usize,
    concurrency: usize,
    timeout: Duration,
) -> Result<Vec<GermainSafePrime>, SafePrimeError> {
    if num_primes == 0 {
        return Err(SafePrimeError::NumPrimesInvalid);
    }
    if p_bit_len < MIN_SAFE_PRIME_BITS {
        return Err(SafePrimeError::BitLengthTooSmall {
            min_bits: MIN_SAFE_PRIME_BITS,
            got_bits: p_bit_len,
        });
    }

    let deadline = Instant::now() + timeout;
    let stop = AtomicBool::new(false);
    let (tx, rx) = sync_mpsc::channel::<GermainSafePrime>();
    thread::scope(|s| {
        for _ in 0..concurrency.max(1) {
            let tx = tx.clone();
            let stop = &stop;
            s.spawn(move || {
                let mut rng = OsRng;
                while let Ok(sp) = search_safe_prime(p_bit_len, &mut rng, stop) {
                    if tx.send(sp).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut primes: Vec<GermainSafePrime> = Vec::with_capacity(num_primes);
        let result = loop {
            if primes.len() == num_primes {
                break Ok(primes);
            }
            match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok(sp) => {
                    if !primes.iter().any(|known| known.p == sp.p) {
                        primes.push(sp);
                    }
                }
                Err(RecvTimeoutError::Timeout) => break Err(SafePrimeError::GeneratorCancelled),
                Err(RecvTimeoutError::Disconnected) => break Err(SafePrimeError::WorkersExited),
            }
        };
        stop.store(true, Ordering::Relaxed);
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_safe_prime() {
        let mut rng = StdRng::seed_from_u64(7);
        let sp = generate_safe_prime(64, &mut rng).unwrap();
        assert!(sp.validate());
        assert_eq!(sp.safe_prime().bits(), 64);
        // p = 3 mod 4, required for Blum moduli
        assert_eq!(sp.safe_prime().mod_floor(&BigInt::from(4)), BigInt::from(3));
    }

    #[test]
    fn test_bit_length_too_small() {
        let mut rng = StdRng::seed_from_u64(8);
        assert!(matches!(
            generate_safe_prime(8, &mut rng),
            Err(SafePrimeError::BitLengthTooSmall { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_safe_pair() {
        let sp = GermainSafePrime {
            q: BigInt::from(7),
            p: BigInt::from(13),
        };
        assert!(!sp.validate());
        let ok = GermainSafePrime {
            q: BigInt::from(11),
            p: BigInt::from(23),
        };
        assert!(ok.validate());
    }

    #[tokio::test]
    async fn test_concurrent_generation() {
        let primes = get_random_safe_primes_concurrent(64, 2, 2, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(primes.len(), 2);
        assert_ne!(primes[0].safe_prime(), primes[1].safe_prime());
        assert!(primes.iter().all(|sp| sp.validate()));
    }

    #[tokio::test]
    async fn test_concurrent_generation_times_out() {
        let res = get_random_safe_primes_concurrent(2048, 4, 1, Duration::from_millis(1)).await;
        assert_eq!(res, Err(SafePrimeError::GeneratorCancelled));
    }

    #[test]
    fn test_blocking_generation() {
        let primes = get_random_safe_primes_blocking(64, 3, 2, Duration::from_secs(60)).unwrap();
        assert_eq!(primes.len(), 3);
        assert!(primes.iter().all(|sp| sp.validate() && sp.safe_prime().bits() == 64));
        assert_ne!(primes[0].safe_prime(), primes[1].safe_prime());
    }

    #[test]
    fn test_blocking_generation_times_out() {
        let res = get_random_safe_primes_blocking(2048, 4, 1, Duration::from_nanos(1));
        assert_eq!(res, Err(SafePrimeError::GeneratorCancelled));
        assert_eq!(
            get_random_safe_primes_blocking(64, 0, 1, Duration::from_secs(1)),
            Err(SafePrimeError::NumPrimesInvalid)
        );
    }
}
