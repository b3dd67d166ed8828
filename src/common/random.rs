// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::{BigInt, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use super::int::{is_number_in_multiplicative_group, jacobi};

/// Randomness source injected into a session.
pub trait TssRng: RngCore + CryptoRng + Send {}

impl<T: RngCore + CryptoRng + Send> TssRng for T {}

const MUST_GET_RANDOM_INT_MAX_BITS: usize = 5000;

/// Uniform integer in `[0, 2^bits)`. Returns `None` for a bit count outside
/// `(0, 5000]`.
pub fn must_get_random_int<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, bits: usize) -> Option<BigInt> {
    if bits == 0 || bits > MUST_GET_RANDOM_INT_MAX_BITS {
        return None;
    }
    let max = BigInt::one() << bits;
    Some(rng.gen_bigint_range(&BigInt::zero(), &max))
}

/// Uniform integer in `[0, less_than)`. Returns zero when `less_than <= 0`.
pub fn get_random_positive_int<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, less_than: &BigInt) -> BigInt {
    if less_than <= &BigInt::zero() {
        return BigInt::zero();
    }
    rng.gen_bigint_range(&BigInt::zero(), less_than)
}

/// Uniform non-zero integer in `[1, less_than)`.
pub fn get_random_non_zero_int<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, less_than: &BigInt) -> BigInt {
    if less_than <= &BigInt::one() {
        return BigInt::zero();
    }
    rng.gen_bigint_range(&BigInt::one(), less_than)
}

/// Uniform element of `Z*_n`.
pub fn get_random_positive_relatively_prime_int<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, n: &BigInt) -> BigInt {
    if n <= &BigInt::one() {
        return BigInt::zero();
    }
    loop {
        let candidate = get_random_positive_int(rng, n);
        if is_number_in_multiplicative_group(n, &candidate) {
            return candidate;
        }
    }
}

/// Uniform element of `Z*_n` with Jacobi symbol -1.
pub fn get_random_quadratic_non_residue<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, n: &BigInt) -> BigInt {
    loop {
        let w = get_random_positive_int(rng, n);
        if jacobi(&w, n) == -1 {
            return w;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_integer::Integer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_must_get_random_int() {
        let mut rng = StdRng::seed_from_u64(1);
        let random_int = must_get_random_int(&mut rng, 256).unwrap();
        assert!(random_int.bits() <= 256);
        assert!(must_get_random_int(&mut rng, 0).is_none());
        assert!(must_get_random_int(&mut rng, 5001).is_none());
    }

    #[test]
    fn test_get_random_positive_int() {
        let mut rng = StdRng::seed_from_u64(2);
        let less_than = BigInt::from(100);
        for _ in 0..50 {
            let v = get_random_positive_int(&mut rng, &less_than);
            assert!(v >= BigInt::zero() && v < less_than);
            let nz = get_random_non_zero_int(&mut rng, &less_than);
            assert!(nz >= BigInt::one() && nz < less_than);
        }
        assert!(get_random_positive_int(&mut rng, &BigInt::zero()).is_zero());
    }

    #[test]
    fn test_relatively_prime_and_non_residue() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = BigInt::from(7 * 11);
        for _ in 0..20 {
            let v = get_random_positive_relatively_prime_int(&mut rng, &n);
            assert!(v.gcd(&n).is_one());
            let w = get_random_quadratic_non_residue(&mut rng, &n);
            assert_eq!(jacobi(&w, &n), -1);
        }
    }
}
