// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Paillier cryptosystem with g = N + 1, plus the proof of knowledge of N's
// factorisation used by key generation (GG18, figure 6).

use log::debug;
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256;
use crate::common::int::{is_number_in_multiplicative_group, ModInt};
use crate::common::random::get_random_positive_relatively_prime_int;
use crate::common::safe_prime::{generate_safe_prime, probably_prime, SafePrimeError};
use crate::crypto::ecpoint::ECPoint;

pub const PROOF_ITERS: usize = 13;
const VERIFY_PRIMES_UNTIL: u64 = 1000;
const PQ_BIT_LEN_DIFFERENCE: u64 = 3;

static VERIFY_PRIMES: Lazy<Vec<BigInt>> = Lazy::new(|| {
    (2..VERIFY_PRIMES_UNTIL)
        .filter(|&p| num_prime::nt_funcs::is_prime64(p))
        .map(BigInt::from)
        .collect()
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaillierError {
    #[error("message is too large or < 0")]
    MessageTooLong,
    #[error("message is malformed")]
    MessageMalformed,
    #[error("invalid prime factors")]
    InvalidPrimes,
    #[error(transparent)]
    SafePrime(#[from] SafePrimeError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub n: BigInt,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    pub public_key: PublicKey,
    pub lambda_n: BigInt,
    pub phi_n: BigInt,
    pub p: BigInt,
    pub q: BigInt,
}

/// `x_i^(N^-1 mod phi(N))` for each derived challenge `x_i`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof(pub Vec<BigInt>);

/// Generates a key pair whose modulus is a product of two safe primes of
/// `modulus_bit_len / 2` bits each.
pub fn generate_key_pair<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    modulus_bit_len: usize,
) -> Result<(PrivateKey, PublicKey), PaillierError> {
    let prime_bits = modulus_bit_len / 2;
    loop {
        let p = generate_safe_prime(prime_bits, rng)?.safe_prime().clone();
        let q = generate_safe_prime(prime_bits, rng)?.safe_prime().clone();
        // |p - q| must not be too small, or N is easy to factor with Fermat's method
        if (&p - &q).abs().bits() < (prime_bits as u64).saturating_sub(PQ_BIT_LEN_DIFFERENCE) {
            debug!(target: "tss-lib", "paillier primes too close, retrying");
            continue;
        }
        let sk = PrivateKey::from_primes(p, q)?;
        let pk = sk.public_key.clone();
        return Ok((sk, pk));
    }
}

impl PublicKey {
    pub fn n_square(&self) -> BigInt {
        &self.n * &self.n
    }

    pub fn gamma(&self) -> BigInt {
        &self.n + BigInt::one()
    }

    pub fn encrypt_and_return_randomness<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        m: &BigInt,
    ) -> Result<(BigInt, BigInt), PaillierError> {
        if m.is_negative() || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        let x = get_random_positive_relatively_prime_int(rng, &self.n);
        let n2 = ModInt::new(self.n_square());
        // 1. gamma^m mod N2
        let gm = n2.exp(&self.gamma(), m);
        // 2. x^N mod N2
        let xn = n2.exp(&x, &self.n);
        // 3. (1) * (2) mod N2
        Ok((n2.mul(&gm, &xn), x))
    }

    pub fn encrypt<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R, m: &BigInt) -> Result<BigInt, PaillierError> {
        self.encrypt_and_return_randomness(rng, m).map(|(c, _)| c)
    }
}

impl PrivateKey {
    /// Builds the private key from the two prime factors of N.
    pub fn from_primes(p: BigInt, q: BigInt) -> Result<Self, PaillierError> {
        if p == q || !probably_prime(&p) || !probably_prime(&q) {
            return Err(PaillierError::InvalidPrimes);
        }
        let n = &p * &q;
        let p_minus_one = &p - BigInt::one();
        let q_minus_one = &q - BigInt::one();
        let phi_n = &p_minus_one * &q_minus_one;
        let lambda_n = &phi_n / p_minus_one.gcd(&q_minus_one);
        Ok(PrivateKey {
            public_key: PublicKey { n },
            lambda_n,
            phi_n,
            p,
            q,
        })
    }

    pub fn decrypt(&self, c: &BigInt) -> Result<BigInt, PaillierError> {
        let n = &self.public_key.n;
        let n_square = self.public_key.n_square();
        if c.is_negative() || c >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        if !c.gcd(&n_square).is_one() {
            return Err(PaillierError::MessageMalformed);
        }
        let n2 = ModInt::new(n_square);
        // 1. L(c^lambda mod N2)
        let lc = l(&n2.exp(c, &self.lambda_n), n);
        // 2. L(gamma^lambda mod N2)
        let lg = l(&n2.exp(&self.public_key.gamma(), &self.lambda_n), n);
        // 3. (1) * (2)^-1 mod N
        let m = ModInt::new(n.clone());
        m.div(&lc, &lg).ok_or(PaillierError::MessageMalformed)
    }

    /// Proves knowledge of the factorisation of N, bound to `k` and the
    /// public point `ecdsa_pub`.
    pub fn proof(&self, k: &BigInt, ecdsa_pub: &ECPoint, iterations: usize) -> Result<Proof, PaillierError> {
        let n = &self.public_key.n;
        let m_n = ModInt::new(n.clone());
        let m = ModInt::new(self.phi_n.clone())
            .mod_inverse(n)
            .ok_or(PaillierError::InvalidPrimes)?;
        let xs = generate_xs(iterations, k, n, ecdsa_pub);
        Ok(Proof(xs.iter().map(|xi| m_n.exp(xi, &m)).collect()))
    }
}

impl Proof {
    pub fn verify(&self, pk_n: &BigInt, k: &BigInt, ecdsa_pub: &ECPoint, iterations: usize) -> bool {
        if self.0.len() != iterations || !pk_n.is_positive() {
            return false;
        }
        if VERIFY_PRIMES.iter().any(|prm| (pk_n % prm).is_zero()) {
            return false;
        }
        let m_n = ModInt::new(pk_n.clone());
        let xs = generate_xs(iterations, k, pk_n, ecdsa_pub);
        xs.iter()
            .zip(self.0.iter())
            .all(|(xi, yi)| m_n.reduce(xi) == m_n.exp(yi, pk_n))
    }

    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        crate::common::slice::bigints_to_bytes(&self.0)
    }

    pub fn from_bytes(bzs: &[Vec<u8>]) -> Self {
        Proof(crate::common::slice::multi_bytes_to_bigints(bzs))
    }
}

// L(u) = (u - 1) / N
fn l(u: &BigInt, n: &BigInt) -> BigInt {
    (u - BigInt::one()) / n
}

// Derives `m` challenges in Z*_N, each as wide as N, from the hash of
// (i, block, retry, k, X, Y, N).
fn generate_xs(m: usize, k: &BigInt, n: &BigInt, ecdsa_pub: &ECPoint) -> Vec<BigInt> {
    let (sx, sy) = (ecdsa_pub.x(), ecdsa_pub.y());
    let kb = k.to_bytes_be().1;
    let sxb = sx.to_bytes_be().1;
    let syb = sy.to_bytes_be().1;
    let nb = n.to_bytes_be().1;
    let blocks = (n.bits() as usize).div_ceil(256);

    let mut ret = Vec::with_capacity(m);
    let mut retry = 0u64;
    while ret.len() < m {
        let ib = ret.len().to_string().into_bytes();
        let rb = retry.to_string().into_bytes();
        let mut xi = Vec::with_capacity(blocks * 32);
        for j in 0..blocks {
            let jb = j.to_string().into_bytes();
            let block = sha512_256(&[&ib, &jb, &rb, &kb, &sxb, &syb, &nb]).unwrap_or_default();
            xi.extend_from_slice(&block);
        }
        let x = BigInt::from_bytes_be(Sign::Plus, &xi);
        if is_number_in_multiplicative_group(n, &x) {
            ret.push(x);
        } else {
            retry += 1;
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::curve::CurveName;
    use once_cell::sync::Lazy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static TEST_KEY: Lazy<(PrivateKey, PublicKey)> = Lazy::new(|| {
        let mut rng = StdRng::seed_from_u64(31);
        generate_key_pair(&mut rng, 512).unwrap()
    });

    #[test]
    fn test_key_shape() {
        let (sk, pk) = &*TEST_KEY;
        assert_eq!(pk.n.bits(), 512);
        assert_eq!(&sk.p * &sk.q, pk.n);
        assert_eq!(sk.phi_n, (&sk.p - 1) * (&sk.q - 1));
    }

    #[test]
    fn test_encrypt_decrypt() {
        let mut rng = StdRng::seed_from_u64(32);
        let (sk, pk) = &*TEST_KEY;
        for m in [BigInt::zero(), BigInt::one(), BigInt::from(123456u64), &pk.n - 1] {
            let c = pk.encrypt(&mut rng, &m).unwrap();
            assert_eq!(sk.decrypt(&c).unwrap(), m);
        }
    }

    #[test]
    fn test_encrypt_decrypt_errors() {
        let mut rng = StdRng::seed_from_u64(33);
        let (sk, pk) = &*TEST_KEY;
        assert_eq!(pk.encrypt(&mut rng, &pk.n), Err(PaillierError::MessageTooLong));
        assert_eq!(pk.encrypt(&mut rng, &BigInt::from(-1)), Err(PaillierError::MessageTooLong));
        assert_eq!(sk.decrypt(&pk.n_square()), Err(PaillierError::MessageTooLong));
        assert_eq!(sk.decrypt(&sk.p), Err(PaillierError::MessageMalformed));
    }

    #[test]
    fn test_proof_verify() {
        let (sk, pk) = &*TEST_KEY;
        let curve = CurveName::Secp256k1;
        let pub_point = ECPoint::scalar_base_mult(curve, &BigInt::from(424242));
        let k = BigInt::from(7);
        let proof = sk.proof(&k, &pub_point, PROOF_ITERS).unwrap();
        assert!(proof.verify(&pk.n, &k, &pub_point, PROOF_ITERS));

        assert!(!proof.verify(&pk.n, &BigInt::from(8), &pub_point, PROOF_ITERS));
        let other_point = ECPoint::scalar_base_mult(curve, &BigInt::from(5));
        assert!(!proof.verify(&pk.n, &k, &other_point, PROOF_ITERS));
        assert!(!proof.verify(&(&pk.n * 3), &k, &pub_point, PROOF_ITERS));
        assert!(!proof.verify(&pk.n, &k, &pub_point, PROOF_ITERS - 1));

        let restored = Proof::from_bytes(&proof.to_bytes());
        assert!(restored.verify(&pk.n, &k, &pub_point, PROOF_ITERS));
    }

    #[test]
    fn test_from_primes_rejects_equal_primes() {
        let p = TEST_KEY.0.p.clone();
        assert_eq!(PrivateKey::from_primes(p.clone(), p), Err(PaillierError::InvalidPrimes));
    }
}
