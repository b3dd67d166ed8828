// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::time::{Duration, Instant};

use log::info;
use num_bigint::BigInt;
use num_traits::{One, Signed};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::int::ModInt;
use crate::common::random::get_random_positive_relatively_prime_int;
use crate::common::safe_prime::{
    generate_safe_prime, get_random_safe_primes_blocking, get_random_safe_primes_concurrent, GermainSafePrime,
    SafePrimeError,
};
use crate::crypto::paillier::{self, PaillierError};
use crate::tss::error::ErrorKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreParamsError {
    #[error("pre-parameter generation timed out")]
    Timeout,
    #[error(transparent)]
    SafePrime(SafePrimeError),
    #[error(transparent)]
    Paillier(#[from] PaillierError),
}

impl From<SafePrimeError> for PreParamsError {
    fn from(err: SafePrimeError) -> Self {
        match err {
            SafePrimeError::GeneratorCancelled => PreParamsError::Timeout,
            other => PreParamsError::SafePrime(other),
        }
    }
}

impl From<PreParamsError> for ErrorKind {
    fn from(err: PreParamsError) -> Self {
        match err {
            PreParamsError::Timeout => ErrorKind::ProtocolTimeout,
            other => ErrorKind::Crypto(other.to_string()),
        }
    }
}

/// The Paillier key and ring-Pedersen parameters a party brings to key
/// generation. Expensive to produce, so callers usually generate them ahead
/// of time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPreParams {
    pub paillier_sk: paillier::PrivateKey,
    pub n_tilde_i: BigInt,
    pub h1i: BigInt,
    pub h2i: BigInt,
    // secrets behind the DLN proofs; absent in data saved by older versions
    #[serde(default)]
    pub alpha: BigInt,
    #[serde(default)]
    pub beta: BigInt,
    #[serde(default)]
    pub p: BigInt,
    #[serde(default)]
    pub q: BigInt,
}

impl LocalPreParams {
    /// Generates pre-parameters on the calling thread.
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(
        modulus_bits: usize,
        rng: &mut R,
    ) -> Result<Self, PreParamsError> {
        let start = Instant::now();
        let (paillier_sk, _) = paillier::generate_key_pair(rng, modulus_bits)?;
        let sgp1 = generate_safe_prime(modulus_bits / 2, rng)?;
        let mut sgp2 = generate_safe_prime(modulus_bits / 2, rng)?;
        while sgp2.safe_prime() == sgp1.safe_prime() {
            sgp2 = generate_safe_prime(modulus_bits / 2, rng)?;
        }
        let pre = Self::from_safe_primes(paillier_sk, &sgp1, &sgp2, rng);
        info!(target: "tss-lib", "generated {}-bit pre-parameters in {:?}", modulus_bits, start.elapsed());
        Ok(pre)
    }

    /// Searches for the four safe primes on `concurrency` blocking workers.
    /// Fails with `Timeout` once `timeout` elapses.
    pub async fn generate_pre_params(
        timeout: Duration,
        concurrency: usize,
        modulus_bits: usize,
    ) -> Result<Self, PreParamsError> {
        let start = Instant::now();
        info!(target: "tss-lib", "generating {}-bit local pre-params...", modulus_bits);
        let sgps = get_random_safe_primes_concurrent(modulus_bits / 2, 4, concurrency, timeout).await?;
        let pre = Self::from_four_safe_primes(sgps, &mut OsRng)?;
        info!(target: "tss-lib", "pre-params generated in {:?}", start.elapsed());
        Ok(pre)
    }

    /// Like `generate_pre_params`, but blocks the calling thread. Used when a
    /// session starts without pre-params.
    pub fn generate_blocking<R: RngCore + CryptoRng + ?Sized>(
        timeout: Duration,
        concurrency: usize,
        modulus_bits: usize,
        rng: &mut R,
    ) -> Result<Self, PreParamsError> {
        let start = Instant::now();
        info!(target: "tss-lib", "generating {}-bit local pre-params...", modulus_bits);
        let sgps = get_random_safe_primes_blocking(modulus_bits / 2, 4, concurrency, timeout)?;
        let pre = Self::from_four_safe_primes(sgps, rng)?;
        info!(target: "tss-lib", "pre-params generated in {:?}", start.elapsed());
        Ok(pre)
    }

    // The first pair becomes the Paillier key, the second NTilde.
    fn from_four_safe_primes<R: RngCore + CryptoRng + ?Sized>(
        mut sgps: Vec<GermainSafePrime>,
        rng: &mut R,
    ) -> Result<Self, PreParamsError> {
        let (ntilde_1, ntilde_2) = match (sgps.pop(), sgps.pop()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(SafePrimeError::WorkersExited.into()),
        };
        let (pai_1, pai_2) = match (sgps.pop(), sgps.pop()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(SafePrimeError::WorkersExited.into()),
        };
        let paillier_sk =
            paillier::PrivateKey::from_primes(pai_1.safe_prime().clone(), pai_2.safe_prime().clone())?;
        Ok(Self::from_safe_primes(paillier_sk, &ntilde_1, &ntilde_2, rng))
    }

    // NTilde = P*Q, h1 = f^2, h2 = h1^alpha and beta = alpha^-1 mod p*q,
    // where p and q are the Sophie Germain primes of P and Q.
    fn from_safe_primes<R: RngCore + CryptoRng + ?Sized>(
        paillier_sk: paillier::PrivateKey,
        sgp1: &GermainSafePrime,
        sgp2: &GermainSafePrime,
        rng: &mut R,
    ) -> Self {
        let n_tilde_i = sgp1.safe_prime() * sgp2.safe_prime();
        let p = sgp1.prime().clone();
        let q = sgp2.prime().clone();
        let mod_n_tilde = ModInt::new(n_tilde_i.clone());
        let mod_pq = ModInt::new(&p * &q);

        let f1 = get_random_positive_relatively_prime_int(rng, &n_tilde_i);
        let (alpha, beta) = loop {
            let alpha = get_random_positive_relatively_prime_int(rng, &n_tilde_i);
            if let Some(beta) = mod_pq.mod_inverse(&alpha) {
                break (alpha, beta);
            }
        };
        let h1i = mod_n_tilde.mul(&f1, &f1);
        let h2i = mod_n_tilde.exp(&h1i, &alpha);
        LocalPreParams {
            paillier_sk,
            n_tilde_i,
            h1i,
            h2i,
            alpha,
            beta,
            p,
            q,
        }
    }

    pub fn validate(&self) -> bool {
        let pk = &self.paillier_sk.public_key;
        pk.n.is_positive()
            && pk.n == &self.paillier_sk.p * &self.paillier_sk.q
            && self.n_tilde_i.is_positive()
            && self.h1i.is_positive()
            && self.h2i.is_positive()
            && self.h1i != self.h2i
    }

    /// `validate` plus the DLN secrets needed to prove h1 and h2.
    pub fn validate_with_proof(&self) -> bool {
        let safe = |x: &BigInt| (x << 1) + BigInt::one();
        self.validate()
            && self.alpha.is_positive()
            && self.beta.is_positive()
            && self.p.is_positive()
            && self.q.is_positive()
            && self.n_tilde_i == safe(&self.p) * safe(&self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_pre_params_relations() {
        let mut rng = StdRng::seed_from_u64(31);
        let pre = LocalPreParams::generate(256, &mut rng).unwrap();
        assert!(pre.validate());
        assert!(pre.validate_with_proof());
        let m = ModInt::new(pre.n_tilde_i.clone());
        // h2 = h1^alpha and h1 = h2^beta
        assert_eq!(m.exp(&pre.h1i, &pre.alpha), pre.h2i);
        assert_eq!(m.exp(&pre.h2i, &pre.beta), pre.h1i);
    }

    #[test]
    fn test_validate_with_proof_needs_secrets() {
        let mut rng = StdRng::seed_from_u64(32);
        let mut pre = LocalPreParams::generate(256, &mut rng).unwrap();
        pre.alpha = BigInt::from(0);
        assert!(pre.validate());
        assert!(!pre.validate_with_proof());
        pre.h2i = pre.h1i.clone();
        assert!(!pre.validate());
    }

    #[test]
    fn test_pre_params_survive_older_json() {
        let mut rng = StdRng::seed_from_u64(33);
        let pre = LocalPreParams::generate(256, &mut rng).unwrap();
        let mut json = serde_json::to_value(&pre).unwrap();
        let obj = json.as_object_mut().unwrap();
        for k in ["alpha", "beta", "p", "q"] {
            obj.remove(k);
        }
        let old: LocalPreParams = serde_json::from_value(json).unwrap();
        assert!(old.validate());
        assert!(!old.validate_with_proof());
    }

    #[tokio::test]
    async fn test_async_generation() {
        let pre = LocalPreParams::generate_pre_params(Duration::from_secs(120), 2, 256)
            .await
            .unwrap();
        assert!(pre.validate_with_proof());
    }

    #[tokio::test]
    async fn test_async_generation_times_out() {
        let res = LocalPreParams::generate_pre_params(Duration::from_millis(1), 1, 2048).await;
        assert_eq!(res, Err(PreParamsError::Timeout));
        assert_eq!(ErrorKind::from(PreParamsError::Timeout), ErrorKind::ProtocolTimeout);
    }

    #[test]
    fn test_blocking_generation_honours_timeout() {
        let mut rng = StdRng::seed_from_u64(34);
        let pre = LocalPreParams::generate_blocking(Duration::from_secs(120), 2, 256, &mut rng).unwrap();
        assert!(pre.validate_with_proof());
        assert_eq!(pre.paillier_sk.public_key.n.bits(), 256);
        assert_eq!(pre.n_tilde_i.bits(), 256);

        let res = LocalPreParams::generate_blocking(Duration::from_nanos(1), 1, 2048, &mut rng);
        assert_eq!(res, Err(PreParamsError::Timeout));
    }
}
