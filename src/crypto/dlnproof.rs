// Copyright © 2019-2020 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Zero-knowledge proof of knowledge of the discrete logarithm over safe prime product

// A proof of knowledge of the discrete log of an element h2 = h1^x with respect to h1.
// In our protocol, we will run two of these in parallel to prove that two elements h1,h2 generate the same group modN.

use num_bigint::BigInt;
use num_traits::{One, Signed};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::commitments::{parse_secrets, CommitmentBuilder};
use super::ProofError;
use crate::common::hash::sha512_256i;
use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;
use crate::common::slice::{bigints_to_bytes, multi_bytes_to_bigints};

pub const ITERATIONS: usize = 128;
// one challenge bit per iteration
const MAX_ITERATIONS: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub alpha: Vec<BigInt>,
    pub t: Vec<BigInt>,
}

fn challenge(h1: &BigInt, h2: &BigInt, n: &BigInt, alpha: &[BigInt]) -> Option<BigInt> {
    let mut msg: Vec<&BigInt> = vec![h1, h2, n];
    msg.extend(alpha.iter());
    sha512_256i(&msg)
}

// 1 < v mod N < N
fn in_range(v: &BigInt, n: &BigInt) -> bool {
    let v = ModInt::new(n.clone()).reduce(v);
    v > BigInt::one() && &v < n
}

impl Proof {
    /// Proves knowledge of `x` with `h2 = h1^x mod N`, where `p` and `q` are
    /// the Sophie Germain primes of N's safe prime factors.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: RngCore + CryptoRng + ?Sized>(
        h1: &BigInt,
        h2: &BigInt,
        x: &BigInt,
        p: &BigInt,
        q: &BigInt,
        n: &BigInt,
        iterations: usize,
        rng: &mut R,
    ) -> Result<Self, ProofError> {
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(ProofError::InvalidParameters("dln iterations"));
        }
        let p_mul_q = p * q;
        let mod_n = ModInt::new(n.clone());
        let mod_pq = ModInt::new(p_mul_q.clone());

        let a: Vec<BigInt> = (0..iterations).map(|_| get_random_positive_int(rng, &p_mul_q)).collect();
        let alpha: Vec<BigInt> = a.iter().map(|ai| mod_n.exp(h1, ai)).collect();
        let c = challenge(h1, h2, n, &alpha).ok_or(ProofError::InvalidParameters("dln challenge"))?;
        let t = a
            .iter()
            .enumerate()
            .map(|(i, ai)| {
                if c.bit(i as u64) {
                    mod_pq.add(ai, x)
                } else {
                    mod_pq.reduce(ai)
                }
            })
            .collect();
        Ok(Proof { alpha, t })
    }

    pub fn verify(&self, h1: &BigInt, h2: &BigInt, n: &BigInt, iterations: usize) -> bool {
        if !n.is_positive() || iterations > MAX_ITERATIONS {
            return false;
        }
        if self.alpha.len() != iterations || self.t.len() != iterations {
            return false;
        }
        if !in_range(h1, n) || !in_range(h2, n) {
            return false;
        }
        let mod_n = ModInt::new(n.clone());
        if mod_n.reduce(h1) == mod_n.reduce(h2) {
            return false;
        }
        if !self.t.iter().chain(self.alpha.iter()).all(|v| in_range(v, n)) {
            return false;
        }
        let c = match challenge(h1, h2, n, &self.alpha) {
            Some(c) => c,
            None => return false,
        };
        self.alpha.iter().zip(self.t.iter()).enumerate().all(|(i, (alpha_i, t_i))| {
            let h1_exp_ti = mod_n.exp(h1, t_i);
            let rhs = if c.bit(i as u64) {
                mod_n.mul(alpha_i, h2)
            } else {
                mod_n.reduce(alpha_i)
            };
            h1_exp_ti == rhs
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<Vec<u8>>, ProofError> {
        let secrets = CommitmentBuilder::new().add_part(&self.alpha).add_part(&self.t).secrets()?;
        Ok(bigints_to_bytes(&secrets))
    }

    pub fn from_bytes(bzs: &[Vec<u8>], iterations: usize) -> Result<Self, ProofError> {
        let mut parts = parse_secrets(&multi_bytes_to_bigints(bzs))?;
        if parts.len() != 2 {
            return Err(ProofError::Malformed(format!("dln proof has {} parts, expected 2", parts.len())));
        }
        let t = parts.pop().unwrap_or_default();
        let alpha = parts.pop().unwrap_or_default();
        if alpha.len() != iterations || t.len() != iterations {
            return Err(ProofError::Malformed(format!(
                "dln proof has {}/{} values, expected {}",
                alpha.len(),
                t.len(),
                iterations
            )));
        }
        Ok(Proof { alpha, t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::safe_prime::generate_safe_prime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Setup {
        n: BigInt,
        h1: BigInt,
        h2: BigInt,
        x: BigInt,
        p: BigInt,
        q: BigInt,
    }

    fn setup(rng: &mut StdRng) -> Setup {
        let sp = generate_safe_prime(128, rng).unwrap();
        let sq = generate_safe_prime(128, rng).unwrap();
        let n = sp.safe_prime() * sq.safe_prime();
        let (p, q) = (sp.prime().clone(), sq.prime().clone());
        let mod_n = ModInt::new(n.clone());
        let f = get_random_positive_int(rng, &n);
        let h1 = mod_n.mul(&f, &f);
        let x = get_random_positive_int(rng, &(&p * &q));
        let h2 = mod_n.exp(&h1, &x);
        Setup { n, h1, h2, x, p, q }
    }

    #[test]
    fn test_dln_proof_verify() {
        let mut rng = StdRng::seed_from_u64(41);
        let s = setup(&mut rng);
        let proof = Proof::new(&s.h1, &s.h2, &s.x, &s.p, &s.q, &s.n, ITERATIONS, &mut rng).unwrap();
        assert!(proof.verify(&s.h1, &s.h2, &s.n, ITERATIONS));

        assert!(!proof.verify(&s.h2, &s.h1, &s.n, ITERATIONS));
        assert!(!proof.verify(&s.h1, &(&s.h2 + 1), &s.n, ITERATIONS));
        assert!(!proof.verify(&s.h1, &s.h2, &s.n, ITERATIONS - 1));

        let mut tampered = proof.clone();
        tampered.t[3] += 1;
        assert!(!tampered.verify(&s.h1, &s.h2, &s.n, ITERATIONS));
    }

    #[test]
    fn test_dln_proof_bytes() {
        let mut rng = StdRng::seed_from_u64(42);
        let s = setup(&mut rng);
        let proof = Proof::new(&s.h1, &s.h2, &s.x, &s.p, &s.q, &s.n, 16, &mut rng).unwrap();
        let bzs = proof.to_bytes().unwrap();
        assert_eq!(bzs.len(), 2 + 2 * 16);
        let restored = Proof::from_bytes(&bzs, 16).unwrap();
        assert!(restored.verify(&s.h1, &s.h2, &s.n, 16));
        assert!(matches!(Proof::from_bytes(&bzs, 17), Err(ProofError::Malformed(_))));
    }

    #[test]
    fn test_dln_rejects_bad_iterations() {
        let mut rng = StdRng::seed_from_u64(43);
        let s = setup(&mut rng);
        assert!(Proof::new(&s.h1, &s.h2, &s.x, &s.p, &s.q, &s.n, 300, &mut rng).is_err());
    }
}
