// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// No small factor proof, CGGMP20 Fig 28. Binds a Paillier modulus N0 to the
// verifier's ring-Pedersen parameters (N^, s, t).

use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{One, Signed};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ProofError;
use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::{is_in_interval, is_number_in_multiplicative_group, ModInt};
use crate::common::random::get_random_positive_int;
use crate::common::slice::{bigints_to_bytes, multi_bytes_to_bigints, non_empty_multi_bytes};

pub const PROOF_FAC_BYTES_PARTS: usize = 11;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofFac {
    pub p: BigInt,
    pub q: BigInt,
    pub a: BigInt,
    pub b: BigInt,
    pub t: BigInt,
    pub sigma: BigInt,
    pub z1: BigInt,
    pub z2: BigInt,
    pub w1: BigInt,
    pub w2: BigInt,
    pub v: BigInt,
}

impl ProofFac {
    /// `q` is the curve group order, `(n_cap, s, t)` are the verifier's
    /// ring-Pedersen parameters and `n0 = n0_p * n0_q` is the prover's
    /// Paillier modulus.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: RngCore + CryptoRng + ?Sized>(
        session: &[u8],
        q: &BigInt,
        n0: &BigInt,
        n_cap: &BigInt,
        s: &BigInt,
        t: &BigInt,
        n0_p: &BigInt,
        n0_q: &BigInt,
        rng: &mut R,
    ) -> Result<Self, ProofError> {
        if !n0.is_positive() || !n_cap.is_positive() || !s.is_positive() || !t.is_positive() {
            return Err(ProofError::InvalidParameters("fac moduli and bases must be positive"));
        }
        if n0 != &(n0_p * n0_q) {
            return Err(ProofError::InvalidParameters("fac factors do not match the modulus"));
        }
        let q3 = q * q * q;
        let q_n_cap = q * n_cap;
        let q_n0_n_cap = &q_n_cap * n0;
        let q3_n_cap = &q3 * n_cap;
        let q3_n0_n_cap = &q3_n_cap * n0;
        let q3_sqrt_n0 = &q3 * n0.sqrt();

        // Fig 28.1 sample
        let alpha = get_random_positive_int(rng, &q3_sqrt_n0);
        let beta = get_random_positive_int(rng, &q3_sqrt_n0);
        let mu = get_random_positive_int(rng, &q_n_cap);
        let nu = get_random_positive_int(rng, &q_n_cap);
        let sigma = get_random_positive_int(rng, &q_n0_n_cap);
        let r = get_random_positive_int(rng, &q3_n0_n_cap);
        let x = get_random_positive_int(rng, &q3_n_cap);
        let y = get_random_positive_int(rng, &q3_n_cap);

        // Fig 28.1 commit
        let m = ModInt::new(n_cap.clone());
        let pedersen = |a: &BigInt, b: &BigInt| m.mul(&m.exp(s, a), &m.exp(t, b));
        let p_cap = pedersen(n0_p, &mu);
        let q_cap = pedersen(n0_q, &nu);
        let a_cap = pedersen(&alpha, &x);
        let b_cap = pedersen(&beta, &y);
        let t_cap = m.mul(&m.exp(&q_cap, &alpha), &m.exp(t, &r));

        // Fig 28.2 challenge
        let e = challenge(session, q, n0, n_cap, s, t, [&p_cap, &q_cap, &a_cap, &b_cap, &t_cap, &sigma])?;

        // Fig 28.3 respond
        let z1 = &alpha + &e * n0_p;
        let z2 = &beta + &e * n0_q;
        let w1 = &x + &e * &mu;
        let w2 = &y + &e * &nu;
        let v = &r + &e * (&sigma - &nu * n0_p);

        Ok(ProofFac {
            p: p_cap,
            q: q_cap,
            a: a_cap,
            b: b_cap,
            t: t_cap,
            sigma,
            z1,
            z2,
            w1,
            w2,
            v,
        })
    }

    pub fn verify(&self, session: &[u8], q: &BigInt, n0: &BigInt, n_cap: &BigInt, s: &BigInt, t: &BigInt) -> bool {
        if !n0.is_positive() || !n_cap.is_positive() {
            return false;
        }
        let q3 = q * q * q;
        let bound = (&q3 * n0.sqrt()) << 1;
        if !is_in_interval(&self.z1, &bound) || !is_in_interval(&self.z2, &bound) {
            return false;
        }
        let commitments = [&self.p, &self.q, &self.a, &self.b, &self.t];
        if !commitments.iter().all(|c| is_number_in_multiplicative_group(n_cap, c)) {
            return false;
        }

        let e = match challenge(session, q, n0, n_cap, s, t, [&self.p, &self.q, &self.a, &self.b, &self.t, &self.sigma]) {
            Ok(e) => e,
            Err(_) => return false,
        };

        let m = ModInt::new(n_cap.clone());
        let pedersen = |a: &BigInt, b: &BigInt| m.mul(&m.exp(s, a), &m.exp(t, b));

        // s^z1 t^w1 == A P^e
        if pedersen(&self.z1, &self.w1) != m.mul(&self.a, &m.exp(&self.p, &e)) {
            return false;
        }
        // s^z2 t^w2 == B Q^e
        if pedersen(&self.z2, &self.w2) != m.mul(&self.b, &m.exp(&self.q, &e)) {
            return false;
        }
        // Q^z1 t^v == T R^e, R = s^N0 t^sigma
        let r = pedersen(n0, &self.sigma);
        let lhs = m.mul(&m.exp(&self.q, &self.z1), &m.exp(t, &self.v));
        lhs == m.mul(&self.t, &m.exp(&r, &e))
    }

    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        bigints_to_bytes(&[
            self.p.clone(),
            self.q.clone(),
            self.a.clone(),
            self.b.clone(),
            self.t.clone(),
            self.sigma.clone(),
            self.z1.clone(),
            self.z2.clone(),
            self.w1.clone(),
            self.w2.clone(),
            self.v.clone(),
        ])
    }

    pub fn from_bytes(bzs: &[Vec<u8>]) -> Result<Self, ProofError> {
        if !non_empty_multi_bytes(bzs, Some(PROOF_FAC_BYTES_PARTS)) {
            return Err(ProofError::Malformed(format!(
                "fac proof needs {} non-empty parts, got {}",
                PROOF_FAC_BYTES_PARTS,
                bzs.len()
            )));
        }
        let mut ints = multi_bytes_to_bigints(bzs).into_iter();
        let mut next = || ints.next().unwrap_or_else(BigInt::one);
        Ok(ProofFac {
            p: next(),
            q: next(),
            a: next(),
            b: next(),
            t: next(),
            sigma: next(),
            z1: next(),
            z2: next(),
            w1: next(),
            w2: next(),
            v: next(),
        })
    }
}

fn challenge(
    session: &[u8],
    q: &BigInt,
    n0: &BigInt,
    n_cap: &BigInt,
    s: &BigInt,
    t: &BigInt,
    values: [&BigInt; 6],
) -> Result<BigInt, ProofError> {
    let mut msg = vec![n0, n_cap, s, t];
    msg.extend(values);
    let hash = sha512_256i_tagged(session, &msg).ok_or(ProofError::InvalidParameters("fac challenge"))?;
    Ok(rejection_sample(q, &hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::safe_prime::generate_safe_prime;
    use crate::tss::curve::CurveName;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Setup {
        n0: BigInt,
        p: BigInt,
        q: BigInt,
        n_cap: BigInt,
        s: BigInt,
        t: BigInt,
    }

    fn setup(rng: &mut StdRng) -> Setup {
        let p = generate_safe_prime(256, rng).unwrap().safe_prime().clone();
        let q = generate_safe_prime(256, rng).unwrap().safe_prime().clone();
        let n_cap = generate_safe_prime(256, rng).unwrap().safe_prime() * generate_safe_prime(256, rng).unwrap().safe_prime();
        let m = ModInt::new(n_cap.clone());
        let f = get_random_positive_int(rng, &n_cap);
        let t = m.mul(&f, &f);
        let lambda = get_random_positive_int(rng, &n_cap);
        let s = m.exp(&t, &lambda);
        Setup {
            n0: &p * &q,
            p,
            q,
            n_cap,
            s,
            t,
        }
    }

    #[test]
    fn test_fac_proof_verify() {
        let mut rng = StdRng::seed_from_u64(51);
        let order = CurveName::Secp256k1.order();
        let st = setup(&mut rng);
        let session = b"fac-session";
        let proof = ProofFac::new(session, order, &st.n0, &st.n_cap, &st.s, &st.t, &st.p, &st.q, &mut rng).unwrap();
        assert!(proof.verify(session, order, &st.n0, &st.n_cap, &st.s, &st.t));

        assert!(!proof.verify(b"other-session", order, &st.n0, &st.n_cap, &st.s, &st.t));
        assert!(!proof.verify(session, order, &(&st.n0 + 2), &st.n_cap, &st.s, &st.t));

        let mut tampered = proof.clone();
        tampered.w1 += 1;
        assert!(!tampered.verify(session, order, &st.n0, &st.n_cap, &st.s, &st.t));

        let restored = ProofFac::from_bytes(&proof.to_bytes()).unwrap();
        assert!(restored.verify(session, order, &st.n0, &st.n_cap, &st.s, &st.t));
    }

    #[test]
    fn test_fac_rejects_wrong_factors() {
        let mut rng = StdRng::seed_from_u64(52);
        let order = CurveName::Secp256k1.order();
        let st = setup(&mut rng);
        let res = ProofFac::new(b"s", order, &st.n0, &st.n_cap, &st.s, &st.t, &st.p, &st.p, &mut rng);
        assert!(matches!(res, Err(ProofError::InvalidParameters(_))));
    }

    #[test]
    fn test_fac_from_bytes_requires_all_parts() {
        let parts = vec![vec![1u8]; PROOF_FAC_BYTES_PARTS - 1];
        assert!(matches!(ProofFac::from_bytes(&parts), Err(ProofError::Malformed(_))));
    }
}
