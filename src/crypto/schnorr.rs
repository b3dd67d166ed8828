// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ecpoint::ECPoint;
use super::ProofError;
use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::{is_in_interval, ModInt};
use crate::common::random::get_random_positive_int;

/// Schnorr proof of knowledge of `x` such that `X = x*G`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    pub alpha: ECPoint,
    pub t: BigInt,
}

fn challenge(session: &[u8], x_point: &ECPoint, alpha: &ECPoint) -> Result<BigInt, ProofError> {
    let curve = x_point.curve();
    let g = curve.generator();
    let (xx, xy) = x_point.coords()?;
    let (gx, gy) = g.coords()?;
    let (ax, ay) = alpha.coords()?;
    let hash = sha512_256i_tagged(session, &[&xx, &xy, &gx, &gy, &ax, &ay])
        .ok_or(ProofError::InvalidParameters("schnorr challenge"))?;
    Ok(rejection_sample(curve.order(), &hash))
}

impl ZkProof {
    pub fn new<R: RngCore + CryptoRng + ?Sized>(
        session: &[u8],
        x: &BigInt,
        x_point: &ECPoint,
        rng: &mut R,
    ) -> Result<Self, ProofError> {
        if !x_point.validate_basic() {
            return Err(ProofError::InvalidParameters("schnorr public point"));
        }
        let curve = x_point.curve();
        let q = curve.order();
        let a = get_random_positive_int(rng, q);
        let alpha = ECPoint::scalar_base_mult(curve, &a);
        let c = challenge(session, x_point, &alpha)?;
        let t = ModInt::new(q.clone()).add(&a, &(c * x));
        Ok(ZkProof { alpha, t })
    }

    /// Checks `t*G == alpha + c*X`.
    pub fn verify(&self, session: &[u8], x_point: &ECPoint) -> bool {
        let curve = x_point.curve();
        if self.alpha.curve() != curve || !self.alpha.validate_basic() || !x_point.validate_basic() {
            return false;
        }
        if !is_in_interval(&self.t, curve.order()) {
            return false;
        }
        let c = match challenge(session, x_point, &self.alpha) {
            Ok(c) => c,
            Err(_) => return false,
        };
        let t_g = ECPoint::scalar_base_mult(curve, &self.t);
        match self.alpha.add(&x_point.scalar_mul(&c)) {
            Ok(rhs) => rhs == t_g,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::curve::CurveName;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_schnorr_proof() {
        let mut rng = StdRng::seed_from_u64(71);
        for curve in [CurveName::Secp256k1, CurveName::Ed25519] {
            let x = get_random_positive_int(&mut rng, curve.order());
            let x_point = ECPoint::scalar_base_mult(curve, &x);
            let proof = ZkProof::new(b"session", &x, &x_point, &mut rng).unwrap();
            assert!(proof.verify(b"session", &x_point));
            assert!(!proof.verify(b"another session", &x_point));

            let other = ECPoint::scalar_base_mult(curve, &(&x + 1));
            assert!(!proof.verify(b"session", &other));
        }
    }

    #[test]
    fn test_schnorr_wrong_witness() {
        let mut rng = StdRng::seed_from_u64(72);
        let curve = CurveName::Ed25519;
        let x_point = ECPoint::scalar_base_mult(curve, &BigInt::from(5));
        let proof = ZkProof::new(b"s", &BigInt::from(6), &x_point, &mut rng).unwrap();
        assert!(!proof.verify(b"s", &x_point));
    }
}
