// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Feldman VSS, based on Paul Feldman, 1987., A practical scheme for non-interactive verifiable secret sharing.
// In Foundations of Computer Science, 1987., 28th Annual Symposium on. IEEE, 427–43

use std::collections::HashSet;

use num_bigint::BigInt;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;
use crate::crypto::ecpoint::{ECPoint, PointError};
use crate::tss::curve::CurveName;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VssError {
    #[error("not enough shares to satisfy the threshold (required {required}, have {have})")]
    NumSharesBelowThreshold { required: usize, have: usize },
    #[error("threshold must be at least 1")]
    ThresholdTooSmall,
    #[error("party index {0} is duplicated")]
    DuplicateIndex(BigInt),
    #[error("party index is zero mod the group order")]
    IndexIsZero,
    #[error(transparent)]
    Point(#[from] PointError),
}

/// Share of party `id`: the sharing polynomial evaluated at `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub threshold: usize,
    pub id: BigInt,
    pub share: BigInt,
}

/// Commitments `[a0*G, a1*G, ..., at*G]` to the polynomial coefficients.
pub type Vs = Vec<ECPoint>;

/// Rejects an index set containing zero or duplicates modulo the group order.
pub fn check_indexes(curve: CurveName, indexes: &[BigInt]) -> Result<Vec<BigInt>, VssError> {
    let q = ModInt::new(curve.order().clone());
    let mut visited = HashSet::with_capacity(indexes.len());
    let mut reduced = Vec::with_capacity(indexes.len());
    for index in indexes {
        let v = q.reduce(index);
        if v.is_zero() {
            return Err(VssError::IndexIsZero);
        }
        if !visited.insert(v.clone()) {
            return Err(VssError::DuplicateIndex(v));
        }
        reduced.push(v);
    }
    Ok(reduced)
}

/// Shares `secret` among `indexes` with a random polynomial of degree
/// `threshold`.
pub fn create<R: RngCore + CryptoRng + ?Sized>(
    curve: CurveName,
    threshold: usize,
    secret: &BigInt,
    indexes: &[BigInt],
    rng: &mut R,
) -> Result<(Vs, Vec<Share>), VssError> {
    if threshold < 1 {
        return Err(VssError::ThresholdTooSmall);
    }
    if indexes.len() < threshold + 1 {
        return Err(VssError::NumSharesBelowThreshold {
            required: threshold + 1,
            have: indexes.len(),
        });
    }
    let ids = check_indexes(curve, indexes)?;

    let poly = sample_polynomial(curve, threshold, secret, rng);
    let vs: Vs = poly.iter().map(|ai| ECPoint::scalar_base_mult(curve, ai)).collect();
    let shares = ids
        .into_iter()
        .map(|id| Share {
            threshold,
            share: evaluate_polynomial(curve, &poly, &id),
            id,
        })
        .collect();
    Ok((vs, shares))
}

impl Share {
    /// Checks `share*G == sum_j vs[j] * id^j`.
    pub fn verify(&self, curve: CurveName, threshold: usize, vs: &[ECPoint]) -> bool {
        if self.threshold != threshold || vs.len() != threshold + 1 {
            return false;
        }
        if vs.iter().any(|v| v.curve() != curve) {
            return false;
        }
        let q = ModInt::new(curve.order().clone());
        let mut acc = vs[0].clone();
        let mut t = BigInt::one();
        for v in &vs[1..] {
            t = q.mul(&t, &self.id);
            acc = match acc.add(&v.scalar_mul(&t)) {
                Ok(sum) => sum,
                Err(_) => return false,
            };
        }
        ECPoint::scalar_base_mult(curve, &self.share) == acc
    }
}

/// Lagrange interpolation at zero over the first `threshold + 1` shares.
pub fn reconstruct_secret(curve: CurveName, shares: &[Share]) -> Result<BigInt, VssError> {
    let threshold = match shares.first() {
        Some(s) => s.threshold,
        None => return Err(VssError::NumSharesBelowThreshold { required: 1, have: 0 }),
    };
    if shares.len() <= threshold {
        return Err(VssError::NumSharesBelowThreshold {
            required: threshold + 1,
            have: shares.len(),
        });
    }
    let shares = &shares[..=threshold];
    let ids: Vec<BigInt> = shares.iter().map(|s| s.id.clone()).collect();
    check_indexes(curve, &ids)?;

    let q = ModInt::new(curve.order().clone());
    let mut secret = BigInt::zero();
    for (i, share) in shares.iter().enumerate() {
        let mut basis = BigInt::one();
        for (j, other) in shares.iter().enumerate() {
            if i == j {
                continue;
            }
            // ids are distinct mod q, so the difference is invertible
            let den = q.sub(&other.id, &share.id);
            let term = q.div(&other.id, &den).ok_or(VssError::IndexIsZero)?;
            basis = q.mul(&basis, &term);
        }
        secret = q.add(&secret, &q.mul(&share.share, &basis));
    }
    Ok(secret)
}

fn sample_polynomial<R: RngCore + CryptoRng + ?Sized>(
    curve: CurveName,
    threshold: usize,
    secret: &BigInt,
    rng: &mut R,
) -> Vec<BigInt> {
    let q = curve.order();
    let mut poly = Vec::with_capacity(threshold + 1);
    poly.push(ModInt::new(q.clone()).reduce(secret));
    for _ in 0..threshold {
        poly.push(get_random_positive_int(rng, q));
    }
    poly
}

// Horner's rule.
fn evaluate_polynomial(curve: CurveName, poly: &[BigInt], id: &BigInt) -> BigInt {
    let q = ModInt::new(curve.order().clone());
    poly.iter()
        .rev()
        .fold(BigInt::zero(), |acc, ai| q.add(&q.mul(&acc, id), ai))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CURVES: [CurveName; 3] = [CurveName::Secp256k1, CurveName::P256, CurveName::Ed25519];

    fn indexes(n: u64) -> Vec<BigInt> {
        (1..=n).map(BigInt::from).collect()
    }

    #[test]
    fn test_create_verify_reconstruct() {
        let mut rng = StdRng::seed_from_u64(21);
        for curve in CURVES {
            let secret = get_random_positive_int(&mut rng, curve.order());
            let (vs, shares) = create(curve, 2, &secret, &indexes(5), &mut rng).unwrap();
            assert_eq!(vs.len(), 3);
            assert_eq!(vs[0], ECPoint::scalar_base_mult(curve, &secret));
            assert!(shares.iter().all(|s| s.verify(curve, 2, &vs)));

            assert_eq!(reconstruct_secret(curve, &shares[..3]).unwrap(), secret);
            assert_eq!(reconstruct_secret(curve, &shares[2..]).unwrap(), secret);
            assert_eq!(
                reconstruct_secret(curve, &shares[..2]),
                Err(VssError::NumSharesBelowThreshold { required: 3, have: 2 })
            );
        }
    }

    #[test]
    fn test_tampered_share_fails() {
        let mut rng = StdRng::seed_from_u64(22);
        let curve = CurveName::Secp256k1;
        let (vs, mut shares) = create(curve, 1, &BigInt::from(999), &indexes(3), &mut rng).unwrap();
        shares[0].share += BigInt::one();
        assert!(!shares[0].verify(curve, 1, &vs));
        assert!(shares[1].verify(curve, 1, &vs));
        // wrong threshold
        assert!(!shares[1].verify(curve, 2, &vs));
    }

    #[test]
    fn test_wrong_commitments_fail() {
        let mut rng = StdRng::seed_from_u64(23);
        let curve = CurveName::Ed25519;
        let (vs1, shares1) = create(curve, 1, &BigInt::from(888), &indexes(2), &mut rng).unwrap();
        let (vs2, _) = create(curve, 1, &BigInt::from(777), &indexes(2), &mut rng).unwrap();
        assert!(shares1[0].verify(curve, 1, &vs1));
        assert!(!shares1[0].verify(curve, 1, &vs2));
    }

    #[test]
    fn test_check_indexes() {
        let curve = CurveName::Secp256k1;
        assert!(check_indexes(curve, &indexes(2)).is_ok());
        assert_eq!(
            check_indexes(curve, &[BigInt::one(), BigInt::zero()]),
            Err(VssError::IndexIsZero)
        );
        let wrapped = curve.order() + BigInt::one();
        assert_eq!(
            check_indexes(curve, &[BigInt::one(), wrapped]),
            Err(VssError::DuplicateIndex(BigInt::one()))
        );
    }

    #[test]
    fn test_create_errors() {
        let mut rng = StdRng::seed_from_u64(24);
        let curve = CurveName::Secp256k1;
        let secret = BigInt::one();
        assert_eq!(
            create(curve, 0, &secret, &indexes(2), &mut rng).err(),
            Some(VssError::ThresholdTooSmall)
        );
        assert_eq!(
            create(curve, 2, &secret, &indexes(2), &mut rng).err(),
            Some(VssError::NumSharesBelowThreshold { required: 3, have: 2 })
        );
    }
}
