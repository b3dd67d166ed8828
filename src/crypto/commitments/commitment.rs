// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Partly ported from:
// https://github.com/KZen-networks/curv/blob/78a70f43f5eda376e5888ce33aec18962f572bbe/src/cryptographic_primitives/commitments/hash_commitment.rs

use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::common::hash::sha512_256i;
use crate::common::random::must_get_random_int;
use crate::common::slice::multi_bytes_to_bigints;

const HASH_COMMITMENT_RANDOMNESS_BITS: usize = 256;

pub type HashCommitment = BigInt;
/// The blinding value `r` followed by the committed secrets.
pub type HashDeCommitment = Vec<BigInt>;

/// Hash commitment `C = H(r, m1, m2, ...)` together with its opening.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCommitDecommit {
    pub c: HashCommitment,
    pub d: HashDeCommitment,
}

impl HashCommitDecommit {
    pub fn new_with_randomness(r: BigInt, secrets: &[BigInt]) -> Self {
        let mut d = Vec::with_capacity(secrets.len() + 1);
        d.push(r);
        d.extend_from_slice(secrets);
        let refs: Vec<&BigInt> = d.iter().collect();
        // the input list is never empty, so hashing always succeeds
        let c = sha512_256i(&refs).unwrap_or_default();
        HashCommitDecommit { c, d }
    }

    pub fn new<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, secrets: &[BigInt]) -> Self {
        let r = must_get_random_int(rng, HASH_COMMITMENT_RANDOMNESS_BITS).unwrap_or_default();
        Self::new_with_randomness(r, secrets)
    }

    /// Pairs a received commitment with a received opening.
    pub fn from_parts(c: HashCommitment, d: HashDeCommitment) -> Self {
        HashCommitDecommit { c, d }
    }

    pub fn decommitment_from_bytes(marshalled: &[Vec<u8>]) -> HashDeCommitment {
        multi_bytes_to_bigints(marshalled)
    }

    pub fn verify(&self) -> bool {
        if self.d.is_empty() {
            return false;
        }
        let refs: Vec<&BigInt> = self.d.iter().collect();
        match sha512_256i(&refs) {
            Some(hash) => hash == self.c,
            None => false,
        }
    }

    /// The committed secrets, without `r`, if the opening matches.
    pub fn decommit(&self) -> Option<Vec<BigInt>> {
        if self.verify() {
            Some(self.d[1..].to_vec())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::slice::bigints_to_bytes;
    use num_traits::One;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_create_verify() {
        let mut rng = StdRng::seed_from_u64(11);
        let one = BigInt::one();
        let zero = BigInt::from(0);
        let commitment = HashCommitDecommit::new(&mut rng, &[one, zero]);
        assert!(commitment.verify());
    }

    #[test]
    fn test_decommit() {
        let mut rng = StdRng::seed_from_u64(12);
        let secrets = vec![BigInt::from(123456789u64), BigInt::parse_bytes(b"deadbeefcafebabe", 16).unwrap()];
        let commitment = HashCommitDecommit::new(&mut rng, &secrets);
        assert_eq!(commitment.decommit(), Some(secrets));

        let mut bad_c = commitment.clone();
        bad_c.c += BigInt::one();
        assert_eq!(bad_c.decommit(), None);

        let mut bad_r = commitment.clone();
        bad_r.d[0] += BigInt::one();
        assert!(!bad_r.verify());

        let mut bad_secret = commitment;
        bad_secret.d[2] += BigInt::one();
        assert!(!bad_secret.verify());
    }

    #[test]
    fn test_empty_opening_fails() {
        let commitment = HashCommitDecommit::from_parts(BigInt::from(5), vec![]);
        assert!(!commitment.verify());
    }

    #[test]
    fn test_decommitment_from_bytes() {
        let commitment = HashCommitDecommit::new_with_randomness(BigInt::from(111), &[BigInt::from(222), BigInt::from(333)]);
        let marshalled = bigints_to_bytes(&commitment.d);
        let d = HashCommitDecommit::decommitment_from_bytes(&marshalled);
        assert!(HashCommitDecommit::from_parts(commitment.c.clone(), d).verify());
    }
}
