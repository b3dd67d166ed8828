// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Paillier-Blum modulus proof, CGGMP20 Fig 16.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ProofError;
use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::{is_quadratic_residue, jacobi, ModInt};
use crate::common::random::get_random_quadratic_non_residue;
use crate::common::safe_prime::probably_prime;
use crate::common::slice::{bigints_to_bytes, multi_bytes_to_bigints, non_empty_multi_bytes};

pub const ITERATIONS: usize = 80;

/// `a` and `b` hold one bit per iteration plus a top marker bit at
/// position `iterations`, which fixes their bit length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMod {
    pub w: BigInt,
    pub x: Vec<BigInt>,
    pub a: BigInt,
    pub b: BigInt,
    pub z: Vec<BigInt>,
}

fn derive_ys(session: &[u8], w: &BigInt, n: &BigInt, iterations: usize) -> Option<Vec<BigInt>> {
    let mut ys: Vec<BigInt> = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let mut msg = vec![w, n];
        msg.extend(ys.iter());
        let ei = sha512_256i_tagged(session, &msg)?;
        ys.push(rejection_sample(n, &ei));
    }
    Some(ys)
}

// (-1)^a * w^b * y mod N
fn twist(m: &ModInt, y: &BigInt, w: &BigInt, a: bool, b: bool) -> BigInt {
    let mut v = m.reduce(y);
    if a {
        v = m.mul(&BigInt::from(-1), &v);
    }
    if b {
        v = m.mul(w, &v);
    }
    v
}

// 0 < v < N
fn in_open_range(v: &BigInt, n: &BigInt) -> bool {
    v.is_positive() && v < n
}

impl ProofMod {
    /// `n = p * q` must be a Blum integer.
    pub fn new<R: RngCore + CryptoRng + ?Sized>(
        session: &[u8],
        n: &BigInt,
        p: &BigInt,
        q: &BigInt,
        iterations: usize,
        rng: &mut R,
    ) -> Result<Self, ProofError> {
        if iterations == 0 {
            return Err(ProofError::InvalidParameters("mod iterations"));
        }
        let phi = (p - BigInt::one()) * (q - BigInt::one());
        // Fig 16.1
        let w = get_random_quadratic_non_residue(rng, n);
        // Fig 16.2
        let ys = derive_ys(session, &w, n, iterations).ok_or(ProofError::InvalidParameters("mod challenge"))?;

        // Fig 16.3
        let mod_n = ModInt::new(n.clone());
        let mod_phi = ModInt::new(phi.clone());
        let inv_n = mod_phi.mod_inverse(n).ok_or(ProofError::InvalidParameters("N not invertible mod phi"))?;
        // fourth root exponent ((phi + 4) / 8)^2 mod phi
        let expo = (&phi + BigInt::from(4)) >> 3;
        let expo = mod_phi.mul(&expo, &expo);

        let mut a = BigInt::one() << iterations;
        let mut b = BigInt::one() << iterations;
        let mut xs = Vec::with_capacity(iterations);
        let mut zs = Vec::with_capacity(iterations);
        for (i, yi) in ys.iter().enumerate() {
            let found = [(false, false), (true, false), (false, true), (true, true)]
                .into_iter()
                .find(|&(ai, bi)| {
                    let v = twist(&mod_n, yi, &w, ai, bi);
                    is_quadratic_residue(&v, p) && is_quadratic_residue(&v, q)
                });
            let (ai, bi) = found.ok_or(ProofError::InvalidParameters("no fourth root for challenge"))?;
            xs.push(mod_n.exp(&twist(&mod_n, yi, &w, ai, bi), &expo));
            zs.push(mod_n.exp(yi, &inv_n));
            a.set_bit(i as u64, ai);
            b.set_bit(i as u64, bi);
        }
        Ok(ProofMod { w, x: xs, a, b, z: zs })
    }

    pub fn verify(&self, session: &[u8], n: &BigInt, iterations: usize) -> bool {
        if !n.is_positive() || self.x.len() != iterations || self.z.len() != iterations {
            return false;
        }
        if jacobi(&self.w, n) != -1 || !in_open_range(&self.w, n) {
            return false;
        }
        if !self.x.iter().chain(self.z.iter()).all(|v| in_open_range(v, n)) {
            return false;
        }
        let bit_len = iterations as u64 + 1;
        if self.a.is_negative() || self.b.is_negative() || self.a.bits() != bit_len || self.b.bits() != bit_len {
            return false;
        }
        if n.is_even() || probably_prime(n) {
            return false;
        }
        let ys = match derive_ys(session, &self.w, n, iterations) {
            Some(ys) => ys,
            None => return false,
        };
        let mod_n = ModInt::new(n.clone());
        let four = BigInt::from(4);
        ys.iter().enumerate().all(|(i, yi)| {
            if mod_n.exp(&self.z[i], n) != *yi {
                return false;
            }
            let right = twist(&mod_n, yi, &self.w, self.a.bit(i as u64), self.b.bit(i as u64));
            mod_n.exp(&self.x[i], &four) == right
        })
    }

    /// `[w, x..., a, b, z...]`
    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        let mut ints = Vec::with_capacity(self.x.len() + self.z.len() + 3);
        ints.push(self.w.clone());
        ints.extend(self.x.iter().cloned());
        ints.push(self.a.clone());
        ints.push(self.b.clone());
        ints.extend(self.z.iter().cloned());
        bigints_to_bytes(&ints)
    }

    pub fn from_bytes(bzs: &[Vec<u8>], iterations: usize) -> Result<Self, ProofError> {
        let expected = 2 * iterations + 3;
        if !non_empty_multi_bytes(bzs, Some(expected)) {
            return Err(ProofError::Malformed(format!(
                "mod proof needs {} non-empty parts, got {}",
                expected,
                bzs.len()
            )));
        }
        let ints = multi_bytes_to_bigints(bzs);
        let (w, rest) = ints.split_at(1);
        let (x, rest) = rest.split_at(iterations);
        let (ab, z) = rest.split_at(2);
        Ok(ProofMod {
            w: w[0].clone(),
            x: x.to_vec(),
            a: ab[0].clone(),
            b: ab[1].clone(),
            z: z.to_vec(),
        })
    }
}
