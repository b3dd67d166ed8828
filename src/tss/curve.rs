// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;

use num_bigint::BigInt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::crypto::ecpoint::ECPoint;

fn hex_constant(s: &str) -> BigInt {
    BigInt::parse_bytes(s.as_bytes(), 16).expect("valid curve constant")
}

static SECP256K1_N: Lazy<BigInt> =
    Lazy::new(|| hex_constant("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141"));
static SECP256K1_P: Lazy<BigInt> =
    Lazy::new(|| hex_constant("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F"));
static P256_N: Lazy<BigInt> =
    Lazy::new(|| hex_constant("FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551"));
static P256_P: Lazy<BigInt> =
    Lazy::new(|| hex_constant("FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFF"));
static ED25519_L: Lazy<BigInt> =
    Lazy::new(|| hex_constant("1000000000000000000000000000000014DEF9DEA2F79CD65812631A5CF5D3ED"));
static ED25519_P: Lazy<BigInt> =
    Lazy::new(|| hex_constant("7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFED"));

/// Curves a key generation session can run over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveName {
    Secp256k1,
    P256,
    Ed25519,
}

impl CurveName {
    /// Order of the prime-order group generated by the base point.
    pub fn order(&self) -> &'static BigInt {
        match self {
            CurveName::Secp256k1 => &SECP256K1_N,
            CurveName::P256 => &P256_N,
            CurveName::Ed25519 => &ED25519_L,
        }
    }

    /// Characteristic of the base field.
    pub fn field_prime(&self) -> &'static BigInt {
        match self {
            CurveName::Secp256k1 => &SECP256K1_P,
            CurveName::P256 => &P256_P,
            CurveName::Ed25519 => &ED25519_P,
        }
    }

    pub fn generator(&self) -> ECPoint {
        ECPoint::generator(*self)
    }

    pub fn is_edwards(&self) -> bool {
        matches!(self, CurveName::Ed25519)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurveName::Secp256k1 => "secp256k1",
            CurveName::P256 => "P-256",
            CurveName::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_curve_constants() {
        assert_eq!(CurveName::Secp256k1.order().bits(), 256);
        assert_eq!(CurveName::P256.order().bits(), 256);
        assert_eq!(CurveName::Ed25519.order().bits(), 253);
        assert_eq!(
            *CurveName::Ed25519.field_prime(),
            (BigInt::one() << 255) - BigInt::from(19)
        );
    }

    #[test]
    fn test_generator_has_group_order() {
        for curve in [CurveName::Secp256k1, CurveName::P256, CurveName::Ed25519] {
            let g = curve.generator();
            let n_minus_one = curve.order() - BigInt::one();
            assert!(g.scalar_mul(&n_minus_one).add(&g).unwrap().is_identity());
            assert!(!g.is_identity());
        }
    }
}
