// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::traits::{Identity, IsIdentity};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tss::curve::CurveName;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    #[error("point is not on the {0} curve")]
    NotOnCurve(CurveName),
    #[error("point is the identity element")]
    Identity,
    #[error("cannot combine a {0} point with a {1} point")]
    CurveMismatch(CurveName, CurveName),
    #[error("invalid point encoding: {0}")]
    InvalidEncoding(String),
    #[error("flattened coordinates must be a non-empty list of pairs, got {0} values")]
    OddCoordinateCount(usize),
}

// Short Weierstrass curves share the RustCrypto elliptic-curve API, so one
// helper module is stamped out per curve crate.
macro_rules! short_weierstrass {
    ($module:ident, $krate:ident) => {
        mod $module {
            use $krate::elliptic_curve::ff::{Field as _, PrimeField};
            use $krate::elliptic_curve::group::{Curve as _, Group as _};
            use $krate::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
            use $krate::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
            use num_bigint::{BigInt, Sign};

            use crate::common::slice::pad_to_length_bytes_in_place;

            pub(super) type Point = ProjectivePoint;

            pub(super) fn generator() -> Point {
                ProjectivePoint::GENERATOR
            }

            pub(super) fn identity() -> Point {
                ProjectivePoint::IDENTITY
            }

            pub(super) fn is_identity(p: &Point) -> bool {
                bool::from(p.is_identity())
            }

            fn field_bytes(v: &BigInt) -> Option<FieldBytes> {
                let mut bytes = v.to_bytes_be().1;
                if bytes.len() > 32 {
                    return None;
                }
                pad_to_length_bytes_in_place(&mut bytes, 32);
                Some(FieldBytes::clone_from_slice(&bytes))
            }

            // k is already reduced below the group order
            pub(super) fn scalar(k: &BigInt) -> Scalar {
                field_bytes(k)
                    .and_then(|fb| Option::<Scalar>::from(Scalar::from_repr(fb)))
                    .unwrap_or(Scalar::ZERO)
            }

            pub(super) fn mul(p: &Point, k: &BigInt) -> Point {
                *p * scalar(k)
            }

            pub(super) fn coords(p: &Point) -> Option<(BigInt, BigInt)> {
                let encoded = p.to_affine().to_encoded_point(false);
                let x = encoded.x()?;
                let y = encoded.y()?;
                Some((BigInt::from_bytes_be(Sign::Plus, x), BigInt::from_bytes_be(Sign::Plus, y)))
            }

            pub(super) fn from_coords(x: &BigInt, y: &BigInt) -> Option<Point> {
                let encoded = EncodedPoint::from_affine_coordinates(&field_bytes(x)?, &field_bytes(y)?, false);
                Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded)).map(ProjectivePoint::from)
            }

            pub(super) fn to_bytes(p: &Point) -> Vec<u8> {
                p.to_affine().to_encoded_point(true).as_bytes().to_vec()
            }

            pub(super) fn from_bytes(bytes: &[u8]) -> Option<Point> {
                let encoded = EncodedPoint::from_bytes(bytes).ok()?;
                Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded)).map(ProjectivePoint::from)
            }
        }
    };
}

short_weierstrass!(secp256k1, k256);
short_weierstrass!(nist_p256, p256);

mod edwards {
    use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
    use curve25519_dalek::scalar::Scalar;
    use num_bigint::{BigInt, Sign};
    use num_integer::Integer;
    use num_traits::{One, Zero};
    use once_cell::sync::Lazy;

    use crate::common::int::ModInt;
    use crate::tss::curve::CurveName;

    // d = -121665 / 121666
    static D: Lazy<BigInt> = Lazy::new(|| {
        let m = ModInt::new(CurveName::Ed25519.field_prime().clone());
        m.div(&BigInt::from(-121665), &BigInt::from(121666)).unwrap_or_default()
    });

    // 2^((p - 1) / 4), a square root of -1
    static SQRT_M1: Lazy<BigInt> = Lazy::new(|| {
        let p = CurveName::Ed25519.field_prime();
        BigInt::from(2).modpow(&((p - BigInt::one()) >> 2), p)
    });

    // k is already reduced below the group order
    pub(super) fn scalar(k: &BigInt) -> Scalar {
        let mut bytes = k.to_bytes_le().1;
        bytes.resize(32, 0);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Scalar::from_bytes_mod_order(arr)
    }

    fn recover_x(y: &BigInt, sign: bool) -> Option<BigInt> {
        let p = CurveName::Ed25519.field_prime();
        let m = ModInt::new(p.clone());
        let y2 = m.mul(y, y);
        let u = m.sub(&y2, &BigInt::one());
        let v = m.add(&m.mul(&D, &y2), &BigInt::one());
        let x2 = m.div(&u, &v)?;
        if x2.is_zero() {
            return if sign { None } else { Some(BigInt::zero()) };
        }
        let mut x = x2.modpow(&((p + BigInt::from(3)) >> 3), p);
        if m.mul(&x, &x) != x2 {
            x = m.mul(&x, &SQRT_M1);
            if m.mul(&x, &x) != x2 {
                return None;
            }
        }
        if x.is_odd() != sign {
            x = p - x;
        }
        Some(x)
    }

    pub(super) fn coords(p: &EdwardsPoint) -> Option<(BigInt, BigInt)> {
        let mut bytes = p.compress().to_bytes();
        let sign = bytes[31] >> 7 == 1;
        bytes[31] &= 0x7f;
        let y = BigInt::from_bytes_le(Sign::Plus, &bytes);
        let x = recover_x(&y, sign)?;
        Some((x, y))
    }

    pub(super) fn from_coords(x: &BigInt, y: &BigInt) -> Option<EdwardsPoint> {
        let mut bytes = y.to_bytes_le().1;
        if bytes.len() > 32 {
            return None;
        }
        bytes.resize(32, 0);
        if x.is_odd() {
            bytes[31] |= 0x80;
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        let point = CompressedEdwardsY(arr).decompress()?;
        match coords(&point) {
            Some((px, py)) if &px == x && &py == y => Some(point),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Repr {
    Secp256k1(secp256k1::Point),
    P256(nist_p256::Point),
    Ed25519(EdwardsPoint),
}

/// A point on one of the supported curves. Short Weierstrass and twisted
/// Edwards points share one API; operations across curves fail.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncodedECPoint", into = "EncodedECPoint")]
pub struct ECPoint {
    repr: Repr,
}

impl ECPoint {
    pub fn curve(&self) -> CurveName {
        match self.repr {
            Repr::Secp256k1(_) => CurveName::Secp256k1,
            Repr::P256(_) => CurveName::P256,
            Repr::Ed25519(_) => CurveName::Ed25519,
        }
    }

    pub fn generator(curve: CurveName) -> Self {
        let repr = match curve {
            CurveName::Secp256k1 => Repr::Secp256k1(secp256k1::generator()),
            CurveName::P256 => Repr::P256(nist_p256::generator()),
            CurveName::Ed25519 => Repr::Ed25519(curve25519_dalek::constants::ED25519_BASEPOINT_POINT),
        };
        ECPoint { repr }
    }

    pub fn identity(curve: CurveName) -> Self {
        let repr = match curve {
            CurveName::Secp256k1 => Repr::Secp256k1(secp256k1::identity()),
            CurveName::P256 => Repr::P256(nist_p256::identity()),
            CurveName::Ed25519 => Repr::Ed25519(EdwardsPoint::identity()),
        };
        ECPoint { repr }
    }

    /// `k * G`, with `k` reduced modulo the group order.
    pub fn scalar_base_mult(curve: CurveName, k: &BigInt) -> Self {
        let k = k.mod_floor(curve.order());
        let repr = match curve {
            CurveName::Secp256k1 => Repr::Secp256k1(secp256k1::mul(&secp256k1::generator(), &k)),
            CurveName::P256 => Repr::P256(nist_p256::mul(&nist_p256::generator(), &k)),
            CurveName::Ed25519 => Repr::Ed25519(EdwardsPoint::mul_base(&edwards::scalar(&k))),
        };
        ECPoint { repr }
    }

    /// `k * self`, with `k` reduced modulo the group order.
    pub fn scalar_mul(&self, k: &BigInt) -> Self {
        let k = k.mod_floor(self.curve().order());
        let repr = match &self.repr {
            Repr::Secp256k1(p) => Repr::Secp256k1(secp256k1::mul(p, &k)),
            Repr::P256(p) => Repr::P256(nist_p256::mul(p, &k)),
            Repr::Ed25519(p) => Repr::Ed25519(p * edwards::scalar(&k)),
        };
        ECPoint { repr }
    }

    pub fn add(&self, other: &ECPoint) -> Result<ECPoint, PointError> {
        let repr = match (&self.repr, &other.repr) {
            (Repr::Secp256k1(a), Repr::Secp256k1(b)) => Repr::Secp256k1(a + b),
            (Repr::P256(a), Repr::P256(b)) => Repr::P256(a + b),
            (Repr::Ed25519(a), Repr::Ed25519(b)) => Repr::Ed25519(a + b),
            _ => return Err(PointError::CurveMismatch(self.curve(), other.curve())),
        };
        Ok(ECPoint { repr })
    }

    pub fn is_identity(&self) -> bool {
        match &self.repr {
            Repr::Secp256k1(p) => secp256k1::is_identity(p),
            Repr::P256(p) => nist_p256::is_identity(p),
            Repr::Ed25519(p) => p.is_identity(),
        }
    }

    /// Not the identity, and for Edwards points, in the prime-order subgroup.
    pub fn validate_basic(&self) -> bool {
        match &self.repr {
            Repr::Ed25519(p) => !p.is_identity() && p.is_torsion_free(),
            _ => !self.is_identity(),
        }
    }

    /// Affine coordinates. The short Weierstrass identity has none.
    pub fn coords(&self) -> Result<(BigInt, BigInt), PointError> {
        let coords = match &self.repr {
            Repr::Secp256k1(p) => secp256k1::coords(p).ok_or(PointError::Identity)?,
            Repr::P256(p) => nist_p256::coords(p).ok_or(PointError::Identity)?,
            Repr::Ed25519(p) => edwards::coords(p).ok_or(PointError::NotOnCurve(CurveName::Ed25519))?,
        };
        Ok(coords)
    }

    pub fn x(&self) -> BigInt {
        self.coords().map(|(x, _)| x).unwrap_or_default()
    }

    pub fn y(&self) -> BigInt {
        self.coords().map(|(_, y)| y).unwrap_or_default()
    }

    /// Builds a point from affine coordinates, checking the curve equation.
    pub fn from_coords(curve: CurveName, x: &BigInt, y: &BigInt) -> Result<Self, PointError> {
        let p = curve.field_prime();
        if x.is_negative() || y.is_negative() || x >= p || y >= p {
            return Err(PointError::NotOnCurve(curve));
        }
        let repr = match curve {
            CurveName::Secp256k1 => secp256k1::from_coords(x, y).map(Repr::Secp256k1),
            CurveName::P256 => nist_p256::from_coords(x, y).map(Repr::P256),
            CurveName::Ed25519 => edwards::from_coords(x, y).map(Repr::Ed25519),
        };
        match repr {
            Some(repr) => Ok(ECPoint { repr }),
            None => Err(PointError::NotOnCurve(curve)),
        }
    }

    /// Compressed encoding: SEC1 for short Weierstrass, RFC 8032 for Edwards.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.repr {
            Repr::Secp256k1(p) => secp256k1::to_bytes(p),
            Repr::P256(p) => nist_p256::to_bytes(p),
            Repr::Ed25519(p) => p.compress().to_bytes().to_vec(),
        }
    }

    pub fn from_bytes(curve: CurveName, bytes: &[u8]) -> Result<Self, PointError> {
        let invalid = || PointError::InvalidEncoding(format!("{} bytes for {}", bytes.len(), curve));
        let repr = match curve {
            CurveName::Secp256k1 => Repr::Secp256k1(secp256k1::from_bytes(bytes).ok_or_else(invalid)?),
            CurveName::P256 => Repr::P256(nist_p256::from_bytes(bytes).ok_or_else(invalid)?),
            CurveName::Ed25519 => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| invalid())?;
                Repr::Ed25519(CompressedEdwardsY(arr).decompress().ok_or_else(invalid)?)
            }
        };
        let point = ECPoint { repr };
        if point.is_identity() {
            return Err(PointError::Identity);
        }
        Ok(point)
    }
}

impl fmt::Debug for ECPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ECPoint({}, {})", self.curve(), hex::encode(self.to_bytes()))
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedECPoint {
    curve: CurveName,
    point: String,
}

impl From<ECPoint> for EncodedECPoint {
    fn from(p: ECPoint) -> Self {
        EncodedECPoint {
            curve: p.curve(),
            point: hex::encode(p.to_bytes()),
        }
    }
}

impl TryFrom<EncodedECPoint> for ECPoint {
    type Error = PointError;

    fn try_from(e: EncodedECPoint) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&e.point).map_err(|err| PointError::InvalidEncoding(err.to_string()))?;
        ECPoint::from_bytes(e.curve, &bytes)
    }
}

/// `[x0, y0, x1, y1, ...]` for the given points. The identity cannot be
/// flattened.
pub fn flatten_ec_points(points: &[ECPoint]) -> Result<Vec<BigInt>, PointError> {
    let mut flat = Vec::with_capacity(points.len() * 2);
    for point in points {
        if point.is_identity() {
            return Err(PointError::Identity);
        }
        let (x, y) = point.coords()?;
        flat.push(x);
        flat.push(y);
    }
    Ok(flat)
}

pub fn un_flatten_ec_points(curve: CurveName, coords: &[BigInt]) -> Result<Vec<ECPoint>, PointError> {
    if coords.is_empty() || coords.len() % 2 != 0 {
        return Err(PointError::OddCoordinateCount(coords.len()));
    }
    coords
        .chunks(2)
        .map(|pair| {
            let point = ECPoint::from_coords(curve, &pair[0], &pair[1])?;
            if point.is_identity() {
                return Err(PointError::Identity);
            }
            Ok(point)
        })
        .collect()
}

/// Sum of the given points, or the identity for an empty slice.
pub fn sum_points(curve: CurveName, points: &[ECPoint]) -> Result<ECPoint, PointError> {
    points
        .iter()
        .try_fold(ECPoint::identity(curve), |acc, p| acc.add(p))
}
