// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Modular arithmetic over a fixed positive modulus. Results are always in
/// `[0, modulus)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModInt {
    modulus: BigInt,
}

impl ModInt {
    pub fn new(modulus: BigInt) -> Self {
        ModInt { modulus }
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    pub fn reduce(&self, x: &BigInt) -> BigInt {
        x.mod_floor(&self.modulus)
    }

    pub fn add(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x + y).mod_floor(&self.modulus)
    }

    pub fn sub(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x - y).mod_floor(&self.modulus)
    }

    pub fn mul(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x * y).mod_floor(&self.modulus)
    }

    /// `base^exponent mod m`. A negative exponent inverts the base first and
    /// yields zero when the base is not invertible.
    pub fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        if exponent.is_negative() {
            return match self.mod_inverse(base) {
                Some(inv) => inv.modpow(&-exponent, &self.modulus),
                None => BigInt::zero(),
            };
        }
        self.reduce(base).modpow(exponent, &self.modulus)
    }

    /// `g^-1 mod m`, or `None` when `gcd(g, m) != 1`.
    pub fn mod_inverse(&self, g: &BigInt) -> Option<BigInt> {
        self.reduce(g).modinv(&self.modulus)
    }

    /// `x * y^-1 mod m`.
    pub fn div(&self, x: &BigInt, y: &BigInt) -> Option<BigInt> {
        self.mod_inverse(y).map(|y_inv| self.mul(x, &y_inv))
    }
}

/// Checks `0 <= b < bound`.
pub fn is_in_interval(b: &BigInt, bound: &BigInt) -> bool {
    !b.is_negative() && b < bound
}

/// Checks `0 < v < n` and `gcd(v, n) == 1`.
pub fn is_number_in_multiplicative_group(n: &BigInt, v: &BigInt) -> bool {
    v.is_positive() && v < n && v.gcd(n).is_one()
}

/// Appends the big-endian bytes of `appended` to `initial_bytes`.
pub fn append_bigint_to_bytes_slice(initial_bytes: &[u8], appended: &BigInt) -> Vec<u8> {
    let appended_bytes = appended.to_bytes_be().1;
    let mut result_bytes = Vec::with_capacity(initial_bytes.len() + appended_bytes.len());
    result_bytes.extend_from_slice(initial_bytes);
    result_bytes.extend_from_slice(&appended_bytes);
    result_bytes
}

/// Jacobi symbol `(a / n)` for odd positive `n`. Returns 0 for even or
/// non-positive `n`.
pub fn jacobi(a: &BigInt, n: &BigInt) -> i32 {
    if !n.is_positive() || n.is_even() {
        return 0;
    }
    let three = BigInt::from(3u8);
    let five = BigInt::from(5u8);
    let eight = BigInt::from(8u8);
    let four = BigInt::from(4u8);

    let mut a = a.mod_floor(n);
    let mut n = n.clone();
    let mut result = 1;
    while !a.is_zero() {
        while a.is_even() {
            a >>= 1;
            let r = n.mod_floor(&eight);
            if r == three || r == five {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if a.mod_floor(&four) == three && n.mod_floor(&four) == three {
            result = -result;
        }
        a = a.mod_floor(&n);
    }
    if n.is_one() {
        result
    } else {
        0
    }
}

/// Euler's criterion: `a` is a non-zero square modulo the odd prime `p`.
pub fn is_quadratic_residue(a: &BigInt, p: &BigInt) -> bool {
    let a = a.mod_floor(p);
    if a.is_zero() {
        return false;
    }
    let exp = (p - BigInt::one()) >> 1;
    a.modpow(&exp, p).is_one()
}
