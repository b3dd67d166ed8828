// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_integer::Integer;

/// Maps a hash output into `[0, q)`.
pub fn rejection_sample(q: &BigInt, e_hash: &BigInt) -> BigInt {
    e_hash.mod_floor(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_sample() {
        let q = BigInt::from(1000);
        assert_eq!(rejection_sample(&q, &BigInt::from(500)), BigInt::from(500));
        assert_eq!(rejection_sample(&q, &BigInt::from(1000)), BigInt::from(0));
        assert_eq!(rejection_sample(&q, &BigInt::from(1234)), BigInt::from(234));
        assert_eq!(rejection_sample(&q, &BigInt::from(-1234)), BigInt::from(766));
    }
}
