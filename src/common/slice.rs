// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::{BigInt, Sign};

/// Big-endian unsigned encodings of each integer.
pub fn bigints_to_bytes(bigints: &[BigInt]) -> Vec<Vec<u8>> {
    bigints.iter().map(|b| b.to_bytes_be().1).collect()
}

pub fn multi_bytes_to_bigints(bytes: &[Vec<u8>]) -> Vec<BigInt> {
    bytes.iter().map(|b| BigInt::from_bytes_be(Sign::Plus, b)).collect()
}

pub fn bytes_to_bigint(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, bytes)
}

pub fn non_empty_bytes(bz: &[u8]) -> bool {
    !bz.is_empty()
}

/// Every element is non-empty and, when given, the slice has exactly
/// `expect_len` elements.
pub fn non_empty_multi_bytes(bzs: &[Vec<u8>], expect_len: Option<usize>) -> bool {
    if bzs.is_empty() {
        return false;
    }
    if let Some(len) = expect_len {
        if bzs.len() != len {
            return false;
        }
    }
    bzs.iter().all(|bz| non_empty_bytes(bz))
}

/// Left-pads `src` with zeros up to `length`.
pub fn pad_to_length_bytes_in_place(src: &mut Vec<u8>, length: usize) {
    if src.len() < length {
        let mut padded = vec![0u8; length - src.len()];
        padded.append(src);
        *src = padded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bigints_bytes_are_big_endian() {
        let bigints = vec![BigInt::from(1), BigInt::from(0x0102)];
        let bytes = bigints_to_bytes(&bigints);
        assert_eq!(bytes, vec![vec![1], vec![1, 2]]);
        assert_eq!(multi_bytes_to_bigints(&bytes), bigints);
    }

    #[test]
    fn test_non_empty_multi_bytes() {
        assert!(non_empty_multi_bytes(&[vec![1], vec![2]], Some(2)));
        assert!(!non_empty_multi_bytes(&[vec![1], vec![2]], Some(3)));
        assert!(!non_empty_multi_bytes(&[vec![1], vec![]], None));
        assert!(!non_empty_multi_bytes(&[], None));
    }

    #[test]
    fn test_pad_to_length() {
        let mut v = vec![1, 2];
        pad_to_length_bytes_in_place(&mut v, 4);
        assert_eq!(v, vec![0, 0, 1, 2]);
        pad_to_length_bytes_in_place(&mut v, 2);
        assert_eq!(v, vec![0, 0, 1, 2]);
    }
}
