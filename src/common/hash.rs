// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::{BigInt, Sign};
use sha2::{Digest, Sha512_256};

const HASH_INPUT_DELIMITER: u8 = b'$';

fn prepare_hash_data(inputs: &[&[u8]]) -> Option<Vec<u8>> {
    if inputs.is_empty() {
        return None;
    }

    let input_len = inputs.len();
    let bz_size: usize = inputs.iter().map(|bz| bz.len()).sum();

    // 8 bytes for the input count, the data itself, one delimiter and an
    // 8 byte length per input
    let data_cap = 8 + bz_size + input_len + (input_len * 8);
    let mut data = Vec::with_capacity(data_cap);

    data.extend_from_slice(&(input_len as u64).to_le_bytes());
    for bz in inputs {
        data.extend_from_slice(bz);
        data.push(HASH_INPUT_DELIMITER);
        data.extend_from_slice(&(bz.len() as u64).to_le_bytes());
    }
    Some(data)
}

fn bigints_to_hash_input(inputs: &[&BigInt]) -> Vec<Vec<u8>> {
    inputs.iter().map(|n| n.to_bytes_be().1).collect()
}

/// Computes SHA-512/256 of the inputs, with delimiters and length prefixes.
/// Protected against length extension attacks.
pub fn sha512_256(inputs: &[&[u8]]) -> Option<Vec<u8>> {
    let data = prepare_hash_data(inputs)?;
    Some(Sha512_256::digest(&data).to_vec())
}

/// Computes SHA-512/256 of the big-endian encodings of the inputs.
pub fn sha512_256i(inputs: &[&BigInt]) -> Option<BigInt> {
    let input_bytes = bigints_to_hash_input(inputs);
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();
    let data = prepare_hash_data(&input_slices)?;
    Some(BigInt::from_bytes_be(Sign::Plus, &Sha512_256::digest(&data)))
}

/// Tagged SHA-512/256. The tag digest is absorbed twice before the framed
/// inputs, binding the result to a session or domain.
pub fn sha512_256i_tagged(tag: &[u8], inputs: &[&BigInt]) -> Option<BigInt> {
    let input_bytes = bigints_to_hash_input(inputs);
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();
    let data = prepare_hash_data(&input_slices)?;

    let tag_hash = Sha512_256::digest(tag);
    let mut state = Sha512_256::new();
    state.update(tag_hash);
    state.update(tag_hash);
    state.update(&data);
    Some(BigInt::from_bytes_be(Sign::Plus, &state.finalize()))
}

/// SHA-512/256 of a single integer, without framing.
pub fn sha512_256i_one(input: &BigInt) -> BigInt {
    let data = input.to_bytes_be().1;
    BigInt::from_bytes_be(Sign::Plus, &Sha512_256::digest(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha512_256() {
        let data1 = b"hello";
        let data2 = b"world";

        let hash1 = sha512_256(&[&data1[..], &data2[..]]).unwrap();
        let hash3 = sha512_256(&[&data2[..], &data1[..]]).unwrap();
        assert_eq!(hash1.len(), 32);
        // order matters
        assert_ne!(hash1, hash3);

        // the delimiter prevents simple concatenation collisions
        let combined = sha512_256(&[&b"helloworld"[..]]).unwrap();
        assert_ne!(hash1, combined);

        assert!(sha512_256(&[]).is_none());

        let with_empty = sha512_256(&[&data1[..], &b""[..]]).unwrap();
        assert_ne!(sha512_256(&[&data1[..]]).unwrap(), with_empty);
    }

    #[test]
    fn test_sha512_256i() {
        let num1 = BigInt::parse_bytes(b"12345678901234567890", 10).unwrap();
        let num2 = BigInt::parse_bytes(b"98765432109876543210", 10).unwrap();

        let hash1 = sha512_256i(&[&num1, &num2]).unwrap();
        let hash2 = sha512_256i(&[&num2, &num1]).unwrap();
        assert_ne!(hash1, hash2);
        assert!(hash1.bits() <= 256);
        assert_eq!(hash1, sha512_256i(&[&num1, &num2]).unwrap());

        let mut combined = num1.to_bytes_be().1;
        combined.extend(num2.to_bytes_be().1);
        let combined = BigInt::from_bytes_be(Sign::Plus, &combined);
        assert_ne!(hash1, sha512_256i_one(&combined));

        assert!(sha512_256i(&[]).is_none());
    }

    #[test]
    fn test_sha512_256i_tagged() {
        let num1 = BigInt::from(12345u64);
        let num2 = BigInt::from(67890u64);

        let hash1 = sha512_256i_tagged(b"TAG", &[&num1, &num2]).unwrap();
        let hash2 = sha512_256i_tagged(b"TAG", &[&num2, &num1]).unwrap();
        let hash3 = sha512_256i_tagged(b"OTHER", &[&num1, &num2]).unwrap();
        assert_ne!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_ne!(hash1, sha512_256i(&[&num1, &num2]).unwrap());

        assert!(sha512_256i_tagged(b"TAG", &[]).is_none());
    }
}
