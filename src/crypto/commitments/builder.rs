// Copyright © 2019-2020 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use thiserror::Error;

const PARTS_CAP: usize = 3;
const MAX_PART_SIZE: usize = 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("too many commitment parts: {0} (max {PARTS_CAP})")]
    TooManyParts(usize),
    #[error("commitment part {index} has invalid length {len}")]
    InvalidPartLength { index: usize, len: BigInt },
    #[error("secrets are empty or too small")]
    SecretsTooSmall,
    #[error("secrets end before the declared part length")]
    NotEnoughData,
}

/// Packs up to three integer lists into one flat list of the form
/// `[len1, part1..., len2, part2..., ...]`.
#[derive(Debug, Clone, Default)]
pub struct CommitmentBuilder {
    parts: Vec<Vec<BigInt>>,
}

impl CommitmentBuilder {
    pub fn new() -> Self {
        CommitmentBuilder {
            parts: Vec::with_capacity(PARTS_CAP),
        }
    }

    pub fn parts(&self) -> &[Vec<BigInt>] {
        &self.parts
    }

    pub fn add_part(mut self, part: &[BigInt]) -> Self {
        self.parts.push(part.to_vec());
        self
    }

    pub fn secrets(&self) -> Result<Vec<BigInt>, CommitmentError> {
        if self.parts.len() > PARTS_CAP {
            return Err(CommitmentError::TooManyParts(self.parts.len()));
        }
        let total = self.parts.iter().map(|p| p.len() + 1).sum();
        let mut secrets = Vec::with_capacity(total);
        for (index, part) in self.parts.iter().enumerate() {
            if part.len() > MAX_PART_SIZE {
                return Err(CommitmentError::InvalidPartLength {
                    index,
                    len: BigInt::from(part.len()),
                });
            }
            secrets.push(BigInt::from(part.len()));
            secrets.extend_from_slice(part);
        }
        Ok(secrets)
    }
}

/// Splits a flat list produced by [`CommitmentBuilder::secrets`] back into
/// its parts.
pub fn parse_secrets(secrets: &[BigInt]) -> Result<Vec<Vec<BigInt>>, CommitmentError> {
    if secrets.len() < 2 {
        return Err(CommitmentError::SecretsTooSmall);
    }
    let mut parts = Vec::with_capacity(PARTS_CAP);
    let mut rest = secrets;
    while let Some((len, tail)) = rest.split_first() {
        if parts.len() == PARTS_CAP {
            return Err(CommitmentError::TooManyParts(parts.len() + 1));
        }
        let part_len = match len.to_usize() {
            Some(l) if !len.is_negative() && l <= MAX_PART_SIZE => l,
            _ => {
                return Err(CommitmentError::InvalidPartLength {
                    index: parts.len(),
                    len: len.clone(),
                })
            }
        };
        if part_len > tail.len() {
            return Err(CommitmentError::NotEnoughData);
        }
        let (part, next) = tail.split_at(part_len);
        parts.push(part.to_vec());
        rest = next;
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_secrets_and_parse() {
        let part1 = vec![BigInt::from(10), BigInt::from(20)];
        let part2: Vec<BigInt> = vec![];
        let part3 = vec![BigInt::from(1111), BigInt::from(2222), BigInt::from(3333)];
        let builder = CommitmentBuilder::new().add_part(&part1).add_part(&part2).add_part(&part3);
        let secrets = builder.secrets().unwrap();
        assert_eq!(secrets.len(), 8);
        assert_eq!(secrets[0], BigInt::from(2));
        assert_eq!(secrets[3], BigInt::from(0));
        assert_eq!(secrets[4], BigInt::from(3));
        assert_eq!(parse_secrets(&secrets).unwrap(), vec![part1, part2, part3]);
    }

    #[test]
    fn test_too_many_parts() {
        let part = vec![BigInt::one()];
        let builder = (0..=PARTS_CAP).fold(CommitmentBuilder::new(), |b, _| b.add_part(&part));
        assert_eq!(builder.secrets(), Err(CommitmentError::TooManyParts(4)));

        let encoded: Vec<BigInt> = (0..4).flat_map(|i| [BigInt::one(), BigInt::from(i)]).collect();
        assert_eq!(parse_secrets(&encoded), Err(CommitmentError::TooManyParts(4)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_secrets(&[]), Err(CommitmentError::SecretsTooSmall));
        assert_eq!(parse_secrets(&[BigInt::one()]), Err(CommitmentError::SecretsTooSmall));
        assert_eq!(
            parse_secrets(&[BigInt::from(3), BigInt::one(), BigInt::from(2)]),
            Err(CommitmentError::NotEnoughData)
        );
        assert!(matches!(
            parse_secrets(&[BigInt::from(-1), BigInt::one()]),
            Err(CommitmentError::InvalidPartLength { index: 0, .. })
        ));
        assert!(matches!(
            parse_secrets(&[BigInt::from(MAX_PART_SIZE + 1), BigInt::one()]),
            Err(CommitmentError::InvalidPartLength { .. })
        ));
    }
}
