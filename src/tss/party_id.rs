// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::common::random::must_get_random_int;

/// Identity of one participant. `key` is the canonical integer used for
/// ordering and as the VSS evaluation point. `index` is the zero-based
/// position in the sorted party list, or -1 before sorting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyID {
    pub id: String,
    pub moniker: String,
    pub key: BigInt,
    index: i32,
}

impl PartyID {
    pub fn new(id: impl Into<String>, moniker: impl Into<String>, key: BigInt) -> Self {
        PartyID {
            id: id.into(),
            moniker: moniker.into(),
            key,
            index: -1,
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    /// Zero-based storage position, once sorted.
    pub fn array_index(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }

    /// One-based protocol position, once sorted.
    pub fn protocol_index(&self) -> Option<usize> {
        self.array_index().map(|i| i + 1)
    }

    pub fn validate_basic(&self) -> bool {
        self.key.is_positive() && self.index >= 0
    }
}

impl fmt::Display for PartyID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.index, self.moniker)
    }
}

/// Party IDs sorted by key, each carrying its array index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedPartyIDs(Vec<PartyID>);

impl SortedPartyIDs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PartyID> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PartyID> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PartyID] {
        &self.0
    }

    pub fn keys(&self) -> Vec<BigInt> {
        self.0.iter().map(|p| p.key.clone()).collect()
    }

    pub fn find_by_key(&self, key: &BigInt) -> Option<&PartyID> {
        self.0.iter().find(|p| &p.key == key)
    }

    /// Every party except `exclude`.
    pub fn exclude(&self, exclude: &PartyID) -> Vec<PartyID> {
        self.0.iter().filter(|p| p.key != exclude.key).cloned().collect()
    }
}

impl<'a> IntoIterator for &'a SortedPartyIDs {
    type Item = &'a PartyID;
    type IntoIter = std::slice::Iter<'a, PartyID>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sorts by key ascending and assigns array indexes from 0. Every party
/// computes the same order independently.
pub fn sort_party_ids(mut ids: Vec<PartyID>) -> SortedPartyIDs {
    ids.sort_by(|a, b| a.key.cmp(&b.key));
    for (i, id) in ids.iter_mut().enumerate() {
        id.index = i as i32;
    }
    SortedPartyIDs(ids)
}

/// Unsorted party IDs with random 256-bit keys, for tests and local
/// simulations.
pub fn generate_test_party_ids<R: RngCore + CryptoRng + ?Sized>(count: usize, rng: &mut R) -> Vec<PartyID> {
    (0..count)
        .map(|i| {
            let key = must_get_random_int(rng, 256).unwrap_or_default() + BigInt::one();
            PartyID::new((i + 1).to_string(), format!("P[{}]", i + 1), key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sort_assigns_dense_indexes() {
        let ids = vec![
            PartyID::new("c", "C", BigInt::from(30)),
            PartyID::new("a", "A", BigInt::from(10)),
            PartyID::new("b", "B", BigInt::from(20)),
        ];
        let sorted = sort_party_ids(ids);
        let monikers: Vec<&str> = sorted.iter().map(|p| p.moniker.as_str()).collect();
        assert_eq!(monikers, vec!["A", "B", "C"]);
        for (i, p) in sorted.iter().enumerate() {
            assert_eq!(p.array_index(), Some(i));
            assert_eq!(p.protocol_index(), Some(i + 1));
        }
    }

    #[test]
    fn test_sort_is_independent_of_input_order() {
        let mut rng = StdRng::seed_from_u64(81);
        let ids = generate_test_party_ids(5, &mut rng);
        let mut reversed = ids.clone();
        reversed.reverse();
        assert_eq!(sort_party_ids(ids), sort_party_ids(reversed));
    }

    #[test]
    fn test_unsorted_party_has_no_index() {
        let p = PartyID::new("1", "P[1]", BigInt::from(5));
        assert_eq!(p.array_index(), None);
        assert!(!p.validate_basic());
        assert_eq!(p.to_string(), "{-1,P[1]}");
    }

    #[test]
    fn test_find_and_exclude() {
        let mut rng = StdRng::seed_from_u64(82);
        let sorted = sort_party_ids(generate_test_party_ids(3, &mut rng));
        let second = sorted.get(1).unwrap().clone();
        assert_eq!(sorted.find_by_key(&second.key), Some(&second));
        let others = sorted.exclude(&second);
        assert_eq!(others.len(), 2);
        assert!(!others.contains(&second));
    }
}
