// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use super::party_id::{PartyID, SortedPartyIDs};

/// The full, sorted set of parties taking part in a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerContext {
    party_ids: SortedPartyIDs,
}

impl PeerContext {
    pub fn new(party_ids: SortedPartyIDs) -> Self {
        PeerContext { party_ids }
    }

    pub fn ids(&self) -> &SortedPartyIDs {
        &self.party_ids
    }

    pub fn set_ids(&mut self, ids: SortedPartyIDs) {
        self.party_ids = ids;
    }

    pub fn len(&self) -> usize {
        self.party_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.party_ids.is_empty()
    }

    pub fn contains(&self, party: &PartyID) -> bool {
        self.party_ids
            .get(party.array_index().unwrap_or(usize::MAX))
            .map_or(false, |p| p.key == party.key)
    }
}
