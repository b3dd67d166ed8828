// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use super::error::{ErrorKind, TssError};
use super::message::{MessageContent, ParsedMessage};
use super::party_id::{PartyID, SortedPartyIDs};

/// Acknowledgment bookkeeping shared by every round: one `ok` vector per
/// message kind the round expects, plus the started flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundState {
    number: u32,
    ok: Vec<Vec<bool>>,
    started: bool,
}

impl RoundState {
    pub fn new(number: u32, party_count: usize) -> Self {
        Self::with_kinds(number, party_count, 1)
    }

    pub fn with_kinds(number: u32, party_count: usize, kinds: usize) -> Self {
        RoundState {
            number,
            ok: vec![vec![false; party_count]; kinds],
            started: false,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Marks the round started and pre-acknowledges the local party.
    pub fn start(&mut self, self_index: usize) -> Result<(), ErrorKind> {
        if self.started {
            return Err(ErrorKind::AlreadyStarted);
        }
        self.started = true;
        for ok in self.ok.iter_mut() {
            if let Some(slot) = ok.get_mut(self_index) {
                *slot = true;
            }
        }
        Ok(())
    }

    /// For rounds that wait on nothing.
    pub fn set_all_ok(&mut self) {
        for ok in self.ok.iter_mut() {
            ok.iter_mut().for_each(|slot| *slot = true);
        }
    }

    pub fn is_ok(&self, kind: usize, index: usize) -> bool {
        self.ok
            .get(kind)
            .and_then(|ok| ok.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_ok(&mut self, kind: usize, index: usize) {
        if let Some(slot) = self.ok.get_mut(kind).and_then(|ok| ok.get_mut(index)) {
            *slot = true;
        }
    }

    pub fn can_proceed(&self) -> bool {
        self.started && self.ok.iter().all(|ok| ok.iter().all(|&slot| slot))
    }

    /// Parties with at least one missing acknowledgment, in array order.
    pub fn waiting_for(&self, parties: &SortedPartyIDs) -> Vec<PartyID> {
        parties
            .iter()
            .enumerate()
            .filter(|(i, _)| self.ok.iter().any(|ok| !ok.get(*i).copied().unwrap_or(true)))
            .map(|(_, p)| p.clone())
            .collect()
    }
}

/// One step of a round-based protocol.
///
/// `start` does the local work of the round and emits its outbound
/// messages. `update` stores one inbound message of this round's own
/// number. `next_round` consumes the round and hands its accumulated
/// session data to the following one.
pub trait Round<C: MessageContent>: Send {
    fn number(&self) -> u32;

    fn start(&mut self) -> Result<(), TssError>;

    /// Returns `Ok(false)` when the round has no use for the message.
    fn update(&mut self, msg: ParsedMessage<C>) -> Result<bool, TssError>;

    fn can_proceed(&self) -> bool;

    fn waiting_for(&self) -> Vec<PartyID>;

    /// True for the last round. Once a terminal round can proceed the
    /// session is complete.
    fn is_terminal(&self) -> bool {
        false
    }

    fn next_round(self: Box<Self>) -> Option<Box<dyn Round<C>>>;
}

/// Sender checks common to every protocol. Returns the sender's array index.
pub fn validate_sender(parties: &SortedPartyIDs, self_index: usize, from: &PartyID) -> Result<usize, ErrorKind> {
    let index = from
        .array_index()
        .ok_or_else(|| ErrorKind::InvalidSenderIndex(format!("{} has no index", from)))?;
    match parties.get(index) {
        None => Err(ErrorKind::InvalidSenderIndex(format!(
            "{} is out of range for {} parties",
            from,
            parties.len()
        ))),
        Some(known) if known.key != from.key => Err(ErrorKind::InvalidSenderIndex(format!(
            "{} does not match the party at index {}",
            from, index
        ))),
        Some(_) if index == self_index => Err(ErrorKind::InvalidSenderIndex(format!(
            "{} is the local party",
            from
        ))),
        Some(_) => Ok(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    use crate::tss::party_id::sort_party_ids;

    fn parties(n: i64) -> SortedPartyIDs {
        sort_party_ids(
            (1..=n)
                .map(|i| PartyID::new(i.to_string(), format!("P[{}]", i), BigInt::from(i * 10)))
                .collect(),
        )
    }

    #[test]
    fn test_not_started_never_proceeds() {
        let mut st = RoundState::new(1, 2);
        st.set_all_ok();
        assert!(!st.can_proceed());
        st.start(0).unwrap();
        assert!(st.can_proceed());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut st = RoundState::new(1, 3);
        st.start(0).unwrap();
        assert_eq!(st.start(0), Err(ErrorKind::AlreadyStarted));
    }

    #[test]
    fn test_proceeds_exactly_on_last_ack() {
        let ps = parties(3);
        let mut st = RoundState::new(1, 3);
        st.start(0).unwrap();
        assert_eq!(st.waiting_for(&ps).len(), 2);
        st.set_ok(0, 1);
        assert!(!st.can_proceed());
        assert_eq!(st.waiting_for(&ps), vec![ps.get(2).unwrap().clone()]);
        st.set_ok(0, 2);
        assert!(st.can_proceed());
        assert!(st.waiting_for(&ps).is_empty());
    }

    #[test]
    fn test_every_kind_must_complete() {
        let mut st = RoundState::with_kinds(2, 2, 2);
        st.start(0).unwrap();
        st.set_ok(0, 1);
        assert!(!st.can_proceed());
        assert!(st.is_ok(0, 1));
        assert!(!st.is_ok(1, 1));
        st.set_ok(1, 1);
        assert!(st.can_proceed());
    }

    #[test]
    fn test_validate_sender() {
        let ps = parties(3);
        let peer = ps.get(1).unwrap().clone();
        assert_eq!(validate_sender(&ps, 0, &peer), Ok(1));
        assert!(validate_sender(&ps, 1, &peer).is_err());

        let unsorted = PartyID::new("9", "X", BigInt::from(90));
        assert!(matches!(
            validate_sender(&ps, 0, &unsorted),
            Err(ErrorKind::InvalidSenderIndex(_))
        ));

        let impostor = sort_party_ids(vec![
            PartyID::new("a", "A", BigInt::from(1)),
            PartyID::new("b", "B", BigInt::from(2)),
        ])
        .get(1)
        .unwrap()
        .clone();
        assert!(validate_sender(&ps, 0, &impostor).is_err());

        let far = sort_party_ids(
            (1..=5)
                .map(|i| PartyID::new(i.to_string(), "F", BigInt::from(i)))
                .collect(),
        )
        .get(4)
        .unwrap()
        .clone();
        assert!(validate_sender(&ps, 0, &far).is_err());
    }
}
