// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::messages::KeygenContent;
use super::rounds::{KeygenCtx, Round1};
use super::save_data::LocalPartySaveData;
use super::TASK_NAME;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::Message;
use crate::tss::params::Parameters;
use crate::tss::party::{BaseParty, Party};

pub struct LocalParty {
    base: BaseParty<KeygenContent>,
}

impl LocalParty {
    pub fn new(params: Parameters, out: Sender<Message>, end: Sender<LocalPartySaveData>) -> Result<Self, TssError> {
        let invalid = |kind| TssError::new(kind, TASK_NAME, 0, Some(params.party_id().clone()));
        if !params.curve().is_edwards() {
            return Err(invalid(ErrorKind::InvalidParameters(format!(
                "eddsa keygen needs an edwards curve, got {}",
                params.curve()
            ))));
        }
        params.validate().map_err(invalid)?;
        let params = Arc::new(params);
        let ctx = KeygenCtx::new(params.clone(), out, end);
        let base = BaseParty::new(params, TASK_NAME, Box::new(Round1::new(ctx)));
        Ok(LocalParty { base })
    }
}

impl Party for LocalParty {
    type Content = KeygenContent;

    fn base(&self) -> &BaseParty<KeygenContent> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseParty<KeygenContent> {
        &mut self.base
    }
}

impl fmt::Display for LocalParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base.round_number() {
            Some(round) => write!(f, "id: {}, round: {}", self.party_id(), round),
            None => write!(f, "id: {}, round: -", self.party_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::tss::curve::CurveName;
    use crate::tss::message::{MessageContent, ParsedMessage};
    use crate::tss::party::PartyState;
    use crate::tss::party_id::{generate_test_party_ids, sort_party_ids};
    use crate::tss::peers::PeerContext;

    fn test_params(curve: CurveName) -> Parameters {
        let mut rng = StdRng::seed_from_u64(15);
        let ids = sort_party_ids(generate_test_party_ids(3, &mut rng));
        let me = ids.as_slice()[1].clone();
        Parameters::new(curve, PeerContext::new(ids), me, 3, 1).with_rng(StdRng::seed_from_u64(16))
    }

    #[test]
    fn test_rejects_weierstrass_curves() {
        let (out, _) = channel();
        let (end, _) = channel();
        let err = LocalParty::new(test_params(CurveName::Secp256k1), out, end).err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidParameters(_)));
    }

    #[test]
    fn test_round_1_and_early_round_2_messages() {
        let (out, out_rx) = channel();
        let (end, _) = channel();
        let mut party = LocalParty::new(test_params(CurveName::Ed25519), out, end).unwrap();
        assert_eq!(party.to_string(), format!("id: {}, round: -", party.party_id()));
        party.start().unwrap();
        assert_eq!(party.state(), PartyState::Running);

        let r1 = out_rx.try_recv().unwrap();
        assert!(r1.is_broadcast());
        let parsed = ParsedMessage::<KeygenContent>::from_wire(&r1.wire_bytes, r1.from(), true).unwrap();
        assert_eq!(parsed.content.kind(), "KGRound1Message");

        // a round 3 ack from a peer arrives before round 1 is done
        let peer = party.base().params().parties().ids().as_slice()[0].clone();
        let early = ParsedMessage::new(peer, None, KeygenContent::Round3(Default::default()));
        assert!(party.update(early.clone()).unwrap());
        assert_eq!(party.round_number(), Some(1));
        let err = party.update(early).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateMessage(_)));
        assert!(party.running());
    }
}
