// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::messages::KeygenContent;
use super::prepare::LocalPreParams;
use super::rounds::{KeygenCtx, Round1};
use super::save_data::LocalPartySaveData;
use super::TASK_NAME;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::Message;
use crate::tss::params::Parameters;
use crate::tss::party::{BaseParty, Party};

/// One participant of an ECDSA key generation session.
///
/// Outbound messages go to `out`; the save data is sent once on `end` when
/// the session completes. Pre-parameters are optional but should be
/// generated ahead of time, otherwise round 1 blocks on the safe prime
/// search.
pub struct LocalParty {
    base: BaseParty<KeygenContent>,
}

impl LocalParty {
    pub fn new(
        params: Parameters,
        out: Sender<Message>,
        end: Sender<LocalPartySaveData>,
        optional_pre_params: Option<LocalPreParams>,
    ) -> Result<Self, TssError> {
        let invalid = |kind| TssError::new(kind, TASK_NAME, 0, Some(params.party_id().clone()));
        if params.curve().is_edwards() {
            return Err(invalid(ErrorKind::InvalidParameters(format!(
                "ecdsa keygen needs a short weierstrass curve, got {}",
                params.curve()
            ))));
        }
        params.validate().map_err(invalid)?;
        let params = Arc::new(params);
        let ctx = KeygenCtx::new(params.clone(), optional_pre_params, out, end);
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
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::tss::curve::CurveName;
    use crate::tss::message::{MessageContent, ParsedMessage};
    use crate::tss::party::PartyState;
    use crate::tss::party_id::{generate_test_party_ids, sort_party_ids};
    use crate::tss::peers::PeerContext;
    use crate::tss::params::ProofParams;

    const TEST_BITS: usize = 512;

    fn test_params(count: usize, threshold: usize, index: usize) -> Parameters {
        let mut rng = StdRng::seed_from_u64(5);
        let ids = sort_party_ids(generate_test_party_ids(count, &mut rng));
        let me = ids.as_slice()[index].clone();
        Parameters::new(CurveName::Secp256k1, PeerContext::new(ids), me, count, threshold)
            .with_rng(StdRng::seed_from_u64(100 + index as u64))
            .with_paillier_modulus_bits(TEST_BITS)
            .with_proof_params(ProofParams {
                dln_iterations: 8,
                mod_iterations: 8,
                paillier_proof_iterations: 4,
            })
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let (out, _) = channel();
        let (end, _) = channel();
        let err = LocalParty::new(test_params(3, 3, 0), out, end, None).err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidParameters(_)));
        assert_eq!(err.round(), 0);
    }

    #[test]
    fn test_rejects_pre_params_without_secrets() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pre = LocalPreParams::generate(TEST_BITS, &mut rng).unwrap();
        pre.alpha = Default::default();
        let (out, _) = channel();
        let (end, _) = channel();
        let mut party = LocalParty::new(test_params(3, 1, 0), out, end, Some(pre)).unwrap();
        let err = party.start().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidParameters(_)));
        assert_eq!(party.state(), PartyState::Failed);
    }

    #[test]
    fn test_pre_params_generation_times_out() {
        let params = test_params(3, 1, 0)
            .with_paillier_modulus_bits(2048)
            .with_safe_prime_gen_timeout(Duration::from_nanos(1))
            .with_concurrency(1);
        let (out, out_rx) = channel();
        let (end, _) = channel();
        let mut party = LocalParty::new(params, out, end, None).unwrap();
        let err = party.start().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ProtocolTimeout);
        assert_eq!(err.round(), 1);
        assert_eq!(party.state(), PartyState::Failed);
        assert!(out_rx.try_recv().is_err());
    }

    #[test]
    fn test_round_1_broadcast_and_gating() {
        let mut rng = StdRng::seed_from_u64(7);
        let pre = LocalPreParams::generate(TEST_BITS, &mut rng).unwrap();
        let (out, out_rx) = channel();
        let (end, _) = channel();
        let mut party = LocalParty::new(test_params(3, 1, 0), out, end, Some(pre)).unwrap();
        party.start().unwrap();
        assert_eq!(party.round_number(), Some(1));
        assert_eq!(party.to_string(), format!("id: {}, round: 1", party.party_id()));

        let msg = out_rx.try_recv().unwrap();
        assert!(msg.is_broadcast());
        assert_eq!(msg.from(), party.party_id());
        let parsed = ParsedMessage::<KeygenContent>::from_wire(&msg.wire_bytes, msg.from(), true).unwrap();
        assert_eq!(parsed.round_number(), 1);
        assert!(parsed.content.validate_basic());
        assert!(out_rx.try_recv().is_err());

        // our own broadcast echoed back is refused
        let err = party.update(parsed).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSenderIndex(_)));
        assert!(party.running());
        assert_eq!(party.waiting_for().len(), 2);
    }
}
