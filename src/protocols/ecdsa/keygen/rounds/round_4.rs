// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use log::debug;

use super::super::messages::KeygenContent;
use super::super::save_data::LocalPartySaveData;
use super::base::KeygenCtx;
use super::round_5::Round5;
use crate::protocols::LocalSecrets;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::ParsedMessage;
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};
use crate::tss::verifier::verify_peers;

const ROUND: u32 = 4;

pub(crate) struct Round4 {
    ctx: KeygenCtx,
    state: RoundState,
}

impl Round4 {
    pub fn new(ctx: KeygenCtx) -> Self {
        let state = RoundState::new(ROUND, ctx.params.party_count());
        Round4 { ctx, state }
    }

    fn assemble(&mut self) -> Result<LocalPartySaveData, ErrorKind> {
        fn collect<T: Clone>(slots: &[Option<T>], what: &str) -> Result<Vec<T>, ErrorKind> {
            slots
                .iter()
                .cloned()
                .collect::<Option<Vec<T>>>()
                .ok_or_else(|| ErrorKind::MissingPrerequisiteData(what.to_string()))
        }
        let missing = |what: &str| ErrorKind::MissingPrerequisiteData(what.to_string());
        let ks = self.ctx.params.parties().ids().keys();
        let temp = &mut self.ctx.temp;
        Ok(LocalPartySaveData {
            local_pre_params: temp.pre_params.clone().ok_or_else(|| missing("pre-params"))?,
            local_secrets: LocalSecrets {
                xi: temp.xi.clone().ok_or_else(|| missing("xi"))?,
                share_id: temp.share_id.clone(),
            },
            ks,
            n_tilde_j: collect(&temp.n_tilde_j, "NTilde values")?,
            h1j: collect(&temp.h1j, "h1 values")?,
            h2j: collect(&temp.h2j, "h2 values")?,
            big_xj: std::mem::take(&mut temp.big_xj),
            paillier_pks: collect(&temp.paillier_pks, "paillier keys")?,
            ecdsa_pub: temp.ecdsa_pub.clone().ok_or_else(|| missing("public key"))?,
        })
    }
}

impl Round<KeygenContent> for Round4 {
    fn number(&self) -> u32 {
        ROUND
    }

    fn start(&mut self) -> Result<(), TssError> {
        self.state
            .start(self.ctx.party_index())
            .map_err(|k| self.ctx.error(ROUND, k))?;

        let params = self.ctx.params.clone();
        let ecdsa_pub = match self.ctx.temp.ecdsa_pub.clone() {
            Some(pk) => pk,
            None => return Err(self.ctx.missing(ROUND, "public key")),
        };
        let ks = params.parties().ids().keys();
        let iters = params.proof_params().paillier_proof_iterations;

        // 1-3. verify every peer's paillier proof against its key and y
        let temp = &self.ctx.temp;
        let checked = verify_peers(&params, |j| {
            let msg = temp.r3_msgs[j].as_ref().ok_or("missing round 3 message")?;
            let pk = temp.paillier_pks[j].as_ref().ok_or("missing paillier key")?;
            if msg.unmarshal_proof_ints().verify(&pk.n, &ks[j], &ecdsa_pub, iters) {
                debug!(target: "tss-lib", "paillier verify passed for party {}", j);
                Ok(())
            } else {
                Err("paillier verify failed".to_string())
            }
        });
        if let Err(failures) = checked {
            let culprits = failures.into_iter().map(|(p, _)| p).collect();
            return Err(self.ctx.error(
                ROUND,
                ErrorKind::AggregateVerificationFailed {
                    culprits,
                    reason: "paillier verify failed".into(),
                },
            ));
        }

        // 4. assemble the save data; round 5 checks and hands it over
        let save = self.assemble().map_err(|k| self.ctx.error(ROUND, k))?;
        self.ctx.save = Some(save);
        self.state.set_all_ok();
        Ok(())
    }

    fn update(&mut self, _msg: ParsedMessage<KeygenContent>) -> Result<bool, TssError> {
        Ok(false)
    }

    fn can_proceed(&self) -> bool {
        self.state.can_proceed()
    }

    fn waiting_for(&self) -> Vec<PartyID> {
        self.state.waiting_for(self.ctx.params.parties().ids())
    }

    fn next_round(self: Box<Self>) -> Option<Box<dyn Round<KeygenContent>>> {
        Some(Box::new(Round5::new(self.ctx)))
    }
}
