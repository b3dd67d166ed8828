// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_traits::Zero;

use super::super::messages::{KGRound2Message1, KGRound2Message2, KeygenContent};
use super::base::KeygenCtx;
use super::round_3::Round3;
use crate::crypto::schnorr::ZkProof;
use crate::protocols::{proof_session, store_message};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};

const ROUND: u32 = 2;
const SHARES: usize = 0;
const DECOMMITMENTS: usize = 1;

pub(crate) struct Round2 {
    ctx: KeygenCtx,
    state: RoundState,
}

impl Round2 {
    pub fn new(ctx: KeygenCtx) -> Self {
        let state = RoundState::with_kinds(ROUND, ctx.params.party_count(), 2);
        Round2 { ctx, state }
    }
}

impl Round<KeygenContent> for Round2 {
    fn number(&self) -> u32 {
        ROUND
    }

    fn start(&mut self) -> Result<(), TssError> {
        self.state
            .start(self.ctx.party_index())
            .map_err(|k| self.ctx.error(ROUND, k))?;

        let params = self.ctx.params.clone();
        let i = self.ctx.party_index();

        // 1. p2p send share ij to Pj
        for (j, pj) in params.parties().ids().iter().enumerate() {
            let msg = KGRound2Message1::new(&self.ctx.temp.shares[j].share);
            if j == i {
                self.ctx.temp.r2_msg1s[i] = Some(msg);
                continue;
            }
            self.ctx.send(ROUND, KeygenContent::Round2Message1(msg), Some(vec![pj.clone()]))?;
        }

        // 2. prove knowledge of ui, bound to our proof context
        let temp = &self.ctx.temp;
        let context_i = proof_session(&temp.ssid, i);
        let proof = {
            let mut rng = params.lock_rng();
            ZkProof::new(&context_i, &temp.ui, &temp.vs[0], &mut **rng)
        }
        .map_err(|e| self.ctx.crypto_error(ROUND, e))?;

        // 3. BROADCAST de-commitments of Shamir poly*G and the Schnorr proof
        let msg = KGRound2Message2::new(&temp.de_commit_poly_g, &proof).map_err(|e| self.ctx.crypto_error(ROUND, e))?;

        self.ctx.temp.ui = Zero::zero();
        self.ctx.temp.r2_msg2s[i] = Some(msg.clone());
        self.ctx.send(ROUND, KeygenContent::Round2Message2(msg), None)
    }

    fn update(&mut self, msg: ParsedMessage<KeygenContent>) -> Result<bool, TssError> {
        let ParsedMessage { routing, content } = msg;
        let temp = &mut self.ctx.temp;
        let res = match content {
            KeygenContent::Round2Message1(m) => {
                store_message(&mut self.state, SHARES, &mut temp.r2_msg1s, &routing.from, m)
            }
            KeygenContent::Round2Message2(m) => {
                store_message(&mut self.state, DECOMMITMENTS, &mut temp.r2_msg2s, &routing.from, m)
            }
            other => Err(ErrorKind::UnexpectedMessage {
                from: routing.from,
                reason: format!("{} in round {}", other.kind(), ROUND),
            }),
        };
        res.map_err(|k| self.ctx.error(ROUND, k))
    }

    fn can_proceed(&self) -> bool {
        self.state.can_proceed()
    }

    fn waiting_for(&self) -> Vec<PartyID> {
        self.state.waiting_for(self.ctx.params.parties().ids())
    }

    fn next_round(self: Box<Self>) -> Option<Box<dyn Round<KeygenContent>>> {
        Some(Box::new(Round3::new(self.ctx)))
    }
}
