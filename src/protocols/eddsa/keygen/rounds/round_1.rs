// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use super::super::messages::{KGRound1Message, KeygenContent};
use super::base::KeygenCtx;
use super::round_2::Round2;
use crate::common::random::get_random_non_zero_int;
use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::ecpoint::flatten_ec_points;
use crate::crypto::vss;
use crate::protocols::{session_id, store_message};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};

const ROUND: u32 = 1;

pub(crate) struct Round1 {
    ctx: KeygenCtx,
    state: RoundState,
}

impl Round1 {
    pub fn new(ctx: KeygenCtx) -> Self {
        let state = RoundState::new(ROUND, ctx.params.party_count());
        Round1 { ctx, state }
    }
}

impl Round<KeygenContent> for Round1 {
    fn number(&self) -> u32 {
        ROUND
    }

    fn start(&mut self) -> Result<(), TssError> {
        self.state
            .start(self.ctx.party_index())
            .map_err(|k| self.ctx.error(ROUND, k))?;

        let params = self.ctx.params.clone();
        let curve = params.curve();
        let i = self.ctx.party_index();
        let ids = params.parties().ids().keys();

        let mut rng = params.lock_rng();
        // 1. calculate "partial" key share ui
        let ui = get_random_non_zero_int(&mut **rng, curve.order());

        // 2. compute the vss shares
        let (vs, shares) = vss::create(curve, params.threshold(), &ui, &ids, &mut **rng)
            .map_err(|e| self.ctx.crypto_error(ROUND, e))?;

        // 3. make commitment -> (C, D)
        let p_g_flat = flatten_ec_points(&vs).map_err(|e| self.ctx.crypto_error(ROUND, e))?;
        let cmt = HashCommitDecommit::new(&mut **rng, &p_g_flat);
        drop(rng);

        let ssid = session_id(&params, ROUND).map_err(|k| self.ctx.error(ROUND, k))?;
        let msg = KGRound1Message::new(&cmt.c);

        let temp = &mut self.ctx.temp;
        temp.ssid = ssid;
        temp.ui = ui;
        temp.share_id = ids[i].clone();
        temp.vs = vs;
        temp.shares = shares;
        temp.de_commit_poly_g = cmt.d;
        temp.r1_msgs[i] = Some(msg.clone());

        self.ctx.send(ROUND, KeygenContent::Round1(msg), None)
    }

    fn update(&mut self, msg: ParsedMessage<KeygenContent>) -> Result<bool, TssError> {
        let ParsedMessage { routing, content } = msg;
        let res = match content {
            KeygenContent::Round1(m) => {
                store_message(&mut self.state, 0, &mut self.ctx.temp.r1_msgs, &routing.from, m)
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
        Some(Box::new(Round2::new(self.ctx)))
    }
}
