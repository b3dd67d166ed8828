// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use log::info;

use super::super::messages::KeygenContent;
use super::super::save_data::LocalPartySaveData;
use super::base::KeygenCtx;
use crate::protocols::LocalSecrets;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::ParsedMessage;
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};

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
        let i = self.ctx.party_index();
        let (xi, eddsa_pub) = match (self.ctx.temp.xi.take(), self.ctx.temp.eddsa_pub.take()) {
            (Some(xi), Some(pk)) => (xi, pk),
            _ => {
                return Err(self
                    .ctx
                    .error(ROUND, ErrorKind::MissingPrerequisiteData("xi or public key".into())))
            }
        };

        let local_secrets = LocalSecrets {
            xi,
            share_id: self.ctx.temp.share_id.clone(),
        };
        // xi*G must reproduce our own public share
        let big_xi = local_secrets.public_share(params.curve());
        if self.ctx.temp.big_xj.get(i) != Some(&big_xi) {
            return Err(self.ctx.crypto_error(ROUND, "xi*G does not match this party's public share"));
        }

        let save = LocalPartySaveData {
            local_secrets,
            ks: params.parties().ids().keys(),
            big_xj: std::mem::take(&mut self.ctx.temp.big_xj),
            eddsa_pub,
        };
        info!(
            target: "tss-lib",
            "party {}: keygen finished, public key {}",
            params.party_id(),
            hex::encode(save.eddsa_pub.to_bytes())
        );
        self.ctx.finish(ROUND, save)?;
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

    fn is_terminal(&self) -> bool {
        true
    }

    fn next_round(self: Box<Self>) -> Option<Box<dyn Round<KeygenContent>>> {
        None
    }
}
