// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use log::info;

use super::super::messages::KeygenContent;
use super::base::KeygenCtx;
use crate::tss::error::TssError;
use crate::tss::message::ParsedMessage;
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};

const ROUND: u32 = 5;

pub(crate) struct Round5 {
    ctx: KeygenCtx,
    state: RoundState,
}

impl Round5 {
    pub fn new(ctx: KeygenCtx) -> Self {
        let state = RoundState::new(ROUND, ctx.params.party_count());
        Round5 { ctx, state }
    }
}

impl Round<KeygenContent> for Round5 {
    fn number(&self) -> u32 {
        ROUND
    }

    fn start(&mut self) -> Result<(), TssError> {
        self.state
            .start(self.ctx.party_index())
            .map_err(|k| self.ctx.error(ROUND, k))?;

        let save = match self.ctx.save.as_ref() {
            Some(save) if !save.is_empty() => save,
            _ => return Err(self.ctx.missing(ROUND, "save data")),
        };
        save.check_consistency()
            .map_err(|reason| self.ctx.crypto_error(ROUND, format!("save data is inconsistent: {}", reason)))?;

        info!(
            target: "tss-lib",
            "party {}: keygen finished, public key {}",
            self.ctx.params.party_id(),
            hex::encode(save.ecdsa_pub.to_bytes())
        );
        self.ctx.finish(ROUND, save.clone())?;
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
