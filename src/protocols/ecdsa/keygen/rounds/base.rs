// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt::Display;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::super::messages::KeygenContent;
use super::super::prepare::LocalPreParams;
use super::super::save_data::LocalPartySaveData;
use super::super::temp::LocalTempData;
use super::super::TASK_NAME;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::Message;
use crate::tss::params::Parameters;
use crate::tss::party_id::PartyID;

/// Session state handed from each round to the next.
pub(crate) struct KeygenCtx {
    pub params: Arc<Parameters>,
    pub temp: LocalTempData,
    pub save: Option<LocalPartySaveData>,
    out: Sender<Message>,
    end: Sender<LocalPartySaveData>,
}

impl KeygenCtx {
    pub fn new(
        params: Arc<Parameters>,
        pre_params: Option<LocalPreParams>,
        out: Sender<Message>,
        end: Sender<LocalPartySaveData>,
    ) -> Self {
        let temp = LocalTempData::new(params.party_count(), pre_params);
        KeygenCtx {
            params,
            temp,
            save: None,
            out,
            end,
        }
    }

    pub fn party_index(&self) -> usize {
        self.params.party_index()
    }

    pub fn error(&self, round: u32, kind: ErrorKind) -> TssError {
        TssError::new(kind, TASK_NAME, round, Some(self.params.party_id().clone()))
    }

    pub fn crypto_error(&self, round: u32, err: impl Display) -> TssError {
        self.error(round, ErrorKind::Crypto(err.to_string()))
    }

    pub fn missing(&self, round: u32, what: &str) -> TssError {
        self.error(round, ErrorKind::MissingPrerequisiteData(what.to_string()))
    }

    /// Emits `content` to `to`, or to everyone when `to` is `None`.
    pub fn send(&self, round: u32, content: KeygenContent, to: Option<Vec<PartyID>>) -> Result<(), TssError> {
        let msg = Message::new(self.params.party_id().clone(), to, &content);
        self.out.send(msg).map_err(|_| self.error(round, ErrorKind::Channel("out")))
    }

    pub fn finish(&self, round: u32, save: LocalPartySaveData) -> Result<(), TssError> {
        self.end.send(save).map_err(|_| self.error(round, ErrorKind::Channel("end")))
    }
}
