// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::sync::Arc;

use log::{debug, error, info};

use super::error::{ErrorKind, TssError};
use super::message::{MessageContent, ParsedMessage};
use super::params::Parameters;
use super::party_id::PartyID;
use super::round::{validate_sender, Round};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartyState {
    Idle,
    Running,
    Complete,
    Failed,
}

/// Drives a sequence of rounds for one local party.
///
/// Each `update` stores one message and advances at most one round.
/// `proceed` advances a round that became ready without a new message.
/// Messages for later rounds are buffered and replayed when their round
/// starts. Any error other than a rejected message is fatal.
pub struct BaseParty<C: MessageContent> {
    params: Arc<Parameters>,
    task: &'static str,
    state: PartyState,
    first_round: Option<Box<dyn Round<C>>>,
    round: Option<Box<dyn Round<C>>>,
    pending: Vec<ParsedMessage<C>>,
}

impl<C: MessageContent> BaseParty<C> {
    pub fn new(params: Arc<Parameters>, task: &'static str, first_round: Box<dyn Round<C>>) -> Self {
        BaseParty {
            params,
            task,
            state: PartyState::Idle,
            first_round: Some(first_round),
            round: None,
            pending: Vec::new(),
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn task(&self) -> &'static str {
        self.task
    }

    pub fn state(&self) -> PartyState {
        self.state
    }

    pub fn running(&self) -> bool {
        self.state == PartyState::Running
    }

    pub fn round_number(&self) -> Option<u32> {
        self.round.as_ref().map(|r| r.number())
    }

    pub fn waiting_for(&self) -> Vec<PartyID> {
        self.round.as_ref().map(|r| r.waiting_for()).unwrap_or_default()
    }

    pub fn wrap_error(&self, kind: ErrorKind) -> TssError {
        TssError::new(
            kind,
            self.task,
            self.round_number().unwrap_or(0),
            Some(self.params.party_id().clone()),
        )
    }

    pub fn start(&mut self) -> Result<(), TssError> {
        match self.state {
            PartyState::Idle => {}
            PartyState::Running => return Err(self.wrap_error(ErrorKind::AlreadyStarted)),
            PartyState::Complete | PartyState::Failed => return Err(self.wrap_error(ErrorKind::NotRunning)),
        }
        let mut round = match self.first_round.take() {
            Some(round) => round,
            None => return Err(self.wrap_error(ErrorKind::NotRunning)),
        };
        if let Err(err) = round.start() {
            return Err(self.fail(err));
        }
        info!(target: "tss-lib", "party {}: {} round {} started", self.params.party_id(), self.task, round.number());
        self.round = Some(round);
        self.state = PartyState::Running;
        self.check_complete();
        Ok(())
    }

    pub fn update(&mut self, msg: ParsedMessage<C>) -> Result<bool, TssError> {
        if self.state != PartyState::Running {
            return Err(self.wrap_error(ErrorKind::NotRunning));
        }
        let parties = self.params.parties().ids();
        validate_sender(parties, self.params.party_index(), msg.from()).map_err(|kind| self.wrap_error(kind))?;
        if !msg.validate_basic() {
            return Err(self.wrap_error(ErrorKind::MalformedMessage {
                from: msg.from().clone(),
                reason: format!("{} failed basic validation", msg.content.kind()),
            }));
        }
        debug!(target: "tss-lib", "party {} received {}", self.params.party_id(), msg);

        let current = self.round_number().unwrap_or(0);
        let msg_round = msg.round_number();
        if msg_round < current {
            return Err(self.wrap_error(ErrorKind::DuplicateMessage(msg.from().clone())));
        }
        if msg_round > current {
            let seen = self.pending.iter().any(|m| {
                m.from().key == msg.from().key
                    && m.round_number() == msg_round
                    && m.content.kind() == msg.content.kind()
            });
            if seen {
                return Err(self.wrap_error(ErrorKind::DuplicateMessage(msg.from().clone())));
            }
            debug!(target: "tss-lib", "party {} buffered early {}", self.params.party_id(), msg);
            self.pending.push(msg);
            return Ok(true);
        }

        let result = match self.round.as_mut() {
            Some(round) => round.update(msg),
            None => return Err(self.wrap_error(ErrorKind::NotRunning)),
        };
        let accepted = result.map_err(|err| self.fail(err))?;
        self.proceed()?;
        Ok(accepted)
    }

    pub fn update_from_bytes(&mut self, wire_bytes: &[u8], from: &PartyID, is_broadcast: bool) -> Result<bool, TssError> {
        if self.state != PartyState::Running {
            return Err(self.wrap_error(ErrorKind::NotRunning));
        }
        let msg = ParsedMessage::from_wire(wire_bytes, from, is_broadcast)
            .map_err(|err| self.wrap_error(ErrorKind::Wire(err.to_string())))?;
        self.update(msg)
    }

    /// Advances one round if the current one is complete. Returns whether
    /// it advanced.
    pub fn proceed(&mut self) -> Result<bool, TssError> {
        if self.state != PartyState::Running {
            return Ok(false);
        }
        match self.round.as_ref() {
            Some(round) if round.can_proceed() => {}
            _ => return Ok(false),
        }
        self.advance()?;
        Ok(true)
    }

    fn advance(&mut self) -> Result<(), TssError> {
        let round = match self.round.take() {
            Some(round) => round,
            None => return Err(self.wrap_error(ErrorKind::NotRunning)),
        };
        let mut next = match round.next_round() {
            Some(next) => next,
            None => {
                self.state = PartyState::Complete;
                info!(target: "tss-lib", "party {}: {} finished!", self.params.party_id(), self.task);
                return Ok(());
            }
        };
        if let Err(err) = next.start() {
            return Err(self.fail(err));
        }
        let number = next.number();
        info!(target: "tss-lib", "party {}: {} round {} started", self.params.party_id(), self.task, number);

        let (ready, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|m| m.round_number() == number);
        self.pending = rest;
        for msg in ready {
            debug!(target: "tss-lib", "party {} replaying {}", self.params.party_id(), msg);
            if let Err(err) = next.update(msg) {
                self.round = Some(next);
                return Err(self.fail(err));
            }
        }
        self.round = Some(next);
        self.check_complete();
        Ok(())
    }

    fn check_complete(&mut self) {
        if let Some(round) = self.round.as_ref() {
            if round.is_terminal() && round.can_proceed() {
                self.state = PartyState::Complete;
                info!(target: "tss-lib", "party {}: {} finished!", self.params.party_id(), self.task);
            }
        }
    }

    // Rejected messages leave the session as it was; anything else ends it.
    fn fail(&mut self, err: TssError) -> TssError {
        if err.kind().is_intake_rejection() {
            debug!(target: "tss-lib", "party {} rejected a message: {}", self.params.party_id(), err);
        } else {
            self.state = PartyState::Failed;
            error!(target: "tss-lib", "party {}: {}", self.params.party_id(), err);
        }
        err
    }
}

/// The transport-facing surface of a local party.
pub trait Party {
    type Content: MessageContent;

    fn base(&self) -> &BaseParty<Self::Content>;

    fn base_mut(&mut self) -> &mut BaseParty<Self::Content>;

    fn start(&mut self) -> Result<(), TssError> {
        self.base_mut().start()
    }

    fn update(&mut self, msg: ParsedMessage<Self::Content>) -> Result<bool, TssError> {
        self.base_mut().update(msg)
    }

    fn update_from_bytes(&mut self, wire_bytes: &[u8], from: &PartyID, is_broadcast: bool) -> Result<bool, TssError> {
        self.base_mut().update_from_bytes(wire_bytes, from, is_broadcast)
    }

    fn proceed(&mut self) -> Result<bool, TssError> {
        self.base_mut().proceed()
    }

    fn running(&self) -> bool {
        self.base().running()
    }

    fn state(&self) -> PartyState {
        self.base().state()
    }

    fn waiting_for(&self) -> Vec<PartyID> {
        self.base().waiting_for()
    }

    fn round_number(&self) -> Option<u32> {
        self.base().round_number()
    }

    fn party_id(&self) -> &PartyID {
        self.base().params().party_id()
    }
}
