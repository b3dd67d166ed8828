// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

#![allow(dead_code)]

use std::sync::mpsc::Receiver;

use rand::rngs::StdRng;
use rand::SeedableRng;

use tss_keygen::tss::{generate_test_party_ids, sort_party_ids, Message, Party, SortedPartyIDs, TssError};

pub const TEST_PARTICIPANTS: usize = 3;
pub const TEST_THRESHOLD: usize = 2;

pub fn test_party_ids(count: usize, seed: u64) -> SortedPartyIDs {
    let mut rng = StdRng::seed_from_u64(seed);
    sort_party_ids(generate_test_party_ids(count, &mut rng))
}

/// In-process transport: delivers every outbound message by routing and
/// drives each party until nothing moves.
pub struct Router<P: Party> {
    pub parties: Vec<P>,
    outs: Vec<Receiver<Message>>,
    delivered: usize,
}

impl<P: Party> Router<P> {
    pub fn new(parties: Vec<P>, outs: Vec<Receiver<Message>>) -> Self {
        Router {
            parties,
            outs,
            delivered: 0,
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn run(&mut self) -> Result<(), TssError> {
        self.run_with(|_| {})
    }

    /// Like `run`, but `tamper` sees every message before it is delivered.
    pub fn run_with<F: FnMut(&mut Message)>(&mut self, mut tamper: F) -> Result<(), TssError> {
        for party in self.parties.iter_mut() {
            party.start()?;
        }
        loop {
            let mut queue = Vec::new();
            for out in &self.outs {
                while let Ok(msg) = out.try_recv() {
                    queue.push(msg);
                }
            }
            let mut progressed = !queue.is_empty();
            for mut msg in queue {
                tamper(&mut msg);
                self.deliver(&msg)?;
            }
            for party in self.parties.iter_mut() {
                while party.proceed()? {
                    progressed = true;
                }
            }
            if !progressed {
                return Ok(());
            }
        }
    }

    fn deliver(&mut self, msg: &Message) -> Result<(), TssError> {
        let from = msg.from();
        for party in self.parties.iter_mut() {
            let dest = party.party_id().clone();
            if dest.key == from.key {
                continue;
            }
            let addressed = match &msg.routing.to {
                None => true,
                Some(to) => to.iter().any(|p| p.key == dest.key),
            };
            if addressed {
                party.update_from_bytes(&msg.wire_bytes, from, msg.is_broadcast())?;
                self.delivered += 1;
            }
        }
        Ok(())
    }
}
