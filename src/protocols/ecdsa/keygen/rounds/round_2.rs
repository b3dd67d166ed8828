// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::collections::HashSet;

use num_bigint::BigInt;

use super::super::messages::{KGRound2Message1, KGRound2Message2, KeygenContent};
use super::base::KeygenCtx;
use super::round_3::Round3;
use crate::crypto::facproof::ProofFac;
use crate::crypto::modproof::ProofMod;
use crate::protocols::{proof_session, store_message};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};
use crate::tss::verifier::{failures_to_error, verify_peers};

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

    // Checks that need no proof verification, in array order. h1 and h2
    // values must be unique across all parties, the local party included.
    fn screen_round_1(&self) -> Vec<Option<String>> {
        let params = &self.ctx.params;
        let temp = &self.ctx.temp;
        let i = self.ctx.party_index();
        let bits = params.paillier_modulus_bits() as u64;

        let mut h1_h2_set: HashSet<BigInt> = HashSet::with_capacity(params.party_count() * 2);
        h1_h2_set.extend(temp.h1j[i].iter().cloned());
        h1_h2_set.extend(temp.h2j[i].iter().cloned());

        let mut failures = vec![None; params.party_count()];
        for (j, slot) in failures.iter_mut().enumerate() {
            if j == i {
                continue;
            }
            let msg = match temp.r1_msgs[j].as_ref() {
                Some(msg) => msg,
                None => {
                    *slot = Some("missing round 1 message".to_string());
                    continue;
                }
            };
            let (h1j, h2j) = (msg.unmarshal_h1(), msg.unmarshal_h2());
            let n_tilde_j = msg.unmarshal_n_tilde();
            let paillier_n = msg.unmarshal_paillier_pk().n;
            *slot = if h1j == h2j {
                Some("h1j and h2j were equal for this party".to_string())
            } else if n_tilde_j.bits() != bits {
                Some(format!("got NTildej with {} bits, want {}", n_tilde_j.bits(), bits))
            } else if paillier_n.bits() != bits {
                Some(format!("got paillier modulus with {} bits, want {}", paillier_n.bits(), bits))
            } else if !h1_h2_set.insert(h1j) || !h1_h2_set.insert(h2j) {
                Some("h1j or h2j was already used by another party".to_string())
            } else {
                None
            };
        }
        failures
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

        // 1. verify the round 1 messages: shapes, uniqueness and both dln proofs
        let screened = self.screen_round_1();
        let dln_iters = params.proof_params().dln_iterations;
        let temp = &self.ctx.temp;
        let verified = verify_peers(&params, |j| {
            if let Some(reason) = &screened[j] {
                return Err(reason.clone());
            }
            let msg = temp.r1_msgs[j].as_ref().ok_or("missing round 1 message")?;
            let (h1j, h2j, n_tilde_j) = (msg.unmarshal_h1(), msg.unmarshal_h2(), msg.unmarshal_n_tilde());
            let dln_1_ok = msg
                .unmarshal_dln_proof_1(dln_iters)
                .map_or(false, |proof| proof.verify(&h1j, &h2j, &n_tilde_j, dln_iters));
            if !dln_1_ok {
                return Err("dln proof 1 verify failed".to_string());
            }
            let dln_2_ok = msg
                .unmarshal_dln_proof_2(dln_iters)
                .map_or(false, |proof| proof.verify(&h2j, &h1j, &n_tilde_j, dln_iters));
            if !dln_2_ok {
                return Err("dln proof 2 verify failed".to_string());
            }
            Ok(())
        });
        if let Err(failures) = verified {
            let kind = failures_to_error(failures).unwrap_or(ErrorKind::Crypto("empty culprit list".into()));
            return Err(self.ctx.error(ROUND, kind));
        }

        // 2. keep NTildej, h1j, h2j, the paillier keys and the commitments
        for j in 0..params.party_count() {
            if j == i {
                continue;
            }
            let msg = match self.ctx.temp.r1_msgs[j].take() {
                Some(msg) => msg,
                None => return Err(self.ctx.missing(ROUND, "round 1 message")),
            };
            let temp = &mut self.ctx.temp;
            temp.paillier_pks[j] = Some(msg.unmarshal_paillier_pk());
            temp.n_tilde_j[j] = Some(msg.unmarshal_n_tilde());
            temp.h1j[j] = Some(msg.unmarshal_h1());
            temp.h2j[j] = Some(msg.unmarshal_h2());
            temp.kgcs[j] = Some(msg.unmarshal_commitment());
        }

        let pre = match self.ctx.temp.pre_params.as_ref() {
            Some(pre) => pre,
            None => return Err(self.ctx.missing(ROUND, "pre-params")),
        };
        let sk = &pre.paillier_sk;
        let context_i = proof_session(&self.ctx.temp.ssid, i);
        let q = params.curve().order();

        // 3. p2p send share ij to Pj, with a proof that N_i has no small factors
        let mut share_msgs = Vec::with_capacity(params.party_count());
        {
            let mut rng = params.lock_rng();
            for (j, pj) in params.parties().ids().iter().enumerate() {
                let share = &self.ctx.temp.shares[j].share;
                if j == i {
                    share_msgs.push((pj.clone(), KGRound2Message1::new(share, None)));
                    continue;
                }
                let fac_proof = if params.no_proof_fac() {
                    None
                } else {
                    let temp = &self.ctx.temp;
                    let (n_tilde_j, h1j, h2j) = match (&temp.n_tilde_j[j], &temp.h1j[j], &temp.h2j[j]) {
                        (Some(n), Some(h1), Some(h2)) => (n, h1, h2),
                        _ => return Err(self.ctx.missing(ROUND, "peer ring-pedersen parameters")),
                    };
                    let proof = ProofFac::new(&context_i, q, &sk.public_key.n, n_tilde_j, h1j, h2j, &sk.p, &sk.q, &mut **rng)
                        .map_err(|e| self.ctx.crypto_error(ROUND, e))?;
                    Some(proof)
                };
                share_msgs.push((pj.clone(), KGRound2Message1::new(share, fac_proof.as_ref())));
            }
        }

        // 4. BROADCAST de-commitments of Shamir poly*G with a proof that N_i is a Blum modulus
        let mod_proof = if params.no_proof_mod() {
            None
        } else {
            let mut rng = params.lock_rng();
            let proof = ProofMod::new(
                &context_i,
                &sk.public_key.n,
                &sk.p,
                &sk.q,
                params.proof_params().mod_iterations,
                &mut **rng,
            )
            .map_err(|e| self.ctx.crypto_error(ROUND, e))?;
            Some(proof)
        };
        let decommit_msg = KGRound2Message2::new(&self.ctx.temp.de_commit_poly_g, mod_proof.as_ref());

        for (j, (pj, msg)) in share_msgs.into_iter().enumerate() {
            if j == i {
                self.ctx.temp.r2_msg1s[i] = Some(msg);
                continue;
            }
            self.ctx.send(ROUND, KeygenContent::Round2Message1(msg), Some(vec![pj]))?;
        }
        self.ctx.temp.r2_msg2s[i] = Some(decommit_msg.clone());
        self.ctx.send(ROUND, KeygenContent::Round2Message2(decommit_msg), None)
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
