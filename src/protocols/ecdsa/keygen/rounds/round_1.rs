// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use log::info;

use super::super::messages::{KGRound1Message, KeygenContent};
use super::super::prepare::LocalPreParams;
use super::base::KeygenCtx;
use super::round_2::Round2;
use crate::common::random::get_random_non_zero_int;
use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::dlnproof;
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

    // Caller-supplied pre-params must carry the DLN secrets. Without any,
    // they are generated here, bounded by the safe prime timeout.
    fn pre_params(&mut self) -> Result<LocalPreParams, TssError> {
        match self.ctx.temp.pre_params.take() {
            Some(pre) if pre.validate_with_proof() => Ok(pre),
            Some(_) => Err(self.ctx.error(
                ROUND,
                ErrorKind::InvalidParameters(
                    "pre-params failed to validate; they may have been saved without the DLN proof secrets".into(),
                ),
            )),
            None => {
                let params = self.ctx.params.clone();
                info!(target: "tss-lib", "party {}: generating local pre-params", params.party_id());
                let mut rng = params.lock_rng();
                LocalPreParams::generate_blocking(
                    params.safe_prime_gen_timeout(),
                    params.concurrency(),
                    params.paillier_modulus_bits(),
                    &mut **rng,
                )
                .map_err(|e| self.ctx.error(ROUND, e.into()))
            }
        }
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
        let pre = self.pre_params()?;
        let dln_iters = params.proof_params().dln_iterations;

        let mut rng = params.lock_rng();
        // 1. calculate "partial" key share ui
        let ui = get_random_non_zero_int(&mut **rng, curve.order());

        // 2. compute the vss shares
        let (vs, shares) = vss::create(curve, params.threshold(), &ui, &ids, &mut **rng)
            .map_err(|e| self.ctx.crypto_error(ROUND, e))?;

        // 3. make commitment -> (C, D)
        let p_g_flat = flatten_ec_points(&vs).map_err(|e| self.ctx.crypto_error(ROUND, e))?;
        let cmt = HashCommitDecommit::new(&mut **rng, &p_g_flat);

        // 4. prove h2 = h1^alpha and h1 = h2^beta
        let dln_proof_1 = dlnproof::Proof::new(
            &pre.h1i,
            &pre.h2i,
            &pre.alpha,
            &pre.p,
            &pre.q,
            &pre.n_tilde_i,
            dln_iters,
            &mut **rng,
        )
        .map_err(|e| self.ctx.crypto_error(ROUND, e))?;
        let dln_proof_2 = dlnproof::Proof::new(
            &pre.h2i,
            &pre.h1i,
            &pre.beta,
            &pre.p,
            &pre.q,
            &pre.n_tilde_i,
            dln_iters,
            &mut **rng,
        )
        .map_err(|e| self.ctx.crypto_error(ROUND, e))?;
        drop(rng);

        let ssid = session_id(&params, ROUND).map_err(|k| self.ctx.error(ROUND, k))?;
        let paillier_pk = pre.paillier_sk.public_key.clone();
        let msg = KGRound1Message::new(
            &cmt.c,
            &paillier_pk,
            &pre.n_tilde_i,
            &pre.h1i,
            &pre.h2i,
            &dln_proof_1,
            &dln_proof_2,
        )
        .map_err(|e| self.ctx.crypto_error(ROUND, e))?;

        let temp = &mut self.ctx.temp;
        temp.ssid = ssid;
        temp.share_id = ids[i].clone();
        temp.vs = vs;
        temp.shares = shares;
        temp.de_commit_poly_g = cmt.d;
        temp.kgcs[i] = Some(cmt.c);
        temp.paillier_pks[i] = Some(paillier_pk);
        temp.n_tilde_j[i] = Some(pre.n_tilde_i.clone());
        temp.h1j[i] = Some(pre.h1i.clone());
        temp.h2j[i] = Some(pre.h2i.clone());
        temp.r1_msgs[i] = Some(msg.clone());
        temp.pre_params = Some(pre);

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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::tss::curve::CurveName;
    use crate::tss::params::{Parameters, ProofParams};
    use crate::tss::party_id::{generate_test_party_ids, sort_party_ids};
    use crate::tss::peers::PeerContext;

    #[test]
    fn test_start_twice_sends_once() {
        let mut rng = StdRng::seed_from_u64(41);
        let ids = sort_party_ids(generate_test_party_ids(3, &mut rng));
        let me = ids.as_slice()[2].clone();
        let params = Parameters::new(CurveName::Secp256k1, PeerContext::new(ids), me, 3, 1)
            .with_rng(StdRng::seed_from_u64(42))
            .with_paillier_modulus_bits(512)
            .with_proof_params(ProofParams {
                dln_iterations: 8,
                mod_iterations: 8,
                paillier_proof_iterations: 4,
            });
        let pre = LocalPreParams::generate(512, &mut rng).unwrap();
        let (out, out_rx) = channel();
        let (end, _) = channel();
        let mut round = Round1::new(KeygenCtx::new(Arc::new(params), Some(pre), out, end));

        round.start().unwrap();
        assert!(!round.can_proceed());
        assert_eq!(round.waiting_for().len(), 2);
        let err = round.start().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::AlreadyStarted);
        assert_eq!(err.round(), ROUND);

        let first = out_rx.try_recv().unwrap();
        assert!(first.is_broadcast());
        assert!(out_rx.try_recv().is_err());
        assert!(round.ctx.temp.pre_params.is_some());
    }
}
