// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use super::super::messages::{KGRound3Message, KeygenContent};
use super::super::temp::LocalTempData;
use super::base::KeygenCtx;
use super::round_4::Round4;
use crate::common::int::ModInt;
use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::ecpoint::{un_flatten_ec_points, ECPoint};
use crate::crypto::vss::{Share, Vs};
use crate::protocols::{proof_session, store_message};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::params::Parameters;
use crate::tss::party_id::PartyID;
use crate::tss::round::{Round, RoundState};
use crate::tss::verifier::{failures_to_error, verify_peers};

const ROUND: u32 = 3;

pub(crate) struct Round3 {
    ctx: KeygenCtx,
    state: RoundState,
}

impl Round3 {
    pub fn new(ctx: KeygenCtx) -> Self {
        let state = RoundState::new(ROUND, ctx.params.party_count());
        Round3 { ctx, state }
    }
}

// Opens Pj's commitment and checks its MOD proof, our share against its
// polynomial, and its FAC proof. Returns Pj's polynomial points.
fn verify_peer(params: &Parameters, temp: &LocalTempData, j: usize) -> Result<Vs, String> {
    let curve = params.curve();
    let threshold = params.threshold();
    let context_j = proof_session(&temp.ssid, j);

    let kgc_j = temp.kgcs[j].clone().ok_or("missing commitment")?;
    let r2msg2 = temp.r2_msg2s[j].as_ref().ok_or("missing de-commitment")?;
    let r2msg1 = temp.r2_msg1s[j].as_ref().ok_or("missing share")?;
    let paillier_pk_j = temp.paillier_pks[j].as_ref().ok_or("missing paillier key")?;

    let cmt_de_cmt = HashCommitDecommit::from_parts(kgc_j, r2msg2.unmarshal_de_commitment());
    let flat_poly_gs = cmt_de_cmt.decommit().ok_or("de-commitment verify failed")?;
    let pj_vs = un_flatten_ec_points(curve, &flat_poly_gs).map_err(|e| format!("de-committed points: {}", e))?;
    if pj_vs.len() != threshold + 1 {
        return Err(format!("de-commitment has {} points, want {}", pj_vs.len(), threshold + 1));
    }

    if !params.no_proof_mod() {
        let iters = params.proof_params().mod_iterations;
        let ok = r2msg2
            .unmarshal_mod_proof(iters)
            .map_or(false, |proof| proof.verify(&context_j, &paillier_pk_j.n, iters));
        if !ok {
            return Err("modProof verify failed".into());
        }
    }

    let pj_share = Share {
        threshold,
        id: temp.share_id.clone(),
        share: r2msg1.unmarshal_share(),
    };
    if !pj_share.verify(curve, threshold, &pj_vs) {
        return Err("vss verify failed".into());
    }

    if !params.no_proof_fac() {
        let pre = temp.pre_params.as_ref().ok_or("missing pre-params")?;
        let ok = r2msg1.unmarshal_fac_proof().map_or(false, |proof| {
            proof.verify(
                &context_j,
                curve.order(),
                &paillier_pk_j.n,
                &pre.n_tilde_i,
                &pre.h1i,
                &pre.h2i,
            )
        });
        if !ok {
            return Err("facProof verify failed".into());
        }
    }
    Ok(pj_vs)
}

impl Round<KeygenContent> for Round3 {
    fn number(&self) -> u32 {
        ROUND
    }

    fn start(&mut self) -> Result<(), TssError> {
        self.state
            .start(self.ctx.party_index())
            .map_err(|k| self.ctx.error(ROUND, k))?;

        let params = self.ctx.params.clone();
        let curve = params.curve();
        let q = curve.order();
        let threshold = params.threshold();
        let i = self.ctx.party_index();

        // 1. calculate xi
        let mut xi = self.ctx.temp.shares[i].share.clone();
        for j in 0..params.party_count() {
            if j == i {
                continue;
            }
            match self.ctx.temp.r2_msg1s[j].as_ref() {
                Some(msg) => xi += msg.unmarshal_share(),
                None => return Err(self.ctx.missing(ROUND, "round 2 share")),
            }
        }
        let xi = xi.mod_floor(q);

        // 2. verify every peer's de-commitment, share and proofs
        let temp = &self.ctx.temp;
        let pj_vss = match verify_peers(&params, |j| verify_peer(&params, temp, j)) {
            Ok(vss) => vss,
            Err(failures) => {
                let kind = failures_to_error(failures).unwrap_or(ErrorKind::Crypto("empty culprit list".into()));
                return Err(self.ctx.error(ROUND, kind));
            }
        };

        // 3. Vc = sum over all parties of their polynomial points
        let mut vc = self.ctx.temp.vs.clone();
        for pj_vs in pj_vss.iter().flatten() {
            for (c, vc_c) in vc.iter_mut().enumerate() {
                *vc_c = vc_c.add(&pj_vs[c]).map_err(|e| self.ctx.crypto_error(ROUND, e))?;
            }
        }

        // 4. compute Xj = sum_c Vc[c] * kj^c for each Pj
        let mod_q = ModInt::new(q.clone());
        let mut big_xj = Vec::with_capacity(params.party_count());
        for pj in params.parties().ids() {
            let mut x_j = vc[0].clone();
            let mut z = BigInt::one();
            for vc_c in vc.iter().take(threshold + 1).skip(1) {
                z = mod_q.mul(&z, &pj.key);
                x_j = x_j.add(&vc_c.scalar_mul(&z)).map_err(|e| self.ctx.crypto_error(ROUND, e))?;
            }
            big_xj.push(x_j);
        }

        // 5. compute and SAVE the ECDSA public key `y`
        let ecdsa_pub: ECPoint = vc[0].clone();
        if ecdsa_pub.is_identity() {
            return Err(self.ctx.crypto_error(ROUND, "public key is the identity"));
        }
        debug!(target: "tss-lib", "party {} public key: {:?}", params.party_id(), ecdsa_pub);

        // 6. BROADCAST paillier proof for Pi
        let pre = match self.ctx.temp.pre_params.as_ref() {
            Some(pre) => pre,
            None => return Err(self.ctx.missing(ROUND, "pre-params")),
        };
        let proof = pre
            .paillier_sk
            .proof(&self.ctx.temp.share_id, &ecdsa_pub, params.proof_params().paillier_proof_iterations)
            .map_err(|e| self.ctx.crypto_error(ROUND, e))?;
        let msg = KGRound3Message::new(&proof);

        let temp = &mut self.ctx.temp;
        temp.xi = Some(xi);
        temp.big_xj = big_xj;
        temp.ecdsa_pub = Some(ecdsa_pub);
        temp.r3_msgs[i] = Some(msg.clone());
        self.ctx.send(ROUND, KeygenContent::Round3(msg), None)
    }

    fn update(&mut self, msg: ParsedMessage<KeygenContent>) -> Result<bool, TssError> {
        let ParsedMessage { routing, content } = msg;
        let res = match content {
            KeygenContent::Round3(m) => {
                store_message(&mut self.state, 0, &mut self.ctx.temp.r3_msgs, &routing.from, m)
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
        Some(Box::new(Round4::new(self.ctx)))
    }
}
