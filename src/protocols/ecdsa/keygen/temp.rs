// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_traits::Zero;

use super::messages::{KGRound1Message, KGRound2Message1, KGRound2Message2, KGRound3Message};
use super::prepare::LocalPreParams;
use crate::crypto::commitments::{HashCommitment, HashDeCommitment};
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::paillier;
use crate::crypto::vss::{Share, Vs};

/// Round scratch data. Dropped with the last round.
pub(crate) struct LocalTempData {
    // received messages
    pub r1_msgs: Vec<Option<KGRound1Message>>,
    pub r2_msg1s: Vec<Option<KGRound2Message1>>,
    pub r2_msg2s: Vec<Option<KGRound2Message2>>,
    pub r3_msgs: Vec<Option<KGRound3Message>>,

    // temp data (thrown away after keygen)
    pub pre_params: Option<LocalPreParams>,
    pub share_id: BigInt,
    pub vs: Vs,
    pub shares: Vec<Share>,
    pub de_commit_poly_g: HashDeCommitment,
    pub ssid: Vec<u8>,

    // peers' round 1 data, kept once the round 2 checks pass
    pub kgcs: Vec<Option<HashCommitment>>,
    pub paillier_pks: Vec<Option<paillier::PublicKey>>,
    pub n_tilde_j: Vec<Option<BigInt>>,
    pub h1j: Vec<Option<BigInt>>,
    pub h2j: Vec<Option<BigInt>>,

    // round 3 results
    pub xi: Option<BigInt>,
    pub big_xj: Vec<ECPoint>,
    pub ecdsa_pub: Option<ECPoint>,
}

impl LocalTempData {
    pub fn new(party_count: usize, pre_params: Option<LocalPreParams>) -> Self {
        LocalTempData {
            r1_msgs: vec![None; party_count],
            r2_msg1s: vec![None; party_count],
            r2_msg2s: vec![None; party_count],
            r3_msgs: vec![None; party_count],
            pre_params,
            share_id: BigInt::zero(),
            vs: Vec::new(),
            shares: Vec::new(),
            de_commit_poly_g: Vec::new(),
            ssid: Vec::new(),
            kgcs: vec![None; party_count],
            paillier_pks: vec![None; party_count],
            n_tilde_j: vec![None; party_count],
            h1j: vec![None; party_count],
            h2j: vec![None; party_count],
            xi: None,
            big_xj: Vec::new(),
            ecdsa_pub: None,
        }
    }
}
