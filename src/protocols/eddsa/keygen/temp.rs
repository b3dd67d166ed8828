// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_traits::Zero;

use super::messages::{KGRound1Message, KGRound2Message1, KGRound2Message2, KGRound3Message};
use crate::crypto::commitments::HashDeCommitment;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::vss::{Share, Vs};

pub(crate) struct LocalTempData {
    pub r1_msgs: Vec<Option<KGRound1Message>>,
    pub r2_msg1s: Vec<Option<KGRound2Message1>>,
    pub r2_msg2s: Vec<Option<KGRound2Message2>>,
    pub r3_msgs: Vec<Option<KGRound3Message>>,

    pub ui: BigInt,
    pub share_id: BigInt,
    pub vs: Vs,
    pub shares: Vec<Share>,
    pub de_commit_poly_g: HashDeCommitment,
    pub ssid: Vec<u8>,

    pub xi: Option<BigInt>,
    pub big_xj: Vec<ECPoint>,
    pub eddsa_pub: Option<ECPoint>,
}

impl LocalTempData {
    pub fn new(party_count: usize) -> Self {
        LocalTempData {
            r1_msgs: vec![None; party_count],
            r2_msg1s: vec![None; party_count],
            r2_msg2s: vec![None; party_count],
            r3_msgs: vec![None; party_count],
            ui: BigInt::zero(),
            share_id: BigInt::zero(),
            vs: Vec::new(),
            shares: Vec::new(),
            de_commit_poly_g: Vec::new(),
            ssid: Vec::new(),
            xi: None,
            big_xj: Vec::new(),
            eddsa_pub: None,
        }
    }
}
