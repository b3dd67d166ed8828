// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use super::prepare::LocalPreParams;
use crate::protocols::LocalSecrets;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::paillier;
use crate::storage::KeygenSaveData;
use crate::tss::curve::CurveName;
use crate::tss::error::ErrorKind;
use crate::tss::party_id::SortedPartyIDs;

/// Everything a party keeps from key generation. The vectors are indexed
/// by array index in the sorted party list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPartySaveData {
    pub local_pre_params: LocalPreParams,
    pub local_secrets: LocalSecrets,

    pub ks: Vec<BigInt>,
    pub n_tilde_j: Vec<BigInt>,
    pub h1j: Vec<BigInt>,
    pub h2j: Vec<BigInt>,

    /// Public share points `xj*G`, used to check partial signatures.
    pub big_xj: Vec<ECPoint>,
    pub paillier_pks: Vec<paillier::PublicKey>,

    pub ecdsa_pub: ECPoint,
}

impl LocalPartySaveData {
    /// Position of this party's own key in `ks`.
    pub fn original_index(&self) -> Option<usize> {
        self.ks.iter().position(|k| k == &self.local_secrets.share_id)
    }

    /// Checks that the secret share and the public material agree.
    pub fn check_consistency(&self) -> Result<(), String> {
        let n = self.ks.len();
        if n == 0 {
            return Err("no parties".into());
        }
        if [self.n_tilde_j.len(), self.h1j.len(), self.h2j.len(), self.big_xj.len(), self.paillier_pks.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err("per-party vectors differ in length".into());
        }
        let curve = self.ecdsa_pub.curve();
        let xi = &self.local_secrets.xi;
        if !xi.is_positive() || xi >= curve.order() {
            return Err("xi is out of range".into());
        }
        if self.ecdsa_pub.is_identity() {
            return Err("public key is the identity".into());
        }
        let i = self.original_index().ok_or("share id is not among ks")?;
        if self.local_secrets.public_share(curve) != self.big_xj[i] {
            return Err("xi*G does not match this party's public share".into());
        }
        if self.paillier_pks[i] != self.local_pre_params.paillier_sk.public_key {
            return Err("own paillier key does not match the pre-params".into());
        }
        Ok(())
    }

    /// The save data restricted to `sorted_ids`, for example a signing
    /// quorum. Every id must be among `ks`.
    pub fn subset(&self, sorted_ids: &SortedPartyIDs) -> Result<Self, ErrorKind> {
        let mut out = LocalPartySaveData {
            local_pre_params: self.local_pre_params.clone(),
            local_secrets: self.local_secrets.clone(),
            ks: Vec::with_capacity(sorted_ids.len()),
            n_tilde_j: Vec::with_capacity(sorted_ids.len()),
            h1j: Vec::with_capacity(sorted_ids.len()),
            h2j: Vec::with_capacity(sorted_ids.len()),
            big_xj: Vec::with_capacity(sorted_ids.len()),
            paillier_pks: Vec::with_capacity(sorted_ids.len()),
            ecdsa_pub: self.ecdsa_pub.clone(),
        };
        for id in sorted_ids {
            let j = self.ks.iter().position(|k| k == &id.key).ok_or_else(|| {
                ErrorKind::InvalidParameters(format!("party {} is not in the save data", id))
            })?;
            out.ks.push(self.ks[j].clone());
            out.n_tilde_j.push(self.n_tilde_j[j].clone());
            out.h1j.push(self.h1j[j].clone());
            out.h2j.push(self.h2j[j].clone());
            out.big_xj.push(self.big_xj[j].clone());
            out.paillier_pks.push(self.paillier_pks[j].clone());
        }
        Ok(out)
    }

    pub fn curve(&self) -> CurveName {
        self.ecdsa_pub.curve()
    }

    pub fn is_empty(&self) -> bool {
        self.ks.is_empty() || self.local_secrets.xi.is_zero()
    }
}

impl KeygenSaveData for LocalPartySaveData {
    fn public_key(&self) -> Option<&ECPoint> {
        Some(&self.ecdsa_pub)
    }
}
