// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

use crate::crypto::ecpoint::ECPoint;
use crate::protocols::LocalSecrets;
use crate::storage::KeygenSaveData;
use crate::tss::error::ErrorKind;
use crate::tss::party_id::SortedPartyIDs;

/// Output of an EdDSA key generation session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPartySaveData {
    pub local_secrets: LocalSecrets,

    /// Party keys in array order.
    pub ks: Vec<BigInt>,
    pub big_xj: Vec<ECPoint>,

    pub eddsa_pub: ECPoint,
}

impl LocalPartySaveData {
    pub fn original_index(&self) -> Option<usize> {
        self.ks.iter().position(|k| k == &self.local_secrets.share_id)
    }

    pub fn check_consistency(&self) -> Result<(), String> {
        if self.ks.is_empty() || self.ks.len() != self.big_xj.len() {
            return Err("ks and big_xj differ in length".into());
        }
        let curve = self.eddsa_pub.curve();
        if !curve.is_edwards() {
            return Err(format!("public key is on {}", curve));
        }
        let xi = &self.local_secrets.xi;
        if !xi.is_positive() || xi >= curve.order() {
            return Err("xi is out of range".into());
        }
        if self.eddsa_pub.is_identity() {
            return Err("public key is the identity".into());
        }
        let i = self.original_index().ok_or("share id is not among ks")?;
        if self.local_secrets.public_share(curve) != self.big_xj[i] {
            return Err("xi*G does not match this party's public share".into());
        }
        Ok(())
    }

    pub fn subset(&self, sorted_ids: &SortedPartyIDs) -> Result<Self, ErrorKind> {
        let mut ks = Vec::with_capacity(sorted_ids.len());
        let mut big_xj = Vec::with_capacity(sorted_ids.len());
        for id in sorted_ids {
            let j = self.ks.iter().position(|k| k == &id.key).ok_or_else(|| {
                ErrorKind::InvalidParameters(format!("party {} is not in the save data", id))
            })?;
            ks.push(self.ks[j].clone());
            big_xj.push(self.big_xj[j].clone());
        }
        Ok(LocalPartySaveData {
            local_secrets: self.local_secrets.clone(),
            ks,
            big_xj,
            eddsa_pub: self.eddsa_pub.clone(),
        })
    }
}

impl KeygenSaveData for LocalPartySaveData {
    fn public_key(&self) -> Option<&ECPoint> {
        Some(&self.eddsa_pub)
    }
}
