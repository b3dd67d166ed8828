// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod ecdsa;
pub mod eddsa;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::common::hash::sha512_256i;
use crate::common::int::append_bigint_to_bytes_slice;
use crate::crypto::ecpoint::ECPoint;
use crate::tss::curve::CurveName;
use crate::tss::error::ErrorKind;
use crate::tss::params::Parameters;
use crate::tss::party_id::PartyID;
use crate::tss::round::RoundState;

/// The secret half of a party's key share, kept by both protocols.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSecrets {
    /// This party's share of the group secret.
    pub xi: BigInt,
    /// This party's key, the x-coordinate of its share.
    pub share_id: BigInt,
}

impl LocalSecrets {
    /// `xi*G`, which every peer records as this party's public share.
    pub fn public_share(&self, curve: CurveName) -> ECPoint {
        ECPoint::scalar_base_mult(curve, &self.xi)
    }
}

/// Session identifier binding proofs to the curve, the party set, the round
/// and the session nonce.
pub(crate) fn session_id(params: &Parameters, round: u32) -> Result<Vec<u8>, ErrorKind> {
    let curve = params.curve();
    let (gx, gy) = curve
        .generator()
        .coords()
        .map_err(|e| ErrorKind::Crypto(e.to_string()))?;
    let mut ssid_list: Vec<BigInt> = vec![curve.field_prime().clone(), curve.order().clone(), gx, gy];
    ssid_list.extend(params.parties().ids().keys());
    ssid_list.push(BigInt::from(round));
    ssid_list.push(params.nonce().clone());
    let refs: Vec<&BigInt> = ssid_list.iter().collect();
    let ssid = sha512_256i(&refs).ok_or_else(|| ErrorKind::Crypto("empty ssid input".into()))?;
    Ok(ssid.to_bytes_be().1)
}

/// Proof context of party `j`: `ssid || j`.
pub(crate) fn proof_session(ssid: &[u8], j: usize) -> Vec<u8> {
    append_bigint_to_bytes_slice(ssid, &BigInt::from(j))
}

/// Stores a message into its sender's slot, rejecting a second one.
pub(crate) fn store_message<T>(
    state: &mut RoundState,
    kind: usize,
    slots: &mut [Option<T>],
    from: &PartyID,
    msg: T,
) -> Result<bool, ErrorKind> {
    let j = from
        .array_index()
        .filter(|&j| j < slots.len())
        .ok_or_else(|| ErrorKind::InvalidSenderIndex(from.to_string()))?;
    if state.is_ok(kind, j) || slots[j].is_some() {
        return Err(ErrorKind::DuplicateMessage(from.clone()));
    }
    slots[j] = Some(msg);
    state.set_ok(kind, j);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::tss::party_id::{generate_test_party_ids, sort_party_ids};
    use crate::tss::peers::PeerContext;

    fn params(curve: CurveName, nonce: u64) -> Parameters {
        let mut rng = StdRng::seed_from_u64(41);
        let ids = sort_party_ids(generate_test_party_ids(3, &mut rng));
        let me = ids.get(0).unwrap().clone();
        Parameters::new(curve, PeerContext::new(ids), me, 3, 1).with_nonce(nonce)
    }

    #[test]
    fn test_session_id_binds_inputs() {
        let a = session_id(&params(CurveName::Secp256k1, 0), 1).unwrap();
        assert_eq!(a, session_id(&params(CurveName::Secp256k1, 0), 1).unwrap());
        assert_ne!(a, session_id(&params(CurveName::Secp256k1, 1), 1).unwrap());
        assert_ne!(a, session_id(&params(CurveName::Secp256k1, 0), 2).unwrap());
        assert_ne!(a, session_id(&params(CurveName::Ed25519, 0), 1).unwrap());
    }

    #[test]
    fn test_proof_sessions_differ_per_party() {
        let ssid = vec![1u8, 2, 3];
        assert_ne!(proof_session(&ssid, 1), proof_session(&ssid, 2));
        assert!(proof_session(&ssid, 1).starts_with(&ssid));
    }

    #[test]
    fn test_public_share_is_xi_times_g() {
        let secrets = LocalSecrets {
            xi: BigInt::from(11),
            share_id: BigInt::from(2),
        };
        for curve in [CurveName::Secp256k1, CurveName::P256, CurveName::Ed25519] {
            let g = curve.generator();
            assert_eq!(secrets.public_share(curve), g.scalar_mul(&BigInt::from(11)));
        }
        let json = serde_json::to_string(&secrets).unwrap();
        assert_eq!(serde_json::from_str::<LocalSecrets>(&json).unwrap(), secrets);
    }

    #[test]
    fn test_store_message_rejects_duplicates() {
        let mut rng = StdRng::seed_from_u64(42);
        let ids = sort_party_ids(generate_test_party_ids(3, &mut rng));
        let mut state = RoundState::new(1, 3);
        state.start(0).unwrap();
        let mut slots: Vec<Option<u8>> = vec![None; 3];
        let from = ids.get(2).unwrap();
        assert_eq!(store_message(&mut state, 0, &mut slots, from, 7), Ok(true));
        assert_eq!(
            store_message(&mut state, 0, &mut slots, from, 8),
            Err(ErrorKind::DuplicateMessage(from.clone()))
        );
        assert_eq!(slots[2], Some(7));
        assert!(!state.can_proceed());
    }
}
