// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Protobuf messages of the EdDSA key generation protocol.

use num_bigint::BigInt;
use prost::Message as _;

use crate::common::slice::{bigints_to_bytes, bytes_to_bigint, non_empty_bytes, non_empty_multi_bytes};
use crate::crypto::commitments::{HashCommitDecommit, HashCommitment, HashDeCommitment};
use crate::crypto::ecpoint::{ECPoint, PointError};
use crate::crypto::schnorr::ZkProof;
use crate::crypto::ProofError;
use crate::tss::curve::CurveName;
use crate::tss::message::MessageContent;
use crate::tss::wire::WireError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound1Message {
    #[prost(bytes = "vec", tag = "1")]
    pub commitment: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound2Message1 {
    #[prost(bytes = "vec", tag = "1")]
    pub share: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound2Message2 {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub de_commitment: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", tag = "2")]
    pub proof_alpha_x: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub proof_alpha_y: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub proof_t: ::prost::alloc::vec::Vec<u8>,
}

/// Completion acknowledgment. Carries no data.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound3Message {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeygenMessage {
    #[prost(oneof = "KeygenContent", tags = "1, 2, 3, 4")]
    pub content: ::core::option::Option<KeygenContent>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum KeygenContent {
    #[prost(message, tag = "1")]
    Round1(KGRound1Message),
    #[prost(message, tag = "2")]
    Round2Message1(KGRound2Message1),
    #[prost(message, tag = "3")]
    Round2Message2(KGRound2Message2),
    #[prost(message, tag = "4")]
    Round3(KGRound3Message),
}

impl MessageContent for KeygenContent {
    fn kind(&self) -> &'static str {
        match self {
            KeygenContent::Round1(_) => "KGRound1Message",
            KeygenContent::Round2Message1(_) => "KGRound2Message1",
            KeygenContent::Round2Message2(_) => "KGRound2Message2",
            KeygenContent::Round3(_) => "KGRound3Message",
        }
    }

    fn round_number(&self) -> u32 {
        match self {
            KeygenContent::Round1(_) => 1,
            KeygenContent::Round2Message1(_) | KeygenContent::Round2Message2(_) => 2,
            KeygenContent::Round3(_) => 3,
        }
    }

    fn is_broadcast(&self) -> bool {
        !matches!(self, KeygenContent::Round2Message1(_))
    }

    fn validate_basic(&self) -> bool {
        match self {
            KeygenContent::Round1(m) => non_empty_bytes(&m.commitment),
            KeygenContent::Round2Message1(m) => non_empty_bytes(&m.share),
            KeygenContent::Round2Message2(m) => m.validate_basic(),
            KeygenContent::Round3(_) => true,
        }
    }

    fn encode_wire(&self) -> Vec<u8> {
        KeygenMessage {
            content: Some(self.clone()),
        }
        .encode_to_vec()
    }

    fn decode_wire(bytes: &[u8]) -> Result<Self, WireError> {
        KeygenMessage::decode(bytes)?.content.ok_or(WireError::EmptyContent)
    }
}

impl KGRound1Message {
    pub fn new(commitment: &HashCommitment) -> Self {
        KGRound1Message {
            commitment: commitment.to_bytes_be().1,
        }
    }

    pub fn unmarshal_commitment(&self) -> HashCommitment {
        bytes_to_bigint(&self.commitment)
    }
}

impl KGRound2Message1 {
    pub fn new(share: &BigInt) -> Self {
        KGRound2Message1 {
            share: share.to_bytes_be().1,
        }
    }

    pub fn unmarshal_share(&self) -> BigInt {
        bytes_to_bigint(&self.share)
    }
}

impl KGRound2Message2 {
    pub fn new(de_commitment: &HashDeCommitment, proof: &ZkProof) -> Result<Self, PointError> {
        let (alpha_x, alpha_y) = proof.alpha.coords()?;
        Ok(KGRound2Message2 {
            de_commitment: bigints_to_bytes(de_commitment),
            proof_alpha_x: alpha_x.to_bytes_be().1,
            proof_alpha_y: alpha_y.to_bytes_be().1,
            proof_t: proof.t.to_bytes_be().1,
        })
    }

    // alpha_x may be zero on Edwards curves, which encodes to no bytes
    pub fn validate_basic(&self) -> bool {
        non_empty_multi_bytes(&self.de_commitment, None)
            && non_empty_bytes(&self.proof_alpha_y)
            && non_empty_bytes(&self.proof_t)
    }

    pub fn unmarshal_de_commitment(&self) -> HashDeCommitment {
        HashCommitDecommit::decommitment_from_bytes(&self.de_commitment)
    }

    pub fn unmarshal_zk_proof(&self, curve: CurveName) -> Result<ZkProof, ProofError> {
        let alpha = ECPoint::from_coords(
            curve,
            &bytes_to_bigint(&self.proof_alpha_x),
            &bytes_to_bigint(&self.proof_alpha_y),
        )?;
        Ok(ZkProof {
            alpha,
            t: bytes_to_bigint(&self.proof_t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ack_survives_the_envelope() {
        let ack = KeygenContent::Round3(KGRound3Message {});
        assert!(ack.is_broadcast());
        assert!(ack.validate_basic());
        let bytes = ack.encode_wire();
        assert_eq!(KeygenContent::decode_wire(&bytes).unwrap(), ack);
    }

    #[test]
    fn test_zk_proof_travels_as_coordinates() {
        let mut rng = StdRng::seed_from_u64(3);
        let curve = CurveName::Ed25519;
        let x = BigInt::from(987654321u64);
        let big_x = ECPoint::scalar_base_mult(curve, &x);
        let proof = ZkProof::new(b"session", &x, &big_x, &mut rng).unwrap();
        let msg = KGRound2Message2::new(&vec![BigInt::from(5), BigInt::from(6)], &proof).unwrap();
        assert!(KeygenContent::Round2Message2(msg.clone()).validate_basic());
        assert!(!KeygenContent::Round2Message1(KGRound2Message1::default()).validate_basic());

        let decoded = msg.unmarshal_zk_proof(curve).unwrap();
        assert_eq!(decoded, proof);
        assert!(decoded.verify(b"session", &big_x));
        assert!(!decoded.verify(b"other session", &big_x));
    }
}
