// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

// Protobuf messages of the ECDSA key generation protocol. Integers travel as
// unsigned big-endian bytes.

use num_bigint::BigInt;
use prost::Message as _;

use crate::common::slice::{bigints_to_bytes, bytes_to_bigint, non_empty_bytes, non_empty_multi_bytes};
use crate::crypto::commitments::{HashCommitDecommit, HashCommitment, HashDeCommitment};
use crate::crypto::facproof::{self, ProofFac};
use crate::crypto::modproof::ProofMod;
use crate::crypto::{dlnproof, paillier, ProofError};
use crate::tss::message::MessageContent;
use crate::tss::wire::WireError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound1Message {
    #[prost(bytes = "vec", tag = "1")]
    pub commitment: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub paillier_n: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub n_tilde: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub h1: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub h2: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "6")]
    pub dlnproof_1: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "7")]
    pub dlnproof_2: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound2Message1 {
    #[prost(bytes = "vec", tag = "1")]
    pub share: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub fac_proof: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound2Message2 {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub de_commitment: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub mod_proof: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KGRound3Message {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub paillier_proof: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Envelope carrying exactly one round message.
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
            KeygenContent::Round1(m) => m.validate_basic(),
            KeygenContent::Round2Message1(m) => m.validate_basic(),
            KeygenContent::Round2Message2(m) => m.validate_basic(),
            KeygenContent::Round3(m) => m.validate_basic(),
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

// A DLN proof is two length-prefixed parts of equal size.
fn dln_proof_shape_ok(bzs: &[Vec<u8>]) -> bool {
    non_empty_multi_bytes(bzs, None) && bzs.len() >= 4 && bzs.len() % 2 == 0
}

// ----- //

impl KGRound1Message {
    pub fn new(
        commitment: &HashCommitment,
        paillier_pk: &paillier::PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        dln_proof_1: &dlnproof::Proof,
        dln_proof_2: &dlnproof::Proof,
    ) -> Result<Self, ProofError> {
        Ok(KGRound1Message {
            commitment: commitment.to_bytes_be().1,
            paillier_n: paillier_pk.n.to_bytes_be().1,
            n_tilde: n_tilde.to_bytes_be().1,
            h1: h1.to_bytes_be().1,
            h2: h2.to_bytes_be().1,
            dlnproof_1: dln_proof_1.to_bytes()?,
            dlnproof_2: dln_proof_2.to_bytes()?,
        })
    }

    pub fn validate_basic(&self) -> bool {
        non_empty_bytes(&self.commitment)
            && non_empty_bytes(&self.paillier_n)
            && non_empty_bytes(&self.n_tilde)
            && non_empty_bytes(&self.h1)
            && non_empty_bytes(&self.h2)
            && dln_proof_shape_ok(&self.dlnproof_1)
            && dln_proof_shape_ok(&self.dlnproof_2)
    }

    pub fn unmarshal_commitment(&self) -> HashCommitment {
        bytes_to_bigint(&self.commitment)
    }

    pub fn unmarshal_paillier_pk(&self) -> paillier::PublicKey {
        paillier::PublicKey {
            n: bytes_to_bigint(&self.paillier_n),
        }
    }

    pub fn unmarshal_n_tilde(&self) -> BigInt {
        bytes_to_bigint(&self.n_tilde)
    }

    pub fn unmarshal_h1(&self) -> BigInt {
        bytes_to_bigint(&self.h1)
    }

    pub fn unmarshal_h2(&self) -> BigInt {
        bytes_to_bigint(&self.h2)
    }

    pub fn unmarshal_dln_proof_1(&self, iterations: usize) -> Result<dlnproof::Proof, ProofError> {
        dlnproof::Proof::from_bytes(&self.dlnproof_1, iterations)
    }

    pub fn unmarshal_dln_proof_2(&self, iterations: usize) -> Result<dlnproof::Proof, ProofError> {
        dlnproof::Proof::from_bytes(&self.dlnproof_2, iterations)
    }
}

// ----- //

impl KGRound2Message1 {
    /// `fac_proof` is `None` when FAC proofs are disabled for the session.
    pub fn new(share: &BigInt, fac_proof: Option<&ProofFac>) -> Self {
        KGRound2Message1 {
            share: share.to_bytes_be().1,
            fac_proof: fac_proof.map(ProofFac::to_bytes).unwrap_or_default(),
        }
    }

    pub fn validate_basic(&self) -> bool {
        non_empty_bytes(&self.share)
            && (self.fac_proof.is_empty()
                || non_empty_multi_bytes(&self.fac_proof, Some(facproof::PROOF_FAC_BYTES_PARTS)))
    }

    pub fn unmarshal_share(&self) -> BigInt {
        bytes_to_bigint(&self.share)
    }

    pub fn unmarshal_fac_proof(&self) -> Result<ProofFac, ProofError> {
        ProofFac::from_bytes(&self.fac_proof)
    }
}

// ----- //

impl KGRound2Message2 {
    pub fn new(de_commitment: &HashDeCommitment, mod_proof: Option<&ProofMod>) -> Self {
        KGRound2Message2 {
            de_commitment: bigints_to_bytes(de_commitment),
            mod_proof: mod_proof.map(ProofMod::to_bytes).unwrap_or_default(),
        }
    }

    pub fn validate_basic(&self) -> bool {
        non_empty_multi_bytes(&self.de_commitment, None)
            && (self.mod_proof.is_empty() || non_empty_multi_bytes(&self.mod_proof, None))
    }

    pub fn unmarshal_de_commitment(&self) -> HashDeCommitment {
        HashCommitDecommit::decommitment_from_bytes(&self.de_commitment)
    }

    pub fn unmarshal_mod_proof(&self, iterations: usize) -> Result<ProofMod, ProofError> {
        ProofMod::from_bytes(&self.mod_proof, iterations)
    }
}

// ----- //

impl KGRound3Message {
    pub fn new(proof: &paillier::Proof) -> Self {
        KGRound3Message {
            paillier_proof: proof.to_bytes(),
        }
    }

    pub fn validate_basic(&self) -> bool {
        non_empty_multi_bytes(&self.paillier_proof, None)
    }

    pub fn unmarshal_proof_ints(&self) -> paillier::Proof {
        paillier::Proof::from_bytes(&self.paillier_proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::tss::message::Message;
    use crate::tss::party_id::{generate_test_party_ids, sort_party_ids};
    use crate::tss::wire::{parse_wrapped_message, MessageWrapper};

    #[test]
    fn test_content_round_numbers_and_routing() {
        let share = KeygenContent::Round2Message1(KGRound2Message1::new(&BigInt::from(9), None));
        assert_eq!(share.round_number(), 2);
        assert!(!share.is_broadcast());
        assert!(share.validate_basic());
        let ack = KeygenContent::Round3(KGRound3Message {
            paillier_proof: vec![vec![1]],
        });
        assert_eq!(ack.round_number(), 3);
        assert!(ack.is_broadcast());
    }

    #[test]
    fn test_validate_basic_rejects_empty_fields() {
        let m = KGRound2Message1 {
            share: vec![],
            fac_proof: vec![],
        };
        assert!(!m.validate_basic());
        let m = KGRound2Message1 {
            share: vec![1],
            fac_proof: vec![vec![1]; 3],
        };
        assert!(!m.validate_basic());
        let m = KGRound2Message2 {
            de_commitment: vec![vec![1], vec![]],
            mod_proof: vec![],
        };
        assert!(!m.validate_basic());
        assert!(!KGRound1Message::default().validate_basic());
        assert!(!KGRound3Message::default().validate_basic());
    }

    #[test]
    fn test_wire_envelope() {
        let content = KeygenContent::Round2Message2(KGRound2Message2::new(
            &vec![BigInt::from(1), BigInt::from(2), BigInt::from(3)],
            None,
        ));
        let bytes = content.encode_wire();
        assert_eq!(KeygenContent::decode_wire(&bytes).unwrap(), content);
        assert_eq!(
            KeygenContent::decode_wire(&KeygenMessage { content: None }.encode_to_vec()),
            Err(WireError::EmptyContent)
        );
    }

    #[test]
    fn test_wrapped_message_resolves_parties() {
        let mut rng = StdRng::seed_from_u64(21);
        let ids = sort_party_ids(generate_test_party_ids(3, &mut rng));
        let from = ids.get(2).unwrap().clone();
        let to = ids.get(0).unwrap().clone();
        let content = KeygenContent::Round2Message1(KGRound2Message1::new(&BigInt::from(77), None));
        let msg = Message::new(from.clone(), Some(vec![to.clone()]), &content);
        let wrapped = MessageWrapper::from_message(&msg).to_bytes();
        let parsed = parse_wrapped_message::<KeygenContent>(&wrapped, &ids).unwrap();
        assert_eq!(parsed.from(), &from);
        assert_eq!(parsed.routing.to, Some(vec![to]));
        assert_eq!(parsed.content, content);
        assert!(parsed.validate_basic());

        let strangers = sort_party_ids(generate_test_party_ids(2, &mut rng));
        assert_eq!(
            parse_wrapped_message::<KeygenContent>(&wrapped, &strangers).unwrap_err(),
            WireError::UnknownSender
        );
    }
}
