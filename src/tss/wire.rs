// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use prost::Message as _;
use thiserror::Error;

use super::message::{Message, MessageContent, ParsedMessage};
use super::party_id::{PartyID, SortedPartyIDs};
use crate::common::slice::bytes_to_bigint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("protobuf decode failed: {0}")]
    Decode(String),
    #[error("message has no content")]
    EmptyContent,
    #[error("wrapper has no sender")]
    MissingSender,
    #[error("sender is not a session party")]
    UnknownSender,
}

impl From<prost::DecodeError> for WireError {
    fn from(err: prost::DecodeError) -> Self {
        WireError::Decode(err.to_string())
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WirePartyId {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub moniker: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "3")]
    pub key: ::prost::alloc::vec::Vec<u8>,
}

impl From<&PartyID> for WirePartyId {
    fn from(p: &PartyID) -> Self {
        WirePartyId {
            id: p.id.clone(),
            moniker: p.moniker.clone(),
            key: p.key.to_bytes_be().1,
        }
    }
}

/// Routing plus payload, for transports that carry routing in-band.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageWrapper {
    #[prost(bool, tag = "1")]
    pub is_broadcast: bool,
    #[prost(message, optional, tag = "3")]
    pub from: ::core::option::Option<WirePartyId>,
    #[prost(message, repeated, tag = "4")]
    pub to: ::prost::alloc::vec::Vec<WirePartyId>,
    #[prost(bytes = "vec", tag = "10")]
    pub message: ::prost::alloc::vec::Vec<u8>,
}

impl MessageWrapper {
    pub fn from_message(msg: &Message) -> Self {
        MessageWrapper {
            is_broadcast: msg.routing.is_broadcast,
            from: Some((&msg.routing.from).into()),
            to: msg
                .routing
                .to
                .as_ref()
                .map(|to| to.iter().map(WirePartyId::from).collect())
                .unwrap_or_default(),
            message: msg.wire_bytes.clone(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }
}

/// Decodes a `MessageWrapper` and resolves its parties against the sorted
/// session list, so the parsed routing carries array indexes.
pub fn parse_wrapped_message<C: MessageContent>(
    wrapper_bytes: &[u8],
    parties: &SortedPartyIDs,
) -> Result<ParsedMessage<C>, WireError> {
    let wrapper = MessageWrapper::decode(wrapper_bytes)?;
    let resolve = |w: &WirePartyId| {
        parties
            .find_by_key(&bytes_to_bigint(&w.key))
            .cloned()
            .ok_or(WireError::UnknownSender)
    };
    let from = resolve(wrapper.from.as_ref().ok_or(WireError::MissingSender)?)?;
    let to = if wrapper.is_broadcast {
        None
    } else {
        Some(wrapper.to.iter().map(resolve).collect::<Result<Vec<_>, _>>()?)
    };
    let mut parsed = ParsedMessage::<C>::from_wire(&wrapper.message, &from, wrapper.is_broadcast)?;
    parsed.routing.to = to;
    Ok(parsed)
}
