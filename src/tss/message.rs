// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;

use super::party_id::PartyID;
use super::wire::WireError;

/// A protocol's message union. Implemented by each protocol's `KeygenContent`.
pub trait MessageContent: Clone + fmt::Debug + Send + Sync + Sized + 'static {
    /// Short type name, for logs.
    fn kind(&self) -> &'static str;

    /// The round whose `update` consumes this message.
    fn round_number(&self) -> u32;

    fn is_broadcast(&self) -> bool;

    /// Structural checks that need no session state.
    fn validate_basic(&self) -> bool;

    fn encode_wire(&self) -> Vec<u8>;

    fn decode_wire(bytes: &[u8]) -> Result<Self, WireError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRouting {
    pub from: PartyID,
    /// `None` for broadcasts.
    pub to: Option<Vec<PartyID>>,
    pub is_broadcast: bool,
}

/// An outbound message as handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub routing: MessageRouting,
    pub wire_bytes: Vec<u8>,
}

impl Message {
    pub fn new<C: MessageContent>(from: PartyID, to: Option<Vec<PartyID>>, content: &C) -> Self {
        Message {
            routing: MessageRouting {
                from,
                to,
                is_broadcast: content.is_broadcast(),
            },
            wire_bytes: content.encode_wire(),
        }
    }

    pub fn from(&self) -> &PartyID {
        &self.routing.from
    }

    pub fn is_broadcast(&self) -> bool {
        self.routing.is_broadcast
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.routing.to {
            None => write!(f, "from {} to all, {} bytes", self.routing.from, self.wire_bytes.len()),
            Some(to) => {
                let to: Vec<String> = to.iter().map(|p| p.to_string()).collect();
                write!(
                    f,
                    "from {} to [{}], {} bytes",
                    self.routing.from,
                    to.join(", "),
                    self.wire_bytes.len()
                )
            }
        }
    }
}

/// An inbound message with decoded content.
#[derive(Clone, Debug)]
pub struct ParsedMessage<C> {
    pub routing: MessageRouting,
    pub content: C,
}

impl<C: MessageContent> ParsedMessage<C> {
    pub fn new(from: PartyID, to: Option<Vec<PartyID>>, content: C) -> Self {
        ParsedMessage {
            routing: MessageRouting {
                from,
                to,
                is_broadcast: content.is_broadcast(),
            },
            content,
        }
    }

    /// Decodes the bytes a peer's `Message` carried.
    pub fn from_wire(wire_bytes: &[u8], from: &PartyID, is_broadcast: bool) -> Result<Self, WireError> {
        let content = C::decode_wire(wire_bytes)?;
        Ok(ParsedMessage {
            routing: MessageRouting {
                from: from.clone(),
                to: None,
                is_broadcast,
            },
            content,
        })
    }

    pub fn from(&self) -> &PartyID {
        &self.routing.from
    }

    pub fn round_number(&self) -> u32 {
        self.content.round_number()
    }

    pub fn validate_basic(&self) -> bool {
        self.routing.is_broadcast == self.content.is_broadcast() && self.content.validate_basic()
    }
}

impl<C: MessageContent> fmt::Display for ParsedMessage<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} (round {}, broadcast {})",
            self.content.kind(),
            self.routing.from,
            self.content.round_number(),
            self.routing.is_broadcast
        )
    }
}
