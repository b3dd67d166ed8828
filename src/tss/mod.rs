// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod curve;
pub mod error;
pub mod message;
pub mod params;
pub mod party;
pub mod party_id;
pub mod peers;
pub mod round;
pub mod verifier;
pub mod wire;

pub use curve::CurveName;
pub use error::{ErrorKind, TssError};
pub use message::{Message, MessageContent, MessageRouting, ParsedMessage};
pub use params::{Parameters, ProofParams};
pub use party::{BaseParty, Party, PartyState};
pub use party_id::{generate_test_party_ids, sort_party_ids, PartyID, SortedPartyIDs};
pub use peers::PeerContext;
pub use round::{Round, RoundState};
