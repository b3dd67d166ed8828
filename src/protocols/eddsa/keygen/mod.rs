// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Four-round distributed key generation over Ed25519.

mod local_party;
pub mod messages;
mod rounds;
mod save_data;
mod temp;

pub use local_party::LocalParty;
pub use messages::{KGRound1Message, KGRound2Message1, KGRound2Message2, KGRound3Message, KeygenContent, KeygenMessage};
pub use save_data::LocalPartySaveData;
pub use crate::protocols::LocalSecrets;

pub const TASK_NAME: &str = "eddsa-keygen";
