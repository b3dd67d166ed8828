// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! GG18/GG20 distributed key generation for ECDSA curves.
//!
//! Five rounds: commitments and ring-Pedersen parameters with DLN proofs,
//! shares with FAC and MOD proofs, share combination with a Paillier proof,
//! proof verification, and a final consistency check before the save data
//! is handed to the caller.

mod local_party;
pub mod messages;
mod prepare;
mod rounds;
mod save_data;
mod temp;

pub use local_party::LocalParty;
pub use messages::{KGRound1Message, KGRound2Message1, KGRound2Message2, KGRound3Message, KeygenContent, KeygenMessage};
pub use prepare::{LocalPreParams, PreParamsError};
pub use save_data::LocalPartySaveData;
pub use crate::protocols::LocalSecrets;

pub const TASK_NAME: &str = "ecdsa-keygen";
