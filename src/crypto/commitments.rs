// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod builder;
pub mod commitment;

pub use builder::{parse_secrets, CommitmentError, CommitmentBuilder};
pub use commitment::{HashCommitDecommit, HashCommitment, HashDeCommitment};
