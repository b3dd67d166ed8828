// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Threshold key generation (GG18/GG20) for ECDSA and EdDSA.
//!
//! Each participant runs a `LocalParty` from `protocols::ecdsa::keygen` or
//! `protocols::eddsa::keygen`. The caller moves messages between parties;
//! the library never touches the network.

pub mod common;
pub mod crypto;
pub mod protocols;
pub mod storage;
pub mod tss;
