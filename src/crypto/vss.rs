// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod feldman_vss;

pub use feldman_vss::{check_indexes, create, reconstruct_secret, Share, VssError, Vs};
