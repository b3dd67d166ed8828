// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

mod base;
mod round_1;
mod round_2;
mod round_3;
mod round_4;
mod round_5;

pub(crate) use base::KeygenCtx;
pub(crate) use round_1::Round1;
