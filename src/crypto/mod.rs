// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use thiserror::Error;

pub mod commitments;
pub mod dlnproof;
pub mod ecpoint;
pub mod facproof;
pub mod modproof;
pub mod paillier;
pub mod schnorr;
pub mod vss;

/// Failure to build or decode a zero-knowledge proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("invalid proof parameters: {0}")]
    InvalidParameters(&'static str),
    #[error("malformed proof: {0}")]
    Malformed(String),
    #[error(transparent)]
    Commitment(#[from] commitments::CommitmentError),
    #[error(transparent)]
    Point(#[from] ecpoint::PointError),
}
