// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::rngs::OsRng;

use super::curve::CurveName;
use super::error::ErrorKind;
use super::party_id::PartyID;
use super::peers::PeerContext;
use crate::common::random::TssRng;
use crate::crypto::{dlnproof, modproof, paillier};

pub const DEFAULT_SAFE_PRIME_GEN_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_PAILLIER_MODULUS_BITS: usize = 2048;

/// Iteration counts of the statistical proofs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofParams {
    pub dln_iterations: usize,
    pub mod_iterations: usize,
    pub paillier_proof_iterations: usize,
}

impl Default for ProofParams {
    fn default() -> Self {
        ProofParams {
            dln_iterations: dlnproof::ITERATIONS,
            mod_iterations: modproof::ITERATIONS,
            paillier_proof_iterations: paillier::PROOF_ITERS,
        }
    }
}

/// Per-session configuration, shared read-only by every round.
pub struct Parameters {
    curve: CurveName,
    party_id: PartyID,
    parties: PeerContext,
    party_count: usize,
    threshold: usize,
    concurrency: usize,
    safe_prime_gen_timeout: Duration,
    nonce: BigInt,
    no_proof_mod: bool,
    no_proof_fac: bool,
    paillier_modulus_bits: usize,
    proof: ProofParams,
    rng: Mutex<Box<dyn TssRng>>,
}

impl Parameters {
    pub fn new(
        curve: CurveName,
        parties: PeerContext,
        party_id: PartyID,
        party_count: usize,
        threshold: usize,
    ) -> Self {
        Parameters {
            curve,
            party_id,
            parties,
            party_count,
            threshold,
            concurrency: num_cpus::get(),
            safe_prime_gen_timeout: DEFAULT_SAFE_PRIME_GEN_TIMEOUT,
            nonce: BigInt::zero(),
            no_proof_mod: false,
            no_proof_fac: false,
            paillier_modulus_bits: DEFAULT_PAILLIER_MODULUS_BITS,
            proof: ProofParams::default(),
            rng: Mutex::new(Box::new(OsRng)),
        }
    }

    pub fn with_rng<R: TssRng + 'static>(mut self, rng: R) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_safe_prime_gen_timeout(mut self, timeout: Duration) -> Self {
        self.safe_prime_gen_timeout = timeout;
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<BigInt>) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn with_no_proof_mod(mut self) -> Self {
        self.no_proof_mod = true;
        self
    }

    pub fn with_no_proof_fac(mut self) -> Self {
        self.no_proof_fac = true;
        self
    }

    pub fn with_paillier_modulus_bits(mut self, bits: usize) -> Self {
        self.paillier_modulus_bits = bits;
        self
    }

    pub fn with_proof_params(mut self, proof: ProofParams) -> Self {
        self.proof = proof;
        self
    }

    pub fn curve(&self) -> CurveName {
        self.curve
    }

    pub fn party_id(&self) -> &PartyID {
        &self.party_id
    }

    pub fn parties(&self) -> &PeerContext {
        &self.parties
    }

    pub fn party_count(&self) -> usize {
        self.party_count
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn safe_prime_gen_timeout(&self) -> Duration {
        self.safe_prime_gen_timeout
    }

    pub fn nonce(&self) -> &BigInt {
        &self.nonce
    }

    pub fn no_proof_mod(&self) -> bool {
        self.no_proof_mod
    }

    pub fn no_proof_fac(&self) -> bool {
        self.no_proof_fac
    }

    pub fn paillier_modulus_bits(&self) -> usize {
        self.paillier_modulus_bits
    }

    pub fn proof_params(&self) -> &ProofParams {
        &self.proof
    }

    /// Array index of the local party. Only meaningful once `validate`
    /// has accepted these parameters.
    pub fn party_index(&self) -> usize {
        self.party_id.array_index().unwrap_or_default()
    }

    /// Locks the injected randomness source. A poisoned lock still yields
    /// the generator since its state cannot be left half-updated.
    pub fn lock_rng(&self) -> MutexGuard<'_, Box<dyn TssRng>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn validate(&self) -> Result<(), ErrorKind> {
        let invalid = |reason: String| Err(ErrorKind::InvalidParameters(reason));
        if self.party_count < 2 {
            return invalid(format!("party count must be at least 2, got {}", self.party_count));
        }
        if self.threshold < 1 || self.threshold >= self.party_count {
            return invalid(format!(
                "threshold must be in [1, {}), got {}",
                self.party_count, self.threshold
            ));
        }
        if self.parties.len() != self.party_count {
            return invalid(format!(
                "party count {} does not match {} parties in the peer context",
                self.party_count,
                self.parties.len()
            ));
        }
        if !self.parties.contains(&self.party_id) {
            return invalid(format!("local party {} is not in the peer context", self.party_id));
        }
        let mut seen = HashSet::with_capacity(self.party_count);
        for (i, p) in self.parties.ids().iter().enumerate() {
            if !p.key.is_positive() {
                return invalid(format!("party {} has a non-positive key", p));
            }
            if (&p.key % self.curve.order()).is_zero() {
                return invalid(format!("party {} key is zero modulo the group order", p));
            }
            if p.array_index() != Some(i) {
                return invalid(format!("party {} is out of order", p));
            }
            if !seen.insert(p.key.clone()) {
                return invalid(format!("party {} reuses another party's key", p));
            }
        }
        if self.concurrency == 0 {
            return invalid("concurrency must be positive".into());
        }
        Ok(())
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("curve", &self.curve)
            .field("party_id", &self.party_id)
            .field("party_count", &self.party_count)
            .field("threshold", &self.threshold)
            .field("concurrency", &self.concurrency)
            .field("no_proof_mod", &self.no_proof_mod)
            .field("no_proof_fac", &self.no_proof_fac)
            .field("paillier_modulus_bits", &self.paillier_modulus_bits)
            .finish_non_exhaustive()
    }
}
