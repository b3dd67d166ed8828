// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use log::warn;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::error::ErrorKind;
use super::params::Parameters;
use super::party_id::PartyID;

/// Evaluates `f(0..count)` on a pool of `concurrency` threads. Results come
/// back in index order.
pub fn run_concurrently<T, F>(concurrency: usize, count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    match ThreadPoolBuilder::new().num_threads(concurrency.max(1)).build() {
        Ok(pool) => pool.install(|| (0..count).into_par_iter().map(&f).collect()),
        Err(err) => {
            warn!(target: "tss-lib", "verifier pool unavailable, checking sequentially: {}", err);
            (0..count).map(f).collect()
        }
    }
}

/// Runs `check` against every peer of the local party. On success returns
/// each peer's output at its array index, with `None` at the local index.
/// Otherwise returns every failing peer with its reason, in array order.
pub fn verify_peers<T, F>(params: &Parameters, check: F) -> Result<Vec<Option<T>>, Vec<(PartyID, String)>>
where
    T: Send,
    F: Fn(usize) -> Result<T, String> + Sync + Send,
{
    let self_index = params.party_index();
    let parties = params.parties().ids();
    let results = run_concurrently(params.concurrency(), parties.len(), |j| {
        if j == self_index {
            Ok(None)
        } else {
            check(j).map(Some)
        }
    });
    let mut outputs = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (res, p) in results.into_iter().zip(parties.iter()) {
        match res {
            Ok(out) => outputs.push(out),
            Err(reason) => {
                warn!(target: "tss-lib", "party {}: peer {} failed verification: {}", params.party_id(), p, reason);
                failures.push((p.clone(), reason));
            }
        }
    }
    if failures.is_empty() {
        Ok(outputs)
    } else {
        Err(failures)
    }
}

/// Folds verification failures into one error kind, or `None` when there
/// are none.
pub fn failures_to_error(failures: Vec<(PartyID, String)>) -> Option<ErrorKind> {
    let reason = failures
        .iter()
        .map(|(_, reason)| reason.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    ErrorKind::from_culprits(failures.into_iter().map(|(p, _)| p).collect(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_results_keep_index_order() {
        let out = run_concurrently(4, 64, |i| i * i);
        assert_eq!(out, (0..64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn test_verify_peers_collects_all_culprits_in_order() {
        use crate::tss::curve::CurveName;
        use crate::tss::party_id::sort_party_ids;
        use crate::tss::peers::PeerContext;

        let ids = sort_party_ids(
            (1..=4)
                .map(|i| PartyID::new(i.to_string(), format!("P[{}]", i), BigInt::from(i)))
                .collect(),
        );
        let me = ids.get(1).unwrap().clone();
        let params = Parameters::new(CurveName::Secp256k1, PeerContext::new(ids.clone()), me, 4, 1)
            .with_concurrency(3);

        let outs = verify_peers(&params, |j| Ok(j * 10)).unwrap();
        assert_eq!(outs, vec![Some(0), None, Some(20), Some(30)]);

        // index 1 is the local party and is never checked
        let failures = verify_peers(&params, |j| if j == 0 { Ok(()) } else { Err(format!("bad {}", j)) }).unwrap_err();
        let culprits: Vec<PartyID> = failures.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(culprits, vec![ids.get(2).unwrap().clone(), ids.get(3).unwrap().clone()]);
        assert_eq!(failures[0].1, "bad 2");
    }

    #[test]
    fn test_failures_to_error() {
        assert_eq!(failures_to_error(vec![]), None);
        let a = PartyID::new("1", "A", BigInt::from(1));
        let b = PartyID::new("2", "B", BigInt::from(2));
        let one = failures_to_error(vec![(a.clone(), "bad share".into())]).unwrap();
        assert_eq!(
            one,
            ErrorKind::VerificationFailed {
                culprit: a.clone(),
                reason: "bad share".into()
            }
        );
        let two = failures_to_error(vec![(a.clone(), "x".into()), (b.clone(), "y".into())]).unwrap();
        assert_eq!(
            two,
            ErrorKind::AggregateVerificationFailed {
                culprits: vec![a, b],
                reason: "x; y".into()
            }
        );
    }
}
