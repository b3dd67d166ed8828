// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use std::fmt;

use thiserror::Error;

use super::party_id::PartyID;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("round already started")]
    AlreadyStarted,
    #[error("invalid sender index: {0}")]
    InvalidSenderIndex(String),
    #[error("duplicate message from {0}")]
    DuplicateMessage(PartyID),
    #[error("missing prerequisite data: {0}")]
    MissingPrerequisiteData(String),
    #[error("verification failed for {culprit}: {reason}")]
    VerificationFailed { culprit: PartyID, reason: String },
    #[error("verification failed for {} parties: {reason}", culprits.len())]
    AggregateVerificationFailed { culprits: Vec<PartyID>, reason: String },
    #[error("protocol timed out")]
    ProtocolTimeout,
    #[error("unexpected message from {from}: {reason}")]
    UnexpectedMessage { from: PartyID, reason: String },
    #[error("malformed message from {from}: {reason}")]
    MalformedMessage { from: PartyID, reason: String },
    #[error("party is not running")]
    NotRunning,
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("local computation failed: {0}")]
    Crypto(String),
    #[error("wire decode failed: {0}")]
    Wire(String),
    #[error("{0} channel closed")]
    Channel(&'static str),
}

impl ErrorKind {
    /// Parties this error blames.
    pub fn culprits(&self) -> Vec<PartyID> {
        match self {
            ErrorKind::VerificationFailed { culprit, .. } => vec![culprit.clone()],
            ErrorKind::AggregateVerificationFailed { culprits, .. } => culprits.clone(),
            ErrorKind::UnexpectedMessage { from, .. } | ErrorKind::MalformedMessage { from, .. } => {
                vec![from.clone()]
            }
            _ => Vec::new(),
        }
    }

    /// Builds the single or aggregate verification failure for `culprits`.
    /// Returns `None` when the list is empty.
    pub fn from_culprits(mut culprits: Vec<PartyID>, reason: impl Into<String>) -> Option<Self> {
        match culprits.len() {
            0 => None,
            1 => culprits.pop().map(|culprit| ErrorKind::VerificationFailed {
                culprit,
                reason: reason.into(),
            }),
            _ => Some(ErrorKind::AggregateVerificationFailed {
                culprits,
                reason: reason.into(),
            }),
        }
    }

    /// Intake errors reject one message and leave the session running.
    pub fn is_intake_rejection(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidSenderIndex(_)
                | ErrorKind::DuplicateMessage(_)
                | ErrorKind::UnexpectedMessage { .. }
                | ErrorKind::MalformedMessage { .. }
                | ErrorKind::Wire(_)
        )
    }
}

/// A protocol error, tagged with where it happened and who is to blame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TssError {
    kind: ErrorKind,
    task: &'static str,
    round: u32,
    victim: Option<PartyID>,
    culprits: Vec<PartyID>,
}

impl TssError {
    pub fn new(kind: ErrorKind, task: &'static str, round: u32, victim: Option<PartyID>) -> Self {
        let culprits = kind.culprits();
        TssError {
            kind,
            task,
            round,
            victim,
            culprits,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn task(&self) -> &'static str {
        self.task
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn victim(&self) -> Option<&PartyID> {
        self.victim.as_ref()
    }

    pub fn culprits(&self) -> &[PartyID] {
        &self.culprits
    }
}

impl fmt::Display for TssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let victim = self
            .victim
            .as_ref()
            .map_or_else(|| "<none>".to_string(), |v| v.to_string());
        if self.culprits.is_empty() {
            write!(f, "task {}, party {}, round {}: {}", self.task, victim, self.round, self.kind)
        } else {
            let culprits: Vec<String> = self.culprits.iter().map(|c| c.to_string()).collect();
            write!(
                f,
                "task {}, party {}, round {}, culprits [{}]: {}",
                self.task,
                victim,
                self.round,
                culprits.join(", "),
                self.kind
            )
        }
    }
}

impl std::error::Error for TssError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    use crate::tss::party_id::sort_party_ids;

    fn parties() -> Vec<PartyID> {
        sort_party_ids(vec![
            PartyID::new("1", "A", BigInt::from(1)),
            PartyID::new("2", "B", BigInt::from(2)),
        ])
        .iter()
        .cloned()
        .collect()
    }

    #[test]
    fn test_culprits_follow_kind() {
        let ps = parties();
        let err = TssError::new(
            ErrorKind::VerificationFailed {
                culprit: ps[1].clone(),
                reason: "vss".into(),
            },
            "ecdsa-keygen",
            3,
            Some(ps[0].clone()),
        );
        assert_eq!(err.culprits(), &[ps[1].clone()]);
        assert_eq!(
            err.to_string(),
            "task ecdsa-keygen, party {0,A}, round 3, culprits [{1,B}]: verification failed for {1,B}: vss"
        );
    }

    #[test]
    fn test_from_culprits() {
        let ps = parties();
        assert_eq!(ErrorKind::from_culprits(vec![], "x"), None);
        assert!(matches!(
            ErrorKind::from_culprits(vec![ps[0].clone()], "x"),
            Some(ErrorKind::VerificationFailed { .. })
        ));
        let agg = ErrorKind::from_culprits(ps.clone(), "x").unwrap();
        assert_eq!(agg.culprits(), ps);
    }

    #[test]
    fn test_display_without_culprits() {
        let err = TssError::new(ErrorKind::AlreadyStarted, "eddsa-keygen", 1, None);
        assert_eq!(err.to_string(), "task eddsa-keygen, party <none>, round 1: round already started");
        assert!(!err.kind().is_intake_rejection());
    }
}
