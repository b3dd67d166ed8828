// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Persistence of completed key generation results.

use std::collections::HashMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::crypto::ecpoint::ECPoint;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no state stored under key {0}")]
    NotFound(String),
    #[error("save data has no public key")]
    MissingPublicKey,
    #[error("state serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("state backend failed: {0}")]
    Backend(String),
}

/// Storage the caller injects to keep key shares across sessions.
pub trait StateAccessor {
    fn save(&mut self, key: &str, state: &[u8]) -> Result<(), StorageError>;

    fn load(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Save data that can be stored under its group public key.
pub trait KeygenSaveData: Serialize + DeserializeOwned {
    fn public_key(&self) -> Option<&ECPoint>;
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: HashMap<String, Vec<u8>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateAccessor for MemoryStateStore {
    fn save(&mut self, key: &str, state: &[u8]) -> Result<(), StorageError> {
        self.states.insert(key.to_string(), state.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.states
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

/// Hex of the compressed public key encoding.
pub fn storage_key(public_key: &ECPoint) -> String {
    hex::encode(public_key.to_bytes())
}

/// Stores `data` as JSON and returns the key it was stored under.
pub fn save_keygen_data<S, D>(store: &mut S, data: &D) -> Result<String, StorageError>
where
    S: StateAccessor + ?Sized,
    D: KeygenSaveData,
{
    let key = storage_key(data.public_key().ok_or(StorageError::MissingPublicKey)?);
    let bytes = serde_json::to_vec(data)?;
    store.save(&key, &bytes)?;
    debug!(target: "tss-lib", "stored {} bytes of key generation data under {}", bytes.len(), key);
    Ok(key)
}

pub fn load_keygen_data<S, D>(store: &S, key: &str) -> Result<D, StorageError>
where
    S: StateAccessor + ?Sized,
    D: KeygenSaveData,
{
    let bytes = store.load(key)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use serde::Deserialize;

    use crate::tss::curve::CurveName;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Saved {
        pub_key: Option<ECPoint>,
        note: String,
    }

    impl KeygenSaveData for Saved {
        fn public_key(&self) -> Option<&ECPoint> {
            self.pub_key.as_ref()
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStateStore::new();
        let pub_key = ECPoint::scalar_base_mult(CurveName::Secp256k1, &BigInt::from(42));
        let data = Saved {
            pub_key: Some(pub_key.clone()),
            note: "share".into(),
        };
        let key = save_keygen_data(&mut store, &data).unwrap();
        assert_eq!(key, storage_key(&pub_key));
        assert_eq!(key.len(), 66);
        let loaded: Saved = load_keygen_data(&store, &key).unwrap();
        assert_eq!(loaded, data);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_key_and_public_key() {
        let mut store = MemoryStateStore::new();
        let data = Saved {
            pub_key: None,
            note: String::new(),
        };
        assert!(matches!(
            save_keygen_data(&mut store, &data),
            Err(StorageError::MissingPublicKey)
        ));
        assert!(matches!(
            load_keygen_data::<_, Saved>(&store, "absent"),
            Err(StorageError::NotFound(_))
        ));
    }
}
