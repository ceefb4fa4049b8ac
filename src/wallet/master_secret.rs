use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::storage::LocalStore;

const STORE_KEY: &str = "master-seed";
const HD_FLAG_KEY: &str = "hd-wallet";

/// Lifecycle of the single master seed phrase: generate-once, persist,
/// retrieve, detect-presence. There is no transition back to absent short
/// of an explicit wipe.
///
/// The phrase is persisted in clear. The store is pluggable, swapping in
/// an encrypted backing is the expected production hardening.
pub struct MasterSecretStore {
    store: Arc<dyn LocalStore>,
    // Process-wide cache, rehydrated from the store on first access.
    // The mutex also serializes `initialize` so exactly one caller wins.
    cached: Mutex<Option<String>>,
}

impl MasterSecretStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Generates and durably persists a fresh master seed phrase.
    ///
    /// Fails with [`AlreadyInitialized`] if a phrase exists. The phrase is
    /// persisted before it is returned, a persistence failure commits no
    /// state.
    pub fn initialize(&self) -> Result<String> {
        let mut cached = self.cached.lock();
        if cached.is_some() || self.load(&mut cached)?.is_some() {
            return Err(AlreadyInitialized.into());
        }

        let phrase = crypto::generate_phrase();

        // The flag only marks HD-wallet mode, presence is defined by the
        // phrase itself. The phrase write is the commit point, a failure
        // there rolls the flag back so nothing is committed.
        self.store
            .set(HD_FLAG_KEY, b"true")
            .context("failed to persist HD wallet flag")?;

        let data = serde_json::to_vec_pretty(&StoredSecret {
            seed: phrase.clone(),
        })
        .context("failed to serialize master seed")?;
        if let Err(e) = self.store.set(STORE_KEY, &data) {
            let _ = self.store.remove(HD_FLAG_KEY);
            return Err(e.context("failed to persist master seed"));
        }

        tracing::debug!("master seed initialized");
        *cached = Some(phrase.clone());
        Ok(phrase)
    }

    /// Returns the stored phrase, if any
    pub fn current(&self) -> Result<Option<String>> {
        let mut cached = self.cached.lock();
        if cached.is_some() {
            return Ok(cached.clone());
        }
        self.load(&mut cached)
    }

    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.current()?.is_some())
    }

    /// Erases the persisted phrase and the HD flag
    pub fn wipe(&self) -> Result<()> {
        let mut cached = self.cached.lock();
        self.store.remove(STORE_KEY)?;
        self.store.remove(HD_FLAG_KEY)?;
        *cached = None;
        tracing::warn!("master seed wiped");
        Ok(())
    }

    fn load(&self, cached: &mut Option<String>) -> Result<Option<String>> {
        let Some(data) = self.store.get(STORE_KEY)? else {
            return Ok(None);
        };

        let mut deserializer = serde_json::Deserializer::from_slice(&data);
        let stored: StoredSecret = serde_path_to_error::deserialize(&mut deserializer)
            .context("failed to parse master seed")?;

        *cached = Some(stored.seed.clone());
        Ok(Some(stored.seed))
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSecret {
    seed: String,
}

#[derive(thiserror::Error, Debug)]
#[error("master secret already initialized")]
pub struct AlreadyInitialized;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;

    fn file_store(dir: &tempfile::TempDir) -> Arc<dyn LocalStore> {
        Arc::new(FileStore::new(dir.path()).unwrap())
    }

    /// Rejects writes to one key, everything else passes through
    struct RejectingStore {
        inner: Arc<dyn LocalStore>,
        reject: &'static str,
    }

    impl LocalStore for RejectingStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<()> {
            anyhow::ensure!(key != self.reject, "store offline");
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn initialize_is_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = MasterSecretStore::new(file_store(&dir));

        assert!(!secrets.is_initialized().unwrap());

        let phrase = secrets.initialize().unwrap();
        crypto::validate_phrase(&phrase).unwrap();
        assert_eq!(secrets.current().unwrap().as_deref(), Some(phrase.as_str()));

        let err = secrets.initialize().unwrap_err();
        assert!(err.is::<AlreadyInitialized>());

        // Storage unchanged by the failed second call
        assert_eq!(secrets.current().unwrap().as_deref(), Some(phrase.as_str()));
    }

    #[test]
    fn rehydrates_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let phrase = MasterSecretStore::new(file_store(&dir))
            .initialize()
            .unwrap();

        // Fresh instance over the same store simulates a process restart
        let secrets = MasterSecretStore::new(file_store(&dir));
        assert_eq!(secrets.current().unwrap().as_deref(), Some(phrase.as_str()));
        assert!(secrets.initialize().unwrap_err().is::<AlreadyInitialized>());
    }

    #[test]
    fn failed_persist_commits_no_state() {
        let dir = tempfile::tempdir().unwrap();
        let inner = file_store(&dir);
        let secrets = MasterSecretStore::new(Arc::new(RejectingStore {
            inner: inner.clone(),
            reject: STORE_KEY,
        }));

        assert!(secrets.initialize().is_err());
        assert!(!secrets.is_initialized().unwrap());

        // The HD flag was rolled back along with the phrase
        assert_eq!(inner.get(HD_FLAG_KEY).unwrap(), None);

        // A healthy store starts from a clean slate
        MasterSecretStore::new(inner).initialize().unwrap();
    }

    #[test]
    fn wipe_transitions_back_to_absent() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = MasterSecretStore::new(file_store(&dir));

        secrets.initialize().unwrap();
        secrets.wipe().unwrap();

        assert!(!secrets.is_initialized().unwrap());
        secrets.initialize().unwrap();
    }
}
