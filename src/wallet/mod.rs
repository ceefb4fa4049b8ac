use std::sync::Arc;

use anyhow::{Context, Result};

pub use self::master_secret::{AlreadyInitialized, MasterSecretStore};
pub use self::registry::{Account, AccountOrigin, AccountRegistry};

mod master_secret;
mod registry;

use crate::crypto::{self, Chain};
use crate::session::Session;
use crate::storage::LocalStore;

/// Orchestrates the master secret lifecycle, key derivation and the
/// account registry over one durable store.
///
/// The wallet is in HD mode once a master secret exists, import-only mode
/// while accounts exist without one. The two are independent, importing
/// after initialization is allowed.
pub struct Wallet {
    master_secret: MasterSecretStore,
    registry: AccountRegistry,
    session: Session,
}

/// Outcome of [`Wallet::create_or_add_account`]
#[derive(Debug)]
pub enum Creation {
    /// A master secret was just generated. The caller must disclose the
    /// phrase and call [`Wallet::complete_creation`] once it has been
    /// acknowledged.
    New { phrase: String, pending_name: String },
    /// The master secret already existed, the account was derived and
    /// registered at the next index.
    Derived(Account),
}

impl Wallet {
    pub fn new(store: Arc<dyn LocalStore>) -> Result<Self> {
        Ok(Self {
            master_secret: MasterSecretStore::new(store.clone()),
            registry: AccountRegistry::new(store.clone())?,
            session: Session::new(store),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_initialized(&self) -> Result<bool> {
        self.master_secret.is_initialized()
    }

    /// First call initializes the master secret and defers registration
    /// until the phrase is acknowledged, later calls derive the next
    /// account immediately.
    pub fn create_or_add_account(&self, name: &str) -> Result<Creation> {
        self.session.require_principal()?;

        // `initialize` is the atomic decision point: exactly one caller can
        // win the absent state, everyone else takes the derive path.
        match self.master_secret.initialize() {
            Ok(phrase) => Ok(Creation::New {
                phrase,
                pending_name: name.to_owned(),
            }),
            Err(e) if e.is::<AlreadyInitialized>() => {
                let phrase = self
                    .master_secret
                    .current()?
                    .context("master seed missing")?;

                let account = self
                    .registry
                    .register_next(name, |index| derive_addresses(&phrase, index))?;
                self.registry.select(&account.id)?;
                Ok(Creation::Derived(account))
            }
            Err(e) => Err(e),
        }
    }

    /// Continuation of the two-step creation path, registers the first
    /// account at index 0. Idempotent under replay, a duplicate submission
    /// returns the already registered account.
    pub fn complete_creation(&self, name: &str, phrase: &str) -> Result<Account> {
        self.session.require_principal()?;

        let (solana_address, ethereum_address) = derive_addresses(phrase, 0)?;
        let account = self.registry.register(
            name,
            solana_address,
            ethereum_address,
            0,
            AccountOrigin::Hd,
        )?;
        self.registry.select(&account.id)?;
        Ok(account)
    }

    /// Imports an external mnemonic as a single index-0 account outside of
    /// the master HD sequence. The master secret is left untouched.
    pub fn import_account(&self, name: &str, phrase: &str) -> Result<Account> {
        self.session.require_principal()?;

        crypto::validate_phrase(phrase)?;
        let (solana_address, ethereum_address) = derive_addresses(phrase, 0)?;
        let account = self.registry.register(
            name,
            solana_address,
            ethereum_address,
            0,
            AccountOrigin::Imported,
        )?;
        self.registry.select(&account.id)?;
        Ok(account)
    }

    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.session.require_principal()?;
        Ok(self.registry.list())
    }

    pub fn account(&self, id: &str) -> Result<Option<Account>> {
        self.session.require_principal()?;
        Ok(self.registry.get(id))
    }

    pub fn select_account(&self, id: &str) -> Result<Account> {
        self.session.require_principal()?;
        self.registry.select(id)
    }

    pub fn selected_account(&self) -> Result<Option<Account>> {
        self.session.require_principal()?;
        self.registry.selected()
    }

    /// Erases the master secret and every registered account from the
    /// durable store. Deliberately not part of logout.
    pub fn wipe(&self) -> Result<()> {
        self.session.require_principal()?;
        self.registry.wipe()?;
        self.master_secret.wipe()
    }
}

/// Derives the public identifiers for both chains at one index.
///
/// Secrets never leave this function.
fn derive_addresses(phrase: &str, index: u32) -> Result<(String, String)> {
    let seed = crypto::phrase_to_seed(phrase)?;
    let solana = Chain::Solana.derive_key_pair(&seed, index)?;
    let ethereum = Chain::Ethereum.derive_key_pair(&seed, index)?;
    Ok((solana.address, ethereum.address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::tests::TEST_PHRASE;
    use crate::session::{Principal, SessionError};
    use crate::storage::FileStore;

    fn wallet(dir: &tempfile::TempDir) -> Wallet {
        let wallet = Wallet::new(Arc::new(FileStore::new(dir.path()).unwrap())).unwrap();
        wallet.session().login(Principal("alice".to_owned())).unwrap();
        wallet
    }

    #[test]
    fn refuses_operations_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = Wallet::new(Arc::new(FileStore::new(dir.path()).unwrap())).unwrap();

        let err = wallet.create_or_add_account("main").unwrap_err();
        assert!(err.is::<SessionError>());
        assert!(wallet.accounts().is_err());
        assert!(wallet.import_account("main", TEST_PHRASE).is_err());
    }

    #[test]
    fn two_step_creation_then_add() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        let Creation::New {
            phrase,
            pending_name,
        } = wallet.create_or_add_account("main").unwrap()
        else {
            panic!("expected a fresh master secret")
        };
        assert_eq!(pending_name, "main");
        crypto::validate_phrase(&phrase).unwrap();

        // Nothing registered until the phrase is acknowledged
        assert_eq!(wallet.accounts().unwrap().len(), 0);

        let first = wallet.complete_creation(&pending_name, &phrase).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.origin, AccountOrigin::Hd);

        let Creation::Derived(second) = wallet.create_or_add_account("savings").unwrap() else {
            panic!("expected immediate derivation")
        };
        assert_eq!(second.index, 1);
        assert_ne!(first.solana_address, second.solana_address);
        assert_ne!(first.ethereum_address, second.ethereum_address);
    }

    #[test]
    fn completion_replay_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        let Creation::New { phrase, .. } = wallet.create_or_add_account("main").unwrap() else {
            panic!("expected a fresh master secret")
        };

        let first = wallet.complete_creation("main", &phrase).unwrap();
        // A reload replaying the pending completion must not mint a second
        // account
        let replayed = wallet.complete_creation("main", &phrase).unwrap();
        assert_eq!(first.id, replayed.id);
        assert_eq!(wallet.accounts().unwrap().len(), 1);
    }

    #[test]
    fn imports_reference_vector_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        let account = wallet.import_account("imported", TEST_PHRASE).unwrap();
        assert_eq!(
            account.solana_address,
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk"
        );
        assert_eq!(
            account.ethereum_address,
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
        assert_eq!(account.index, 0);
        assert_eq!(account.origin, AccountOrigin::Imported);

        // The master secret was never registered
        assert!(!wallet.is_initialized().unwrap());
    }

    #[test]
    fn import_twice_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        let first = wallet.import_account("a", TEST_PHRASE).unwrap();
        let second = wallet.import_account("b", TEST_PHRASE).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(wallet.accounts().unwrap().len(), 1);
    }

    #[test]
    fn import_rejects_invalid_mnemonic() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        let err = wallet.import_account("bad", "not a mnemonic").unwrap_err();
        assert!(err.is::<crypto::MnemonicError>());
        assert_eq!(wallet.accounts().unwrap().len(), 0);
    }

    #[test]
    fn import_does_not_perturb_hd_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        wallet.import_account("imported", TEST_PHRASE).unwrap();

        let Creation::New { phrase, .. } = wallet.create_or_add_account("main").unwrap() else {
            panic!("expected a fresh master secret")
        };
        let first_hd = wallet.complete_creation("main", &phrase).unwrap();

        // Both legitimately carry index 0, one per origin
        assert_eq!(first_hd.index, 0);
        assert_eq!(first_hd.origin, AccountOrigin::Hd);
        assert_eq!(wallet.accounts().unwrap().len(), 2);
    }

    #[test]
    fn wipe_erases_wallet_state() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = wallet(&dir);

        let Creation::New { phrase, .. } = wallet.create_or_add_account("main").unwrap() else {
            panic!("expected a fresh master secret")
        };
        wallet.complete_creation("main", &phrase).unwrap();

        wallet.wipe().unwrap();
        assert!(!wallet.is_initialized().unwrap());
        assert_eq!(wallet.accounts().unwrap().len(), 0);
        assert_eq!(wallet.selected_account().unwrap().map(|a| a.id), None);
    }
}
