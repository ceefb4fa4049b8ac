use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::storage::LocalStore;

const STORE_KEY: &str = "accounts";
const SELECTED_KEY: &str = "selected-account";

/// Named account with the public identifiers derived at one index.
///
/// Append-only, no removal or rename is exposed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub solana_address: String,
    pub ethereum_address: String,
    /// Derivation index both addresses were derived at
    pub index: u32,
    #[serde(default)]
    pub origin: AccountOrigin,
}

/// HD-derived accounts consume the shared index sequence, imported
/// accounts always sit at index 0 outside of it. Two accounts may both
/// carry index 0, one per origin.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountOrigin {
    #[default]
    Hd,
    Imported,
}

/// Registry of materialized accounts, persisted as a JSON list in
/// insertion order
pub struct AccountRegistry {
    store: Arc<dyn LocalStore>,
    // Single-writer lock, `register` reads the next index and inserts as
    // one atomic step
    accounts: Mutex<Vec<Account>>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LocalStore>) -> Result<Self> {
        let accounts = match store.get(STORE_KEY)? {
            Some(data) => {
                let mut deserializer = serde_json::Deserializer::from_slice(&data);
                serde_path_to_error::deserialize(&mut deserializer)
                    .context("failed to parse accounts")?
            }
            None => Vec::new(),
        };

        Ok(Self {
            store,
            accounts: Mutex::new(accounts),
        })
    }

    /// Next free index of the HD sequence, equal to the number of
    /// HD-origin accounts
    pub fn next_index(&self) -> u32 {
        hd_count(&self.accounts.lock())
    }

    /// Registers the account derived by `derive` at the next free HD index.
    ///
    /// The index is allocated and consumed under the registry lock, two
    /// concurrent registrations can't observe the same one.
    pub fn register_next(
        &self,
        name: &str,
        derive: impl FnOnce(u32) -> Result<(String, String)>,
    ) -> Result<Account> {
        let mut accounts = self.accounts.lock();
        let index = hd_count(&accounts);
        let (solana_address, ethereum_address) = derive(index)?;
        self.insert(
            &mut accounts,
            name,
            solana_address,
            ethereum_address,
            index,
            AccountOrigin::Hd,
        )
    }

    /// Registers an account with an explicit derivation index.
    ///
    /// Submitting a pair of addresses that already exists is a no-op
    /// returning the existing account.
    pub fn register(
        &self,
        name: &str,
        solana_address: String,
        ethereum_address: String,
        index: u32,
        origin: AccountOrigin,
    ) -> Result<Account> {
        let mut accounts = self.accounts.lock();
        self.insert(
            &mut accounts,
            name,
            solana_address,
            ethereum_address,
            index,
            origin,
        )
    }

    pub fn get(&self, id: &str) -> Option<Account> {
        self.accounts.lock().iter().find(|a| a.id == id).cloned()
    }

    /// All accounts in insertion order
    pub fn list(&self) -> Vec<Account> {
        self.accounts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().len()
    }

    pub fn select(&self, id: &str) -> Result<Account> {
        let account = self
            .get(id)
            .with_context(|| format!("unknown account `{id}`"))?;

        let data = serde_json::to_vec_pretty(&StoredSelection {
            id: account.id.clone(),
        })
        .context("failed to serialize selection")?;
        self.store.set(SELECTED_KEY, &data)?;
        Ok(account)
    }

    pub fn selected(&self) -> Result<Option<Account>> {
        let Some(data) = self.store.get(SELECTED_KEY)? else {
            return Ok(None);
        };

        let mut deserializer = serde_json::Deserializer::from_slice(&data);
        let stored: StoredSelection = serde_path_to_error::deserialize(&mut deserializer)
            .context("failed to parse selection")?;
        Ok(self.get(&stored.id))
    }

    /// Drops all registry state from the durable store
    pub fn wipe(&self) -> Result<()> {
        let mut accounts = self.accounts.lock();
        self.store.remove(STORE_KEY)?;
        self.store.remove(SELECTED_KEY)?;
        accounts.clear();
        Ok(())
    }

    fn insert(
        &self,
        accounts: &mut Vec<Account>,
        name: &str,
        solana_address: String,
        ethereum_address: String,
        index: u32,
        origin: AccountOrigin,
    ) -> Result<Account> {
        // Dedup by address, not by name
        if let Some(existing) = accounts
            .iter()
            .find(|a| a.solana_address == solana_address || a.ethereum_address == ethereum_address)
        {
            tracing::debug!(id = %existing.id, "account already registered");
            return Ok(existing.clone());
        }

        let account = Account {
            id: format!("account-{}", accounts.len()),
            name: name.to_owned(),
            solana_address,
            ethereum_address,
            index,
            origin,
        };

        accounts.push(account.clone());
        if let Err(e) = self.persist(accounts) {
            // No partial state on a failed write
            accounts.pop();
            return Err(e);
        }

        tracing::debug!(id = %account.id, index, "account registered");
        Ok(account)
    }

    fn persist(&self, accounts: &[Account]) -> Result<()> {
        let data = serde_json::to_vec_pretty(accounts).context("failed to serialize accounts")?;
        self.store.set(STORE_KEY, &data)
    }
}

fn hd_count(accounts: &[Account]) -> u32 {
    accounts
        .iter()
        .filter(|a| a.origin == AccountOrigin::Hd)
        .count() as u32
}

#[derive(Serialize, Deserialize)]
struct StoredSelection {
    id: String,
}
