use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Durable key-value capability backing wallet state.
///
/// Values are opaque bytes, the callers own their formats. Kept as a trait
/// so an encrypted backing store can be substituted without touching the
/// wallet core.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key under the store directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).context("failed to create store directory")?;
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read(path)
            .map(Some)
            .with_context(|| format!("failed to read `{key}`"))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        std::fs::write(self.key_path(key), value)
            .with_context(|| format!("failed to write `{key}`"))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(path).with_context(|| format!("failed to remove `{key}`"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("value", b"payload").unwrap();
        assert_eq!(store.get("value").unwrap().as_deref(), Some(&b"payload"[..]));

        store.set("value", b"updated").unwrap();
        assert_eq!(store.get("value").unwrap().as_deref(), Some(&b"updated"[..]));

        store.remove("value").unwrap();
        assert_eq!(store.get("value").unwrap(), None);

        // Removing a missing key is a no-op
        store.remove("value").unwrap();
    }
}
