use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Tool config
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Solana JSON-RPC endpoint
    #[serde(default = "default_solana_rpc")]
    pub solana_rpc: Url,

    /// Ethereum JSON-RPC endpoint
    #[serde(default = "default_ethereum_rpc")]
    pub ethereum_rpc: Url,

    /// RPC query timeout in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_sec: u64,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path).context("failed to read app config")?;
        let mut deserializer = toml::Deserializer::new(&data);
        serde_path_to_error::deserialize(&mut deserializer).context("failed to parse app config")
    }

    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = toml::to_string_pretty(self).context("failed to serialize app config")?;
        std::fs::write(path, data).context("failed to save app config")
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_sec)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            solana_rpc: default_solana_rpc(),
            ethereum_rpc: default_ethereum_rpc(),
            query_timeout_sec: default_query_timeout(),
        }
    }
}

fn default_solana_rpc() -> Url {
    Url::parse("https://api.mainnet-beta.solana.com").unwrap()
}

fn default_ethereum_rpc() -> Url {
    Url::parse("https://cloudflare-eth.com").unwrap()
}

fn default_query_timeout() -> u64 {
    10
}
