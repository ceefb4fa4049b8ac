use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Thin JSON-RPC balance client.
///
/// Consumed only by display commands, the derivation path never goes
/// through here.
pub struct ChainRpc {
    client: reqwest::Client,
}

impl ChainRpc {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build RPC client")?;
        Ok(Self { client })
    }

    /// Balance in lamports
    pub async fn solana_balance(&self, endpoint: &Url, address: &str) -> Result<u128> {
        let result = self
            .query(endpoint, "getBalance", serde_json::json!([address]))
            .await?;
        result
            .get("value")
            .and_then(serde_json::Value::as_u64)
            .map(u128::from)
            .context("invalid getBalance response")
    }

    /// Balance in wei
    pub async fn ethereum_balance(&self, endpoint: &Url, address: &str) -> Result<u128> {
        let result = self
            .query(endpoint, "eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        let amount = result.as_str().context("invalid eth_getBalance response")?;
        parse_hex_amount(amount)
    }

    async fn query(
        &self,
        endpoint: &Url,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let mut response: serde_json::Value = self
            .client
            .post(endpoint.clone())
            .json(&request)
            .send()
            .await
            .with_context(|| format!("{method} query failed"))?
            .json()
            .await
            .with_context(|| format!("invalid {method} response"))?;

        if let Some(error) = response.get("error") {
            anyhow::bail!("{method} query failed: {error}");
        }
        response
            .get_mut("result")
            .map(serde_json::Value::take)
            .with_context(|| format!("empty {method} response"))
    }
}

fn parse_hex_amount(amount: &str) -> Result<u128> {
    let digits = amount
        .strip_prefix("0x")
        .context("expected a 0x-prefixed amount")?;
    u128::from_str_radix(digits, 16).context("invalid hex amount")
}

/// Formats a raw chain amount with the given number of decimals,
/// trailing zeros trimmed. SOL carries 9 decimals, ETH 18.
pub struct Tokens<const DECIMALS: u32>(pub u128);

impl<const DECIMALS: u32> std::fmt::Display for Tokens<DECIMALS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let base = 10u128.pow(DECIMALS);
        let int = self.0 / base;
        let mut frac = self.0 % base;

        int.fmt(f)?;
        if frac > 0 {
            let mut width = DECIMALS as usize;
            while frac % 10 == 0 {
                frac /= 10;
                width -= 1;
            }
            f.write_fmt(format_args!(".{frac:0width$}"))?;
        }
        Ok(())
    }
}
