//! Resolution of previous transactions.
//!
//! The transaction codec never performs I/O itself: anything that needs a
//! previous output — `TxIn::value`, `Tx::fee` — takes a [`TxFetcher`].
//! [`HttpFetcher`] is the production implementation; [`MemoryFetcher`]
//! backs tests and offline use.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rbtc_codec::decode::read_u32_le;
use tracing::debug;

use crate::error::TxError;
use crate::transaction::Tx;

pub trait TxFetcher {
    /// Returns the transaction with the given hex id. `fresh` forces a
    /// refetch past any cache.
    fn fetch(&self, tx_id: &str, testnet: bool, fresh: bool) -> Result<Tx, TxError>;
}

/// Endpoints and limits for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub mainnet_url: String,
    pub testnet_url: String,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            mainnet_url: "http://mainnet.programmingbitcoin.com".to_string(),
            testnet_url: "http://testnet.programmingbitcoin.com".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Fetches raw transactions over HTTP and caches the parsed results.
///
/// The cache is keyed by hex txid and shared across networks; the stored
/// transaction's `testnet` flag is rewritten to the caller's on every
/// hit. Network I/O happens outside the cache lock.
pub struct HttpFetcher {
    config: FetcherConfig,
    client: reqwest::blocking::Client,
    cache: Mutex<HashMap<String, Tx>>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, TxError> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self, TxError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn base_url(&self, testnet: bool) -> &str {
        if testnet {
            &self.config.testnet_url
        } else {
            &self.config.mainnet_url
        }
    }

    fn fetch_raw(&self, tx_id: &str, testnet: bool) -> Result<Vec<u8>, TxError> {
        let url = format!("{}/tx/{}.hex", self.base_url(testnet), tx_id);
        debug!(%url, "fetching transaction");
        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        Ok(hex::decode(body.trim())?)
    }
}

impl TxFetcher for HttpFetcher {
    fn fetch(&self, tx_id: &str, testnet: bool, fresh: bool) -> Result<Tx, TxError> {
        if !fresh {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(tx) = cache.get_mut(tx_id) {
                debug!(tx_id, "transaction cache hit");
                tx.testnet = testnet;
                return Ok(tx.clone());
            }
        }

        let raw = self.fetch_raw(tx_id, testnet)?;

        // A zero byte where the input count belongs is the SegWit marker:
        // drop it and the flag byte, then restore the lock_time from the
        // tail of the original payload.
        let tx = if raw.len() >= 6 && raw[4] == 0 {
            let mut legacy = raw[..4].to_vec();
            legacy.extend_from_slice(&raw[6..]);
            let mut tx = Tx::parse(&legacy, testnet)?;
            let (lock_time, _) = read_u32_le(&raw[raw.len().saturating_sub(4)..])?;
            tx.lock_time = lock_time;
            tx
        } else {
            Tx::parse(&raw, testnet)?
        };

        let fetched = tx.id();
        if fetched != tx_id {
            return Err(TxError::TxIdMismatch {
                requested: tx_id.to_string(),
                fetched,
            });
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(tx_id.to_string(), tx.clone());
        Ok(tx)
    }
}

/// A preloaded fetcher for tests and offline fee computation.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    txs: HashMap<String, Tx>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tx` under its own id.
    pub fn insert(&mut self, tx: Tx) {
        self.txs.insert(tx.id(), tx);
    }

    /// Stores `tx` under an explicit id, for seeding lookups whose key is
    /// not derivable from the stored bytes.
    pub fn insert_as(&mut self, tx_id: impl Into<String>, tx: Tx) {
        self.txs.insert(tx_id.into(), tx);
    }
}

impl TxFetcher for MemoryFetcher {
    fn fetch(&self, tx_id: &str, _testnet: bool, _fresh: bool) -> Result<Tx, TxError> {
        self.txs
            .get(tx_id)
            .cloned()
            .ok_or_else(|| TxError::UnknownTx {
                tx_id: tx_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TxIn, TxOut};
    use rbtc_script::Script;

    fn dummy_tx(amount: u64) -> Tx {
        Tx::new(
            1,
            vec![TxIn::new([0x22; 32], 0)],
            vec![TxOut::new(amount, Script::default())],
            0,
            false,
        )
    }

    #[test]
    fn memory_fetcher_returns_seeded_transactions() {
        let mut fetcher = MemoryFetcher::new();
        let tx = dummy_tx(1000);
        let id = tx.id();
        fetcher.insert(tx.clone());
        assert_eq!(fetcher.fetch(&id, false, false).unwrap(), tx);
        assert!(matches!(
            fetcher.fetch("00", false, false),
            Err(TxError::UnknownTx { .. })
        ));
    }

    #[test]
    fn memory_fetcher_honors_explicit_keys() {
        let mut fetcher = MemoryFetcher::new();
        fetcher.insert_as("feed", dummy_tx(42));
        assert_eq!(fetcher.fetch("feed", true, true).unwrap().tx_outs[0].amount, 42);
    }

    #[test]
    fn default_config_points_at_programmingbitcoin() {
        let config = FetcherConfig::default();
        assert!(config.mainnet_url.contains("mainnet"));
        assert!(config.testnet_url.contains("testnet"));
        assert!(config.timeout > Duration::ZERO);
    }
}
