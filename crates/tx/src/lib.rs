//! # rbtc-tx
//!
//! The legacy Bitcoin transaction codec: [`Tx`], [`TxIn`] and [`TxOut`]
//! with byte-exact parse/serialize, transaction ids, fees, and the
//! [`TxFetcher`](fetcher::TxFetcher) boundary for resolving previous
//! outputs.
//!
//! ```rust
//! use rbtc_tx::Tx;
//!
//! let mut raw = hex::decode("0100000001").unwrap(); // version, one input
//! raw.extend_from_slice(&[0x11; 32]); // previous txid (wire order)
//! raw.extend_from_slice(&hex::decode("0000000000ffffffff").unwrap()); // index, empty script, sequence
//! raw.extend_from_slice(&hex::decode("0100e1f5050000000000").unwrap()); // one 1 BTC output
//! raw.extend_from_slice(&[0; 4]); // locktime
//!
//! let tx = Tx::parse(&raw, false).unwrap();
//! assert_eq!(tx.version, 1);
//! assert_eq!(tx.tx_outs[0].amount, 100_000_000);
//! ```

pub mod error;
pub mod fetcher;
pub mod transaction;

pub use error::TxError;
pub use fetcher::{FetcherConfig, HttpFetcher, MemoryFetcher, TxFetcher};
pub use transaction::{Tx, TxIn, TxOut};
