use rbtc_codec::error::CodecError;
use rbtc_crypto::error::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("Transaction id mismatch: requested {requested}, fetched {fetched}")]
    TxIdMismatch { requested: String, fetched: String },
    #[error("Fetched payload is not valid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
    #[error("Transaction fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Transaction {tx_id} not available from this fetcher")]
    UnknownTx { tx_id: String },
    #[error("Input refers to missing output {index} of {tx_id}")]
    MissingOutput { tx_id: String, index: u32 },
    #[error("Transaction outputs exceed the resolved input value")]
    FeeUnderflow,
    #[error("Transaction amounts overflow")]
    AmountOverflow,
}
