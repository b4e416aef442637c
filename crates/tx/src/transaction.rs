//! The legacy transaction wire format.

use bytes::BufMut;

use rbtc_codec::decode::{WireDecode, read_array, read_u32_le, read_u64_le};
use rbtc_codec::encode::WireEncode;
use rbtc_codec::error::CodecError;
use rbtc_codec::varint::{read_varint, write_varint};
use rbtc_crypto::hash::hash256;
use rbtc_script::Script;

use crate::error::TxError;
use crate::fetcher::TxFetcher;

/// A legacy (pre-SegWit) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub version: u32,
    pub tx_ins: Vec<TxIn>,
    pub tx_outs: Vec<TxOut>,
    pub lock_time: u32,
    pub testnet: bool,
}

impl Tx {
    pub fn new(
        version: u32,
        tx_ins: Vec<TxIn>,
        tx_outs: Vec<TxOut>,
        lock_time: u32,
        testnet: bool,
    ) -> Self {
        Self {
            version,
            tx_ins,
            tx_outs,
            lock_time,
            testnet,
        }
    }

    /// Parses a raw transaction, tagging it with the network it came from.
    pub fn parse(raw: &[u8], testnet: bool) -> Result<Self, CodecError> {
        let mut tx = Self::decode(raw)?;
        tx.testnet = testnet;
        Ok(tx)
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Binary hash of the legacy serialization, in display order.
    pub fn hash(&self) -> [u8; 32] {
        let mut digest = hash256(&self.serialize());
        digest.reverse();
        digest
    }

    /// Human-readable hexadecimal of the transaction hash.
    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    /// `Σ inputs − Σ outputs`, in satoshi. Resolving the input values
    /// consults `fetcher` for each referenced previous transaction.
    pub fn fee(&self, fetcher: &dyn TxFetcher) -> Result<u64, TxError> {
        let mut input_total: u128 = 0;
        for tx_in in &self.tx_ins {
            input_total += u128::from(tx_in.value(fetcher, self.testnet)?);
        }
        let output_total: u128 = self.tx_outs.iter().map(|o| u128::from(o.amount)).sum();

        let fee = input_total
            .checked_sub(output_total)
            .ok_or(TxError::FeeUnderflow)?;
        u64::try_from(fee).map_err(|_| TxError::AmountOverflow)
    }
}

impl WireEncode for Tx {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.version.encode(buf);
        write_varint(self.tx_ins.len() as u64, buf);
        for tx_in in &self.tx_ins {
            tx_in.encode(buf);
        }
        write_varint(self.tx_outs.len() as u64, buf);
        for tx_out in &self.tx_outs {
            tx_out.encode(buf);
        }
        self.lock_time.encode(buf);
    }
}

impl WireDecode for Tx {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (version, rest) = read_u32_le(buf).map_err(|e| e.with_context("tx version"))?;

        let (input_count, mut rest) = read_varint(rest)?;
        let mut tx_ins = Vec::new();
        for _ in 0..input_count {
            let (tx_in, after) = TxIn::decode_unfinished(rest)?;
            tx_ins.push(tx_in);
            rest = after;
        }

        let (output_count, mut rest) = read_varint(rest)?;
        let mut tx_outs = Vec::new();
        for _ in 0..output_count {
            let (tx_out, after) = TxOut::decode_unfinished(rest)?;
            tx_outs.push(tx_out);
            rest = after;
        }

        let (lock_time, rest) =
            read_u32_le(rest).map_err(|e| e.with_context("tx lock_time"))?;
        Ok((
            Self {
                version,
                tx_ins,
                tx_outs,
                lock_time,
                testnet: false,
            },
            rest,
        ))
    }
}

impl std::fmt::Display for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tx: {}", self.id())?;
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "tx_ins:")?;
        for tx_in in &self.tx_ins {
            writeln!(f, "  {tx_in}")?;
        }
        writeln!(f, "tx_outs:")?;
        for tx_out in &self.tx_outs {
            writeln!(f, "  {tx_out}")?;
        }
        write!(f, "lock_time: {}", self.lock_time)
    }
}

/// A transaction input: a pointer into a previous transaction's outputs
/// plus the script that unlocks it.
///
/// `prev_tx` is held in display order (the big-endian hash); the wire
/// form is byte-reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prev_tx: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prev_tx: [u8; 32], prev_index: u32) -> Self {
        Self {
            prev_tx,
            prev_index,
            script_sig: Script::default(),
            sequence: 0xffff_ffff,
        }
    }

    /// The referenced transaction id as hex.
    pub fn prev_tx_id(&self) -> String {
        hex::encode(self.prev_tx)
    }

    pub fn fetch_tx(&self, fetcher: &dyn TxFetcher, testnet: bool) -> Result<Tx, TxError> {
        fetcher.fetch(&self.prev_tx_id(), testnet, false)
    }

    /// The value in satoshi of the output this input spends.
    pub fn value(&self, fetcher: &dyn TxFetcher, testnet: bool) -> Result<u64, TxError> {
        let tx = self.fetch_tx(fetcher, testnet)?;
        tx.tx_outs
            .get(self.prev_index as usize)
            .map(|tx_out| tx_out.amount)
            .ok_or_else(|| TxError::MissingOutput {
                tx_id: self.prev_tx_id(),
                index: self.prev_index,
            })
    }

    /// The locking script of the output this input spends.
    pub fn script_pubkey(&self, fetcher: &dyn TxFetcher, testnet: bool) -> Result<Script, TxError> {
        let tx = self.fetch_tx(fetcher, testnet)?;
        tx.tx_outs
            .get(self.prev_index as usize)
            .map(|tx_out| tx_out.script_pubkey.clone())
            .ok_or_else(|| TxError::MissingOutput {
                tx_id: self.prev_tx_id(),
                index: self.prev_index,
            })
    }
}

impl WireEncode for TxIn {
    fn encode(&self, buf: &mut dyn BufMut) {
        let mut prev_tx = self.prev_tx;
        prev_tx.reverse();
        prev_tx.encode(buf);
        self.prev_index.encode(buf);
        self.script_sig.encode(buf);
        self.sequence.encode(buf);
    }
}

impl WireDecode for TxIn {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (mut prev_tx, rest) =
            read_array::<32>(buf).map_err(|e| e.with_context("input prev_tx"))?;
        prev_tx.reverse();
        let (prev_index, rest) =
            read_u32_le(rest).map_err(|e| e.with_context("input prev_index"))?;
        let (script_sig, rest) = Script::decode_unfinished(rest)?;
        let (sequence, rest) =
            read_u32_le(rest).map_err(|e| e.with_context("input sequence"))?;
        Ok((
            Self {
                prev_tx,
                prev_index,
                script_sig,
                sequence,
            },
            rest,
        ))
    }
}

impl std::fmt::Display for TxIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prev_tx_id(), self.prev_index)
    }
}

/// A transaction output: an amount locked by a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub amount: u64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(amount: u64, script_pubkey: Script) -> Self {
        Self {
            amount,
            script_pubkey,
        }
    }
}

impl WireEncode for TxOut {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.amount.encode(buf);
        self.script_pubkey.encode(buf);
    }
}

impl WireDecode for TxOut {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (amount, rest) = read_u64_le(buf).map_err(|e| e.with_context("output amount"))?;
        let (script_pubkey, rest) = Script::decode_unfinished(rest)?;
        Ok((
            Self {
                amount,
                script_pubkey,
            },
            rest,
        ))
    }
}

impl std::fmt::Display for TxOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.amount, self.script_pubkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Block 277316's much-reproduced single-input two-output payment.
    const RAW_TX: &[u8] = &hex!(
        "0100000001813f79011acb80925dfe69b3def355fe914bd1d96a3f5f71bf8303c6a989\
         c7d1000000006b483045022100ed81ff192e75a3fd2304004dcadb746fa5e24c5031cc\
         fcf21320b0277457c98f02207a986d955c6e0cb35d446a89d3f56100f4d7f67801c319\
         67743a9c8e10615bed01210349fc4e631e3624a545de3f89f5d8684c7b8138bd94bdd5\
         31d2e213bf016b278afeffffff02a135ef01000000001976a914bc3b654dca7e56b04d\
         ca18f2566cdaf02e8d9ada88ac99c39800000000001976a9141c4bc762dd5423e33216\
         6702cb75f40df79fea1288ac19430600"
    );

    #[test]
    fn parses_every_field() {
        let tx = Tx::parse(RAW_TX, false).unwrap();

        assert_eq!(tx.version, 1);
        assert_eq!(tx.tx_ins.len(), 1);

        let mut prev_tx =
            hex!("813f79011acb80925dfe69b3def355fe914bd1d96a3f5f71bf8303c6a989c7d1");
        prev_tx.reverse();
        assert_eq!(tx.tx_ins[0].prev_tx, prev_tx);
        assert_eq!(tx.tx_ins[0].prev_index, 0);
        assert_eq!(tx.tx_ins[0].sequence, 0xfffffffe);
        assert_eq!(tx.tx_ins[0].script_sig.cmds().len(), 2);

        assert_eq!(tx.tx_outs.len(), 2);
        assert_eq!(tx.tx_outs[0].amount, 0x01ef35a1);
        assert_eq!(tx.tx_outs[1].amount, 0x0098c399);
        assert_eq!(tx.tx_outs[0].script_pubkey.cmds().len(), 5);

        assert_eq!(tx.lock_time, 0x00064319);
    }

    #[test]
    fn serialization_round_trips_byte_exactly() {
        let tx = Tx::parse(RAW_TX, false).unwrap();
        assert_eq!(tx.serialize(), RAW_TX);
    }

    #[test]
    fn hash_and_id() {
        let tx = Tx::parse(RAW_TX, false).unwrap();
        assert_eq!(
            tx.hash(),
            hex!("452c629d67e41baec3ac6f04fe744b4b9617f8f859c63b3002f8684e7a4fee03")
        );
        assert_eq!(
            tx.id(),
            "452c629d67e41baec3ac6f04fe744b4b9617f8f859c63b3002f8684e7a4fee03"
        );
    }

    #[test]
    fn truncated_transactions_fail_to_parse() {
        assert!(Tx::parse(&RAW_TX[..RAW_TX.len() - 1], false).is_err());
        assert!(Tx::parse(&RAW_TX[..10], false).is_err());
        assert!(Tx::parse(&[], false).is_err());
    }

    #[test]
    fn trailing_bytes_fail_to_parse() {
        let mut extended = RAW_TX.to_vec();
        extended.push(0x00);
        assert!(Tx::parse(&extended, false).is_err());
    }

    #[test]
    fn display_leads_with_the_id() {
        let tx = Tx::parse(RAW_TX, false).unwrap();
        let rendered = format!("{tx}");
        assert!(rendered.starts_with("tx: 452c629d"));
        assert!(rendered.contains("version: 1"));
        assert!(rendered.ends_with("lock_time: 410393"));
    }

    #[test]
    fn tx_in_defaults() {
        let tx_in = TxIn::new([0xab; 32], 3);
        assert_eq!(tx_in.sequence, 0xffff_ffff);
        assert_eq!(tx_in.script_sig, Script::default());
        assert_eq!(tx_in.prev_tx_id(), "ab".repeat(32));
    }
}
