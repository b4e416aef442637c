//! ECDSA signatures over secp256k1: DER encoding, deterministic signing
//! and wallet-import formatting.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::base58::encode_base58check;
use crate::error::CryptoError;
use crate::hash::hmac_sha256;
use crate::secp256k1::{G, N, S256Point, to_32_be};

const DER_COMPOUND: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;

const WIF_VERSION_MAINNET: u8 = 0x80;
const WIF_VERSION_TESTNET: u8 = 0xef;

/// An ECDSA signature `(r, s)`, canonicalized to low-s at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// DER serialization: `0x30 len (0x02 len r) (0x02 len s)` with each
    /// scalar big-endian, stripped of leading zeros, and padded with one
    /// `0x00` when its high bit would read as a sign bit.
    pub fn der(&self) -> Vec<u8> {
        fn encode_scalar(value: &BigUint) -> Vec<u8> {
            let mut bytes = value.to_bytes_be();
            if bytes.first().is_some_and(|byte| byte & 0x80 != 0) {
                bytes.insert(0, 0x00);
            }
            bytes
        }

        let r_bytes = encode_scalar(&self.r);
        let s_bytes = encode_scalar(&self.s);
        let mut out = Vec::with_capacity(6 + r_bytes.len() + s_bytes.len());
        out.push(DER_COMPOUND);
        out.push((4 + r_bytes.len() + s_bytes.len()) as u8);
        out.push(DER_INTEGER);
        out.push(r_bytes.len() as u8);
        out.extend_from_slice(&r_bytes);
        out.push(DER_INTEGER);
        out.push(s_bytes.len() as u8);
        out.extend_from_slice(&s_bytes);
        out
    }

    pub fn parse(der: &[u8]) -> Result<Self, CryptoError> {
        let compound = *der.first().ok_or(CryptoError::BadDer("empty input"))?;
        if compound != DER_COMPOUND {
            return Err(CryptoError::BadDer("missing compound marker"));
        }
        let declared = *der.get(1).ok_or(CryptoError::BadDer("missing length"))? as usize;
        if declared + 2 != der.len() {
            return Err(CryptoError::BadDer("declared length disagrees with input"));
        }

        let (r, rest) = Self::parse_scalar(&der[2..])?;
        let (s, rest) = Self::parse_scalar(rest)?;
        if !rest.is_empty() {
            return Err(CryptoError::BadDer("trailing bytes"));
        }
        // The components' own framing must add back up to the total.
        let r_len = der[3] as usize;
        let s_len = der[5 + r_len] as usize;
        if 6 + r_len + s_len != der.len() {
            return Err(CryptoError::BadDer("component lengths disagree with input"));
        }
        Ok(Self { r, s })
    }

    fn parse_scalar(buf: &[u8]) -> Result<(BigUint, &[u8]), CryptoError> {
        let marker = *buf.first().ok_or(CryptoError::BadDer("missing integer marker"))?;
        if marker != DER_INTEGER {
            return Err(CryptoError::BadDer("missing integer marker"));
        }
        let length = *buf.get(1).ok_or(CryptoError::BadDer("missing integer length"))? as usize;
        let bytes = buf
            .get(2..2 + length)
            .ok_or(CryptoError::BadDer("integer shorter than declared"))?;
        Ok((BigUint::from_bytes_be(bytes), &buf[2 + length..]))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({:x}, {:x})", self.r, self.s)
    }
}

/// A secret scalar with its cached public point.
///
/// Signing is deterministic (RFC 6979), so identical `(secret, z)` pairs
/// always produce identical signatures.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    secret: BigUint,
    point: S256Point,
}

impl PrivateKey {
    pub fn new(secret: BigUint) -> Result<Self, CryptoError> {
        if secret.is_zero() || secret >= *N {
            return Err(CryptoError::OutOfRange {
                num: secret,
                limit: N.clone(),
            });
        }
        let point = G.mul(&secret)?;
        Ok(Self { secret, point })
    }

    pub fn point(&self) -> &S256Point {
        &self.point
    }

    /// The secret as 64 hex characters.
    pub fn hex(&self) -> String {
        format!("{:064x}", self.secret)
    }

    pub fn sign(&self, z: &BigUint) -> Result<Signature, CryptoError> {
        let k = self.deterministic_k(z);
        let r_point = G.mul(&k)?;
        let r = match r_point.point().x() {
            Some(x) => x.num() % &*N,
            None => return Err(CryptoError::InfinityEncoding),
        };
        let k_inv = k.modpow(&(&*N - 2u32), &N);
        let mut s = (z + &r * &self.secret) * k_inv % &*N;
        if s > (&*N >> 1) {
            s = &*N - s;
        }
        Ok(Signature::new(r, s))
    }

    /// RFC 6979: derive the nonce from HMAC-SHA-256 chains over the
    /// secret and message until a candidate lands in `[1, N)`.
    fn deterministic_k(&self, z: &BigUint) -> BigUint {
        let mut k = [0u8; 32];
        let mut v = [1u8; 32];
        let z_bytes = to_32_be(&(z % &*N));
        let secret_bytes = to_32_be(&self.secret);

        k = hmac_sha256(&k, &[&v, &[0x00], &secret_bytes, &z_bytes]);
        v = hmac_sha256(&k, &[&v]);
        k = hmac_sha256(&k, &[&v, &[0x01], &secret_bytes, &z_bytes]);
        v = hmac_sha256(&k, &[&v]);
        loop {
            v = hmac_sha256(&k, &[&v]);
            let candidate = BigUint::from_bytes_be(&v);
            if candidate >= BigUint::one() && candidate < *N {
                return candidate;
            }
            k = hmac_sha256(&k, &[&v, &[0x00]]);
            v = hmac_sha256(&k, &[&v]);
        }
    }

    /// Wallet-import format: `Base58Check(version ‖ secret ‖ [0x01])`.
    pub fn wif(&self, compressed: bool, testnet: bool) -> String {
        let version = if testnet {
            WIF_VERSION_TESTNET
        } else {
            WIF_VERSION_MAINNET
        };
        let mut payload = vec![version];
        payload.extend_from_slice(&to_32_be(&self.secret));
        if compressed {
            payload.push(0x01);
        }
        encode_base58check(&payload)
    }
}
