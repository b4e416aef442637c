//! # rbtc-crypto
//!
//! Cryptographic primitives for the legacy Bitcoin transaction layer.
//!
//! The centerpiece is a from-scratch secp256k1 implementation: modular
//! arithmetic over an arbitrary prime field, the affine group law, and
//! ECDSA with RFC 6979 deterministic nonces. Around it sit the byte-level
//! codecs the ecosystem expects — SEC points, DER signatures, Base58Check
//! addresses and WIF keys — plus the hash functions the script layer and
//! transaction ids are built on.
//!
//! ## Modules
//!
//! - [`hash`]: SHA-256, double SHA-256, RIPEMD-160∘SHA-256, SHA-1, HMAC
//! - [`base58`]: Base58 and Base58Check encoding
//! - [`field`]: [`FieldElement`](field::FieldElement) modular arithmetic
//! - [`point`]: the affine curve [`Point`](point::Point) group law
//! - [`secp256k1`]: curve constants, [`S256Point`](secp256k1::S256Point),
//!   SEC encoding, addresses
//! - [`ecdsa`]: [`Signature`](ecdsa::Signature), DER,
//!   [`PrivateKey`](ecdsa::PrivateKey), signing and WIF
//!
//! ## Quick Start
//!
//! ```rust
//! use num_bigint::BigUint;
//! use rbtc_crypto::ecdsa::PrivateKey;
//!
//! let key = PrivateKey::new(BigUint::from(12345u32)).unwrap();
//! let z = BigUint::from(0xdeadbeefu32);
//! let sig = key.sign(&z).unwrap();
//! assert!(key.point().verify(&z, &sig));
//! ```

pub mod base58;
pub mod ecdsa;
pub mod error;
pub mod field;
pub mod hash;
pub mod point;
pub mod secp256k1;
