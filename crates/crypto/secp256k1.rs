//! The secp256k1 curve: constants, point type, SEC encoding and addresses.

use hex_literal::hex;
use lazy_static::lazy_static;
use num_bigint::BigUint;

use crate::base58::encode_base58check;
use crate::error::CryptoError;
use crate::field::FieldElement;
use crate::hash::hash160;
use crate::point::Point;

lazy_static! {
    /// The field prime `2^256 − 2^32 − 977`.
    pub static ref P: BigUint = BigUint::from_bytes_be(&hex!(
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"
    ));
    /// The order of the generator.
    pub static ref N: BigUint = BigUint::from_bytes_be(&hex!(
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
    ));
    static ref GX: BigUint = BigUint::from_bytes_be(&hex!(
        "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
    ));
    static ref GY: BigUint = BigUint::from_bytes_be(&hex!(
        "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
    ));
    /// The generator point.
    pub static ref G: S256Point = {
        // The generator coordinates satisfy the curve equation.
        #[allow(clippy::unwrap_used)]
        let generator = S256Point::new(GX.clone(), GY.clone()).unwrap();
        generator
    };
}

const SEC_UNCOMPRESSED: u8 = 0x04;
const SEC_EVEN: u8 = 0x02;
const SEC_ODD: u8 = 0x03;

const ADDRESS_VERSION_MAINNET: u8 = 0x00;
const ADDRESS_VERSION_TESTNET: u8 = 0x6f;

fn field_element(num: BigUint) -> Result<FieldElement, CryptoError> {
    FieldElement::new(num, P.clone())
}

fn curve_a() -> FieldElement {
    FieldElement::new_reduced(BigUint::from(0u32), P.clone())
}

fn curve_b() -> FieldElement {
    FieldElement::new_reduced(BigUint::from(7u32), P.clone())
}

/// Square root in `F_P`, using `P ≡ 3 (mod 4)`: `√v = v^((P+1)/4)`.
fn sqrt(value: &FieldElement) -> FieldElement {
    let exponent = (&*P + 1u32) >> 2;
    let num = value.num().modpow(&exponent, &P);
    FieldElement::new_reduced(num, P.clone())
}

/// Serializes a scalar as exactly 32 big-endian bytes.
pub(crate) fn to_32_be(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// A point on secp256k1. Scalar multiplication reduces its argument
/// modulo the group order `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S256Point(Point);

impl S256Point {
    pub fn new(x: BigUint, y: BigUint) -> Result<Self, CryptoError> {
        let point = Point::new(field_element(x)?, field_element(y)?, curve_a(), curve_b())?;
        Ok(Self(point))
    }

    pub fn infinity() -> Self {
        Self(Point::infinity(curve_a(), curve_b()))
    }

    pub fn is_infinity(&self) -> bool {
        self.0.is_infinity()
    }

    pub fn point(&self) -> &Point {
        &self.0
    }

    pub fn mul(&self, coefficient: &BigUint) -> Result<Self, CryptoError> {
        let reduced = coefficient % &*N;
        Ok(Self(self.0.scalar_mul(&reduced)?))
    }

    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        Ok(Self(self.0.add(&other.0)?))
    }

    /// SEC serialization: `0x04 ‖ x ‖ y` uncompressed, or
    /// `0x02/0x03 ‖ x` with the prefix carrying y's parity.
    pub fn sec(&self, compressed: bool) -> Result<Vec<u8>, CryptoError> {
        let (x, y) = match (self.0.x(), self.0.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(CryptoError::InfinityEncoding),
        };
        let x_bytes = to_32_be(x.num());
        if compressed {
            let prefix = if y.num().bit(0) { SEC_ODD } else { SEC_EVEN };
            let mut out = Vec::with_capacity(33);
            out.push(prefix);
            out.extend_from_slice(&x_bytes);
            Ok(out)
        } else {
            let mut out = Vec::with_capacity(65);
            out.push(SEC_UNCOMPRESSED);
            out.extend_from_slice(&x_bytes);
            out.extend_from_slice(&to_32_be(y.num()));
            Ok(out)
        }
    }

    /// Parses a SEC-encoded point, recovering y from the curve equation
    /// for the compressed forms.
    pub fn parse(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.first() {
            Some(&SEC_UNCOMPRESSED) => {
                if bytes.len() != 65 {
                    return Err(CryptoError::BadSec("uncompressed point must be 65 bytes"));
                }
                let x = BigUint::from_bytes_be(&bytes[1..33]);
                let y = BigUint::from_bytes_be(&bytes[33..65]);
                Self::new(x, y)
            }
            Some(&(prefix @ (SEC_EVEN | SEC_ODD))) => {
                if bytes.len() != 33 {
                    return Err(CryptoError::BadSec("compressed point must be 33 bytes"));
                }
                let x = field_element(BigUint::from_bytes_be(&bytes[1..33]))?;
                // y² = x³ + 7
                let alpha = x.mul(&x)?.mul(&x)?.add(&curve_b())?;
                let beta = sqrt(&alpha);
                let even_beta = if beta.num().bit(0) {
                    FieldElement::new(&*P - beta.num(), P.clone())?
                } else {
                    beta.clone()
                };
                let odd_beta = if beta.num().bit(0) {
                    beta
                } else {
                    FieldElement::new(&*P - beta.num(), P.clone())?
                };
                let y = if prefix == SEC_EVEN { even_beta } else { odd_beta };
                Self::new(x.num().clone(), y.num().clone())
            }
            Some(_) => Err(CryptoError::BadSec("unknown prefix byte")),
            None => Err(CryptoError::BadSec("empty input")),
        }
    }

    /// `hash160` of the SEC serialization.
    pub fn hash160(&self, compressed: bool) -> Result<[u8; 20], CryptoError> {
        Ok(hash160(&self.sec(compressed)?))
    }

    /// P2PKH address: `Base58Check(version ‖ hash160(SEC))`.
    pub fn address(&self, compressed: bool, testnet: bool) -> Result<String, CryptoError> {
        let version = if testnet {
            ADDRESS_VERSION_TESTNET
        } else {
            ADDRESS_VERSION_MAINNET
        };
        let mut payload = vec![version];
        payload.extend_from_slice(&self.hash160(compressed)?);
        Ok(encode_base58check(&payload))
    }

    /// ECDSA verification: `(z·s⁻¹·G + r·s⁻¹·P).x == r`.
    pub fn verify(&self, z: &BigUint, sig: &crate::ecdsa::Signature) -> bool {
        self.verify_inner(z, sig).unwrap_or(false)
    }

    fn verify_inner(
        &self,
        z: &BigUint,
        sig: &crate::ecdsa::Signature,
    ) -> Result<bool, CryptoError> {
        let s_inv = sig.s().modpow(&(&*N - 2u32), &N);
        let u = z * &s_inv % &*N;
        let v = sig.r() * &s_inv % &*N;
        let total = G.mul(&u)?.add(&self.mul(&v)?)?;
        match total.0.x() {
            Some(x) => Ok(x.num() == sig.r()),
            None => Ok(false),
        }
    }
}

impl std::fmt::Display for S256Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.0.x(), self.0.y()) {
            (Some(x), Some(y)) => {
                write!(f, "S256Point({:064x}, {:064x})", x.num(), y.num())
            }
            _ => write!(f, "S256Point(infinity)"),
        }
    }
}
