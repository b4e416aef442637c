use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CryptoError {
    #[error("Number {num} not in range 0 to {limit}")]
    OutOfRange { num: BigUint, limit: BigUint },
    #[error("Operands belong to different fields (F_{0} vs F_{1})")]
    MismatchedField(BigUint, BigUint),
    #[error("Points are not on the same curve")]
    MixedCurve,
    #[error("Division by zero in F_{0}")]
    ZeroDivision(BigUint),
    #[error("({x}, {y}) is not on the curve")]
    NotOnCurve { x: BigUint, y: BigUint },
    #[error("Malformed DER signature: {0}")]
    BadDer(&'static str),
    #[error("Malformed SEC point: {0}")]
    BadSec(&'static str),
    #[error("The point at infinity has no affine encoding")]
    InfinityEncoding,
}
