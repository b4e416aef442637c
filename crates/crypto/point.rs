//! The affine group law on `y² = x³ + ax + b`.

use num_bigint::{BigInt, BigUint};

use crate::error::CryptoError;
use crate::field::FieldElement;

/// An affine point on the curve `y² = x³ + ax + b` over some `F_p`.
///
/// The point at infinity — the group identity — is represented by absent
/// coordinates. Non-identity points are validated against the curve
/// equation at construction, so every `Point` in circulation satisfies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    x: Option<FieldElement>,
    y: Option<FieldElement>,
    a: FieldElement,
    b: FieldElement,
}

impl Point {
    pub fn new(
        x: FieldElement,
        y: FieldElement,
        a: FieldElement,
        b: FieldElement,
    ) -> Result<Self, CryptoError> {
        // y² = x³ + ax + b; the field ops also reject mixed moduli.
        let lhs = y.mul(&y)?;
        let x_cubed = x.mul(&x)?.mul(&x)?;
        let rhs = x_cubed.add(&a.mul(&x)?)?.add(&b)?;
        if lhs != rhs {
            return Err(CryptoError::NotOnCurve {
                x: x.num().clone(),
                y: y.num().clone(),
            });
        }
        Ok(Self {
            x: Some(x),
            y: Some(y),
            a,
            b,
        })
    }

    /// The identity element of the curve's group.
    pub fn infinity(a: FieldElement, b: FieldElement) -> Self {
        Self {
            x: None,
            y: None,
            a,
            b,
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_none()
    }

    pub fn x(&self) -> Option<&FieldElement> {
        self.x.as_ref()
    }

    pub fn y(&self) -> Option<&FieldElement> {
        self.y.as_ref()
    }

    pub fn a(&self) -> &FieldElement {
        &self.a
    }

    pub fn b(&self) -> &FieldElement {
        &self.b
    }

    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        if self.a != other.a || self.b != other.b {
            return Err(CryptoError::MixedCurve);
        }

        let (x1, y1) = match (&self.x, &self.y) {
            (Some(x), Some(y)) => (x, y),
            _ => return Ok(other.clone()),
        };
        let (x2, y2) = match (&other.x, &other.y) {
            (Some(x), Some(y)) => (x, y),
            _ => return Ok(self.clone()),
        };

        // Vertical line: the points are inverses of each other.
        if x1 == x2 && y1 != y2 {
            return Ok(Self::infinity(self.a.clone(), self.b.clone()));
        }

        // Tangent at a 2-torsion point is vertical.
        if self == other && y1.is_zero() {
            return Ok(Self::infinity(self.a.clone(), self.b.clone()));
        }

        let slope = if self == other {
            // Doubling: s = (3x₁² + a) / (2y₁)
            let numerator = x1.mul(x1)?.scalar_mul(&BigInt::from(3)).add(&self.a)?;
            let denominator = y1.scalar_mul(&BigInt::from(2));
            numerator.div(&denominator)?
        } else {
            // Chord: s = (y₂ − y₁) / (x₂ − x₁)
            y2.sub(y1)?.div(&x2.sub(x1)?)?
        };

        let x3 = slope.mul(&slope)?.sub(x1)?.sub(x2)?;
        let y3 = slope.mul(&x1.sub(&x3)?)?.sub(y1)?;
        Ok(Self {
            x: Some(x3),
            y: Some(y3),
            a: self.a.clone(),
            b: self.b.clone(),
        })
    }

    /// Double-and-add over the bits of `coefficient`, LSB first.
    pub fn scalar_mul(&self, coefficient: &BigUint) -> Result<Self, CryptoError> {
        let mut coefficient = coefficient.clone();
        let mut current = self.clone();
        let mut result = Self::infinity(self.a.clone(), self.b.clone());
        while coefficient.bits() > 0 {
            if coefficient.bit(0) {
                result = result.add(&current)?;
            }
            current = current.add(&current)?;
            coefficient >>= 1;
        }
        Ok(result)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.x, &self.y) {
            (Some(x), Some(y)) => write!(
                f,
                "Point({}, {})_{}_{} over F_{}",
                x.num(),
                y.num(),
                self.a.num(),
                self.b.num(),
                x.prime()
            ),
            _ => write!(f, "Point(infinity)"),
        }
    }
}
