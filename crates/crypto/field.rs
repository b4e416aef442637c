//! Modular arithmetic over a prime field `F_p`.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::error::CryptoError;

/// An element of `F_p`: an integer in `[0, p)` paired with its modulus.
///
/// Binary operations are only defined between elements of the same field;
/// mixing moduli fails with [`CryptoError::MismatchedField`]. Values are
/// immutable — every operation returns a fresh element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    num: BigUint,
    prime: BigUint,
}

impl FieldElement {
    pub fn new(num: BigUint, prime: BigUint) -> Result<Self, CryptoError> {
        if num >= prime {
            return Err(CryptoError::OutOfRange { num, limit: prime });
        }
        Ok(Self { num, prime })
    }

    /// Convenience constructor for small fields (tests and pedagogical curves).
    pub fn from_u64(num: u64, prime: u64) -> Result<Self, CryptoError> {
        Self::new(BigUint::from(num), BigUint::from(prime))
    }

    pub fn num(&self) -> &BigUint {
        &self.num
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    fn same_field(&self, other: &Self) -> Result<(), CryptoError> {
        if self.prime != other.prime {
            return Err(CryptoError::MismatchedField(
                self.prime.clone(),
                other.prime.clone(),
            ));
        }
        Ok(())
    }

    /// Constructs an element by reducing `num` into `[0, prime)`.
    ///
    /// Infallible counterpart of [`new`](Self::new) for values that are
    /// reduced (or reducible) by construction, such as curve constants.
    pub(crate) fn new_reduced(num: BigUint, prime: BigUint) -> Self {
        Self {
            num: num % &prime,
            prime,
        }
    }

    fn reduced(&self, num: BigUint) -> Self {
        Self::new_reduced(num, self.prime.clone())
    }

    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        Ok(self.reduced(&self.num + &other.num))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        // Lift into [p, 2p) before subtracting so the magnitude stays positive.
        Ok(self.reduced(&self.num + &self.prime - &other.num))
    }

    pub fn mul(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        Ok(self.reduced(&self.num * &other.num))
    }

    /// Fermat division: `a / b = a · b^(p−2) mod p`.
    pub fn div(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        if other.num.is_zero() {
            return Err(CryptoError::ZeroDivision(self.prime.clone()));
        }
        let exponent = &self.prime - 2u32;
        let inverse = other.num.modpow(&exponent, &self.prime);
        Ok(self.reduced(&self.num * inverse))
    }

    /// Raises the element to an arbitrary (possibly negative) exponent.
    ///
    /// The exponent is reduced modulo `p−1` (Fermat's little theorem),
    /// which also turns negative exponents into inverse powers. Zero is
    /// its own power for every nonzero exponent — the reduction must not
    /// be allowed to fabricate `0^(p−1) = 1`.
    pub fn pow(&self, exponent: &BigInt) -> Self {
        if self.num.is_zero() {
            let num = if exponent.is_zero() {
                BigUint::one()
            } else {
                BigUint::zero()
            };
            return Self {
                num: num % &self.prime,
                prime: self.prime.clone(),
            };
        }

        let order = BigInt::from_biguint(Sign::Plus, &self.prime - 1u32);
        let mut reduced = exponent % &order;
        if reduced.sign() == Sign::Minus {
            reduced += &order;
        }
        Self {
            num: self.num.modpow(reduced.magnitude(), &self.prime),
            prime: self.prime.clone(),
        }
    }

    /// Multiplies by an arbitrary integer coefficient, reducing into `[0, p)`.
    pub fn scalar_mul(&self, coefficient: &BigInt) -> Self {
        let prime = BigInt::from_biguint(Sign::Plus, self.prime.clone());
        let mut reduced = coefficient % &prime;
        if reduced.sign() == Sign::Minus {
            reduced += &prime;
        }
        self.reduced(&self.num * reduced.magnitude())
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement_{}({})", self.prime, self.num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(num: u64, prime: u64) -> FieldElement {
        FieldElement::from_u64(num, prime).unwrap()
    }

    #[test]
    fn equality_requires_matching_num_and_prime() {
        assert_eq!(fe(10, 13), fe(10, 13));
        assert_ne!(fe(10, 13), fe(6, 13));
        assert_ne!(fe(6, 13), fe(6, 11));
    }

    #[test]
    fn construction_rejects_out_of_range() {
        assert!(FieldElement::from_u64(13, 13).is_err());
        assert!(FieldElement::from_u64(14, 13).is_err());
        assert!(FieldElement::from_u64(0, 13).is_ok());
    }

    #[test]
    fn add_wraps_at_the_modulus() {
        assert_eq!(fe(7, 19).add(&fe(11, 19)).unwrap(), fe(18, 19));
        assert_eq!(fe(7, 19).add(&fe(12, 19)).unwrap(), fe(0, 19));
        assert_eq!(fe(7, 19).add(&fe(18, 19)).unwrap(), fe(6, 19));
        assert_eq!(fe(7, 19).add(&fe(0, 19)).unwrap(), fe(7, 19));
        assert_eq!(
            fe(7, 19).add(&fe(1, 13)),
            Err(CryptoError::MismatchedField(19u32.into(), 13u32.into()))
        );
    }

    #[test]
    fn sub_wraps_below_zero() {
        assert_eq!(fe(11, 19).sub(&fe(9, 19)).unwrap(), fe(2, 19));
        assert_eq!(fe(6, 19).sub(&fe(13, 19)).unwrap(), fe(12, 19));
        assert_eq!(fe(11, 19).sub(&fe(0, 19)).unwrap(), fe(11, 19));
        assert!(fe(11, 19).sub(&fe(1, 13)).is_err());
    }

    #[test]
    fn mul_reduces_products() {
        assert_eq!(fe(5, 19).mul(&fe(3, 19)).unwrap(), fe(15, 19));
        assert_eq!(fe(8, 19).mul(&fe(17, 19)).unwrap(), fe(3, 19));
        assert_eq!(fe(5, 19).mul(&fe(0, 19)).unwrap(), fe(0, 19));
        assert!(fe(5, 19).mul(&fe(1, 13)).is_err());
    }

    #[test]
    fn pow_handles_negative_exponents() {
        assert_eq!(fe(7, 19).pow(&BigInt::from(3)), fe(1, 19));
        assert_eq!(fe(9, 19).pow(&BigInt::from(12)), fe(7, 19));
        assert_eq!(fe(7, 19).pow(&BigInt::from(0)), fe(1, 19));
        assert_eq!(fe(9, 19).pow(&BigInt::from(1)), fe(9, 19));
        assert_eq!(fe(7, 13).pow(&BigInt::from(-3)), fe(8, 13));
    }

    #[test]
    fn pow_of_zero_stays_zero() {
        assert_eq!(fe(0, 19).pow(&BigInt::from(3)), fe(0, 19));
        // Exponent reduction alone would return 1 here.
        assert_eq!(fe(0, 19).pow(&BigInt::from(18)), fe(0, 19));
        assert_eq!(fe(0, 19).pow(&BigInt::from(0)), fe(1, 19));
    }

    #[test]
    fn div_is_fermat_inverse() {
        assert_eq!(fe(7, 19).div(&fe(5, 19)).unwrap(), fe(9, 19));
        assert_eq!(fe(2, 19).div(&fe(7, 19)).unwrap(), fe(3, 19));
        assert_eq!(fe(7, 19).div(&fe(1, 19)).unwrap(), fe(7, 19));
        assert!(fe(7, 19).div(&fe(10, 11)).is_err());
        assert_eq!(
            fe(7, 19).div(&fe(0, 19)),
            Err(CryptoError::ZeroDivision(19u32.into()))
        );
    }

    #[test]
    fn scalar_mul_accepts_negative_coefficients() {
        assert_eq!(fe(5, 19).scalar_mul(&BigInt::from(4)), fe(1, 19));
        assert_eq!(fe(5, 19).scalar_mul(&BigInt::from(-1)), fe(14, 19));
        assert_eq!(fe(5, 19).scalar_mul(&BigInt::from(0)), fe(0, 19));
    }

    #[test]
    fn field_laws_hold_over_f19() {
        let prime = 19u64;
        for a in 0..prime {
            for b in 0..prime {
                let fa = fe(a, prime);
                let fb = fe(b, prime);
                // commutativity; closure is implied by the constructor check
                assert_eq!(fa.add(&fb).unwrap(), fb.add(&fa).unwrap());
                assert_eq!(fa.mul(&fb).unwrap(), fb.mul(&fa).unwrap());
                for c in 0..prime {
                    let fc = fe(c, prime);
                    assert_eq!(
                        fa.add(&fb).unwrap().add(&fc).unwrap(),
                        fa.add(&fb.add(&fc).unwrap()).unwrap()
                    );
                    assert_eq!(
                        fa.mul(&fb).unwrap().mul(&fc).unwrap(),
                        fa.mul(&fb.mul(&fc).unwrap()).unwrap()
                    );
                }
            }
        }
        // a · a^(p−2) = 1 and a^(p−1) = 1 for a ≠ 0
        for a in 1..prime {
            let fa = fe(a, prime);
            let inverse = fa.pow(&BigInt::from(prime as i64 - 2));
            assert_eq!(fa.mul(&inverse).unwrap(), fe(1, prime));
            assert_eq!(fa.pow(&BigInt::from(prime as i64 - 1)), fe(1, prime));
        }
    }
}
