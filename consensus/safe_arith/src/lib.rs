//! Checked arithmetic for the primitives used throughout consensus code.
//!
//! Ethereum consensus balances and slots are adversarially influenced inputs; silently wrapping
//! or saturating them can turn an attacker's overflow into a consensus-affecting state
//! transition. Every arithmetic operation performed during block/epoch processing should go
//! through this trait instead of the bare operators.

use std::fmt::Debug;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ArithError {
    Overflow,
    DivisionByZero,
}

pub trait SafeArith<Rhs = Self>: Sized + Copy {
    const ZERO: Self;
    const ONE: Self;

    fn safe_add(&self, other: Rhs) -> Result<Self, ArithError>;
    fn safe_sub(&self, other: Rhs) -> Result<Self, ArithError>;
    fn safe_mul(&self, other: Rhs) -> Result<Self, ArithError>;
    fn safe_div(&self, other: Rhs) -> Result<Self, ArithError>;
    fn safe_rem(&self, other: Rhs) -> Result<Self, ArithError>;

    fn safe_add_assign(&mut self, other: Rhs) -> Result<(), ArithError> {
        *self = self.safe_add(other)?;
        Ok(())
    }

    fn safe_sub_assign(&mut self, other: Rhs) -> Result<(), ArithError> {
        *self = self.safe_sub(other)?;
        Ok(())
    }

    fn safe_mul_assign(&mut self, other: Rhs) -> Result<(), ArithError> {
        *self = self.safe_mul(other)?;
        Ok(())
    }
}

macro_rules! impl_safe_arith {
    ($ty:ty) => {
        impl SafeArith for $ty {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            fn safe_add(&self, other: Self) -> Result<Self, ArithError> {
                self.checked_add(other).ok_or(ArithError::Overflow)
            }

            fn safe_sub(&self, other: Self) -> Result<Self, ArithError> {
                self.checked_sub(other).ok_or(ArithError::Overflow)
            }

            fn safe_mul(&self, other: Self) -> Result<Self, ArithError> {
                self.checked_mul(other).ok_or(ArithError::Overflow)
            }

            fn safe_div(&self, other: Self) -> Result<Self, ArithError> {
                if other == 0 {
                    Err(ArithError::DivisionByZero)
                } else {
                    self.checked_div(other).ok_or(ArithError::Overflow)
                }
            }

            fn safe_rem(&self, other: Self) -> Result<Self, ArithError> {
                if other == 0 {
                    Err(ArithError::DivisionByZero)
                } else {
                    self.checked_rem(other).ok_or(ArithError::Overflow)
                }
            }
        }
    };
}

impl_safe_arith!(u64);
impl_safe_arith!(u32);
impl_safe_arith!(usize);
impl_safe_arith!(i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow() {
        assert_eq!(u64::MAX.safe_add(1), Err(ArithError::Overflow));
        assert_eq!(1u64.safe_add(1), Ok(2));
    }

    #[test]
    fn sub_underflow() {
        assert_eq!(0u64.safe_sub(1), Err(ArithError::Overflow));
        assert_eq!(5u64.safe_sub(1), Ok(4));
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(5u64.safe_div(0), Err(ArithError::DivisionByZero));
        assert_eq!(6u64.safe_div(2), Ok(3));
    }

    #[test]
    fn assign_helpers() {
        let mut x = 10u64;
        x.safe_add_assign(5).unwrap();
        assert_eq!(x, 15);
        x.safe_sub_assign(20).unwrap_err();
    }
}
