//! Checked Decimal arithmetic that reports which tier overflowed.

use rust_decimal::Decimal;

use crate::error::{ChainError, ChainResult};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Checked {
    pub tier: u8,
}

impl Checked {
    pub fn at(tier: u8) -> Self {
        Self { tier }
    }

    fn lift(&self, result: Option<Decimal>, operation: &'static str) -> ChainResult<Decimal> {
        result.ok_or(ChainError::PrecisionLoss {
            tier: self.tier,
            operation,
        })
    }

    pub fn add(&self, a: Decimal, b: Decimal) -> ChainResult<Decimal> {
        self.lift(a.checked_add(b), "addition")
    }

    pub fn sub(&self, a: Decimal, b: Decimal) -> ChainResult<Decimal> {
        self.lift(a.checked_sub(b), "subtraction")
    }

    pub fn mul(&self, a: Decimal, b: Decimal) -> ChainResult<Decimal> {
        self.lift(a.checked_mul(b), "multiplication")
    }

    pub fn div(&self, a: Decimal, b: Decimal) -> ChainResult<Decimal> {
        self.lift(a.checked_div(b), "division")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_reported_with_tier() {
        let err = Checked::at(3).mul(Decimal::MAX, Decimal::TWO).unwrap_err();
        assert!(matches!(
            err,
            ChainError::PrecisionLoss { tier: 3, operation: "multiplication" }
        ));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(Checked::at(4).div(Decimal::ONE, Decimal::ZERO).is_err());
    }

    #[test]
    fn exact_operations_pass_through() {
        let c = Checked::at(5);
        let sum = c.add(Decimal::new(1, 1), Decimal::new(2, 1)).unwrap();
        assert_eq!(sum, Decimal::new(3, 1));
        assert_eq!(c.sub(sum, Decimal::new(3, 1)).unwrap(), Decimal::ZERO);
    }
}
