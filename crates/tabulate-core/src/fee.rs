//! # Fee Calculation
//!
//! Resolves one line item against the value of everything settled before
//! its tier (`P`).
//!
//! ## Fee Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cascade_percentage  back_into   FeeRule             percentage part   │
//! │  ──────────────────  ─────────   ─────────────────   ───────────────── │
//! │  false               false       Surcharge           P × p/100, added  │
//! │  true                false       Cut                 P × p/100, taken  │
//! │  false               true        BackedInSurcharge   P × p/(100+p)     │
//! │  true                true        BackedInCut         P × p/(100+p)     │
//! │                                                                         │
//! │  cascade_amount picks added/taken for the static part independently.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A backed-in fee solves `fee = (P - fee) × p/100`: the rate is quoted on
//! what remains once the fee is removed. $10.00 at a backed-in 10% is
//! $0.91, leaving $9.09, and 10% of $9.09 is $0.909.
//!
//! The line's own allocation is always `percentage part + amount`. The cascade
//! flags only decide who pays for it.

use rust_decimal::Decimal;

use crate::error::{SettlementError, TabulationResult};
use crate::money::Money;
use crate::types::{LineItem, Percentage};

// =============================================================================
// Fee Rule
// =============================================================================

/// How a line's percentage part is computed and sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeRule {
    /// Percentage of `P`, added on top of the total.
    Surcharge,
    /// Percentage of `P`, taken out of lower-priority lines.
    Cut,
    /// Backed-in percentage, added on top of the total.
    BackedInSurcharge,
    /// Backed-in percentage, taken out of lower-priority lines.
    BackedInCut,
}

impl FeeRule {
    /// Selects the rule from a line's flags.
    pub fn for_line(line: &LineItem) -> Self {
        match (line.cascade_percentage, line.back_into_percentage) {
            (false, false) => FeeRule::Surcharge,
            (true, false) => FeeRule::Cut,
            (false, true) => FeeRule::BackedInSurcharge,
            (true, true) => FeeRule::BackedInCut,
        }
    }

    /// Whether the percentage part is deducted from the pool.
    pub fn is_absorptive(&self) -> bool {
        matches!(self, FeeRule::Cut | FeeRule::BackedInCut)
    }

    fn is_backed_in(&self) -> bool {
        matches!(self, FeeRule::BackedInSurcharge | FeeRule::BackedInCut)
    }

    /// Exact (unrounded) percentage part for a pool value.
    fn exact_fee(&self, pool_value: Decimal, rate: Percentage) -> TabulationResult<Decimal> {
        let overflow = SettlementError::Overflow("percentage fee");
        if self.is_backed_in() {
            if rate.value() >= Decimal::ONE_HUNDRED {
                return Err(SettlementError::InvalidPercentage {
                    value: rate.value().to_string(),
                    reason: "a backed-in percentage must be below 100".to_string(),
                });
            }
            let divisor = Decimal::ONE_HUNDRED + rate.value();
            pool_value
                .checked_mul(rate.value())
                .and_then(|scaled| scaled.checked_div(divisor))
                .ok_or(overflow)
        } else {
            pool_value.checked_mul(rate.fraction()).ok_or(overflow)
        }
    }
}

// =============================================================================
// Fee Computation
// =============================================================================

/// The outcome of resolving a single line against `P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeComputation {
    pub rule: FeeRule,
    /// Percentage part, already rounded to the minor unit.
    pub percentage_fee: Money,
    /// The line's static amount.
    pub static_fee: Money,
    pub percentage_absorbed: bool,
    pub amount_absorbed: bool,
}

impl FeeComputation {
    /// The line's own final allocation.
    pub fn allocation(&self) -> TabulationResult<Money> {
        self.percentage_fee.checked_add(self.static_fee)
    }

    /// The part deducted proportionally from lower-priority lines.
    pub fn absorbed(&self) -> TabulationResult<Money> {
        self.select(true)
    }

    /// The part added on top of the running total.
    pub fn added(&self) -> TabulationResult<Money> {
        self.select(false)
    }

    fn select(&self, absorbed: bool) -> TabulationResult<Money> {
        let mut selected = Money::zero(self.static_fee.currency());
        if self.percentage_absorbed == absorbed {
            selected = selected.checked_add(self.percentage_fee)?;
        }
        if self.amount_absorbed == absorbed {
            selected = selected.checked_add(self.static_fee)?;
        }
        Ok(selected)
    }
}

/// Resolves `line` against the pre-tier pool value `pool_value`.
///
/// The percentage part is rounded half away from zero here, once, because
/// this is the point it becomes part of an allocation.
pub fn compute_fee(pool_value: Money, line: &LineItem) -> TabulationResult<FeeComputation> {
    pool_value.ensure_same_currency(&line.amount)?;
    let rule = FeeRule::for_line(line);

    let percentage_fee = if line.percentage.is_zero() {
        Money::zero(pool_value.currency())
    } else {
        let exact = rule.exact_fee(pool_value.to_decimal(), line.percentage)?;
        Money::from_decimal_rounded(exact, pool_value.currency())?
    };

    Ok(FeeComputation {
        rule,
        percentage_fee,
        static_fee: line.amount,
        percentage_absorbed: rule.is_absorptive(),
        amount_absorbed: line.cascade_amount,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::types::LineId;
    use rust_decimal_macros::dec;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    fn rate_line(percentage: Decimal) -> LineItem {
        LineItem::new(LineId(2), 100, usd(0)).with_percentage(Percentage::new(percentage).unwrap())
    }

    #[test]
    fn test_rule_selection() {
        let line = rate_line(dec!(10));
        assert_eq!(FeeRule::for_line(&line), FeeRule::Surcharge);
        assert_eq!(
            FeeRule::for_line(&line.clone().cascading_percentage()),
            FeeRule::Cut
        );
        assert_eq!(
            FeeRule::for_line(&line.clone().backed_into()),
            FeeRule::BackedInSurcharge
        );
        assert_eq!(
            FeeRule::for_line(&line.cascading_percentage().backed_into()),
            FeeRule::BackedInCut
        );
    }

    #[test]
    fn test_plain_percentage() {
        let fee = compute_fee(usd(1000), &rate_line(dec!(10))).unwrap();
        assert_eq!(fee.rule, FeeRule::Surcharge);
        assert_eq!(fee.percentage_fee, usd(100));
        assert_eq!(fee.allocation().unwrap(), usd(100));
        assert_eq!(fee.added().unwrap(), usd(100));
        assert!(fee.absorbed().unwrap().is_zero());
    }

    #[test]
    fn test_backed_in_percentage() {
        let line = rate_line(dec!(10)).cascading_percentage().backed_into();
        let fee = compute_fee(usd(1000), &line).unwrap();
        assert_eq!(fee.rule, FeeRule::BackedInCut);
        // 10.00 × 10 / 110 = 0.90909…
        assert_eq!(fee.percentage_fee, usd(91));
        assert_eq!(fee.absorbed().unwrap(), usd(91));
        assert!(fee.added().unwrap().is_zero());
    }

    #[test]
    fn test_backed_in_surcharge() {
        // Same P × p/(100+p) formula, but added on top instead of taken.
        let fee = compute_fee(usd(1000), &rate_line(dec!(10)).backed_into()).unwrap();
        assert_eq!(fee.rule, FeeRule::BackedInSurcharge);
        assert_eq!(fee.percentage_fee, usd(91));
        assert_eq!(fee.allocation().unwrap(), usd(91));
        assert_eq!(fee.added().unwrap(), usd(91));
        assert!(fee.absorbed().unwrap().is_zero());
    }

    #[test]
    fn test_split_sourcing() {
        // Percentage taken from the pool, static part added on top.
        let line = LineItem::new(LineId(2), 100, usd(25))
            .with_percentage(Percentage::new(dec!(10)).unwrap())
            .cascading_percentage();
        let fee = compute_fee(usd(1000), &line).unwrap();
        assert_eq!(fee.allocation().unwrap(), usd(125));
        assert_eq!(fee.absorbed().unwrap(), usd(100));
        assert_eq!(fee.added().unwrap(), usd(25));

        let line = LineItem::new(LineId(2), 100, usd(25))
            .with_percentage(Percentage::new(dec!(10)).unwrap())
            .cascading_amount();
        let fee = compute_fee(usd(1000), &line).unwrap();
        assert_eq!(fee.absorbed().unwrap(), usd(25));
        assert_eq!(fee.added().unwrap(), usd(100));
    }

    #[test]
    fn test_backed_in_rejects_full_percentage() {
        let line = rate_line(dec!(100)).backed_into();
        assert!(matches!(
            compute_fee(usd(1000), &line),
            Err(SettlementError::InvalidPercentage { .. })
        ));
        // A plain 100% fee is fine.
        assert_eq!(
            compute_fee(usd(1000), &rate_line(dec!(100)))
                .unwrap()
                .percentage_fee,
            usd(1000)
        );
    }

    #[test]
    fn test_zero_digit_currency_rounds_to_whole_units() {
        let line = LineItem::new(LineId(2), 100, Money::zero(Currency::Jpy))
            .with_percentage(Percentage::new(dec!(3.6)).unwrap());
        let fee = compute_fee(Money::new(1250, Currency::Jpy), &line).unwrap();
        // 1250 × 3.6% = 45
        assert_eq!(fee.percentage_fee, Money::new(45, Currency::Jpy));
    }

    #[test]
    fn test_currency_mismatch() {
        let line = rate_line(dec!(10));
        assert!(matches!(
            compute_fee(Money::new(1000, Currency::Eur), &line),
            Err(SettlementError::CurrencyMismatch { .. })
        ));
    }
}
