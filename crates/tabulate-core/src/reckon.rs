//! # Reckoning
//!
//! Straight sums over amounts that are already final, checked against what
//! a payment processor says it charged.
//!
//! Nothing here cascades or rounds. A finalized record carries its
//! allocations with it, so re-running the engine on it would be wrong:
//! the inputs may have changed since the charge was made.
//!
//! ## Capture Flow
//! ```text
//! Stored invoice lines          Processor webhook
//!   [9.09, 0.91] USD              amount = 1000, currency = "usd"
//!        │                              │
//!        ▼                              ▼
//!   reckon_lines() ─► 10.00 USD ─► reconcile_minor_units()
//!                                       │
//!                     equal ◄───────────┴──────────► ReconciliationMismatch
//! ```

use tracing::warn;

use crate::currency::Currency;
use crate::error::{SettlementError, TabulationResult};
use crate::money::Money;

/// Sums finalized amounts, all of which must be in `currency`.
pub fn reckon_lines<I>(currency: Currency, amounts: I) -> TabulationResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    Money::sum(currency, amounts)
}

/// Requires `reported` to equal `expected` exactly.
///
/// There is no tolerance window. A one-minor-unit difference is a mismatch.
pub fn reconcile(expected: Money, reported: Money) -> TabulationResult<()> {
    expected.ensure_same_currency(&reported)?;
    if expected != reported {
        warn!(
            expected = %expected,
            reported = %reported,
            "Reported charge does not match expected total"
        );
        return Err(SettlementError::ReconciliationMismatch { expected, reported });
    }
    Ok(())
}

/// [`reconcile`] against a processor's integer-minor-unit representation.
///
/// ## Example
/// ```rust
/// use tabulate_core::{reconcile_minor_units, Currency, Money};
///
/// let expected = Money::new(1000, Currency::Usd);
/// assert!(reconcile_minor_units(expected, 1000, "usd").is_ok());
/// assert!(reconcile_minor_units(expected, 999, "usd").is_err());
/// ```
pub fn reconcile_minor_units(
    expected: Money,
    reported_minor: i64,
    currency_code: &str,
) -> TabulationResult<()> {
    let currency: Currency = currency_code.parse()?;
    reconcile(expected, Money::new(reported_minor, currency))
}

/// Sums `amounts` in the reported currency and reconciles the sum.
pub fn reckon_against<I>(amounts: I, reported: Money) -> TabulationResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    let total = reckon_lines(reported.currency(), amounts)?;
    reconcile(total, reported)?;
    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    #[test]
    fn test_reckon_lines() {
        let total = reckon_lines(Currency::Usd, vec![usd(909), usd(91)]).unwrap();
        assert_eq!(total, usd(1000));

        let empty = reckon_lines(Currency::Jpy, Vec::<Money>::new()).unwrap();
        assert_eq!(empty, Money::zero(Currency::Jpy));
    }

    #[test]
    fn test_reckon_lines_rejects_foreign_amounts() {
        let result = reckon_lines(Currency::Usd, vec![usd(100), Money::new(100, Currency::Eur)]);
        assert!(matches!(result, Err(SettlementError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_reconcile_exact_match_only() {
        assert!(reconcile(usd(1100), usd(1100)).is_ok());
        assert_eq!(
            reconcile(usd(1100), usd(1099)),
            Err(SettlementError::ReconciliationMismatch {
                expected: usd(1100),
                reported: usd(1099),
            })
        );
    }

    #[test]
    fn test_reconcile_currency_mismatch() {
        assert!(matches!(
            reconcile(usd(1100), Money::new(1100, Currency::Cad)),
            Err(SettlementError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_reconcile_minor_units() {
        assert!(reconcile_minor_units(usd(1000), 1000, "USD").is_ok());
        assert!(reconcile_minor_units(Money::new(1200, Currency::Jpy), 1200, "jpy").is_ok());
        assert!(matches!(
            reconcile_minor_units(usd(1000), 1001, "usd"),
            Err(SettlementError::ReconciliationMismatch { .. })
        ));
        assert_eq!(
            reconcile_minor_units(usd(1000), 1000, "zzz"),
            Err(SettlementError::Validation(ValidationError::UnknownCurrency(
                "zzz".to_string()
            )))
        );
    }

    #[test]
    fn test_reckon_against() {
        assert_eq!(reckon_against(vec![usd(900), usd(100)], usd(1000)), Ok(usd(1000)));
        assert!(reckon_against(vec![usd(900), usd(99)], usd(1000)).is_err());
    }
}
