//! Category breakdown of a settled result, for invoices and payout reports.

use std::collections::BTreeMap;

use crate::engine::SettlementResult;
use crate::error::TabulationResult;
use crate::money::Money;
use crate::types::Category;

/// Sums allocations per [`Category`].
///
/// Categories with no lines are absent. The values sum to `result.total`.
pub fn breakdown_by_category(
    result: &SettlementResult,
) -> TabulationResult<BTreeMap<Category, Money>> {
    let currency = result.total.currency();
    let mut breakdown: BTreeMap<Category, Money> = BTreeMap::new();
    for (line, amount) in result.iter() {
        let entry = breakdown
            .entry(line.category)
            .or_insert_with(|| Money::zero(currency));
        *entry = entry.checked_add(amount)?;
    }
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::engine::get_totals;
    use crate::types::{LineId, LineItem, Percentage};
    use rust_decimal_macros::dec;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::Usd)
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let lines = vec![
            LineItem::new(LineId(1), 0, usd(1000)).with_category(Category::EscrowHold),
            LineItem::new(LineId(2), 0, usd(500)).with_category(Category::EscrowHold),
            LineItem::new(LineId(3), 100, usd(0))
                .with_percentage(Percentage::new(dec!(8)).unwrap())
                .with_category(Category::Taxes),
            LineItem::new(LineId(4), 300, usd(30))
                .with_percentage(Percentage::new(dec!(2.9)).unwrap())
                .cascading()
                .with_category(Category::ThirdPartyFee),
        ];
        let result = get_totals(lines).unwrap();
        let breakdown = breakdown_by_category(&result).unwrap();

        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[&Category::Taxes], usd(120));
        // 16.20 × 2.9% = 0.4698 → 0.47, plus 0.30 static.
        assert_eq!(breakdown[&Category::ThirdPartyFee], usd(77));
        let sum = Money::sum(Currency::Usd, breakdown.values().copied()).unwrap();
        assert_eq!(sum, result.total);
    }

    #[test]
    fn test_breakdown_of_empty_result() {
        let result = get_totals(Vec::<LineItem>::new()).unwrap();
        assert!(breakdown_by_category(&result).unwrap().is_empty());
    }
}
